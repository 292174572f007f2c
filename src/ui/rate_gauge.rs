/// Attendance rate gauge
/// Horizontal bar split into present and absent shares
use iced::widget::canvas::{self, Path};
use iced::{Color, Point, Rectangle, Size};

use crate::state::data::StatsSnapshot;
use crate::Message;
use super::{GREEN, RED};

/// Gauge data, taken from the latest stats snapshot
#[derive(Debug, Clone, Copy)]
pub struct RateGauge {
    pub present: u32,
    pub absent: u32,
}

impl From<&StatsSnapshot> for RateGauge {
    fn from(snapshot: &StatsSnapshot) -> Self {
        Self {
            present: snapshot.present,
            absent: snapshot.absent,
        }
    }
}

impl RateGauge {
    /// Fraction of the bar drawn as present, in [0, 1]
    pub fn present_share(&self) -> f32 {
        let total = self.present + self.absent;
        if total == 0 {
            return 0.0;
        }
        (self.present as f32 / total as f32).clamp(0.0, 1.0)
    }
}

impl canvas::Program<Message> for RateGauge {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let width = bounds.width;
        let height = bounds.height;

        // Track
        frame.fill(
            &Path::rectangle(Point::ORIGIN, Size::new(width, height)),
            Color::from_rgba(0.5, 0.5, 0.5, 0.2),
        );

        if self.present + self.absent == 0 {
            return vec![frame.into_geometry()];
        }

        let present_width = width * self.present_share();

        frame.fill_rectangle(Point::ORIGIN, Size::new(present_width, height), GREEN);
        frame.fill_rectangle(
            Point::new(present_width, 0.0),
            Size::new(width - present_width, height),
            RED,
        );

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_of_empty_day_is_zero() {
        let gauge = RateGauge { present: 0, absent: 0 };
        assert_eq!(gauge.present_share(), 0.0);
    }

    #[test]
    fn test_share_from_snapshot() {
        let snapshot = StatsSnapshot { total_students: 4, present: 3, absent: 1 };
        assert_eq!(RateGauge::from(&snapshot).present_share(), 0.75);
    }
}
