/// Aggregate stats cache
///
/// Holds the latest known snapshot of today's counters. A refresh either
/// replaces the snapshot wholesale or, on failure, leaves it untouched.

use crate::api::{ApiError, Backend};
use super::data::StatsSnapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsCache {
    snapshot: StatsSnapshot,
    /// Whether any fetch has succeeded yet
    loaded: bool,
}

impl StatsCache {
    pub fn snapshot(&self) -> &StatsSnapshot {
        &self.snapshot
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Apply the result of a stats fetch, returning the next cache state
    #[must_use]
    pub fn refreshed(self, result: Result<StatsSnapshot, ApiError>) -> Self {
        match result {
            Ok(snapshot) => Self { snapshot, loaded: true },
            Err(e) => {
                log::error!("Error fetching stats: {}", e);
                self
            }
        }
    }

    pub fn attendance_rate(&self) -> f64 {
        attendance_rate(&self.snapshot)
    }
}

/// Fetch a fresh snapshot from the backend
pub async fn fetch_stats<B: Backend>(backend: B) -> Result<StatsSnapshot, ApiError> {
    backend.stats().await
}

/// Percentage of students present, rounded to one decimal.
///
/// Zero students yields 0.0 rather than a division by zero.
pub fn attendance_rate(snapshot: &StatsSnapshot) -> f64 {
    if snapshot.total_students == 0 {
        return 0.0;
    }
    let rate = snapshot.present as f64 / snapshot.total_students as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;

    fn snapshot(total_students: u32, present: u32) -> StatsSnapshot {
        StatsSnapshot {
            total_students,
            present,
            absent: total_students.saturating_sub(present),
        }
    }

    #[test]
    fn test_rate_with_no_students_is_zero() {
        assert_eq!(attendance_rate(&snapshot(0, 0)), 0.0);
        assert_eq!(attendance_rate(&snapshot(0, 3)), 0.0);
    }

    #[test]
    fn test_rate_rounds_to_one_decimal() {
        assert_eq!(attendance_rate(&snapshot(3, 1)), 33.3);
        assert_eq!(attendance_rate(&snapshot(3, 2)), 66.7);
        assert_eq!(attendance_rate(&snapshot(8, 8)), 100.0);
        assert_eq!(attendance_rate(&snapshot(7, 0)), 0.0);
    }

    #[test]
    fn test_rate_matches_formula() {
        for total in 1..=40u32 {
            for present in 0..=total {
                let expected = (present as f64 / total as f64 * 100.0 * 10.0).round() / 10.0;
                assert_eq!(attendance_rate(&snapshot(total, present)), expected);
            }
        }
    }

    #[test]
    fn test_failed_refresh_keeps_previous_snapshot() {
        let cache = StatsCache::default().refreshed(Ok(snapshot(10, 4)));
        assert!(cache.is_loaded());

        let cache = cache.refreshed(Err(ApiError::Transport("offline".into())));
        assert_eq!(*cache.snapshot(), snapshot(10, 4));
        assert_eq!(cache.attendance_rate(), 40.0);
    }

    #[test]
    fn test_refresh_replaces_wholesale() {
        let cache = StatsCache::default()
            .refreshed(Ok(snapshot(10, 4)))
            .refreshed(Ok(StatsSnapshot { total_students: 2, present: 0, absent: 0 }));
        assert_eq!(cache.snapshot().absent, 0);
        assert_eq!(cache.snapshot().total_students, 2);
    }

    #[tokio::test]
    async fn test_fetch_stats_reads_backend() {
        let backend = FakeBackend::default();
        backend.set_stats(Ok(snapshot(5, 2)));

        let result = fetch_stats(backend.clone()).await;

        assert_eq!(result.unwrap(), snapshot(5, 2));
        assert_eq!(backend.calls("stats"), 1);
    }
}
