/// Records browser state
///
/// Date-filtered attendance lists and the student roster. Every date fetch
/// is stamped with a sequence number; only the response to the most
/// recently issued request is ever displayed, whatever order responses
/// arrive in. Tickets also name the surface that issued them, so a
/// reopened records screen never shows a response meant for a closed one.

use chrono::NaiveDate;

use crate::api::{ApiError, Backend};
use super::data::{AttendanceRecord, Student};
use super::surface::SurfaceId;

/// Identifies one issued date fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub surface: SurfaceId,
    pub seq: u64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordsView {
    surface: SurfaceId,
    selected: NaiveDate,
    records: Vec<AttendanceRecord>,
    /// Date the displayed list belongs to
    shown: Option<NaiveDate>,
    loading: bool,
    last_issued: u64,
}

impl RecordsView {
    pub fn new(surface: SurfaceId, date: NaiveDate) -> Self {
        Self {
            surface,
            selected: date,
            records: Vec::new(),
            shown: None,
            loading: false,
            last_issued: 0,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn shown_date(&self) -> Option<NaiveDate> {
        self.shown
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Issue a fetch for the currently selected date
    #[must_use]
    pub fn reload(mut self) -> (Self, Ticket) {
        self.last_issued += 1;
        self.loading = true;
        let ticket = Ticket {
            surface: self.surface,
            seq: self.last_issued,
            date: self.selected,
        };
        (self, ticket)
    }

    /// Change the selected date. Returns a ticket only when a fetch is due:
    /// the date actually changed and is not in the future.
    #[must_use]
    pub fn select_date(mut self, date: NaiveDate, today: NaiveDate) -> (Self, Option<Ticket>) {
        if date > today {
            log::debug!("Ignoring future date {}", date);
            return (self, None);
        }
        if date == self.selected {
            return (self, None);
        }
        self.selected = date;
        let (next, ticket) = self.reload();
        (next, Some(ticket))
    }

    /// Apply a fetch result. Responses to superseded tickets, or to
    /// tickets issued by another view, are dropped.
    #[must_use]
    pub fn loaded(mut self, ticket: Ticket, result: Result<Vec<AttendanceRecord>, ApiError>) -> Self {
        if ticket.surface != self.surface {
            log::debug!("Discarding attendance for {} from a closed records view", ticket.date);
            return self;
        }
        if ticket.seq != self.last_issued {
            log::debug!(
                "Discarding stale attendance for {} (seq {} < {})",
                ticket.date,
                ticket.seq,
                self.last_issued
            );
            return self;
        }

        self.loading = false;
        self.shown = Some(ticket.date);
        self.records = match result {
            Ok(records) => records,
            Err(e) => {
                log::error!("Error fetching attendance for {}: {}", ticket.date, e);
                Vec::new()
            }
        };
        self
    }
}

/// One-shot fetch for a ticket's date, carrying the ticket back
pub async fn fetch_for_date<B: Backend>(
    backend: B,
    ticket: Ticket,
) -> (Ticket, Result<Vec<AttendanceRecord>, ApiError>) {
    let result = backend.attendance(Some(ticket.date)).await;
    (ticket, result)
}

/// Registered students, as last fetched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    #[must_use]
    pub fn loaded(self, result: Result<Vec<Student>, ApiError>) -> Self {
        match result {
            Ok(students) => Self { students },
            Err(e) => {
                log::error!("Error fetching students: {}", e);
                Self::default()
            }
        }
    }
}

pub async fn fetch_roster<B: Backend>(backend: B) -> Result<Vec<Student>, ApiError> {
    backend.students().await
}

/// Parse a complete `YYYY-MM-DD` date typed by the operator.
///
/// Partial input such as `2026-10-1` is rejected even though chrono would
/// read it as the 1st: the operator may still be typing the day.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{record, student, FakeBackend};
    use crate::state::surface::SurfaceIds;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn fresh_view(date: NaiveDate) -> RecordsView {
        RecordsView::new(SurfaceIds::default().issue(), date)
    }

    #[test]
    fn test_latest_issued_wins_over_late_stale_response() {
        let (view, d1) = fresh_view(day(18)).select_date(day(10), day(18));
        let (view, d2) = view.select_date(day(11), day(18));
        let (d1, d2) = (d1.unwrap(), d2.unwrap());

        // D2 answers first, D1 straggles in afterwards
        let view = view.loaded(d2, Ok(vec![record(2, "STU2", "Bob")]));
        let view = view.loaded(d1, Ok(vec![record(1, "STU1", "Alice")]));

        assert_eq!(view.shown_date(), Some(day(11)));
        assert_eq!(view.records().len(), 1);
        assert_eq!(view.records()[0].student_id, "STU2");
        assert!(!view.is_loading());
    }

    #[test]
    fn test_reopened_view_ignores_closed_views_ticket() {
        let mut surfaces = SurfaceIds::default();

        let (first, _) = RecordsView::new(surfaces.issue(), day(18)).reload();
        let (_, old_ticket) = first.select_date(day(10), day(18));

        let (second, _) = RecordsView::new(surfaces.issue(), day(18)).reload();
        let (second, new_ticket) = second.select_date(day(11), day(18));
        let old_ticket = old_ticket.unwrap();
        assert_eq!(old_ticket.seq, new_ticket.unwrap().seq);

        let second = second.loaded(old_ticket, Ok(vec![record(1, "STU1", "Alice")]));

        assert!(second.records().is_empty());
        assert_eq!(second.shown_date(), None);
        assert!(second.is_loading());

        let second = second.loaded(new_ticket.unwrap(), Ok(Vec::new()));
        assert_eq!(second.shown_date(), Some(day(11)));
    }

    #[test]
    fn test_stale_response_before_latest_keeps_loading() {
        let (view, d1) = fresh_view(day(18)).select_date(day(10), day(18));
        let (view, d2) = view.select_date(day(11), day(18));

        let view = view.loaded(d1.unwrap(), Ok(vec![record(1, "STU1", "Alice")]));
        assert!(view.records().is_empty());
        assert!(view.is_loading());

        let view = view.loaded(d2.unwrap(), Ok(Vec::new()));
        assert!(!view.is_loading());
        assert_eq!(view.shown_date(), Some(day(11)));
    }

    #[test]
    fn test_each_date_change_issues_exactly_one_fetch() {
        let view = fresh_view(day(18));
        let (view, same) = view.select_date(day(18), day(18));
        assert!(same.is_none());

        let (view, future) = view.select_date(day(19), day(18));
        assert!(future.is_none());
        assert_eq!(view.selected_date(), day(18));

        let (_, changed) = view.select_date(day(17), day(18));
        assert_eq!(changed.map(|t| t.date), Some(day(17)));
    }

    #[test]
    fn test_failed_fetch_empties_list() {
        let (view, ticket) = fresh_view(day(18)).reload();
        let view = view.loaded(ticket, Ok(vec![record(1, "STU1", "Alice")]));
        let (view, ticket) = view.reload();
        let view = view.loaded(ticket, Err(ApiError::Transport("timeout".into())));

        assert!(view.records().is_empty());
        assert_eq!(view.shown_date(), Some(day(18)));
    }

    #[test]
    fn test_roster_failure_empties() {
        let roster = Roster::default().loaded(Ok(vec![student("STU1", "Alice")]));
        assert_eq!(roster.students().len(), 1);

        let roster = roster.loaded(Err(ApiError::Server { status: 500, message: None }));
        assert!(roster.students().is_empty());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(" 2026-10-05 "), Some(day(5)));
        assert_eq!(parse_date("10/05/2026"), None);
        assert_eq!(parse_date("2026-02-30"), None);
        // Still typing the day
        assert_eq!(parse_date("2026-10-1"), None);
        assert_eq!(parse_date("2026-10-015"), None);
        assert_eq!(parse_date("2026-10-15"), Some(day(15)));
    }

    #[tokio::test]
    async fn test_fetch_for_date_passes_filter() {
        let backend = FakeBackend::default();
        let (_, ticket) = fresh_view(day(3)).reload();

        let (returned, result) = fetch_for_date(backend.clone(), ticket).await;

        assert_eq!(returned, ticket);
        assert!(result.is_ok());
        assert_eq!(backend.last_attendance_date(), Some(Some(day(3))));
    }
}
