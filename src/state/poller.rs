/// Recent-activity poller
///
/// While the dashboard is active the latest attendance entries are
/// re-fetched on a fixed period. Polling is owned: it lives exactly as
/// long as the handle that started it.
///
/// [`recent_activity`] yields one list per tick as a stream. The dashboard
/// runs it as an abortable task and holds the handle; dropping the
/// dashboard aborts the stream and no further fetch is issued.

use futures::stream::{self, Stream};
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::api::Backend;
use super::data::AttendanceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Time between fetches
    pub period: Duration,
    /// Number of entries kept from the head of the server's list
    pub limit: usize,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(5),
            limit: 5,
        }
    }
}

/// Perform one tick: fetch, keep the first `limit` entries.
///
/// Failures yield an empty list; the next tick is the retry.
pub async fn poll_once<B: Backend>(backend: &B, limit: usize) -> Vec<AttendanceRecord> {
    match backend.attendance(None).await {
        Ok(mut records) => {
            records.truncate(limit);
            log::debug!("Recent activity refreshed ({} entries)", records.len());
            records
        }
        Err(e) => {
            log::warn!("Error fetching recent attendance: {}", e);
            Vec::new()
        }
    }
}

/// Infinite stream of recent-activity lists, first one immediately.
///
/// The timer is created on first poll so the stream can be built outside
/// a runtime context.
pub fn recent_activity<B: Backend>(
    backend: B,
    settings: PollSettings,
) -> impl Stream<Item = Vec<AttendanceRecord>> {
    stream::unfold(
        (backend, None::<Interval>),
        move |(backend, timer)| async move {
            let mut timer = timer.unwrap_or_else(|| {
                let mut timer = interval(settings.period);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                timer
            });
            timer.tick().await;
            let records = poll_once(&backend, settings.limit).await;
            Some((records, (backend, Some(timer))))
        },
    )
}
