/// Mutation events
///
/// The action dispatcher publishes one event per successful mutation.
/// Anything that caches server state (the stats header, the roster)
/// subscribes and refreshes on its own schedule.

use futures::stream::{self, Stream};
use tokio::sync::broadcast;

/// Capacity of the broadcast ring; slow subscribers skip older events
const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEvent {
    StudentRegistered { student_id: String },
    AttendanceMarked { student_id: String },
    StudentDeleted { student_id: String },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MutationEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: MutationEvent) {
        log::debug!("Publishing {:?}", event);
        // No subscribers is fine: nothing is cached that needs refreshing
        if self.sender.send(event).is_err() {
            log::debug!("No subscribers for mutation event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MutationEvent> {
        self.sender.subscribe()
    }
}

/// Re-fetch that follows a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    Stats,
    Roster,
}

/// What to refresh after `event`: stats exactly once, plus the roster when
/// it is on screen and the set of students changed.
pub fn follow_ups(event: &MutationEvent, roster_visible: bool) -> Vec<FollowUp> {
    let mut follow_ups = vec![FollowUp::Stats];
    let roster_changed = matches!(
        event,
        MutationEvent::StudentRegistered { .. } | MutationEvent::StudentDeleted { .. }
    );
    if roster_visible && roster_changed {
        follow_ups.push(FollowUp::Roster);
    }
    follow_ups
}

/// Adapt a receiver into a stream that ends when the bus is dropped
pub fn event_stream(receiver: broadcast::Receiver<MutationEvent>) -> impl Stream<Item = MutationEvent> {
    stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => return Some((event, receiver)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Mutation subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}
