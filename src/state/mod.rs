/// State management module
///
/// This module holds the attendance view model:
/// - Shared data structures (data.rs)
/// - Aggregate stats cache (stats.rs)
/// - Recent-activity polling (poller.rs)
/// - Date-filtered records and the roster (records.rs)
/// - Mutating actions (dispatcher.rs) and their events (events.rs)
/// - Per-surface form and banner state (forms.rs, banner.rs)
/// - Surface identity for routing async results (surface.rs)

pub mod banner;
pub mod data;
pub mod dispatcher;
pub mod events;
pub mod forms;
pub mod poller;
pub mod records;
pub mod stats;
pub mod surface;
