use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use iced::widget::{button, column, container, row, text, Column};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;

mod api;
mod capture;
mod config;
mod export;
mod state;
mod ui;

use api::{ApiError, Backend, HttpBackend};
use capture::CapturedFrame;
use config::Config;
use state::banner::{self, BannerKind};
use state::data::{AttendanceRecord, MarkOutcome, StatsSnapshot, Student};
use state::dispatcher::{mark_success_text, ActionDispatcher};
use state::events::{self, EventBus, FollowUp, MutationEvent};
use state::poller;
use state::records::{self, Ticket};
use state::stats::{self, StatsCache};
use state::surface::{SurfaceId, SurfaceIds};
use ui::dashboard::Dashboard;
use ui::mark::MarkScreen;
use ui::records::{RecordsScreen, RecordsTab};
use ui::register::RegisterScreen;

/// Top-level surfaces, in sidebar order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Mark,
    Register,
    Records,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Mark, Tab::Register, Tab::Records];

    fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Mark => "Mark Attendance",
            Tab::Register => "Register Student",
            Tab::Records => "View Records",
        }
    }
}

/// The active surface and its ephemeral state.
///
/// Replacing the screen tears the previous one down.
enum Screen {
    Dashboard(Dashboard),
    Mark(MarkScreen),
    Register(RegisterScreen),
    Records(RecordsScreen),
}

impl Screen {
    fn tab(&self) -> Tab {
        match self {
            Screen::Dashboard(_) => Tab::Dashboard,
            Screen::Mark(_) => Tab::Mark,
            Screen::Register(_) => Tab::Register,
            Screen::Records(_) => Tab::Records,
        }
    }
}

/// Main application state
struct AttendanceDesk {
    config: Config,
    dispatcher: ActionDispatcher<HttpBackend>,
    /// Latest stats snapshot, shared by the header and the dashboard
    stats: StatsCache,
    /// Result of the start-up health check
    online: Option<bool>,
    surfaces: SurfaceIds,
    /// Identity of the open screen; async results tagged otherwise are stale
    surface: SurfaceId,
    screen: Screen,
}

/// Application messages (events)
///
/// Results of work started by a screen carry that screen's [`SurfaceId`].
#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    HealthChecked(Result<(), ApiError>),
    StatsLoaded(Result<StatsSnapshot, ApiError>),
    /// A mutation succeeded somewhere
    Mutated(MutationEvent),
    RecentActivity(SurfaceId, Vec<AttendanceRecord>),
    BannerExpired(SurfaceId, u64),

    // Mark attendance
    ClassNameChanged(String),
    CaptureFrame,
    FrameCaptured(SurfaceId, Result<CapturedFrame, String>),
    MarkAttendance,
    AttendanceMarked(SurfaceId, Result<MarkOutcome, String>),

    // Register student
    StudentIdChanged(String),
    NameChanged(String),
    EmailChanged(String),
    CapturePhoto,
    PhotoCaptured(SurfaceId, Result<CapturedFrame, String>),
    RetakePhoto,
    SubmitRegistration,
    Registered(SurfaceId, Result<String, String>),

    // View records
    RecordsTabSelected(RecordsTab),
    DateInputChanged(String),
    ShiftDate(i64),
    JumpToToday,
    RecordsLoaded(Ticket, Result<Vec<AttendanceRecord>, ApiError>),
    RosterLoaded(SurfaceId, Result<Vec<Student>, ApiError>),
    RequestDelete(String),
    CancelDelete,
    ConfirmDelete(String),
    Deleted(SurfaceId, Result<String, String>),
    ExportCsv,
    Exported(SurfaceId, Result<PathBuf, String>),
}

impl Message {
    /// Screen an async result belongs to; `None` for app-wide messages and
    /// user input on the open screen
    fn origin(&self) -> Option<SurfaceId> {
        match self {
            Message::RecentActivity(surface, _)
            | Message::BannerExpired(surface, _)
            | Message::FrameCaptured(surface, _)
            | Message::AttendanceMarked(surface, _)
            | Message::PhotoCaptured(surface, _)
            | Message::Registered(surface, _)
            | Message::RosterLoaded(surface, _)
            | Message::Deleted(surface, _)
            | Message::Exported(surface, _) => Some(*surface),
            Message::RecordsLoaded(ticket, _) => Some(ticket.surface),
            _ => None,
        }
    }

    /// Whether this message may be applied while `current` is open
    fn belongs_to(&self, current: SurfaceId) -> bool {
        self.origin().map_or(true, |origin| origin == current)
    }
}

impl AttendanceDesk {
    /// Create a new instance of the application
    fn new(config: Config, backend: HttpBackend) -> (Self, Task<Message>) {
        let dispatcher = ActionDispatcher::new(backend, EventBus::new())
            .with_default_class(config.default_class_name.clone());

        log::info!("🎓 Attendance Desk talking to {}", dispatcher.backend().base_url());

        let health_backend = dispatcher.backend().clone();
        let health = Task::perform(
            async move { health_backend.health().await },
            Message::HealthChecked,
        );

        // The dashboard is the first surface; activating it also loads stats
        let mut surfaces = SurfaceIds::default();
        let surface = surfaces.issue();
        let (screen, activate) = Self::open(&config, &dispatcher, surface, Tab::Dashboard);

        (
            AttendanceDesk {
                config,
                dispatcher,
                stats: StatsCache::default(),
                online: None,
                surfaces,
                surface,
                screen,
            },
            Task::batch([health, activate]),
        )
    }

    /// Build a fresh surface and the tasks its activation starts
    fn open(
        config: &Config,
        dispatcher: &ActionDispatcher<HttpBackend>,
        surface: SurfaceId,
        tab: Tab,
    ) -> (Screen, Task<Message>) {
        let backend = dispatcher.backend().clone();
        match tab {
            Tab::Dashboard => {
                let settings = config.poll_settings();
                log::info!("Recent-activity polling every {:?}", settings.period);
                let updates = poller::recent_activity(backend.clone(), settings);
                let (poll, handle) = Task::run(updates, move |records| {
                    Message::RecentActivity(surface, records)
                })
                .abortable();
                let refresh = Task::perform(stats::fetch_stats(backend), Message::StatsLoaded);
                (
                    Screen::Dashboard(Dashboard::new(handle.abort_on_drop())),
                    Task::batch([poll, refresh]),
                )
            }
            Tab::Mark => (Screen::Mark(MarkScreen::default()), Task::none()),
            Tab::Register => (Screen::Register(RegisterScreen::default()), Task::none()),
            Tab::Records => {
                let (screen, ticket) = RecordsScreen::open(surface, today());
                let fetch = Self::fetch_records(backend.clone(), ticket);
                let roster = Self::fetch_roster(backend, surface);
                (Screen::Records(screen), Task::batch([fetch, roster]))
            }
        }
    }

    fn fetch_if_due(backend: HttpBackend, ticket: Option<Ticket>) -> Task<Message> {
        match ticket {
            Some(ticket) => Self::fetch_records(backend, ticket),
            None => Task::none(),
        }
    }

    fn fetch_records(backend: HttpBackend, ticket: Ticket) -> Task<Message> {
        Task::perform(records::fetch_for_date(backend, ticket), |(ticket, result)| {
            Message::RecordsLoaded(ticket, result)
        })
    }

    fn fetch_roster(backend: HttpBackend, surface: SurfaceId) -> Task<Message> {
        Task::perform(records::fetch_roster(backend), move |result| {
            Message::RosterLoaded(surface, result)
        })
    }

    fn banner_timer(&self, id: u64) -> Task<Message> {
        let surface = self.surface;
        Task::perform(banner::expire_after(self.config.banner_clear(), id), move |id| {
            Message::BannerExpired(surface, id)
        })
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        if !message.belongs_to(self.surface) {
            log::debug!("Discarding {:?} from a closed screen", message);
            return Task::none();
        }

        match message {
            Message::TabSelected(tab) => {
                if tab == self.screen.tab() {
                    return Task::none();
                }
                let surface = self.surfaces.issue();
                let (screen, task) = Self::open(&self.config, &self.dispatcher, surface, tab);
                // Dropping the old screen releases whatever it owned
                self.surface = surface;
                self.screen = screen;
                task
            }
            Message::HealthChecked(result) => {
                match &result {
                    Ok(()) => log::info!("✅ Backend reachable"),
                    Err(e) => log::warn!("⚠️  Backend health check failed: {}", e),
                }
                self.online = Some(result.is_ok());
                Task::none()
            }
            Message::StatsLoaded(result) => {
                self.stats = self.stats.refreshed(result);
                Task::none()
            }
            Message::Mutated(event) => {
                log::debug!("Refreshing after {:?}", event);
                let backend = self.dispatcher.backend();
                let roster_visible = matches!(self.screen, Screen::Records(_));
                Task::batch(events::follow_ups(&event, roster_visible).into_iter().map(|follow_up| {
                    match follow_up {
                        FollowUp::Stats => {
                            Task::perform(stats::fetch_stats(backend.clone()), Message::StatsLoaded)
                        }
                        FollowUp::Roster => Self::fetch_roster(backend.clone(), self.surface),
                    }
                }))
            }
            Message::RecentActivity(_, records) => {
                if let Screen::Dashboard(dashboard) = &mut self.screen {
                    dashboard.recent_loaded(records);
                }
                Task::none()
            }
            message => match self.screen.tab() {
                Tab::Mark => self.update_mark(message),
                Tab::Register => self.update_register(message),
                Tab::Records => self.update_records(message),
                Tab::Dashboard => {
                    log::debug!("Discarding {:?} on the dashboard", message);
                    Task::none()
                }
            },
        }
    }

    fn update_mark(&mut self, message: Message) -> Task<Message> {
        let surface = self.surface;
        let Screen::Mark(screen) = &mut self.screen else {
            return Task::none();
        };

        match message {
            Message::ClassNameChanged(value) => {
                screen.form.class_name = value;
                Task::none()
            }
            Message::CaptureFrame => match pick_image() {
                Some(path) => Task::perform(capture::load_frame(path), move |result| {
                    Message::FrameCaptured(surface, result.map_err(|e| e.to_string()))
                }),
                None => Task::none(),
            },
            Message::FrameCaptured(_, Ok(frame)) => {
                screen.form = std::mem::take(&mut screen.form).with_frame(frame);
                Task::none()
            }
            Message::FrameCaptured(_, Err(e)) => {
                let (slot, id) = std::mem::take(&mut screen.banner).show(BannerKind::Error, e);
                screen.banner = slot;
                self.banner_timer(id)
            }
            Message::MarkAttendance => {
                let frame = screen.form.frame.clone();
                let class_name = screen.form.class_label();
                screen.form = std::mem::take(&mut screen.form).begin_mark();
                screen.banner = std::mem::take(&mut screen.banner).clear();

                let dispatcher = self.dispatcher.clone();
                Task::perform(
                    async move { dispatcher.mark_attendance(frame, class_name).await },
                    move |result| Message::AttendanceMarked(surface, result),
                )
            }
            Message::AttendanceMarked(_, result) => {
                screen.form = std::mem::take(&mut screen.form).marked(&result);
                let (kind, text) = match &result {
                    Ok(outcome) => (BannerKind::Success, mark_success_text(outcome)),
                    Err(message) => (BannerKind::Error, message.clone()),
                };
                let (slot, id) = std::mem::take(&mut screen.banner).show(kind, text);
                screen.banner = slot;
                self.banner_timer(id)
            }
            Message::BannerExpired(_, id) => {
                let is_current = screen.banner.current().is_some_and(|b| b.id == id);
                screen.banner = std::mem::take(&mut screen.banner).expire(id);
                if is_current {
                    screen.form = std::mem::take(&mut screen.form).clear_recognized();
                }
                Task::none()
            }
            other => {
                log::debug!("Discarding {:?} on the mark screen", other);
                Task::none()
            }
        }
    }

    fn update_register(&mut self, message: Message) -> Task<Message> {
        let surface = self.surface;
        let Screen::Register(screen) = &mut self.screen else {
            return Task::none();
        };

        match message {
            Message::StudentIdChanged(value) => {
                screen.form.student_id = value;
                Task::none()
            }
            Message::NameChanged(value) => {
                screen.form.name = value;
                Task::none()
            }
            Message::EmailChanged(value) => {
                screen.form.email = value;
                Task::none()
            }
            Message::CapturePhoto => match pick_image() {
                Some(path) => Task::perform(capture::load_frame(path), move |result| {
                    Message::PhotoCaptured(surface, result.map_err(|e| e.to_string()))
                }),
                None => Task::none(),
            },
            Message::PhotoCaptured(_, Ok(frame)) => {
                screen.form = std::mem::take(&mut screen.form).with_photo(frame);
                Task::none()
            }
            Message::PhotoCaptured(_, Err(e)) => {
                let (slot, id) = std::mem::take(&mut screen.banner).show(BannerKind::Error, e);
                screen.banner = slot;
                self.banner_timer(id)
            }
            Message::RetakePhoto => {
                screen.form = std::mem::take(&mut screen.form).retake();
                Task::none()
            }
            Message::SubmitRegistration => {
                let draft = screen.form.draft();
                let photo = screen.form.photo.clone();
                screen.form = std::mem::take(&mut screen.form).begin_submit();
                screen.banner = std::mem::take(&mut screen.banner).clear();

                let dispatcher = self.dispatcher.clone();
                Task::perform(
                    async move { dispatcher.register(draft, photo).await },
                    move |result| Message::Registered(surface, result),
                )
            }
            Message::Registered(_, result) => {
                screen.form = std::mem::take(&mut screen.form).submitted(&result);
                let (kind, text) = match result {
                    Ok(message) => (BannerKind::Success, message),
                    Err(message) => (BannerKind::Error, message),
                };
                let (slot, id) = std::mem::take(&mut screen.banner).show(kind, text);
                screen.banner = slot;
                self.banner_timer(id)
            }
            Message::BannerExpired(_, id) => {
                screen.banner = std::mem::take(&mut screen.banner).expire(id);
                Task::none()
            }
            other => {
                log::debug!("Discarding {:?} on the register screen", other);
                Task::none()
            }
        }
    }

    fn update_records(&mut self, message: Message) -> Task<Message> {
        let surface = self.surface;
        let backend = self.dispatcher.backend().clone();
        let Screen::Records(screen) = &mut self.screen else {
            return Task::none();
        };

        match message {
            Message::RecordsTabSelected(tab) => {
                screen.tab = tab;
                Task::none()
            }
            Message::DateInputChanged(value) => {
                let ticket = screen.date_typed(value, today());
                Self::fetch_if_due(backend, ticket)
            }
            Message::ShiftDate(days) => {
                let date = screen.view.selected_date() + ChronoDuration::days(days);
                let ticket = screen.date_picked(date, today());
                Self::fetch_if_due(backend, ticket)
            }
            Message::JumpToToday => {
                let ticket = screen.date_picked(today(), today());
                Self::fetch_if_due(backend, ticket)
            }
            Message::RecordsLoaded(ticket, result) => {
                screen.records_loaded(ticket, result);
                Task::none()
            }
            Message::RosterLoaded(_, result) => {
                screen.roster = std::mem::take(&mut screen.roster).loaded(result);
                Task::none()
            }
            Message::RequestDelete(student_id) => {
                screen.pending_delete = Some(student_id);
                Task::none()
            }
            Message::CancelDelete => {
                screen.pending_delete = None;
                Task::none()
            }
            Message::ConfirmDelete(student_id) => {
                screen.pending_delete = None;
                let dispatcher = self.dispatcher.clone();
                Task::perform(
                    async move { dispatcher.delete_student(student_id).await },
                    move |result| Message::Deleted(surface, result),
                )
            }
            Message::Deleted(_, result) => {
                // The roster refresh rides on the StudentDeleted event
                let (kind, text) = match result {
                    Ok(message) => (BannerKind::Success, message),
                    Err(message) => (BannerKind::Error, format!("Error deleting student: {}", message)),
                };
                let (slot, id) = std::mem::take(&mut screen.banner).show(kind, text);
                screen.banner = slot;
                self.banner_timer(id)
            }
            Message::ExportCsv => {
                let csv = match export::attendance_csv(screen.view.records()) {
                    Ok(csv) => csv,
                    Err(e) => {
                        log::error!("CSV export failed: {}", e);
                        let (slot, id) = std::mem::take(&mut screen.banner)
                            .show(BannerKind::Error, "Could not build the CSV export");
                        screen.banner = slot;
                        return self.banner_timer(id);
                    }
                };
                let date = screen.view.shown_date().unwrap_or(screen.view.selected_date());
                let destination = FileDialog::new()
                    .set_title("Export Attendance")
                    .set_file_name(export::export_file_name(date))
                    .add_filter("CSV", &["csv"])
                    .save_file();

                match destination {
                    Some(path) => Task::perform(export::write_csv(path, csv), move |result| {
                        Message::Exported(surface, result.map_err(|e| e.to_string()))
                    }),
                    None => Task::none(),
                }
            }
            Message::Exported(_, result) => {
                let (kind, text) = match result {
                    Ok(path) => (BannerKind::Success, format!("Exported to {}", path.display())),
                    Err(message) => (BannerKind::Error, message),
                };
                let (slot, id) = std::mem::take(&mut screen.banner).show(kind, text);
                screen.banner = slot;
                self.banner_timer(id)
            }
            Message::BannerExpired(_, id) => {
                screen.banner = std::mem::take(&mut screen.banner).expire(id);
                Task::none()
            }
            other => {
                log::debug!("Discarding {:?} on the records screen", other);
                Task::none()
            }
        }
    }

    /// Mutation events from the dispatcher, for as long as the app runs
    fn subscription(&self) -> Subscription<Message> {
        Subscription::run_with_id(
            "mutation-events",
            events::event_stream(self.dispatcher.events().subscribe()),
        )
        .map(Message::Mutated)
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let snapshot = self.stats.snapshot();
        let status = match self.online {
            Some(true) => text("● Online").color(ui::GREEN),
            Some(false) => text("● Offline").color(ui::RED),
            None => text("● Connecting").color(ui::MUTED),
        };

        let header = row![
            text("Smart Attendance System").size(24),
            iced::widget::horizontal_space(),
            status,
            text(format!("{} Present", snapshot.present)).color(ui::GREEN),
            text(format!("{} Absent", snapshot.absent)).color(ui::RED),
        ]
        .spacing(20)
        .align_y(Alignment::Center);

        let active = self.screen.tab();
        let sidebar = Tab::ALL.iter().fold(Column::new().spacing(8).width(Length::Fixed(200.0)), |nav, &tab| {
            nav.push(
                button(text(tab.label()))
                    .on_press(Message::TabSelected(tab))
                    .width(Length::Fill)
                    .padding(10)
                    .style(if tab == active { button::primary } else { button::secondary }),
            )
        });

        let content = match &self.screen {
            Screen::Dashboard(dashboard) => ui::dashboard::view(dashboard, &self.stats),
            Screen::Mark(screen) => ui::mark::view(screen),
            Screen::Register(screen) => ui::register::view(screen),
            Screen::Records(screen) => ui::records::view(screen),
        };

        container(
            column![
                header,
                row![sidebar, container(content).width(Length::Fill)].spacing(24),
            ]
            .spacing(24)
            .padding(24),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Show the native picker for a still frame
fn pick_image() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Select Snapshot")
        .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "webp"])
        .pick_file()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().unwrap_or_else(|e| {
        log::error!("{}; falling back to defaults", e);
        Config::default()
    });
    let backend = HttpBackend::new(config.api_base_url.clone(), config.request_timeout())?;

    iced::application(
        "Attendance Desk",
        AttendanceDesk::update,
        AttendanceDesk::view,
    )
    .subscription(AttendanceDesk::subscription)
    .theme(AttendanceDesk::theme)
    .centered()
    .run_with(move || AttendanceDesk::new(config, backend))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_from_closed_screen_are_rejected() {
        let mut surfaces = SurfaceIds::default();
        let closed = surfaces.issue();
        let reopened = surfaces.issue();

        let late = Message::Registered(closed, Ok("Student registered".into()));
        assert!(!late.belongs_to(reopened));
        assert!(late.belongs_to(closed));

        let marked = Message::AttendanceMarked(closed, Err("Failed to mark attendance".into()));
        assert!(!marked.belongs_to(reopened));
        assert!(!Message::BannerExpired(closed, 1).belongs_to(reopened));
    }

    #[test]
    fn test_records_ticket_routes_by_issuing_screen() {
        let mut surfaces = SurfaceIds::default();
        let closed = surfaces.issue();
        let reopened = surfaces.issue();
        let date = NaiveDate::from_ymd_opt(2026, 10, 10).unwrap();
        let ticket = Ticket { surface: closed, seq: 2, date };

        assert!(!Message::RecordsLoaded(ticket, Ok(Vec::new())).belongs_to(reopened));
    }

    #[test]
    fn test_input_and_app_wide_messages_always_apply() {
        let current = SurfaceIds::default().issue();

        assert!(Message::NameChanged("Alice".into()).belongs_to(current));
        assert!(Message::TabSelected(Tab::Records).belongs_to(current));
        assert!(Message::StatsLoaded(Ok(StatsSnapshot::default())).belongs_to(current));
        assert!(Message::Mutated(MutationEvent::StudentDeleted { student_id: "STU1".into() })
            .belongs_to(current));
    }
}
