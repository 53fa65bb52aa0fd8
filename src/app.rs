//! Application state management for the UMD course browser
//!
//! This module contains the main application state, handling keyboard input,
//! data loading, and state transitions between the course list and detail views.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::{CourseCatalogClient, CourseRecord, FixtureStatus};
use crate::display::process_course;
use crate::settings::{MockModeSource, SettingsStore};

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while fetching data
    Loading,
    /// List view showing the course page
    CourseList,
    /// Detail view for a specific course id
    CourseDetail(String),
}

/// What a key press asks for; its effect depends on the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Open,
    Top,
    Back,
    Quit,
    Reload,
    ToggleMock,
    Help,
}

/// Heading a binding is listed under in the help overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGroup {
    Navigation,
    Data,
}

/// One row of the key map
#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    pub codes: &'static [KeyCode],
    /// How the keys are written in the help overlay
    pub label: &'static str,
    pub action: Action,
    pub group: KeyGroup,
    pub description: &'static str,
}

/// Every key the browser reacts to
pub const KEY_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        codes: &[KeyCode::Up, KeyCode::Char('k')],
        label: "↑/k",
        action: Action::Up,
        group: KeyGroup::Navigation,
        description: "Previous course / scroll up",
    },
    KeyBinding {
        codes: &[KeyCode::Down, KeyCode::Char('j')],
        label: "↓/j",
        action: Action::Down,
        group: KeyGroup::Navigation,
        description: "Next course / scroll down",
    },
    KeyBinding {
        codes: &[KeyCode::Enter],
        label: "Enter",
        action: Action::Open,
        group: KeyGroup::Navigation,
        description: "Open course details",
    },
    KeyBinding {
        codes: &[KeyCode::Char('g')],
        label: "g",
        action: Action::Top,
        group: KeyGroup::Navigation,
        description: "Back to the top of the details",
    },
    KeyBinding {
        codes: &[KeyCode::Esc],
        label: "Esc",
        action: Action::Back,
        group: KeyGroup::Navigation,
        description: "Back to the list / quit from the list",
    },
    KeyBinding {
        codes: &[KeyCode::Char('q')],
        label: "q",
        action: Action::Quit,
        group: KeyGroup::Navigation,
        description: "Quit",
    },
    KeyBinding {
        codes: &[KeyCode::Char('r')],
        label: "r",
        action: Action::Reload,
        group: KeyGroup::Data,
        description: "Reload courses",
    },
    KeyBinding {
        codes: &[KeyCode::Char('m')],
        label: "m",
        action: Action::ToggleMock,
        group: KeyGroup::Data,
        description: "Toggle mock mode (fixture data)",
    },
    KeyBinding {
        codes: &[KeyCode::Char('?')],
        label: "?",
        action: Action::Help,
        group: KeyGroup::Data,
        description: "Show or hide this help",
    },
];

/// Looks up the action bound to a key
pub fn action_for(code: KeyCode) -> Option<Action> {
    KEY_BINDINGS
        .iter()
        .find(|binding| binding.codes.contains(&code))
        .map(|binding| binding.action)
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Index of currently selected course in list view
    pub selected_index: usize,
    /// Courses on the page, already flattened for display
    pub courses: Vec<CourseRecord>,
    /// Single-course lookups keyed by course id; `None` means the lookup failed
    pub course_details: HashMap<String, Option<CourseRecord>>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating a reload has been requested
    pub refresh_requested: bool,
    /// Flag indicating the mock-mode setting should be flipped
    pub mock_toggle_requested: bool,
    /// Course id whose detail still has to be fetched
    pub pending_detail: Option<String>,
    /// Timestamp of last data load
    pub last_refresh: Option<DateTime<Local>>,
    /// One-line message shown in the footer
    pub status_message: Option<String>,
    /// Scroll offset for course detail view
    pub detail_scroll_offset: u16,
    /// Fixture state as of the last load
    pub fixture_status: FixtureStatus,
    /// Course catalog client
    client: CourseCatalogClient,
    /// Persisted settings, when a config directory is available
    settings: Option<Arc<SettingsStore>>,
    /// Number of courses requested per load
    limit: u32,
}

impl App {
    /// Creates a new App around a configured client
    pub fn new(client: CourseCatalogClient, settings: Option<Arc<SettingsStore>>, limit: u32) -> Self {
        Self {
            state: AppState::Loading,
            selected_index: 0,
            courses: Vec::new(),
            course_details: HashMap::new(),
            should_quit: false,
            show_help: false,
            refresh_requested: false,
            mock_toggle_requested: false,
            pending_detail: None,
            last_refresh: None,
            status_message: None,
            detail_scroll_offset: 0,
            fixture_status: FixtureStatus::Inactive,
            client,
            settings,
            limit,
        }
    }

    /// Returns the number of courses on the page
    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    /// Returns the currently selected course, if any
    pub fn selected_course(&self) -> Option<&CourseRecord> {
        self.courses.get(self.selected_index)
    }

    /// Whether the last load ran with mock mode on
    pub fn is_mock_mode_enabled(&self) -> bool {
        self.fixture_status.is_mock()
    }

    /// Why the last load could not use the fixture, and what it showed instead
    pub fn fixture_notice(&self) -> Option<String> {
        self.fixture_status.notice()
    }

    /// Returns the fetched detail for a course id, if it has been loaded
    pub fn course_detail(&self, course_id: &str) -> Option<&Option<CourseRecord>> {
        self.course_details.get(course_id)
    }

    /// Loads the course page and transitions to the list view
    pub async fn load_courses(&mut self) {
        let courses = self.client.fetch_courses(self.limit).await;
        self.fixture_status = self.client.fixture_status();
        tracing::info!(count = courses.len(), "course page loaded");

        self.courses = courses.iter().map(process_course).collect();
        if self.selected_index >= self.courses.len() {
            self.selected_index = 0;
        }
        self.last_refresh = Some(Local::now());
        self.status_message = if self.courses.is_empty() {
            Some("No courses available. Check the log for details.".to_string())
        } else {
            None
        };

        if self.state == AppState::Loading {
            self.state = AppState::CourseList;
        }
    }

    /// Fetches the detail for the pending course id, if any
    pub async fn load_pending_detail(&mut self) {
        let Some(course_id) = self.pending_detail.take() else {
            return;
        };
        let course = self.client.fetch_course(&course_id).await;
        self.course_details.insert(course_id, course);
    }

    /// Runs whatever async work key handling has queued up
    pub async fn process_pending(&mut self) {
        if self.mock_toggle_requested {
            self.mock_toggle_requested = false;
            self.toggle_mock_mode();
            self.refresh_requested = true;
        }
        if self.refresh_requested {
            self.refresh_requested = false;
            self.course_details.clear();
            self.load_courses().await;
        }
        self.load_pending_detail().await;
    }

    /// Flips the persisted mock-mode flag; cache entries are left alone
    fn toggle_mock_mode(&mut self) {
        let Some(settings) = &self.settings else {
            self.status_message = Some("Settings are unavailable: no config directory".to_string());
            return;
        };

        let enabled = !settings.is_enabled();
        match settings.set_mock_mode(enabled) {
            Ok(()) => {
                self.status_message = Some(if enabled {
                    "Mock mode enabled".to_string()
                } else {
                    "Mock mode disabled".to_string()
                });
            }
            Err(err) => {
                tracing::warn!("failed to save settings: {}", err);
                self.status_message = Some(format!("Failed to save settings: {}", err));
            }
        }
    }

    /// Handles keyboard input based on current state
    ///
    /// Keys are resolved through `KEY_BINDINGS`. While the help overlay is
    /// open, `Esc`, `?` and `q` only close it. During loading only `q` works.
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        let Some(action) = action_for(key_event.code) else {
            return;
        };

        if self.show_help {
            if matches!(action, Action::Back | Action::Help | Action::Quit) {
                self.show_help = false;
            }
            return;
        }

        let view = self.state.clone();
        match (view, action) {
            (AppState::Loading, Action::Quit) => self.should_quit = true,
            (AppState::Loading, _) => {}
            (_, Action::Quit) | (AppState::CourseList, Action::Back) => {
                self.should_quit = true;
            }
            (_, Action::Help) => self.show_help = true,
            (AppState::CourseList, Action::Up) => self.move_selection_up(),
            (AppState::CourseList, Action::Down) => self.move_selection_down(),
            (AppState::CourseList, Action::Open) => self.open_selected(),
            (AppState::CourseList, Action::Reload) => self.refresh_requested = true,
            (AppState::CourseList, Action::ToggleMock) => self.mock_toggle_requested = true,
            (AppState::CourseDetail(_), Action::Back) => {
                self.detail_scroll_offset = 0;
                self.state = AppState::CourseList;
            }
            (AppState::CourseDetail(_), Action::Down) => {
                self.detail_scroll_offset = self.detail_scroll_offset.saturating_add(1);
            }
            (AppState::CourseDetail(_), Action::Up) => {
                self.detail_scroll_offset = self.detail_scroll_offset.saturating_sub(1);
            }
            (AppState::CourseDetail(_), Action::Top) => self.detail_scroll_offset = 0,
            _ => {}
        }
    }

    /// Switches to the detail view of the selected course, queueing a lookup
    /// unless one is already stored
    fn open_selected(&mut self) {
        let Some(course_id) = self.selected_course().and_then(course_id_of) else {
            return;
        };
        if !self.course_details.contains_key(&course_id) {
            self.pending_detail = Some(course_id.clone());
        }
        self.detail_scroll_offset = 0;
        self.state = AppState::CourseDetail(course_id);
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.course_count();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.course_count();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }
}

/// Extracts the `course_id` field of a record as a string
pub fn course_id_of(course: &CourseRecord) -> Option<String> {
    match course.get("course_id")? {
        serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
