//! UMD Courses - browse the University of Maryland course catalog
//!
//! A terminal UI application that lists courses from umd.io, caches responses
//! on disk, and can serve a local fixture instead of the live API.

use std::io;
use std::panic;
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use umdcourses::app::{App, AppState};
use umdcourses::cache::{CacheBackend, CacheManager, MemoryCache};
use umdcourses::catalog::{Collaborators, CourseCatalogClient};
use umdcourses::cli::{Cli, StartupConfig};
use umdcourses::display::field_text;
use umdcourses::settings::{MockModeSource, SettingsStore, StaticMockMode};
use umdcourses::ui;

const LOG_FILE_NAME: &str = "umdcourses.log";
const DEFAULT_LOG_FILTER: &str = "umdcourses=info,umd_courses=info";

/// Sends log output to a file in `dir`; stdout belongs to the terminal UI
fn init_logging(dir: &Path) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if std::fs::create_dir_all(dir).is_err() {
        return None;
    }
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let initialized = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init();

    initialized.ok().map(|_| guard)
}

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match &app.state {
        AppState::Loading => {
            render_loading(frame);
        }
        AppState::CourseList => {
            ui::render_course_list(frame, app);
        }
        AppState::CourseDetail(course_id) => {
            ui::render_course_detail(frame, app, course_id);
        }
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a loading message while data is being fetched
fn render_loading(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading courses...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Prints the course page as plain text
async fn print_courses(app: &mut App) {
    app.load_courses().await;

    if app.is_mock_mode_enabled() {
        match app.fixture_notice() {
            Some(notice) => println!("[MOCK MODE] {}", notice),
            None => println!("[MOCK DATA] Course data is served from the local fixture file"),
        }
    }

    if app.courses.is_empty() {
        println!("No courses to show.");
        return;
    }

    for course in &app.courses {
        println!(
            "{:<10} {:<50} {:>3}  {}",
            field_text(course, "course_id"),
            field_text(course, "name"),
            field_text(course, "credits"),
            field_text(course, "grading_method"),
        );
    }
}

async fn run_tui(mut app: App) -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Initial render to show loading state
    terminal.draw(|f| render_ui(f, &app))?;

    app.load_courses().await;

    // Main event loop
    loop {
        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }

        // Reloads, mock toggles and detail lookups queued by key handling
        app.process_pending().await;
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(2);
        }
    };

    let disk_cache = CacheManager::new();
    let _log_guard = disk_cache
        .as_ref()
        .and_then(|cache| init_logging(cache.cache_dir()));

    let settings = SettingsStore::new().map(Arc::new);
    if let Some(enabled) = config.set_mock_mode {
        match &settings {
            Some(store) => store.set_mock_mode(enabled)?,
            None => eprintln!("Warning: no config directory, mock mode setting not saved"),
        }
    }

    let mock_mode: Arc<dyn MockModeSource> = match &settings {
        Some(store) => store.clone(),
        None => Arc::new(StaticMockMode::new(config.set_mock_mode.unwrap_or(false))),
    };
    let cache: Arc<dyn CacheBackend> = match disk_cache {
        Some(cache) => Arc::new(cache),
        None => {
            tracing::warn!("no cache directory available, caching in memory");
            Arc::new(MemoryCache::new())
        }
    };

    let client = CourseCatalogClient::new(config.client, Collaborators::live(cache, mock_mode));
    let mut app = App::new(client, settings, config.limit);

    if config.list_only {
        print_courses(&mut app).await;
        return Ok(());
    }

    run_tui(app).await
}
