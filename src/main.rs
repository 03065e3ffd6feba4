mod app;
mod cli;
mod config;
mod datasources;
mod db;
mod error;
mod logic;
mod models;
mod state;
mod ui;

use anyhow::{bail, Context};
use app::{App, Screen};
use clap::Parser;
use cli::{Cli, Commands, ScoreArgs};
use config::Config;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use datasources::HttpBackend;
use db::Database;
use logic::{compute_score, score_breakdown, DashboardSnapshot, OperationCoordinator, Outcome};
use models::{seed_history, SensorField, ThemePreference};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use state::{NotificationCenter, SensorStore};
use std::fs::OpenOptions;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ui::screens::{DiseaseScreen, OverviewScreen, RecommendScreen, ScoreScreen, SensorsScreen};
use ui::Theme;

type Coordinator = OperationCoordinator<HttpBackend>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // The dashboard owns the terminal, so its logs go to a file
    init_logging(&cli, cli.command.is_none())?;

    match &cli.command {
        Some(Commands::Init) => {
            Config::setup_interactive().context("Interactive setup failed")?;
            return Ok(());
        }
        Some(Commands::Check) => {
            let config = load_config(&cli)?;
            return run_check(&config).await;
        }
        Some(Commands::Score(args)) => {
            let config = load_config(&cli)?;
            run_score(&config, args);
            return Ok(());
        }
        None => {}
    }

    let config = load_config(&cli)?;

    // Theme preference
    let db_path = Config::db_path(cli.data_dir.as_ref())?;
    let db = Database::open(&db_path)
        .with_context(|| format!("Failed to open settings database at {}", db_path.display()))?;
    tracing::debug!(path = %db.path().display(), "Opened settings database");
    let theme = db.load_theme().unwrap_or_else(|e| {
        tracing::warn!("Failed to read theme preference: {}", e);
        ThemePreference::default()
    });

    // Orchestration core
    let backend = HttpBackend::new(&config.backend).context("Failed to build HTTP client")?;
    let sensors = SensorStore::new(config.initial_reading(), seed_history())
        .with_history_limit(config.history.limit);
    let notifications = NotificationCenter::new(config.notifications.ttl());
    let coordinator = Arc::new(
        OperationCoordinator::new(backend, sensors, notifications)
            .adopt_latest_reading(config.history.adopt_latest_reading),
    );

    let mut app = App::new(db, theme);

    // Initial history load
    spawn_operation(&coordinator, |c| async move { c.fetch_history().await });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, &coordinator).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(cli: &Cli, to_file: bool) -> anyhow::Result<()> {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if to_file {
        let log_path = Config::log_path(cli.data_dir.as_ref())?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match Config::load(cli.config.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Run `agriscore init` to create a config file");
            std::process::exit(1);
        }
    };

    if let Some(url) = &cli.base_url {
        config.backend.base_url = url.clone();
        config.validate().context("Invalid --base-url")?;
    }

    Ok(config)
}

async fn run_check(config: &Config) -> anyhow::Result<()> {
    let backend = HttpBackend::new(&config.backend)?;

    println!("Configuration OK");
    println!("  Backend:       {}", backend.base_url());
    println!(
        "  Toast TTL:     {} ms",
        config.notifications.ttl().as_millis()
    );
    match config.history.limit {
        Some(limit) => println!("  History limit: {}", limit),
        None => println!("  History limit: unbounded"),
    }

    match backend.test_connection().await {
        Ok(true) => {
            println!("  GET /sensor-data: OK");
            Ok(())
        }
        Ok(false) => bail!("GET /sensor-data returned an error status"),
        Err(e) => bail!("GET /sensor-data: {}", e),
    }
}

fn run_score(config: &Config, args: &ScoreArgs) {
    let mut reading = config.initial_reading();
    let overrides = [
        (SensorField::N, args.n),
        (SensorField::P, args.p),
        (SensorField::K, args.k),
        (SensorField::Temp, args.temp),
        (SensorField::Humidity, args.humidity),
        (SensorField::Ph, args.ph),
        (SensorField::Rainfall, args.rainfall),
    ];
    for (field, value) in overrides {
        if let Some(v) = value {
            reading.set(field, v);
        }
    }

    println!("AgriScore: {}", compute_score(&reading));
    println!();
    println!("{:<14}{:>10}{:>9}", "Factor", "Sub-score", "Points");
    for (label, sub, points) in score_breakdown(&reading).contributions() {
        println!("{:<14}{:>9.0}%{:>9.1}", label, sub * 100.0, points);
    }
}

/// Run a coordinator operation in the background and log how it ended.
fn spawn_operation<F, Fut>(coordinator: &Arc<Coordinator>, op: F)
where
    F: FnOnce(Arc<Coordinator>) -> Fut,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    let fut = op(Arc::clone(coordinator));
    tokio::spawn(async move {
        let outcome = fut.await;
        if !outcome.is_completed() {
            tracing::debug!(?outcome, "operation did not complete");
        }
    });
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    coordinator: &Arc<Coordinator>,
) -> anyhow::Result<()> {
    loop {
        let snapshot = coordinator.snapshot().await;
        let palette = app.palette();

        terminal.draw(|f| draw(f, app, &snapshot, &palette))?;

        // Handle input with timeout so background results show up
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, coordinator, &snapshot, key).await;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, app: &App, snapshot: &DashboardSnapshot, palette: &Theme) {
    let area = f.area();
    match app.screen {
        Screen::Overview => f.render_widget(OverviewScreen::new(snapshot, palette), area),
        Screen::Sensors => {
            let screen = SensorsScreen::new(snapshot, palette)
                .with_focus(app.form.focused_field)
                .editing(app.form.editing, &app.form.edit_buffer);
            f.render_widget(screen, area);
        }
        Screen::Recommend => f.render_widget(RecommendScreen::new(snapshot, palette), area),
        Screen::Disease => {
            let screen = DiseaseScreen::new(snapshot, palette)
                .with_path(&app.upload.path, app.upload.editing);
            f.render_widget(screen, area);
        }
        Screen::Score => f.render_widget(ScoreScreen::new(snapshot, palette), area),
    }
}

async fn handle_key(
    app: &mut App,
    coordinator: &Arc<Coordinator>,
    snapshot: &DashboardSnapshot,
    key: KeyEvent,
) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if !app.is_editing() {
        match key.code {
            KeyCode::Char('q') => {
                app.quit();
                return;
            }
            KeyCode::Esc => {
                app.switch_screen(Screen::Overview);
                return;
            }
            KeyCode::Char('t') => {
                app.toggle_theme();
                return;
            }
            KeyCode::Char('x') if snapshot.notification.is_some() => {
                coordinator.notifications().clear().await;
                return;
            }
            KeyCode::Char(c) => {
                if let Some(screen) = Screen::from_key(c) {
                    app.switch_screen(screen);
                    return;
                }
            }
            _ => {}
        }
    }

    match app.screen {
        Screen::Sensors => handle_sensors_input(app, coordinator, snapshot, key.code).await,
        Screen::Recommend => handle_recommend_input(coordinator, snapshot, key.code),
        Screen::Disease => handle_disease_input(app, coordinator, snapshot, key.code),
        Screen::Overview | Screen::Score => {}
    }
}

async fn handle_sensors_input(
    app: &mut App,
    coordinator: &Arc<Coordinator>,
    snapshot: &DashboardSnapshot,
    code: KeyCode,
) {
    if app.form.editing {
        match code {
            KeyCode::Esc => app.form.cancel_editing(),
            KeyCode::Enter => {
                let (field, value) = app.form.finish_editing();
                coordinator.set_field(field, value).await;
            }
            KeyCode::Backspace => {
                app.form.edit_buffer.pop();
            }
            KeyCode::Char(c) => app.form.edit_buffer.push(c),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Up => app.form.prev_field(),
        KeyCode::Down | KeyCode::Tab => app.form.next_field(),
        KeyCode::Enter if !snapshot.busy => {
            let current = snapshot.reading.get(app.form.focused_field);
            app.form.start_editing(current);
        }
        KeyCode::Char('s') if !snapshot.busy => {
            spawn_operation(coordinator, |c| async move { c.persist_reading().await });
        }
        _ => {}
    }
}

fn handle_recommend_input(
    coordinator: &Arc<Coordinator>,
    snapshot: &DashboardSnapshot,
    code: KeyCode,
) {
    if code == KeyCode::Char('r') && !snapshot.busy {
        spawn_operation(coordinator, |c| async move { c.recommend_crops().await });
    }
}

fn handle_disease_input(
    app: &mut App,
    coordinator: &Arc<Coordinator>,
    snapshot: &DashboardSnapshot,
    code: KeyCode,
) {
    if app.upload.editing {
        match code {
            KeyCode::Esc => app.upload.cancel_editing(),
            KeyCode::Enter => app.upload.finish_editing(),
            KeyCode::Backspace => {
                app.upload.path.pop();
            }
            KeyCode::Char(c) => app.upload.path.push(c),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Enter if !snapshot.busy => app.upload.start_editing(),
        // The snapshot may be a frame old; ask the live flag too
        KeyCode::Char('u') if !snapshot.busy && !coordinator.is_busy() => {
            let path = app.upload.selected().map(PathBuf::from);
            spawn_operation(coordinator, |c| async move {
                c.detect_disease_from_path(path).await
            });
        }
        _ => {}
    }
}
