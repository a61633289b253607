//! WilTV - terminal client for the WilTV streaming service
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! wiltv
//!
//! # CLI mode (for automation)
//! wiltv login --access-code 4F7K2Q
//! wiltv movies --hero --json
//! wiltv play 381 --player mpv
//! ```

use std::fs::OpenOptions;
use std::io::{stdout, Stdout};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wiltv::app::{App, AppMessage};
use wiltv::cli::{Cli, Command, ExitCode, Output};
use wiltv::commands;
use wiltv::config::Config;
use wiltv::session::Session;
use wiltv::ui;
use wiltv::worker::{self, WorkerSettings};

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Environment variable holding the tracing filter
const LOG_ENV: &str = "WILTV_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_cli_mode() {
        init_logging(false);
        let exit_code = run_cli(cli).await;
        std::process::exit(exit_code.into());
    }

    init_logging(true);
    let config = load_config(&cli)?;
    run_tui(&config).await
}

/// Log to stderr for CLI runs; the TUI owns the terminal so it logs to a file
fn init_logging(to_file: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let log_file = to_file
        .then(|| dirs::data_dir().map(|d| d.join("wiltv")))
        .flatten()
        .and_then(|dir| {
            std::fs::create_dir_all(&dir).ok()?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("wiltv.log"))
                .ok()
        });

    let installed = match log_file {
        Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
        None if to_file => builder.with_writer(std::io::sink).try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    if let Err(e) = installed {
        eprintln!("wiltv: logging disabled: {}", e);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    Ok(config)
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => return output.error(format!("Invalid config: {:#}", e), ExitCode::InvalidArgs),
    };
    let client = match commands::connect(&config) {
        Ok(client) => client,
        Err(e) => return output.error(format!("Session unavailable: {:#}", e), ExitCode::Error),
    };

    match cli.command {
        Some(Command::Login(cmd)) => commands::login_cmd(cmd, &client, &output).await,
        Some(Command::Logout) => commands::logout_cmd(&client, &output),
        Some(Command::Whoami) => commands::whoami_cmd(&client, &output).await,
        Some(Command::SwitchCustomer(cmd)) => {
            commands::switch_customer_cmd(cmd, &client, &output).await
        }
        Some(Command::Catalogs(cmd)) => commands::catalogs_cmd(cmd, &client, &output).await,
        Some(Command::Genres(cmd)) => commands::genres_cmd(cmd, &client, &output).await,
        Some(Command::Movies(cmd)) => commands::movies_cmd(cmd, &client, &config, &output).await,
        Some(Command::Shows(cmd)) => commands::shows_cmd(cmd, &client, &config, &output).await,
        Some(Command::Movie(cmd)) => commands::movie_cmd(cmd, &client, &output).await,
        Some(Command::Show(cmd)) => commands::show_cmd(cmd, &client, &output).await,
        Some(Command::Search(cmd)) => commands::search_cmd(cmd, &client, &config, &output).await,
        Some(Command::Providers(cmd)) => {
            commands::providers_cmd(cmd, &client, &config, &output).await
        }
        Some(Command::ChannelAuth(cmd)) => commands::channel_auth_cmd(cmd, &client, &output).await,
        Some(Command::Play(cmd)) => commands::play_cmd(cmd, &client, &config, &output).await,
        None => ExitCode::Success,
    }
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run interactive TUI
async fn run_tui(config: &Config) -> Result<()> {
    let client = commands::connect(config).context("open session")?;
    let session = client.session().snapshot();
    info!(api = client.base_url(), signed_in = session.is_authenticated(), "starting TUI");

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (message_tx, mut message_rx) = mpsc::unbounded_channel();
    let settings = WorkerSettings {
        page_size: config.page_size,
        player: config.player,
    };
    let worker = tokio::spawn(worker::run(client.clone(), settings, command_rx, message_tx));

    let mut app = App::new()
        .with_commands(command_tx)
        .with_focus_settings(config.focus.settings());
    app.start(session.is_authenticated(), session.customer_name.clone());

    let mut terminal = init_terminal()?;
    let mut session_rx = client.session().subscribe();
    let result = run_event_loop(&mut terminal, &mut app, &mut message_rx, &mut session_rx).await;

    // Always restore terminal, even on error
    restore_terminal(&mut terminal)?;
    worker.abort();

    result
}

/// Main event loop - handles input, applies worker results, renders UI
async fn run_event_loop(
    terminal: &mut Tui,
    app: &mut App,
    messages: &mut UnboundedReceiver<AppMessage>,
    session: &mut tokio::sync::watch::Receiver<Session>,
) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(100);

    while app.running {
        let width = terminal.size()?.width;
        app.home.visible_items = ui::home::visible_cards(width.saturating_sub(2));
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (ignore releases on Windows)
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        while let Ok(message) = messages.try_recv() {
            app.handle_message(message);
        }

        match session.has_changed() {
            Ok(true) => {
                let current = session.borrow_and_update().clone();
                if app.customer_name.is_some() || current.is_authenticated() {
                    app.customer_name = current.customer_name.clone().or(current.email.clone());
                }
            }
            Ok(false) => {}
            Err(_) => warn!("session store dropped"),
        }

        app.settle_focus().await;
    }

    Ok(())
}
