//! CLI - Command Line Interface for WilTV
//!
//! Every browse action available in the TUI is scriptable. Output is
//! JSON-parseable with `--json` or when stdout is not a terminal.
//!
//! # Examples
//!
//! ```bash
//! # Sign in once; the session is remembered
//! wiltv login --access-code 4F7K2Q
//!
//! # Browse
//! wiltv catalogs -t movie
//! wiltv movies --catalog 12 --page 2
//! wiltv search "heat" --json
//!
//! # Play
//! wiltv play 381 --player mpv
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::api::ListFilter;
use crate::models::MediaType;
use crate::player::PlayerType;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error or unexpected server status
    NetworkError = 3,
    /// Not signed in, or re-login failed
    Unauthorized = 4,
    /// Title or resource not found
    NotFound = 5,
    /// Player could not be started
    PlayerFailed = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// WilTV - browse and stream the WilTV catalog from the terminal
///
/// Run without arguments to launch the interactive TUI.
/// Use subcommands for scriptable automation.
#[derive(Parser, Debug)]
#[command(
    name = "wiltv",
    version,
    about = "Browse and stream the WilTV catalog",
    long_about = "Terminal client for the WilTV streaming service.\n\n\
                  Run without arguments to launch the interactive TUI.\n\
                  Use subcommands for automation and scripting.",
    after_help = "EXAMPLES:\n\
                  wiltv                               Launch interactive TUI\n\
                  wiltv login --access-code 4F7K2Q    Sign in\n\
                  wiltv movies --hero                 Featured movies\n\
                  wiltv search \"heat\" --json          Search movies"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL (also WILTV_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with an access code or email and password
    Login(LoginCmd),

    /// Forget the stored session
    Logout,

    /// Show the signed-in customer
    Whoami,

    /// Exchange the session token for one scoped to another customer
    SwitchCustomer(SwitchCustomerCmd),

    /// List catalogs
    #[command(visible_alias = "cat")]
    Catalogs(TypeCmd),

    /// List genres
    Genres(TypeCmd),

    /// List movies (all, hero section, catalog or genre)
    #[command(visible_alias = "m")]
    Movies(ListCmd),

    /// List TV shows (all, hero section, catalog or genre)
    #[command(visible_alias = "tv")]
    Shows(ListCmd),

    /// Get details for a movie
    Movie(IdCmd),

    /// Get details for a TV show
    Show(IdCmd),

    /// Search titles
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// List streaming providers
    Providers(PageCmd),

    /// Authorize a push channel subscription
    ChannelAuth(ChannelAuthCmd),

    /// Play a title in a local player
    #[command(visible_alias = "p")]
    Play(PlayCmd),
}

// =============================================================================
// Account Commands
// =============================================================================

/// Sign in; pass either --access-code or --email with --password
#[derive(Args, Debug)]
pub struct LoginCmd {
    /// Device access code
    #[arg(long, short = 'a', conflicts_with_all = ["email", "password"])]
    pub access_code: Option<String>,

    /// Account email
    #[arg(long, short = 'e', requires = "password")]
    pub email: Option<String>,

    /// Account password
    #[arg(long, short = 'p', requires = "email")]
    pub password: Option<String>,
}

/// Parsed login method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginMethod<'a> {
    AccessCode(&'a str),
    Password { email: &'a str, password: &'a str },
}

impl LoginCmd {
    pub fn method(&self) -> Result<LoginMethod<'_>, &'static str> {
        match (&self.access_code, &self.email, &self.password) {
            (Some(code), None, None) if !code.trim().is_empty() => {
                Ok(LoginMethod::AccessCode(code.trim()))
            }
            (None, Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok(LoginMethod::Password { email, password })
            }
            _ => Err("Provide --access-code, or --email together with --password"),
        }
    }
}

// =============================================================================
// Browse Commands
// =============================================================================

/// Media type filter
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaTypeFilter {
    /// Movies
    #[default]
    Movie,
    /// TV shows
    Tv,
}

impl From<MediaTypeFilter> for MediaType {
    fn from(filter: MediaTypeFilter) -> Self {
        match filter {
            MediaTypeFilter::Movie => MediaType::Movie,
            MediaTypeFilter::Tv => MediaType::Tv,
        }
    }
}

/// Commands scoped to movies or TV
#[derive(Args, Debug)]
pub struct TypeCmd {
    /// Media type
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeFilter,
}

/// Paging options
#[derive(Args, Debug, Clone)]
pub struct PageCmd {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Items per page (defaults to config page_size)
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Fetch every page instead of one
    #[arg(long, conflicts_with = "page")]
    pub all: bool,
}

/// Title listing filters
#[derive(Args, Debug)]
pub struct ListCmd {
    /// Only featured (hero section) titles
    #[arg(long, conflicts_with_all = ["catalog", "genre"])]
    pub hero: bool,

    /// Titles in a catalog
    #[arg(long, conflicts_with = "genre")]
    pub catalog: Option<u64>,

    /// Titles in a genre
    #[arg(long)]
    pub genre: Option<u64>,

    #[command(flatten)]
    pub paging: PageCmd,
}

impl ListCmd {
    pub fn filter(&self) -> ListFilter {
        if self.hero {
            ListFilter::Hero
        } else if let Some(id) = self.catalog {
            ListFilter::Catalog(id)
        } else if let Some(id) = self.genre {
            ListFilter::Genre(id)
        } else {
            ListFilter::All
        }
    }
}

/// Single title lookup
#[derive(Args, Debug)]
pub struct IdCmd {
    /// Title ID
    #[arg(required = true)]
    pub id: u64,
}

/// Search titles by query
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search query
    #[arg(required = true)]
    pub query: String,

    /// Media type to search
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeFilter,

    #[command(flatten)]
    pub paging: PageCmd,
}

/// Switch to another customer on the same account
#[derive(Args, Debug)]
pub struct SwitchCustomerCmd {
    /// Customer ID
    #[arg(required = true)]
    pub customer_id: u64,
}

/// Authorize a push channel
#[derive(Args, Debug)]
pub struct ChannelAuthCmd {
    /// Socket ID assigned by the push service
    #[arg(required = true)]
    pub socket_id: String,

    /// Channel name, e.g. private-customer.42
    #[arg(required = true)]
    pub channel: String,
}

/// Play a movie or the first episode of a show
#[derive(Args, Debug)]
pub struct PlayCmd {
    /// Title ID
    #[arg(required = true)]
    pub id: u64,

    /// Media type of the ID
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeFilter,

    /// Episode ID (TV only; defaults to the first playable episode)
    #[arg(long, short = 'e')]
    pub episode: Option<u64>,

    /// Player to use (overrides config)
    #[arg(long, short = 'p', value_enum)]
    pub player: Option<PlayerType>,

    /// Return immediately instead of waiting for the player to exit
    #[arg(long)]
    pub detach: bool,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Status OK response
#[derive(Debug, Serialize)]
pub struct StatusOk {
    pub status: &'static str,
}

impl Default for StatusOk {
    fn default() -> Self {
        Self { status: "ok" }
    }
}

/// Paged listing output
#[derive(Debug, Serialize)]
pub struct PageOutput<T: Serialize> {
    pub page: u32,
    pub last_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    pub items: Vec<T>,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print a list: JSON when requested, otherwise one `Display` line per item
    pub fn print_list<T: Serialize + Display>(&self, items: &[T]) -> anyhow::Result<()> {
        if self.json {
            return self.print(items);
        }
        for item in items {
            println!("{}", item);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_args_is_tui_mode() {
        let cli = Cli::parse_from(["wiltv"]);
        assert!(!cli.is_cli_mode());
    }

    #[test]
    fn test_login_access_code() {
        let cli = Cli::parse_from(["wiltv", "login", "--access-code", "4F7K2Q"]);
        if let Some(Command::Login(cmd)) = cli.command {
            assert_eq!(cmd.method(), Ok(LoginMethod::AccessCode("4F7K2Q")));
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    fn test_login_password() {
        let cli = Cli::parse_from(["wiltv", "login", "-e", "ana@example.com", "-p", "secret"]);
        if let Some(Command::Login(cmd)) = cli.command {
            assert_eq!(
                cmd.method(),
                Ok(LoginMethod::Password {
                    email: "ana@example.com",
                    password: "secret"
                })
            );
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    fn test_login_rejects_mixed_methods() {
        let result = Cli::try_parse_from(["wiltv", "login", "-a", "X", "-e", "a@b.c", "-p", "pw"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_login_without_method() {
        let cmd = LoginCmd {
            access_code: None,
            email: None,
            password: None,
        };
        assert!(cmd.method().is_err());
    }

    #[test]
    fn test_movies_filters() {
        let cli = Cli::parse_from(["wiltv", "movies", "--catalog", "12", "--page", "3", "-l", "10"]);
        if let Some(Command::Movies(cmd)) = cli.command {
            assert_eq!(cmd.filter(), ListFilter::Catalog(12));
            assert_eq!(cmd.paging.page, 3);
            assert_eq!(cmd.paging.limit, Some(10));
        } else {
            panic!("Expected Movies command");
        }

        let cli = Cli::parse_from(["wiltv", "shows", "--hero"]);
        if let Some(Command::Shows(cmd)) = cli.command {
            assert_eq!(cmd.filter(), ListFilter::Hero);
        } else {
            panic!("Expected Shows command");
        }
    }

    #[test]
    fn test_hero_conflicts_with_genre() {
        assert!(Cli::try_parse_from(["wiltv", "movies", "--hero", "--genre", "3"]).is_err());
    }

    #[test]
    fn test_search_command() {
        let cli = Cli::parse_from(["wiltv", "--json", "search", "heat", "-t", "tv"]);
        assert!(cli.json);
        if let Some(Command::Search(cmd)) = cli.command {
            assert_eq!(cmd.query, "heat");
            assert_eq!(MediaType::from(cmd.media_type), MediaType::Tv);
            assert_eq!(cmd.paging.page, 1);
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_play_command() {
        let cli = Cli::parse_from(["wiltv", "play", "381", "-p", "mpv", "--detach"]);
        if let Some(Command::Play(cmd)) = cli.command {
            assert_eq!(cmd.id, 381);
            assert_eq!(cmd.player, Some(PlayerType::Mpv));
            assert!(cmd.detach);
        } else {
            panic!("Expected Play command");
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::Error), 1);
        assert_eq!(i32::from(ExitCode::InvalidArgs), 2);
        assert_eq!(i32::from(ExitCode::NetworkError), 3);
        assert_eq!(i32::from(ExitCode::Unauthorized), 4);
        assert_eq!(i32::from(ExitCode::NotFound), 5);
        assert_eq!(i32::from(ExitCode::PlayerFailed), 6);
    }
}
