//! WilTV - terminal client for the WilTV streaming service
//!
//! Browse the catalog with a keyboard-driven grid, search titles and hand
//! streams to a local player. Every browse action is also scriptable from the
//! command line.
//!
//! # Modules
//!
//! - `session` - Persisted token and profile, observable through `watch`
//! - `api` - Authenticated REST client with one transparent re-login on 401
//! - `paging` - Laravel-style paginated listings as pages or streams
//! - `focus` - Grid focus memory and restoration
//! - `app` / `ui` / `worker` - Interactive TUI
//! - `cli` / `commands` - Scriptable subcommands

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod focus;
pub mod models;
pub mod paging;
pub mod player;
pub mod session;
pub mod ui;
pub mod worker;

// Re-export commonly used types
pub use models::{
    Catalog, Customer, Episode, Genre, MediaItem, MediaType, Movie, Season, StreamingProvider,
    TvShow,
};

pub use api::{ApiClient, ApiError, ListFilter};
pub use app::{App, AppCommand, AppMessage, AppState};
pub use config::Config;
pub use focus::{FocusHost, FocusOutcome, FocusPosition, FocusSettings, FocusTracker, RowKey};
pub use paging::{Page, PageQuery, Pager};
pub use session::{Credentials, Session, SessionError, SessionStore};
