//! WilTV REST API
//!
//! - client: authenticated transport with one-shot re-login on 401
//! - auth: login, token exchange, customer profile, channel authorization
//! - catalog: catalogs, genres, titles, search, streaming providers

pub mod auth;
pub mod catalog;
pub mod client;

pub use auth::ChannelAuth;
pub use catalog::ListFilter;
pub use client::{ApiClient, ApiError, ApiRequest, DEFAULT_BASE_URL};
