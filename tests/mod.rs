//! Integration tests for WilTV
//!
//! Tests are organized by component:
//! - client_test: token attachment, re-login retry on 401, error mapping
//! - catalog_test: catalog, genre, title, search and provider fetchers
//! - paging_test: pager walking and streaming
//! - session_test: session persistence, logout, change notification
//! - focus_test: focus restoration against a scripted grid
//! - cli_test: argument parsing, exit codes, JSON output
//! - ui_test: screen rendering and theme
//! - app_flow_test: key presses through the worker to a mock server

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
