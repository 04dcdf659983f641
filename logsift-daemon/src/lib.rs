//! logsift daemon library.
//!
//! Exposes the HTTP router and startup helpers for integration testing.
//! In production, `logsift-daemon` is used as a binary (main.rs).

pub mod cli;
pub mod error;
pub mod health;
pub mod logging;
pub mod metrics_server;
pub mod server;
