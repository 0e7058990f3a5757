//! Terminal client for a password-protected WebSocket log stream.
//!
//! The binary in `main.rs` wires these modules to stdin/stdout; tests drive
//! [`client::LogStreamClient`] against an in-memory view.

pub mod client;
pub mod config;
pub mod error;
pub mod log_entry;
pub mod protocol;
pub mod status;
pub mod transport;
pub mod view;

pub use client::LogStreamClient;
pub use error::{ClientError, Result};
