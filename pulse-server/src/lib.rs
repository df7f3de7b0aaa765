//! # Pulse Server
//!
//! Process entry point for the Pulse signal channel.
//!
//! This crate provides:
//! - Server configuration spanning every section of one config file
//! - Startup: logging, shared state, periodic ticker, HTTP/WebSocket server
//! - Graceful shutdown on SIGINT/SIGTERM

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod server;
pub mod shutdown;

pub use config::{ENV_PREFIX, ServerConfig, ShutdownConfig};
pub use server::{PulseServer, ServerError, ServerState};
pub use shutdown::ShutdownController;
