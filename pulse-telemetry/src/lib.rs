//! # Pulse Telemetry
//!
//! Logging and tracing for the Pulse signal server and client.
//!
//! This crate provides:
//! - Structured logging with JSON and pretty formats
//! - Rolling log files via `tracing-appender`
//! - Span constructors for connections, broadcasts and client sessions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

/// Logging configuration and initialization
pub mod logging;

/// Span definitions
pub mod spans;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::logging::{LogConfig, LogFormat, LogOutput, LoggingError, init_logging};
    pub use crate::spans::*;
}
