//! # Pulse Core
//!
//! Core types shared by the Pulse signal server and its reconnecting client.
//!
//! This crate provides:
//! - The [`Signal`](types::Signal) wire model with its side and timeframe enums
//! - Process-unique, time-ordered signal identifiers
//! - The instrument catalog used for display names and synthetic prices
//! - Error types and severity classification
//! - Configuration loading (YAML/TOML/JSON), validation and environment overrides

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

/// Signal data model
pub mod types;

/// Instrument catalogs
pub mod catalog;

/// Error types and handling
pub mod error;

/// Configuration management
pub mod config;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::{Catalog, Instrument, InstrumentCatalog};
    pub use crate::error::{
        ConfigError, DeliveryError, NetworkError, PulseError, RegistryError, SignalError,
    };
    pub use crate::types::*;
}
