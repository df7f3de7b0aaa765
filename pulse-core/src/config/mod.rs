//! Configuration management module.
//!
//! This module provides the configuration system shared by the Pulse binaries:
//! - YAML, TOML and JSON configuration file formats
//! - Validation with path-qualified error messages
//! - Environment variable overrides
//!
//! # Example
//!
//! ```rust,ignore
//! use pulse_core::config::{ConfigLoader, PulseConfig};
//!
//! let config: PulseConfig = ConfigLoader::new()
//!     .with_env_prefix("PULSE")
//!     .load_file_with_env("pulse.yaml")?;
//! ```

mod loader;
mod pulse_config;
mod traits;
pub mod validation;

pub use loader::{ConfigFormat, ConfigLoader};
pub use pulse_config::{ListenConfig, LoggingConfig, PulseConfig};
pub use traits::{EnvOverridable, Validatable};
pub use validation::{EnvOverride, ValidationContext, ValidationResult, Validator};
