//! Configuration traits.

use crate::error::ConfigError;

/// Trait for configuration types that can be validated.
///
/// ```rust
/// use pulse_core::config::Validatable;
/// use pulse_core::error::ConfigError;
///
/// struct Endpoint {
///     port: u16,
/// }
///
/// impl Validatable for Endpoint {
///     fn validate(&self) -> Result<(), ConfigError> {
///         if self.port == 0 {
///             return Err(ConfigError::invalid_value("port", "Port cannot be 0"));
///         }
///         Ok(())
///     }
/// }
///
/// assert!(Endpoint { port: 0 }.validate().is_err());
/// ```
pub trait Validatable {
    /// Returns `Ok(())` if the configuration is valid, or the first problem found.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Configuration that environment variables can override.
///
/// `prefix` names the variable family, e.g. `PULSE` reads `PULSE_SERVER_PORT`.
pub trait EnvOverridable {
    /// Applies `{prefix}_*` overrides in place.
    fn apply_env_overrides(&mut self, prefix: &str);
}
