//! Configuration validation utilities.

use crate::error::ConfigError;

/// Result type for validation operations.
pub type ValidationResult = Result<(), ConfigError>;

/// Context for validation operations.
///
/// Tracks the current path in the configuration tree (e.g. `generator.probability`)
/// and collects every error found along the way.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    path: Vec<String>,
    errors: Vec<ConfigError>,
}

impl ValidationContext {
    /// Creates a new validation context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a new section in the configuration.
    pub fn enter(&mut self, section: impl Into<String>) {
        self.path.push(section.into());
    }

    /// Exits the current section.
    pub fn exit(&mut self) {
        self.path.pop();
    }

    /// Returns the current path as a dot-separated string.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.path.join(".")
    }

    /// Adds a validation error.
    pub fn add_error(&mut self, error: ConfigError) {
        self.errors.push(error);
    }

    /// Returns true if there are no validation errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the collected validation errors.
    #[must_use]
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// Consumes the context and returns the first error, if any.
    pub fn into_result(self) -> ValidationResult {
        self.errors.into_iter().next().map_or(Ok(()), Err)
    }

    /// Creates a missing field error with the current path context.
    #[must_use]
    pub fn missing_field(&self, field: impl Into<String>) -> ConfigError {
        let section = if self.path.is_empty() {
            None
        } else {
            Some(self.current_path())
        };
        ConfigError::MissingField {
            field: field.into(),
            section,
        }
    }

    /// Creates an invalid value error with the current path context.
    #[must_use]
    pub fn invalid_value(&self, field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
        let field_name = field.into();
        let full_field = if self.path.is_empty() {
            field_name
        } else {
            format!("{}.{}", self.current_path(), field_name)
        };
        ConfigError::InvalidValue {
            field: full_field,
            reason: reason.into(),
        }
    }
}

/// Fluent validator over a [`ValidationContext`].
#[derive(Debug)]
pub struct Validator<'a> {
    ctx: &'a mut ValidationContext,
}

impl<'a> Validator<'a> {
    /// Creates a new validator with the given context.
    pub fn new(ctx: &'a mut ValidationContext) -> Self {
        Self { ctx }
    }

    /// Validates that a string field is not empty.
    pub fn require_non_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.ctx.add_error(self.ctx.missing_field(field));
        }
        self
    }

    /// Validates that a value is within an inclusive range. NaN never is.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn in_range<T: PartialOrd + std::fmt::Display>(
        &mut self,
        field: &str,
        value: &T,
        min: &T,
        max: &T,
    ) -> &mut Self {
        if !(value >= min && value <= max) {
            self.ctx.add_error(self.ctx.invalid_value(
                field,
                format!("Value {value} must be between {min} and {max}"),
            ));
        }
        self
    }

    /// Validates that a value is strictly positive.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn positive<T: PartialOrd + Default + std::fmt::Display>(
        &mut self,
        field: &str,
        value: &T,
    ) -> &mut Self {
        if !(*value > T::default()) {
            self.ctx.add_error(
                self.ctx
                    .invalid_value(field, format!("Value {value} must be positive")),
            );
        }
        self
    }

    /// Validates using a custom predicate.
    pub fn custom<F>(&mut self, field: &str, predicate: F, error_msg: &str) -> &mut Self
    where
        F: FnOnce() -> bool,
    {
        if !predicate() {
            self.ctx.add_error(self.ctx.invalid_value(field, error_msg));
        }
        self
    }

    /// Validates a WebSocket URL.
    pub fn valid_ws_url(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.starts_with("ws://") && !value.starts_with("wss://") {
            self.ctx.add_error(
                self.ctx
                    .invalid_value(field, "Must be a WebSocket URL (ws:// or wss://)"),
            );
        }
        self
    }

    /// Returns the first error collected so far, if any.
    pub fn result(&self) -> ValidationResult {
        self.ctx.errors().first().cloned().map_or(Ok(()), Err)
    }
}

/// Environment variable helper for applying overrides.
///
/// Unset variables and unparseable values leave the target untouched.
///
/// ```rust
/// use pulse_core::config::EnvOverride;
///
/// let mut port = 8080_u16;
/// EnvOverride::apply_number("PULSE_DOC_UNSET_PORT", &mut port);
/// assert_eq!(port, 8080);
/// ```
pub struct EnvOverride;

impl EnvOverride {
    /// Applies an override to a string value.
    pub fn apply_string(var_name: &str, target: &mut String) {
        if let Ok(value) = std::env::var(var_name) {
            *target = value;
        }
    }

    /// Applies an override to an optional string value.
    pub fn apply_optional_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(value) = std::env::var(var_name) {
            *target = Some(value);
        }
    }

    /// Applies an override to a numeric value.
    pub fn apply_number<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Some(parsed) = std::env::var(var_name).ok().and_then(|v| v.parse().ok()) {
            *target = parsed;
        }
    }

    /// Applies an override to an optional numeric value.
    pub fn apply_optional_number<T: std::str::FromStr>(var_name: &str, target: &mut Option<T>) {
        if let Some(parsed) = std::env::var(var_name).ok().and_then(|v| v.parse().ok()) {
            *target = Some(parsed);
        }
    }

    /// Applies an override to a boolean value.
    pub fn apply_bool(var_name: &str, target: &mut bool) {
        if let Ok(value) = std::env::var(var_name) {
            match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => *target = true,
                "false" | "0" | "no" | "off" => *target = false,
                _ => {}
            }
        }
    }
}
