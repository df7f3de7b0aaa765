//! Signal production.
//!
//! Two entry points:
//! - [`SignalGenerator::from_request`] validates caller-supplied fields and
//!   builds a signal immediately.
//! - [`SignalGenerator::tick`] is called once per scheduling period and, behind
//!   a probabilistic gate, fabricates a signal from the instrument catalog.
//!
//! The periodic gate is a demo stub. It has no market semantics: it only keeps
//! connected listeners receiving occasional traffic.

use pulse_core::catalog::Catalog;
use pulse_core::config::{EnvOverride, ValidationContext, Validator};
use pulse_core::error::SignalError;
use pulse_core::types::{Signal, SignalSide, Timeframe};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ws::ConnectionRegistry;

/// Status stamped on freshly produced signals.
pub const ACTIVE_STATUS: &str = "active";

/// Source of randomness for the periodic generator.
pub trait RandomSource: Send {
    /// Returns a value uniformly distributed in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Returns an index uniformly distributed in `0..len`. `len` is never 0.
    fn next_index(&mut self, len: usize) -> usize;
}

/// [`RandomSource`] backed by `StdRng`.
#[derive(Debug)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Seeds from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeds deterministically.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Periodic generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Scheduling period in seconds
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Probability that a tick emits a signal
    #[serde(default = "default_probability")]
    pub probability: f64,

    /// Maximum price deviation from the base price, in percent
    #[serde(default = "default_jitter_percent")]
    pub jitter_percent: f64,

    /// Fixed RNG seed; entropy-seeded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_tick_interval_secs() -> u64 {
    30
}

fn default_probability() -> f64 {
    0.2
}

fn default_jitter_percent() -> f64 {
    0.5
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            probability: default_probability(),
            jitter_percent: default_jitter_percent(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Returns the scheduling period.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    /// Validates the section against `ctx`.
    pub fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .positive("tick_interval_secs", &self.tick_interval_secs)
            .in_range("probability", &self.probability, &0.0, &1.0)
            .in_range("jitter_percent", &self.jitter_percent, &0.0, &50.0);
    }

    /// Applies `{prefix}_*` environment overrides.
    pub fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_number(
            &format!("{prefix}_TICK_INTERVAL_SECS"),
            &mut self.tick_interval_secs,
        );
        EnvOverride::apply_number(&format!("{prefix}_PROBABILITY"), &mut self.probability);
        EnvOverride::apply_number(&format!("{prefix}_JITTER_PERCENT"), &mut self.jitter_percent);
        EnvOverride::apply_optional_number(&format!("{prefix}_SEED"), &mut self.seed);
    }
}

/// A price given either as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    /// `60000.5`
    Number(f64),
    /// `"60000.5"`
    Text(String),
}

impl PriceField {
    fn parse(&self) -> Result<f64, SignalError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| SignalError::invalid("price", format!("'{text}' is not a number"))),
        }
    }
}

impl From<f64> for PriceField {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Caller-supplied fields for an on-demand signal. Every field is optional
/// on the wire so that missing values are reported precisely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalRequest {
    /// Instrument symbol.
    #[serde(default)]
    pub symbol: Option<String>,
    /// `buy` or `sell`, any case.
    #[serde(default, rename = "type")]
    pub side: Option<String>,
    /// Entry price.
    #[serde(default, alias = "entryPrice")]
    pub price: Option<PriceField>,
    /// Timeframe, `D1` when absent.
    #[serde(default)]
    pub timeframe: Option<String>,
}

impl SignalRequest {
    /// Creates a request from the three required fields.
    #[must_use]
    pub fn new(symbol: impl Into<String>, side: impl Into<String>, price: impl Into<PriceField>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            side: Some(side.into()),
            price: Some(price.into()),
            timeframe: None,
        }
    }

    /// Sets the timeframe.
    #[must_use]
    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }
}

/// Produces signals on demand and on a schedule.
pub struct SignalGenerator {
    catalog: Arc<Catalog>,
    registry: Arc<ConnectionRegistry>,
    config: GeneratorConfig,
    random: Box<dyn RandomSource>,
}

impl std::fmt::Debug for SignalGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalGenerator")
            .field("instruments", &self.catalog.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SignalGenerator {
    /// Creates a generator seeded from `config.seed`, or from entropy.
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        registry: Arc<ConnectionRegistry>,
        config: GeneratorConfig,
    ) -> Self {
        let random = config
            .seed
            .map_or_else(StdRandom::from_entropy, StdRandom::seeded);
        Self::with_random_source(catalog, registry, config, Box::new(random))
    }

    /// Creates a generator with an explicit random source.
    #[must_use]
    pub fn with_random_source(
        catalog: Arc<Catalog>,
        registry: Arc<ConnectionRegistry>,
        config: GeneratorConfig,
        random: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            catalog,
            registry,
            config,
            random,
        }
    }

    /// Returns the generator configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Builds a signal from caller-supplied fields.
    ///
    /// # Errors
    ///
    /// `InvalidSignalRequest` naming the first offending field: a blank or
    /// missing symbol, a missing or unknown type, a missing, unparseable,
    /// non-finite or non-positive price, or an unknown timeframe.
    pub fn from_request(&self, request: &SignalRequest) -> Result<Signal, SignalError> {
        let symbol = request
            .symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SignalError::invalid("symbol", "is required"))?;

        let side = request
            .side
            .as_deref()
            .ok_or_else(|| SignalError::invalid("type", "is required"))?
            .parse::<SignalSide>()
            .map_err(|e| SignalError::invalid("type", e.to_string()))?;

        let price = request
            .price
            .as_ref()
            .ok_or_else(|| SignalError::invalid("price", "is required"))?
            .parse()?;

        let timeframe = match request.timeframe.as_deref() {
            Some(raw) => raw
                .parse::<Timeframe>()
                .map_err(|e| SignalError::invalid("timeframe", e.to_string()))?,
            None => Timeframe::default(),
        };

        let market = self.catalog.display_name(symbol).to_string();
        Ok(Signal::new(symbol, side, price, timeframe)?
            .with_market(market)
            .with_status(ACTIVE_STATUS))
    }

    /// Runs one scheduling period. Returns a signal when the registry is
    /// non-empty and the probabilistic gate opens.
    pub fn tick(&mut self) -> Option<Signal> {
        if self.registry.is_empty() {
            debug!("No listeners, skipping tick");
            return None;
        }

        if self.random.next_f64() >= self.config.probability {
            return None;
        }

        let count = self.catalog.len();
        if count == 0 {
            return None;
        }
        let instrument = self.catalog.get(self.random.next_index(count))?;
        let side = SignalSide::ALL[self.random.next_index(SignalSide::ALL.len())];

        let spread = self.config.jitter_percent / 100.0;
        let jitter = (self.random.next_f64() * 2.0 - 1.0) * spread;
        let price = instrument.base_price * (1.0 + jitter);

        match Signal::new(instrument.symbol.as_str(), side, price, Timeframe::D1) {
            Ok(signal) => Some(
                signal
                    .with_market(instrument.name.as_str())
                    .with_status(ACTIVE_STATUS),
            ),
            Err(e) => {
                warn!(symbol = %instrument.symbol, error = %e, "Synthetic signal rejected");
                None
            }
        }
    }
}
