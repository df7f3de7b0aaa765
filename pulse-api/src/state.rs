//! Application state for the API server.

use parking_lot::Mutex;
use pulse_core::catalog::Catalog;
use pulse_core::error::SignalError;
use pulse_core::types::Signal;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ApiConfig;
use crate::generator::{RandomSource, SignalGenerator, SignalRequest};
use crate::ws::{ConnectionRegistry, SignalBroadcaster};

/// Shared application state.
///
/// Owns the registry and injects it into the broadcaster and the generator.
#[derive(Debug)]
pub struct AppState {
    /// API configuration
    pub config: ApiConfig,
    catalog: Arc<Catalog>,
    registry: Arc<ConnectionRegistry>,
    broadcaster: SignalBroadcaster,
    generator: Mutex<SignalGenerator>,
    started_at: Instant,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, catalog: Catalog) -> Self {
        let catalog = Arc::new(catalog);
        let registry = Arc::new(ConnectionRegistry::new());
        let generator = SignalGenerator::new(
            Arc::clone(&catalog),
            Arc::clone(&registry),
            config.generator.clone(),
        );
        Self::assemble(config, catalog, registry, generator)
    }

    /// Creates a state whose generator draws from `random`.
    #[must_use]
    pub fn with_random_source(
        config: ApiConfig,
        catalog: Catalog,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let registry = Arc::new(ConnectionRegistry::new());
        let generator = SignalGenerator::with_random_source(
            Arc::clone(&catalog),
            Arc::clone(&registry),
            config.generator.clone(),
            random,
        );
        Self::assemble(config, catalog, registry, generator)
    }

    fn assemble(
        config: ApiConfig,
        catalog: Arc<Catalog>,
        registry: Arc<ConnectionRegistry>,
        generator: SignalGenerator,
    ) -> Self {
        Self {
            config,
            broadcaster: SignalBroadcaster::new(Arc::clone(&registry)),
            catalog,
            registry,
            generator: Mutex::new(generator),
            started_at: Instant::now(),
        }
    }

    /// Returns the instrument catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Returns the connection registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Returns the broadcaster.
    #[must_use]
    pub fn broadcaster(&self) -> &SignalBroadcaster {
        &self.broadcaster
    }

    /// Returns the time since the state was created.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Builds a signal from an external request and broadcasts it.
    ///
    /// Returns the signal and the number of connections it reached. Nothing
    /// is broadcast when the request is rejected.
    pub fn trigger(&self, request: &SignalRequest) -> Result<(Signal, usize), SignalError> {
        let signal = self.generator.lock().from_request(request)?;
        let delivered = self.broadcaster.broadcast(&signal);
        Ok((signal, delivered))
    }

    /// Runs one generator period and broadcasts whatever it produced.
    pub fn tick(&self) -> Option<(Signal, usize)> {
        let signal = self.generator.lock().tick()?;
        let delivered = self.broadcaster.broadcast(&signal);
        Some((signal, delivered))
    }
}
