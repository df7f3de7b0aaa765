//! Background task driving the periodic generator.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::state::AppState;

/// Calls [`AppState::tick`] once per period until shutdown.
#[derive(Debug)]
pub struct SignalTicker {
    state: Arc<AppState>,
    period: Duration,
}

impl SignalTicker {
    /// Creates a ticker using the generator's configured period.
    #[must_use]
    pub fn new(state: Arc<AppState>) -> Self {
        let period = state.config.generator.tick_interval();
        Self { state, period }
    }

    /// Overrides the period.
    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Runs until `shutdown` resolves. Returns the number of signals emitted.
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send) -> u64 {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(period_secs = self.period.as_secs_f64(), "Signal ticker started");
        let mut emitted = 0;

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = interval.tick() => {
                    if let Some((signal, delivered)) = self.state.tick() {
                        emitted += 1;
                        info!(
                            signal_id = %signal.id(),
                            symbol = %signal.symbol(),
                            side = %signal.side(),
                            delivered,
                            "Periodic signal emitted"
                        );
                    } else {
                        debug!("Tick produced no signal");
                    }
                }
            }
        }

        info!(emitted, "Signal ticker stopped");
        emitted
    }
}
