//! Signal data model.
//!
//! A [`Signal`] is the unit of broadcast: one buy/sell event for an
//! instrument, created once, serialized once and then discarded.

mod signal;
mod signal_id;
mod timeframe;

pub use signal::{Signal, SignalSide, iso_millis};
pub use signal_id::SignalId;
pub use timeframe::Timeframe;

use thiserror::Error;

/// Errors raised when parsing the textual forms of the model enums.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown signal side.
    #[error("unknown signal type '{0}', expected 'buy' or 'sell'")]
    UnknownSide(String),

    /// Unknown timeframe.
    #[error("unknown timeframe '{0}', expected one of M1, M5, M15, M30, H1, H4, D1, W1")]
    UnknownTimeframe(String),
}
