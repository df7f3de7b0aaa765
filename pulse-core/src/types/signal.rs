//! The broadcast signal payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ParseError, SignalId, Timeframe};
use crate::error::SignalError;

/// Direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSide {
    /// Buy signal.
    Buy,
    /// Sell signal.
    Sell,
}

impl SignalSide {
    /// Both sides, in declaration order.
    pub const ALL: [Self; 2] = [Self::Buy, Self::Sell];

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for SignalSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalSide {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            _ => Err(ParseError::UnknownSide(s.to_string())),
        }
    }
}

/// A single buy/sell event broadcast to every listener.
///
/// Field order follows the wire shape:
///
/// ```text
/// { id, market?, symbol, type, entryPrice, timestamp, profitLoss, status?, timeframe }
/// ```
///
/// `entry_price` is always finite and positive and `timestamp` is fixed at
/// construction; both are only reachable through accessors. Deserialization
/// enforces the same checks as [`Signal::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSignal")]
pub struct Signal {
    id: SignalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    market: Option<String>,
    symbol: String,
    #[serde(rename = "type")]
    side: SignalSide,
    entry_price: f64,
    #[serde(with = "iso_millis")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    profit_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(default)]
    timeframe: Timeframe,
}

impl Signal {
    /// Creates a signal stamped with a fresh id and the current time.
    ///
    /// # Errors
    ///
    /// Returns `SignalError::InvalidSignalRequest` if `symbol` is blank or
    /// `entry_price` is not a finite positive number.
    pub fn new(
        symbol: impl Into<String>,
        side: SignalSide,
        entry_price: f64,
        timeframe: Timeframe,
    ) -> Result<Self, SignalError> {
        let symbol = symbol.into();
        check_fields(&symbol, entry_price)?;

        Ok(Self {
            id: SignalId::generate(),
            market: None,
            symbol,
            side,
            entry_price,
            timestamp: Utc::now(),
            profit_loss: None,
            status: None,
            timeframe,
        })
    }

    /// Sets the display name of the market.
    #[must_use]
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    /// Sets the lifecycle status (e.g. `active`).
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Returns the signal id.
    #[must_use]
    pub fn id(&self) -> &SignalId {
        &self.id
    }

    /// Returns the market display name, if set.
    #[must_use]
    pub fn market(&self) -> Option<&str> {
        self.market.as_deref()
    }

    /// Returns the instrument symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the signal side.
    #[must_use]
    pub fn side(&self) -> SignalSide {
        self.side
    }

    /// Returns the entry price.
    #[must_use]
    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    /// Returns the creation time.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the profit/loss, which is `None` for freshly created signals.
    #[must_use]
    pub fn profit_loss(&self) -> Option<f64> {
        self.profit_loss
    }

    /// Returns the lifecycle status, if set.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Returns the timeframe.
    #[must_use]
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Serializes the signal to its canonical JSON text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn check_fields(symbol: &str, entry_price: f64) -> Result<(), SignalError> {
    if symbol.trim().is_empty() {
        return Err(SignalError::invalid("symbol", "must not be empty"));
    }
    if !entry_price.is_finite() || entry_price <= 0.0 {
        return Err(SignalError::invalid(
            "price",
            format!("{entry_price} is not a finite positive number"),
        ));
    }
    Ok(())
}

/// Wire form of a [`Signal`] before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSignal {
    id: SignalId,
    #[serde(default)]
    market: Option<String>,
    symbol: String,
    #[serde(rename = "type")]
    side: SignalSide,
    entry_price: f64,
    #[serde(with = "iso_millis")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    profit_loss: Option<f64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    timeframe: Timeframe,
}

impl TryFrom<RawSignal> for Signal {
    type Error = SignalError;

    fn try_from(raw: RawSignal) -> Result<Self, Self::Error> {
        check_fields(&raw.symbol, raw.entry_price)?;

        Ok(Self {
            id: raw.id,
            market: raw.market,
            symbol: raw.symbol,
            side: raw.side,
            entry_price: raw.entry_price,
            timestamp: raw.timestamp,
            profit_loss: raw.profit_loss,
            status: raw.status,
            timeframe: raw.timeframe,
        })
    }
}

/// Serde adapter for ISO-8601 timestamps with millisecond precision and a
/// `Z` suffix, e.g. `2024-05-01T12:30:00.125Z`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Formats a timestamp.
    #[must_use]
    pub fn format(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Serializes a timestamp.
    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(dt))
    }

    /// Deserializes any RFC 3339 timestamp into UTC.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
