//! Process-unique signal identifiers.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Opaque signal identifier.
///
/// Generated ids are the current wall clock in microseconds, bumped past the
/// last issued value so that ids strictly increase within a process even
/// when the clock stalls or steps backwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(String);

static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

impl SignalId {
    /// Generates a new unique id.
    #[must_use]
    pub fn generate() -> Self {
        let now = Utc::now().timestamp_micros();
        let previous = LAST_ISSUED
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        Self(now.max(previous + 1).to_string())
    }

    /// Wraps an existing id, e.g. one received over the wire.
    #[must_use]
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SignalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_unique_under_burst() {
        let ids: HashSet<SignalId> = (0..10_000).map(|_| SignalId::generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_generate_increasing() {
        let a: i64 = SignalId::generate().as_str().parse().unwrap();
        let b: i64 = SignalId::generate().as_str().parse().unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_generate_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..1_000).map(|_| SignalId::generate()).collect::<Vec<_>>()))
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(all.insert(id));
            }
        }
        assert_eq!(all.len(), 4_000);
    }
}
