//! String-keyed counters reported by a pass run.

use std::collections::BTreeMap;

/// Counters accumulated over one pass run.
///
/// Keys are stable strings so a pass manager can aggregate them across
/// passes; the map is ordered to keep summaries deterministic.
#[derive(Debug, Clone, Default)]
pub struct PassMetrics {
    counters: BTreeMap<&'static str, usize>,
}

impl PassMetrics {
    /// Creates an empty metric set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` to the counter named `key`.
    pub fn incr(&mut self, key: &'static str, count: usize) {
        *self.counters.entry(key).or_insert(0) += count;
    }

    /// Returns the value of a counter, zero if never incremented.
    #[must_use]
    pub fn get(&self, key: &str) -> usize {
        self.counters.get(key).copied().unwrap_or(0)
    }

    /// Iterates the counters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counters.iter().map(|(&k, &v)| (k, v))
    }

    /// Renders a one-line digest of all counters.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.counters.is_empty() {
            return "no transformations applied".to_string();
        }
        self.counters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
