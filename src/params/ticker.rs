//! Simulated market tick timing.

use std::time::Duration;

/// Tick arrival timing: a fixed floor plus uniform random jitter
#[derive(Debug, Clone)]
pub struct TickerConfig {
    /// Shortest gap between ticks (milliseconds)
    /// Default: 400
    pub min_interval_ms: u64,

    /// Upper bound of the random extra delay (milliseconds, exclusive)
    /// Default: 1000
    pub jitter_ms: u64,

    /// Seed for the interval sequence (None = seeded from the OS)
    pub seed: Option<u64>,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 400,
            jitter_ms: 1000,
            seed: None,
        }
    }
}

impl TickerConfig {
    /// Longest possible gap between ticks
    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms.saturating_add(self.jitter_ms))
    }
}
