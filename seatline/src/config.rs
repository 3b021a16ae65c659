//! Configuration management for the ticketing subsystem.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Subsystem configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatlineConfig {
    /// How long a transfer offer stays open, in seconds.
    pub transfer_ttl_secs: i64,
    /// How often the expiry sweeper runs, in seconds.
    pub sweep_interval_secs: u64,
    /// Log level for the demo binary (trace, debug, info, warn, error).
    pub log_level: String,
}

impl SeatlineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            transfer_ttl_secs: env::var("SEATLINE_TRANSFER_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24 * 60 * 60),
            sweep_interval_secs: env::var("SEATLINE_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            log_level: env::var("SEATLINE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// The transfer TTL as a chrono duration, for deadline arithmetic.
    #[must_use]
    pub fn transfer_ttl(&self) -> Duration {
        Duration::seconds(self.transfer_ttl_secs.max(1))
    }

    /// The sweep interval as a std duration, for the tokio timer.
    #[must_use]
    pub const fn sweep_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for SeatlineConfig {
    fn default() -> Self {
        Self {
            transfer_ttl_secs: 24 * 60 * 60,
            sweep_interval_secs: 60,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = SeatlineConfig::default();
        assert_eq!(config.transfer_ttl(), Duration::hours(24));
        assert_eq!(config.sweep_interval(), StdDuration::from_secs(60));
    }

    #[test]
    fn ttl_never_collapses_to_zero() {
        let config = SeatlineConfig {
            transfer_ttl_secs: 0,
            ..SeatlineConfig::default()
        };
        assert!(config.transfer_ttl() > Duration::zero());
    }
}
