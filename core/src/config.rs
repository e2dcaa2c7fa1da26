//! Engine configuration: fixed cadences and timeouts, overridable via
//! `SPOOLSTATION_*` environment variables.

use std::time::Duration;

/// Timing constants for the display core.
#[derive(Debug, Clone)]
pub struct Config {
    /// How long a tag stays staged after its last confirmed read.
    pub staging_ttl: Duration,
    /// How long a manually cleared tag is ignored by the debouncer, so the
    /// reader's continuous re-detection cannot instantly re-stage it.
    pub tag_block: Duration,
    /// Backend poll cadence (owned by the poller thread).
    pub poll_interval: Duration,
    /// Cadence at which the host invokes the tick scheduler.
    pub tick_period: Duration,
    /// Delay between a successful Add-to-inventory and the popup auto-close,
    /// long enough for the user to see the "Added" feedback.
    pub popup_close_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            staging_ttl: Duration::from_secs(300),
            tag_block: Duration::from_secs(5),
            poll_interval: Duration::from_millis(2000),
            tick_period: Duration::from_millis(8),
            popup_close_delay: Duration::from_millis(800),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            staging_ttl: env_secs("SPOOLSTATION_STAGING_TTL_SECS", d.staging_ttl),
            tag_block: env_secs("SPOOLSTATION_TAG_BLOCK_SECS", d.tag_block),
            poll_interval: env_millis("SPOOLSTATION_POLL_INTERVAL_MS", d.poll_interval),
            tick_period: env_millis("SPOOLSTATION_TICK_PERIOD_MS", d.tick_period),
            popup_close_delay: env_millis("SPOOLSTATION_POPUP_CLOSE_MS", d.popup_close_delay),
        }
    }
}

fn env_secs(key: &str, default: Duration) -> Duration {
    env_parse(key).map_or(default, Duration::from_secs)
}

fn env_millis(key: &str, default: Duration) -> Duration {
    env_parse(key).map_or(default, Duration::from_millis)
}

fn env_parse(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, raw, "ignoring unparseable config override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_station_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.staging_ttl, Duration::from_secs(300));
        assert_eq!(cfg.poll_interval, Duration::from_millis(2000));
        assert_eq!(cfg.popup_close_delay, Duration::from_millis(800));
    }
}
