//! Poller configuration
//!
//! Total wait for one task is bounded by `(max_attempts - 1) × interval`,
//! since the first status check is immediate.

use std::time::Duration;

/// Default delay between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Default number of status checks before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 40;

/// Status polling configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay between consecutive status checks
    pub interval: Duration,

    /// Status checks allowed before a still-pending task times out
    pub max_attempts: u32,

    /// Consecutive transport errors tolerated before the cycle fails
    ///
    /// Zero means every transport error is fatal. A tolerated error still
    /// consumes an attempt.
    pub failure_tolerance: u32,
}

impl PollerConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            failure_tolerance: 0,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_failure_tolerance(mut self, failure_tolerance: u32) -> Self {
        self.failure_tolerance = failure_tolerance;
        self
    }

    /// Upper bound on how long one task can be polled
    ///
    /// Saturates at `Duration::MAX`; `validate` rejects configurations where
    /// that happens.
    pub fn max_wait(&self) -> Duration {
        self.interval
            .checked_mul(self.max_attempts.saturating_sub(1))
            .unwrap_or(Duration::MAX)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval.is_zero() {
            anyhow::bail!("poll interval must be greater than 0");
        }

        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        if self.failure_tolerance >= self.max_attempts {
            anyhow::bail!("failure_tolerance must be lower than max_attempts");
        }

        if self
            .interval
            .checked_mul(self.max_attempts.saturating_sub(1))
            .is_none()
        {
            anyhow::bail!("poll interval × max_attempts overflows the maximum wait time");
        }

        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PollerConfig::default();
        assert_eq!(config.interval, Duration::from_millis(1500));
        assert_eq!(config.max_attempts, 40);
        assert_eq!(config.failure_tolerance, 0);
        assert_eq!(config.max_wait(), Duration::from_millis(58_500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = PollerConfig::default().with_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = PollerConfig::default().with_max_attempts(0);
        assert!(config.validate().is_err());

        let config = PollerConfig::default()
            .with_max_attempts(3)
            .with_failure_tolerance(3);
        assert!(config.validate().is_err());

        let config = PollerConfig::default()
            .with_max_attempts(3)
            .with_failure_tolerance(2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_wait_counts_sleeps_between_checks() {
        let config = PollerConfig::default()
            .with_interval(Duration::from_secs(2))
            .with_max_attempts(1);
        assert_eq!(config.max_wait(), Duration::ZERO);

        let config = config.with_max_attempts(5);
        assert_eq!(config.max_wait(), Duration::from_secs(8));
    }

    #[test]
    fn test_overflowing_wait_is_rejected() {
        let config = PollerConfig::default()
            .with_interval(Duration::from_millis(u64::MAX))
            .with_max_attempts(2000);

        assert_eq!(config.max_wait(), Duration::MAX);
        assert!(config.validate().is_err());
    }
}
