//! Resolved timing policy.
//!
//! Budgets are read from the environment once at client construction and
//! stay fixed for the client's lifetime; later environment mutation never
//! affects an existing instance.

use std::env;
use std::time::Duration;

/// Environment variable overriding the ack wait budget, in seconds.
pub const ACK_TIMEOUT_VAR: &str = "BROKER_RPC_ACK_TIMEOUT";

/// Environment variable overriding the wait between reconnect retries,
/// in seconds.
pub const RECONNECT_DELAY_VAR: &str = "BROKER_RPC_RECONNECT_DELAY";

/// Environment variable overriding the final-response wait budget,
/// in seconds.
pub const RESPONSE_TIMEOUT_VAR: &str = "BROKER_RPC_RESPONSE_TIMEOUT";

const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);

/// Backoff slept before each retry of a NACKed request, consumed in order.
pub const NACK_BACKOFF_INTERVALS: [Duration; 6] = [
    Duration::from_millis(1),
    Duration::from_millis(3),
    Duration::from_millis(5),
    Duration::from_millis(10),
    Duration::from_millis(15),
    Duration::from_millis(30),
];

/// Sum of the whole backoff table: the time spent sleeping across an
/// exhausted NACK retry sequence.
pub fn nack_backoff_total() -> Duration {
    NACK_BACKOFF_INTERVALS.iter().sum()
}

/// Resolved timeout and backoff budgets for one client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    /// How long to wait for the first signal on the reply inbox.
    pub ack_timeout: Duration,
    /// How long to sleep before retrying while the broker reconnects.
    pub reconnect_delay: Duration,
    /// How long to wait for the final response once an ack has arrived.
    pub response_timeout: Duration,
}

impl TimingConfig {
    /// Resolves the policy from the process environment.
    ///
    /// Each variable holds a plain number of seconds (fractions allowed).
    /// Absent, empty, or non-numeric values fall back to the defaults:
    /// 5 s for the ack budget, 60 s for the response budget, and the
    /// resolved ack budget for the reconnect delay. The reconnect default
    /// is taken from the ack budget at resolution time, not re-derived
    /// later.
    pub fn from_env() -> Self {
        let ack_timeout = env_secs(ACK_TIMEOUT_VAR).unwrap_or(DEFAULT_ACK_TIMEOUT);
        Self {
            ack_timeout,
            reconnect_delay: env_secs(RECONNECT_DELAY_VAR).unwrap_or(ack_timeout),
            response_timeout: env_secs(RESPONSE_TIMEOUT_VAR).unwrap_or(DEFAULT_RESPONSE_TIMEOUT),
        }
    }

    /// Replaces the ack wait budget.
    pub fn with_ack_timeout(mut self, budget: Duration) -> Self {
        self.ack_timeout = budget;
        self
    }

    /// Replaces the reconnect wait.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Replaces the response wait budget.
    pub fn with_response_timeout(mut self, budget: Duration) -> Self {
        self.response_timeout = budget;
        self
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            reconnect_delay: DEFAULT_ACK_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    let value = env::var(name).ok()?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment mutation is process-global; serialize these tests.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 3] = [ACK_TIMEOUT_VAR, RECONNECT_DELAY_VAR, RESPONSE_TIMEOUT_VAR];

    fn with_vars(vars: &[(&str, &str)], run: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|err| err.into_inner());
        for name in ALL_VARS {
            env::remove_var(name);
        }
        for (name, value) in vars {
            env::set_var(name, value);
        }
        run();
        for name in ALL_VARS {
            env::remove_var(name);
        }
    }

    #[test]
    fn defaults_without_environment() {
        with_vars(&[], || {
            let config = TimingConfig::from_env();
            assert_eq!(config.ack_timeout, Duration::from_secs(5));
            assert_eq!(config.response_timeout, Duration::from_secs(60));
            assert_eq!(config.reconnect_delay, config.ack_timeout);
        });
    }

    #[test]
    fn ack_timeout_env_override() {
        with_vars(&[(ACK_TIMEOUT_VAR, "1000")], || {
            let config = TimingConfig::from_env();
            assert_eq!(config.ack_timeout, Duration::from_secs(1000));
            assert_eq!(config.response_timeout, Duration::from_secs(60));
        });
    }

    #[test]
    fn reconnect_delay_follows_overridden_ack_timeout() {
        with_vars(&[(ACK_TIMEOUT_VAR, "2")], || {
            let config = TimingConfig::from_env();
            assert_eq!(config.reconnect_delay, Duration::from_secs(2));
        });
    }

    #[test]
    fn reconnect_delay_env_override_wins_over_ack_timeout() {
        with_vars(&[(ACK_TIMEOUT_VAR, "2"), (RECONNECT_DELAY_VAR, "7")], || {
            let config = TimingConfig::from_env();
            assert_eq!(config.reconnect_delay, Duration::from_secs(7));
            assert_eq!(config.ack_timeout, Duration::from_secs(2));
        });
    }

    #[test]
    fn response_timeout_env_override() {
        with_vars(&[(RESPONSE_TIMEOUT_VAR, "1000")], || {
            let config = TimingConfig::from_env();
            assert_eq!(config.response_timeout, Duration::from_secs(1000));
        });
    }

    #[test]
    fn fractional_seconds_are_accepted() {
        with_vars(&[(ACK_TIMEOUT_VAR, "0.25")], || {
            let config = TimingConfig::from_env();
            assert_eq!(config.ack_timeout, Duration::from_millis(250));
        });
    }

    #[test]
    fn blank_and_garbage_values_fall_back_to_defaults() {
        with_vars(&[(ACK_TIMEOUT_VAR, "  "), (RESPONSE_TIMEOUT_VAR, "soon")], || {
            let config = TimingConfig::from_env();
            assert_eq!(config.ack_timeout, Duration::from_secs(5));
            assert_eq!(config.response_timeout, Duration::from_secs(60));
        });
    }

    #[test]
    fn backoff_table_is_six_positive_entries() {
        assert_eq!(NACK_BACKOFF_INTERVALS.len(), 6);
        assert!(NACK_BACKOFF_INTERVALS.iter().all(|d| !d.is_zero()));
    }

    #[test]
    fn backoff_total_matches_manual_sum() {
        assert_eq!(nack_backoff_total(), Duration::from_millis(64));
    }
}
