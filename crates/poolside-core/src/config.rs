// ── Runtime session configuration ──
//
// These types describe *how* to reach the Fluidra cloud for one
// account. They carry credential data and polling tuning, but never
// touch disk -- the CLI constructs an `AccountConfig` from its own
// config layer and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use poolside_api::CognitoConfig;

/// Bounds and defaults for the poll interval (minutes).
pub const MIN_UPDATE_INTERVAL_MINUTES: u64 = 5;
pub const MAX_UPDATE_INTERVAL_MINUTES: u64 = 120;
pub const DEFAULT_UPDATE_INTERVAL_MINUTES: u64 = 30;

/// Bounds and defaults for the client-side rate limit (requests/min).
pub const MIN_API_RATE_LIMIT: u32 = 10;
pub const MAX_API_RATE_LIMIT: u32 = 120;
pub const DEFAULT_API_RATE_LIMIT: u32 = 60;

/// Delay between an accepted command and the out-of-cycle poll that
/// observes its effect.
pub const QUICK_POLL_DELAY: Duration = Duration::from_secs(5);

/// Configuration for one account session.
///
/// Built by the CLI (or any other consumer), passed to
/// [`Account`](crate::Account) -- core never reads config files.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Cloud account email.
    pub username: String,
    /// Cloud account password.
    pub password: SecretString,
    /// Scheduled poll interval. Clamped to 5-120 minutes.
    pub update_interval: Duration,
    /// Client-side request budget. Clamped to 10-120 requests/minute.
    pub api_rate_limit: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Delay before the post-command quick poll.
    pub quick_poll_delay: Duration,
    /// API base override (tests point this at a mock gateway).
    pub base_url: Option<Url>,
    /// Identity-provider settings.
    pub cognito: CognitoConfig,
}

impl AccountConfig {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
            update_interval: Duration::from_secs(DEFAULT_UPDATE_INTERVAL_MINUTES * 60),
            api_rate_limit: DEFAULT_API_RATE_LIMIT,
            timeout: Duration::from_secs(30),
            quick_poll_delay: QUICK_POLL_DELAY,
            base_url: None,
            cognito: CognitoConfig::default(),
        }
    }

    /// Clamp tunables to their documented bounds. Out-of-range values
    /// are corrected, not rejected -- matching how the options UI of
    /// the original integration behaved.
    pub fn clamped(mut self) -> Self {
        let min = Duration::from_secs(MIN_UPDATE_INTERVAL_MINUTES * 60);
        let max = Duration::from_secs(MAX_UPDATE_INTERVAL_MINUTES * 60);
        self.update_interval = self.update_interval.clamp(min, max);
        self.api_rate_limit = self
            .api_rate_limit
            .clamp(MIN_API_RATE_LIMIT, MAX_API_RATE_LIMIT);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AccountConfig {
        AccountConfig::new("pool-owner@example.com", SecretString::from("pw".to_owned()))
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = config();
        assert_eq!(cfg.update_interval, Duration::from_secs(30 * 60));
        assert_eq!(cfg.api_rate_limit, 60);
        assert_eq!(cfg.quick_poll_delay, Duration::from_secs(5));
    }

    #[test]
    fn update_interval_clamps_to_bounds() {
        let mut cfg = config();
        cfg.update_interval = Duration::from_secs(60);
        assert_eq!(
            cfg.clamped().update_interval,
            Duration::from_secs(5 * 60)
        );

        let mut cfg = config();
        cfg.update_interval = Duration::from_secs(10 * 3600);
        assert_eq!(
            cfg.clamped().update_interval,
            Duration::from_secs(120 * 60)
        );
    }

    #[test]
    fn rate_limit_clamps_to_bounds() {
        let mut cfg = config();
        cfg.api_rate_limit = 1;
        assert_eq!(cfg.clamped().api_rate_limit, 10);

        let mut cfg = config();
        cfg.api_rate_limit = 500;
        assert_eq!(cfg.clamped().api_rate_limit, 120);
    }

    #[test]
    fn in_range_values_are_untouched() {
        let mut cfg = config();
        cfg.update_interval = Duration::from_secs(45 * 60);
        cfg.api_rate_limit = 90;
        let cfg = cfg.clamped();
        assert_eq!(cfg.update_interval, Duration::from_secs(45 * 60));
        assert_eq!(cfg.api_rate_limit, 90);
    }
}
