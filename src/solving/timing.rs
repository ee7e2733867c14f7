//! Per-variant polling timings.
//!
//! The service needs different amounts of time per captcha family before a
//! first answer is worth asking for, and tasks submitted with caching
//! disabled need longer still because a fresh solve has to run.

use std::time::Duration;

/// Timing constants used while waiting on a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingProfile {
    /// Delay before the first poll when a cached answer may be served.
    pub first_request_delay: Duration,
    /// Delay before the first poll with caching disabled. `None` when the
    /// variant has no cache to opt out of.
    pub first_request_no_cache_delay: Option<Duration>,
    /// Steady-state spacing between polls after the first one.
    pub requests_interval: Duration,
    /// Overall budget measured from task creation.
    pub timeout: Duration,
}

impl TimingProfile {
    pub const IMAGE_TO_TEXT: Self = Self {
        first_request_delay: Duration::from_millis(350),
        first_request_no_cache_delay: None,
        requests_interval: Duration::from_millis(200),
        timeout: Duration::from_secs(10),
    };

    pub const RECAPTCHA_V2: Self = Self::token_profile(3, 180);
    pub const RECAPTCHA_V2_ENTERPRISE: Self = Self::token_profile(3, 180);
    pub const RECAPTCHA_V3: Self = Self::token_profile(3, 180);
    pub const HCAPTCHA: Self = Self::token_profile(3, 180);
    pub const FUNCAPTCHA: Self = Self::token_profile(1, 80);

    pub const GEETEST: Self = Self {
        first_request_delay: Duration::from_secs(1),
        first_request_no_cache_delay: None,
        requests_interval: Duration::from_secs(1),
        timeout: Duration::from_secs(80),
    };

    pub const TURNSTILE: Self = Self::GEETEST;
    pub const COMPLEX_IMAGE: Self = Self::GEETEST;

    const fn token_profile(interval_secs: u64, timeout_secs: u64) -> Self {
        Self {
            first_request_delay: Duration::from_secs(1),
            first_request_no_cache_delay: Some(Duration::from_secs(10)),
            requests_interval: Duration::from_secs(interval_secs),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn supports_no_cache(&self) -> bool {
        self.first_request_no_cache_delay.is_some()
    }

    /// Delay between submission and the first poll.
    pub fn first_poll_delay(&self, no_cache: bool) -> Duration {
        match self.first_request_no_cache_delay {
            Some(delay) if no_cache => delay,
            _ => self.first_request_delay,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
