//! Retry delays for request chains.

use std::time::Duration;

/// Default delay before retrying a bounded request, in seconds.
const DEFAULT_REQUEST_DELAY_SECS: u64 = 5;

/// Default delay before retrying a translation, in seconds.
const DEFAULT_TRANSLATION_DELAY_SECS: u64 = 10;

/// Fixed (non-exponential) retry delays.
///
/// Bounded requests retry after the shorter delay. Translations, which
/// nobody waits on synchronously, use the longer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before re-attempting a bounded request.
    pub request_delay: Duration,
    /// Delay before re-attempting a translation.
    pub translation_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given delays.
    pub fn new(request_delay: Duration, translation_delay: Duration) -> Self {
        Self {
            request_delay,
            translation_delay,
        }
    }

    /// Retries without waiting.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Sets the request delay.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Sets the translation delay.
    pub fn with_translation_delay(mut self, delay: Duration) -> Self {
        self.translation_delay = delay;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_REQUEST_DELAY_SECS),
            Duration::from_secs(DEFAULT_TRANSLATION_DELAY_SECS),
        )
    }
}
