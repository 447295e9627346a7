use std::future::Future;
use std::time::Duration;

use crate::constants::{DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_DELAY};

/// Wait-then-check policy for payments confirmed by polling instead of webhook.
///
/// Each attempt sleeps `delay` and then checks once. Further attempts are only
/// made while the check keeps reporting a pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub delay: Duration,
    pub attempts: u32,
}

impl Default for PollPolicy {
    /// A single check after 1.5 seconds.
    fn default() -> Self {
        Self {
            delay: DEFAULT_POLL_DELAY,
            attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    /// `attempts` is clamped to at least one.
    pub fn new(delay: Duration, attempts: u32) -> Self {
        Self {
            delay,
            attempts: attempts.max(1),
        }
    }

    /// Run `check` after each delay until `is_pending` is false or attempts run out.
    ///
    /// Returns the last observation; errors end polling immediately. The sleep
    /// yields to the runtime so other requests keep being served.
    pub async fn wait_for<T, E, F, Fut>(
        &self,
        mut check: F,
        is_pending: impl Fn(&T) -> bool,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            tokio::time::sleep(self.delay).await;
            let observed = check().await?;
            if attempt >= attempts || !is_pending(&observed) {
                return Ok(observed);
            }
            tracing::debug!(attempt, attempts, "still pending, polling again");
        }
    }
}
