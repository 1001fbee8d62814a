//! Polling waits.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::WebDriverError;

/// Re-checks a condition at a fixed interval until it holds or times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            interval: Duration::from_millis(250),
        }
    }
}

impl Poller {
    /// Run `probe` until it yields a value.
    ///
    /// The probe is always run at least once, even with a zero timeout.
    ///
    /// # Errors
    ///
    /// Propagates probe errors, and returns [`WebDriverError::WaitTimeout`]
    /// naming `what` when the deadline passes.
    pub async fn until<T, F, Fut>(&self, what: &str, mut probe: F) -> Result<T, WebDriverError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, WebDriverError>>,
    {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(value) = probe().await? {
                return Ok(value);
            }
            if Instant::now() >= deadline {
                tracing::debug!(%what, timeout_ms = self.timeout.as_millis(), "wait timed out");
                return Err(WebDriverError::WaitTimeout(what.to_string()));
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
