use std::fmt::Display;
use std::time::Duration;
use tracing::warn;

/// How often and how patiently to retry a failing call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Wait after the failed attempt `attempt` (0-based): `base_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Trait for waiting between attempts
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Calls `op` up to `max_retries + 1` times, backing off exponentially between
/// failures. The error of the final attempt is returned unchanged.
pub fn retry_with_backoff<T, E, F>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= policy.max_retries => return Err(e),
            Err(e) => {
                let wait = policy.delay_for(attempt);
                warn!(
                    "Attempt {} failed: {}. Retrying in {}s...",
                    attempt + 1,
                    e,
                    wait.as_secs_f64()
                );
                sleeper.sleep(wait);
                attempt += 1;
            }
        }
    }
}
