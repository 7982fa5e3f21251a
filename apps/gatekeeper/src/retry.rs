use crate::{config::RpcLimits, error::GateError};
use std::{collections::VecDeque, fmt::Display, future::Future, time::Duration};
use tokio::{
    sync::Mutex,
    time::{Instant, sleep},
};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Linear backoff: the wait after failed attempt `n` (1-based) is `n × delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt)
    }
}

impl From<&RpcLimits> for RetryPolicy {
    fn from(limits: &RpcLimits) -> Self {
        Self::new(limits.max_attempts, limits.retry_delay)
    }
}

/// Runs `operation` until it succeeds or the policy's attempts are used up.
/// Each call gets a fresh budget.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, GateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut last_error = String::new();

    for attempt in 1..=policy.max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                last_error = e.to_string();
                if attempt < policy.max_attempts {
                    let backoff = policy.backoff(attempt);
                    warn!(
                        attempt = attempt,
                        max_attempts = policy.max_attempts,
                        backoff = ?backoff,
                        error = %last_error,
                        "Operation failed, retrying"
                    );
                    sleep(backoff).await;
                }
            }
        }
    }

    Err(GateError::RetriesExhausted {
        attempts: policy.max_attempts,
        last_error,
    })
}

/// Caps outbound requests to `max_requests` per sliding `window`.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    requests: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests: max_requests.max(1),
            requests: Mutex::new(VecDeque::new()),
        }
    }

    /// Waits until a request slot is free, then claims it.
    pub async fn acquire(&self) {
        let mut requests = self.requests.lock().await;
        loop {
            let now = Instant::now();
            while requests
                .front()
                .is_some_and(|sent| now.duration_since(*sent) >= self.window)
            {
                requests.pop_front();
            }

            if requests.len() < self.max_requests {
                requests.push_back(now);
                return;
            }

            let oldest = requests.front().copied().unwrap_or(now);
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            debug!(wait = ?wait, in_window = requests.len(), "Rate limit reached, waiting");
            sleep(wait).await;
        }
    }

    pub async fn in_window(&self) -> usize {
        let now = Instant::now();
        self.requests
            .lock()
            .await
            .iter()
            .filter(|sent| now.duration_since(**sent) < self.window)
            .count()
    }
}

impl From<&RpcLimits> for RateLimiter {
    fn from(limits: &RpcLimits) -> Self {
        Self::new(limits.rate_limit_window, limits.rate_limit_max_requests)
    }
}
