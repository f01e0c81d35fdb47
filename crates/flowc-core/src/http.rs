// ── FlowC Engine: HTTP Retry Helpers ───────────────────────────────────────
//
// Shared retry utilities used by the completion gateway, the arXiv and
// INSPIRE clients, and the delivery channels.
//
//   • Linear backoff: attempt n waits `base * n` before attempt n+1
//   • No sleep after the final attempt
//   • Each attempt gets a fresh per-request timeout; there is no cumulative budget
//   • Warn per failed attempt, one error line on exhaustion

use log::{error, warn};
use reqwest::Client;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

// ── Backoff delay ──────────────────────────────────────────────────────────

/// Delay after the `attempt`-th failure (1-based).
pub fn linear_backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}

/// Sleep for the linear backoff of `attempt` and return how long we waited.
pub async fn backoff_sleep(base: Duration, attempt: u32) -> Duration {
    let delay = linear_backoff(base, attempt);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    delay
}

/// Run `op` up to `attempts` times (at least once), sleeping
/// `base * attempt` between failures. `op` receives the 1-based attempt
/// number. Returns the first success or the last error.
pub async fn with_linear_retries<T, E, F, Fut>(
    label: &str,
    attempts: u32,
    base: Duration,
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("[{}] attempt {}/{} failed: {}", label, attempt, attempts, e);
                if attempt >= attempts {
                    error!("[{}] giving up after {} attempts: {}", label, attempts, e);
                    return Err(e);
                }
                backoff_sleep(base, attempt).await;
                attempt += 1;
            }
        }
    }
}

// ── Client factory ─────────────────────────────────────────────────────────

/// Build a `reqwest::Client` with the given per-request timeout.
pub fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .timeout(timeout)
        .user_agent(concat!("flowc/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

/// Truncate a response body for log lines.
pub fn body_excerpt(body: &str, max: usize) -> &str {
    crate::atoms::types::truncate_chars(body, max)
}

// ── Tests ──────────────────────────────────────────────────────────────────
