//! Per-host politeness limiter.
//!
//! Workers reserve a send slot per host before fetching, which spaces
//! requests by the politeness delay even when several workers target the
//! same host. Throttling responses (429/503) grow the delay; sustained
//! success shrinks it back toward the base.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Ceiling for backed-off delays.
const MAX_DELAY: Duration = Duration::from_secs(60);
/// Consecutive successes required before a backoff step is undone.
const RECOVERY_THRESHOLD: u32 = 3;

#[derive(Debug)]
struct HostState {
    /// Earliest instant the next request to this host may start.
    next_ready: Instant,
    current_delay: Duration,
    in_backoff: bool,
    consecutive_successes: u32,
    total_requests: u64,
}

impl HostState {
    fn new(base_delay: Duration) -> Self {
        Self {
            next_ready: Instant::now(),
            current_delay: base_delay,
            in_backoff: false,
            consecutive_successes: 0,
            total_requests: 0,
        }
    }

    /// Reserve the next send slot, returning how long the caller must wait.
    fn reserve(&mut self) -> Duration {
        let now = Instant::now();
        let start = self.next_ready.max(now);
        self.next_ready = start + self.current_delay;
        self.total_requests += 1;
        start - now
    }
}

/// Adaptive per-host rate limiter.
#[derive(Debug)]
pub struct HostLimiter {
    base_delay: Duration,
    hosts: RwLock<HashMap<String, HostState>>,
}

impl HostLimiter {
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            hosts: RwLock::new(HashMap::new()),
        }
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Wait until the host is ready, then mark the slot as taken.
    /// Returns the host key for later `report_*` calls.
    pub async fn acquire(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?.to_lowercase();
        let wait = {
            let mut hosts = self.hosts.write().await;
            hosts
                .entry(host.clone())
                .or_insert_with(|| HostState::new(self.base_delay))
                .reserve()
        };
        if wait > Duration::ZERO {
            debug!("rate limiting {host}: waiting {wait:?}");
            tokio::time::sleep(wait).await;
        }
        Some(host)
    }

    /// Report a successful response; sustained success recovers from backoff.
    pub async fn report_success(&self, host: &str) {
        let mut hosts = self.hosts.write().await;
        let Some(state) = hosts.get_mut(host) else {
            return;
        };
        if !state.in_backoff {
            return;
        }
        state.consecutive_successes += 1;
        if state.consecutive_successes >= RECOVERY_THRESHOLD {
            state.current_delay = (state.current_delay / 2).max(self.base_delay);
            state.consecutive_successes = 0;
            if state.current_delay <= self.base_delay {
                state.in_backoff = false;
                state.current_delay = self.base_delay;
                info!("host {host} recovered from rate limit backoff");
            } else {
                debug!("host {host} delay reduced to {:?}", state.current_delay);
            }
        }
    }

    /// Report a throttling response (429/503); doubles the delay.
    pub async fn report_throttled(&self, host: &str, status: u16) {
        let mut hosts = self.hosts.write().await;
        let Some(state) = hosts.get_mut(host) else {
            return;
        };
        state.current_delay = (state.current_delay * 2).min(MAX_DELAY);
        state.in_backoff = true;
        state.consecutive_successes = 0;
        state.next_ready = Instant::now() + state.current_delay;
        warn!(
            "host {host} returned {status}; delay backed off to {:?}",
            state.current_delay
        );
    }

    /// Report a server error (5xx); milder backoff than throttling.
    pub async fn report_server_error(&self, host: &str) {
        let mut hosts = self.hosts.write().await;
        let Some(state) = hosts.get_mut(host) else {
            return;
        };
        state.current_delay = (state.current_delay * 3 / 2).min(MAX_DELAY);
        state.in_backoff = true;
        state.consecutive_successes = 0;
    }

    #[cfg(test)]
    async fn current_delay(&self, host: &str) -> Option<Duration> {
        self.hosts.read().await.get(host).map(|s| s.current_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("test url")
    }

    #[tokio::test]
    async fn test_acquire_returns_host_key() {
        let limiter = HostLimiter::new(Duration::ZERO);
        let host = limiter.acquire(&url("https://Example.com/a")).await;
        assert_eq!(host.as_deref(), Some("example.com"));
    }

    #[tokio::test]
    async fn test_throttle_doubles_and_success_recovers() {
        let base = Duration::from_millis(100);
        let limiter = HostLimiter::new(base);
        let host = limiter
            .acquire(&url("https://example.com/"))
            .await
            .expect("host");

        limiter.report_throttled(&host, 429).await;
        assert_eq!(
            limiter.current_delay(&host).await,
            Some(Duration::from_millis(200))
        );
        limiter.report_throttled(&host, 503).await;
        assert_eq!(
            limiter.current_delay(&host).await,
            Some(Duration::from_millis(400))
        );

        // Three successes undo one backoff step, six reach the base again.
        for _ in 0..6 {
            limiter.report_success(&host).await;
        }
        assert_eq!(limiter.current_delay(&host).await, Some(base));
    }

    #[tokio::test]
    async fn test_backoff_is_capped() {
        let limiter = HostLimiter::new(Duration::from_secs(45));
        let host = limiter
            .acquire(&url("https://example.com/"))
            .await
            .expect("host");
        limiter.report_throttled(&host, 429).await;
        assert_eq!(limiter.current_delay(&host).await, Some(MAX_DELAY));
    }

    #[tokio::test]
    async fn test_success_without_backoff_is_noop() {
        let base = Duration::from_millis(50);
        let limiter = HostLimiter::new(base);
        let host = limiter
            .acquire(&url("https://example.com/"))
            .await
            .expect("host");
        limiter.report_success(&host).await;
        assert_eq!(limiter.current_delay(&host).await, Some(base));
    }
}
