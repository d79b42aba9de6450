use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

use super::clock::{Clock, SystemClock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Length of the rolling window.
    pub window: Duration,
    /// Requests admitted per window; the next one is rejected.
    pub max_requests: u32,
    /// Requests per window served without delay.
    pub delay_after: u32,
    /// Added delay per request past `delay_after`.
    pub delay_step: Duration,
    pub max_delay: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 10,
            delay_after: 3,
            delay_step: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        }
    }
}

/// What to do with one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Slow-down to apply before the request is answered, rejected or not.
    pub delay: Duration,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the oldest counted request leaves the window.
    pub reset_after: Duration,
}

impl RateDecision {
    /// Whole seconds until a retry can succeed, never zero.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        let secs = if self.reset_after.subsec_nanos() > 0 { secs + 1 } else { secs };
        secs.max(1)
    }
}

/// Exact sliding log of admitted requests for one client.
#[derive(Debug)]
struct SlidingWindow {
    hits: VecDeque<Instant>,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(now: Instant) -> Self {
        Self {
            hits: VecDeque::new(),
            last_seen: now,
        }
    }

    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.hits.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }

    fn record(&mut self, now: Instant, config: &RateLimitConfig) -> RateDecision {
        self.last_seen = now;
        self.prune(now, config.window);

        // Position of this request inside the window, 1-based
        let attempt = self.hits.len() as u32 + 1;

        let delay = match attempt.checked_sub(config.delay_after) {
            Some(excess) if excess > 0 => config.delay_step.saturating_mul(excess).min(config.max_delay),
            _ => Duration::ZERO,
        };

        let allowed = attempt <= config.max_requests;
        if allowed {
            self.hits.push_back(now);
        }

        let reset_after = self
            .hits
            .front()
            .map(|&oldest| config.window.saturating_sub(now.saturating_duration_since(oldest)))
            .unwrap_or(config.window);

        RateDecision {
            allowed,
            delay,
            limit: config.max_requests,
            remaining: config.max_requests.saturating_sub(self.hits.len() as u32),
            reset_after,
        }
    }

    fn is_idle(&self, now: Instant, window: Duration) -> bool {
        self.hits.is_empty() && now.saturating_duration_since(self.last_seen) >= window
    }
}

type Key = String;

/// Process-wide request log keyed by client identifier.
///
/// Cheap to clone; clones share the same log.
#[derive(Clone)]
pub struct RateLimiterStore {
    map: Arc<DashMap<Key, Arc<Mutex<SlidingWindow>>>>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiterStore {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn get_window(&self, key: &str) -> Arc<Mutex<SlidingWindow>> {
        if let Some(existing) = self.map.get(key) {
            existing.clone()
        } else {
            let window = Arc::new(Mutex::new(SlidingWindow::new(self.clock.now())));
            self.map
                .entry(key.to_string())
                .or_insert(window)
                .clone()
        }
    }

    /// Counts one request from `key` and decides its fate.
    pub fn check(&self, key: &str) -> RateDecision {
        let window = self.get_window(key);
        let mut w = window.lock();
        w.record(self.clock.now(), &self.config)
    }

    /// Drops clients with nothing left in their window. Returns how many
    /// entries were removed.
    pub fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let window = self.config.window;
        let before = self.map.len();

        self.map.retain(|_, entry| {
            let mut w = entry.lock();
            w.prune(now, window);
            !w.is_idle(now, window)
        });

        before.saturating_sub(self.map.len())
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.map.len()
    }
}
