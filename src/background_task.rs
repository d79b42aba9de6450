use tokio::time::{interval, Duration};

use crate::limiter::rate_limiter::RateLimiterStore;

/// Periodically forgets clients whose rate-limit window has emptied.
pub async fn start_eviction_task(limiter: RateLimiterStore, every: Duration) {
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        let evicted = limiter.evict_idle();
        if evicted > 0 {
            tracing::debug!("Evicted {} idle rate-limit entries", evicted);
        }
    }
}
