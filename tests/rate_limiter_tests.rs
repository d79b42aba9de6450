use std::{sync::Arc, time::Duration};

use portfolio_relay::limiter::{
    clock::ManualClock,
    rate_limiter::{RateLimitConfig, RateLimiterStore},
};

fn store() -> (RateLimiterStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let store = RateLimiterStore::with_clock(RateLimitConfig::default(), clock.clone());
    (store, clock)
}

#[test]
fn first_three_requests_are_not_delayed() {
    let (store, _) = store();

    for _ in 0..3 {
        let decision = store.check("10.0.0.1");
        assert!(decision.allowed);
        assert_eq!(decision.delay, Duration::ZERO);
    }
}

#[test]
fn delay_grows_by_step_after_threshold_and_is_capped() {
    let (store, _) = store();
    for _ in 0..3 {
        store.check("10.0.0.1");
    }

    let delays: Vec<_> = (0..8).map(|_| store.check("10.0.0.1").delay).collect();

    assert_eq!(
        delays,
        vec![
            Duration::from_millis(250),
            Duration::from_millis(500),
            Duration::from_millis(750),
            Duration::from_millis(1000),
            Duration::from_millis(1250),
            Duration::from_millis(1500),
            Duration::from_millis(1750),
            Duration::from_millis(2000),
        ]
    );

    // Rejected requests keep being slowed down at the cap
    let decision = store.check("10.0.0.1");
    assert!(!decision.allowed);
    assert_eq!(decision.delay, Duration::from_secs(2));
}

#[test]
fn eleventh_request_in_window_is_rejected() {
    let (store, clock) = store();

    for i in 1..=10 {
        let decision = store.check("10.0.0.1");
        assert!(decision.allowed, "request {i}");
        assert_eq!(decision.remaining, 10 - i);
        clock.advance(Duration::from_secs(1));
    }

    let decision = store.check("10.0.0.1");
    assert!(!decision.allowed);
    assert_eq!(decision.remaining, 0);
    assert_eq!(decision.limit, 10);
    // Oldest hit was 10s ago
    assert_eq!(decision.reset_after, Duration::from_secs(50));
    assert_eq!(decision.retry_after_secs(), 50);
}

#[test]
fn window_slides_instead_of_resetting() {
    let (store, clock) = store();

    for _ in 0..5 {
        store.check("10.0.0.1");
    }
    clock.advance(Duration::from_secs(30));
    for _ in 0..5 {
        assert!(store.check("10.0.0.1").allowed);
    }
    assert!(!store.check("10.0.0.1").allowed);

    // The first five leave the window, the last five stay
    clock.advance(Duration::from_secs(30));
    for _ in 0..5 {
        assert!(store.check("10.0.0.1").allowed);
    }
    assert!(!store.check("10.0.0.1").allowed);
}

#[test]
fn rejections_do_not_extend_the_lockout() {
    let (store, clock) = store();

    for _ in 0..10 {
        store.check("10.0.0.1");
    }
    for _ in 0..20 {
        clock.advance(Duration::from_secs(2));
        assert!(!store.check("10.0.0.1").allowed);
    }

    clock.advance(Duration::from_secs(20));
    assert!(store.check("10.0.0.1").allowed);
}

#[test]
fn clients_are_limited_independently() {
    let (store, _) = store();

    for _ in 0..10 {
        store.check("10.0.0.1");
    }

    assert!(!store.check("10.0.0.1").allowed);
    let other = store.check("10.0.0.2");
    assert!(other.allowed);
    assert_eq!(other.delay, Duration::ZERO);
    assert_eq!(store.tracked_clients(), 2);
}

#[test]
fn clones_share_state() {
    let (store, _) = store();
    let clone = store.clone();

    for _ in 0..10 {
        clone.check("10.0.0.1");
    }

    assert!(!store.check("10.0.0.1").allowed);
}

#[test]
fn idle_clients_are_evicted_after_a_full_window() {
    let (store, clock) = store();
    store.check("10.0.0.1");
    clock.advance(Duration::from_secs(45));
    store.check("10.0.0.2");

    assert_eq!(store.evict_idle(), 0);

    clock.advance(Duration::from_secs(15));
    assert_eq!(store.evict_idle(), 1);
    assert_eq!(store.tracked_clients(), 1);

    clock.advance(Duration::from_secs(45));
    assert_eq!(store.evict_idle(), 1);
    assert_eq!(store.tracked_clients(), 0);
}

#[test]
fn retry_after_rounds_up_and_is_never_zero() {
    let config = RateLimitConfig {
        window: Duration::from_millis(1500),
        max_requests: 1,
        ..RateLimitConfig::default()
    };
    let clock = Arc::new(ManualClock::new());
    let store = RateLimiterStore::with_clock(config, clock.clone());

    store.check("10.0.0.1");
    assert_eq!(store.check("10.0.0.1").retry_after_secs(), 2);

    clock.advance(Duration::from_millis(1499));
    let decision = store.check("10.0.0.1");
    assert!(!decision.allowed);
    assert_eq!(decision.retry_after_secs(), 1);
}
