//! Per-token paint cooldown
//!
//! # RateLimiterStore
//!
//! Uses governor's keyed GCRA limiter with a quota of one paint per cooldown
//! period and a burst of one:
//!
//! - **Allowed**: no entry yet, or the cooldown since the last accepted paint
//!   has fully elapsed. The current time is recorded for the token.
//! - **Cooling**: still inside the window. Nothing is recorded.
//!
//! governor's keyed check is a compare-and-swap on the token's cell, so two
//! concurrent paints with the same token can never both pass. Different tokens
//! never contend with each other.
//!
//! The clock is a type parameter so tests can drive time with
//! `FakeRelativeClock` instead of sleeping.

use governor::{
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use nonzero_ext::nonzero;
use std::sync::Arc;
use std::time::Duration;

type KeyedLimiter<C> =
    RateLimiter<String, DefaultKeyedStateStore<String>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Outcome of a cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Cooling,
}

/// Cooldown tracker keyed by identity token
///
/// `limiter` is `None` when restriction is disabled or the cooldown is zero;
/// every check is then Allowed and nothing is recorded.
#[derive(Clone)]
pub struct RateLimiterStore<C: Clock = DefaultClock> {
    enabled: bool,
    limiter: Option<Arc<KeyedLimiter<C>>>,
    clock: C,
    cooldown: Duration,
}

impl RateLimiterStore {
    /// Create a store on the wall clock
    pub fn new(cooldown: Duration, enabled: bool) -> Self {
        Self::with_clock(cooldown, enabled, DefaultClock::default())
    }
}

impl<C: Clock> RateLimiterStore<C> {
    /// Create a store on a caller-provided clock
    pub fn with_clock(cooldown: Duration, enabled: bool, clock: C) -> Self {
        let limiter = if enabled {
            Quota::with_period(cooldown).map(|quota| {
                let quota = quota.allow_burst(nonzero!(1u32));
                Arc::new(RateLimiter::new(
                    quota,
                    DefaultKeyedStateStore::default(),
                    &clock,
                ))
            })
        } else {
            None
        };

        Self {
            enabled,
            limiter,
            clock,
            cooldown,
        }
    }

    /// Whether restriction is on, i.e. paints must carry a token
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Configured cooldown window
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Check the token's cooldown and, if allowed, record this paint
    pub fn check_and_record(&self, token: &str) -> RateDecision {
        let Some(limiter) = &self.limiter else {
            return RateDecision::Allowed;
        };

        match limiter.check_key(&token.to_owned()) {
            Ok(()) => RateDecision::Allowed,
            Err(not_until) => {
                tracing::debug!(
                    "Token {} cooling, {:?} remaining",
                    token,
                    not_until.wait_time_from(self.clock.now())
                );
                RateDecision::Cooling
            }
        }
    }

    /// Drop entries whose cooldown has fully elapsed
    ///
    /// A dropped token is treated exactly like a fresh one, so this never
    /// changes a decision. Runs off the paint path.
    pub fn sweep(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    }

    /// Number of tokens currently tracked
    pub fn tracked_tokens(&self) -> usize {
        self.limiter.as_ref().map_or(0, |limiter| limiter.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;

    fn fake_store(cooldown_ms: u64) -> (RateLimiterStore<FakeRelativeClock>, FakeRelativeClock) {
        let clock = FakeRelativeClock::default();
        let store =
            RateLimiterStore::with_clock(Duration::from_millis(cooldown_ms), true, clock.clone());
        (store, clock)
    }

    #[test]
    fn test_first_paint_allowed() {
        let (store, _clock) = fake_store(1000);
        assert_eq!(store.check_and_record("fresh"), RateDecision::Allowed);
        assert_eq!(store.tracked_tokens(), 1);
    }

    #[test]
    fn test_cooldown_window() {
        let (store, clock) = fake_store(1000);

        assert_eq!(store.check_and_record("A"), RateDecision::Allowed);

        clock.advance(Duration::from_millis(500));
        assert_eq!(store.check_and_record("A"), RateDecision::Cooling);

        clock.advance(Duration::from_millis(500));
        assert_eq!(store.check_and_record("A"), RateDecision::Allowed);
    }

    #[test]
    fn test_cooling_does_not_extend_window() {
        let (store, clock) = fake_store(1000);

        assert_eq!(store.check_and_record("A"), RateDecision::Allowed);

        // Repeated rejected attempts must not push the next allowed time back
        for _ in 0..9 {
            clock.advance(Duration::from_millis(100));
            assert_eq!(store.check_and_record("A"), RateDecision::Cooling);
        }

        clock.advance(Duration::from_millis(100));
        assert_eq!(store.check_and_record("A"), RateDecision::Allowed);
    }

    #[test]
    fn test_tokens_tracked_separately() {
        let (store, _clock) = fake_store(1000);

        assert_eq!(store.check_and_record("A"), RateDecision::Allowed);
        assert_eq!(store.check_and_record("B"), RateDecision::Allowed);
        assert_eq!(store.check_and_record("A"), RateDecision::Cooling);
        assert_eq!(store.check_and_record("B"), RateDecision::Cooling);
        assert_eq!(store.tracked_tokens(), 2);
    }

    #[test]
    fn test_disabled_never_records() {
        let store = RateLimiterStore::new(Duration::from_secs(60), false);
        assert!(!store.is_enabled());

        for _ in 0..10 {
            assert_eq!(store.check_and_record("A"), RateDecision::Allowed);
        }
        assert_eq!(store.tracked_tokens(), 0);
    }

    #[test]
    fn test_zero_cooldown_always_allows() {
        let store = RateLimiterStore::new(Duration::ZERO, true);
        assert!(store.is_enabled());
        assert_eq!(store.check_and_record("A"), RateDecision::Allowed);
        assert_eq!(store.check_and_record("A"), RateDecision::Allowed);
        assert_eq!(store.tracked_tokens(), 0);
    }

    #[test]
    fn test_sweep_drops_expired_entries() {
        let (store, clock) = fake_store(1000);

        store.check_and_record("A");
        store.check_and_record("B");
        assert_eq!(store.tracked_tokens(), 2);

        clock.advance(Duration::from_secs(10));
        store.sweep();
        assert_eq!(store.tracked_tokens(), 0);

        // Swept tokens behave like fresh ones
        assert_eq!(store.check_and_record("A"), RateDecision::Allowed);
    }

    #[test]
    fn test_concurrent_same_token_single_winner() {
        let store = RateLimiterStore::new(Duration::from_secs(60), true);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.check_and_record("shared"))
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|d| *d == RateDecision::Allowed)
            .count();

        assert_eq!(allowed, 1);
    }

    #[test]
    fn test_clone_shares_state() {
        let (store1, _clock) = fake_store(1000);
        let store2 = store1.clone();

        assert_eq!(store1.check_and_record("A"), RateDecision::Allowed);
        assert_eq!(store2.check_and_record("A"), RateDecision::Cooling);
    }
}
