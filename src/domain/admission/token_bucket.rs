//! Token bucket for per-session message rates.
//!
//! Time comes in as caller-supplied milliseconds, so the bucket is fully
//! deterministic under test. The in-memory counter store drives one bucket
//! per session; the Redis store keeps the same state in a hash and runs
//! the identical arithmetic in a script.

/// A token bucket: `burst` capacity refilled at `rate_per_sec`.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_ms: f64,
    tokens: f64,
    last_refill_ms: u64,
}

impl TokenBucket {
    /// Creates a full bucket.
    pub fn new(rate_per_sec: u32, burst: u32, now_ms: u64) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            capacity,
            refill_per_ms: f64::from(rate_per_sec) / 1000.0,
            tokens: capacity,
            last_refill_ms: now_ms,
        }
    }

    /// Takes one token if available. Refills lazily from elapsed time.
    pub fn try_take(&mut self, now_ms: u64) -> bool {
        self.refill(now_ms);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens currently available, for introspection in logs.
    pub fn available(&self) -> u32 {
        self.tokens as u32
    }

    fn refill(&mut self, now_ms: u64) {
        // Clocks that step backwards refill nothing.
        let elapsed = now_ms.saturating_sub(self.last_refill_ms);
        self.tokens = (self.tokens + elapsed as f64 * self.refill_per_ms).min(self.capacity);
        self.last_refill_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn burst_is_honored_then_exhausted() {
        let mut bucket = TokenBucket::new(10, 20, 0);
        for _ in 0..20 {
            assert!(bucket.try_take(0));
        }
        assert!(!bucket.try_take(0));
    }

    #[test]
    fn refill_restores_tokens_at_the_sustained_rate() {
        let mut bucket = TokenBucket::new(10, 20, 0);
        for _ in 0..20 {
            bucket.try_take(0);
        }
        // 10 per second: after 500ms exactly 5 tokens are back.
        for _ in 0..5 {
            assert!(bucket.try_take(500));
        }
        assert!(!bucket.try_take(500));
    }

    #[test]
    fn refill_never_exceeds_capacity() {
        let mut bucket = TokenBucket::new(10, 20, 0);
        bucket.try_take(0);
        bucket.refill(3_600_000);
        assert_eq!(bucket.available(), 20);
    }

    #[test]
    fn backwards_clock_is_tolerated() {
        let mut bucket = TokenBucket::new(10, 2, 1_000);
        assert!(bucket.try_take(1_000));
        assert!(bucket.try_take(500));
        assert!(!bucket.try_take(400));
    }

    proptest! {
        // Over any schedule of takes, the accept count never exceeds
        // burst plus rate times elapsed time.
        #[test]
        fn accepted_stays_under_the_envelope(
            offsets in prop::collection::vec(0u64..200, 1..200),
            rate in 1u32..50,
            burst in 1u32..50,
        ) {
            let mut bucket = TokenBucket::new(rate, burst, 0);
            let mut now = 0u64;
            let mut accepted = 0u64;
            for offset in offsets {
                now += offset;
                if bucket.try_take(now) {
                    accepted += 1;
                }
            }
            let envelope =
                u64::from(burst) + (now * u64::from(rate)).div_ceil(1000) + 1;
            prop_assert!(accepted <= envelope);
        }
    }
}
