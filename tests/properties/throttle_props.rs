//! Properties of the pure throttle decision.

use std::time::Duration;

use proptest::prelude::*;
use tokio::time::Instant;

use sitesearch::coalescer::{Decision, Throttle, decide};

proptest! {
    #[test]
    fn first_call_always_dispatches(now_ms in 0u64..100_000, interval_ms in 0u64..10_000) {
        let now = Instant::now() + Duration::from_millis(now_ms);
        prop_assert_eq!(
            decide(None, now, Duration::from_millis(interval_ms)),
            Decision::DispatchNow
        );
    }

    #[test]
    fn dispatch_iff_interval_elapsed(
        last_ms in 0u64..100_000,
        elapsed_ms in 0u64..20_000,
        interval_ms in 0u64..10_000,
    ) {
        let base = Instant::now();
        let last = base + Duration::from_millis(last_ms);
        let now = last + Duration::from_millis(elapsed_ms);
        let interval = Duration::from_millis(interval_ms);

        match decide(Some(last), now, interval) {
            Decision::DispatchNow => prop_assert!(elapsed_ms >= interval_ms),
            Decision::DeferUntil(at) => {
                prop_assert!(elapsed_ms < interval_ms);
                prop_assert_eq!(at, last + interval);
                prop_assert!(at > now);
            }
        }
    }

    #[test]
    fn dispatches_are_spaced_by_interval(
        arrivals in prop::collection::vec(0u64..500, 1..40),
        interval_ms in 1u64..300,
    ) {
        let base = Instant::now();
        let interval = Duration::from_millis(interval_ms);
        let mut throttle = Throttle::new(interval);
        let mut now = base;
        let mut sent = Vec::new();

        for gap in arrivals {
            now += Duration::from_millis(gap);
            if throttle.decide(now) == Decision::DispatchNow {
                throttle.mark_dispatched(now);
                sent.push(now);
            }
        }

        prop_assert!(!sent.is_empty());
        for pair in sent.windows(2) {
            prop_assert!(pair[1] - pair[0] >= interval);
        }
    }
}
