//! Property tests for reconnect backoff: delays stay within the jitter band
//! and never exceed the ceiling.

use std::time::Duration;

use proptest::prelude::*;

use routewatch_ingest::Backoff;

// =============================================================================
// Ceiling: no delay ever exceeds max, whatever the schedule
// =============================================================================
proptest! {
    #[test]
    fn delay_never_exceeds_ceiling(
        initial_ms in 1u64..5_000,
        extra_ms in 0u64..120_000,
        multiplier in 1.0f64..4.0,
        jitter in 0.0f64..0.99,
        attempts in 1usize..80,
    ) {
        let max = Duration::from_millis(initial_ms + extra_ms);
        let mut backoff = Backoff::new(Duration::from_millis(initial_ms), max, multiplier, jitter);
        for _ in 0..attempts {
            prop_assert!(backoff.next_delay() <= max);
        }
    }
}

// =============================================================================
// Jitter band: each delay is within ±jitter of the un-jittered base
// =============================================================================
proptest! {
    #[test]
    fn delay_within_jitter_band(
        initial_ms in 1u64..5_000,
        multiplier in 1.0f64..3.0,
        jitter in 0.0f64..0.5,
        attempts in 1usize..20,
    ) {
        let max = Duration::from_secs(600);
        let mut backoff = Backoff::new(Duration::from_millis(initial_ms), max, multiplier, jitter);
        for _ in 0..attempts {
            let base = backoff.base_delay().as_secs_f64();
            let delay = backoff.next_delay().as_secs_f64();
            prop_assert!(delay >= base * (1.0 - jitter) - 1e-6);
            prop_assert!(delay <= base * (1.0 + jitter) + 1e-6);
        }
    }
}

// =============================================================================
// Monotone base: without jitter the schedule never shrinks before a reset
// =============================================================================
proptest! {
    #[test]
    fn base_schedule_is_monotone(
        initial_ms in 1u64..5_000,
        multiplier in 1.0f64..4.0,
        attempts in 1usize..60,
    ) {
        let mut backoff = Backoff::new(
            Duration::from_millis(initial_ms),
            Duration::from_secs(60),
            multiplier,
            0.0,
        );
        let mut previous = Duration::ZERO;
        for _ in 0..attempts {
            let delay = backoff.next_delay();
            prop_assert!(delay >= previous);
            previous = delay;
        }
    }
}
