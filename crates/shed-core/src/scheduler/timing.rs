use std::time::Duration;

use rand::Rng;

/// Time to sleep before the next cycle.
///
/// Cycles are spaced from their real start times; an overrun yields zero.
#[inline]
pub fn sleep_duration(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

/// Uniform random delay in `[0, max_secs]` seconds.
pub fn splay_delay(max_secs: u64) -> Duration {
    splay_delay_with(&mut rand::thread_rng(), max_secs)
}

pub fn splay_delay_with<R: Rng + ?Sized>(rng: &mut R, max_secs: u64) -> Duration {
    if max_secs == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs(rng.gen_range(0..=max_secs))
}
