use num_traits::WrappingSub;

/// Returns `true` if at least `dt` has passed from `since` to `now`.
///
/// The difference is taken modulo the width of `T`, so a millisecond counter
/// that rolled over between the two readings still measures correctly as
/// long as less than one full period separates them.
///
/// # Examples
///
/// ```
/// use drum_trigger::time::elapsed;
///
/// assert!(elapsed(10u32, 4, 6));
/// assert!(!elapsed(10u32, 4, 7));
/// // 0xffff_fffe -> 3 is 5 ticks.
/// assert!(elapsed(3u32, 0xffff_fffe, 5));
/// ```
pub fn elapsed<T>(now: T, since: T, dt: T) -> bool
where
    T: WrappingSub + PartialOrd,
{
    now.wrapping_sub(&since) >= dt
}

/// Returns whichever of `a` and `b` happened most recently before `now`.
///
/// Both timestamps must not be ahead of `now`. On equal distance `a` is
/// returned.
pub fn latest<T>(now: T, a: T, b: T) -> T
where
    T: WrappingSub + PartialOrd + Copy,
{
    if now.wrapping_sub(&a) <= now.wrapping_sub(&b) {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_plain() {
        assert!(elapsed(0u32, 0, 0));
        assert!(!elapsed(0u32, 0, 1));
        assert!(elapsed(100u32, 40, 60));
        assert!(!elapsed(100u32, 41, 60));
    }

    #[test]
    fn elapsed_across_rollover() {
        assert!(!elapsed(1u32, u32::MAX - 2, 5));
        assert!(elapsed(2u32, u32::MAX - 2, 5));
        assert!(elapsed(2u16, u16::MAX - 2, 5));
        assert!(!elapsed(1u16, u16::MAX - 2, 5));
    }

    #[test]
    fn latest_picks_closest_to_now() {
        assert_eq!(latest(50u32, 10, 40), 40);
        assert_eq!(latest(50u32, 40, 10), 40);
        assert_eq!(latest(50u32, 30, 30), 30);
    }

    #[test]
    fn latest_across_rollover() {
        // A plain `max` would pick the pre-rollover timestamp here.
        assert_eq!(latest(10u32, u32::MAX - 1, 4), 4);
        assert_eq!(latest(10u32, 4, u32::MAX - 1), 4);
    }
}
