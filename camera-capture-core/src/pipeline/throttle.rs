use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Default frame divisor: forward every 20th frame to analysis.
pub const DEFAULT_FRAME_DIVISOR: u32 = 20;

/// Decides which camera frames are forwarded for analysis.
///
/// The counter increments unconditionally for every frame received, whether
/// or not that frame is forwarded. This keeps the sampling phase stable and
/// independent of the divisor: changing the divisor takes effect on the next
/// increment without resetting the counter.
#[derive(Debug)]
pub struct FrameThrottle {
    counter: AtomicU64,
    divisor: AtomicU32,
}

impl FrameThrottle {
    pub fn new(divisor: u32) -> Self {
        Self {
            counter: AtomicU64::new(0),
            divisor: AtomicU32::new(divisor.max(1)),
        }
    }

    /// Register one received frame; returns whether it should be analyzed.
    ///
    /// Increments are strictly ordered per delivery thread (one frame source,
    /// one callback at a time).
    pub fn should_analyze(&self) -> bool {
        let index = self.counter.fetch_add(1, Ordering::Relaxed);
        let divisor = self.divisor.load(Ordering::Relaxed) as u64;
        index % divisor == 0
    }

    /// Change the divisor at runtime. A zero divisor is treated as 1.
    pub fn set_divisor(&self, divisor: u32) {
        self.divisor.store(divisor.max(1), Ordering::Relaxed);
    }

    pub fn divisor(&self) -> u32 {
        self.divisor.load(Ordering::Relaxed)
    }

    /// Frames received so far.
    pub fn frame_count(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for FrameThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_DIVISOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_every_nth_frame() {
        let throttle = FrameThrottle::new(4);
        let decisions: Vec<bool> = (0..8).map(|_| throttle.should_analyze()).collect();
        assert_eq!(
            decisions,
            vec![true, false, false, false, true, false, false, false]
        );
    }

    #[test]
    fn counter_matches_modulo_contract() {
        let throttle = FrameThrottle::new(7);
        for i in 0u64..50 {
            assert_eq!(throttle.should_analyze(), i % 7 == 0);
        }
    }

    #[test]
    fn divisor_change_keeps_counter_phase() {
        let throttle = FrameThrottle::new(2);
        // indices 0..4 with divisor 2
        for i in 0u64..4 {
            assert_eq!(throttle.should_analyze(), i % 2 == 0);
        }

        throttle.set_divisor(3);
        // counter continues at 4; next decisions follow i % 3 without reset
        for i in 4u64..10 {
            assert_eq!(throttle.should_analyze(), i % 3 == 0);
        }
        assert_eq!(throttle.frame_count(), 10);
    }

    #[test]
    fn zero_divisor_clamps_to_one() {
        let throttle = FrameThrottle::new(0);
        assert_eq!(throttle.divisor(), 1);
        assert!(throttle.should_analyze());
        assert!(throttle.should_analyze());
    }
}
