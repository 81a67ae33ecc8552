use std::time::Duration;

/// Cosmetic frame counter shared by agents and hazards.
///
/// The frame advances once the accumulated time strictly exceeds the period;
/// the accumulator then restarts from zero rather than carrying the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationClock {
    frame: u8,
    frames: u8,
    period: Duration,
    elapsed: Duration,
}

impl AnimationClock {
    pub const fn new(frames: u8, period: Duration) -> Self {
        Self {
            frame: 0,
            frames,
            period,
            elapsed: Duration::ZERO,
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
        if self.elapsed > self.period {
            self.frame = (self.frame + 1) % self.frames.max(1);
            self.elapsed = Duration::ZERO;
        }
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_after_period_is_exceeded() {
        let mut clock = AnimationClock::new(4, Duration::from_millis(100));
        clock.advance(Duration::from_millis(100));
        assert_eq!(clock.frame(), 0);
        clock.advance(Duration::from_millis(1));
        assert_eq!(clock.frame(), 1);
        // Accumulator restarted, so another 100ms is not enough.
        clock.advance(Duration::from_millis(100));
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn wraps_around_frame_count() {
        let mut clock = AnimationClock::new(2, Duration::from_millis(200));
        for _ in 0..3 {
            clock.advance(Duration::from_millis(250));
        }
        assert_eq!(clock.frame(), 1);
    }
}
