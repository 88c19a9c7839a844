//! Frame clock: turns `performance.now()` timestamps into whole elapsed
//! milliseconds.
//!
//! `draw_web()` calls at ~60fps with variable, fractional deltas. GameTime
//! hands out integer milliseconds and carries the fraction to the next frame,
//! so the round engine sees exactly as much time as really passed.

/// Upper bound on a single frame's delta. A tab that was asleep for longer
/// than a whole round only needs to finish that round.
const MAX_FRAME_MS: f64 = 60_000.0;

pub struct GameTime {
    /// Fractional milliseconds not yet handed out.
    carry: f64,
    /// Timestamp of the last update (ms), None if first frame.
    last_timestamp: Option<f64>,
}

impl GameTime {
    pub fn new() -> Self {
        Self {
            carry: 0.0,
            last_timestamp: None,
        }
    }

    /// Feed the current timestamp. Returns whole milliseconds since the
    /// previous call (0 on the first frame).
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            // Clock going backwards counts as no time.
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.carry += delta;
        let whole = self.carry.floor();
        self.carry -= whole;
        whole as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_returns_zero() {
        let mut gt = GameTime::new();
        assert_eq!(gt.update(1234.5), 0);
    }

    #[test]
    fn whole_milliseconds_pass_through() {
        let mut gt = GameTime::new();
        gt.update(0.0);
        assert_eq!(gt.update(16.0), 16);
        assert_eq!(gt.update(1016.0), 1000);
    }

    #[test]
    fn fractions_carry_over() {
        let mut gt = GameTime::new();
        gt.update(0.0);
        assert_eq!(gt.update(16.5), 16);
        assert_eq!(gt.update(33.0), 17); // 16.5 + 0.5 carry
        assert_eq!(gt.update(49.75), 16);
        assert_eq!(gt.update(50.0), 1); // 0.75 + 0.25 carry
    }

    #[test]
    fn steady_60fps_adds_up_to_a_second() {
        let mut gt = GameTime::new();
        gt.update(0.0);
        let mut total = 0u32;
        for i in 1..=60 {
            total += gt.update(i as f64 * 16.667);
        }
        assert!((999..=1001).contains(&total), "got {}", total);
    }

    #[test]
    fn backwards_clock_is_ignored() {
        let mut gt = GameTime::new();
        gt.update(500.0);
        assert_eq!(gt.update(400.0), 0);
        assert_eq!(gt.update(450.0), 50);
    }

    #[test]
    fn huge_gap_is_clamped() {
        let mut gt = GameTime::new();
        gt.update(0.0);
        assert_eq!(gt.update(3_600_000.0), 60_000);
    }
}
