/// Linear tween of a single scalar, anchored to the scheduler clock.
///
/// The tween does not keep its own timer: it is sampled at an absolute
/// time. Completion is signalled separately by a scheduled task at
/// `end_ms()`, so it interleaves correctly with every other timer.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub start_ms: u64,
    pub duration_ms: u64,
}

impl Tween {
    pub fn new(from: f32, to: f32, start_ms: u64, duration_ms: u64) -> Self {
        Tween { from, to, start_ms, duration_ms }
    }

    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    /// Progress 0.0 → 1.0 at `now_ms`, clamped on both ends.
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 || now_ms >= self.end_ms() { return 1.0; }
        if now_ms <= self.start_ms { return 0.0; }
        (now_ms - self.start_ms) as f32 / self.duration_ms as f32
    }

    pub fn value_at(&self, now_ms: u64) -> f32 {
        let p = self.progress(now_ms);
        if p >= 1.0 { return self.to; }
        self.from + (self.to - self.from) * p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_linearly() {
        let t = Tween::new(280.0, -50.0, 1000, 200);
        assert!((t.value_at(1100) - 115.0).abs() < 1e-3);
        assert!(t.progress(1100) < 1.0);
    }

    #[test]
    fn clamps_before_start_and_after_end() {
        let t = Tween::new(-50.0, 280.0, 500, 200);
        assert_eq!(t.value_at(0), -50.0);
        assert_eq!(t.value_at(700), 280.0);
        assert_eq!(t.value_at(10_000), 280.0);
        assert_eq!(t.progress(700), 1.0);
        assert_eq!(t.end_ms(), 700);
    }

    #[test]
    fn zero_duration_is_already_at_target() {
        let t = Tween::new(0.0, 10.0, 50, 0);
        assert_eq!(t.end_ms(), 50);
        assert_eq!(t.value_at(50), 10.0);
        assert_eq!(t.progress(0), 1.0);
    }
}
