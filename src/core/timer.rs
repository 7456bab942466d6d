//! Self-contained timers - accumulate delta time and decide when to fire
use std::time::Duration;

/// Frame pacer - fires at the sketch's frame rate
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    pub interval: f32,
    pub accumulator: f32,
}

impl FramePacer {
    /// Create pacer that fires at given frequency
    pub fn new(fps: f32) -> Self {
        Self {
            interval: 1.0 / fps.max(f32::EPSILON),
            accumulator: 0.0,
        }
    }

    /// Update with delta, returns true if a frame is due
    pub fn tick(&mut self, delta: f32) -> bool {
        self.accumulator += delta;

        if self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            // Drop backlog after a stall instead of rendering a burst
            if self.accumulator >= self.interval {
                self.accumulator = 0.0;
            }
            true
        } else {
            false
        }
    }

    /// Time left until the next frame is due
    pub fn time_until_next(&self) -> Duration {
        Duration::from_secs_f32((self.interval - self.accumulator).max(0.0))
    }
}

/// Throttled timer - minimum interval between fires
#[derive(Debug, Clone, Copy)]
pub struct Throttled {
    min_interval: f32,
    time_since_last: f32,
}

impl Throttled {
    /// Create throttled timer with minimum interval
    pub fn new(min_interval: f32) -> Self {
        Self {
            min_interval,
            time_since_last: min_interval, // Allow immediate first tick
        }
    }

    /// Attempt to fire, returns true if enough time has passed
    pub fn try_tick(&mut self, delta: f32) -> bool {
        self.time_since_last += delta;

        if self.time_since_last >= self.min_interval {
            self.time_since_last = 0.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacer_fires_at_rate() {
        let mut pacer = FramePacer::new(60.0);

        assert!(!pacer.tick(0.01));
        assert!(pacer.tick(0.01));
        assert!(!pacer.tick(0.001));
    }

    #[test]
    fn pacer_drops_backlog() {
        let mut pacer = FramePacer::new(10.0);

        assert!(pacer.tick(1.0));
        assert_eq!(pacer.accumulator, 0.0);
        assert!(!pacer.tick(0.05));
    }

    #[test]
    fn pacer_reports_wait() {
        let mut pacer = FramePacer::new(10.0);
        pacer.tick(0.04);
        let wait = pacer.time_until_next().as_secs_f32();
        assert!((wait - 0.06).abs() < 1e-4);
    }

    #[test]
    fn throttled_enforces_minimum() {
        let mut timer = Throttled::new(0.1);

        assert!(timer.try_tick(0.05));
        assert!(!timer.try_tick(0.05));
        assert!(timer.try_tick(0.06));
    }
}
