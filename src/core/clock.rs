use std::time::Instant;

use crate::settings::SketchSettings;

/// Wall clock - just tracks delta time
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Get delta time since last tick and advance clock
    /// Returns delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    /// Reset clock to current time
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Timing handed to a sketch for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since start (wrapped to the loop when looping)
    pub time: f32,
    /// Progress through the loop in [0, 1)
    pub playhead: f32,
    pub frame: u32,
    pub delta: f32,
}

/// Sketch time: elapsed seconds, playhead and frame index
#[derive(Debug, Clone)]
pub struct LoopClock {
    elapsed: f32,
    last_delta: f32,
    duration: Option<f32>,
    fps: f32,
    looping: bool,
    playing: bool,
}

impl LoopClock {
    pub fn new(duration: Option<f32>, fps: f32, looping: bool) -> Self {
        Self {
            elapsed: 0.0,
            last_delta: 0.0,
            duration: duration.filter(|d| *d > 0.0),
            fps: fps.max(f32::EPSILON),
            looping,
            playing: true,
        }
    }

    pub fn from_settings(settings: &SketchSettings) -> Self {
        Self::new(settings.duration, settings.fps, settings.looping)
    }

    /// Advance by `delta` seconds unless paused
    pub fn advance(&mut self, delta: f32) -> FrameTime {
        self.last_delta = if self.playing { delta.max(0.0) } else { 0.0 };
        self.elapsed += self.last_delta;

        if let Some(duration) = self.duration {
            if self.looping {
                self.elapsed %= duration;
            } else {
                self.elapsed = self.elapsed.min(duration);
            }
        }

        self.current()
    }

    pub fn current(&self) -> FrameTime {
        let playhead = match self.duration {
            Some(duration) if self.looping => (self.elapsed / duration).fract(),
            Some(duration) => (self.elapsed / duration).min(1.0),
            None => 0.0,
        };

        FrameTime {
            time: self.elapsed,
            playhead,
            frame: (self.elapsed * self.fps).floor() as u32,
            delta: self.last_delta,
        }
    }

    /// Deterministic timing for frame `index` of a `total`-frame export
    pub fn export_frame(&self, index: u32, total: u32) -> FrameTime {
        let playhead = if total > 0 && self.duration.is_some() {
            index as f32 / total as f32
        } else {
            0.0
        };

        FrameTime {
            time: index as f32 / self.fps,
            playhead,
            frame: index,
            delta: 1.0 / self.fps,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    /// Back to time zero, keeping the play state
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.last_delta = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        assert!(delta >= 0.009);
    }

    #[test]
    fn clock_resets() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        clock.reset();

        let delta = clock.tick();
        assert!(delta < 0.009);
    }

    #[test]
    fn loop_clock_wraps_playhead() {
        let mut clock = LoopClock::new(Some(2.0), 24.0, true);

        let t = clock.advance(0.5);
        assert!((t.playhead - 0.25).abs() < 1e-6);
        assert_eq!(t.frame, 12);

        let t = clock.advance(2.0);
        assert!((t.time - 0.5).abs() < 1e-5);
        assert!(t.playhead >= 0.0 && t.playhead < 1.0);
    }

    #[test]
    fn loop_clock_without_duration_grows() {
        let mut clock = LoopClock::new(None, 24.0, true);
        clock.advance(10.0);
        let t = clock.advance(5.0);
        assert_eq!(t.time, 15.0);
        assert_eq!(t.playhead, 0.0);
    }

    #[test]
    fn loop_clock_clamps_when_not_looping() {
        let mut clock = LoopClock::new(Some(1.0), 24.0, false);
        let t = clock.advance(3.0);
        assert_eq!(t.time, 1.0);
        assert_eq!(t.playhead, 1.0);
    }

    #[test]
    fn paused_clock_holds_time() {
        let mut clock = LoopClock::new(None, 30.0, true);
        clock.advance(1.0);
        clock.pause();
        let t = clock.advance(1.0);
        assert_eq!(t.time, 1.0);
        assert_eq!(t.delta, 0.0);

        clock.toggle();
        clock.restart();
        assert_eq!(clock.current().time, 0.0);
        assert!(clock.is_playing());
    }

    #[test]
    fn export_frames_are_evenly_spaced() {
        let clock = LoopClock::new(Some(5.0), 30.0, true);
        let t = clock.export_frame(75, 150);
        assert!((t.time - 2.5).abs() < 1e-6);
        assert!((t.playhead - 0.5).abs() < 1e-6);
        assert_eq!(t.frame, 75);
    }
}
