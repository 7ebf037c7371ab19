use std::time::{Duration, Instant};

/// Totals reported when the loop ends.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed: Duration,
    /// Longest interval between two consecutive frames.
    pub longest_frame: Duration,
}

impl RunSummary {
    /// Average frames per second, 0 if no time has elapsed.
    pub fn average_fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Counts frames from the moment the clock is created.
#[derive(Debug, Clone)]
pub struct FrameClock {
    started: Instant,
    last: Instant,
    frames: u64,
    longest: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            started: now,
            last: now,
            frames: 0,
            longest: Duration::ZERO,
        }
    }

    /// Records one completed frame.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        self.longest = self.longest.max(dt);
        self.frames += 1;
    }

    #[cfg(test)]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frames,
            elapsed: self.last.saturating_duration_since(self.started),
            longest_frame: self.longest,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_count_frames_and_track_longest_interval() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);

        clock.tick_at(t0 + Duration::from_millis(16));
        assert_eq!(clock.frames(), 1);
        clock.tick_at(t0 + Duration::from_millis(50));

        let summary = clock.summary();
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.elapsed, Duration::from_millis(50));
        assert_eq!(summary.longest_frame, Duration::from_millis(34));
    }

    #[test]
    fn average_fps_of_empty_run_is_zero() {
        assert_eq!(RunSummary::default().average_fps(), 0.0);
    }

    #[test]
    fn average_fps_divides_frames_by_seconds() {
        let summary = RunSummary {
            frames: 120,
            elapsed: Duration::from_secs(2),
            longest_frame: Duration::ZERO,
        };
        assert_eq!(summary.average_fps(), 60.0);
    }
}
