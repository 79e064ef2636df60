use std::time::{Duration, Instant};

/// Wall-clock frame timer for real-time tick loops.
///
/// `frame` returns the time since the previous frame. Time spent while the
/// clock is paused is not reported.
#[derive(Debug, Clone)]
pub struct FrameClock {
    pub time: Duration,
    last_frame: Option<Instant>,
    max_frame: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            time: Duration::new(0, 0),
            last_frame: None,
            max_frame: Duration::from_millis(250),
        }
    }

    /// Cap a single frame delta, so a stalled terminal does not skip whole
    /// fades in one tick.
    pub fn with_max_frame(mut self, max_frame: Duration) -> Self {
        self.max_frame = max_frame;
        self
    }

    pub fn start(&mut self) {
        self.last_frame = Some(Instant::now());
    }

    pub fn un_pause(&mut self) {
        if self.last_frame.is_none() {
            self.last_frame = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(last) = self.last_frame.take() {
            self.time += last.elapsed().min(self.max_frame);
        }
    }

    /// Seconds since the previous frame (0 while paused or not started).
    pub fn frame(&mut self) -> f32 {
        let Some(last) = self.last_frame else {
            return 0.0;
        };
        let now = Instant::now();
        let delta = now.duration_since(last).min(self.max_frame);
        self.last_frame = Some(now);
        self.time += delta;
        delta.as_secs_f32()
    }

    pub fn get_time(&self) -> Duration {
        self.time
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
        self.time = Duration::new(0, 0);
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
