//! Frame-stepped fade timers.

/// Outcome of advancing a [`FadeTimer`] by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeStep {
    /// Still fading; carries normalized progress in `[0, 1]`.
    Running(f32),
    Finished,
}

/// Elapsed/duration pair advanced once per tick.
///
/// A fade reports `Finished` on the first tick after its elapsed time passed
/// the duration, so the previous tick always applied progress `1.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FadeTimer {
    elapsed: f32,
    duration: f32,
}

impl FadeTimer {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Restart with a new duration.
    pub fn restart(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.elapsed = 0.0;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// Jump to the given normalized progress.
    pub fn seek_progress(&mut self, progress: f32) {
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        self.elapsed = progress * self.duration;
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Normalized progress, `1.0` for zero-length fades.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Advance by `dt` seconds.
    pub fn step(&mut self, dt: f32) -> FadeStep {
        if self.elapsed > self.duration {
            return FadeStep::Finished;
        }
        self.elapsed += dt.max(0.0);
        FadeStep::Running(self.progress())
    }
}
