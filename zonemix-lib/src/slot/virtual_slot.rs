//! Clocked in-memory slot.

use crate::clip::Clip;

use super::AudioSlot;

/// A slot that produces no sound and advances on [`AudioSlot::update`].
///
/// Used for offline simulation, dry runs, and tests.
#[derive(Debug, Clone, Default)]
pub struct VirtualSlot {
    clip: Option<Clip>,
    playing: bool,
    time: f32,
    volume: f32,
}

impl VirtualSlot {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            ..Self::default()
        }
    }
}

impl AudioSlot for VirtualSlot {
    fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }

    fn set_clip(&mut self, clip: Option<Clip>) {
        self.clip = clip;
        self.playing = false;
        self.time = 0.0;
    }

    fn play(&mut self) {
        let Some(clip) = self.clip.as_ref() else {
            return;
        };
        if self.time >= clip.length {
            self.time = 0.0;
        }
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn time(&self) -> f32 {
        self.time
    }

    fn set_time(&mut self, time: f32) {
        let length = self.clip.as_ref().map(|clip| clip.length).unwrap_or(0.0);
        self.time = time.clamp(0.0, length);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        let Some(clip) = self.clip.as_ref() else {
            self.playing = false;
            return;
        };
        self.time += dt.max(0.0);
        if self.time >= clip.length {
            self.playing = false;
            self.time = 0.0;
        }
    }
}
