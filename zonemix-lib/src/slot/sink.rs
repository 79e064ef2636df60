//! `rodio::Sink` backed slot for real audio output.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::thread;
use std::time::Duration;

use log::{error, warn};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::clip::Clip;

use super::AudioSlot;

const OUTPUT_STREAM_OPEN_RETRIES: usize = 20;
const OUTPUT_STREAM_OPEN_RETRY_MS: u64 = 100;

/// A slot that decodes its clip from disk and plays it on a rodio sink.
pub struct SinkSlot {
    sink: Sink,
    clip: Option<Clip>,
    loaded: bool,
    seek_to: Option<f32>,
}

impl SinkSlot {
    /// Create a paused slot connected to the given output mixer.
    pub fn new(mixer: &rodio::mixer::Mixer) -> Self {
        let sink = Sink::connect_new(mixer);
        sink.pause();
        Self {
            sink,
            clip: None,
            loaded: false,
            seek_to: None,
        }
    }

    /// Decode the assigned clip into the sink.
    ///
    /// # Returns
    ///
    /// `true` when a source was appended.
    fn load(&mut self) -> bool {
        let Some(clip) = self.clip.as_ref() else {
            return false;
        };
        let Some(path) = clip.path.as_ref() else {
            warn!("clip '{}' has no file path; nothing to play", clip.name);
            return false;
        };
        match open_decoder(path) {
            Some(decoder) => {
                self.sink.append(decoder);
                self.loaded = true;
                true
            }
            None => false,
        }
    }
}

impl AudioSlot for SinkSlot {
    fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }

    fn set_clip(&mut self, clip: Option<Clip>) {
        self.sink.clear();
        self.loaded = false;
        self.seek_to = None;
        self.clip = clip;
    }

    fn play(&mut self) {
        if (!self.loaded || self.sink.empty()) && !self.load() {
            return;
        }
        if let Some(time) = self.seek_to.take() {
            if let Err(err) = self.sink.try_seek(Duration::from_secs_f32(time.max(0.0))) {
                warn!("failed to seek to {:.2}s: {}", time, err);
            }
        }
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.clear();
        self.loaded = false;
        self.seek_to = None;
    }

    fn is_playing(&self) -> bool {
        self.loaded && !self.sink.empty() && !self.sink.is_paused()
    }

    fn time(&self) -> f32 {
        if let Some(time) = self.seek_to {
            return time;
        }
        if self.loaded && !self.sink.empty() {
            self.sink.get_pos().as_secs_f32()
        } else {
            0.0
        }
    }

    fn set_time(&mut self, time: f32) {
        if self.loaded && !self.sink.empty() {
            if let Err(err) = self.sink.try_seek(Duration::from_secs_f32(time.max(0.0))) {
                warn!("failed to seek to {:.2}s: {}", time, err);
            }
        } else {
            self.seek_to = Some(time.max(0.0));
        }
    }

    fn volume(&self) -> f32 {
        self.sink.volume()
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    fn update(&mut self, _dt: f32) {
        if self.loaded && self.sink.empty() {
            self.loaded = false;
        }
    }
}

fn open_decoder(path: &Path) -> Option<Decoder<BufReader<File>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            error!("failed to open {}: {}", path.display(), err);
            return None;
        }
    };
    match Decoder::new(BufReader::new(file)) {
        Ok(decoder) => Some(decoder),
        Err(err) => {
            error!("failed to decode {}: {}", path.display(), err);
            None
        }
    }
}

/// Read the duration of an audio file in seconds, if the container reports it.
pub fn probe_length(path: &Path) -> Option<f32> {
    open_decoder(path)?
        .total_duration()
        .map(|duration| duration.as_secs_f32())
}

/// Open the default output stream with bounded retry behavior.
///
/// # Returns
///
/// `Some(OutputStream)` on success, otherwise `None` after all retries fail.
pub fn open_output_stream_with_retry() -> Option<OutputStream> {
    for attempt in 1..=OUTPUT_STREAM_OPEN_RETRIES {
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => return Some(stream),
            Err(err) => {
                if attempt == OUTPUT_STREAM_OPEN_RETRIES {
                    error!(
                        "failed to open default output stream after {} attempts: {}",
                        OUTPUT_STREAM_OPEN_RETRIES, err
                    );
                    return None;
                }
                warn!(
                    "open_default_stream attempt {}/{} failed: {}",
                    attempt, OUTPUT_STREAM_OPEN_RETRIES, err
                );
                thread::sleep(Duration::from_millis(OUTPUT_STREAM_OPEN_RETRY_MS));
            }
        }
    }
    None
}
