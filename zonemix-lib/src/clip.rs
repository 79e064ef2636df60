//! Audio clip descriptors handed to playback slots.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A playable track.
///
/// `length` is the clip duration in seconds and drives every end-of-track
/// decision in the scheduler. `path` is only needed by backends that decode
/// real audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub name: String,
    #[serde(default)]
    pub length: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Clip {
    /// Create an in-memory clip with a known length.
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            length: length.max(0.0),
            path: None,
        }
    }

    /// Create a clip that refers to an audio file on disk.
    pub fn with_path(name: impl Into<String>, length: f32, path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::new(name, length)
        }
    }

    /// Seconds left after `time`.
    pub fn remaining(&self, time: f32) -> f32 {
        self.length - time
    }
}
