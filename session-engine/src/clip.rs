//! Clips placed on audio tracks

use crate::audio_file::AudioFile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// A span of edit time in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time
    pub start: f64,
    /// End time
    pub end: f64,
}

impl TimeRange {
    /// Create a range; the ends are swapped if given backwards
    pub fn new(start: f64, end: f64) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Range starting at `start` lasting `length` seconds
    pub fn with_length(start: f64, length: f64) -> Self {
        Self::new(start, start + length.max(0.0))
    }

    /// Duration in seconds
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the range is zero-length
    pub fn is_empty(&self) -> bool {
        self.length() <= 0.0
    }

    /// Whether `time` falls inside `[start, end)`
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

/// Identifier of a clip within an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(pub u64);

/// A clip that plays an audio file
#[derive(Debug, Clone)]
pub struct WaveClip {
    /// Clip id
    pub id: ClipId,
    /// Display name
    pub name: String,
    /// Source file
    pub source_file: PathBuf,
    /// Where the clip sits on the timeline
    pub position: TimeRange,
    /// Decoded audio, shared with the playback thread
    pub audio: Arc<AudioFile>,
}

/// What gets written to disk for a clip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveClipState {
    /// Display name
    pub name: String,
    /// Source file
    pub source_file: PathBuf,
    /// Timeline position
    pub position: TimeRange,
}

impl From<&WaveClip> for WaveClipState {
    fn from(clip: &WaveClip) -> Self {
        Self {
            name: clip.name.clone(),
            source_file: clip.source_file.clone(),
            position: clip.position,
        }
    }
}
