//! Playback configuration, the shared playhead and audio outputs

use crate::audio_file::AudioFile;
use crate::clip::TimeRange;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Audio processing configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Block size in samples
    pub block_size: usize,
    /// Number of output channels
    pub output_channels: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            block_size: 512,
            output_channels: 2,
        }
    }
}

/// A clip as the audio thread sees it
#[derive(Debug, Clone)]
pub struct PlaybackClip {
    /// Timeline position
    pub position: TimeRange,
    /// Decoded audio
    pub audio: Arc<AudioFile>,
}

/// Playback state shared between the UI thread and the audio thread
#[derive(Debug, Default)]
pub struct Playhead {
    clips: BTreeMap<usize, Vec<PlaybackClip>>,
    playing: bool,
    position: f64,
    looping: bool,
    loop_range: TimeRange,
}

/// Handle to the playhead
pub type SharedPlayhead = Arc<Mutex<Playhead>>;

impl Playhead {
    /// A stopped playhead at zero with nothing to play
    pub fn shared() -> SharedPlayhead {
        Arc::new(Mutex::new(Self::default()))
    }

    /// Replace the clips a track contributes
    pub fn set_track_clips(&mut self, track: usize, clips: Vec<PlaybackClip>) {
        if clips.is_empty() {
            self.clips.remove(&track);
        } else {
            self.clips.insert(track, clips);
        }
    }

    /// Number of clips across all tracks
    pub fn num_clips(&self) -> usize {
        self.clips.values().map(Vec::len).sum()
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Set the play state, returning the previous one
    pub(crate) fn replace_playing(&mut self, playing: bool) -> bool {
        std::mem::replace(&mut self.playing, playing)
    }

    /// Position in seconds
    pub fn position(&self) -> f64 {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: f64) {
        self.position = position.max(0.0);
    }

    /// Whether playback wraps around the loop range
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub(crate) fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// The loop range
    pub fn loop_range(&self) -> TimeRange {
        self.loop_range
    }

    pub(crate) fn set_loop_range(&mut self, range: TimeRange) {
        self.loop_range = range;
    }

    /// Mix the clips under the playhead into an interleaved buffer and
    /// advance. Writes silence while stopped.
    pub fn render(&mut self, output: &mut [f32], channels: usize, sample_rate: f64) {
        output.fill(0.0);

        if !self.playing || channels == 0 || sample_rate <= 0.0 {
            return;
        }

        let seconds_per_frame = 1.0 / sample_rate;

        for frame in output.chunks_mut(channels) {
            let time = self.position;

            for clip in self.clips.values().flatten() {
                if !clip.position.contains(time) {
                    continue;
                }
                let source_frame =
                    ((time - clip.position.start) * clip.audio.sample_rate() as f64) as usize;
                for (channel, sample) in frame.iter_mut().enumerate() {
                    *sample += clip.audio.sample(source_frame, channel);
                }
            }

            self.position += seconds_per_frame;

            if self.looping && !self.loop_range.is_empty() && self.position >= self.loop_range.end {
                self.position = self.loop_range.start;
            }
        }
    }
}

/// A device that pulls audio from a playhead
pub trait AudioOutput {
    /// Short description of the output
    fn name(&self) -> String;

    /// Start pulling from `playhead`
    fn start(&mut self, playhead: SharedPlayhead, config: &AudioConfig) -> Result<()>;

    /// Stop pulling
    fn stop(&mut self);

    /// Whether the output is running
    fn is_running(&self) -> bool;
}

/// An output that discards everything. Used when no device is available.
#[derive(Debug, Default)]
pub struct NullOutput {
    running: bool,
}

impl NullOutput {
    /// Create a stopped output
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioOutput for NullOutput {
    fn name(&self) -> String {
        "No audio output".to_string()
    }

    fn start(&mut self, _playhead: SharedPlayhead, _config: &AudioConfig) -> Result<()> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn clip(start: f64, value: f32, frames: usize) -> PlaybackClip {
        PlaybackClip {
            position: TimeRange::with_length(start, frames as f64 / 10.0),
            audio: Arc::new(AudioFile::from_samples(
                PathBuf::from("test.wav"),
                10,
                1,
                vec![value; frames],
            )),
        }
    }

    #[test]
    fn stopped_playhead_renders_silence() {
        let mut playhead = Playhead::default();
        playhead.set_track_clips(0, vec![clip(0.0, 0.5, 10)]);

        let mut buffer = vec![1.0; 8];
        playhead.render(&mut buffer, 2, 10.0);

        assert!(buffer.iter().all(|s| *s == 0.0));
        assert_eq!(playhead.position(), 0.0);
    }

    #[test]
    fn render_mixes_overlapping_tracks() {
        let mut playhead = Playhead::default();
        playhead.set_track_clips(0, vec![clip(0.0, 0.25, 10)]);
        playhead.set_track_clips(1, vec![clip(0.0, 0.5, 10)]);
        playhead.replace_playing(true);

        let mut buffer = vec![0.0; 4];
        playhead.render(&mut buffer, 2, 10.0);

        assert!(buffer.iter().all(|s| (*s - 0.75).abs() < 1e-6));
        assert!((playhead.position() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn looping_wraps_to_loop_start() {
        let mut playhead = Playhead::default();
        playhead.set_track_clips(0, vec![clip(0.0, 1.0, 10)]);
        playhead.set_loop_range(TimeRange::new(0.0, 0.5));
        playhead.set_looping(true);
        playhead.replace_playing(true);

        let mut buffer = vec![0.0; 7];
        playhead.render(&mut buffer, 1, 10.0);

        assert!(playhead.position() < 0.5);
        assert!(buffer.iter().all(|s| *s == 1.0));
    }
}
