//! Decoding audio files into memory

use crate::error::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// File extensions the decoder understands
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "wav", "wave", "flac", "ogg", "oga", "mp3", "m4a", "aac", "mkv", "webm", "caf",
];

/// Whether a path has one of the [`SUPPORTED_EXTENSIONS`]
pub fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// A fully decoded audio file, samples interleaved
#[derive(Debug, Clone)]
pub struct AudioFile {
    path: PathBuf,
    sample_rate: u32,
    channels: usize,
    samples: Vec<f32>,
}

impl AudioFile {
    /// Decode the whole file
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::AudioFile(format!("{}: {}", path.display(), e)))?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| decode_error(path, e))?;

        let mut format = probed.format;
        let (codec_params, track_id) = {
            let track = format
                .default_track()
                .ok_or_else(|| Error::AudioFile(format!("{}: no audio track", path.display())))?;
            (track.codec_params.clone(), track.id)
        };

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| decode_error(path, e))?;

        let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
        let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(0);
        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(decode_error(path, e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::debug!("Skipping corrupt packet in {}: {}", path.display(), e);
                    continue;
                }
                Err(e) => return Err(decode_error(path, e)),
            };

            let spec = *decoded.spec();
            sample_rate = spec.rate;
            channels = spec.channels.count();

            let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buffer.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buffer.samples());
        }

        if sample_rate == 0 || channels == 0 {
            return Err(Error::AudioFile(format!(
                "{}: unknown sample rate or channel layout",
                path.display()
            )));
        }

        log::debug!(
            "Decoded {} ({} Hz, {} ch, {} frames)",
            path.display(),
            sample_rate,
            channels,
            samples.len() / channels
        );

        Ok(Self {
            path: path.to_path_buf(),
            sample_rate,
            channels,
            samples,
        })
    }

    /// Create from interleaved samples already in memory
    pub fn from_samples(path: PathBuf, sample_rate: u32, channels: usize, samples: Vec<f32>) -> Self {
        Self {
            path,
            sample_rate,
            channels: channels.max(1),
            samples,
        }
    }

    /// Where the audio came from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count
    pub fn num_channels(&self) -> usize {
        self.channels
    }

    /// Number of sample frames
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Length in seconds
    pub fn length(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.num_frames() as f64 / self.sample_rate as f64
        }
    }

    /// Sample at a frame, or silence past the end
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let channel = channel % self.channels;
        self.samples
            .get(frame * self.channels + channel)
            .copied()
            .unwrap_or(0.0)
    }
}

fn decode_error(path: &Path, error: SymphoniaError) -> Error {
    Error::AudioFile(format!("{}: {}", path.display(), error))
}
