//! CPAL audio output

use crate::{
    audio::{AudioConfig, AudioOutput, SharedPlayhead},
    error::{Error, Result},
};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, Stream, StreamConfig,
};

/// Plays a playhead through the default output device
pub struct CpalOutput {
    host: cpal::Host,
    stream: Option<Stream>,
    device_name: Option<String>,
}

impl CpalOutput {
    /// Create an output on the default host
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
            stream: None,
            device_name: None,
        }
    }

    /// List all available output devices
    pub fn list_output_devices(&self) -> Result<Vec<String>> {
        let devices: Vec<String> = self
            .host
            .output_devices()
            .map_err(|e| Error::AudioBackendError(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|d| d.name().ok())
            .collect();
        Ok(devices)
    }

    /// Whether a default output device exists
    pub fn has_default_device(&self) -> bool {
        self.host.default_output_device().is_some()
    }
}

impl Default for CpalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for CpalOutput {
    fn name(&self) -> String {
        self.device_name
            .clone()
            .unwrap_or_else(|| format!("{:?}", self.host.id()))
    }

    fn start(&mut self, playhead: SharedPlayhead, config: &AudioConfig) -> Result<()> {
        self.stop();

        let device = self
            .host
            .default_output_device()
            .ok_or_else(|| Error::AudioBackendError("No output device available".to_string()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| Error::AudioBackendError(format!("No usable output config: {}", e)))?;

        let stream_config = StreamConfig {
            channels: supported.channels(),
            sample_rate: supported.sample_rate(),
            buffer_size: BufferSize::Default,
        };

        let channels = stream_config.channels as usize;
        let sample_rate = stream_config.sample_rate.0 as f64;

        if (sample_rate - config.sample_rate).abs() > f64::EPSILON {
            log::info!(
                "Output device runs at {} Hz (configured {} Hz)",
                sample_rate,
                config.sample_rate
            );
        }

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match playhead.lock() {
                    Ok(mut playhead) => playhead.render(data, channels, sample_rate),
                    Err(_) => data.fill(0.0),
                },
                |err| {
                    log::warn!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| {
                Error::AudioBackendError(format!("Failed to build output stream: {}", e))
            })?;

        stream
            .play()
            .map_err(|e| Error::AudioBackendError(format!("Failed to start stream: {}", e)))?;

        self.device_name = device.name().ok();
        log::info!("Audio output started on {}", self.name());
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
            log::info!("Audio output stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.stop();
    }
}
