// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Opens the default output device and pulls samples from a shared
//! [`VoiceMixer`]. The stream lives as long as the `AudioOutput`; dropping
//! it closes the device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use tracing::{error, info};

use super::mixer::{MixerHandle, VoiceMixer};
use super::AudioError;

/// Audio output configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Buffer size in frames
    pub buffer_size: u32,
    /// Number of output channels
    pub channels: u16,
    /// Master gain applied to the mix
    pub master_gain: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 512,
            channels: 2,
            master_gain: 0.7,
        }
    }
}

impl AudioConfig {
    /// Calculate latency in milliseconds
    pub fn latency_ms(&self) -> f64 {
        (self.buffer_size as f64 / self.sample_rate as f64) * 1000.0
    }
}

/// Open audio output stream
pub struct AudioOutput {
    /// cpal stream
    _stream: Stream,
    /// Output device
    _device: Device,
    /// Current configuration
    config: AudioConfig,
    /// Mixer the stream renders from
    mixer: MixerHandle,
}

impl AudioOutput {
    /// Open the default output device and start rendering from a new mixer
    pub fn open(config: AudioConfig) -> Result<Self, AudioError> {
        if config.channels == 0 || config.sample_rate == 0 {
            return Err(AudioError::InvalidConfig(format!(
                "{} channels at {} Hz",
                config.channels, config.sample_rate
            )));
        }

        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let mixer = MixerHandle::new(VoiceMixer::new(config.sample_rate, config.master_gain));
        let callback_mixer = mixer.clone();
        let channels = config.channels as usize;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback_mixer.render(data, channels);
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                },
                None, // No timeout
            )
            .map_err(|e| AudioError::StreamFailed(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamFailed(format!("Failed to start stream: {}", e)))?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = config.sample_rate,
            latency_ms = config.latency_ms(),
            "Audio output opened"
        );

        Ok(Self {
            _stream: stream,
            _device: device,
            config,
            mixer,
        })
    }

    /// Handle the engine plays voices through
    pub fn handle(&self) -> MixerHandle {
        self.mixer.clone()
    }

    /// Get current configuration
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Stop the stream and release the device
    pub fn close(self) {
        self.mixer.clear();
        info!("Audio output closed");
    }
}

/// List available audio output devices
pub fn list_devices() -> Vec<String> {
    let host = cpal::default_host();
    host.output_devices()
        .map(|devices| {
            devices
                .filter_map(|d| d.name().ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Get default device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device()
        .and_then(|d| d.name().ok())
}
