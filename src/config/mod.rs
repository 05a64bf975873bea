// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Application settings.
//!
//! Settings live in an optional YAML file. Every field has a default, so an
//! empty file (or none at all) gives a working setup.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::audio::AudioConfig;
use crate::sequencer::{EngineSettings, DEFAULT_TEMPO, STEPS};

/// Smallest and largest accepted audio buffer, in frames
pub const BUFFER_SIZE_RANGE: (u32, u32) = (64, 4096);

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Output sample rate; also the export rate when no device is open
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Audio buffer size in frames
    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,
    /// Output channel count
    #[serde(default = "default_channels")]
    pub channels: u16,
    /// Gain applied to the whole mix
    #[serde(default = "default_master_gain")]
    pub master_gain: f32,
    /// Tempo for new projects
    #[serde(default = "default_tempo")]
    pub default_tempo: u32,
    /// Steps rendered by an export when none are given
    #[serde(default = "default_export_steps")]
    pub export_steps: usize,
    /// Length of the add-note preview, in seconds
    #[serde(default = "default_preview_duration")]
    pub preview_duration: f64,
    /// Velocity of the add-note preview
    #[serde(default = "default_preview_velocity")]
    pub preview_velocity: f32,
    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_sample_rate() -> u32 {
    44100
}
fn default_buffer_size() -> u32 {
    512
}
fn default_channels() -> u16 {
    2
}
fn default_master_gain() -> f32 {
    0.7
}
fn default_tempo() -> u32 {
    DEFAULT_TEMPO
}
fn default_export_steps() -> usize {
    STEPS
}
fn default_preview_duration() -> f64 {
    0.2
}
fn default_preview_velocity() -> f32 {
    0.6
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            channels: default_channels(),
            master_gain: default_master_gain(),
            default_tempo: default_tempo(),
            export_steps: default_export_steps(),
            preview_duration: default_preview_duration(),
            preview_velocity: default_preview_velocity(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load settings from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse YAML settings")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize settings to YAML")
    }

    /// Save settings to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write settings file: {:?}", path.as_ref()))
    }

    /// Reject settings the audio path cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            bail!("sample_rate must be positive");
        }
        if self.channels == 0 {
            bail!("channels must be positive");
        }
        if self.default_tempo == 0 {
            bail!("default_tempo must be positive");
        }
        if !(0.0..=1.0).contains(&self.master_gain) {
            bail!("master_gain must be between 0 and 1, got {}", self.master_gain);
        }
        if !(0.0..=1.0).contains(&self.preview_velocity) {
            bail!("preview_velocity must be between 0 and 1, got {}", self.preview_velocity);
        }
        if !(self.preview_duration > 0.0 && self.preview_duration.is_finite()) {
            bail!("preview_duration must be a positive number of seconds");
        }
        Ok(())
    }

    /// Settings for the real-time output; buffer size is clamped to range
    pub fn audio_config(&self) -> AudioConfig {
        let (min, max) = BUFFER_SIZE_RANGE;
        AudioConfig {
            sample_rate: self.sample_rate,
            buffer_size: self.buffer_size.clamp(min, max),
            channels: self.channels,
            master_gain: self.master_gain,
        }
    }

    /// Settings for the engine
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            sample_rate: self.sample_rate,
            master_gain: self.master_gain,
            preview_duration: self.preview_duration,
            preview_velocity: self.preview_velocity,
            ..EngineSettings::default()
        }
    }
}
