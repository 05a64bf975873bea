// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio layer for the step sequencer.
//!
//! This module provides:
//! - The `AudioBackend` capability the engine plays sounds through
//! - Procedural drum and square-wave tone synthesis
//! - A voice mixer shared by real-time and offline rendering
//! - Audio output via cpal and 16-bit WAV encoding

pub mod envelope;
pub mod mixer;
pub mod offline;
pub mod output;
pub mod synth;
pub mod wav;

pub use envelope::{GainEnvelope, Ramp};
pub use mixer::{MixerHandle, VoiceMixer};
pub use offline::{OfflineContext, RenderedAudio};
pub use output::{AudioConfig, AudioOutput};
pub use synth::DrumKit;

use std::sync::Arc;

/// Oscillator shapes the tone source can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// Hard-edged square wave
    Square,
}

/// A periodic tone with a gain envelope
#[derive(Debug, Clone, PartialEq)]
pub struct ToneVoice {
    /// Frequency in Hz
    pub frequency: f64,
    /// Oscillator shape
    pub waveform: Waveform,
    /// Start time in context seconds
    pub start: f64,
    /// Stop time in context seconds
    pub stop: f64,
    /// Gain automation, timed relative to `start`
    pub envelope: GainEnvelope,
}

/// Playback of a precomputed waveform buffer
#[derive(Debug, Clone, PartialEq)]
pub struct SampleVoice {
    /// Mono sample data
    pub buffer: Arc<[f32]>,
    /// Start time in context seconds
    pub start: f64,
    /// Fixed gain applied to every sample
    pub gain: f32,
}

/// A sound source scheduled on an audio backend
#[derive(Debug, Clone, PartialEq)]
pub enum Voice {
    Tone(ToneVoice),
    Sample(SampleVoice),
}

impl Voice {
    /// Start time in context seconds
    pub fn start(&self) -> f64 {
        match self {
            Voice::Tone(tone) => tone.start,
            Voice::Sample(sample) => sample.start,
        }
    }
}

/// Audio output capability.
///
/// Implemented by the real-time cpal output and by the offline render
/// context. Voices are mixed into the backend's destination through its
/// master gain.
pub trait AudioBackend: Send {
    /// Sample rate of the destination in Hz
    fn sample_rate(&self) -> u32;

    /// Current context time in seconds; voices starting now use this
    fn current_time(&self) -> f64;

    /// Schedule a voice for playback
    fn play(&mut self, voice: Voice) -> Result<(), AudioError>;
}

/// Audio error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AudioError {
    /// Failed to start audio stream
    #[error("Audio stream failed: {0}")]
    StreamFailed(String),
    /// Failed to acquire lock
    #[error("Failed to acquire audio lock")]
    LockFailed,
    /// No audio device available
    #[error("No audio device available")]
    NoDevice,
    /// Invalid configuration
    #[error("Invalid audio configuration: {0}")]
    InvalidConfig(String),
    /// Offline render did not complete
    #[error("Offline render failed: {0}")]
    RenderFailed(String),
}
