// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Procedural drum synthesis and tone voices.
//!
//! Drum sounds are rendered once per sample rate into immutable buffers.
//! Noise comes from a seeded RNG so a kit built twice from the same seed is
//! sample-identical, which lets an export pass rebuild the kit in its own
//! context and still match live playback.

use std::f64::consts::PI;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::envelope::GainEnvelope;
use super::{SampleVoice, ToneVoice, Voice, Waveform};
use crate::sequencer::DrumVoice;

/// Length of the kick buffer in seconds
pub const KICK_SECONDS: f64 = 0.5;
/// Length of the snare buffer in seconds
pub const SNARE_SECONDS: f64 = 0.2;
/// Length of the hi-hat buffer in seconds
pub const HIHAT_SECONDS: f64 = 0.1;
/// Length of the crash buffer in seconds
pub const CRASH_SECONDS: f64 = 1.5;

fn buffer_len(sample_rate: u32, seconds: f64) -> usize {
    (sample_rate as f64 * seconds) as usize
}

fn noise(rng: &mut StdRng) -> f64 {
    rng.gen::<f64>() * 2.0 - 1.0
}

/// Kick: sine whose pitch sweeps down from 60 Hz, with a fast decay
pub fn kick(sample_rate: u32) -> Vec<f32> {
    (0..buffer_len(sample_rate, KICK_SECONDS))
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let frequency = 60.0 * (-15.0 * t).exp();
            let envelope = (-8.0 * t).exp();
            ((2.0 * PI * frequency * t).sin() * envelope * 0.8) as f32
        })
        .collect()
}

/// Snare: white noise plus a 200 Hz body
pub fn snare(sample_rate: u32, rng: &mut StdRng) -> Vec<f32> {
    (0..buffer_len(sample_rate, SNARE_SECONDS))
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let body = (2.0 * PI * 200.0 * t).sin() * 0.3;
            ((noise(rng) * 0.5 + body) * (-20.0 * t).exp()) as f32
        })
        .collect()
}

/// Hi-hat: short burst of noise
pub fn hihat(sample_rate: u32, rng: &mut StdRng) -> Vec<f32> {
    (0..buffer_len(sample_rate, HIHAT_SECONDS))
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (noise(rng) * 0.3 * (-30.0 * t).exp()) as f32
        })
        .collect()
}

/// Crash: noise with a long tail
pub fn crash(sample_rate: u32, rng: &mut StdRng) -> Vec<f32> {
    (0..buffer_len(sample_rate, CRASH_SECONDS))
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (noise(rng) * 0.4 * (-2.0 * t).exp()) as f32
        })
        .collect()
}

/// The four synthesized drum buffers for one sample rate
#[derive(Debug, Clone)]
pub struct DrumKit {
    sample_rate: u32,
    kick: Arc<[f32]>,
    snare: Arc<[f32]>,
    hihat: Arc<[f32]>,
    crash: Arc<[f32]>,
}

impl DrumKit {
    /// Render all four voices. Noise voices draw from one RNG in the fixed
    /// order snare, hihat, crash.
    pub fn synthesize(sample_rate: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let kit = Self {
            sample_rate,
            kick: kick(sample_rate).into(),
            snare: snare(sample_rate, &mut rng).into(),
            hihat: hihat(sample_rate, &mut rng).into(),
            crash: crash(sample_rate, &mut rng).into(),
        };
        debug!(sample_rate, seed, "Synthesized drum kit");
        kit
    }

    /// Sample rate the buffers were rendered at
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Shared buffer for a voice
    pub fn buffer(&self, voice: DrumVoice) -> Arc<[f32]> {
        match voice {
            DrumVoice::Kick => Arc::clone(&self.kick),
            DrumVoice::Snare => Arc::clone(&self.snare),
            DrumVoice::Hihat => Arc::clone(&self.hihat),
            DrumVoice::Crash => Arc::clone(&self.crash),
        }
    }

    /// Voice playing `drum` at `start` with a fixed gain
    pub fn voice(&self, drum: DrumVoice, start: f64, gain: f32) -> Voice {
        Voice::Sample(SampleVoice {
            buffer: self.buffer(drum),
            start,
            gain,
        })
    }
}

/// Square-wave note with the standard note envelope
pub fn tone_voice(frequency: f64, start: f64, duration: f64, peak: f32) -> Voice {
    Voice::Tone(ToneVoice {
        frequency,
        waveform: Waveform::Square,
        start,
        stop: start + duration,
        envelope: GainEnvelope::note(peak, duration),
    })
}

/// Oscillator output at `time` seconds after the voice started
pub fn oscillator(waveform: Waveform, frequency: f64, time: f64) -> f32 {
    match waveform {
        Waveform::Square => {
            if (frequency * time).fract() < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
    }
}
