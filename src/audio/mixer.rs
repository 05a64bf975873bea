// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Voice mixer.
//!
//! Sums scheduled voices into output blocks against a running frame clock.
//! Both the real-time output and the offline render context mix through
//! this type, so a voice scheduled at the same context time produces the
//! same samples on either path.

use std::sync::{Arc, Mutex};

use super::synth::oscillator;
use super::{AudioBackend, AudioError, Voice};

/// A voice with its start and end resolved to frames
#[derive(Debug, Clone)]
struct ActiveVoice {
    voice: Voice,
    start_frame: u64,
    end_frame: u64,
}

impl ActiveVoice {
    fn new(voice: Voice, sample_rate: u32) -> Self {
        let rate = sample_rate as f64;
        let start_frame = (voice.start().max(0.0) * rate).round() as u64;
        let end_frame = match &voice {
            Voice::Tone(tone) => (tone.stop.max(0.0) * rate).round() as u64,
            Voice::Sample(sample) => start_frame + sample.buffer.len() as u64,
        };
        Self {
            voice,
            start_frame,
            end_frame,
        }
    }

    fn sample(&self, frame: u64, sample_rate: u32) -> f32 {
        if frame < self.start_frame || frame >= self.end_frame {
            return 0.0;
        }
        let offset = frame - self.start_frame;
        match &self.voice {
            Voice::Tone(tone) => {
                let t = offset as f64 / sample_rate as f64;
                oscillator(tone.waveform, tone.frequency, t) * tone.envelope.value_at(t)
            }
            Voice::Sample(sample) => sample.buffer[offset as usize] * sample.gain,
        }
    }
}

/// Mixes voices into mono frames through a master gain
#[derive(Debug)]
pub struct VoiceMixer {
    sample_rate: u32,
    master_gain: f32,
    /// Frames rendered so far
    frame: u64,
    voices: Vec<ActiveVoice>,
}

impl VoiceMixer {
    /// Create a mixer at frame zero
    pub fn new(sample_rate: u32, master_gain: f32) -> Self {
        Self {
            sample_rate,
            master_gain,
            frame: 0,
            voices: Vec::new(),
        }
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Master gain applied to the summed voices
    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    /// Set master gain (0.0 - 1.0)
    pub fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = gain.clamp(0.0, 1.0);
    }

    /// Frames rendered so far
    pub fn position(&self) -> u64 {
        self.frame
    }

    /// Context time in seconds
    pub fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    /// Number of voices still scheduled or sounding
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Schedule a voice. Voices whose start has already passed begin at
    /// their scheduled frame offset, so the elapsed part is skipped.
    pub fn add(&mut self, voice: Voice) {
        let active = ActiveVoice::new(voice, self.sample_rate);
        if active.end_frame > self.frame {
            self.voices.push(active);
        }
    }

    /// Drop every voice
    pub fn clear(&mut self) {
        self.voices.clear();
    }

    /// Fill an interleaved buffer, writing the same mono mix to every
    /// channel, and advance the frame clock.
    pub fn render(&mut self, buffer: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in buffer.chunks_mut(channels) {
            let value = self.next_frame();
            for sample in frame.iter_mut() {
                *sample = value;
            }
        }
        let now = self.frame;
        self.voices.retain(|v| v.end_frame > now);
    }

    fn next_frame(&mut self) -> f32 {
        let frame = self.frame;
        let sum: f32 = self
            .voices
            .iter()
            .map(|v| v.sample(frame, self.sample_rate))
            .sum();
        self.frame += 1;
        sum * self.master_gain
    }
}

/// Shared handle to a mixer driven by an audio callback.
///
/// The handle is what the engine holds; the device stream that pulls
/// samples from the mixer stays with its owner.
#[derive(Debug, Clone)]
pub struct MixerHandle {
    mixer: Arc<Mutex<VoiceMixer>>,
    sample_rate: u32,
}

impl MixerHandle {
    /// Wrap a mixer for sharing with an audio callback
    pub fn new(mixer: VoiceMixer) -> Self {
        let sample_rate = mixer.sample_rate();
        Self {
            mixer: Arc::new(Mutex::new(mixer)),
            sample_rate,
        }
    }

    /// Render the next block (called from the audio callback)
    pub fn render(&self, buffer: &mut [f32], channels: usize) {
        if let Ok(mut mixer) = self.mixer.lock() {
            mixer.render(buffer, channels);
        }
    }

    /// Number of voices still scheduled or sounding
    pub fn active_voices(&self) -> usize {
        self.mixer.lock().map(|m| m.active_voices()).unwrap_or(0)
    }

    /// Silence everything that is playing
    pub fn clear(&self) {
        if let Ok(mut mixer) = self.mixer.lock() {
            mixer.clear();
        }
    }
}

impl AudioBackend for MixerHandle {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn current_time(&self) -> f64 {
        self.mixer.lock().map(|m| m.current_time()).unwrap_or(0.0)
    }

    fn play(&mut self, voice: Voice) -> Result<(), AudioError> {
        let mut mixer = self.mixer.lock().map_err(|_| AudioError::LockFailed)?;
        mixer.add(voice);
        Ok(())
    }
}
