// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Offline (non-real-time) rendering.
//!
//! An offline context collects scheduled voices and renders a fixed number
//! of frames in one pass, with no device attached.

use super::mixer::VoiceMixer;
use super::{AudioBackend, AudioError, Voice};

/// Rendered audio, one sample vector per channel
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAudio {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl RenderedAudio {
    /// Build from per-channel data
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// True when no frames were rendered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample across all channels
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0f32, |acc, s| acc.max(s.abs()))
    }
}

/// Fixed-length offline render context
#[derive(Debug)]
pub struct OfflineContext {
    channels: u16,
    length: usize,
    mixer: VoiceMixer,
}

impl OfflineContext {
    /// Create a context rendering `length` frames on `channels` channels
    pub fn new(
        channels: u16,
        length: usize,
        sample_rate: u32,
        master_gain: f32,
    ) -> Result<Self, AudioError> {
        if channels == 0 {
            return Err(AudioError::InvalidConfig("channel count must be positive".into()));
        }
        if sample_rate == 0 {
            return Err(AudioError::InvalidConfig("sample rate must be positive".into()));
        }
        Ok(Self {
            channels,
            length,
            mixer: VoiceMixer::new(sample_rate, master_gain),
        })
    }

    /// Frames this context will render
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of voices scheduled so far
    pub fn scheduled_voices(&self) -> usize {
        self.mixer.active_voices()
    }

    /// Render every scheduled voice. Sounds still ringing at the end are cut.
    pub fn render(mut self) -> RenderedAudio {
        let mut mono = vec![0.0f32; self.length];
        self.mixer.render(&mut mono, 1);
        let channels = vec![mono; self.channels as usize];
        RenderedAudio::new(self.mixer.sample_rate(), channels)
    }
}

impl AudioBackend for OfflineContext {
    fn sample_rate(&self) -> u32 {
        self.mixer.sample_rate()
    }

    fn current_time(&self) -> f64 {
        0.0
    }

    fn play(&mut self, voice: Voice) -> Result<(), AudioError> {
        self.mixer.add(voice);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SampleVoice;
    use std::sync::Arc;

    #[test]
    fn test_rejects_bad_config() {
        assert!(OfflineContext::new(0, 10, 44100, 0.7).is_err());
        assert!(OfflineContext::new(2, 10, 0, 0.7).is_err());
    }

    #[test]
    fn test_render_length_and_channels() {
        let ctx = OfflineContext::new(2, 441, 44100, 0.7).unwrap();
        let out = ctx.render();
        assert_eq!(out.channel_count(), 2);
        assert_eq!(out.len(), 441);
        assert!((out.duration() - 0.01).abs() < 1e-9);
        assert_eq!(out.peak(), 0.0);
    }

    #[test]
    fn test_scheduled_voice_lands_at_offset() {
        let mut ctx = OfflineContext::new(1, 10, 10, 1.0).unwrap();
        ctx.play(Voice::Sample(SampleVoice {
            buffer: Arc::from(vec![0.5f32, 0.5]),
            start: 0.5,
            gain: 1.0,
        }))
        .unwrap();
        assert_eq!(ctx.scheduled_voices(), 1);

        let out = ctx.render();
        let data = out.channel(0).unwrap();
        assert_eq!(data[4], 0.0);
        assert_eq!(data[5], 0.5);
        assert_eq!(data[6], 0.5);
        assert_eq!(data[7], 0.0);
    }

    #[test]
    fn test_truncates_at_length() {
        let mut ctx = OfflineContext::new(1, 3, 10, 1.0).unwrap();
        ctx.play(Voice::Sample(SampleVoice {
            buffer: Arc::from(vec![1.0f32; 10]),
            start: 0.0,
            gain: 1.0,
        }))
        .unwrap();
        let out = ctx.render();
        assert_eq!(out.channel(0).unwrap(), &[1.0, 1.0, 1.0]);
    }
}
