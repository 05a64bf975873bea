// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequencer core: the note grid, drum pattern, mixer and the engine that
//! turns them into sound.
//!
//! This module provides:
//! - A 16-step note list with toggle-on-place semantics
//! - A fixed four-voice drum pattern
//! - Per-channel volumes
//! - The engine that triggers and exports audio

pub mod engine;
pub mod note;
pub mod pattern;
pub mod volumes;

pub use engine::{Composition, Engine, EngineSettings, ExportJob, SharedEngine, StepTick};
pub use note::{AddOutcome, Note, NoteId, NoteList};
pub use pattern::{DrumPattern, DrumVoice};
pub use volumes::{Channel, Volumes};

/// Steps in one loop of the grid
pub const STEPS: usize = 16;

/// Grid steps per beat (sixteenth notes)
pub const STEPS_PER_BEAT: u32 = 4;

/// Default tempo in BPM
pub const DEFAULT_TEMPO: u32 = 120;

/// Default time signature label
pub const DEFAULT_TIME_SIGNATURE: &str = "4/4";

/// Timing information for the sequencer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerTiming {
    /// Current tempo in BPM
    pub tempo: u32,
    /// Grid steps per beat
    pub steps_per_beat: u32,
}

impl Default for SequencerTiming {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            steps_per_beat: STEPS_PER_BEAT,
        }
    }
}

impl SequencerTiming {
    /// Create new timing with specified tempo
    pub fn with_tempo(tempo: u32) -> Self {
        Self {
            tempo: tempo.max(1),
            ..Default::default()
        }
    }

    /// Length of one step in seconds: `60 / tempo / steps_per_beat`
    pub fn step_duration(&self) -> f64 {
        60.0 / self.tempo as f64 / self.steps_per_beat as f64
    }

    /// Absolute time of a step from the start of playback
    pub fn step_time(&self, step: usize) -> f64 {
        step as f64 * self.step_duration()
    }

    /// Length of one full loop in seconds
    pub fn loop_duration(&self) -> f64 {
        self.step_time(STEPS)
    }
}

/// Beats per measure from a "N/M" label, falling back to 4
pub fn beats_per_measure(time_signature: &str) -> u32 {
    time_signature
        .split('/')
        .next()
        .and_then(|n| n.trim().parse().ok())
        .filter(|&n| n > 0)
        .unwrap_or(4)
}
