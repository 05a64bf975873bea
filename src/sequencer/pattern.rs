// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Drum pattern grid.
//!
//! Four fixed voices, each with exactly sixteen on/off steps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::STEPS;

/// Drum voices, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrumVoice {
    Kick,
    Snare,
    Hihat,
    Crash,
}

impl DrumVoice {
    /// All voices in display order
    pub const ALL: [DrumVoice; 4] = [
        DrumVoice::Kick,
        DrumVoice::Snare,
        DrumVoice::Hihat,
        DrumVoice::Crash,
    ];

    /// Lowercase name used in project files
    pub fn name(self) -> &'static str {
        match self {
            DrumVoice::Kick => "kick",
            DrumVoice::Snare => "snare",
            DrumVoice::Hihat => "hihat",
            DrumVoice::Crash => "crash",
        }
    }
}

impl fmt::Display for DrumVoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DrumVoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DrumVoice::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| format!("Unknown drum voice: {}", s))
    }
}

/// One row of the drum grid
pub type StepRow = [bool; STEPS];

/// On/off steps for every drum voice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrumPattern {
    #[serde(default)]
    kick: StepRow,
    #[serde(default)]
    snare: StepRow,
    #[serde(default)]
    hihat: StepRow,
    #[serde(default)]
    crash: StepRow,
}

impl DrumPattern {
    /// Empty pattern
    pub fn new() -> Self {
        Self::default()
    }

    /// Basic rock beat used as the starting pattern of a new project
    pub fn rock() -> Self {
        let mut pattern = Self::new();
        for step in [0, 3, 6, 8, 11, 14] {
            pattern.kick[step] = true;
        }
        for step in [2, 6, 10, 14] {
            pattern.snare[step] = true;
        }
        pattern.hihat = [true; STEPS];
        pattern.crash[0] = true;
        pattern
    }

    /// Steps of one voice
    pub fn row(&self, voice: DrumVoice) -> &StepRow {
        match voice {
            DrumVoice::Kick => &self.kick,
            DrumVoice::Snare => &self.snare,
            DrumVoice::Hihat => &self.hihat,
            DrumVoice::Crash => &self.crash,
        }
    }

    fn row_mut(&mut self, voice: DrumVoice) -> &mut StepRow {
        match voice {
            DrumVoice::Kick => &mut self.kick,
            DrumVoice::Snare => &mut self.snare,
            DrumVoice::Hihat => &mut self.hihat,
            DrumVoice::Crash => &mut self.crash,
        }
    }

    /// Whether a voice plays on a step.
    ///
    /// # Panics
    /// Panics if `step >= STEPS`.
    pub fn is_active(&self, voice: DrumVoice, step: usize) -> bool {
        self.row(voice)[step]
    }

    /// Set a single step.
    ///
    /// # Panics
    /// Panics if `step >= STEPS`.
    pub fn set(&mut self, voice: DrumVoice, step: usize, active: bool) {
        self.row_mut(voice)[step] = active;
    }

    /// Flip a step and return its new value. Callers validate `step`.
    ///
    /// # Panics
    /// Panics if `step >= STEPS`.
    pub fn toggle(&mut self, voice: DrumVoice, step: usize) -> bool {
        let cell = &mut self.row_mut(voice)[step];
        *cell = !*cell;
        *cell
    }

    /// Voices that play on a step, in display order
    pub fn active_voices(&self, step: usize) -> impl Iterator<Item = DrumVoice> + '_ {
        DrumVoice::ALL
            .into_iter()
            .filter(move |v| self.is_active(*v, step))
    }

    /// Turn every step off
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// True when no step is on
    pub fn is_empty(&self) -> bool {
        DrumVoice::ALL
            .iter()
            .all(|v| self.row(*v).iter().all(|on| !on))
    }
}
