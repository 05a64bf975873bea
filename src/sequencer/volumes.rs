// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Channel volumes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DrumVoice;

/// Mixer channel: the melody plus one per drum voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Melody,
    Kick,
    Snare,
    Hihat,
    Crash,
}

impl Channel {
    /// All channels in mixer order
    pub const ALL: [Channel; 5] = [
        Channel::Melody,
        Channel::Kick,
        Channel::Snare,
        Channel::Hihat,
        Channel::Crash,
    ];

    /// Lowercase channel name
    pub fn name(self) -> &'static str {
        match self {
            Channel::Melody => "melody",
            Channel::Kick => "kick",
            Channel::Snare => "snare",
            Channel::Hihat => "hihat",
            Channel::Crash => "crash",
        }
    }
}

impl From<DrumVoice> for Channel {
    fn from(voice: DrumVoice) -> Self {
        match voice {
            DrumVoice::Kick => Channel::Kick,
            DrumVoice::Snare => Channel::Snare,
            DrumVoice::Hihat => Channel::Hihat,
            DrumVoice::Crash => Channel::Crash,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("Unknown mixer channel: {}", s))
    }
}

fn default_melody() -> f32 {
    0.8
}
fn default_kick() -> f32 {
    0.9
}
fn default_snare() -> f32 {
    0.85
}
fn default_hihat() -> f32 {
    0.7
}
fn default_crash() -> f32 {
    0.75
}

/// Gain per channel (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volumes {
    #[serde(default = "default_melody")]
    pub melody: f32,
    #[serde(default = "default_kick")]
    pub kick: f32,
    #[serde(default = "default_snare")]
    pub snare: f32,
    #[serde(default = "default_hihat")]
    pub hihat: f32,
    #[serde(default = "default_crash")]
    pub crash: f32,
}

impl Default for Volumes {
    fn default() -> Self {
        Self {
            melody: default_melody(),
            kick: default_kick(),
            snare: default_snare(),
            hihat: default_hihat(),
            crash: default_crash(),
        }
    }
}

impl Volumes {
    /// Gain for a channel
    pub fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Melody => self.melody,
            Channel::Kick => self.kick,
            Channel::Snare => self.snare,
            Channel::Hihat => self.hihat,
            Channel::Crash => self.crash,
        }
    }

    /// Set gain for a channel, clamped to 0.0 - 1.0
    pub fn set(&mut self, channel: Channel, gain: f32) {
        let gain = if gain.is_finite() { gain.clamp(0.0, 1.0) } else { 0.0 };
        match channel {
            Channel::Melody => self.melody = gain,
            Channel::Kick => self.kick = gain,
            Channel::Snare => self.snare = gain,
            Channel::Hihat => self.hihat = gain,
            Channel::Crash => self.crash = gain,
        }
    }

    /// Set gain from a slider position in percent
    pub fn set_percent(&mut self, channel: Channel, percent: f32) {
        self.set(channel, percent / 100.0);
    }

    /// Gain as a whole percentage, as shown on a slider
    pub fn percent(&self, channel: Channel) -> u8 {
        (self.get(channel) * 100.0).round() as u8
    }
}
