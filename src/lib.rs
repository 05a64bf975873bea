// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! pixelseq: a 16-step piano-roll and drum sequencer with a square-wave
//! synth, procedural drums, real-time playback and WAV export.

pub mod audio;
pub mod config;
pub mod music;
pub mod project;
pub mod sequencer;
pub mod transport;
