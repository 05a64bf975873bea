// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch utilities for the piano roll.
//!
//! This module provides the equal-tempered frequency table, pitch name
//! parsing, and the mappings used by the interaction layer (computer
//! keyboard keys and piano-roll rows).

pub mod pitch;

pub use pitch::{frequency, is_valid_pitch, key_to_pitch, pitch_for_row, row_for_pitch, ROLL_ROWS};
