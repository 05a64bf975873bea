// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport: play/stop state and the step clock.
//!
//! This module provides:
//! - `TransportState`, the Stopped/Playing state machine and step counter
//! - `Transport`, which drives the engine from a periodic tokio task

pub mod clock;

pub use clock::{Transport, TransportError};

use crate::sequencer::STEPS;

/// Transport play state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
}

/// Play state and step position.
///
/// Every start and stop bumps the generation so a clock task started for
/// an earlier run can tell it has been superseded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportState {
    state: PlayState,
    current_step: usize,
    generation: u64,
}

impl TransportState {
    /// Create a stopped transport at step 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Current play state
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Check if playing
    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// Step that the next tick will play
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Identifier of the current run
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stopped -> Playing from step 0. Returns the new run's generation,
    /// or `None` if already playing.
    pub fn start(&mut self) -> Option<u64> {
        if self.is_playing() {
            return None;
        }
        self.state = PlayState::Playing;
        self.current_step = 0;
        self.generation += 1;
        Some(self.generation)
    }

    /// Playing -> Stopped, rewinding to step 0. Returns whether it was playing.
    pub fn stop(&mut self) -> bool {
        let was_playing = self.is_playing();
        self.state = PlayState::Stopped;
        self.current_step = 0;
        if was_playing {
            self.generation += 1;
        }
        was_playing
    }

    /// Go back to step 0 without leaving the current run
    pub fn rewind(&mut self) {
        self.current_step = 0;
    }

    /// Move to the next step. Returns true when the loop wrapped to 0.
    pub fn advance(&mut self) -> bool {
        self.current_step = (self.current_step + 1) % STEPS;
        self.current_step == 0
    }
}
