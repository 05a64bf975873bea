// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Piano-roll notes.
//!
//! The note list holds at most one note per (pitch, start step) cell.
//! Placing a note on an occupied cell removes the existing one instead.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::STEPS;

/// Default note length in steps
pub const DEFAULT_DURATION: u32 = 1;

/// Default note velocity
pub const DEFAULT_VELOCITY: f32 = 0.8;

/// Largest id a project file may carry (the largest exactly representable
/// integer in a double)
pub const MAX_NOTE_ID: u64 = (1 << 53) - 1;

/// Unique note identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoteId(pub u64);

// Older project files store fractional timestamps as ids; keep the integer part.
impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        if !raw.is_finite() || raw < 0.0 || raw > MAX_NOTE_ID as f64 {
            return Err(serde::de::Error::custom(format!("invalid note id {}", raw)));
        }
        Ok(NoteId(raw as u64))
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

fn default_duration() -> u32 {
    DEFAULT_DURATION
}

fn default_velocity() -> f32 {
    DEFAULT_VELOCITY
}

/// A note placed on the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Pitch name, e.g. "C4"
    #[serde(rename = "note")]
    pub pitch: String,
    /// Step the note starts on (0-15)
    pub start_step: usize,
    /// Length in steps
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// Velocity (0.0 - 1.0)
    #[serde(default = "default_velocity")]
    pub velocity: f32,
}

impl Note {
    /// Whether the note occupies the given cell
    pub fn is_at(&self, pitch: &str, step: usize) -> bool {
        self.start_step == step && self.pitch == pitch
    }
}

/// Result of placing a note on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new note was created
    Added(NoteId),
    /// The cell was occupied; that note was removed
    Removed(NoteId),
}

/// Collection of notes with unique (pitch, start step) cells
#[derive(Debug, Clone, PartialEq)]
pub struct NoteList {
    notes: Vec<Note>,
    next_id: u64,
}

impl Default for NoteList {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteList {
    /// Create an empty note list
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            next_id: 1,
        }
    }

    /// Build from loaded notes. Later notes repeating an earlier cell are
    /// dropped; repeated ids and ids above [`MAX_NOTE_ID`] get fresh ones.
    pub fn from_notes(notes: Vec<Note>) -> Self {
        let mut list = Self::new();
        list.next_id = notes
            .iter()
            .filter(|n| n.id.0 <= MAX_NOTE_ID)
            .map(|n| n.id.0 + 1)
            .max()
            .unwrap_or(1);

        for mut note in notes {
            if list.find(&note.pitch, note.start_step).is_some() {
                tracing::warn!(
                    pitch = %note.pitch,
                    step = note.start_step,
                    "Dropping duplicate note"
                );
                continue;
            }
            if note.id.0 > MAX_NOTE_ID || list.get(note.id).is_some() {
                note.id = list.fresh_id();
            }
            list.notes.push(note);
        }
        list
    }

    fn fresh_id(&mut self) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Place a note, or remove the one already on that cell
    pub fn toggle(
        &mut self,
        pitch: &str,
        start_step: usize,
        duration: u32,
        velocity: f32,
    ) -> AddOutcome {
        if let Some(existing) = self.find(pitch, start_step).map(|n| n.id) {
            self.remove(existing);
            return AddOutcome::Removed(existing);
        }

        let id = self.fresh_id();
        self.notes.push(Note {
            id,
            pitch: pitch.to_string(),
            start_step,
            duration,
            velocity,
        });
        AddOutcome::Added(id)
    }

    /// Remove a note by id
    pub fn remove(&mut self, id: NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(index))
    }

    /// Move a note to a new cell. Another note already on the destination
    /// cell is removed and returned.
    pub fn relocate(&mut self, id: NoteId, pitch: &str, start_step: usize) -> Option<Option<Note>> {
        self.get(id)?;
        let start_step = start_step.min(STEPS - 1);

        let occupant = self
            .notes
            .iter()
            .find(|n| n.id != id && n.is_at(pitch, start_step))
            .map(|n| n.id);
        let displaced = occupant.and_then(|other| self.remove(other));

        let note = self.notes.iter_mut().find(|n| n.id == id)?;
        note.pitch = pitch.to_string();
        note.start_step = start_step;
        Some(displaced)
    }

    /// Remove every note
    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Note occupying a cell
    pub fn find(&self, pitch: &str, start_step: usize) -> Option<&Note> {
        self.notes.iter().find(|n| n.is_at(pitch, start_step))
    }

    /// Note by id
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Notes starting on a step, in insertion order
    pub fn at_step(&self, step: usize) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(move |n| n.start_step == step)
    }

    /// All notes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    /// All notes as a slice
    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    /// Number of notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
