// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Project files.
//!
//! A project is a JSON record of everything the engine edits: tempo, time
//! signature, notes, drum pattern and volumes. Loading validates the whole
//! record before touching the engine, so a bad file never leaves partial
//! state behind.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::sequencer::{
    Channel, Composition, DrumPattern, Engine, Note, NoteId, NoteList, Volumes, DEFAULT_TEMPO,
    DEFAULT_TIME_SIGNATURE, STEPS,
};

/// Format version written to new files
pub const FORMAT_VERSION: &str = "1.0";

/// File extension for project files
pub const PROJECT_EXTENSION: &str = "apm";

/// Errors from reading a project record
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Failed to parse project: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid note {id}: {reason}")]
    InvalidNote { id: NoteId, reason: String },
}

// Missing and null fields both fall back to the field default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Persisted project record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "nullable")]
    pub version: String,
    /// Tempo in BPM; 0 means unset
    #[serde(default, deserialize_with = "nullable")]
    pub tempo: u32,
    /// Time signature label; empty means unset
    #[serde(default, deserialize_with = "nullable")]
    pub time_signature: String,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Vec<Note>,
    #[serde(default, deserialize_with = "nullable")]
    pub drum_pattern: DrumPattern,
    #[serde(default, deserialize_with = "nullable")]
    pub volumes: Volumes,
    /// ISO-8601 time the record was written
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Project {
    /// Snapshot an engine's composition, stamped with the current time
    pub fn from_engine(engine: &Engine) -> Self {
        let composition = engine.composition();
        Self {
            version: FORMAT_VERSION.to_string(),
            tempo: composition.tempo,
            time_signature: composition.time_signature.clone(),
            notes: composition.notes.as_slice().to_vec(),
            drum_pattern: composition.pattern.clone(),
            volumes: composition.volumes,
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    /// Parse a project from JSON text
    pub fn from_json(text: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and convert into engine state, filling unset fields with
    /// their defaults
    pub fn into_composition(self) -> Result<Composition, ProjectError> {
        for note in &self.notes {
            validate_note(note)?;
        }

        let mut volumes = Volumes::default();
        for channel in Channel::ALL {
            volumes.set(channel, self.volumes.get(channel));
        }

        Ok(Composition {
            tempo: if self.tempo == 0 {
                DEFAULT_TEMPO
            } else {
                self.tempo
            },
            time_signature: if self.time_signature.trim().is_empty() {
                DEFAULT_TIME_SIGNATURE.to_string()
            } else {
                self.time_signature
            },
            notes: NoteList::from_notes(self.notes),
            pattern: self.drum_pattern,
            volumes,
        })
    }

    /// Load a project file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read project file: {:?}", path.as_ref()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse project file: {:?}", path.as_ref()))
    }

    /// Write the project to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write project file: {:?}", path.as_ref()))
    }
}

fn validate_note(note: &Note) -> Result<(), ProjectError> {
    let reason = if note.start_step >= STEPS {
        format!("start step {} is outside 0-{}", note.start_step, STEPS - 1)
    } else if note.duration == 0 {
        "duration must be at least one step".to_string()
    } else if !(0.0..=1.0).contains(&note.velocity) {
        format!("velocity {} is not a valid level", note.velocity)
    } else {
        return Ok(());
    };
    Err(ProjectError::InvalidNote {
        id: note.id,
        reason,
    })
}

/// Serialize the engine's state as project text
pub fn export_project(engine: &Engine) -> Result<String, ProjectError> {
    Project::from_engine(engine).to_json()
}

/// Replace the engine's state with a project record. On failure the
/// engine is left exactly as it was.
pub fn load_project(engine: &mut Engine, text: &str) -> Result<(), ProjectError> {
    let composition = match Project::from_json(text).and_then(Project::into_composition) {
        Ok(composition) => composition,
        Err(e) => {
            warn!("Project load failed: {}", e);
            return Err(e);
        }
    };

    info!(
        tempo = composition.tempo,
        notes = composition.notes.len(),
        "Project loaded"
    );
    engine.replace_composition(composition);
    Ok(())
}

/// Default file name for a project saved at `now`
pub fn project_filename(now: DateTime<Utc>) -> String {
    format!(
        "music-pixel-{}.{}",
        now.format("%Y-%m-%dT%H-%M-%S"),
        PROJECT_EXTENSION
    )
}
