// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Synth and pattern engine.
//!
//! The engine owns the composition (notes, drum pattern, volumes, tempo),
//! the transport state, and an optional audio backend. Editing works with
//! or without audio; playback calls are silent no-ops when no backend is
//! attached.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tracing::{debug, info, warn};

use super::note::{DEFAULT_DURATION, DEFAULT_VELOCITY};
use super::{
    beats_per_measure, AddOutcome, Channel, DrumPattern, DrumVoice, Note, NoteId, NoteList,
    SequencerTiming, Volumes, DEFAULT_TEMPO, DEFAULT_TIME_SIGNATURE, STEPS,
};
use crate::audio::synth::tone_voice;
use crate::audio::{AudioBackend, AudioError, DrumKit, OfflineContext, RenderedAudio, Voice};
use crate::music::{frequency, key_to_pitch};
use crate::transport::TransportState;

/// Engine shared between the caller and the transport clock
pub type SharedEngine = Arc<Mutex<Engine>>;

/// Duration of the preview played when a key is pressed, in seconds
pub const KEY_PREVIEW_DURATION: f64 = 0.3;

/// Velocity of the preview played when a key is pressed
pub const KEY_PREVIEW_VELOCITY: f32 = 0.7;

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Sample rate used for export when no backend is attached
    pub sample_rate: u32,
    /// Master gain for export renders
    pub master_gain: f32,
    /// Channels in an export render
    pub export_channels: u16,
    /// Length of the add-note preview in seconds
    pub preview_duration: f64,
    /// Velocity of the add-note preview
    pub preview_velocity: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            master_gain: 0.7,
            export_channels: 2,
            preview_duration: 0.2,
            preview_velocity: 0.6,
        }
    }
}

/// Everything a project file stores
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Tempo in BPM
    pub tempo: u32,
    /// Time signature label, e.g. "4/4"
    pub time_signature: String,
    pub notes: NoteList,
    pub pattern: DrumPattern,
    pub volumes: Volumes,
}

impl Default for Composition {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            time_signature: DEFAULT_TIME_SIGNATURE.to_string(),
            notes: NoteList::new(),
            pattern: DrumPattern::new(),
            volumes: Volumes::default(),
        }
    }
}

impl Composition {
    /// Step timing at this composition's tempo
    pub fn timing(&self) -> SequencerTiming {
        SequencerTiming::with_tempo(self.tempo)
    }

    /// Voices that sound when a step is played at `start`.
    ///
    /// Notes starting on `note_step` play for their length in steps; drums
    /// active on `pattern_step` play their full buffer. Unknown pitches are
    /// skipped.
    pub fn step_voices(
        &self,
        kit: &DrumKit,
        note_step: Option<usize>,
        pattern_step: usize,
        start: f64,
    ) -> Vec<Voice> {
        let step_duration = self.timing().step_duration();
        let melody = self.volumes.get(Channel::Melody);

        let tones = note_step
            .into_iter()
            .flat_map(|step| self.notes.at_step(step))
            .filter_map(|note| {
                let freq = frequency(&note.pitch)?;
                let length = note.duration as f64 * step_duration;
                Some(tone_voice(freq, start, length, note.velocity * melody))
            });

        let drums = self
            .pattern
            .active_voices(pattern_step)
            .map(|drum| kit.voice(drum, start, self.volumes.get(drum.into())));

        tones.chain(drums).collect()
    }
}

/// What a single transport tick played
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTick {
    /// Step that was played
    pub step: usize,
    /// Notes starting on the step
    pub notes: usize,
    /// Drum voices active on the step
    pub drums: Vec<DrumVoice>,
    /// Whether the position wrapped back to step 0 afterwards
    pub wrapped: bool,
}

/// Synth and pattern engine
pub struct Engine {
    composition: Composition,
    transport: TransportState,
    settings: EngineSettings,
    /// Seed for drum noise, shared by live and export kits
    noise_seed: u64,
    backend: Option<Box<dyn AudioBackend>>,
    kit: Option<DrumKit>,
    /// Wakes the clock task when the step length must apply at once
    reschedule: Arc<Notify>,
}

impl Engine {
    /// Create an engine with default settings and no audio
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    /// Create an engine with custom settings
    pub fn with_settings(settings: EngineSettings) -> Self {
        Self {
            composition: Composition::default(),
            transport: TransportState::new(),
            settings,
            noise_seed: rand::random(),
            backend: None,
            kit: None,
            reschedule: Arc::new(Notify::new()),
        }
    }

    /// Use a fixed seed for drum noise
    pub fn with_noise_seed(mut self, seed: u64) -> Self {
        self.noise_seed = seed;
        self
    }

    /// Wrap in a shared handle for use with a [`crate::transport::Transport`]
    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    // ---- Audio lifecycle ----

    /// Attach an audio backend and synthesize the drum kit at its rate
    pub fn attach_backend(&mut self, backend: Box<dyn AudioBackend>) {
        let sample_rate = backend.sample_rate();
        self.kit = Some(DrumKit::synthesize(sample_rate, self.noise_seed));
        self.backend = Some(backend);
        info!(sample_rate, "Audio backend attached");
    }

    /// Detach the audio backend; playback becomes silent
    pub fn detach_backend(&mut self) -> Option<Box<dyn AudioBackend>> {
        self.kit = None;
        let backend = self.backend.take();
        if backend.is_some() {
            info!("Audio backend detached");
        }
        backend
    }

    /// Check if an audio backend is attached
    pub fn has_audio(&self) -> bool {
        self.backend.is_some()
    }

    /// Sample rate of the backend, or the configured rate without one
    pub fn sample_rate(&self) -> u32 {
        self.backend
            .as_ref()
            .map_or(self.settings.sample_rate, |b| b.sample_rate())
    }

    /// Engine settings
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    // ---- Composition ----

    /// Current composition
    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Replace the whole composition
    pub fn replace_composition(&mut self, composition: Composition) {
        self.composition = composition;
    }

    /// Tempo in BPM
    pub fn tempo(&self) -> u32 {
        self.composition.tempo
    }

    /// Length of one step in seconds at the current tempo
    pub fn step_duration(&self) -> f64 {
        self.composition.timing().step_duration()
    }

    /// Set the tempo. While playing, the transport restarts from step 0 and
    /// the clock reschedules at once, so the next step lands one new step
    /// length from now.
    pub fn set_tempo(&mut self, bpm: u32) {
        self.composition.tempo = bpm.max(1);
        if self.transport.is_playing() {
            self.transport.rewind();
            self.reschedule.notify_one();
            debug!(bpm, "Tempo changed while playing, restarting from step 0");
        }
    }

    /// Signal raised when the running clock must reschedule immediately
    pub fn clock_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.reschedule)
    }

    /// Time signature label
    pub fn time_signature(&self) -> &str {
        &self.composition.time_signature
    }

    /// Relabel the time signature (step timing is unaffected)
    pub fn set_time_signature(&mut self, label: impl Into<String>) {
        self.composition.time_signature = label.into();
    }

    /// Beats per measure taken from the time signature
    pub fn beats_per_measure(&self) -> u32 {
        beats_per_measure(&self.composition.time_signature)
    }

    /// Notes on the grid
    pub fn notes(&self) -> &NoteList {
        &self.composition.notes
    }

    /// Drum pattern
    pub fn pattern(&self) -> &DrumPattern {
        &self.composition.pattern
    }

    /// Channel volumes
    pub fn volumes(&self) -> &Volumes {
        &self.composition.volumes
    }

    /// Place a note with default length and velocity
    pub fn add_note(&mut self, pitch: &str, start_step: usize) -> AddOutcome {
        self.add_note_with(pitch, start_step, DEFAULT_DURATION, DEFAULT_VELOCITY)
    }

    /// Place a note, or remove the note already on that cell. A newly
    /// placed note is previewed.
    pub fn add_note_with(
        &mut self,
        pitch: &str,
        start_step: usize,
        duration: u32,
        velocity: f32,
    ) -> AddOutcome {
        let outcome = self
            .composition
            .notes
            .toggle(pitch, start_step, duration, velocity);

        match outcome {
            AddOutcome::Added(id) => {
                debug!(%id, pitch, start_step, "Note added");
                let (length, preview_velocity) =
                    (self.settings.preview_duration, self.settings.preview_velocity);
                self.play_note(pitch, length, preview_velocity);
            }
            AddOutcome::Removed(id) => debug!(%id, pitch, start_step, "Note removed by toggle"),
        }
        outcome
    }

    /// Remove a note by id; no-op if absent
    pub fn remove_note(&mut self, id: NoteId) -> Option<Note> {
        self.composition.notes.remove(id)
    }

    /// Move a note to a new pitch and step. A note already on the
    /// destination cell is removed. Returns false if `id` is unknown.
    pub fn move_note(&mut self, id: NoteId, pitch: &str, start_step: usize) -> bool {
        match self.composition.notes.relocate(id, pitch, start_step) {
            Some(displaced) => {
                if let Some(other) = displaced {
                    debug!(id = %other.id, "Note displaced by move");
                }
                true
            }
            None => false,
        }
    }

    /// Remove every note
    pub fn clear_notes(&mut self) {
        self.composition.notes.clear();
    }

    /// Turn every drum step off
    pub fn clear_pattern(&mut self) {
        self.composition.pattern.clear();
    }

    /// Load the rock preset, but only into a project with no notes.
    /// Returns whether the preset was applied.
    pub fn apply_preset(&mut self) -> bool {
        if !self.composition.notes.is_empty() {
            return false;
        }
        self.composition.pattern = DrumPattern::rock();
        true
    }

    /// Flip a drum step and return its new value.
    ///
    /// # Panics
    /// Panics if `step >= STEPS`; callers validate grid coordinates.
    pub fn toggle_drum_step(&mut self, voice: DrumVoice, step: usize) -> bool {
        self.composition.pattern.toggle(voice, step)
    }

    /// Set a channel volume from a slider percentage. Sounds already
    /// playing keep their gain.
    pub fn set_volume(&mut self, channel: Channel, percent: f32) {
        self.composition.volumes.set_percent(channel, percent);
    }

    // ---- Playback ----

    /// Play a square-wave tone for `duration` seconds. Unknown pitches and
    /// a missing backend are silently ignored.
    pub fn play_note(&mut self, pitch: &str, duration: f64, velocity: f32) {
        let Some(freq) = frequency(pitch) else {
            debug!(pitch, "Ignoring unknown pitch");
            return;
        };
        let peak = velocity * self.composition.volumes.get(Channel::Melody);
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        let start = backend.current_time();
        if let Err(e) = backend.play(tone_voice(freq, start, duration, peak)) {
            warn!("Failed to play note {}: {}", pitch, e);
        }
    }

    /// Play one drum voice now at its channel volume
    pub fn play_drum(&mut self, voice: DrumVoice) {
        let gain = self.composition.volumes.get(voice.into());
        let (Some(backend), Some(kit)) = (self.backend.as_mut(), self.kit.as_ref()) else {
            return;
        };
        let start = backend.current_time();
        if let Err(e) = backend.play(kit.voice(voice, start, gain)) {
            warn!("Failed to play {}: {}", voice, e);
        }
    }

    /// Play every note starting on `step` and every active drum on it
    pub fn play_step(&mut self, step: usize) -> StepTick {
        let tick = StepTick {
            step,
            notes: self.composition.notes.at_step(step).count(),
            drums: self.composition.pattern.active_voices(step).collect(),
            wrapped: false,
        };

        if let (Some(backend), Some(kit)) = (self.backend.as_mut(), self.kit.as_ref()) {
            let start = backend.current_time();
            for voice in self.composition.step_voices(kit, Some(step), step, start) {
                if let Err(e) = backend.play(voice) {
                    warn!(step, "Failed to play step voice: {}", e);
                }
            }
        }
        tick
    }

    /// Play the transport's current step
    pub fn play_current_step(&mut self) -> StepTick {
        self.play_step(self.transport.current_step())
    }

    /// Handle a computer-keyboard key: preview its pitch and, while
    /// playing, place it on the current step. Returns the mapped pitch.
    pub fn key_press(&mut self, key: char) -> Option<&'static str> {
        let pitch = key_to_pitch(key)?;
        self.play_note(pitch, KEY_PREVIEW_DURATION, KEY_PREVIEW_VELOCITY);
        if self.transport.is_playing() {
            let step = self.transport.current_step();
            self.add_note(pitch, step);
        }
        Some(pitch)
    }

    // ---- Transport ----

    /// Transport state
    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    /// Check if playing
    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Step the next tick will play
    pub fn current_step(&self) -> usize {
        self.transport.current_step()
    }

    /// Enter the playing state at step 0. Returns the run's generation, or
    /// `None` if already playing.
    pub fn start_playback(&mut self) -> Option<u64> {
        let generation = self.transport.start()?;
        info!(tempo = self.tempo(), "Playback started");
        Some(generation)
    }

    /// Stop and rewind to step 0
    pub fn stop_playback(&mut self) {
        if self.transport.stop() {
            info!("Playback stopped");
        }
    }

    /// Play the current step and advance. Returns `None` when stopped.
    pub fn tick(&mut self) -> Option<StepTick> {
        if !self.transport.is_playing() {
            return None;
        }
        let mut tick = self.play_current_step();
        tick.wrapped = self.transport.advance();
        Some(tick)
    }

    /// Tick on behalf of the clock task for run `generation`. Returns `None`
    /// once that run has been stopped or replaced.
    pub fn tick_run(&mut self, generation: u64) -> Option<StepTick> {
        if self.transport.generation() != generation {
            return None;
        }
        self.tick()
    }

    // ---- Export ----

    /// Snapshot the composition for an offline render of `total_steps`
    pub fn export_job(&self, total_steps: usize) -> ExportJob {
        ExportJob {
            composition: self.composition.clone(),
            total_steps,
            sample_rate: self.sample_rate(),
            channels: self.settings.export_channels,
            master_gain: self.settings.master_gain,
            noise_seed: self.noise_seed,
        }
    }

    /// Render `total_steps` steps offline. The composition is snapshotted
    /// before this returns, so the engine can keep playing and editing
    /// while the render runs.
    pub fn export_audio(
        &self,
        total_steps: usize,
    ) -> impl Future<Output = Result<RenderedAudio, AudioError>> + Send + 'static {
        let job = self.export_job(total_steps);
        job.render_async()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Self-contained offline render of a composition snapshot
#[derive(Debug, Clone)]
pub struct ExportJob {
    composition: Composition,
    total_steps: usize,
    sample_rate: u32,
    channels: u16,
    master_gain: f32,
    noise_seed: u64,
}

impl ExportJob {
    /// Steps to render
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Frames the render will contain
    pub fn frame_count(&self) -> usize {
        let seconds = self.composition.timing().step_time(self.total_steps);
        (seconds * self.sample_rate as f64).ceil() as usize
    }

    /// Render in the calling thread.
    ///
    /// The drum pattern loops every 16 steps; notes only sound in the first
    /// pass since they are placed on steps 0-15.
    pub fn render(&self) -> Result<RenderedAudio, AudioError> {
        info!(
            steps = self.total_steps,
            sample_rate = self.sample_rate,
            "Rendering export"
        );
        let mut context = OfflineContext::new(
            self.channels,
            self.frame_count(),
            self.sample_rate,
            self.master_gain,
        )?;
        let kit = DrumKit::synthesize(self.sample_rate, self.noise_seed);
        let timing = self.composition.timing();

        for step in 0..self.total_steps {
            let note_step = (step < STEPS).then_some(step);
            let start = timing.step_time(step);
            for voice in self
                .composition
                .step_voices(&kit, note_step, step % STEPS, start)
            {
                context.play(voice)?;
            }
        }

        let audio = context.render();
        info!(seconds = audio.duration(), "Export rendered");
        Ok(audio)
    }

    /// Render on the blocking thread pool
    pub async fn render_async(self) -> Result<RenderedAudio, AudioError> {
        tokio::task::spawn_blocking(move || self.render())
            .await
            .map_err(|e| AudioError::RenderFailed(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{MixerHandle, VoiceMixer};

    /// Backend that records every voice it is asked to play
    #[derive(Clone, Default)]
    struct RecordingBackend {
        voices: Arc<Mutex<Vec<Voice>>>,
    }

    impl RecordingBackend {
        fn played(&self) -> Vec<Voice> {
            self.voices.lock().unwrap().clone()
        }

        fn tones(&self) -> Vec<f64> {
            self.played()
                .into_iter()
                .filter_map(|v| match v {
                    Voice::Tone(t) => Some(t.frequency),
                    _ => None,
                })
                .collect()
        }

        fn samples(&self) -> usize {
            self.played()
                .iter()
                .filter(|v| matches!(v, Voice::Sample(_)))
                .count()
        }
    }

    impl AudioBackend for RecordingBackend {
        fn sample_rate(&self) -> u32 {
            8000
        }

        fn current_time(&self) -> f64 {
            0.0
        }

        fn play(&mut self, voice: Voice) -> Result<(), AudioError> {
            self.voices.lock().unwrap().push(voice);
            Ok(())
        }
    }

    fn engine_with_recorder() -> (Engine, RecordingBackend) {
        let backend = RecordingBackend::default();
        let mut engine = Engine::new().with_noise_seed(1);
        engine.attach_backend(Box::new(backend.clone()));
        (engine, backend)
    }

    #[test]
    fn test_defaults() {
        let engine = Engine::new();
        assert_eq!(engine.tempo(), 120);
        assert_eq!(engine.time_signature(), "4/4");
        assert!(engine.notes().is_empty());
        assert!(engine.pattern().is_empty());
        assert_eq!(engine.volumes(), &Volumes::default());
        assert!(!engine.is_playing());
        assert!(!engine.has_audio());
        assert_eq!(engine.sample_rate(), 44100);
    }

    #[test]
    fn test_add_note_previews_new_notes_only() {
        let (mut engine, backend) = engine_with_recorder();

        engine.add_note("A4", 3);
        assert_eq!(backend.tones(), vec![440.0]);

        // Second placement removes it without a preview
        engine.add_note("A4", 3);
        assert!(engine.notes().is_empty());
        assert_eq!(backend.tones().len(), 1);
    }

    #[test]
    fn test_preview_uses_settings() {
        let (mut engine, backend) = engine_with_recorder();
        engine.add_note_with("C4", 0, 4, 1.0);

        match &backend.played()[0] {
            Voice::Tone(tone) => {
                assert!((tone.stop - 0.2).abs() < 1e-9);
                let peak = tone.envelope.value_at(0.01);
                assert!((peak - 0.6 * 0.8).abs() < 1e-4);
            }
            other => panic!("expected a tone, got {:?}", other),
        }
    }

    #[test]
    fn test_play_note_unknown_pitch_is_silent() {
        let (mut engine, backend) = engine_with_recorder();
        engine.play_note("Q9", 0.5, 1.0);
        assert!(backend.played().is_empty());
    }

    #[test]
    fn test_playback_without_backend_is_noop() {
        let mut engine = Engine::new();
        engine.add_note("C4", 0);
        engine.toggle_drum_step(DrumVoice::Kick, 0);
        engine.play_drum(DrumVoice::Kick);
        let tick = engine.play_step(0);
        assert_eq!(tick.notes, 1);
        assert_eq!(tick.drums, vec![DrumVoice::Kick]);
    }

    #[test]
    fn test_play_note_uses_melody_volume() {
        let (mut engine, backend) = engine_with_recorder();
        engine.set_volume(Channel::Melody, 50.0);
        engine.play_note("C4", 1.0, 0.8);
        match &backend.played()[0] {
            Voice::Tone(tone) => {
                assert!((tone.envelope.value_at(0.01) - 0.4).abs() < 1e-4);
                assert_eq!(tone.frequency, 261.63);
            }
            other => panic!("expected a tone, got {:?}", other),
        }
    }

    #[test]
    fn test_play_drum_uses_channel_volume() {
        let (mut engine, backend) = engine_with_recorder();
        engine.set_volume(Channel::Crash, 20.0);
        engine.play_drum(DrumVoice::Crash);
        match &backend.played()[0] {
            Voice::Sample(sample) => {
                assert_eq!(sample.gain, 0.2);
                assert_eq!(sample.buffer.len(), 12000);
            }
            other => panic!("expected a sample, got {:?}", other),
        }
    }

    #[test]
    fn test_step_note_length_follows_tempo() {
        let (mut engine, backend) = engine_with_recorder();
        engine.set_tempo(60);
        engine.add_note_with("C4", 2, 3, 0.8);
        engine.play_step(2);

        // Preview first, then the step tone: 3 steps at 0.25s
        match &backend.played()[1] {
            Voice::Tone(tone) => assert!((tone.stop - 0.75).abs() < 1e-9),
            other => panic!("expected a tone, got {:?}", other),
        }
    }

    #[test]
    fn test_polyphonic_step() {
        let (mut engine, backend) = engine_with_recorder();
        engine.add_note("C4", 5);
        engine.add_note("E4", 5);
        engine.add_note("G4", 5);
        engine.toggle_drum_step(DrumVoice::Snare, 5);
        engine.toggle_drum_step(DrumVoice::Hihat, 5);
        let previews = backend.played().len();

        let tick = engine.play_step(5);
        assert_eq!(tick.notes, 3);
        assert_eq!(tick.drums, vec![DrumVoice::Snare, DrumVoice::Hihat]);
        assert_eq!(backend.played().len(), previews + 5);
        assert_eq!(backend.samples(), 2);
    }

    #[test]
    fn test_tick_advances_and_wraps() {
        let mut engine = Engine::new();
        assert!(engine.tick().is_none());

        engine.start_playback();
        for expected in 0..STEPS {
            let tick = engine.tick().unwrap();
            assert_eq!(tick.step, expected);
            assert_eq!(tick.wrapped, expected == STEPS - 1);
        }
        assert_eq!(engine.current_step(), 0);
        assert!(engine.is_playing());
    }

    #[test]
    fn test_tick_run_rejects_stale_generation() {
        let mut engine = Engine::new();
        let first = engine.start_playback().unwrap();
        assert!(engine.tick_run(first).is_some());

        engine.stop_playback();
        let second = engine.start_playback().unwrap();
        assert!(engine.tick_run(first).is_none());
        assert!(engine.tick_run(second).is_some());
    }

    #[test]
    fn test_set_tempo_while_playing_rewinds() {
        let mut engine = Engine::new();
        engine.start_playback();
        engine.tick();
        engine.tick();
        assert_eq!(engine.current_step(), 2);

        engine.set_tempo(90);
        assert_eq!(engine.current_step(), 0);
        assert!(engine.is_playing());
        assert!((engine.step_duration() - 60.0 / 90.0 / 4.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_tempo_change_signals_clock_only_while_playing() {
        use std::time::Duration;
        use tokio::time::timeout;

        let mut engine = Engine::new();
        let signal = engine.clock_signal();
        engine.set_tempo(90);
        assert!(timeout(Duration::ZERO, signal.notified()).await.is_err());

        engine.start_playback();
        engine.set_tempo(100);
        assert!(timeout(Duration::ZERO, signal.notified()).await.is_ok());
    }

    #[test]
    fn test_move_note() {
        let mut engine = Engine::new();
        let id = match engine.add_note("C4", 0) {
            AddOutcome::Added(id) => id,
            other => panic!("{:?}", other),
        };
        assert!(engine.move_note(id, "G4", 9));
        assert_eq!(engine.notes().find("G4", 9).map(|n| n.id), Some(id));
        assert!(!engine.move_note(NoteId(12345), "G4", 9));
    }

    #[test]
    fn test_apply_preset_only_when_empty() {
        let mut engine = Engine::new();
        assert!(engine.apply_preset());
        assert_eq!(engine.pattern(), &DrumPattern::rock());

        engine.clear_pattern();
        engine.add_note("C4", 0);
        assert!(!engine.apply_preset());
        assert!(engine.pattern().is_empty());

        engine.clear_notes();
        assert!(engine.notes().is_empty());
    }

    #[test]
    fn test_key_press() {
        let (mut engine, backend) = engine_with_recorder();

        assert_eq!(engine.key_press('h'), Some("A4"));
        assert!(engine.notes().is_empty());
        assert_eq!(backend.tones(), vec![440.0]);

        engine.start_playback();
        engine.tick();
        engine.tick();
        assert_eq!(engine.key_press('a'), Some("C4"));
        assert!(engine.notes().find("C4", 2).is_some());

        assert_eq!(engine.key_press('z'), None);
    }

    #[test]
    fn test_time_signature_relabel() {
        let mut engine = Engine::new();
        let before = engine.step_duration();
        engine.set_time_signature("3/4");
        assert_eq!(engine.beats_per_measure(), 3);
        assert_eq!(engine.step_duration(), before);
    }

    #[test]
    fn test_detach_backend() {
        let (mut engine, backend) = engine_with_recorder();
        assert!(engine.detach_backend().is_some());
        assert!(!engine.has_audio());
        engine.play_drum(DrumVoice::Kick);
        assert!(backend.played().is_empty());
    }

    #[test]
    fn test_export_frame_count() {
        let engine = Engine::new();
        let job = engine.export_job(16);
        // 16 steps at 120 BPM is two seconds
        assert_eq!(job.frame_count(), 88200);
    }

    #[test]
    fn test_export_matches_live_mix() {
        // Render one step live through a mixer and offline; samples must agree
        let mixer = MixerHandle::new(VoiceMixer::new(8000, 0.7));
        let mut engine = Engine::new().with_noise_seed(9);
        engine.attach_backend(Box::new(mixer.clone()));
        engine.add_note_with("A4", 0, 2, 0.9);
        engine.toggle_drum_step(DrumVoice::Snare, 0);
        engine.toggle_drum_step(DrumVoice::Kick, 0);
        mixer.clear();

        engine.play_step(0);
        let mut live = vec![0.0f32; 1000];
        mixer.render(&mut live, 1);

        let offline = engine.export_job(1).render().unwrap();
        let offline = offline.channel(0).unwrap();
        assert_eq!(offline.len(), 1000);
        assert_eq!(live.as_slice(), offline);
    }
}
