// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for pixelseq
//!
//! These tests drive the public API end to end with a recording backend in
//! place of a sound card.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pixelseq::audio::wav::{encode_wav, HEADER_LEN};
use pixelseq::audio::{AudioBackend, AudioError, Voice};
use pixelseq::music::pitch::FREQUENCY_TABLE;
use pixelseq::project::{export_project, load_project};
use pixelseq::sequencer::{Channel, DrumVoice, Engine, Volumes, STEPS};
use pixelseq::transport::Transport;

/// What a recorded voice was
#[derive(Debug, Clone, PartialEq)]
enum Played {
    Tone(f64),
    Drum(usize),
}

/// Backend that records every voice it is given
#[derive(Clone, Default)]
struct RecordingBackend {
    played: Arc<Mutex<Vec<Played>>>,
}

impl RecordingBackend {
    fn take(&self) -> Vec<Played> {
        std::mem::take(&mut *self.played.lock().unwrap())
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
        let played = match voice {
            Voice::Tone(tone) => Played::Tone(tone.frequency),
            // Buffer length identifies the drum voice
            Voice::Sample(sample) => Played::Drum(sample.buffer.len()),
        };
        self.played.lock().unwrap().push(played);
        Ok(())
    }
}

// Buffer lengths at 8 kHz
const KICK_LEN: usize = 4000;

fn recording_engine() -> (Engine, RecordingBackend) {
    let backend = RecordingBackend::default();
    let mut engine = Engine::new().with_noise_seed(7);
    engine.attach_backend(Box::new(backend.clone()));
    (engine, backend)
}

#[test]
fn test_every_tabulated_pitch_plays_its_frequency() {
    let (mut engine, backend) = recording_engine();
    for (name, hz) in FREQUENCY_TABLE.iter() {
        engine.play_note(name, 0.5, 0.8);
        assert_eq!(backend.take(), vec![Played::Tone(*hz)], "pitch {}", name);
    }
}

#[test]
fn test_add_note_toggle_law() {
    let mut engine = Engine::new();
    engine.add_note("D5", 9);
    engine.add_note("D5", 9);
    assert!(engine.notes().find("D5", 9).is_none());

    engine.add_note("D5", 9);
    assert_eq!(engine.notes().at_step(9).count(), 1);
}

#[test]
fn test_drum_toggle_involution() {
    let mut engine = Engine::new();
    engine.apply_preset();
    let before = engine.pattern().clone();
    for voice in DrumVoice::ALL {
        engine.toggle_drum_step(voice, 11);
        engine.toggle_drum_step(voice, 11);
    }
    assert_eq!(engine.pattern(), &before);
}

#[test]
fn test_step_triggers_example() {
    let (mut engine, backend) = recording_engine();
    engine.add_note("C4", 0);
    engine.toggle_drum_step(DrumVoice::Kick, 0);
    engine.toggle_drum_step(DrumVoice::Kick, 3);
    backend.take();

    engine.start_playback();
    let mut heard = Vec::new();
    for _ in 0..4 {
        engine.tick();
        heard.push(backend.take());
    }

    assert_eq!(heard[0], vec![Played::Tone(261.63), Played::Drum(KICK_LEN)]);
    assert!(heard[1].is_empty());
    assert!(heard[2].is_empty());
    assert_eq!(heard[3], vec![Played::Drum(KICK_LEN)]);
}

#[test]
fn test_project_round_trip() {
    let mut engine = Engine::new();
    engine.set_tempo(132);
    engine.add_note_with("F#3", 4, 2, 0.3);
    engine.add_note("B5", 15);
    engine.apply_preset();
    engine.toggle_drum_step(DrumVoice::Snare, 1);
    engine.set_volume(Channel::Melody, 64.0);

    let text = export_project(&engine).unwrap();
    let mut restored = Engine::new();
    load_project(&mut restored, &text).unwrap();

    assert_eq!(restored.tempo(), engine.tempo());
    assert_eq!(restored.time_signature(), engine.time_signature());
    assert_eq!(restored.notes().as_slice(), engine.notes().as_slice());
    assert_eq!(restored.pattern(), engine.pattern());
    assert_eq!(restored.volumes(), engine.volumes());
}

#[test]
fn test_missing_volumes_load_defaults() {
    let mut engine = Engine::new();
    engine.set_volume(Channel::Kick, 10.0);
    load_project(&mut engine, r#"{"version": "1.0", "tempo": 100}"#).unwrap();
    assert_eq!(engine.volumes(), &Volumes::default());
    assert_eq!(engine.tempo(), 100);
}

/// Peak absolute sample within a window of frames
fn window_peak(samples: &[f32], from: usize, len: usize) -> f32 {
    samples[from..(from + len).min(samples.len())]
        .iter()
        .fold(0.0f32, |acc, s| acc.max(s.abs()))
}

#[tokio::test]
async fn test_export_loops_pattern_but_not_notes() {
    // 8 kHz, 120 BPM: 1000 frames per step
    let mut engine = Engine::new().with_noise_seed(3);
    engine.attach_backend(Box::new(RecordingBackend::default()));
    engine.add_note("A4", 5);

    let notes_only = engine.export_audio(32).await.unwrap();
    let samples = notes_only.channel(0).unwrap();
    assert_eq!(samples.len(), 32_000);
    assert!(window_peak(samples, 5_000, 100) > 0.05);
    assert_eq!(window_peak(samples, 21_000, 1000), 0.0);

    let id = engine.notes().iter().next().unwrap().id;
    engine.remove_note(id);
    engine.toggle_drum_step(DrumVoice::Hihat, 5);
    let drums_only = engine.export_audio(32).await.unwrap();
    let samples = drums_only.channel(0).unwrap();
    assert!(window_peak(samples, 5_000, 100) > 0.01);
    assert!(window_peak(samples, 21_000, 100) > 0.01);
    assert_eq!(window_peak(samples, 0, 5_000), 0.0);
}

#[tokio::test]
async fn test_export_is_deterministic_and_isolated() {
    let mut engine = Engine::new().with_noise_seed(11);
    engine.apply_preset();
    engine.add_note("E4", 2);

    let first = engine.export_audio(16).await.unwrap();
    let second = engine.export_audio(16).await.unwrap();
    assert_eq!(first, second);

    // Editing after the render starts does not change it
    let pending = engine.export_audio(16);
    engine.clear_pattern();
    engine.clear_notes();
    let third = pending.await.unwrap();
    assert_eq!(first, third);
}

#[tokio::test]
async fn test_export_to_wav() {
    let mut engine = Engine::new();
    engine.apply_preset();
    let audio = engine.export_audio(16).await.unwrap();
    assert_eq!(audio.sample_rate(), 44100);
    assert_eq!(audio.channel_count(), 2);

    let bytes = encode_wav(&audio);
    assert_eq!(bytes.len(), HEADER_LEN + audio.len() * 2);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
}

#[tokio::test(start_paused = true)]
async fn test_tempo_change_while_playing() {
    let (mut engine, backend) = recording_engine();
    engine.toggle_drum_step(DrumVoice::Kick, 0);
    let mut transport = Transport::new(engine.into_shared());

    transport.start().unwrap();
    tokio::time::sleep(Duration::from_millis(125 * 6 + 5)).await;
    backend.take();

    // 240 BPM: 62.5 ms steps, restarted from step 0
    transport.set_tempo(240).unwrap();
    assert_eq!(transport.current_step(), 0);

    tokio::time::sleep(Duration::from_secs_f64(0.0625 * STEPS as f64 + 0.01)).await;
    assert!(transport.is_playing());
    assert_eq!(transport.current_step(), 0);
    assert_eq!(backend.take(), vec![Played::Drum(KICK_LEN)]);

    transport.stop();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(backend.take().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_key_press_records_while_playing() {
    let (engine, _backend) = recording_engine();
    let mut transport = Transport::new(engine.into_shared());
    transport.start().unwrap();
    tokio::time::sleep(Duration::from_millis(125 * 4 + 5)).await;

    let pitch = transport.engine().lock().unwrap().key_press('e');
    assert_eq!(pitch, Some("D#4"));
    assert!(transport
        .engine()
        .lock()
        .unwrap()
        .notes()
        .find("D#4", 4)
        .is_some());
}

#[test]
fn test_editing_works_without_audio() {
    let mut engine = Engine::new();
    assert!(!engine.has_audio());
    engine.add_note("G2", 1);
    engine.toggle_drum_step(DrumVoice::Crash, 0);
    engine.set_volume(Channel::Crash, 40.0);
    engine.play_note("G2", 0.3, 0.9);
    engine.play_drum(DrumVoice::Crash);

    let text = export_project(&engine).unwrap();
    assert!(text.contains("\"G2\""));
}
