// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pixelseq::audio::output::{default_device_name, list_devices};
use pixelseq::audio::wav::{export_filename, save_wav};
use pixelseq::audio::AudioOutput;
use pixelseq::config::AppConfig;
use pixelseq::music::row_for_pitch;
use pixelseq::project::{load_project, project_filename, Project};
use pixelseq::sequencer::{DrumVoice, Engine};
use pixelseq::transport::Transport;

fn print_usage() {
    println!("pixelseq - 16-step piano roll and drum sequencer");
    println!();
    println!("Usage: pixelseq [--config <settings.yaml>] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  --render <project> [OUT.wav] [STEPS]  Render a project to a WAV file");
    println!("  --play <project> [SECONDS]            Play a project on the default device");
    println!("  --new [project]                       Write a new project with the rock beat");
    println!("  --info <project>                      Print a summary of a project");
    println!("  --list-devices                        List audio output devices");
    println!("  --help                                Show this help message");
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}

/// Pull `--config <path>` out of the argument list
fn take_config(args: &mut Vec<String>) -> Result<AppConfig> {
    let Some(index) = args.iter().position(|a| a == "--config") else {
        return Ok(AppConfig::default());
    };
    if index + 1 >= args.len() {
        return Err(anyhow!("--config requires a settings file path"));
    }
    let path = args.remove(index + 1);
    args.remove(index);
    AppConfig::load(&path)
}

fn open_project(path: &Path, config: &AppConfig) -> Result<Engine> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read project file: {:?}", path))?;
    let mut engine = Engine::with_settings(config.engine_settings());
    load_project(&mut engine, &text)
        .with_context(|| format!("Failed to load project file: {:?}", path))?;
    Ok(engine)
}

async fn render(project: &Path, out: PathBuf, steps: usize, config: &AppConfig) -> Result<()> {
    let engine = open_project(project, config)?;
    println!(
        "Rendering {} steps at {} BPM ({} Hz)...",
        steps,
        engine.tempo(),
        engine.sample_rate()
    );

    let audio = engine.export_audio(steps).await?;
    save_wav(&audio, &out).with_context(|| format!("Failed to write WAV file: {:?}", out))?;

    println!(
        "Wrote {:?}: {:.2}s, peak {:.3}",
        out,
        audio.duration(),
        audio.peak()
    );
    Ok(())
}

async fn play(project: &Path, seconds: Option<f64>, config: &AppConfig) -> Result<()> {
    let mut engine = open_project(project, config)?;
    let output = AudioOutput::open(config.audio_config())?;
    engine.attach_backend(Box::new(output.handle()));

    // Two loops unless told otherwise
    let seconds = seconds.unwrap_or_else(|| 2.0 * engine.composition().timing().loop_duration());

    let mut transport = Transport::new(engine.into_shared());
    transport.start()?;
    println!("Playing for {:.1}s (press Ctrl+C to stop)...", seconds);

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs_f64(seconds)) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
        }
    }

    transport.stop();
    output.close();
    println!("Playback complete!");
    Ok(())
}

fn new_project(path: PathBuf, config: &AppConfig) -> Result<()> {
    let mut engine = Engine::with_settings(config.engine_settings());
    engine.set_tempo(config.default_tempo);
    engine.apply_preset();
    Project::from_engine(&engine).save(&path)?;
    println!("Wrote new project {:?}", path);
    Ok(())
}

fn print_info(path: &Path, config: &AppConfig) -> Result<()> {
    let engine = open_project(path, config)?;

    println!("Project:   {:?}", path);
    println!(
        "Tempo:     {} BPM ({:.1} ms per step)",
        engine.tempo(),
        engine.step_duration() * 1000.0
    );
    println!(
        "Signature: {} ({} beats per measure)",
        engine.time_signature(),
        engine.beats_per_measure()
    );
    println!();

    for voice in DrumVoice::ALL {
        let row: String = engine
            .pattern()
            .row(voice)
            .iter()
            .map(|on| if *on { 'x' } else { '.' })
            .collect();
        println!("{:<8} {}  {:>3}%", voice.name(), row, engine.volumes().percent(voice.into()));
    }
    println!();

    let mut notes: Vec<_> = engine.notes().iter().collect();
    notes.sort_by_key(|n| (row_for_pitch(&n.pitch).unwrap_or(usize::MAX), n.start_step));
    println!("{} notes:", notes.len());
    for note in notes {
        println!(
            "  {:<4} step {:>2}  length {}  velocity {:.2}",
            note.pitch, note.start_step, note.duration, note.velocity
        );
    }
    Ok(())
}

fn print_devices() {
    let default = default_device_name();
    let devices = list_devices();
    if devices.is_empty() {
        println!("No audio output devices found");
        return;
    }
    for (index, name) in devices.iter().enumerate() {
        let marker = if Some(name) == default.as_ref() { " (default)" } else { "" };
        println!("{}: {}{}", index, name, marker);
    }
}

fn required(args: &[String], index: usize, what: &str) -> Result<PathBuf> {
    args.get(index)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("{} requires a project file", what))
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().collect();
    let config = take_config(&mut args)?;
    init_logging(&config.log_level);

    if args.len() < 2 {
        println!("pixelseq - 16-step piano roll and drum sequencer");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--render" => {
            let project = required(&args, 2, "--render")?;
            let out = args
                .get(3)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(export_filename(Utc::now())));
            let steps = match args.get(4) {
                Some(s) => s
                    .parse()
                    .map_err(|_| anyhow!("Invalid step count: {}", s))?,
                None => config.export_steps,
            };
            render(&project, out, steps, &config).await?;
        }
        "--play" => {
            let project = required(&args, 2, "--play")?;
            let seconds = match args.get(3) {
                Some(s) => match s.parse::<f64>() {
                    Ok(secs) if secs.is_finite() && secs > 0.0 => Some(secs),
                    _ => return Err(anyhow!("Invalid duration: {}", s)),
                },
                None => None,
            };
            play(&project, seconds, &config).await?;
        }
        "--new" => {
            let path = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(project_filename(Utc::now())));
            new_project(path, &config)?;
        }
        "--info" => {
            let project = required(&args, 2, "--info")?;
            print_info(&project, &config)?;
        }
        "--list-devices" => {
            print_devices();
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
