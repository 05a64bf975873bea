// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step clock.
//!
//! Drives the engine from one periodic tokio task per run. The loop is a
//! plain step wraparound inside that task; play state never flickers.

use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace};

use crate::sequencer::{Engine, SharedEngine};

/// Transport errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("No tokio runtime available to drive the step clock")]
    NoRuntime,
}

fn lock(engine: &SharedEngine) -> MutexGuard<'_, Engine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// First tick fires one step after start, then every step
fn step_interval(step_duration: f64) -> Interval {
    let period = Duration::from_secs_f64(step_duration);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run_clock(
    engine: SharedEngine,
    reschedule: Arc<Notify>,
    generation: u64,
    mut step_duration: f64,
) {
    let mut ticker = step_interval(step_duration);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let (tick, current_duration) = {
                    let mut engine = lock(&engine);
                    match engine.tick_run(generation) {
                        Some(tick) => (tick, engine.step_duration()),
                        None => break,
                    }
                };

                if tick.wrapped {
                    trace!(generation, "Loop wrapped");
                }
                if current_duration != step_duration {
                    debug!(step_duration = current_duration, "Step length changed, rescheduling");
                    step_duration = current_duration;
                    ticker = step_interval(step_duration);
                }
            }
            _ = reschedule.notified() => {
                let current_duration = {
                    let engine = lock(&engine);
                    if engine.transport().generation() != generation {
                        break;
                    }
                    engine.step_duration()
                };

                // Restarted from step 0: the next step is one new length away
                debug!(step_duration = current_duration, "Tempo changed, rescheduling from now");
                step_duration = current_duration;
                ticker = step_interval(step_duration);
            }
        }
    }
    trace!(generation, "Clock task finished");
}

/// Play/stop control over a shared engine
pub struct Transport {
    engine: SharedEngine,
    task: Option<JoinHandle<()>>,
}

impl Transport {
    /// Create a stopped transport for an engine
    pub fn new(engine: SharedEngine) -> Self {
        Self { engine, task: None }
    }

    /// The engine this transport drives
    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// Start playback from step 0. Returns false if already playing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<bool, TransportError> {
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let (generation, step_duration, reschedule) = {
            let mut engine = lock(&self.engine);
            match engine.start_playback() {
                Some(generation) => (generation, engine.step_duration(), engine.clock_signal()),
                None => return Ok(false),
            }
        };

        if let Some(old) = self.task.take() {
            old.abort();
        }
        self.task = Some(runtime.spawn(run_clock(
            Arc::clone(&self.engine),
            reschedule,
            generation,
            step_duration,
        )));
        Ok(true)
    }

    /// Stop and rewind to step 0. No further step plays once this returns.
    pub fn stop(&mut self) {
        lock(&self.engine).stop_playback();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Change tempo; while playing, restart at once so the new step length
    /// applies from the next step.
    pub fn set_tempo(&mut self, bpm: u32) -> Result<(), TransportError> {
        if !self.is_playing() {
            lock(&self.engine).set_tempo(bpm);
            return Ok(());
        }
        self.stop();
        lock(&self.engine).set_tempo(bpm);
        self.start().map(|_| ())
    }

    /// Check if playing
    pub fn is_playing(&self) -> bool {
        lock(&self.engine).is_playing()
    }

    /// Step the next tick will play
    pub fn current_step(&self) -> usize {
        lock(&self.engine).current_step()
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
