// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Gain automation.
//!
//! An envelope is a list of timed points. A point either sets its value
//! outright or ramps to it (linearly or exponentially) from the previous
//! point. Times are seconds relative to the start of the voice.

/// How the envelope reaches a point's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    /// Jump to the value at the point's time
    Set,
    /// Straight-line interpolation from the previous point
    Linear,
    /// Geometric interpolation from the previous point
    Exponential,
}

/// A single automation point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopePoint {
    /// Time in seconds
    pub time: f64,
    /// Target value
    pub value: f32,
    /// Interpolation used to arrive at `value`
    pub ramp: Ramp,
}

/// Attack time of the note envelope in seconds
pub const NOTE_ATTACK: f64 = 0.01;

/// Level the note envelope decays to by 70% of its duration
pub const NOTE_SUSTAIN: f32 = 0.1;

/// Level the note envelope reaches at the end of its duration
pub const NOTE_FLOOR: f32 = 0.001;

/// Gain envelope built from automation points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GainEnvelope {
    points: Vec<EnvelopePoint>,
}

impl GainEnvelope {
    /// Value used before the first point
    pub const DEFAULT_VALUE: f32 = 1.0;

    /// Create an empty envelope (constant unity gain)
    pub fn new() -> Self {
        Self::default()
    }

    /// Three-segment note envelope: linear rise to `peak` over the attack,
    /// exponential fall to the sustain level by 70% of `duration`, then
    /// exponential fall to the floor at `duration`.
    pub fn note(peak: f32, duration: f64) -> Self {
        Self::new()
            .set_value_at(0.0, 0.0)
            .linear_ramp_to(peak, NOTE_ATTACK)
            .exponential_ramp_to(NOTE_SUSTAIN, duration * 0.7)
            .exponential_ramp_to(NOTE_FLOOR, duration)
    }

    /// Jump to `value` at `time`
    pub fn set_value_at(self, value: f32, time: f64) -> Self {
        self.with_point(EnvelopePoint { time, value, ramp: Ramp::Set })
    }

    /// Ramp linearly to `value`, arriving at `end_time`
    pub fn linear_ramp_to(self, value: f32, end_time: f64) -> Self {
        self.with_point(EnvelopePoint { time: end_time, value, ramp: Ramp::Linear })
    }

    /// Ramp exponentially to `value`, arriving at `end_time`
    pub fn exponential_ramp_to(self, value: f32, end_time: f64) -> Self {
        self.with_point(EnvelopePoint { time: end_time, value, ramp: Ramp::Exponential })
    }

    /// Points ordered by time
    pub fn points(&self) -> &[EnvelopePoint] {
        &self.points
    }

    // Points keep time order; equal times keep insertion order.
    fn with_point(mut self, point: EnvelopePoint) -> Self {
        let index = self.points.partition_point(|p| p.time <= point.time);
        self.points.insert(index, point);
        self
    }

    /// Evaluate the envelope at `time` seconds
    pub fn value_at(&self, time: f64) -> f32 {
        let mut value = Self::DEFAULT_VALUE as f64;
        let mut from_time = 0.0f64;

        for point in &self.points {
            if point.time <= time {
                value = point.value as f64;
                from_time = point.time;
                continue;
            }

            let span = point.time - from_time;
            let progress = if span > 0.0 { (time - from_time) / span } else { 1.0 };
            let target = point.value as f64;

            let current = match point.ramp {
                Ramp::Set => value,
                Ramp::Linear => value + (target - value) * progress,
                Ramp::Exponential => {
                    // A geometric ramp cannot start from zero or cross zero
                    if value == 0.0 || value.signum() != target.signum() {
                        value
                    } else {
                        value * (target / value).powf(progress)
                    }
                }
            };
            return current as f32;
        }

        value as f32
    }
}
