use std::f64::consts::TAU;

use crate::{
    GetSampleRate,
    source::SignalGenerator,
    util::millis_to_samples,
};

#[inline]
fn step_from_frequency_and_sample_rate(frequency: f32, sample_rate: f32) -> f64 {
    TAU * f64::from(frequency) / f64::from(sample_rate)
}

/// Phase-continuous sine oscillator.
///
/// The phase is carried from one tone to the next, so consecutive tones join
/// without a discontinuity in the waveform. After each tone the phase is
/// reduced into `[0, 2π)`.
#[derive(Clone, Copy, Debug)]
pub struct Oscillator {
    frequency: f32,
    sample_rate: f32,
    phase: f64,
    step: f64,
}

impl Oscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frequency: 0.0,
            sample_rate,
            phase: 0.0,
            step: 0.0,
        }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase.rem_euclid(TAU);
        self
    }

    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.step = step_from_frequency_and_sample_rate(frequency, self.sample_rate);
    }

    /// Number of samples a tone of `duration_ms` milliseconds occupies.
    #[inline]
    pub fn num_samples(&self, duration_ms: f32) -> usize {
        millis_to_samples(duration_ms, self.sample_rate)
    }

    /// Emits a tone of `frequency` Hz lasting `duration_ms` milliseconds.
    pub fn emit(&mut self, frequency: f32, duration_ms: f32) -> Vec<f32> {
        let mut output = Vec::with_capacity(self.num_samples(duration_ms));
        self.emit_into(&mut output, frequency, duration_ms);
        output
    }

    /// Like [`emit`](Self::emit), but appends to `output`.
    pub fn emit_into(&mut self, output: &mut Vec<f32>, frequency: f32, duration_ms: f32) {
        let num_samples = self.num_samples(duration_ms);
        self.set_frequency(frequency);
        output.extend((0..num_samples).map(|_| self.next()));
        self.end_tone();
    }

    /// Emits `num_samples` samples, asking `frequency_at` for the frequency of
    /// each sample index. Used for scanned pixel rows, where the frequency
    /// changes inside one tone.
    pub fn sweep_into(
        &mut self,
        output: &mut Vec<f32>,
        num_samples: usize,
        mut frequency_at: impl FnMut(usize) -> f32,
    ) {
        output.reserve(num_samples);
        for i in 0..num_samples {
            self.set_frequency(frequency_at(i));
            output.push(self.next());
        }
        self.end_tone();
    }

    #[inline]
    fn end_tone(&mut self) {
        self.phase = self.phase.rem_euclid(TAU);
    }
}

impl SignalGenerator for Oscillator {
    type Sample = f32;

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.step = step_from_frequency_and_sample_rate(self.frequency, sample_rate);
    }

    #[inline]
    fn next(&mut self) -> Self::Sample {
        let output = self.phase.sin() as f32;
        self.phase += self.step;
        output
    }
}

impl GetSampleRate for Oscillator {
    #[inline]
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}
