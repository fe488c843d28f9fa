//! Frequency demodulation.
//!
//! The instantaneous frequency of an FM signal is the rate of change of the
//! phase of its analytic representation. [`SpectralDemodulator`] builds the
//! analytic signal with one FFT round trip over the whole recording, unwraps
//! its phase and differentiates it.

mod analytic;

use std::f64::consts::{
    PI,
    TAU,
};

pub use analytic::AnalyticSignal;

use crate::GetSampleRate;

/// Removes `±2π` jumps from a wrapped phase sequence.
///
/// Whenever the difference between neighbouring samples exceeds `π`, `2π` is
/// subtracted from it, and when it falls below `-π`, `2π` is added. The
/// corrected differences are accumulated starting from the first sample.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut unwrapped = Vec::with_capacity(phase.len());
    let Some(&first) = phase.first()
    else {
        return unwrapped;
    };
    unwrapped.push(first);

    let mut accumulated = first;
    for pair in phase.windows(2) {
        let mut difference = pair[1] - pair[0];
        if difference > PI {
            difference -= TAU;
        }
        else if difference < -PI {
            difference += TAU;
        }
        accumulated += difference;
        unwrapped.push(accumulated);
    }

    unwrapped
}

/// Frequency in Hz between consecutive samples of an unwrapped phase track.
/// The output is one sample shorter than the input.
pub fn instantaneous_frequency(unwrapped_phase: &[f64], sample_rate: f32) -> Vec<f32> {
    let norm_factor = f64::from(sample_rate) / TAU;
    unwrapped_phase
        .windows(2)
        .map(|pair| ((pair[1] - pair[0]) * norm_factor) as f32)
        .collect()
}

#[derive(Debug)]
pub struct SpectralDemodulator {
    analytic: AnalyticSignal,
    sample_rate: f32,
}

impl SpectralDemodulator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            analytic: AnalyticSignal::new(),
            sample_rate,
        }
    }

    /// Returns the instantaneous frequency in Hz for each pair of
    /// neighbouring samples, i.e. `samples.len() - 1` values. Fewer than 2
    /// samples give an empty result.
    pub fn demodulate(&mut self, samples: &[f32]) -> Vec<f32> {
        if samples.len() < 2 {
            return vec![];
        }

        let phase = self
            .analytic
            .process(samples)
            .into_iter()
            .map(|z| z.im.atan2(z.re))
            .collect::<Vec<_>>();

        let frequency = instantaneous_frequency(&unwrap_phase(&phase), self.sample_rate);
        tracing::debug!(num_samples = frequency.len(), "demodulated");
        frequency
    }
}

impl GetSampleRate for SpectralDemodulator {
    #[inline]
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Shorthand for a one-off [`SpectralDemodulator::demodulate`].
pub fn demodulate(samples: &[f32], sample_rate: f32) -> Vec<f32> {
    SpectralDemodulator::new(sample_rate).demodulate(samples)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use approx::assert_abs_diff_eq;

    use crate::{
        modem::fm::{
            demodulate,
            instantaneous_frequency,
            unwrap_phase,
        },
        source::Oscillator,
    };

    #[test]
    fn unwrap_is_idempotent() {
        let phase = (0..500).map(|i| 0.3 * i as f64).collect::<Vec<_>>();
        let wrapped = phase
            .iter()
            .map(|x| (x + std::f64::consts::PI).rem_euclid(TAU) - std::f64::consts::PI)
            .collect::<Vec<_>>();

        let unwrapped = unwrap_phase(&wrapped);
        let unwrapped_twice = unwrap_phase(&unwrapped);
        assert_eq!(unwrapped.len(), unwrapped_twice.len());
        for (x, y) in unwrapped.iter().zip(&unwrapped_twice) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-9);
        }

        for (x, y) in unwrapped.iter().zip(&phase) {
            assert_abs_diff_eq!(*x, *y - phase[0] + wrapped[0], epsilon = 1e-9);
        }
    }

    #[test]
    fn unwrap_of_empty_and_single() {
        assert!(unwrap_phase(&[]).is_empty());
        assert_eq!(unwrap_phase(&[1.0]), vec![1.0]);
    }

    #[test]
    fn frequency_of_linear_phase() {
        let step = TAU * 1000.0 / 44100.0;
        let phase = (0..10).map(|i| step * i as f64).collect::<Vec<_>>();
        let frequency = instantaneous_frequency(&phase, 44100.0);
        assert_eq!(frequency.len(), 9);
        for f in frequency {
            assert_abs_diff_eq!(f, 1000.0, epsilon = 1e-2);
        }
    }

    #[test]
    fn short_input_is_empty() {
        assert!(demodulate(&[], 44100.0).is_empty());
        assert!(demodulate(&[0.5], 44100.0).is_empty());
        assert_eq!(demodulate(&[0.0, 0.5, 1.0], 44100.0).len(), 2);
    }

    #[test]
    fn it_recovers_tone_frequencies() {
        let mut oscillator = Oscillator::new(44100.0);
        let mut samples = oscillator.emit(1200.0, 50.0);
        samples.extend(oscillator.emit(2300.0, 50.0));

        let frequency = demodulate(&samples, 44100.0);
        assert_eq!(frequency.len(), samples.len() - 1);

        let half = oscillator.num_samples(50.0);
        let margin = 200;
        for f in &frequency[margin..half - margin] {
            assert_abs_diff_eq!(*f, 1200.0, epsilon = 20.0);
        }
        for f in &frequency[half + margin..2 * half - margin] {
            assert_abs_diff_eq!(*f, 2300.0, epsilon = 20.0);
        }
    }
}
