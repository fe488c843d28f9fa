use std::{
    fmt::Debug,
    sync::Arc,
};

use num_complex::Complex;
use rustfft::FftPlanner;

/// Computes the analytic signal of a real sequence by one-sided spectral
/// filtering.
///
/// The input is zero-padded to a power of two, transformed, all bins above the
/// Nyquist bin are cleared, the DC and Nyquist bins are halved, and the result
/// is transformed back. The imaginary part of the output is the quadrature
/// component of the input.
pub struct AnalyticSignal {
    planner: FftPlanner<f64>,
}

impl Default for AnalyticSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticSignal {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Returns one complex sample per input sample. Padding is dropped.
    pub fn process(&mut self, samples: &[f32]) -> Vec<Complex<f64>> {
        if samples.is_empty() {
            return vec![];
        }

        let size = samples.len().next_power_of_two();
        tracing::debug!(num_samples = samples.len(), fft_size = size, "analytic signal");

        let mut buffer = Vec::with_capacity(size);
        buffer.extend(samples.iter().map(|x| Complex::new(f64::from(*x), 0.0)));
        buffer.resize(size, Complex::new(0.0, 0.0));

        let forward: Arc<dyn rustfft::Fft<f64>> = self.planner.plan_fft_forward(size);
        forward.process(&mut buffer);

        let half = size / 2;
        for bin in &mut buffer[half + 1..] {
            *bin = Complex::new(0.0, 0.0);
        }
        buffer[0] *= 0.5;
        buffer[half] *= 0.5;

        let inverse = self.planner.plan_fft_inverse(size);
        inverse.process(&mut buffer);

        // rustfft doesn't normalize
        let norm = 1.0 / size as f64;
        buffer.truncate(samples.len());
        for sample in &mut buffer {
            *sample *= norm;
        }

        buffer
    }
}

impl Debug for AnalyticSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticSignal").finish_non_exhaustive()
    }
}
