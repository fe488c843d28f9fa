pub mod resampling;

/// Centered moving average.
///
/// Each output sample is the mean of the input samples within `window / 2`
/// samples on either side. Near the edges the window is truncated and the mean
/// is taken over the samples that exist.
#[derive(Clone, Copy, Debug)]
pub struct MovingAverage {
    half_width: usize,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            half_width: window / 2,
        }
    }

    #[inline]
    pub fn window(&self) -> usize {
        2 * self.half_width + 1
    }

    pub fn apply(&self, input: &[f32]) -> Vec<f32> {
        let n = input.len();
        let mut output = Vec::with_capacity(n);

        // running sum over input[start..end]
        let mut sum = 0.0f64;
        let mut start = 0;
        let mut end = 0;

        for i in 0..n {
            let window_start = i.saturating_sub(self.half_width);
            let window_end = (i + self.half_width + 1).min(n);

            while end < window_end {
                sum += f64::from(input[end]);
                end += 1;
            }
            while start < window_start {
                sum -= f64::from(input[start]);
                start += 1;
            }

            output.push((sum / (end - start) as f64) as f32);
        }

        output
    }
}
