#[inline(always)]
pub fn lerp(t: f32, a: f32, b: f32) -> f32 {
    (1.0 - t) * a + t * b
}

#[inline(always)]
pub fn unlerp(x: f32, a: f32, b: f32) -> f32 {
    (x - a) / (b - a)
}

/// Number of samples covering `duration_ms` milliseconds, rounded to the
/// nearest sample. Negative or NaN durations give 0.
#[inline]
pub fn millis_to_samples(duration_ms: f32, sample_rate: f32) -> usize {
    let num_samples = (duration_ms / 1000.0 * sample_rate).round();
    if num_samples > 0.0 {
        num_samples as usize
    }
    else {
        0
    }
}
