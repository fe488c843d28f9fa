/// Averages `input` down to `output_len` values.
///
/// Output value `i` is the mean of `input[floor(i * ratio)..floor((i + 1) * ratio)]`
/// where `ratio = input.len() / output_len`. The end of each bucket is clamped
/// to the input and an empty bucket is divided by 1 instead of 0.
pub fn average_downsample(input: &[f32], output_len: usize) -> Vec<f32> {
    if output_len == 0 {
        return vec![];
    }

    let ratio = input.len() as f32 / output_len as f32;

    (0..output_len)
        .map(|i| {
            let start = ((i as f32 * ratio) as usize).min(input.len());
            let end = (((i + 1) as f32 * ratio) as usize).min(input.len());
            let bucket = &input[start..end.max(start)];
            let sum: f32 = bucket.iter().sum();
            sum / bucket.len().max(1) as f32
        })
        .collect()
}
