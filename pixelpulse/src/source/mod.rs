pub mod file;
pub mod sine;

pub use sine::Oscillator;

use crate::GetSampleRate;

pub trait SignalGenerator: GetSampleRate {
    type Sample;

    fn set_sample_rate(&mut self, sample_rate: f32);

    fn next(&mut self) -> Self::Sample;
}
