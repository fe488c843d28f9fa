use std::{
    fs::File,
    io::BufReader,
    path::Path,
};

use crate::GetSampleRate;

#[derive(Debug, thiserror::Error)]
#[error("wav source error")]
pub enum Error {
    Hound(#[from] hound::Error),
    #[error("unsupported sample format: {bits_per_sample} bit {sample_format:?}")]
    UnsupportedSampleFormat {
        bits_per_sample: u16,
        sample_format: hound::SampleFormat,
    },
    #[error("wav file has no channels")]
    NoChannels,
}

/// Reads PCM audio from a WAV container.
///
/// Channel count, bit depth and sample format are taken from the header.
/// Samples are normalized to `[-1, 1]`. Multi-channel audio is folded to mono
/// by keeping only the first channel.
#[derive(derive_more::Debug)]
pub struct WavSource<R> {
    #[debug(skip)]
    inner: hound::WavReader<R>,
    spec: hound::WavSpec,
}

impl<R> WavSource<R>
where
    R: std::io::Read,
{
    pub fn new(inner: hound::WavReader<R>) -> Result<Self, Error> {
        let spec = inner.spec();
        check_spec(&spec)?;
        tracing::debug!(
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            bits_per_sample = spec.bits_per_sample,
            sample_format = ?spec.sample_format,
            "opened wav source"
        );
        Ok(Self { inner, spec })
    }

    #[inline]
    pub fn from_reader(reader: R) -> Result<Self, Error> {
        Self::new(hound::WavReader::new(reader)?)
    }

    #[inline]
    pub fn spec(&self) -> hound::WavSpec {
        self.spec
    }

    #[inline]
    pub fn channels(&self) -> u16 {
        self.spec.channels
    }

    /// Number of frames (samples per channel) in the file.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.duration() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads all remaining frames and returns the first channel of each.
    pub fn read_mono(mut self) -> Result<Vec<f32>, Error> {
        let channels = usize::from(self.spec.channels);
        if channels > 1 {
            tracing::debug!(channels, "keeping first channel only");
        }

        let mut output = Vec::with_capacity(self.len());

        match self.spec.sample_format {
            hound::SampleFormat::Float => {
                for sample in self.inner.samples::<f32>().step_by(channels) {
                    output.push(sample?);
                }
            }
            hound::SampleFormat::Int => {
                let scale = int_scale(self.spec.bits_per_sample);
                for sample in self.inner.samples::<i32>().step_by(channels) {
                    output.push(sample? as f32 * scale);
                }
            }
        }

        Ok(output)
    }
}

impl WavSource<BufReader<File>> {
    #[inline]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        tracing::debug!(path = %path.as_ref().display(), "opening wav file");
        Self::new(hound::WavReader::open(path)?)
    }
}

impl<R> GetSampleRate for WavSource<R> {
    #[inline]
    fn sample_rate(&self) -> f32 {
        self.spec.sample_rate as f32
    }
}

fn check_spec(spec: &hound::WavSpec) -> Result<(), Error> {
    if spec.channels == 0 {
        return Err(Error::NoChannels);
    }

    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 8 | 16 | 24 | 32) | (hound::SampleFormat::Float, 32) => Ok(()),
        (sample_format, bits_per_sample) => {
            Err(Error::UnsupportedSampleFormat {
                bits_per_sample,
                sample_format,
            })
        }
    }
}

/// Factor mapping a signed integer sample of the given width onto `[-1, 1)`.
#[inline]
fn int_scale(bits_per_sample: u16) -> f32 {
    1.0 / (1u64 << (bits_per_sample - 1)) as f32
}
