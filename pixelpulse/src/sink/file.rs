use std::{
    fs::File,
    io::{
        BufWriter,
        Seek,
        Write,
    },
    path::Path,
};

#[derive(Debug, thiserror::Error)]
#[error("wav sink error")]
pub enum Error {
    Hound(#[from] hound::Error),
    Closed,
}

/// 16 bit signed, little endian, mono PCM.
pub fn pcm16_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Writes `f32` samples in `[-1, 1]` as 16 bit PCM.
///
/// The header is only valid after [`finalize`](Self::finalize).
#[derive(derive_more::Debug)]
pub struct WavSink<W>
where
    W: Write + Seek,
{
    #[debug(skip)]
    inner: Option<hound::WavWriter<W>>,
    num_samples: usize,
}

impl<W> WavSink<W>
where
    W: Write + Seek,
{
    #[inline]
    pub fn new(inner: hound::WavWriter<W>) -> Self {
        Self {
            inner: Some(inner),
            num_samples: 0,
        }
    }

    #[inline]
    pub fn from_writer(writer: W, sample_rate: u32) -> Result<Self, Error> {
        Ok(Self::new(hound::WavWriter::new(
            writer,
            pcm16_spec(sample_rate),
        )?))
    }

    #[inline]
    fn writer_mut(&mut self) -> Result<&mut hound::WavWriter<W>, Error> {
        self.inner.as_mut().ok_or(Error::Closed)
    }

    pub fn write_samples(&mut self, samples: &[f32]) -> Result<(), Error> {
        let writer = self.writer_mut()?;
        let mut writer16 = writer.get_i16_writer(samples.len() as u32);
        for sample in samples {
            writer16.write_sample(to_pcm16(*sample));
        }
        writer16.flush()?;
        self.num_samples += samples.len();
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<(), Error> {
        if let Some(writer) = self.inner.take() {
            writer.finalize()?;
            tracing::debug!(num_samples = self.num_samples, "finalized wav sink");
        }
        Ok(())
    }
}

impl WavSink<BufWriter<File>> {
    #[inline]
    pub fn from_path(path: impl AsRef<Path>, sample_rate: u32) -> Result<Self, Error> {
        tracing::debug!(path = %path.as_ref().display(), "creating wav file");
        Ok(Self::new(hound::WavWriter::create(
            path,
            pcm16_spec(sample_rate),
        )?))
    }
}

/// Scales a sample in `[-1, 1]` to `i16`, truncating towards zero.
#[inline]
pub fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

pub fn write_samples_to_wav(
    path: impl AsRef<Path>,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), Error> {
    let mut sink = WavSink::from_path(path, sample_rate)?;
    sink.write_samples(samples)?;
    sink.finalize()
}
