use std::{
    path::{
        Path,
        PathBuf,
    },
    str::FromStr,
    sync::{
        Arc,
        atomic::AtomicBool,
    },
};

use image::{
    GrayImage,
    ImageFormat,
};

use crate::{
    GetSampleRate,
    SAMPLE_RATE,
    modem::{
        fm::SpectralDemodulator,
        sstv::{
            decoder::{
                Cancelled,
                DecodedImage,
                DecoderConfig,
                LineSyncDecoder,
                Progress,
            },
            encoder::encode_image,
        },
    },
    sink::file::write_samples_to_wav,
    source::file::WavSource,
};

/// Name of the file the decoded image is written to.
pub const DECODED_FILE_NAME: &str = "decoded_sstv.png";

#[derive(Debug, thiserror::Error)]
#[error("sstv error")]
pub enum Error {
    #[error("image error")]
    Image(#[from] image::ImageError),
    #[error("could not read audio")]
    WavSource(#[from] crate::source::file::Error),
    #[error("could not write audio")]
    WavSink(#[from] crate::sink::file::Error),
    #[error("{0}")]
    Cancelled(#[from] Cancelled),
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
}

/// Encodes the image at `input` as Robot36 and writes it to `output` as
/// 16 bit mono PCM at 44.1 kHz.
///
/// The whole signal is generated before `output` is created. If writing
/// fails, the partial file is removed.
pub fn encode_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<(), Error> {
    let input = input.as_ref();
    let output = output.as_ref();

    let image = image::open(input)?;
    tracing::info!(path = %input.display(), width = image.width(), height = image.height(), "encoding image");

    let samples = encode_image(&image, SAMPLE_RATE);

    if let Err(error) = write_samples_to_wav(output, &samples, SAMPLE_RATE as u32) {
        if let Err(remove_error) = std::fs::remove_file(output) {
            tracing::debug!(?remove_error, "could not remove partial output");
        }
        return Err(error.into());
    }

    tracing::info!(path = %output.display(), num_samples = samples.len(), "wrote transmission");
    Ok(())
}

/// Demodulates `samples` and decodes them into a cropped grayscale image.
pub fn decode_samples(
    samples: &[f32],
    sample_rate: f32,
    config: &DecoderConfig,
    cancel: Option<Arc<AtomicBool>>,
    progress: impl FnMut(Progress),
) -> Result<DecodedImage, Cancelled> {
    let mut demodulator = SpectralDemodulator::new(sample_rate);
    let frequency = demodulator.demodulate(samples);
    tracing::debug!(num_samples = frequency.len(), "demodulated");

    let mut decoder = LineSyncDecoder::new(*config);
    if let Some(cancel) = cancel {
        decoder = decoder.with_cancel(cancel);
    }
    decoder.decode(&frequency, progress)
}

/// Reads a WAV file and decodes it.
///
/// Any channel count, 8 to 32 bit integer or 32 bit float samples are
/// accepted. Only the first channel is used.
pub fn decode_file(
    path: impl AsRef<Path>,
    config: &DecoderConfig,
    cancel: Option<Arc<AtomicBool>>,
    progress: impl FnMut(Progress),
) -> Result<DecodedImage, Error> {
    let path = path.as_ref();
    let source = WavSource::from_path(path)?;
    let sample_rate = source.sample_rate();
    if sample_rate != SAMPLE_RATE {
        tracing::warn!(
            sample_rate,
            expected = SAMPLE_RATE,
            "unexpected sample rate, pixel timing will be off"
        );
    }

    let samples = source.read_mono()?;
    tracing::info!(path = %path.display(), num_samples = samples.len(), "decoding");

    Ok(decode_samples(
        &samples,
        sample_rate,
        config,
        cancel,
        progress,
    )?)
}

/// Writes `image` to [`DECODED_FILE_NAME`] inside `directory`.
pub fn save_decoded(image: &GrayImage, directory: impl AsRef<Path>) -> Result<PathBuf, Error> {
    let path = directory.as_ref().join(DECODED_FILE_NAME);
    image.save_with_format(&path, ImageFormat::Png)?;
    tracing::info!(path = %path.display(), "saved decoded image");
    Ok(path)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Bmp => "bmp",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::Jpeg => ImageFormat::Jpeg,
            ExportFormat::Bmp => ImageFormat::Bmp,
        }
    }

    fn matches_extension(&self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();
        match self {
            ExportFormat::Jpeg => extension == "jpg" || extension == "jpeg",
            _ => extension == self.extension(),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            _ => Err(Error::UnsupportedFormat(s.to_owned())),
        }
    }
}

/// Appends the format's extension to `path` unless it already has a matching
/// one.
pub fn export_path(path: impl AsRef<Path>, format: ExportFormat) -> PathBuf {
    let path = path.as_ref();
    let has_extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| format.matches_extension(extension));

    if has_extension {
        path.to_owned()
    }
    else {
        let mut file_name = path.as_os_str().to_owned();
        file_name.push(".");
        file_name.push(format.extension());
        PathBuf::from(file_name)
    }
}

/// Writes `image` to `path` in `format` and returns the path actually written.
pub fn export_image(
    image: &GrayImage,
    path: impl AsRef<Path>,
    format: ExportFormat,
) -> Result<PathBuf, Error> {
    let path = export_path(path, format);
    image.save_with_format(&path, format.image_format())?;
    tracing::info!(path = %path.display(), ?format, "exported image");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::{
            Arc,
            atomic::AtomicBool,
        },
    };

    use image::{
        GrayImage,
        Luma,
        Rgb,
        RgbImage,
    };

    use crate::{
        modem::sstv::{
            decoder::DecoderConfig,
            file::{
                DECODED_FILE_NAME,
                Error,
                ExportFormat,
                decode_file,
                decode_samples,
                encode_file,
                export_image,
                export_path,
                save_decoded,
            },
        },
        source::Oscillator,
    };

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pixelpulse-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn export_formats_parse() {
        assert_eq!("png".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("JPG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("jpeg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("bmp".parse::<ExportFormat>().unwrap(), ExportFormat::Bmp);
        assert!(matches!(
            "gif".parse::<ExportFormat>(),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_extension_is_appended() {
        assert_eq!(
            export_path("out/picture", ExportFormat::Png),
            PathBuf::from("out/picture.png")
        );
        assert_eq!(
            export_path("picture.JPEG", ExportFormat::Jpeg),
            PathBuf::from("picture.JPEG")
        );
        assert_eq!(
            export_path("picture.png", ExportFormat::Bmp),
            PathBuf::from("picture.png.bmp")
        );
    }

    #[test]
    fn export_and_save_write_files() {
        let dir = temp_dir("export");
        let image = GrayImage::from_pixel(4, 3, Luma([100]));

        let written = export_image(&image, dir.join("exported"), ExportFormat::Bmp).unwrap();
        assert_eq!(written, dir.join("exported.bmp"));
        let read_back = image::open(&written).unwrap().into_luma8();
        assert_eq!(read_back.dimensions(), (4, 3));

        let saved = save_decoded(&image, &dir).unwrap();
        assert_eq!(saved, dir.join(DECODED_FILE_NAME));
        assert_eq!(image::open(&saved).unwrap().into_luma8(), image);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_input_image_is_an_error() {
        let dir = temp_dir("missing");
        let output = dir.join("out.wav");
        let result = encode_file(dir.join("does-not-exist.png"), &output);
        assert!(matches!(result, Err(Error::Image(_))));
        assert!(!output.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_input_audio_is_an_error() {
        let result = decode_file(
            "/nonexistent/pixelpulse.wav",
            &DecoderConfig::default(),
            None,
            |_| {},
        );
        assert!(matches!(result, Err(Error::WavSource(_))));
    }

    #[test]
    fn steady_tone_decodes_to_white() {
        let samples = Oscillator::new(44100.0).emit(1900.0, 500.0);
        let image = decode_samples(&samples, 44100.0, &DecoderConfig::default(), None, |_| {})
            .unwrap()
            .image;
        assert_eq!(image.dimensions(), (800, 320));
        assert!(image.pixels().all(|pixel| pixel.0[0] == 0xff));
    }

    #[test]
    fn cancelled_decode_is_reported() {
        let dir = temp_dir("cancel");
        let input = dir.join("input.png");
        let output = dir.join("output.wav");
        RgbImage::from_pixel(32, 24, Rgb([0, 0, 0])).save(&input).unwrap();
        encode_file(&input, &output).unwrap();

        let cancel = Arc::new(AtomicBool::new(true));
        let result = decode_file(&output, &DecoderConfig::default(), Some(cancel), |_| {});
        assert!(matches!(
            result,
            Err(Error::Cancelled(cancelled)) if cancelled.lines_decoded == 0
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
