use std::path::{
    Path,
    PathBuf,
};

use color_eyre::eyre::Error;
use pixelpulse::{
    GetSampleRate,
    modem::{
        fm::SpectralDemodulator,
        sstv::{
            DecoderConfig,
            LineSyncDecoder,
            ModeSpecification,
            Robot36Encoder,
            Segment,
            image::YuvFrame,
        },
    },
    sink::file::write_samples_to_wav,
    source::{
        Oscillator,
        file::WavSource,
    },
};

fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt::init();
    tracing::info!("SSTV example");

    let args = <Args as clap::Parser>::parse();

    match args {
        Args::Encode {
            image,
            output,
            sample_rate,
        } => encode(&image, &output, sample_rate)?,
        Args::Segments { input } => segments(&input)?,
        Args::Syncs { input } => syncs(&input)?,
    }

    Ok(())
}

#[derive(Debug, clap::Parser)]
enum Args {
    /// Encode at an arbitrary sample rate.
    Encode {
        image: PathBuf,
        output: PathBuf,
        #[clap(short, long, default_value = "44100")]
        sample_rate: f32,
    },
    /// Print the mean demodulated frequency of each header segment.
    Segments { input: PathBuf },
    /// Print where the line syncs are found.
    Syncs { input: PathBuf },
}

fn encode(image: &Path, output: &Path, sample_rate: f32) -> Result<(), Error> {
    let mode = ModeSpecification::R36;
    let image = image::open(image)?
        .resize_exact(
            mode.pixels_per_line as u32,
            mode.num_lines as u32,
            image::imageops::FilterType::Triangle,
        )
        .into_rgb8();
    let encoder = Robot36Encoder::new(YuvFrame::from_rgb(&image), sample_rate);
    let samples = encoder.encode();
    write_samples_to_wav(output, &samples, sample_rate as u32)?;
    Ok(())
}

fn read(input: &Path) -> Result<(Vec<f32>, f32), Error> {
    let source = WavSource::from_path(input)?;
    let sample_rate = source.sample_rate();
    Ok((source.read_mono()?, sample_rate))
}

fn segments(input: &Path) -> Result<(), Error> {
    let (samples, sample_rate) = read(input)?;
    let frequency = SpectralDemodulator::new(sample_rate).demodulate(&samples);

    // the header does not depend on the image
    let frame = YuvFrame::from_rgb(&image::RgbImage::new(320, 240));
    let encoder = Robot36Encoder::new(&frame, sample_rate);
    let oscillator = Oscillator::new(sample_rate);

    let mut offset = 0;
    for segment in encoder.segments().take(12 + 6) {
        let (expected, duration) = match &segment {
            Segment::Tone {
                frequency,
                duration,
            } => (Some(*frequency), *duration),
            Segment::Scan { duration, .. } => (None, *duration),
        };
        let num_samples = oscillator.num_samples(duration);
        let end = (offset + num_samples).min(frequency.len());
        let window = &frequency[offset.min(end)..end];
        let mean = window.iter().sum::<f32>() / window.len().max(1) as f32;
        println!("{offset:>8} {num_samples:>6} expected={expected:?} mean={mean:.1}");
        offset += num_samples;
    }

    Ok(())
}

fn syncs(input: &Path) -> Result<(), Error> {
    let (samples, sample_rate) = read(input)?;
    let frequency = SpectralDemodulator::new(sample_rate).demodulate(&samples);

    let mut previous = None;
    let summary = LineSyncDecoder::new(DecoderConfig::default()).scan_into(
        &frequency,
        image::GrayImage::new(800, 320),
        |_| {},
    )?;
    for sync in summary.sync_events {
        let distance = previous.map(|previous| sync - previous);
        println!("{sync:>8} {distance:?}");
        previous = Some(sync);
    }

    Ok(())
}
