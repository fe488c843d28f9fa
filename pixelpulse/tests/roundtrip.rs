use approx::assert_abs_diff_eq;
use image::{
    DynamicImage,
    GrayImage,
    Rgb,
    RgbImage,
};
use pixelpulse::{
    SAMPLE_RATE,
    modem::{
        fm::demodulate,
        sstv::{
            DecoderConfig,
            ModeSpecification,
            decode_file,
            decode_samples,
            encode_file,
            encode_image,
        },
    },
    util::millis_to_samples,
};

/// Sample offset of the luma scan of line `y`.
fn luma_start(y: usize) -> usize {
    let mode = ModeSpecification::R36;
    let ms = |duration| millis_to_samples(duration, SAMPLE_RATE);

    let header = 2 * ms(300.0) + ms(10.0) + 9 * ms(30.0);
    let line = ms(mode.sync_time)
        + ms(mode.porch_time)
        + ms(mode.luma_time)
        + ms(mode.sep_time)
        + ms(mode.sep_porch_time)
        + ms(mode.chroma_time);
    header + y * line + ms(mode.sync_time) + ms(mode.porch_time)
}

fn solid(value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, Rgb([value; 3])))
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

/// Rows whose middle of the luma scan satisfies `predicate`.
fn count_rows(image: &GrayImage, predicate: impl Fn(u8) -> bool) -> usize {
    (0..image.height())
        .filter(|&y| (60..310).all(|x| predicate(image.get_pixel(x, y).0[0])))
        .count()
}

#[test]
fn header_and_line_timing() {
    assert_eq!(luma_start(0), 38808 + 397 + 132);
    assert_eq!(luma_start(1) - luma_start(0), 6614);

    let samples = encode_image(&solid(0), SAMPLE_RATE);
    assert_eq!(samples.len(), 38808 + 240 * 6614);
}

#[test]
fn luma_tracks_brightness() {
    let luma_samples = millis_to_samples(ModeSpecification::R36.luma_time, SAMPLE_RATE);

    for (value, expected) in [(0, 1500.0), (255, 2300.0)] {
        let samples = encode_image(&solid(value), SAMPLE_RATE);
        let frequency = demodulate(&samples, SAMPLE_RATE);

        for y in [0, 1, 120, 239] {
            let start = luma_start(y) + 200;
            let end = luma_start(y) + luma_samples - 200;
            assert_abs_diff_eq!(mean(&frequency[start..end]), expected, epsilon = 10.0);
        }
    }
}

#[test]
fn gray_image_survives_encode_and_decode() {
    let samples = encode_image(&solid(128), SAMPLE_RATE);

    let mut last_progress = None;
    let decoded = decode_samples(
        &samples,
        SAMPLE_RATE,
        &DecoderConfig::default(),
        None,
        |progress| last_progress = Some(progress),
    )
    .unwrap();

    let progress = last_progress.unwrap();
    assert_eq!(progress.line_count, decoded.lines_decoded());
    assert!(decoded.lines_decoded() >= 240);
    let image = &decoded.image;
    assert!(image.height() >= 240 && image.height() <= 320);

    let gray_rows = count_rows(image, |value| (120..=135).contains(&value));
    assert!(gray_rows >= 235, "only {gray_rows} gray rows");
}

#[test]
fn encode_and_decode_through_wav_files() {
    let dir = std::env::temp_dir().join(format!("pixelpulse-roundtrip-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let input = dir.join("input.png");
    let output = dir.join("output.wav");

    // any input size is resized to 320x240
    RgbImage::from_pixel(64, 48, Rgb([255, 255, 255]))
        .save(&input)
        .unwrap();
    encode_file(&input, &output).unwrap();

    let reader = hound::WavReader::open(&output).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(reader.len() as usize, 38808 + 240 * 6614);

    let image = decode_file(&output, &DecoderConfig::default(), None, |_| {})
        .unwrap()
        .image;
    // sync and porch are below the black level, the luma scan is white
    let bright_rows = count_rows(&image, |value| value >= 250);
    assert!(bright_rows >= 235, "only {bright_rows} bright rows");

    std::fs::remove_dir_all(&dir).unwrap();
}
