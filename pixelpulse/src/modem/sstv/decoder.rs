use std::sync::{
    Arc,
    atomic::{
        AtomicBool,
        Ordering,
    },
};

use image::GrayImage;

use crate::{
    filter::MovingAverage,
    modem::sstv::{
        CHANNEL_HIGH_TONE,
        CHANNEL_LOW_TONE,
        image::{
            FrameBufferMut,
            auto_crop,
            crop_bounds,
        },
    },
    util::unlerp,
};

// These are derived from the Robot36 timing table at 44.1 kHz and are not
// re-derived for other sample rates.

/// Frequencies below this count towards a sync pulse.
pub const SYNC_THRESHOLD_FREQUENCY: f32 = 1300.0;
/// A sync pulse fires once more than this many consecutive low samples were
/// seen.
pub const SYNC_MIN_SAMPLES: usize = 200;
/// Samples per decoded pixel column.
pub const SAMPLES_PER_PIXEL: usize = 12;
/// Samples scanned for pixels after a sync pulse.
pub const SCANLINE_WINDOW: usize = 5000;
pub const SMOOTHING_WINDOW: usize = 5;
/// Progress is reported every this many samples.
pub const PROGRESS_INTERVAL: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecoderConfig {
    pub width: u32,
    pub height: u32,
    pub black_frequency: f32,
    pub white_frequency: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 320,
            black_frequency: CHANNEL_LOW_TONE,
            white_frequency: CHANNEL_HIGH_TONE,
        }
    }
}

impl DecoderConfig {
    /// Maps a frequency to a gray level: 0 below black, 255 above white,
    /// linear (truncated) in between.
    pub fn gray_level(&self, frequency: f32) -> u8 {
        if frequency < self.black_frequency {
            0
        }
        else if frequency > self.white_frequency {
            255
        }
        else {
            (unlerp(frequency, self.black_frequency, self.white_frequency) * 255.0) as u8
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub sample_index: usize,
    pub line_count: usize,
    pub fraction: f32,
}

/// Decoding was cancelled. Rows written so far stay in the frame buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("decoding cancelled after {lines_decoded} lines")]
pub struct Cancelled {
    pub lines_decoded: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub lines_decoded: usize,
    /// Sample index of each sync pulse that started a line.
    pub sync_events: Vec<usize>,
}

/// A decoded and cropped image.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub image: GrayImage,
    pub summary: ScanSummary,
    /// Position of the cropped image's top left corner in the decode buffer.
    pub crop_origin: (u32, u32),
}

impl DecodedImage {
    #[inline]
    pub fn lines_decoded(&self) -> usize {
        self.summary.lines_decoded
    }

    /// Row of the cropped image holding the last decoded line, if that line
    /// survived the crop.
    pub fn last_line(&self) -> Option<u32> {
        let line = u32::try_from(self.summary.lines_decoded.checked_sub(1)?).ok()?;
        line.checked_sub(self.crop_origin.1)
            .filter(|row| *row < self.image.height())
    }
}

/// Fires when the frequency stayed below [`SYNC_THRESHOLD_FREQUENCY`] for
/// more than [`SYNC_MIN_SAMPLES`] samples.
#[derive(Clone, Copy, Debug)]
pub struct SyncDetector {
    threshold_frequency: f32,
    min_samples: usize,
    low_run: usize,
}

impl Default for SyncDetector {
    fn default() -> Self {
        Self::new(SYNC_THRESHOLD_FREQUENCY, SYNC_MIN_SAMPLES)
    }
}

impl SyncDetector {
    pub fn new(threshold_frequency: f32, min_samples: usize) -> Self {
        Self {
            threshold_frequency,
            min_samples,
            low_run: 0,
        }
    }

    pub fn scan(&mut self, frequency: f32) -> bool {
        if frequency < self.threshold_frequency {
            self.low_run += 1;
            if self.low_run > self.min_samples {
                self.low_run = 0;
                return true;
            }
        }
        else if frequency > self.threshold_frequency {
            self.low_run = 0;
        }
        false
    }
}

/// Turns an instantaneous frequency track into grayscale scanlines.
#[derive(Clone, Debug, Default)]
pub struct LineSyncDecoder {
    config: DecoderConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl LineSyncDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// The decoder stops with [`Cancelled`] once `cancel` is set.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[inline]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    #[inline]
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|cancel| cancel.load(Ordering::Relaxed))
    }

    /// Decodes into a fresh white `width x height` image and crops it to the
    /// decoded area.
    pub fn decode(
        &self,
        frequency: &[f32],
        progress: impl FnMut(Progress),
    ) -> Result<DecodedImage, Cancelled> {
        let mut frame_buffer = GrayImage::new(0, 0);
        frame_buffer.set_size(self.config.width as usize, self.config.height as usize);

        let summary = self.scan_into(frequency, &mut frame_buffer, progress)?;
        if summary.lines_decoded == 0 {
            tracing::warn!("no sync pulses found");
        }
        else if summary.lines_decoded < self.config.height as usize {
            tracing::debug!(
                lines_decoded = summary.lines_decoded,
                height = self.config.height,
                "signal ended before the image was complete"
            );
        }

        let crop_origin = crop_bounds(&frame_buffer)
            .map_or((0, 0), |(min_x, min_y, _, _)| (min_x, min_y));
        Ok(DecodedImage {
            image: auto_crop(&frame_buffer),
            summary,
            crop_origin,
        })
    }

    /// Smooths `frequency`, finds sync pulses and writes one row per pulse
    /// into `frame_buffer`.
    pub fn scan_into<F>(
        &self,
        frequency: &[f32],
        mut frame_buffer: F,
        mut progress: impl FnMut(Progress),
    ) -> Result<ScanSummary, Cancelled>
    where
        F: FrameBufferMut,
    {
        let smoothed = MovingAverage::new(SMOOTHING_WINDOW).apply(frequency);
        let num_samples = smoothed.len();
        let width = (self.config.width as usize).min(frame_buffer.width());
        let height = (self.config.height as usize).min(frame_buffer.height());

        let mut sync = SyncDetector::default();
        let mut summary = ScanSummary::default();

        for i in 0..num_samples {
            if self.is_cancelled() {
                tracing::debug!(sample_index = i, lines_decoded = summary.lines_decoded, "cancelled");
                return Err(Cancelled {
                    lines_decoded: summary.lines_decoded,
                });
            }

            if sync.scan(smoothed[i]) {
                let y = summary.lines_decoded;
                let window = &smoothed[i..(i + SCANLINE_WINDOW).min(num_samples)];
                for (x, frequency) in window
                    .iter()
                    .skip(SAMPLES_PER_PIXEL - 1)
                    .step_by(SAMPLES_PER_PIXEL)
                    .take(width)
                    .enumerate()
                {
                    frame_buffer.set_gray(x, y, self.config.gray_level(*frequency));
                }

                tracing::trace!(sample_index = i, line = y, "sync");
                summary.sync_events.push(i);
                summary.lines_decoded += 1;
            }

            if i % PROGRESS_INTERVAL == 0 {
                progress(Progress {
                    sample_index: i,
                    line_count: summary.lines_decoded,
                    fraction: i as f32 / num_samples as f32,
                });
            }

            if summary.lines_decoded >= height {
                break;
            }
        }

        progress(Progress {
            sample_index: num_samples,
            line_count: summary.lines_decoded,
            fraction: 1.0,
        });

        tracing::debug!(lines_decoded = summary.lines_decoded, "scan finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{
            AtomicBool,
            Ordering,
        },
    };

    use image::{
        GrayImage,
        Luma,
    };

    use crate::modem::sstv::{
        decoder::{
            Cancelled,
            DecoderConfig,
            LineSyncDecoder,
            SyncDetector,
        },
        image::WHITE,
    };

    /// `lines` lines of a 400 sample sync pulse followed by 6000 samples at
    /// `frequency`.
    fn synthetic_lines(lines: usize, frequency: f32) -> Vec<f32> {
        let mut output = vec![frequency; 1000];
        for _ in 0..lines {
            output.extend(std::iter::repeat_n(1200.0, 400));
            output.extend(std::iter::repeat_n(frequency, 6000));
        }
        output
    }

    #[test]
    fn gray_level_mapping() {
        let config = DecoderConfig::default();
        assert_eq!(config.gray_level(1000.0), 0);
        assert_eq!(config.gray_level(1500.0), 0);
        assert_eq!(config.gray_level(1900.0), 127);
        assert_eq!(config.gray_level(2300.0), 255);
        assert_eq!(config.gray_level(2500.0), 255);
    }

    #[test]
    fn sustained_low_tone_fires_once() {
        let mut frequency = vec![1100.0; 250];
        frequency.extend(vec![2000.0; 500]);

        let summary = LineSyncDecoder::default()
            .scan_into(&frequency, GrayImage::new(800, 320), |_| {})
            .unwrap();

        assert_eq!(summary.sync_events.len(), 1);
        assert!(summary.sync_events[0] >= 200);
        assert_eq!(summary.lines_decoded, 1);
    }

    #[test]
    fn sync_detector_resets_on_high_tone() {
        let mut sync = SyncDetector::default();
        for _ in 0..150 {
            assert!(!sync.scan(1200.0));
        }
        assert!(!sync.scan(1500.0));
        for _ in 0..200 {
            assert!(!sync.scan(1200.0));
        }
        assert!(sync.scan(1200.0));
    }

    #[test]
    fn no_sync_gives_white_image() {
        let frequency = vec![1900.0; 20000];
        let image = LineSyncDecoder::default().decode(&frequency, |_| {}).unwrap().image;
        assert_eq!(image.dimensions(), (800, 320));
        assert!(image.pixels().all(|pixel| pixel.0[0] == WHITE));
    }

    #[test]
    fn it_decodes_rows_between_sync_pulses() {
        let frequency = synthetic_lines(4, 1900.0);
        let image = LineSyncDecoder::default().decode(&frequency, |_| {}).unwrap().image;

        // 5000 samples / 12 per pixel
        assert_eq!(image.dimensions(), (416, 4));
        assert_eq!(image.get_pixel(0, 0).0[0], 0);
        assert_eq!(image.get_pixel(300, 3).0[0], 127);
    }

    #[test]
    fn rows_are_bounded_by_height() {
        let frequency = synthetic_lines(10, 1900.0);
        let config = DecoderConfig {
            height: 3,
            ..Default::default()
        };
        let summary = LineSyncDecoder::new(config)
            .scan_into(&frequency, GrayImage::new(800, 3), |_| {})
            .unwrap();
        assert_eq!(summary.lines_decoded, 3);
        assert_eq!(summary.sync_events.len(), 3);
    }

    #[test]
    fn columns_beyond_width_are_discarded() {
        let frequency = synthetic_lines(2, 1900.0);
        let config = DecoderConfig {
            width: 10,
            ..Default::default()
        };
        let image = LineSyncDecoder::new(config).decode(&frequency, |_| {}).unwrap().image;
        assert_eq!(image.width(), 10);
    }

    #[test]
    fn progress_is_reported() {
        let frequency = synthetic_lines(3, 1900.0);
        let mut reports = vec![];
        LineSyncDecoder::default()
            .decode(&frequency, |progress| reports.push(progress))
            .unwrap();

        // every 1000 samples, plus the final report
        assert_eq!(reports.len(), frequency.len().div_ceil(1000) + 1);
        assert!(reports.windows(2).all(|pair| pair[0].fraction < pair[1].fraction));

        let last = reports.last().unwrap();
        assert_eq!(last.line_count, 3);
        assert_eq!(last.sample_index, frequency.len());
        assert_eq!(last.fraction, 1.0);
    }

    #[test]
    fn final_progress_matches_summary_when_height_is_reached() {
        let frequency = synthetic_lines(10, 1900.0);
        let config = DecoderConfig {
            height: 3,
            ..Default::default()
        };

        let mut last_progress = None;
        let summary = LineSyncDecoder::new(config)
            .scan_into(&frequency, GrayImage::new(800, 3), |progress| {
                last_progress = Some(progress)
            })
            .unwrap();

        let last_progress = last_progress.unwrap();
        assert_eq!(summary.lines_decoded, 3);
        assert_eq!(last_progress.line_count, summary.lines_decoded);
        assert_eq!(last_progress.fraction, 1.0);
    }

    #[test]
    fn decoded_image_keeps_summary_and_crop_origin() {
        // a sync pulse just long enough to fire, followed by a tone above
        // white, gives an all white row that is cropped away
        let mut frequency = vec![1900.0; 1000];
        for _ in 0..2 {
            frequency.extend(std::iter::repeat_n(1200.0, 205));
            frequency.extend(std::iter::repeat_n(2400.0, 6000));
        }
        for _ in 0..2 {
            frequency.extend(std::iter::repeat_n(1200.0, 400));
            frequency.extend(std::iter::repeat_n(1900.0, 6000));
        }

        let config = DecoderConfig {
            height: 10,
            ..Default::default()
        };
        let decoded = LineSyncDecoder::new(config).decode(&frequency, |_| {}).unwrap();

        assert_eq!(decoded.lines_decoded(), 4);
        assert_eq!(decoded.summary.sync_events.len(), 4);
        assert_eq!(decoded.crop_origin, (0, 2));
        assert_eq!(decoded.image.height(), 2);
        assert_eq!(decoded.last_line(), Some(1));
    }

    #[test]
    fn last_line_is_none_without_lines() {
        let decoded = LineSyncDecoder::default()
            .decode(&[1900.0; 5000], |_| {})
            .unwrap();
        assert_eq!(decoded.lines_decoded(), 0);
        assert_eq!(decoded.last_line(), None);
    }

    #[test]
    fn cancellation_freezes_line_count() {
        let frequency = synthetic_lines(10, 1900.0);
        let cancel = Arc::new(AtomicBool::new(false));
        let decoder = LineSyncDecoder::default().with_cancel(cancel.clone());

        let mut frame_buffer = GrayImage::from_pixel(800, 320, Luma([WHITE]));
        let mut line_count_at_cancel = None;
        let result = decoder.scan_into(&frequency, &mut frame_buffer, |progress| {
            if progress.line_count >= 3 && line_count_at_cancel.is_none() {
                line_count_at_cancel = Some(progress.line_count);
                cancel.store(true, Ordering::Relaxed);
            }
        });

        assert_eq!(line_count_at_cancel, Some(3));
        assert_eq!(result, Err(Cancelled { lines_decoded: 3 }));

        // the first rows stay, nothing after them was written
        for y in 0..3 {
            assert!(frame_buffer.rows().nth(y).unwrap().any(|pixel| pixel.0[0] != WHITE));
        }
        for y in 3..320 {
            assert!(frame_buffer.rows().nth(y).unwrap().all(|pixel| pixel.0[0] == WHITE));
        }
    }

    #[test]
    fn cancelled_before_start() {
        let cancel = Arc::new(AtomicBool::new(true));
        let result = LineSyncDecoder::default()
            .with_cancel(cancel)
            .decode(&synthetic_lines(2, 1900.0), |_| {});
        assert_eq!(result, Err(Cancelled { lines_decoded: 0 }));
    }
}
