use image::{
    DynamicImage,
    imageops::FilterType,
};

use crate::{
    GetSampleRate,
    filter::resampling::average_downsample,
    modem::sstv::{
        CHANNEL_HIGH_TONE,
        CHANNEL_LOW_TONE,
        EVEN_SEPARATOR_TONE,
        LEADER_BREAK_TIME,
        LEADER_TIME,
        LEADER_TONE,
        ODD_SEPARATOR_TONE,
        PORCH_TONE,
        SEPARATOR_PORCH_TONE,
        SYNC_TONE,
        VIS_BIT_TIME,
        VIS_HIGH_TONE,
        VIS_LOW_TONE,
        image::{
            Channel,
            FrameBuffer,
            YuvFrame,
        },
        modes::ModeSpecification,
        state::{
            HeaderState,
            LineState,
            State,
            chroma_channel,
        },
    },
    source::Oscillator,
    util::lerp,
};

/// One piece of the transmission: either a fixed tone or a row of pixel
/// values spread evenly over `duration` milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Tone { frequency: f32, duration: f32 },
    Scan { values: Vec<f32>, duration: f32 },
}

impl Segment {
    #[inline]
    pub fn tone(frequency: f32, duration: f32) -> Self {
        Self::Tone {
            frequency,
            duration,
        }
    }

    pub fn from_state<F>(state: &State, mode: &ModeSpecification, frame_buffer: &F) -> Self
    where
        F: FrameBuffer,
    {
        match state {
            State::Header { header_state } => {
                match header_state {
                    HeaderState::Leader1 | HeaderState::Leader2 => {
                        Segment::tone(LEADER_TONE, LEADER_TIME)
                    }
                    HeaderState::LeaderBreak => Segment::tone(SYNC_TONE, LEADER_BREAK_TIME),
                    HeaderState::VisStart | HeaderState::VisStop => {
                        Segment::tone(SYNC_TONE, VIS_BIT_TIME)
                    }
                    HeaderState::VisBit { bit } => {
                        let bit = mode.vis_code.get_bit(*bit);
                        Segment::tone(if bit { VIS_HIGH_TONE } else { VIS_LOW_TONE }, VIS_BIT_TIME)
                    }
                }
            }
            State::Line { y, line_state } => {
                match line_state {
                    LineState::Sync => Segment::tone(SYNC_TONE, mode.sync_time),
                    LineState::Porch => Segment::tone(PORCH_TONE, mode.porch_time),
                    LineState::Luma => {
                        Segment::Scan {
                            values: frame_buffer.row(*y, Channel::Y),
                            duration: mode.luma_time,
                        }
                    }
                    LineState::Separator => {
                        let frequency = match chroma_channel(*y) {
                            Channel::U => ODD_SEPARATOR_TONE,
                            _ => EVEN_SEPARATOR_TONE,
                        };
                        Segment::tone(frequency, mode.sep_time)
                    }
                    LineState::SeparatorPorch => {
                        Segment::tone(SEPARATOR_PORCH_TONE, mode.sep_porch_time)
                    }
                    LineState::Chroma => {
                        let row = frame_buffer.row(*y, chroma_channel(*y));
                        Segment::Scan {
                            values: average_downsample(&row, mode.chroma_pixels_per_line),
                            duration: mode.chroma_time,
                        }
                    }
                }
            }
        }
    }

    /// Appends the samples of this segment, continuing the oscillator's phase.
    pub fn render(&self, oscillator: &mut Oscillator, output: &mut Vec<f32>) {
        match self {
            Segment::Tone {
                frequency,
                duration,
            } => oscillator.emit_into(output, *frequency, *duration),
            Segment::Scan { values, duration } => {
                let num_samples = oscillator.num_samples(*duration);
                let num_pixels = values.len();
                if num_pixels == 0 || num_samples == 0 {
                    return;
                }

                oscillator.sweep_into(output, num_samples, |i| {
                    let index = (i * num_pixels / num_samples).min(num_pixels - 1);
                    value_to_frequency(values[index])
                });
            }
        }
    }
}

/// Maps an intensity in `[0, 255]` linearly onto 1500 Hz - 2300 Hz.
#[inline]
pub fn value_to_frequency(value: f32) -> f32 {
    lerp(value.clamp(0.0, 255.0) / 255.0, CHANNEL_LOW_TONE, CHANNEL_HIGH_TONE)
}

/// Robot36 encoder.
///
/// Owns the oscillator, so the phase runs continuously through the whole
/// transmission.
#[derive(Clone, Debug)]
pub struct Robot36Encoder<F> {
    frame_buffer: F,
    mode: ModeSpecification,
    oscillator: Oscillator,
}

impl<F> Robot36Encoder<F>
where
    F: FrameBuffer,
{
    /// # Panics
    ///
    /// Panics if `frame_buffer` is not 320x240. Use [`encode_image`] to
    /// encode images of any size.
    pub fn new(frame_buffer: F, sample_rate: f32) -> Self {
        let mode = ModeSpecification::R36;
        assert_eq!(frame_buffer.width(), mode.pixels_per_line);
        assert_eq!(frame_buffer.height(), mode.num_lines);

        Self {
            frame_buffer,
            mode,
            oscillator: Oscillator::new(sample_rate),
        }
    }

    #[inline]
    pub fn mode(&self) -> &ModeSpecification {
        &self.mode
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        State::sequence(&self.mode)
            .map(|state| Segment::from_state(&state, &self.mode, &self.frame_buffer))
    }

    pub fn encode(self) -> Vec<f32> {
        let mut output = Vec::new();
        let mut oscillator = self.oscillator;
        for segment in self.segments() {
            segment.render(&mut oscillator, &mut output);
        }

        tracing::debug!(
            mode = %self.mode,
            num_samples = output.len(),
            seconds = output.len() as f32 / self.sample_rate(),
            "encoded"
        );
        output
    }
}

impl<F> GetSampleRate for Robot36Encoder<F> {
    #[inline]
    fn sample_rate(&self) -> f32 {
        self.oscillator.sample_rate()
    }
}

/// Resizes `image` to 320x240, converts it to YUV and encodes it.
pub fn encode_image(image: &DynamicImage, sample_rate: f32) -> Vec<f32> {
    let mode = ModeSpecification::R36;
    let resized = image
        .resize_exact(
            mode.pixels_per_line as u32,
            mode.num_lines as u32,
            FilterType::Triangle,
        )
        .into_rgb8();
    let frame = YuvFrame::from_rgb(&resized);
    Robot36Encoder::new(frame, sample_rate).encode()
}
