//! Mode specification
//!
//! Adapted from [here][1]. [Vis codes][2]
//!
//! [1]: https://github.com/windytan/slowrx/blob/master/modespec.c
//! [2]: https://web.archive.org/web/20050306193820/http://www.tima.com/~djones/vis.txt

use std::fmt::{
    Display,
    Formatter,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct VisCode(u8);

impl VisCode {
    #[inline]
    pub const fn new(value: u8) -> Option<Self> {
        if value & 0x80 == 0 {
            Some(Self(value))
        }
        else {
            None
        }
    }

    #[inline]
    pub fn get(&self) -> u8 {
        self.0
    }

    #[inline]
    pub fn get_bit(&self, bit: u8) -> bool {
        assert!(bit < 7);
        (self.0 >> bit) & 1 != 0
    }

    /// The 7 data bits, least significant first.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..7).map(|bit| self.get_bit(bit))
    }
}

/// Line timing of an SSTV mode. Durations are in milliseconds.
#[derive(Clone, Copy, Debug)]
pub struct ModeSpecification {
    pub name: &'static str,
    pub short_name: &'static str,
    pub sync_time: f32,
    pub porch_time: f32,
    pub luma_time: f32,
    pub sep_time: f32,
    pub sep_porch_time: f32,
    pub chroma_time: f32,
    pub pixels_per_line: usize,
    pub chroma_pixels_per_line: usize,
    pub num_lines: usize,
    pub vis_code: VisCode,
}

impl ModeSpecification {
    pub const R36: Self = Self {
        name: "Robot 36",
        short_name: "R36",
        sync_time: 9.0,
        porch_time: 3.0,
        luma_time: 88.0,
        sep_time: 4.5,
        sep_porch_time: 1.5,
        chroma_time: 44.0,
        pixels_per_line: 320,
        chroma_pixels_per_line: 160,
        num_lines: 240,
        vis_code: VisCode(0x08),
    };

    /// Nominal duration of one line.
    pub fn line_time(&self) -> f32 {
        self.sync_time
            + self.porch_time
            + self.luma_time
            + self.sep_time
            + self.sep_porch_time
            + self.chroma_time
    }
}

impl Default for ModeSpecification {
    fn default() -> Self {
        Self::R36
    }
}

impl Display for ModeSpecification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.short_name)
    }
}
