//! # pixelpulse
//!
//! Robot36 SSTV encoding and decoding.
//!
//! The encoder turns a still image into a phase-continuous FM audio signal
//! following the Robot36 timing table. The decoder recovers the instantaneous
//! frequency of a recording with an FFT based analytic signal, finds the line
//! sync pulses and turns the frequency between them into grayscale rows.
//!
//! ```no_run
//! use pixelpulse::modem::sstv::{
//!     DecoderConfig,
//!     decode_file,
//!     encode_file,
//! };
//!
//! # fn main() -> Result<(), pixelpulse::modem::sstv::Error> {
//! encode_file("input.jpg", "output.wav")?;
//! let decoded = decode_file("output.wav", &DecoderConfig::default(), None, |_| {})?;
//! decoded.image.save("decoded.png").map_err(pixelpulse::modem::sstv::Error::from)?;
//! # Ok(())
//! # }
//! ```

pub mod filter;
pub mod modem;
pub mod sink;
pub mod source;
pub mod util;

/// Sample rate used for all encoded transmissions.
pub const SAMPLE_RATE: f32 = 44100.0;

pub trait GetSampleRate {
    fn sample_rate(&self) -> f32;
}

impl<T: GetSampleRate> GetSampleRate for &T {
    #[inline]
    fn sample_rate(&self) -> f32 {
        (&**self).sample_rate()
    }
}

impl<T: GetSampleRate> GetSampleRate for &mut T {
    #[inline]
    fn sample_rate(&self) -> f32 {
        (&**self).sample_rate()
    }
}
