//! Robot36 slow-scan television.
//!
//! # References
//!
//! - <http://lionel.cordesses.free.fr/gpages/sstv.html>
//! - <http://www.barberdsp.com/downloads/Dayton%20Paper.pdf>
//! - <https://web.archive.org/web/20120313215600/http://lionel.cordesses.free.fr/gpages/Cordesses.pdf>

mod decoder;
mod encoder;
mod file;
pub mod image;
pub mod modes;
pub mod state;

pub use decoder::{
    Cancelled,
    DecodedImage,
    DecoderConfig,
    LineSyncDecoder,
    PROGRESS_INTERVAL,
    Progress,
    SAMPLES_PER_PIXEL,
    SCANLINE_WINDOW,
    SMOOTHING_WINDOW,
    SYNC_MIN_SAMPLES,
    SYNC_THRESHOLD_FREQUENCY,
    ScanSummary,
    SyncDetector,
};
pub use encoder::{
    Robot36Encoder,
    Segment,
    encode_image,
};
pub use file::{
    DECODED_FILE_NAME,
    Error,
    ExportFormat,
    decode_file,
    decode_samples,
    encode_file,
    export_image,
    export_path,
    save_decoded,
};
pub use modes::{
    ModeSpecification,
    VisCode,
};

// all durations are in milliseconds

pub const LEADER_TONE: f32 = 1900.0;
pub const LEADER_TIME: f32 = 300.0;

pub const LEADER_BREAK_TIME: f32 = 10.0;

pub const VIS_BIT_TIME: f32 = 30.0;
/// VIS bit value 0
pub const VIS_LOW_TONE: f32 = 1300.0;
/// VIS bit value 1
pub const VIS_HIGH_TONE: f32 = 1100.0;

// sync, leader break, vis start/stop
pub const SYNC_TONE: f32 = 1200.0;

pub const PORCH_TONE: f32 = 1500.0;

// the separator before the chroma scan tells even (V) and odd (U) lines apart
pub const EVEN_SEPARATOR_TONE: f32 = 1500.0;
pub const ODD_SEPARATOR_TONE: f32 = 2300.0;
pub const SEPARATOR_PORCH_TONE: f32 = 1900.0;

pub const CHANNEL_LOW_TONE: f32 = 1500.0;
pub const CHANNEL_HIGH_TONE: f32 = 2300.0;
