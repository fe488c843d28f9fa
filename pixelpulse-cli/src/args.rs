use std::path::PathBuf;

use clap::{
    Parser,
    Subcommand,
};

use crate::settings::{
    OutputFormat,
    Settings,
};

#[derive(Debug, Parser)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encode an image as a Robot36 transmission.
    Encode {
        /// JPEG, PNG or BMP image. Any size, it is resized to 320x240.
        image: PathBuf,

        #[clap(default_value = "output.wav")]
        output: PathBuf,
    },

    /// Decode a Robot36 recording into a grayscale image.
    Decode {
        /// WAV file. Any channel count and bit depth.
        input: PathBuf,

        /// Also export the decoded image here. The extension picks the format,
        /// otherwise the configured output format is used.
        #[clap(short, long)]
        export: Option<PathBuf>,

        /// Render a preview with grid and line marker to this path.
        #[clap(short, long)]
        preview: Option<PathBuf>,

        #[command(flatten)]
        overrides: SettingsOverrides,
    },

    /// Print the stored settings, optionally changing them first.
    Settings {
        #[command(flatten)]
        overrides: SettingsOverrides,

        /// Store the overrides in the settings file.
        #[clap(long)]
        save: bool,

        /// Restore the default settings.
        #[clap(long, conflicts_with = "save")]
        reset: bool,
    },
}

/// Settings that can be overridden from the command line.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct SettingsOverrides {
    /// Width of the decode buffer in pixels.
    #[clap(long)]
    pub width: Option<u32>,

    /// Height of the decode buffer in lines.
    #[clap(long)]
    pub height: Option<u32>,

    /// Frequency in Hz that maps to black.
    #[clap(long)]
    pub black_frequency: Option<f32>,

    /// Frequency in Hz that maps to white.
    #[clap(long)]
    pub white_frequency: Option<f32>,

    /// Draw a grid on the preview.
    #[clap(long)]
    pub show_grid: Option<bool>,

    #[clap(long)]
    pub output_format: Option<OutputFormat>,

    /// Directory the decoded image is written to.
    #[clap(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl SettingsOverrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(black_frequency) = self.black_frequency {
            settings.black_frequency = black_frequency;
        }
        if let Some(white_frequency) = self.white_frequency {
            settings.white_frequency = white_frequency;
        }
        if let Some(show_grid) = self.show_grid {
            settings.show_grid = show_grid;
        }
        if let Some(output_format) = self.output_format {
            settings.output_format = output_format;
        }
        if let Some(output_dir) = &self.output_dir {
            settings.output_dir = output_dir.clone();
        }
    }
}
