use std::path::{
    Path,
    PathBuf,
};

use pixelpulse::modem::sstv::{
    DecoderConfig,
    ExportFormat,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::Error;

/// Persisted decoder settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub black_frequency: f32,
    pub white_frequency: f32,
    pub show_grid: bool,
    pub output_format: OutputFormat,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let config = DecoderConfig::default();
        Self {
            width: config.width,
            height: config.height,
            black_frequency: config.black_frequency,
            white_frequency: config.white_frequency,
            show_grid: true,
            output_format: OutputFormat::Png,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        tracing::debug!(path = %path.as_ref().display(), "Loading settings from file");
        Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
    }

    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        tracing::debug!(path = %path.as_ref().display(), "Writing settings to file");
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            width: self.width,
            height: self.height,
            black_frequency: self.black_frequency,
            white_frequency: self.white_frequency,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Png,
    #[value(alias = "jpeg")]
    #[serde(alias = "jpeg")]
    Jpg,
    Bmp,
}

impl From<OutputFormat> for ExportFormat {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Png => ExportFormat::Png,
            OutputFormat::Jpg => ExportFormat::Jpeg,
            OutputFormat::Bmp => ExportFormat::Bmp,
        }
    }
}
