mod args;
mod decode;
mod files;
mod preview;
mod settings;

use std::path::Path;

use clap::Parser;
use pixelpulse::modem::sstv::{
    ExportFormat,
    encode_file,
    export_image,
    save_decoded,
};
use tracing_subscriber::{
    EnvFilter,
    filter::LevelFilter,
};

use crate::{
    args::{
        Args,
        Command,
        SettingsOverrides,
    },
    decode::{
        Decoded,
        decode_in_background,
    },
    files::AppFiles,
    preview::render_preview,
    settings::Settings,
};

pub type Error = color_eyre::eyre::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(?args);

    let result = run(args).await;
    if let Err(error) = &result {
        tracing::error!(?error);
    }
    result
}

async fn run(args: Args) -> Result<(), Error> {
    match args.command {
        Command::Encode { image, output } => {
            let output_for_task = output.clone();
            tokio::task::spawn_blocking(move || encode_file(image, output_for_task)).await??;
            println!("{}", output.display());
        }
        Command::Decode {
            input,
            export,
            preview,
            overrides,
        } => {
            let settings = load_settings(&overrides)?;
            decode(input.as_path(), export.as_deref(), preview.as_deref(), &settings).await?;
        }
        Command::Settings {
            overrides,
            save,
            reset,
        } => {
            let files = AppFiles::new()?;
            let mut settings = if reset {
                Settings::default()
            }
            else {
                files.settings()?
            };
            overrides.apply(&mut settings);
            if save || reset {
                files.save_settings(&settings)?;
                tracing::info!(path = %files.settings_path().display(), "Saved settings");
            }
            print!("{}", toml::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

/// Stored settings with the command line overrides applied. Falls back to the
/// defaults if the settings file can't be used.
fn load_settings(overrides: &SettingsOverrides) -> Result<Settings, Error> {
    let mut settings = match AppFiles::new().and_then(|files| files.settings()) {
        Ok(settings) => settings,
        Err(error) => {
            tracing::warn!(?error, "Could not load settings, using defaults");
            Settings::default()
        }
    };
    overrides.apply(&mut settings);
    tracing::debug!(?settings);
    Ok(settings)
}

async fn decode(
    input: &Path,
    export: Option<&Path>,
    preview: Option<&Path>,
    settings: &Settings,
) -> Result<(), Error> {
    let config = settings.decoder_config();
    let decoded = match decode_in_background(input.to_owned(), config).await? {
        Decoded::Complete(decoded) => decoded,
        Decoded::Cancelled { lines_decoded } => {
            tracing::warn!(lines_decoded, "Decoding cancelled, no image written");
            return Ok(());
        }
    };
    let image = &decoded.image;

    tracing::info!(
        lines_decoded = decoded.lines_decoded(),
        width = image.width(),
        height = image.height(),
        "Decoded image"
    );

    std::fs::create_dir_all(&settings.output_dir)?;
    let path = save_decoded(image, &settings.output_dir)?;
    println!("{}", path.display());

    if let Some(export) = export {
        let format = export
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(|extension| extension.parse::<ExportFormat>().ok())
            .unwrap_or_else(|| settings.output_format.into());
        let path = export_image(image, export, format)?;
        println!("{}", path.display());
    }

    if let Some(preview) = preview {
        let rendered = render_preview(image, settings.show_grid, decoded.last_line());
        rendered.save(preview)?;
        println!("{}", preview.display());
    }

    Ok(())
}
