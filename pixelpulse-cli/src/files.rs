use std::path::{
    Path,
    PathBuf,
};

use color_eyre::eyre::eyre;
use directories::ProjectDirs;

use crate::{
    Error,
    settings::Settings,
};

#[derive(Debug)]
pub struct AppFiles {
    project_dirs: ProjectDirs,
}

impl AppFiles {
    pub fn new() -> Result<Self, Error> {
        let project_dirs = ProjectDirs::from("", "pixelpulse", "pixelpulse-cli")
            .ok_or_else(|| eyre!("Could not determine project directories"))?;
        let this = Self { project_dirs };

        std::fs::create_dir_all(this.config_dir())?;

        Ok(this)
    }

    fn config_dir(&self) -> &Path {
        self.project_dirs.config_dir()
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir().join("settings.toml")
    }

    /// Loads the settings, writing the defaults on first use.
    pub fn settings(&self) -> Result<Settings, Error> {
        let path = self.settings_path();

        if path.exists() {
            Settings::from_path(path)
        }
        else {
            tracing::debug!(path = %path.display(), "Writing default settings to file");
            let settings = Settings::default();
            settings.to_path(path)?;
            Ok(settings)
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), Error> {
        settings.to_path(self.settings_path())
    }
}
