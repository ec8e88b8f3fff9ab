use std::path::{Path, PathBuf};
use std::{env, fs};

use tracing::debug;

use crate::error::SettingsError;

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` layers an optional config file under environment
/// variables (prefix `LYRA__`) and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("LYRA")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform range checks on loaded settings.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.playback.volume > 100 {
            return Err(SettingsError::Invalid(format!(
                "playback.volume must be 0-100, got {}",
                self.playback.volume
            )));
        }
        if !(1000..=3000).contains(&self.lyrics.browsing_hold_ms) {
            return Err(SettingsError::Invalid(format!(
                "lyrics.browsing_hold_ms must be 1000-3000, got {}",
                self.lyrics.browsing_hold_ms
            )));
        }
        if self.lyrics.scroll_quiet_ms == 0 {
            return Err(SettingsError::Invalid(
                "lyrics.scroll_quiet_ms must be > 0".to_string(),
            ));
        }
        if self.audio.progress_interval_ms == 0 {
            return Err(SettingsError::Invalid(
                "audio.progress_interval_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Write the settings as TOML to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let text = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Write the settings to the resolved config path.
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = resolve_config_path().ok_or(SettingsError::NoPath)?;
        self.save_to(&path)
    }
}

/// Resolve the config path from `LYRA_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("LYRA_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/lyra/config.toml`
/// or `~/.config/lyra/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("lyra").join("config.toml"))
}
