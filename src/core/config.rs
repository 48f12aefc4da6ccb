use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

use directories::ProjectDirs;

use super::actions::model::{Action, Backend};
use super::error::{Error, Result};

/// Notifier settings as stored in settings.json.
/// Every field has a default, so a partial file is valid.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Actions fired on every invocation, in order
    #[serde(default = "Action::defaults")]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub sound_backend: Backend,
    #[serde(default)]
    pub notification_backend: Backend,
    /// Upper bound on how long the process lingers for actions still starting up.
    /// Values below `MIN_LAUNCH_GRACE_MS` are raised to it.
    #[serde(default = "default_launch_grace_ms")]
    pub launch_grace_ms: u64,
}

/// Shorter than this and the runtime can shut down before queued actions start.
pub const MIN_LAUNCH_GRACE_MS: u64 = 250;

fn default_launch_grace_ms() -> u64 {
    MIN_LAUNCH_GRACE_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            actions: Action::defaults(),
            sound_backend: Backend::default(),
            notification_backend: Backend::default(),
            launch_grace_ms: default_launch_grace_ms(),
        }
    }
}

impl Settings {
    pub fn launch_grace(&self) -> Duration {
        Duration::from_millis(self.launch_grace_ms.max(MIN_LAUNCH_GRACE_MS))
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    /// Use an explicit settings file instead of `<dir>/settings.json`.
    pub fn at(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// The per-user config directory, e.g. `~/.config/hook-notifier` on Linux.
    pub fn default_location() -> Result<Self> {
        let proj = ProjectDirs::from("", "", "hook-notifier").ok_or(Error::NoConfigDir)?;
        Ok(Self::new(proj.config_dir().to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load settings, falling back to defaults on any problem.
    pub fn load(&self) -> Settings {
        match self.load_strict() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("ignoring {}: {e}", self.config_path.display());
                Settings::default()
            }
        }
    }

    /// Load settings. A missing file yields defaults, anything else
    /// unreadable or malformed is an error.
    pub fn load_strict(&self) -> Result<Settings> {
        let content = match fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no settings at {}, using defaults", self.config_path.display());
                return Ok(Settings::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)?;
        Ok(())
    }
}
