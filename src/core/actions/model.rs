// Action model types for configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One configured side effect performed when the hook fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Action {
    /// Play an audio file through the sound facility
    PlaySound { path: PathBuf },
    /// Show a desktop notification with fixed text
    ShowNotification { title: String, body: String },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::PlaySound { .. } => ActionKind::PlaySound,
            Self::ShowNotification { .. } => ActionKind::ShowNotification,
        }
    }

    /// The actions used when no settings file says otherwise.
    pub fn defaults() -> Vec<Action> {
        vec![
            Self::PlaySound {
                path: PathBuf::from(default_sound_path()),
            },
            Self::ShowNotification {
                title: DEFAULT_TITLE.to_string(),
                body: DEFAULT_BODY.to_string(),
            },
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    PlaySound,
    ShowNotification,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlaySound => "play-sound",
            Self::ShowNotification => "show-notification",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which implementation a facility uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// External platform programs, launched detached
    #[default]
    System,
    /// In-process libraries
    Native,
}

pub const DEFAULT_TITLE: &str = "Task complete";
pub const DEFAULT_BODY: &str = "The run has finished.";

fn default_sound_path() -> &'static str {
    if cfg!(target_os = "macos") {
        "/System/Library/Sounds/Glass.aiff"
    } else if cfg!(windows) {
        "C:\\Windows\\Media\\tada.wav"
    } else {
        "/usr/share/sounds/freedesktop/stereo/complete.oga"
    }
}
