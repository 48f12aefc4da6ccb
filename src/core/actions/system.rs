// Facilities backed by the platform's own programs.
//
// Every program is launched detached (see `launch_detached`): these calls
// return once the child is spawned, not when the sound or popup is done.

use std::ffi::OsString;
use std::io;
use std::path::Path;

use super::facility::{launch_detached, NotificationFacility, SoundFacility};
use crate::core::error::FacilityError;

/// How a player program receives the file to play.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Invocation {
    /// `program <path>`
    PathArgument,
    /// `powershell -Command "(New-Object Media.SoundPlayer '<path>').PlaySync()"`
    PowerShell,
}

/// A candidate audio player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    program: String,
    invocation: Invocation,
}

impl Player {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            invocation: Invocation::PathArgument,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn args(&self, path: &Path) -> Vec<OsString> {
        match self.invocation {
            Invocation::PathArgument => vec![path.as_os_str().to_owned()],
            Invocation::PowerShell => {
                // Single quotes are doubled inside a PowerShell literal string.
                let literal = path.to_string_lossy().replace('\'', "''");
                vec![
                    "-NoProfile".into(),
                    "-NonInteractive".into(),
                    "-Command".into(),
                    format!("(New-Object Media.SoundPlayer '{literal}').PlaySync()").into(),
                ]
            }
        }
    }
}

/// Plays sounds with the first player program that exists.
#[derive(Debug, Clone)]
pub struct SystemSound {
    players: Vec<Player>,
}

impl SystemSound {
    pub fn with_players(players: Vec<Player>) -> Self {
        Self { players }
    }

    pub fn for_current_platform() -> Self {
        let players = if cfg!(target_os = "macos") {
            vec![Player::new("afplay")]
        } else if cfg!(windows) {
            vec![Player {
                program: "powershell".to_string(),
                invocation: Invocation::PowerShell,
            }]
        } else {
            vec![Player::new("paplay"), Player::new("pw-play"), Player::new("aplay")]
        };
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }
}

impl SoundFacility for SystemSound {
    fn play(&self, path: &Path) -> Result<(), FacilityError> {
        if !path.exists() {
            return Err(FacilityError::MissingResource(path.to_path_buf()));
        }

        for player in &self.players {
            match launch_detached(&player.program, player.args(path)) {
                Ok(_) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::trace!("{} not installed, trying next player", player.program);
                }
                Err(source) => {
                    return Err(FacilityError::Launch {
                        program: player.program.clone(),
                        source,
                    })
                }
            }
        }

        Err(FacilityError::Unavailable("audio playback"))
    }
}

/// Shows notifications with `osascript` on macOS and `notify-send` elsewhere on Unix.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNotification;

impl NotificationFacility for SystemNotification {
    fn show(&self, title: &str, body: &str) -> Result<(), FacilityError> {
        if cfg!(target_os = "macos") {
            let script = applescript_notification(title, body);
            launch_notifier("osascript", ["-e", script.as_str()])
        } else if cfg!(unix) {
            launch_notifier("notify-send", ["--", title, body])
        } else {
            Err(FacilityError::Unavailable("desktop notification"))
        }
    }
}

fn launch_notifier<const N: usize>(program: &str, args: [&str; N]) -> Result<(), FacilityError> {
    launch_detached(program, args).map(|_| ()).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            FacilityError::Unavailable("desktop notification")
        } else {
            FacilityError::Launch {
                program: program.to_string(),
                source,
            }
        }
    })
}

/// Build a `display notification` statement with both strings quoted.
fn applescript_notification(title: &str, body: &str) -> String {
    format!(
        "display notification \"{}\" with title \"{}\"",
        applescript_escape(body),
        applescript_escape(title)
    )
}

fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
