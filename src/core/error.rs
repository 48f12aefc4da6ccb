// Error types.
//
// `FacilityError` is what an action can fail with. It never leaves the
// notifier: failures are logged and handed to the completion hook.
// `Error` covers the admin commands (config files, hook installation).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no config directory could be determined for this user")]
    NoConfigDir,

    #[error("{} does not contain a JSON object", .path.display())]
    NotAnObject { path: PathBuf },

    /// A key inside a JSON settings file holds the wrong kind of value.
    #[error("`{key}` in {} is not a JSON {expected}", .path.display())]
    UnexpectedShape {
        path: PathBuf,
        key: String,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single platform facility while executing an action.
#[derive(Error, Debug)]
pub enum FacilityError {
    /// None of the candidate programs (or libraries) exist on this system.
    #[error("no {0} facility available on this system")]
    Unavailable(&'static str),

    #[error("resource not found: {}", .0.display())]
    MissingResource(PathBuf),

    #[error("failed to launch {program}: {source}")]
    Launch { program: String, source: io::Error },

    #[error("audio error: {0}")]
    Audio(String),

    #[error("notification error: {0}")]
    Notification(String),

    #[error("action panicked")]
    Panicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = FacilityError::MissingResource(PathBuf::from("/nope/ding.wav"));
        assert_eq!(err.to_string(), "resource not found: /nope/ding.wav");

        let err = FacilityError::Launch {
            program: "afplay".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("failed to launch afplay"));

        let err = Error::NotAnObject { path: PathBuf::from("settings.json") };
        assert_eq!(err.to_string(), "settings.json does not contain a JSON object");

        let err = Error::UnexpectedShape {
            path: PathBuf::from("settings.json"),
            key: "hooks.Stop".to_string(),
            expected: "array",
        };
        assert_eq!(err.to_string(), "`hooks.Stop` in settings.json is not a JSON array");
    }
}
