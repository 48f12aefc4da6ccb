// Facilities backed by in-process libraries.
//
// Sound is decoded with rodio. Playback has to outlive the hook process, so
// `NativeSound` re-launches this executable detached with the hidden
// `play-sound` subcommand, and that child calls `play_blocking`.

use std::ffi::OsStr;
use std::path::Path;

use notify_rust::Notification;

use super::facility::{launch_detached, NotificationFacility, SoundFacility};
use crate::core::error::FacilityError;

/// Hidden CLI subcommand that plays one file in process and exits.
pub const PLAY_SOUND_SUBCOMMAND: &str = "play-sound";

const APP_NAME: &str = "hook-notifier";

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSound;

impl SoundFacility for NativeSound {
    fn play(&self, path: &Path) -> Result<(), FacilityError> {
        if !cfg!(feature = "native-audio") {
            return Err(FacilityError::Unavailable("native audio"));
        }
        if !path.exists() {
            return Err(FacilityError::MissingResource(path.to_path_buf()));
        }

        let exe = std::env::current_exe().map_err(|source| FacilityError::Launch {
            program: APP_NAME.to_string(),
            source,
        })?;
        let program = exe.to_string_lossy().into_owned();
        launch_detached(&program, [OsStr::new(PLAY_SOUND_SUBCOMMAND), path.as_os_str()])
            .map(|_| ())
            .map_err(|source| FacilityError::Launch { program, source })
    }
}

/// Decode `path` and play it on the default output device until it ends.
#[cfg(feature = "native-audio")]
pub fn play_blocking(path: &Path) -> Result<(), FacilityError> {
    use std::fs::File;
    use std::io::BufReader;

    let file = File::open(path).map_err(|_| FacilityError::MissingResource(path.to_path_buf()))?;

    let mut stream = rodio::OutputStreamBuilder::open_default_stream()
        .map_err(|e| FacilityError::Audio(e.to_string()))?;
    stream.log_on_drop(false);

    let sink = rodio::play(stream.mixer(), BufReader::new(file))
        .map_err(|e| FacilityError::Audio(e.to_string()))?;
    sink.sleep_until_end();
    Ok(())
}

#[cfg(not(feature = "native-audio"))]
pub fn play_blocking(_path: &Path) -> Result<(), FacilityError> {
    Err(FacilityError::Unavailable("native audio"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeNotification;

impl NotificationFacility for NativeNotification {
    fn show(&self, title: &str, body: &str) -> Result<(), FacilityError> {
        Notification::new()
            .appname(APP_NAME)
            .summary(title)
            .body(body)
            .show()
            .map(|_| ())
            .map_err(|e| FacilityError::Notification(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_sound_checks_resource() {
        let err = NativeSound.play(Path::new("/definitely/not/here.ogg")).unwrap_err();
        if cfg!(feature = "native-audio") {
            assert!(matches!(err, FacilityError::MissingResource(_)));
        } else {
            assert!(matches!(err, FacilityError::Unavailable("native audio")));
        }
    }

    #[test]
    fn test_play_blocking_missing_file() {
        let err = play_blocking(Path::new("/definitely/not/here.ogg")).unwrap_err();
        assert!(matches!(
            err,
            FacilityError::MissingResource(_) | FacilityError::Unavailable(_)
        ));
    }
}
