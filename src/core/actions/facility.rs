// Facility traits and action dispatch.
//
// A facility is the platform service that performs an action. The notifier
// only sees the traits, so tests can swap in mocks.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use super::model::{Action, Backend};
use super::{native, system};
use crate::core::error::FacilityError;

/// Audio playback taking a file path
pub trait SoundFacility: Send + Sync {
    fn play(&self, path: &Path) -> Result<(), FacilityError>;
}

/// Desktop notification taking a title and a body
pub trait NotificationFacility: Send + Sync {
    fn show(&self, title: &str, body: &str) -> Result<(), FacilityError>;
}

/// The facilities available to the notifier, cheap to clone into tasks.
#[derive(Clone)]
pub struct Facilities {
    pub sound: Arc<dyn SoundFacility>,
    pub notification: Arc<dyn NotificationFacility>,
}

impl Facilities {
    pub fn new(sound: Arc<dyn SoundFacility>, notification: Arc<dyn NotificationFacility>) -> Self {
        Self { sound, notification }
    }

    pub fn for_backends(sound: Backend, notification: Backend) -> Self {
        let sound: Arc<dyn SoundFacility> = match sound {
            Backend::System => Arc::new(system::SystemSound::for_current_platform()),
            Backend::Native => Arc::new(native::NativeSound),
        };
        let notification: Arc<dyn NotificationFacility> = match notification {
            Backend::System => Arc::new(system::SystemNotification),
            Backend::Native => Arc::new(native::NativeNotification),
        };
        Self { sound, notification }
    }

    /// Run one action against the matching facility.
    pub fn execute(&self, action: &Action) -> Result<(), FacilityError> {
        match action {
            Action::PlaySound { path } => self.sound.play(path),
            Action::ShowNotification { title, body } => self.notification.show(title, body),
        }
    }
}

/// Spawn `program` with null stdio and return its pid without waiting on it.
///
/// The child keeps running after this process exits. A detached thread
/// reaps it when it ends, so a long-lived host does not collect zombies.
/// On Unix it gets its own process group, which keeps it clear of signals
/// aimed at the caller's group.
pub(crate) fn launch_detached<I, S>(program: &str, args: I) -> io::Result<u32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = command.spawn()?;
    let pid = child.id();
    log::debug!("launched {program} (pid {pid})");

    let reaper = thread::Builder::new()
        .name(format!("reap-{pid}"))
        .spawn(move || {
            if let Err(e) = child.wait() {
                log::debug!("could not reap pid {pid}: {e}");
            }
        });
    if let Err(e) = reaper {
        log::debug!("no reaper thread for pid {pid}: {e}");
    }
    Ok(pid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl SoundFacility for Recorder {
        fn play(&self, path: &Path) -> Result<(), FacilityError> {
            self.calls.lock().unwrap().push(format!("play {}", path.display()));
            Ok(())
        }
    }

    impl NotificationFacility for Recorder {
        fn show(&self, title: &str, body: &str) -> Result<(), FacilityError> {
            self.calls.lock().unwrap().push(format!("show {title}/{body}"));
            Ok(())
        }
    }

    #[test]
    fn test_execute_routes_by_kind() {
        let recorder = Arc::new(Recorder::default());
        let facilities = Facilities::new(recorder.clone(), recorder.clone());

        facilities
            .execute(&Action::ShowNotification {
                title: "t".to_string(),
                body: "b".to_string(),
            })
            .unwrap();
        facilities
            .execute(&Action::PlaySound { path: "/x.wav".into() })
            .unwrap();

        assert_eq!(*recorder.calls.lock().unwrap(), vec!["show t/b", "play /x.wav"]);
    }

    #[test]
    fn test_launch_missing_program_is_not_found() {
        let err = launch_detached("hook-notifier-no-such-program", ["x"]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_finished_child_is_reaped() {
        use std::time::{Duration, Instant};

        let pid = launch_detached("true", std::iter::empty::<&str>()).unwrap();
        let stat = format!("/proc/{pid}/stat");

        // A zombie keeps its /proc entry until someone waits on it.
        let deadline = Instant::now() + Duration::from_secs(5);
        while std::path::Path::new(&stat).exists() {
            assert!(Instant::now() < deadline, "pid {pid} was never reaped");
            thread::sleep(Duration::from_millis(20));
        }
    }
}
