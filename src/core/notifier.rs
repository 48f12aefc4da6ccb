// Notifier - fires every configured action when an event arrives.
//
// Actions are fire-and-forget: each one runs as a detached blocking task
// whose join handle is dropped on the spot. Nothing supervises them. A
// failure is logged at debug level and handed to the completion hook, and
// never reaches the caller or the other actions.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::runtime::Handle;

use super::actions::facility::Facilities;
use super::actions::model::Action;
use super::config::Settings;
use super::error::FacilityError;
use super::event::Event;

/// Called after each action finishes, with the action and its outcome.
pub type CompletionHook = Arc<dyn Fn(&Action, &Result<(), FacilityError>) + Send + Sync>;

/// Immutable notifier configuration, fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifierConfig {
    pub actions: Vec<Action>,
}

impl NotifierConfig {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }
}

impl From<&Settings> for NotifierConfig {
    fn from(settings: &Settings) -> Self {
        Self::new(settings.actions.clone())
    }
}

pub struct Notifier {
    config: NotifierConfig,
    facilities: Facilities,
    /// Runtime the detached tasks are spawned on
    runtime: Handle,
    on_complete: Option<CompletionHook>,
}

impl Notifier {
    pub fn new(config: NotifierConfig, facilities: Facilities, runtime: Handle) -> Self {
        Self {
            config,
            facilities,
            runtime,
            on_complete: None,
        }
    }

    pub fn with_completion_hook(mut self, hook: CompletionHook) -> Self {
        self.on_complete = Some(hook);
        self
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Consume the event and launch every action.
    /// Returns how many actions were launched. Never waits on them.
    pub fn trigger(&self, event: Event) -> usize {
        log::debug!(
            "event of {} bytes, firing {} action(s)",
            event.len(),
            self.config.actions.len()
        );

        for action in &self.config.actions {
            self.fire(action.clone());
        }
        self.config.actions.len()
    }

    fn fire(&self, action: Action) {
        let facilities = self.facilities.clone();
        let on_complete = self.on_complete.clone();

        // Handle dropped: the task is detached and nobody joins it.
        drop(self.runtime.spawn_blocking(move || {
            let result = execute_contained(&facilities, &action);
            match &result {
                Ok(()) => log::debug!("{} launched", action.kind()),
                Err(e) => log::debug!("{} failed: {e}", action.kind()),
            }
            if let Some(hook) = on_complete {
                hook(&action, &result);
            }
        }));
    }
}

/// Run one action, turning a panic inside the facility into an error.
fn execute_contained(facilities: &Facilities, action: &Action) -> Result<(), FacilityError> {
    panic::catch_unwind(AssertUnwindSafe(|| facilities.execute(action)))
        .unwrap_or(Err(FacilityError::Panicked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::facility::{NotificationFacility, SoundFacility};
    use crate::core::actions::model::ActionKind;
    use std::path::Path;
    use std::sync::mpsc;
    use std::time::Duration;

    struct PanickingSound;

    impl SoundFacility for PanickingSound {
        fn play(&self, _path: &Path) -> Result<(), FacilityError> {
            panic!("decoder blew up");
        }
    }

    struct QuietNotification;

    impl NotificationFacility for QuietNotification {
        fn show(&self, _title: &str, _body: &str) -> Result<(), FacilityError> {
            Ok(())
        }
    }

    fn both_actions() -> NotifierConfig {
        NotifierConfig::new(vec![
            Action::PlaySound { path: "/tmp/ding.wav".into() },
            Action::ShowNotification {
                title: "t".to_string(),
                body: "b".to_string(),
            },
        ])
    }

    #[test]
    fn test_panic_is_contained() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let facilities = Facilities::new(Arc::new(PanickingSound), Arc::new(QuietNotification));
        let (tx, rx) = mpsc::channel();
        let hook: CompletionHook = Arc::new(move |action: &Action, result: &Result<(), FacilityError>| {
            let _ = tx.send((action.kind(), result.is_ok(), matches!(result, Err(FacilityError::Panicked))));
        });

        let notifier = Notifier::new(both_actions(), facilities, runtime.handle().clone())
            .with_completion_hook(hook);
        assert_eq!(notifier.trigger(Event::default()), 2);

        let mut outcomes: Vec<_> = (0..2)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        outcomes.sort_by_key(|(kind, _, _)| kind.as_str());

        assert_eq!(
            outcomes,
            vec![
                (ActionKind::PlaySound, false, true),
                (ActionKind::ShowNotification, true, false),
            ]
        );
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings::default();
        let config = NotifierConfig::from(&settings);
        assert_eq!(config.actions, settings.actions);
    }
}
