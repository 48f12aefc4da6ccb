pub mod actions;
pub mod config;
pub mod error;
pub mod event;
pub mod hook_install;
pub mod notifier;
