// Actions: the side effects fired when the hook is invoked.
//
// Architecture:
// - model.rs: Action configuration and backend selection
// - facility.rs: Facility traits and dispatch from an action to a facility
// - system.rs: Facilities backed by platform programs (afplay, notify-send, ...)
// - native.rs: Facilities backed by in-process libraries (rodio, notify-rust)

pub mod facility;
pub mod model;
pub mod native;
pub mod system;
