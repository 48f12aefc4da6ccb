#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

fn main() {
  hook_notifier::run();
}
