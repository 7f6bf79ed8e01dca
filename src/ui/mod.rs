//! User-facing surfaces: command line, picker and notifications

pub mod cli;
pub mod notify;
pub mod picker;

pub use cli::Args;
pub use notify::{DesktopNotifier, Notifier};
pub use picker::{Picker, RofiPicker};

const UI_LOG_TARGET: &str = "r_tubeplay::ui";
