// src/ui/notify.rs
use super::UI_LOG_TARGET;
use std::process::{Command, Stdio};
use tracing::trace;

/// Replaces the previous notification instead of stacking a new one.
const SYNC_HINT: &str = "string:x-canonical-private-synchronous:rofitube";

/// Best-effort user notification.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Sends desktop notifications through `notify-send`.
pub struct DesktopNotifier {
    program: String,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        DesktopNotifier { program: "notify-send".to_string() }
    }
}

impl DesktopNotifier {
    pub fn with_program(program: impl Into<String>) -> Self {
        DesktopNotifier { program: program.into() }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        let spawned = Command::new(&self.program)
            .args(["-h", SYNC_HINT, title, body])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                // Reap in the background so notifications never block playback
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => trace!(target: UI_LOG_TARGET, "Notification skipped ({}): {}", self.program, e),
        }
    }
}
