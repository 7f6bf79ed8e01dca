//! Uniform control interface over the supported external players.
//!
//! mpv is driven through its JSON IPC socket, VLC through the `rc` line
//! interface on a loopback TCP port. Everything outside this module talks to
//! a `PlayerBackend` and never branches on which one is active.

mod error;
mod mpv;
mod vlc;

pub use error::BackendError;
pub use mpv::MpvBackend;
pub use vlc::VlcBackend;

use crate::config::{BackendKind, Settings};
use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use std::sync::Arc;

pub(crate) const BACKEND_LOG_TARGET: &str = "r_tubeplay::backend";

/// Player status as observed by a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Unknown,
    Idle,
    Playing,
    Paused,
    Stopped,
    Unreachable,
}

impl PlayerState {
    pub fn is_reachable(&self) -> bool {
        *self != PlayerState::Unreachable
    }

    /// The player has picked up the loaded item.
    pub fn has_started(&self) -> bool {
        matches!(self, PlayerState::Playing | PlayerState::Paused)
    }

    /// The player went back to having nothing to play.
    pub fn has_finished(&self) -> bool {
        matches!(self, PlayerState::Idle | PlayerState::Stopped)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerState::Unknown => "unknown",
            PlayerState::Idle => "idle",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Stopped => "stopped",
            PlayerState::Unreachable => "unreachable",
        };
        f.write_str(name)
    }
}

/// A single command for a player's control channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// JSON IPC command, sent as `{"command": [...]}`
    Structured(Vec<serde_json::Value>),
    /// Plain text line
    Text(String),
}

/// Counts of the commands issued by one `load_and_play` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    pub sent: usize,
    pub failed: usize,
}

impl LoadOutcome {
    pub(crate) fn record<T>(&mut self, result: &Result<T, BackendError>) {
        match result {
            Ok(_) => self.sent += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn all_sent(&self) -> bool {
        self.failed == 0 && self.sent > 0
    }
}

/// How to start the player so that its control channel comes up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchSpec {
    /// Builds a detached command with all standard streams discarded.
    pub fn command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

/// Capability set every player backend provides.
#[async_trait]
pub trait PlayerBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Opens a short-lived connection, writes one command and, where the
    /// command has one, returns the raw reply.
    async fn send_command(&self, command: &ControlCommand) -> Result<Option<String>, BackendError>;

    /// Queries the player. Connection failures map to `Unreachable`.
    async fn query_state(&self) -> PlayerState;

    /// Replaces the current item with `links[0]`, attaches `links[1]` as an
    /// extra audio track when present and sets the displayed title.
    async fn load_and_play(&self, links: &[String], title: &str) -> LoadOutcome;

    fn launch_command(&self) -> LaunchSpec;
}

/// Builds the backend selected in the settings.
pub fn create_backend(settings: &Settings) -> Arc<dyn PlayerBackend> {
    match settings.player {
        BackendKind::Mpv => Arc::new(MpvBackend::new(
            settings.mpv_socket_path.clone(),
            settings.timing.clone(),
        )),
        BackendKind::Vlc => Arc::new(VlcBackend::new(
            settings.vlc_rc_host.clone(),
            settings.vlc_rc_port,
            settings.timing.clone(),
        )),
    }
}
