//! Common utilities for r-tubeplay integration tests
//!
//! Scripted stand-ins for the player, the resolver and the notifier.

#![allow(dead_code)]

use async_trait::async_trait;
use r_tubeplay::app::AppContext;
use r_tubeplay::backend::{BackendError, ControlCommand, LaunchSpec, LoadOutcome, PlayerBackend, PlayerState};
use r_tubeplay::config::{BackendKind, PlaybackTiming, Settings};
use r_tubeplay::media::{LinkResolver, MediaError, PlaybackItem, PlaybackMode};
use r_tubeplay::session::{LibcSignaller, SessionRegistrar};
use r_tubeplay::ui::Notifier;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Millisecond polling so traversals finish quickly.
pub fn fast_timing() -> PlaybackTiming {
    PlaybackTiming {
        command_timeout_ms: 50,
        settle_delay_ms: 1,
        launch_poll_interval_ms: 1,
        launch_poll_attempts: 3,
        start_poll_interval_ms: 1,
        start_poll_attempts: 3,
        watch_poll_interval_ms: 1,
        resolve_timeout_secs: 1,
    }
}

/// Default settings with every file kept inside `dir`.
pub fn settings_in(dir: &Path) -> Settings {
    Settings {
        session_file: dir.join("session.pid"),
        history_file: dir.join("history.json"),
        cookie_file: dir.join("cookies.txt"),
        mpv_socket_path: dir.join("mpv.sock"),
        timing: fast_timing(),
        ..Settings::default()
    }
}

pub fn items(ids: &[&str]) -> Vec<PlaybackItem> {
    ids.iter().map(|id| PlaybackItem::new(*id, format!("Track {}", id))).collect()
}

/// Player whose state answers come from a script, then a fallback.
pub struct MockPlayer {
    states: Mutex<VecDeque<PlayerState>>,
    fallback: PlayerState,
    loads: Mutex<Vec<(Vec<String>, String)>>,
}

impl MockPlayer {
    pub fn new(script: &[PlayerState], fallback: PlayerState) -> Self {
        MockPlayer {
            states: Mutex::new(script.iter().copied().collect()),
            fallback,
            loads: Mutex::new(Vec::new()),
        }
    }

    pub fn loads(&self) -> Vec<(Vec<String>, String)> {
        self.loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlayerBackend for MockPlayer {
    fn kind(&self) -> BackendKind {
        BackendKind::Vlc
    }

    async fn send_command(&self, _command: &ControlCommand) -> Result<Option<String>, BackendError> {
        Ok(None)
    }

    async fn query_state(&self) -> PlayerState {
        self.states.lock().unwrap().pop_front().unwrap_or(self.fallback)
    }

    async fn load_and_play(&self, links: &[String], title: &str) -> LoadOutcome {
        self.loads.lock().unwrap().push((links.to_vec(), title.to_string()));
        LoadOutcome { sent: 1, failed: 0 }
    }

    fn launch_command(&self) -> LaunchSpec {
        LaunchSpec { program: "true".to_string(), args: Vec::new() }
    }
}

/// Resolver answering from a fixed table; unknown ids fail.
#[derive(Default)]
pub struct TableResolver {
    table: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl TableResolver {
    pub fn with(mut self, id: &str, links: &[&str]) -> Self {
        self.table.insert(id.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LinkResolver for TableResolver {
    async fn resolve(&self, item_id: &str, _mode: PlaybackMode) -> Result<Vec<String>, MediaError> {
        self.calls.lock().unwrap().push(item_id.to_string());
        self.table
            .get(item_id)
            .cloned()
            .ok_or_else(|| MediaError::Process(format!("unknown id {}", item_id)))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    bodies: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, _title: &str, body: &str) {
        self.bodies.lock().unwrap().push(body.to_string());
    }
}

/// Context wired with mocks; the session uses real signals and `pid`.
pub fn context(
    settings: Settings,
    player: Arc<MockPlayer>,
    resolver: Arc<TableResolver>,
    notifier: Arc<RecordingNotifier>,
    pid: u32,
) -> AppContext {
    let session = SessionRegistrar::with_signaller(settings.session_file.clone(), pid, Box::new(LibcSignaller));
    AppContext {
        settings: Arc::new(settings),
        backend: player,
        resolver,
        notifier,
        session,
    }
}
