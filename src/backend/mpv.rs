// src/backend/mpv.rs
use super::{BackendError, ControlCommand, LaunchSpec, LoadOutcome, PlayerBackend, PlayerState, BACKEND_LOG_TARGET};
use crate::config::{BackendKind, PlaybackTiming};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::{debug, info, instrument, trace, warn};

/// mpv driven through `--input-ipc-server`.
pub struct MpvBackend {
    socket_path: PathBuf,
    timing: PlaybackTiming,
    next_request_id: AtomicU64,
}

impl MpvBackend {
    pub fn new(socket_path: PathBuf, timing: PlaybackTiming) -> Self {
        MpvBackend {
            socket_path,
            timing,
            next_request_id: AtomicU64::new(1),
        }
    }

    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }

    /// Writes one line and, when `request_id` is set, waits for the matching reply.
    async fn exchange(&self, line: String, request_id: Option<u64>) -> Result<Option<String>, BackendError> {
        if !self.socket_path.exists() {
            return Err(BackendError::SocketMissing(self.socket_path.clone()));
        }

        let limit = self.timing.command_timeout();
        tokio::time::timeout(limit, self.exchange_unbounded(line, request_id))
            .await
            .map_err(|_| BackendError::Timeout(limit))?
    }

    async fn exchange_unbounded(&self, line: String, request_id: Option<u64>) -> Result<Option<String>, BackendError> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(BackendError::Connect)?;
        let (reader, mut writer) = stream.into_split();
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;

        let Some(id) = request_id else {
            return Ok(None);
        };

        // mpv interleaves event lines with replies on the same socket
        let mut lines = BufReader::new(reader).lines();
        while let Some(reply) = lines.next_line().await? {
            let value: Value = match serde_json::from_str(&reply) {
                Ok(value) => value,
                Err(e) => {
                    trace!(target: BACKEND_LOG_TARGET, "Ignoring unparseable mpv line: {} ({})", reply, e);
                    continue;
                }
            };
            if value.get("event").is_some() {
                continue;
            }
            if value.get("request_id").and_then(Value::as_u64) != Some(id) {
                continue;
            }
            return match value.get("error").and_then(Value::as_str) {
                None | Some("success") => Ok(Some(reply)),
                Some(err) => Err(BackendError::Rejected(err.to_string())),
            };
        }
        Err(BackendError::Closed)
    }

    /// Reads a property and returns its `data` field.
    pub async fn get_property(&self, name: &str) -> Result<Value, BackendError> {
        let reply = self
            .send_command(&ControlCommand::Structured(vec![json!("get_property"), json!(name)]))
            .await?
            .ok_or_else(|| BackendError::Protocol("missing reply".to_string()))?;
        let value: Value = serde_json::from_str(&reply)?;
        Ok(value.get("data").cloned().unwrap_or(Value::Null))
    }

    async fn command(&self, args: Vec<Value>) -> Result<Option<String>, BackendError> {
        let result = self.send_command(&ControlCommand::Structured(args)).await;
        if let Err(e) = &result {
            debug!(target: BACKEND_LOG_TARGET, "mpv command failed: {}", e);
        }
        result
    }
}

/// Maps a property result, short-circuiting on unreachable players.
fn bool_property(result: Result<Value, BackendError>) -> Result<Option<bool>, PlayerState> {
    match result {
        Ok(value) => Ok(value.as_bool()),
        Err(e) if e.is_connection_failure() => Err(PlayerState::Unreachable),
        Err(e) => {
            trace!(target: BACKEND_LOG_TARGET, "mpv property query failed: {}", e);
            Ok(None)
        }
    }
}

#[async_trait]
impl PlayerBackend for MpvBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mpv
    }

    async fn send_command(&self, command: &ControlCommand) -> Result<Option<String>, BackendError> {
        match command {
            ControlCommand::Structured(args) => {
                let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
                let mut line = serde_json::to_string(&json!({ "command": args, "request_id": id }))?;
                line.push('\n');
                self.exchange(line, Some(id)).await
            }
            ControlCommand::Text(text) => {
                let mut line = text.trim_end().to_string();
                line.push('\n');
                self.exchange(line, None).await
            }
        }
    }

    async fn query_state(&self) -> PlayerState {
        let idle = match bool_property(self.get_property("idle-active").await) {
            Ok(idle) => idle,
            Err(state) => return state,
        };
        if idle == Some(true) {
            return PlayerState::Idle;
        }

        match bool_property(self.get_property("pause").await) {
            Ok(Some(true)) => return PlayerState::Paused,
            Ok(_) => {}
            Err(state) => return state,
        }

        match bool_property(self.get_property("core-idle").await) {
            Ok(Some(false)) => PlayerState::Playing,
            Ok(_) => PlayerState::Unknown,
            Err(state) => state,
        }
    }

    #[instrument(skip(self, links), fields(link_count = links.len()))]
    async fn load_and_play(&self, links: &[String], title: &str) -> LoadOutcome {
        let mut outcome = LoadOutcome::default();
        let Some(primary) = links.first() else {
            warn!(target: BACKEND_LOG_TARGET, "load_and_play called without links for '{}'", title);
            return outcome;
        };
        info!(target: BACKEND_LOG_TARGET, "Sending load command for: {}", title);

        let result = self.command(vec![json!("loadfile"), json!(primary), json!("replace")]).await;
        outcome.record(&result);

        if let Some(audio) = links.get(1) {
            // mpv drops audio-add if it arrives before loadfile is processed
            tokio::time::sleep(self.timing.settle_delay()).await;
            let result = self.command(vec![json!("audio-add"), json!(audio)]).await;
            outcome.record(&result);
        }

        let result = self
            .command(vec![json!("set_property"), json!("force-media-title"), json!(title)])
            .await;
        outcome.record(&result);

        let result = self.command(vec![json!("set_property"), json!("pause"), json!(false)]).await;
        outcome.record(&result);

        outcome
    }

    fn launch_command(&self) -> LaunchSpec {
        LaunchSpec {
            program: BackendKind::Mpv.binary().to_string(),
            args: vec![
                "--idle=yes".to_string(),
                "--force-window=immediate".to_string(),
                format!("--input-ipc-server={}", self.socket_path.display()),
            ],
        }
    }
}
