// src/backend/vlc.rs
use super::{BackendError, ControlCommand, LaunchSpec, LoadOutcome, PlayerBackend, PlayerState, BACKEND_LOG_TARGET};
use crate::config::{BackendKind, PlaybackTiming};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, instrument, trace, warn};

const MAX_STATUS_BYTES: usize = 16 * 1024;

/// VLC driven through the `rc` remote-control interface.
pub struct VlcBackend {
    host: String,
    port: u16,
    timing: PlaybackTiming,
}

impl VlcBackend {
    pub fn new(host: String, port: u16, timing: PlaybackTiming) -> Self {
        VlcBackend { host, port, timing }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connects within the call's overall deadline.
    async fn connect(&self, deadline: Instant) -> Result<TcpStream, BackendError> {
        timeout_at(deadline, TcpStream::connect((self.host.as_str(), self.port)))
            .await
            .map_err(|_| BackendError::Timeout(self.timing.command_timeout()))?
            .map_err(BackendError::Connect)
    }

    /// Fire-and-forget line command; rc does not acknowledge these.
    async fn send_line(&self, line: &str) -> Result<(), BackendError> {
        let limit = self.timing.command_timeout();
        let deadline = Instant::now() + limit;
        let mut stream = self.connect(deadline).await?;
        let io = async {
            stream.write_all(line.trim_end().as_bytes()).await?;
            stream.write_all(b"\n").await?;
            stream.flush().await?;
            stream.shutdown().await?;
            Ok::<_, BackendError>(())
        };
        timeout_at(deadline, io).await.map_err(|_| BackendError::Timeout(limit))?
    }

    /// Sends `status` and collects the reply text, welcome banner included.
    async fn status_reply(&self) -> Result<String, BackendError> {
        let limit = self.timing.command_timeout();
        let deadline = Instant::now() + limit;
        let mut stream = self.connect(deadline).await?;

        timeout_at(deadline, stream.write_all(b"status\n"))
            .await
            .map_err(|_| BackendError::Timeout(limit))??;

        let mut collected: Vec<u8> = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            match timeout_at(deadline, stream.read(&mut chunk)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => {
                    collected.extend_from_slice(&chunk[..n]);
                    if status_complete(&String::from_utf8_lossy(&collected)) || collected.len() >= MAX_STATUS_BYTES {
                        break;
                    }
                }
                Ok(Err(e)) => return Err(BackendError::Io(e)),
                Err(_) => {
                    if collected.is_empty() {
                        return Err(BackendError::Timeout(limit));
                    }
                    break;
                }
            }
        }

        Ok(String::from_utf8_lossy(&collected).to_lowercase())
    }
}

/// A status reply is complete once its `( state ... )` line has been closed.
fn status_complete(text: &str) -> bool {
    let lower = text.to_lowercase();
    match lower.find("( state ") {
        Some(start) => lower[start..].contains(')'),
        None => false,
    }
}

/// Maps the rc `status` reply to a player state.
pub(crate) fn parse_status(reply: &str) -> PlayerState {
    let reply = reply.to_lowercase();
    if reply.contains("state playing") {
        PlayerState::Playing
    } else if reply.contains("state paused") {
        PlayerState::Paused
    } else if reply.contains("state stop") {
        PlayerState::Stopped
    } else {
        PlayerState::Unknown
    }
}

/// rc splits options on whitespace and quotes, so the title must avoid both.
pub(crate) fn rc_safe_title(title: &str) -> String {
    title.replace(' ', "\u{00A0}").replace('"', "'")
}

pub(crate) fn add_command(links: &[String], title: &str) -> Option<String> {
    let primary = links.first()?;
    let mut command = format!("add {} :meta-title={}", primary, rc_safe_title(title));
    if let Some(audio) = links.get(1) {
        command.push_str(&format!(" :input-slave={}", audio));
    }
    Some(command)
}

#[async_trait]
impl PlayerBackend for VlcBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Vlc
    }

    async fn send_command(&self, command: &ControlCommand) -> Result<Option<String>, BackendError> {
        match command {
            ControlCommand::Text(line) if line.trim() == "status" => self.status_reply().await.map(Some),
            ControlCommand::Text(line) => self.send_line(line).await.map(|_| None),
            ControlCommand::Structured(args) => Err(BackendError::Unsupported(format!(
                "VLC rc does not accept structured commands: {:?}",
                args
            ))),
        }
    }

    async fn query_state(&self) -> PlayerState {
        match self.status_reply().await {
            Ok(reply) => {
                let state = parse_status(&reply);
                trace!(target: BACKEND_LOG_TARGET, "VLC status mapped to {}", state);
                state
            }
            Err(e) => {
                debug!(target: BACKEND_LOG_TARGET, "VLC status query failed: {}", e);
                PlayerState::Unreachable
            }
        }
    }

    #[instrument(skip(self, links), fields(link_count = links.len()))]
    async fn load_and_play(&self, links: &[String], title: &str) -> LoadOutcome {
        let mut outcome = LoadOutcome::default();
        let Some(add) = add_command(links, title) else {
            warn!(target: BACKEND_LOG_TARGET, "load_and_play called without links for '{}'", title);
            return outcome;
        };
        info!(target: BACKEND_LOG_TARGET, "Sending VLC command for: {}", title);

        let result = self.send_line("clear").await;
        outcome.record(&result);

        // VLC ignores an add that lands while clear is still being processed
        tokio::time::sleep(self.timing.settle_delay()).await;

        let result = self.send_line(&add).await;
        if let Err(e) = &result {
            debug!(target: BACKEND_LOG_TARGET, "VLC add failed: {}", e);
        }
        outcome.record(&result);

        outcome
    }

    fn launch_command(&self) -> LaunchSpec {
        LaunchSpec {
            program: BackendKind::Vlc.binary().to_string(),
            args: vec![
                "--one-instance".to_string(),
                "--extraintf".to_string(),
                "rc".to_string(),
                "--rc-host".to_string(),
                self.address(),
            ],
        }
    }
}
