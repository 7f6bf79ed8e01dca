// src/player/supervisor.rs
use super::{Readiness, PLAYER_LOG_TARGET};
use crate::backend::PlayerBackend;
use crate::config::PlaybackTiming;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Makes sure the player process is up before any command is issued.
pub struct PlayerSupervisor {
    backend: Arc<dyn PlayerBackend>,
    timing: PlaybackTiming,
}

impl PlayerSupervisor {
    pub fn new(backend: Arc<dyn PlayerBackend>, timing: PlaybackTiming) -> Self {
        PlayerSupervisor { backend, timing }
    }

    /// Never restarts a reachable player. After launching, gives up waiting
    /// once the poll bound is reached and assumes the player is ready.
    #[instrument(skip(self), fields(backend = %self.backend.kind()))]
    pub async fn ensure_running(&self) -> Readiness {
        if self.backend.query_state().await.is_reachable() {
            info!(target: PLAYER_LOG_TARGET, "{} is already running.", self.backend.kind());
            return Readiness::AlreadyRunning;
        }

        let spec = self.backend.launch_command();
        info!(target: PLAYER_LOG_TARGET, "Starting {}...", spec.program);
        // The child is not awaited; the player outlives this process.
        if let Err(e) = spec.command().spawn() {
            error!(target: PLAYER_LOG_TARGET, "Failed to launch {}: {}", spec.program, e);
            return Readiness::LaunchFailed;
        }

        let started_at = Instant::now();
        for _ in 0..self.timing.launch_poll_attempts {
            tokio::time::sleep(self.timing.launch_poll_interval()).await;
            if self.backend.query_state().await.is_reachable() {
                info!(target: PLAYER_LOG_TARGET, "{} control channel ready after {:?}", spec.program, started_at.elapsed());
                return Readiness::Started;
            }
        }

        warn!(
            target: PLAYER_LOG_TARGET,
            "{} control channel not reachable after {:?}; continuing anyway",
            spec.program,
            started_at.elapsed()
        );
        Readiness::AssumedReady
    }
}
