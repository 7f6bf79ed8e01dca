use std::fmt;

/// Phases in which the player is polled and can be found missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalPhase {
    /// `load_and_play` issued but nothing reached the player
    Loaded,
    AwaitingStart,
    Watching,
}

/// Why a traversal stopped before the end of the playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The player stopped answering; a crashed and a user-closed player look the same
    PlayerLost { phase: TraversalPhase },
    /// The prefetch worker exited while the next result was awaited
    PipelineClosed,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::PlayerLost { phase } => write!(f, "player lost while {:?}", phase),
            AbortReason::PipelineClosed => write!(f, "prefetch pipeline closed"),
        }
    }
}

/// Result of one playlist traversal. Neither variant is an error for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOutcome {
    Completed {
        played: usize,
        skipped: usize,
    },
    Aborted {
        at_index: usize,
        reason: AbortReason,
        played: usize,
        skipped: usize,
    },
}

impl TraversalOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TraversalOutcome::Completed { .. })
    }

    pub fn played(&self) -> usize {
        match self {
            TraversalOutcome::Completed { played, .. } | TraversalOutcome::Aborted { played, .. } => *played,
        }
    }

    pub fn skipped(&self) -> usize {
        match self {
            TraversalOutcome::Completed { skipped, .. } | TraversalOutcome::Aborted { skipped, .. } => *skipped,
        }
    }
}

/// Result of `PlayerSupervisor::ensure_running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    AlreadyRunning,
    /// Launched and the control channel came up
    Started,
    /// Launched but the control channel never answered within the bound
    AssumedReady,
    LaunchFailed,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        !matches!(self, Readiness::LaunchFailed)
    }
}

/// Progress updates broadcast by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Item at `index` was handed to the prefetch worker
    Submitted { index: usize, item_id: String },
    /// `load_and_play` is about to be issued
    Loading { index: usize, item_id: String },
    Started { index: usize },
    /// The start window passed without the player reporting playback
    StartUnconfirmed { index: usize },
    Finished { index: usize },
    /// No links were resolved; the item was not sent to the player
    Skipped { index: usize, item_id: String },
    Aborted { index: usize, reason: AbortReason },
    Completed,
}
