//! Playback engine: player supervision, link prefetching and the sequencer
//! that walks a playlist on the external player.

use crate::backend::PlayerBackend;
use crate::config::PlaybackTiming;
use crate::media::PlaybackItem;
use crate::ui::Notifier;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, instrument, trace};

mod prefetch;
mod run_loop;
mod state;
mod supervisor;

pub use prefetch::{PrefetchJob, PrefetchPipeline};
pub use state::{AbortReason, PlaybackEvent, Readiness, TraversalOutcome, TraversalPhase};
pub use supervisor::PlayerSupervisor;

const PLAYER_LOG_TARGET: &str = "r_tubeplay::player";
const EVENT_CAPACITY: usize = 64;

/// Drives the player through a playlist, one item at a time.
pub struct PlaybackSequencer {
    backend: Arc<dyn PlayerBackend>,
    notifier: Arc<dyn Notifier>,
    timing: PlaybackTiming,
    event_tx: broadcast::Sender<PlaybackEvent>,
}

impl PlaybackSequencer {
    pub fn new(backend: Arc<dyn PlayerBackend>, notifier: Arc<dyn Notifier>, timing: PlaybackTiming) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        PlaybackSequencer {
            backend,
            notifier,
            timing,
            event_tx,
        }
    }

    /// Subscribes to progress events of subsequent traversals.
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.event_tx.subscribe()
    }

    fn broadcast(&self, event: PlaybackEvent) {
        trace!(target: PLAYER_LOG_TARGET, "Broadcasting playback event: {:?}", event);
        if self.event_tx.send(event).is_err() {
            // No subscribers is the normal case outside of tests
            debug!(target: PLAYER_LOG_TARGET, "No listeners for playback event.");
        }
    }

    /// Plays `items` in order, keeping `pipeline` one item ahead. The
    /// pipeline is finished (or cancelled on abort) before returning.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn run(&self, items: &[PlaybackItem], pipeline: &mut PrefetchPipeline) -> TraversalOutcome {
        run_loop::run_traversal(self, items, pipeline).await
    }
}
