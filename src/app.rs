//! Entry points tying the session, supervisor, pipeline and sequencer together

use crate::backend::{create_backend, PlayerBackend};
use crate::config::Settings;
use crate::media::{LinkResolver, PlaybackItem, PlaybackMode, YtDlpResolver};
use crate::player::{PlaybackSequencer, PlayerSupervisor, PrefetchPipeline, TraversalOutcome};
use crate::session::SessionRegistrar;
use crate::ui::{DesktopNotifier, Notifier};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const APP_LOG_TARGET: &str = "r_tubeplay::app";

/// Collaborators shared by the playback entry points.
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub backend: Arc<dyn PlayerBackend>,
    pub resolver: Arc<dyn LinkResolver>,
    pub notifier: Arc<dyn Notifier>,
    pub session: SessionRegistrar,
}

impl AppContext {
    /// Production wiring: configured backend, yt-dlp resolver, desktop notifications.
    pub fn from_settings(settings: Arc<Settings>) -> Self {
        AppContext {
            backend: create_backend(&settings),
            resolver: Arc::new(YtDlpResolver::new(&settings)),
            notifier: Arc::new(DesktopNotifier::default()),
            session: SessionRegistrar::new(settings.session_file.clone()),
            settings,
        }
    }

    fn supervisor(&self) -> PlayerSupervisor {
        PlayerSupervisor::new(self.backend.clone(), self.settings.timing.clone())
    }
}

/// Plays `items` in order on the configured player, resolving one item ahead.
#[instrument(skip_all, fields(items = items.len(), mode = %mode))]
pub async fn run_playlist(ctx: &AppContext, items: &[PlaybackItem], mode: PlaybackMode) -> TraversalOutcome {
    if items.is_empty() {
        info!(target: APP_LOG_TARGET, "Nothing to play.");
        return TraversalOutcome::Completed { played: 0, skipped: 0 };
    }

    ctx.session.acquire();
    let readiness = ctx.supervisor().ensure_running().await;
    info!(target: APP_LOG_TARGET, "Player readiness: {:?}", readiness);

    let sequencer = PlaybackSequencer::new(ctx.backend.clone(), ctx.notifier.clone(), ctx.settings.timing.clone());
    let mut pipeline = PrefetchPipeline::spawn(ctx.resolver.clone(), mode);
    let outcome = sequencer.run(items, &mut pipeline).await;

    ctx.session.release();
    info!(target: APP_LOG_TARGET, "Traversal ended: {:?}", outcome);
    outcome
}

/// Loads a single item without watching it to completion. False when
/// nothing was sent to the player.
#[instrument(skip_all, fields(item = %item.id, mode = %mode))]
pub async fn play_single(ctx: &AppContext, item: &PlaybackItem, mode: PlaybackMode) -> bool {
    ctx.session.acquire();
    ctx.supervisor().ensure_running().await;
    ctx.notifier.notify(&mode.to_string(), &format!("Opening: {}", item.title));

    let links = match ctx.resolver.resolve(&item.id, mode).await {
        Ok(links) => links,
        Err(e) => {
            warn!(target: APP_LOG_TARGET, "Link resolution failed for {}: {}", item.id, e);
            Vec::new()
        }
    };

    let loaded = if links.is_empty() {
        ctx.notifier.notify(&mode.to_string(), &format!("Failed to get links for: {}", item.title));
        false
    } else {
        ctx.backend.load_and_play(&links, &item.title).await.sent > 0
    };

    ctx.session.release();
    loaded
}
