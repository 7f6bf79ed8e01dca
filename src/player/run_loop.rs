// src/player/run_loop.rs
use super::{AbortReason, PlaybackEvent, PlaybackSequencer, PrefetchPipeline, TraversalOutcome, TraversalPhase, PLAYER_LOG_TARGET};
use crate::media::{PlaybackItem, ResolvedLinks};
use tracing::{error, info, warn};

const NOTIFY_TITLE: &str = "YouTube";

/// Walks the playlist: AwaitingNext -> Loaded -> AwaitingStart -> Watching -> advance.
pub async fn run_traversal(
    sequencer: &PlaybackSequencer,
    items: &[PlaybackItem],
    pipeline: &mut PrefetchPipeline,
) -> TraversalOutcome {
    let total = items.len();
    let mut played = 0;
    let mut skipped = 0;

    if total == 0 {
        pipeline.finish().await;
        sequencer.broadcast(PlaybackEvent::Completed);
        return TraversalOutcome::Completed { played, skipped };
    }

    // Seed with the first item only; the loop keeps the pipeline one ahead
    submit(sequencer, pipeline, items, 0);
    let mut next_to_submit = 1;

    for index in 0..total {
        info!(target: PLAYER_LOG_TARGET, "Waiting for link processing [{}/{}]...", index + 1, total);
        let Some(resolved) = pipeline.next_result().await else {
            error!(target: PLAYER_LOG_TARGET, "Prefetch pipeline closed before item {} was resolved.", index + 1);
            return abort(sequencer, pipeline, index, AbortReason::PipelineClosed, played, skipped).await;
        };

        // Submitted before playback starts, and also when this item turns
        // out to be unplayable so the pipeline never stalls.
        if next_to_submit < total {
            submit(sequencer, pipeline, items, next_to_submit);
            next_to_submit += 1;
        }

        if !resolved.is_playable() {
            warn!(target: PLAYER_LOG_TARGET, "FAILED to get links for: {}", resolved.item.title);
            sequencer
                .notifier
                .notify(NOTIFY_TITLE, &format!("Failed to get links for: {}", resolved.item.title));
            sequencer.broadcast(PlaybackEvent::Skipped { index, item_id: resolved.item.id.clone() });
            skipped += 1;
            continue;
        }

        if let Err(reason) = play_item(sequencer, index, total, &resolved).await {
            return abort(sequencer, pipeline, index, reason, played, skipped).await;
        }
        played += 1;
    }

    let produced = pipeline.finish().await;
    info!(target: PLAYER_LOG_TARGET, "Playlist finished: {} played, {} skipped, {} resolved.", played, skipped, produced);
    sequencer.broadcast(PlaybackEvent::Completed);
    TraversalOutcome::Completed { played, skipped }
}

fn submit(sequencer: &PlaybackSequencer, pipeline: &mut PrefetchPipeline, items: &[PlaybackItem], index: usize) {
    let item = items[index].clone();
    let item_id = item.id.clone();
    if pipeline.submit(item) {
        sequencer.broadcast(PlaybackEvent::Submitted { index, item_id });
    }
}

async fn abort(
    sequencer: &PlaybackSequencer,
    pipeline: &mut PrefetchPipeline,
    at_index: usize,
    reason: AbortReason,
    played: usize,
    skipped: usize,
) -> TraversalOutcome {
    error!(target: PLAYER_LOG_TARGET, "Playlist aborted at item {}: {}", at_index + 1, reason);
    if matches!(reason, AbortReason::PlayerLost { .. }) {
        sequencer.notifier.notify(NOTIFY_TITLE, "Player closed. Playlist aborted.");
    }
    // Drops queued work and kills an in-flight resolution
    pipeline.cancel();
    sequencer.broadcast(PlaybackEvent::Aborted { index: at_index, reason });
    TraversalOutcome::Aborted { at_index, reason, played, skipped }
}

/// Loaded -> AwaitingStart -> Watching for one resolved item.
async fn play_item(
    sequencer: &PlaybackSequencer,
    index: usize,
    total: usize,
    resolved: &ResolvedLinks,
) -> Result<(), AbortReason> {
    let title = &resolved.item.title;
    sequencer.notifier.notify(NOTIFY_TITLE, &format!("Playing: {}", title));
    info!(target: PLAYER_LOG_TARGET, "PLAYING: {}", title);

    sequencer.broadcast(PlaybackEvent::Loading { index, item_id: resolved.item.id.clone() });
    let display_title = format!("[{}/{}] {}", index + 1, total, title);
    let outcome = sequencer.backend.load_and_play(&resolved.links, &display_title).await;
    if outcome.failed > 0 {
        warn!(target: PLAYER_LOG_TARGET, "{} of {} load commands failed for: {}", outcome.failed, outcome.sent + outcome.failed, title);
        if outcome.sent == 0 && !sequencer.backend.query_state().await.is_reachable() {
            return Err(AbortReason::PlayerLost { phase: TraversalPhase::Loaded });
        }
    }

    wait_for_start(sequencer, index).await?;
    watch_until_finished(sequencer, index, title).await
}

async fn wait_for_start(sequencer: &PlaybackSequencer, index: usize) -> Result<(), AbortReason> {
    info!(target: PLAYER_LOG_TARGET, "Monitor: waiting for playback to start...");
    let timing = &sequencer.timing;
    for _ in 0..timing.start_poll_attempts {
        tokio::time::sleep(timing.start_poll_interval()).await;
        let state = sequencer.backend.query_state().await;
        if !state.is_reachable() {
            return Err(AbortReason::PlayerLost { phase: TraversalPhase::AwaitingStart });
        }
        if state.has_started() {
            sequencer.broadcast(PlaybackEvent::Started { index });
            return Ok(());
        }
    }

    // Slow players are common; keep watching rather than give up
    warn!(target: PLAYER_LOG_TARGET, "Player didn't report 'Playing' state. Monitoring anyway.");
    sequencer.broadcast(PlaybackEvent::StartUnconfirmed { index });
    Ok(())
}

async fn watch_until_finished(sequencer: &PlaybackSequencer, index: usize, title: &str) -> Result<(), AbortReason> {
    info!(target: PLAYER_LOG_TARGET, "Monitor: watching {}...", title);
    loop {
        tokio::time::sleep(sequencer.timing.watch_poll_interval()).await;
        let state = sequencer.backend.query_state().await;
        if !state.is_reachable() {
            return Err(AbortReason::PlayerLost { phase: TraversalPhase::Watching });
        }
        if state.has_finished() {
            info!(target: PLAYER_LOG_TARGET, "Track finished: {}", title);
            sequencer.broadcast(PlaybackEvent::Finished { index });
            return Ok(());
        }
    }
}
