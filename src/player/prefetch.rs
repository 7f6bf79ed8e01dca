// src/player/prefetch.rs
use super::PLAYER_LOG_TARGET;
use crate::media::{LinkResolver, PlaybackItem, PlaybackMode, ResolvedLinks};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Work queue entry for the prefetch worker.
#[derive(Debug)]
pub enum PrefetchJob {
    Resolve(PlaybackItem),
    /// Stops the worker after everything queued before it
    End,
}

/// Single background worker resolving stream links ahead of playback.
///
/// Results come out in submission order: one worker, FIFO queues on both
/// sides.
pub struct PrefetchPipeline {
    work_tx: mpsc::UnboundedSender<PrefetchJob>,
    result_rx: mpsc::UnboundedReceiver<ResolvedLinks>,
    worker: Option<JoinHandle<usize>>,
    submitted: usize,
    produced: usize,
}

impl PrefetchPipeline {
    /// Spawns the worker task on the current runtime.
    pub fn spawn(resolver: Arc<dyn LinkResolver>, mode: PlaybackMode) -> Self {
        let (work_tx, work_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(prefetch_worker(resolver, mode, work_rx, result_tx));

        PrefetchPipeline {
            work_tx,
            result_rx,
            worker: Some(worker),
            submitted: 0,
            produced: 0,
        }
    }

    /// Queues an item for resolution. False once the worker is gone.
    pub fn submit(&mut self, item: PlaybackItem) -> bool {
        match self.work_tx.send(PrefetchJob::Resolve(item)) {
            Ok(()) => {
                self.submitted += 1;
                true
            }
            Err(e) => {
                warn!(target: PLAYER_LOG_TARGET, "Prefetch worker is gone, dropping {:?}", e.0);
                false
            }
        }
    }

    /// Number of items accepted by `submit`.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Next result in submission order; `None` once the worker has exited
    /// and everything it produced has been taken.
    pub async fn next_result(&mut self) -> Option<ResolvedLinks> {
        self.result_rx.recv().await
    }

    /// Sends the end marker and waits for the worker. Returns how many
    /// results the worker produced in total.
    pub async fn finish(&mut self) -> usize {
        if let Some(worker) = self.worker.take() {
            // Err only means the worker already exited
            let _ = self.work_tx.send(PrefetchJob::End);
            match worker.await {
                Ok(produced) => self.produced = produced,
                Err(e) => error!(target: PLAYER_LOG_TARGET, "Prefetch worker failed: {}", e),
            }
        }
        self.produced
    }

    /// Stops the worker without waiting for an in-flight resolution.
    pub fn cancel(&mut self) {
        if let Some(worker) = self.worker.take() {
            debug!(target: PLAYER_LOG_TARGET, "Cancelling prefetch worker.");
            worker.abort();
        }
    }
}

impl Drop for PrefetchPipeline {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[instrument(skip_all, fields(mode = %mode))]
async fn prefetch_worker(
    resolver: Arc<dyn LinkResolver>,
    mode: PlaybackMode,
    mut work_rx: mpsc::UnboundedReceiver<PrefetchJob>,
    result_tx: mpsc::UnboundedSender<ResolvedLinks>,
) -> usize {
    info!(target: PLAYER_LOG_TARGET, "Prefetch worker started.");
    let mut produced = 0;

    while let Some(job) = work_rx.recv().await {
        let item = match job {
            PrefetchJob::Resolve(item) => item,
            PrefetchJob::End => break,
        };

        info!(target: PLAYER_LOG_TARGET, "Prefetching: {}", item.title);
        let resolved = match resolver.resolve(&item.id, mode).await {
            Ok(links) => ResolvedLinks { item, links, resolved: true },
            Err(e) => {
                warn!(target: PLAYER_LOG_TARGET, "Link resolution failed for {}: {}", item.id, e);
                ResolvedLinks { item, links: Vec::new(), resolved: false }
            }
        };

        if result_tx.send(resolved).is_err() {
            debug!(target: PLAYER_LOG_TARGET, "Result queue closed, stopping prefetch worker.");
            break;
        }
        produced += 1;
    }

    info!(target: PLAYER_LOG_TARGET, "Prefetch worker finished after {} items.", produced);
    produced
}
