//! Integration tests for playlist traversal through the public entry points
//!
//! Player and resolver are scripted; the session file lives in a tempdir.

use crate::test_utils::{context, items, settings_in, MockPlayer, RecordingNotifier, TableResolver};
use r_tubeplay::app::{play_single, run_playlist};
use r_tubeplay::backend::PlayerState;
use r_tubeplay::media::{PlaybackItem, PlaybackMode};
use r_tubeplay::player::{AbortReason, TraversalOutcome, TraversalPhase};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

#[cfg(test)]
mod playback_integration_tests {
    use super::*;

    /// A plays and finishes, B has no links and is skipped.
    #[tokio::test]
    async fn test_playlist_with_unplayable_tail() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        let session_file = settings.session_file.clone();
        let player = Arc::new(MockPlayer::new(&[PlayerState::Idle, PlayerState::Playing, PlayerState::Idle], PlayerState::Idle));
        let resolver = Arc::new(TableResolver::default().with("a", &["urlA"]).with("b", &[]));
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = context(settings, player.clone(), resolver.clone(), notifier.clone(), 999_999);

        let outcome = run_playlist(&ctx, &items(&["a", "b"]), PlaybackMode::Video).await;

        assert_eq!(outcome, TraversalOutcome::Completed { played: 1, skipped: 1 });
        assert_eq!(player.loads(), vec![(vec!["urlA".to_string()], "[1/2] Track a".to_string())]);
        assert_eq!(resolver.calls(), vec!["a", "b"]);
        assert!(notifier.bodies().contains(&"Playing: Track a".to_string()));
        assert!(notifier.bodies().contains(&"Failed to get links for: Track b".to_string()));
        // Released on the way out
        assert!(!session_file.exists());
    }

    #[tokio::test]
    async fn test_playlist_aborts_when_player_disappears() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        let session_file = settings.session_file.clone();
        // Reachable for the supervisor check and the start phase, then gone
        let player = Arc::new(MockPlayer::new(
            &[PlayerState::Idle, PlayerState::Playing],
            PlayerState::Unreachable,
        ));
        let resolver = Arc::new(
            TableResolver::default()
                .with("a", &["urlA"])
                .with("b", &["urlB"])
                .with("c", &["urlC"]),
        );
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = context(settings, player.clone(), resolver.clone(), notifier, 999_998);

        let outcome = run_playlist(&ctx, &items(&["a", "b", "c"]), PlaybackMode::Music).await;

        assert_eq!(
            outcome,
            TraversalOutcome::Aborted {
                at_index: 0,
                reason: AbortReason::PlayerLost { phase: TraversalPhase::Watching },
                played: 0,
                skipped: 0,
            }
        );
        assert_eq!(player.loads().len(), 1);
        assert!(!resolver.calls().contains(&"c".to_string()));
        assert!(!session_file.exists());
    }

    #[tokio::test]
    async fn test_empty_playlist_leaves_session_untouched() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        let session_file = settings.session_file.clone();
        let player = Arc::new(MockPlayer::new(&[], PlayerState::Unreachable));
        let ctx = context(
            settings,
            player.clone(),
            Arc::new(TableResolver::default()),
            Arc::new(RecordingNotifier::default()),
            999_997,
        );

        let outcome = run_playlist(&ctx, &[], PlaybackMode::Video).await;

        assert_eq!(outcome, TraversalOutcome::Completed { played: 0, skipped: 0 });
        assert!(player.loads().is_empty());
        assert!(!session_file.exists());
    }

    #[tokio::test]
    async fn test_session_file_of_newer_holder_is_kept() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        let session_file = settings.session_file.clone();
        let player = Arc::new(MockPlayer::new(&[], PlayerState::Idle));
        let resolver = Arc::new(TableResolver::default().with("a", &["urlA"]));
        let ctx = context(settings, player, resolver, Arc::new(RecordingNotifier::default()), 999_996);

        ctx.session.acquire();
        // A newer session took over while we were playing
        fs::write(&session_file, "12345").unwrap();
        assert!(!ctx.session.release());
        assert_eq!(fs::read_to_string(&session_file).unwrap(), "12345");
    }

    #[tokio::test]
    async fn test_play_single_loads_without_watching() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        // Would abort a traversal, but single mode never watches
        let player = Arc::new(MockPlayer::new(&[PlayerState::Idle], PlayerState::Unreachable));
        let resolver = Arc::new(TableResolver::default().with("solo", &["video", "audio"]));
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = context(settings, player.clone(), resolver, notifier.clone(), 999_995);

        let item = PlaybackItem::new("solo", "Solo Track");
        assert!(play_single(&ctx, &item, PlaybackMode::Video).await);

        assert_eq!(
            player.loads(),
            vec![(vec!["video".to_string(), "audio".to_string()], "Solo Track".to_string())]
        );
        assert_eq!(notifier.bodies().first().map(String::as_str), Some("Opening: Solo Track"));
    }

    #[tokio::test]
    async fn test_play_single_reports_missing_links() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        let player = Arc::new(MockPlayer::new(&[], PlayerState::Idle));
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = context(settings, player.clone(), Arc::new(TableResolver::default()), notifier.clone(), 999_994);

        let item = PlaybackItem::new("missing", "Missing Track");
        assert!(!play_single(&ctx, &item, PlaybackMode::Music).await);
        assert!(player.loads().is_empty());
        assert!(notifier.bodies().contains(&"Failed to get links for: Missing Track".to_string()));
    }
}
