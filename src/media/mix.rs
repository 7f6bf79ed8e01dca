// src/media/mix.rs
use super::error::MediaError;
use super::models::PlaybackItem;
use super::MEDIA_LOG_TARGET;
use crate::config::Settings;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

const SEPARATOR: &str = "<SEP>";

/// Builds a radio-style mix playlist around a seed video with yt-dlp.
pub struct YtDlpMix {
    program: String,
    cookie_file: PathBuf,
    limit: usize,
    timeout: Duration,
}

impl YtDlpMix {
    pub fn new(settings: &Settings) -> Self {
        YtDlpMix {
            program: "yt-dlp".to_string(),
            cookie_file: settings.cookie_file.clone(),
            limit: settings.playlist_limit,
            timeout: settings.timing.resolve_timeout(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn mix_url(seed_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={0}&list=RD{0}", seed_id)
    }

    async fn fetch(&self, seed: &PlaybackItem) -> Result<Vec<PlaybackItem>, MediaError> {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .arg("--flat-playlist")
            .arg("--print")
            .arg(format!("%(id)s{}%(title)s", SEPARATOR))
            .arg("--playlist-end")
            .arg(self.limit.to_string())
            .arg("--cookies")
            .arg(&self.cookie_file)
            .arg(Self::mix_url(&seed.id))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| MediaError::Timeout(self.timeout))??;
        if !output.status.success() {
            return Err(MediaError::Process(format!("{} exited with {}", self.program, output.status)));
        }
        Ok(parse_flat_playlist(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Mix items in playlist order. Falls back to just the seed when the mix
    /// cannot be generated.
    #[instrument(skip(self), fields(seed = %seed.id, limit = self.limit))]
    pub async fn generate(&self, seed: &PlaybackItem) -> Vec<PlaybackItem> {
        info!(target: MEDIA_LOG_TARGET, "Fetching playlist data for ID: {}...", seed.id);
        match self.fetch(seed).await {
            Ok(items) if !items.is_empty() => {
                info!(target: MEDIA_LOG_TARGET, "Playlist generated with {} items.", items.len());
                items
            }
            Ok(_) => {
                warn!(target: MEDIA_LOG_TARGET, "Mix for {} came back empty, playing the seed only.", seed.id);
                vec![seed.clone()]
            }
            Err(e) => {
                error!(target: MEDIA_LOG_TARGET, "Failed to fetch playlist data: {}", e);
                vec![seed.clone()]
            }
        }
    }
}

/// Parses `id<SEP>title` lines, dropping repeated ids.
pub fn parse_flat_playlist(stdout: &str) -> Vec<PlaybackItem> {
    let mut seen = HashSet::new();
    stdout
        .lines()
        .filter_map(|line| line.split_once(SEPARATOR))
        .map(|(id, title)| (id.trim(), title.trim()))
        .filter(|(id, _)| !id.is_empty() && seen.insert(id.to_string()))
        .map(|(id, title)| PlaybackItem::new(id, title))
        .collect()
}
