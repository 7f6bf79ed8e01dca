// src/media/resolver.rs
use super::error::MediaError;
use super::models::{watch_url, PlaybackMode};
use super::MEDIA_LOG_TARGET;
use crate::config::{Codec, Settings};
use async_trait::async_trait;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const COOKIE_HEADER: &str = "# Netscape HTTP Cookie File\n";

/// Turns an item id into ranked stream URLs.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    /// Primary URL first, optional separate audio URL second. An empty list
    /// means nothing playable was found.
    async fn resolve(&self, item_id: &str, mode: PlaybackMode) -> Result<Vec<String>, MediaError>;
}

/// Resolves links by running `yt-dlp -g`.
pub struct YtDlpResolver {
    program: String,
    cookie_file: PathBuf,
    resolution: String,
    codec: Codec,
    timeout: Duration,
}

impl YtDlpResolver {
    pub fn new(settings: &Settings) -> Self {
        YtDlpResolver {
            program: "yt-dlp".to_string(),
            cookie_file: settings.cookie_file.clone(),
            resolution: settings.resolution.clone(),
            codec: settings.codec,
            timeout: settings.timing.resolve_timeout(),
        }
    }

    /// Overrides the executable, mainly for tests.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn format_selector(&self, mode: PlaybackMode) -> String {
        format_selector(mode, &self.resolution, self.codec)
    }
}

fn codec_filter(codec: Codec) -> &'static str {
    match codec {
        Codec::H264 => "[vcodec^=avc1]",
        Codec::Av1 => "[vcodec^=av01]",
        Codec::Vp9 => "[vcodec^=vp9]",
    }
}

/// yt-dlp `-f` expression for the given mode and quality cap.
pub fn format_selector(mode: PlaybackMode, resolution: &str, codec: Codec) -> String {
    if mode == PlaybackMode::Music {
        return "bestaudio/best".to_string();
    }
    let codec = codec_filter(codec);
    if resolution == "best" {
        format!("bestvideo{codec}+bestaudio/best")
    } else {
        format!("bestvideo[height<={resolution}]{codec}+bestaudio/best[height<={resolution}]{codec}/best")
    }
}

/// Keeps the first two output lines that are URLs.
pub fn parse_links(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| url::Url::parse(line).is_ok())
        .take(2)
        .map(str::to_string)
        .collect()
}

/// Creates an empty Netscape cookie jar if none exists yet.
pub fn ensure_cookie_file(path: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, COOKIE_HEADER)?;
    info!(target: MEDIA_LOG_TARGET, "Cookie file not found. Created at: {}", path.display());
    Ok(true)
}

#[async_trait]
impl LinkResolver for YtDlpResolver {
    #[instrument(skip(self), fields(program = %self.program))]
    async fn resolve(&self, item_id: &str, mode: PlaybackMode) -> Result<Vec<String>, MediaError> {
        info!(target: MEDIA_LOG_TARGET, "Resolving links for ID: {} ({})", item_id, mode);
        let mut command = tokio::process::Command::new(&self.program);
        command
            .arg("-g")
            .arg("--cookies")
            .arg(&self.cookie_file)
            .arg("-f")
            .arg(self.format_selector(mode))
            .arg(watch_url(item_id))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| MediaError::Timeout(self.timeout))??;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let links = parse_links(&stdout);
        if !output.status.success() && links.is_empty() {
            return Err(MediaError::Process(format!("{} exited with {}", self.program, output.status)));
        }
        if links.is_empty() {
            warn!(target: MEDIA_LOG_TARGET, "No links returned for: {}", item_id);
        } else {
            debug!(target: MEDIA_LOG_TARGET, "Links acquired for: {} ({} urls)", item_id, links.len());
        }
        Ok(links)
    }
}
