//! Application settings and configuration management

use serde::{Deserialize, Serialize};
use std::env;
use std::error::Error;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Which external player the tool drives. Chosen once at startup.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Mpv,
    Vlc,
}

impl BackendKind {
    /// Binary name used to launch the player.
    pub fn binary(&self) -> &'static str {
        match self {
            BackendKind::Mpv => "mpv",
            BackendKind::Vlc => "vlc",
        }
    }

    /// mpv when it can be found on `path` (a `PATH`-style list), VLC otherwise.
    pub fn detect(path: Option<&OsStr>) -> Self {
        let has_mpv = path
            .map(|paths| env::split_paths(paths).any(|dir| is_executable(&dir.join("mpv"))))
            .unwrap_or(false);
        if has_mpv {
            BackendKind::Mpv
        } else {
            BackendKind::Vlc
        }
    }
}

fn is_executable(candidate: &Path) -> bool {
    fs::metadata(candidate)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mpv" => Ok(BackendKind::Mpv),
            "vlc" => Ok(BackendKind::Vlc),
            other => Err(ConfigError::ValidationError(format!("Unknown player: {}", other))),
        }
    }
}

/// Preferred video codec for stream selection.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    H264,
    Av1,
    Vp9,
}

/// Poll intervals, retry bounds and timeouts used by the playback engine.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlaybackTiming {
    /// Per-call timeout for a backend command or state query
    pub command_timeout_ms: u64,
    /// Pause between the clear/replace step and the follow-up load step
    pub settle_delay_ms: u64,
    pub launch_poll_interval_ms: u64,
    pub launch_poll_attempts: u32,
    pub start_poll_interval_ms: u64,
    pub start_poll_attempts: u32,
    pub watch_poll_interval_ms: u64,
    /// Upper bound for a single link resolution
    pub resolve_timeout_secs: u64,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        PlaybackTiming {
            command_timeout_ms: 1000,
            settle_delay_ms: 100,
            launch_poll_interval_ms: 200,
            launch_poll_attempts: 20,
            start_poll_interval_ms: 500,
            start_poll_attempts: 20,
            watch_poll_interval_ms: 1500,
            resolve_timeout_secs: 60,
        }
    }
}

impl PlaybackTiming {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn launch_poll_interval(&self) -> Duration {
        Duration::from_millis(self.launch_poll_interval_ms)
    }

    pub fn start_poll_interval(&self) -> Duration {
        Duration::from_millis(self.start_poll_interval_ms)
    }

    pub fn watch_poll_interval(&self) -> Duration {
        Duration::from_millis(self.watch_poll_interval_ms)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }
}

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Player backend to drive
    #[serde(default = "default_player")]
    pub player: BackendKind,
    /// Maximum video height, or "best"
    #[serde(default = "default_resolution")]
    pub resolution: String,
    #[serde(default = "default_codec")]
    pub codec: Codec,
    /// Play a generated mix instead of the single selection
    #[serde(default)]
    pub playlist: bool,
    #[serde(default = "default_playlist_limit")]
    pub playlist_limit: usize,
    /// Number of search results to request
    #[serde(default = "default_search_count")]
    pub search_count: usize,
    #[serde(default = "default_mpv_socket_path")]
    pub mpv_socket_path: PathBuf,
    #[serde(default = "default_vlc_rc_host")]
    pub vlc_rc_host: String,
    #[serde(default = "default_vlc_rc_port")]
    pub vlc_rc_port: u16,
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    #[serde(default = "default_cookie_file")]
    pub cookie_file: PathBuf,
    #[serde(default)]
    pub timing: PlaybackTiming,
}

/// Upper bound for a single backend command, so a dead player stalls playback briefly.
pub const MAX_COMMAND_TIMEOUT_MS: u64 = 1000;

const RESOLUTIONS: &[&str] = &["2160", "1440", "1080", "720", "480", "360", "240", "144", "best"];

fn default_player() -> BackendKind {
    BackendKind::detect(env::var_os("PATH").as_deref())
}

fn default_resolution() -> String {
    "1080".to_string()
}

fn default_codec() -> Codec {
    Codec::H264
}

fn default_playlist_limit() -> usize {
    50
}

fn default_search_count() -> usize {
    30
}

fn default_mpv_socket_path() -> PathBuf {
    PathBuf::from("/tmp/rofi_tube_mpv.sock")
}

fn default_vlc_rc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_vlc_rc_port() -> u16 {
    12345
}

fn default_session_file() -> PathBuf {
    Settings::config_dir().join("r-tubeplay.pid")
}

fn default_history_file() -> PathBuf {
    Settings::config_dir().join("search-history.json")
}

fn default_cookie_file() -> PathBuf {
    Settings::config_dir().join("youtube-cookies.txt")
}

/// Error types for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(s) => write!(f, "Parse error: {}", s),
            ConfigError::ValidationError(s) => write!(f, "Validation error: {}", s),
        }
    }
}

impl Error for ConfigError {}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            player: default_player(),
            resolution: default_resolution(),
            codec: default_codec(),
            playlist: false,
            playlist_limit: default_playlist_limit(),
            search_count: default_search_count(),
            mpv_socket_path: default_mpv_socket_path(),
            vlc_rc_host: default_vlc_rc_host(),
            vlc_rc_port: default_vlc_rc_port(),
            session_file: default_session_file(),
            history_file: default_history_file(),
            cookie_file: default_cookie_file(),
            timing: PlaybackTiming::default(),
        }
    }
}

impl Settings {
    /// Load settings from a file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Directory holding the config, session, history and cookie files
    pub fn config_dir() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("r-tubeplay")
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !RESOLUTIONS.contains(&self.resolution.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Unsupported resolution '{}', expected one of {}",
                self.resolution,
                RESOLUTIONS.join(", ")
            )));
        }

        if self.playlist_limit == 0 {
            return Err(ConfigError::ValidationError("Playlist limit must be at least 1".to_string()));
        }

        if self.player == BackendKind::Vlc && self.vlc_rc_host.is_empty() {
            return Err(ConfigError::ValidationError("VLC rc host cannot be empty".to_string()));
        }

        if self.timing.command_timeout_ms == 0 {
            return Err(ConfigError::ValidationError("Command timeout cannot be zero".to_string()));
        }

        if self.timing.command_timeout_ms > MAX_COMMAND_TIMEOUT_MS {
            return Err(ConfigError::ValidationError(format!(
                "Command timeout of {} ms exceeds the {} ms limit",
                self.timing.command_timeout_ms, MAX_COMMAND_TIMEOUT_MS
            )));
        }

        Ok(())
    }
}
