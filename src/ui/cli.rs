//! Command-line interface definition

use clap::Parser;

use crate::config::{BackendKind, Settings};
use crate::media::PlaybackMode;

/// Command-line arguments for r-tubeplay
#[derive(Parser, Debug)]
#[command(author, version, about = "Search YouTube and play results through mpv or VLC", long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long, env = "TUBEPLAY_CONFIG")]
    pub config: Option<String>,

    /// Player to drive (mpv or vlc)
    #[arg(short = 'P', long, env = "TUBEPLAY_PLAYER")]
    pub player: Option<BackendKind>,

    /// Playback mode; asks with the picker when omitted
    #[arg(short, long, value_enum)]
    pub mode: Option<PlaybackMode>,

    /// Search query; asks with the picker when omitted
    #[arg(short, long)]
    pub query: Option<String>,

    /// Play a generated mix around the selection
    #[arg(long, conflicts_with = "no_playlist")]
    pub playlist: bool,

    /// Play only the selection, even if the config enables mixes
    #[arg(long)]
    pub no_playlist: bool,

    /// Maximum number of mix items
    #[arg(long)]
    pub playlist_limit: Option<usize>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    /// Applies command-line overrides on top of the loaded settings.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(player) = self.player {
            settings.player = player;
        }
        if self.playlist {
            settings.playlist = true;
        }
        if self.no_playlist {
            settings.playlist = false;
        }
        if let Some(limit) = self.playlist_limit {
            settings.playlist_limit = limit;
        }
    }
}
