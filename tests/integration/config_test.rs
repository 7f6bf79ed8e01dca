//! Integration tests for configuration management
//!
//! These tests verify that the configuration system works correctly
//! across module boundaries.

use clap::Parser;
use r_tubeplay::config::{BackendKind, Codec, Settings};
use r_tubeplay::media::resolver::format_selector;
use r_tubeplay::media::PlaybackMode;
use r_tubeplay::ui::Args;
use std::error::Error;
use tempfile::tempdir;

#[cfg(test)]
mod config_integration_tests {
    use super::*;

    /// Test complete configuration workflow
    #[test]
    fn test_config_lifecycle() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");

        let mut settings = Settings::default();
        settings.player = BackendKind::Vlc;
        settings.resolution = "720".to_string();
        settings.codec = Codec::Vp9;
        settings.vlc_rc_port = 23456;
        settings.timing.watch_poll_interval_ms = 250;

        settings.validate()?;
        settings.save(&config_path)?;

        let loaded = Settings::load(&config_path)?;
        assert_eq!(loaded.player, BackendKind::Vlc);
        assert_eq!(loaded.resolution, "720");
        assert_eq!(loaded.codec, Codec::Vp9);
        assert_eq!(loaded.vlc_rc_port, 23456);
        assert_eq!(loaded.timing.watch_poll_interval_ms, 250);

        let mut updated = loaded;
        updated.playlist = true;
        updated.save(&config_path)?;
        assert!(Settings::load(&config_path)?.playlist);

        Ok(())
    }

    /// Command-line flags win over the file
    #[test]
    fn test_cli_overrides_loaded_settings() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");
        let mut settings = Settings::default();
        settings.playlist = true;
        settings.save(&config_path)?;

        let args = Args::try_parse_from(["r-tubeplay", "--player", "vlc", "--no-playlist", "--playlist-limit", "7"])?;
        let mut loaded = Settings::load(&config_path)?;
        args.apply_to(&mut loaded);

        assert_eq!(loaded.player, BackendKind::Vlc);
        assert!(!loaded.playlist);
        assert_eq!(loaded.playlist_limit, 7);
        loaded.validate()?;
        Ok(())
    }

    /// Settings flow into the resolver's format selection
    #[test]
    fn test_resolution_and_codec_shape_format() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"resolution": "480", "codec": "av1"}"#)?;

        let settings = Settings::load(&config_path)?;
        settings.validate()?;
        assert_eq!(
            format_selector(PlaybackMode::Video, &settings.resolution, settings.codec),
            "bestvideo[height<=480][vcodec^=av01]+bestaudio/best[height<=480][vcodec^=av01]/best"
        );
        assert_eq!(format_selector(PlaybackMode::Music, &settings.resolution, settings.codec), "bestaudio/best");
        Ok(())
    }

    /// Test invalid configuration handling
    #[test]
    fn test_invalid_config_validation() {
        let mut settings = Settings::default();
        settings.resolution = "999".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.playlist_limit = 0;
        assert!(settings.validate().is_err());
    }
}
