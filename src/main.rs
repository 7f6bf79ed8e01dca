use clap::Parser;
use r_tubeplay::app::{play_single, run_playlist, AppContext};
use r_tubeplay::config::Settings;
use r_tubeplay::init_app_dirs;
use r_tubeplay::media::{
    ensure_cookie_file, parse_picker_label, HistoryStore, PlaybackMode, ResultProvider, YouTubeSearch, YtDlpMix,
};
use r_tubeplay::ui::{Args, Picker, RofiPicker};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const MAIN_LOG_TARGET: &str = "r_tubeplay::main";

fn init_logging(json: bool) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

async fn choose_mode(args: &Args, picker: &dyn Picker) -> Option<PlaybackMode> {
    if let Some(mode) = args.mode {
        return Some(mode);
    }
    let choices = [PlaybackMode::Video, PlaybackMode::Music];
    let entries: Vec<String> = choices.iter().map(ToString::to_string).collect();
    let picked = picker.pick("Select Mode", &entries, None).await?;
    choices.into_iter().find(|mode| mode.to_string() == picked)
}

async fn choose_query(args: &Args, picker: &dyn Picker, history: &HistoryStore, mode: PlaybackMode) -> Option<String> {
    if let Some(query) = &args.query {
        return Some(query.clone());
    }
    let prompt = format!("Search {}", mode);
    let query = picker.pick(&prompt, &history.recent_queries(), None).await?;
    let query = query.trim().to_string();
    (!query.is_empty()).then_some(query)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log_json)?;

    // Initialize application directories
    init_app_dirs()?;

    let config_path = match &args.config {
        Some(path) => PathBuf::from(path),
        None => Settings::default_path(),
    };
    if !config_path.exists() {
        info!(target: MAIN_LOG_TARGET, "Writing default settings to {}", config_path.display());
        Settings::default().save(&config_path)?;
    }

    let mut settings = Settings::load(&config_path)?;
    args.apply_to(&mut settings);
    settings.validate()?;
    let settings = Arc::new(settings);

    if let Err(e) = ensure_cookie_file(&settings.cookie_file) {
        warn!(target: MAIN_LOG_TARGET, "Could not create cookie file {}: {}", settings.cookie_file.display(), e);
    }

    let picker = RofiPicker::default();
    let Some(mode) = choose_mode(&args, &picker).await else {
        info!(target: MAIN_LOG_TARGET, "No mode selected, exiting.");
        return Ok(());
    };

    let mut history = HistoryStore::load(&settings.history_file);
    let Some(query) = choose_query(&args, &picker, &history, mode).await else {
        info!(target: MAIN_LOG_TARGET, "No query entered, exiting.");
        return Ok(());
    };

    info!(target: MAIN_LOG_TARGET, "Searching {} for: {}", mode, query);
    let search = YouTubeSearch::new(settings.search_count);
    let results = match search.search(&query).await {
        Ok(results) => results,
        Err(e) => {
            error!(target: MAIN_LOG_TARGET, "Search failed: {}", e);
            return Ok(());
        }
    };
    if results.is_empty() {
        warn!(target: MAIN_LOG_TARGET, "No results for: {}", query);
        return Ok(());
    }

    let labels: Vec<String> = results.iter().map(|r| r.picker_label()).collect();
    let selection = picker.pick("Select Video", &labels, Some(&query)).await;
    let Some(item) = selection.as_deref().and_then(parse_picker_label) else {
        info!(target: MAIN_LOG_TARGET, "Nothing selected, exiting.");
        return Ok(());
    };

    history.record(&query, &item.id);
    if let Err(e) = history.save() {
        warn!(target: MAIN_LOG_TARGET, "Could not save search history: {}", e);
    }

    let ctx = AppContext::from_settings(settings.clone());
    if settings.playlist {
        let items = YtDlpMix::new(&settings).generate(&item).await;
        let outcome = run_playlist(&ctx, &items, mode).await;
        info!(
            target: MAIN_LOG_TARGET,
            "Done: {} played, {} skipped, completed: {}",
            outcome.played(),
            outcome.skipped(),
            outcome.is_completed()
        );
    } else if !play_single(&ctx, &item, mode).await {
        warn!(target: MAIN_LOG_TARGET, "Could not start playback of {}", item.id);
    }

    Ok(())
}
