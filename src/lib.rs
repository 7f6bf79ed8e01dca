//! r-tubeplay library core functionality

pub mod app;
pub mod backend;
pub mod config;
pub mod media;
pub mod player;
pub mod session;
pub mod ui;

/// Initialize the application directories
pub fn init_app_dirs() -> std::io::Result<()> {
    let config_dir = config::Settings::config_dir();
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir)?;
    }
    Ok(())
}
