//! Media collaborators: link resolution, search, mix generation and history

mod error;
pub mod history;
pub mod mix;
pub mod models;
pub mod resolver;
pub mod search;

pub use error::MediaError;
pub use history::HistoryStore;
pub use mix::YtDlpMix;
pub use models::*;
pub use resolver::{ensure_cookie_file, LinkResolver, YtDlpResolver};
pub use search::{ResultProvider, YouTubeSearch};

const MEDIA_LOG_TARGET: &str = "r_tubeplay::media";
