//! Data models shared between the media collaborators and the playback engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolvable media unit. Immutable once queued.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PlaybackItem {
    pub id: String,
    pub title: String,
}

impl PlaybackItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        PlaybackItem { id: id.into(), title: title.into() }
    }

    /// Canonical watch page for this item.
    pub fn watch_url(&self) -> String {
        watch_url(&self.id)
    }
}

pub(crate) fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

/// Stream links produced for one item by the prefetch worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLinks {
    pub item: PlaybackItem,
    /// Primary (video or combined) URL first, optional separate audio URL second
    pub links: Vec<String>,
    /// The resolver call itself completed; `links` may still be empty
    pub resolved: bool,
}

impl ResolvedLinks {
    pub fn is_playable(&self) -> bool {
        !self.links.is_empty()
    }
}

/// Which kind of stream to ask the resolver for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PlaybackMode {
    #[default]
    Video,
    Music,
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackMode::Video => f.write_str("YouTube"),
            PlaybackMode::Music => f.write_str("YT-Music"),
        }
    }
}

/// One entry of a search results page.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub duration: String,
}

impl SearchResult {
    pub fn to_item(&self) -> PlaybackItem {
        PlaybackItem::new(self.id.clone(), self.title.clone())
    }

    /// Line shown in the picker; the id is recoverable with `parse_picker_label`.
    pub fn picker_label(&self) -> String {
        format!("{} [{}] | {}", self.title, self.duration, self.id)
    }
}

/// Splits a picker line produced by `SearchResult::picker_label` back into an item.
pub fn parse_picker_label(label: &str) -> Option<PlaybackItem> {
    let (title, id) = label.rsplit_once(" | ")?;
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    Some(PlaybackItem::new(id, title.trim()))
}
