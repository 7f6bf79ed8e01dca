// src/media/search.rs
use super::error::MediaError;
use super::models::SearchResult;
use super::MEDIA_LOG_TARGET;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, instrument};

const SEARCH_URL: &str = "https://www.youtube.com/results";

/// Given a query, returns an ordered list of playable results.
#[async_trait]
pub trait ResultProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MediaError>;
}

/// Scrapes the YouTube results page.
pub struct YouTubeSearch {
    client: Client,
    count: usize,
}

impl YouTubeSearch {
    pub fn new(count: usize) -> Self {
        let client = match Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("Mozilla/5.0")
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                debug!(target: MEDIA_LOG_TARGET, "Error creating HTTP client: {:?}. Falling back to default.", e);
                Client::new()
            }
        };
        YouTubeSearch { client, count }
    }

    pub fn search_url(query: &str) -> String {
        format!("{}?search_query={}", SEARCH_URL, urlencoding::encode(query))
    }
}

fn initial_data_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)var ytInitialData = (\{.*?\});\s*</script>").expect("ytInitialData pattern is valid")
    })
}

/// Extracts up to `count` video results from a results page.
pub fn parse_results(html: &str, count: usize) -> Result<Vec<SearchResult>, MediaError> {
    let Some(captures) = initial_data_pattern().captures(html) else {
        return Err(MediaError::Parse("ytInitialData not found".to_string()));
    };
    let data: Value = serde_json::from_str(&captures[1])?;

    let sections = data
        .pointer("/contents/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer/contents")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let results = sections
        .iter()
        .filter_map(|section| section.pointer("/itemSectionRenderer/contents").and_then(Value::as_array))
        .flatten()
        .filter_map(|item| item.get("videoRenderer"))
        .filter_map(|video| {
            let id = video.get("videoId")?.as_str()?.to_string();
            let title = video
                .pointer("/title/runs/0/text")
                .and_then(Value::as_str)
                .unwrap_or("No Title")
                .to_string();
            let duration = video
                .pointer("/lengthText/simpleText")
                .and_then(Value::as_str)
                .unwrap_or("N/A")
                .to_string();
            Some(SearchResult { id, title, duration })
        })
        .take(count)
        .collect();

    Ok(results)
}

#[async_trait]
impl ResultProvider for YouTubeSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MediaError> {
        info!(target: MEDIA_LOG_TARGET, "Searching YouTube for: {}", query);
        let body = self
            .client
            .get(Self::search_url(query))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let results = parse_results(&body, self.count)?;
        info!(target: MEDIA_LOG_TARGET, "Found {} results.", results.len());
        Ok(results)
    }
}
