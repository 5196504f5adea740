use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level content domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Filmes,
    Series,
    Tv,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Filmes => write!(f, "filmes"),
            Domain::Series => write!(f, "series"),
            Domain::Tv => write!(f, "tv"),
        }
    }
}

/// One raw playlist entry as produced by the parser, before classification.
/// Transient: consumed by the classifier and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub title: String,
    pub url: String,
    pub group_raw: String,
    pub logo: String,
}

/// A movie, linear channel or series episode after classification.
/// Title is normalized (first letter of each word uppercased).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    pub title: String,
    pub url: String,
    pub logo: String,
}

/// A series with its episodes grouped by season.
/// Season keys are decimal strings ("1", "2", ...); episode lists keep
/// playlist order within a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEntry {
    pub display_name: String,
    pub logo: String,
    pub seasons: BTreeMap<String, Vec<MediaEntry>>,
}

/// The classified content tree served to the presentation layer.
///
/// Subcategory keys come from feed group metadata. Within `series`, the inner
/// map is keyed by the lowercased display name; the same key appearing under
/// different subcategories refers to the same show and must be merged
/// season-wise, never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTree {
    pub filmes: BTreeMap<String, Vec<MediaEntry>>,
    pub series: BTreeMap<String, BTreeMap<String, SeriesEntry>>,
    pub tv: BTreeMap<String, Vec<MediaEntry>>,
}

impl CatalogTree {
    pub fn is_empty(&self) -> bool {
        self.filmes.is_empty() && self.series.is_empty() && self.tv.is_empty()
    }

    /// Append a movie under a subcategory.
    pub fn push_movie(&mut self, sub: &str, entry: MediaEntry) {
        self.filmes.entry(sub.to_string()).or_default().push(entry);
    }

    /// Append a linear channel under a subcategory.
    pub fn push_channel(&mut self, sub: &str, entry: MediaEntry) {
        self.tv.entry(sub.to_string()).or_default().push(entry);
    }

    /// Upsert an episode into `series[sub][key].seasons[season]`.
    ///
    /// The series key is the lowercased display name. When the series already
    /// exists the first-seen display name and logo win; the episode is
    /// appended to the season bucket in playlist order.
    pub fn push_episode(
        &mut self,
        sub: &str,
        display_name: &str,
        season: &str,
        episode: MediaEntry,
    ) {
        let key = display_name.to_lowercase();
        let logo = episode.logo.clone();
        let series = self
            .series
            .entry(sub.to_string())
            .or_default()
            .entry(key)
            .or_insert_with(|| SeriesEntry {
                display_name: display_name.to_string(),
                logo,
                seasons: BTreeMap::new(),
            });
        series.seasons.entry(season.to_string()).or_default().push(episode);
    }

    pub fn stats(&self) -> CatalogStats {
        let movie_count = self.filmes.values().map(|v| v.len()).sum();
        let channel_count = self.tv.values().map(|v| v.len()).sum();
        let mut series_count = 0usize;
        let mut episode_count = 0usize;
        for subcat in self.series.values() {
            series_count += subcat.len();
            for series in subcat.values() {
                episode_count += series.seasons.values().map(|v| v.len()).sum::<usize>();
            }
        }
        CatalogStats {
            movie_count,
            series_count,
            episode_count,
            channel_count,
            movie_subcats: self.filmes.len(),
            series_subcats: self.series.len(),
            tv_subcats: self.tv.len(),
        }
    }
}

/// Per-domain counts for logging and the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub movie_count: usize,
    pub series_count: usize,
    pub episode_count: usize,
    pub channel_count: usize,
    pub movie_subcats: usize,
    pub series_subcats: usize,
    pub tv_subcats: usize,
}

/// The cache's stored unit: classification timestamp plus the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEnvelope {
    /// Epoch millis at save time.
    pub timestamp: i64,
    pub data: CatalogTree,
}

impl CacheEnvelope {
    pub fn new(data: CatalogTree) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            data,
        }
    }

    /// Valid only while younger than the TTL and with at least one domain
    /// populated; anything else is a cache miss for the caller.
    pub fn is_valid(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms - self.timestamp < ttl_ms && !self.data.is_empty()
    }
}
