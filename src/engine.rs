use std::sync::Mutex;

use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::models::{CatalogStats, CatalogTree, Domain};
use crate::services::cache::TieredCache;
use crate::services::classifier;
use crate::services::debounce::NavigationDebounce;
use crate::services::feed::FeedLoader;
use crate::services::parser;
use crate::services::query::{self, QueryResult};

/// How one `load_feed` call resolved.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Label of the source the text came from, or `"cache"`.
    pub source: String,
    pub from_cache: bool,
    pub stats: CatalogStats,
}

/// The ingestion → classification → caching → query pipeline behind the
/// presentation layer.
///
/// The engine owns the loaded tree exclusively; parsing and classification
/// run on a background task that takes the raw text by move and hands the
/// finished tree back the same way, so no state is shared across the
/// boundary. Callers must serialize `load_feed` calls; there is no internal
/// queue for concurrent loads.
pub struct PlaylistEngine {
    loader: FeedLoader,
    cache: TieredCache,
    debounce: Mutex<NavigationDebounce>,
    /// Empty until the first successful `load_feed`.
    tree: CatalogTree,
}

impl PlaylistEngine {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let loader = FeedLoader::new(config)?;
        let cache = TieredCache::on_disk(
            &config.cache_dir,
            config.cache_ttl_ms,
            config.cache_size_gate_mb * 1024 * 1024,
        );
        Ok(Self {
            loader,
            cache,
            debounce: Mutex::new(NavigationDebounce::new(config.navigation_debounce_ms)),
            tree: CatalogTree::default(),
        })
    }

    /// Load the catalog: cache read-through first, otherwise fetch the feed,
    /// parse+classify it off-thread and write the result back through the
    /// cache. The cache write is fire-and-forget, display never waits on it.
    pub async fn load_feed(&mut self) -> Result<LoadOutcome> {
        if let Some(tree) = self.cache.load().await {
            let stats = tree.stats();
            tracing::info!(
                movies = stats.movie_count,
                series = stats.series_count,
                channels = stats.channel_count,
                "catálogo carregado do cache"
            );
            self.tree = tree;
            return Ok(LoadOutcome {
                source: "cache".to_string(),
                from_cache: true,
                stats,
            });
        }

        let (content, source) = self.loader.load().await?;

        // Raw text moves into the background task; the finished tree moves
        // back out. At most one parse is in flight per load.
        let tree = tokio::task::spawn_blocking(move || -> Result<CatalogTree> {
            if content.trim().is_empty() {
                return Err(EngineError::InvalidPlaylist(
                    "conteúdo vazio".to_string(),
                ));
            }
            let records = parser::parse_playlist(&content);
            if records.is_empty() {
                return Err(EngineError::InvalidPlaylist(
                    "nenhum registro reconhecido".to_string(),
                ));
            }
            Ok(classifier::classify_all(records))
        })
        .await
        .map_err(|e| EngineError::TaskFailure(e.to_string()))??;

        let stats = tree.stats();
        tracing::info!(
            source = %source,
            movies = stats.movie_count,
            series = stats.series_count,
            episodes = stats.episode_count,
            channels = stats.channel_count,
            "playlist processada"
        );

        let cache = self.cache.clone();
        let snapshot = tree.clone();
        tokio::spawn(async move {
            cache.save(&snapshot).await;
        });

        self.tree = tree;
        Ok(LoadOutcome {
            source,
            from_cache: false,
            stats,
        })
    }

    /// Sorted subcategories of a domain; empty before the first load.
    pub fn subcategories(&self, domain: Domain) -> Vec<String> {
        query::list_subcategories(&self.tree, domain)
    }

    /// Filtered view of a domain. `subcategory = "all"` spans every
    /// subcategory; the text query is a case-insensitive substring match.
    pub fn query_entries(&self, domain: Domain, subcategory: &str, text: &str) -> QueryResult {
        query::filter_entries(&self.tree, domain, subcategory, text)
    }

    /// One-based page slice at the fixed page size.
    pub fn get_page<'a, T>(&self, items: &'a [T], number: usize) -> &'a [T] {
        query::page(items, number)
    }

    /// Whether a navigation to `url` should go through right now.
    pub fn debounce_navigate(&self, url: &str) -> bool {
        let allowed = self.debounce.lock().unwrap().allow();
        if allowed {
            tracing::info!(url, "navegando");
        } else {
            tracing::warn!(url, "navegação bloqueada por debounce");
        }
        allowed
    }

    /// Per-domain counts of the currently loaded tree.
    pub fn stats(&self) -> CatalogStats {
        self.tree.stats()
    }
}
