//! IPTV playlist engine: resolves raw M3U text from ordered sources,
//! classifies each entry into filmes / series / tv with heuristic rules,
//! caches the classified tree with TTL and size tiering, and serves
//! filtered, paginated views to a presentation layer.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use engine::{LoadOutcome, PlaylistEngine};
pub use error::EngineError;
pub use models::{CacheEnvelope, CatalogStats, CatalogTree, Domain, MediaEntry, SeriesEntry};
pub use services::query::{QueryResult, ALL_SUBCATEGORIES, ITEMS_PER_PAGE};
