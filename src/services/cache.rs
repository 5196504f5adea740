use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::error::EngineError;
use crate::models::{CacheEnvelope, CatalogTree};

/// A single envelope slot. The tiering decorator decides which backend a
/// given save lands in; backends only move serialized text.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self) -> Result<Option<String>>;
    async fn put(&self, payload: &str) -> Result<()>;
    fn label(&self) -> &str;
}

/// File-backed envelope store with atomic tmp-file + rename writes.
pub struct FileStore {
    path: PathBuf,
    label: String,
}

impl FileStore {
    pub fn new(path: PathBuf, label: &str) -> Self {
        Self {
            path,
            label: label.to_string(),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl CacheBackend for FileStore {
    async fn get(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context(format!("leitura de {}", self.path.display())),
        }
    }

    async fn put(&self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.tmp_path();
        let mut file = File::create(&tmp_path).await?;
        file.write_all(payload.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        // Atomic replace so readers never see a partial envelope.
        let _ = fs::remove_file(&self.path).await;
        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Tiered envelope cache: a size-gated primary store plus a higher-capacity
/// secondary store.
///
/// `save` is best-effort and never fails the caller: oversized or
/// primary-failing payloads fall to the secondary store, and a secondary
/// failure is only logged. `load` validates the envelope (TTL, non-empty
/// tree) and reports anything else as a miss.
pub struct TieredCache {
    primary: Arc<dyn CacheBackend>,
    secondary: Arc<dyn CacheBackend>,
    ttl_ms: i64,
    size_gate_bytes: usize,
}

impl TieredCache {
    pub fn new(
        primary: Arc<dyn CacheBackend>,
        secondary: Arc<dyn CacheBackend>,
        ttl_ms: i64,
        size_gate_bytes: usize,
    ) -> Self {
        Self {
            primary,
            secondary,
            ttl_ms,
            size_gate_bytes,
        }
    }

    /// File-backed tiers under `cache_dir`: `catalog.json` as the primary
    /// store and `overflow/catalog.json` as the secondary one.
    pub fn on_disk(cache_dir: &str, ttl_ms: i64, size_gate_bytes: usize) -> Self {
        let dir = PathBuf::from(cache_dir);
        Self::new(
            Arc::new(FileStore::new(dir.join("catalog.json"), "primary")),
            Arc::new(FileStore::new(
                dir.join("overflow").join("catalog.json"),
                "secondary",
            )),
            ttl_ms,
            size_gate_bytes,
        )
    }

    /// Read-through load. Returns the cached tree only when some store holds
    /// an envelope younger than the TTL with at least one non-empty domain;
    /// read or decode failures degrade to a miss.
    pub async fn load(&self) -> Option<CatalogTree> {
        let now = chrono::Utc::now().timestamp_millis();

        for store in [&self.primary, &self.secondary] {
            let payload = match store.get().await {
                Ok(Some(payload)) => payload,
                Ok(None) => continue,
                Err(e) => {
                    let err = EngineError::CacheRead {
                        store: store.label().to_string(),
                        source: e,
                    };
                    tracing::warn!(error = %err, "tratando como miss");
                    continue;
                }
            };

            let envelope: CacheEnvelope = match serde_json::from_str(&payload) {
                Ok(env) => env,
                Err(e) => {
                    tracing::warn!(store = store.label(), error = %e, "envelope de cache corrompido, tratando como miss");
                    continue;
                }
            };

            if envelope.is_valid(now, self.ttl_ms) {
                tracing::info!(
                    store = store.label(),
                    age_ms = now - envelope.timestamp,
                    "cache válido carregado"
                );
                return Some(envelope.data);
            }
            tracing::info!(store = store.label(), "cache expirado ou vazio, reprocessando");
        }

        None
    }

    /// Write-through save. Serializes a fresh envelope; payloads at or above
    /// the size gate skip straight to the secondary store, as does a failed
    /// primary write. Never raises: caching must not block display of
    /// already-computed results.
    pub async fn save(&self, tree: &CatalogTree) {
        let envelope = CacheEnvelope::new(tree.clone());
        let payload = match serde_json::to_string(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "falha ao serializar envelope de cache");
                return;
            }
        };

        if payload.len() >= self.size_gate_bytes {
            tracing::warn!(
                bytes = payload.len(),
                gate = self.size_gate_bytes,
                "envelope acima do limite do store primário, usando secundário"
            );
            self.put_secondary(&payload).await;
            return;
        }

        if let Err(e) = self.primary.put(&payload).await {
            let err = EngineError::CacheWrite {
                store: self.primary.label().to_string(),
                source: e,
            };
            tracing::warn!(error = %err, "usando store secundário");
            self.put_secondary(&payload).await;
            return;
        }
        tracing::info!(store = self.primary.label(), bytes = payload.len(), "cache salvo");
    }

    async fn put_secondary(&self, payload: &str) {
        match self.secondary.put(payload).await {
            Ok(()) => {
                tracing::info!(store = self.secondary.label(), bytes = payload.len(), "cache salvo")
            }
            Err(e) => {
                let err = EngineError::CacheWrite {
                    store: self.secondary.label().to_string(),
                    source: e,
                };
                tracing::error!(error = %err, "cache ignorado")
            }
        }
    }
}

impl Clone for TieredCache {
    fn clone(&self) -> Self {
        Self {
            primary: Arc::clone(&self.primary),
            secondary: Arc::clone(&self.secondary),
            ttl_ms: self.ttl_ms,
            size_gate_bytes: self.size_gate_bytes,
        }
    }
}
