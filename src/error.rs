use thiserror::Error;

/// Error taxonomy for the playlist pipeline.
///
/// Only `FeedUnavailable`, `InvalidPlaylist` and `TaskFailure` ever reach the
/// presentation layer. Per-line parse failures and per-record classification
/// failures are recovered inside the pipeline (dropped line / routed to the
/// fallback bucket), and cache failures degrade to a miss or to the
/// secondary store.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("nenhuma fonte de playlist disponível ({attempted} fontes tentadas)")]
    FeedUnavailable { attempted: usize },

    #[error("playlist inválida: {0}")]
    InvalidPlaylist(String),

    #[error("falha ao ler cache ({store})")]
    CacheRead {
        store: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("falha ao gravar cache ({store})")]
    CacheWrite {
        store: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("tarefa de processamento em background falhou: {0}")]
    TaskFailure(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
