use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::Config;
use crate::error::EngineError;

/// One candidate origin for the playlist text.
#[derive(Debug, Clone)]
pub enum FeedSource {
    Local(PathBuf),
    Remote { url: String },
}

impl FeedSource {
    pub fn label(&self) -> String {
        match self {
            FeedSource::Local(path) => path.display().to_string(),
            FeedSource::Remote { url } => url.clone(),
        }
    }
}

/// Resolves playlist text from an ordered list of candidate sources, local
/// paths first and one remote fallback last; the first success wins.
pub struct FeedLoader {
    client: Client,
    sources: Vec<FeedSource>,
    referer: String,
    max_retries: u32,
    max_size_mb: usize,
}

impl FeedLoader {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .gzip(true)
            .build()
            .context("Failed to create HTTP client")?;

        let mut sources: Vec<FeedSource> = config
            .feed_paths
            .iter()
            .map(|p| FeedSource::Local(PathBuf::from(p)))
            .collect();
        if let Some(url) = &config.feed_fallback_url {
            sources.push(FeedSource::Remote { url: url.clone() });
        }

        Ok(Self {
            client,
            sources,
            referer: config.feed_referer.clone(),
            max_retries: config.max_retries,
            max_size_mb: config.max_m3u_size_mb,
        })
    }

    /// Walk the candidates in order and return the first successfully fetched
    /// raw text together with its source label. Per-candidate failures are
    /// logged and skipped; only full exhaustion is an error.
    pub async fn load(&self) -> std::result::Result<(String, String), EngineError> {
        for source in &self.sources {
            let attempt = match source {
                FeedSource::Local(path) => self.fetch_local(path).await,
                FeedSource::Remote { url } => self.fetch_remote(url).await,
            };
            match attempt {
                Ok(content) => {
                    tracing::info!(
                        source = %source.label(),
                        bytes = content.len(),
                        "playlist carregada"
                    );
                    return Ok((content, source.label()));
                }
                Err(e) => {
                    tracing::warn!(source = %source.label(), error = %e, "fonte de playlist falhou, tentando próxima");
                }
            }
        }

        Err(EngineError::FeedUnavailable {
            attempted: self.sources.len(),
        })
    }

    async fn fetch_local(&self, path: &PathBuf) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("leitura de {}", path.display()))
    }

    async fn fetch_remote(&self, url: &str) -> Result<String> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            let result = self
                .client
                .get(url)
                .header("Accept", "text/plain,*/*")
                .header("Referer", &self.referer)
                .send()
                .await;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        if let Some(len) = resp.content_length() {
                            let max_bytes = (self.max_size_mb as u64) * 1024 * 1024;
                            if len > max_bytes {
                                bail!(
                                    "Playlist muito grande: {:.1}MB (limite {}MB)",
                                    len as f64 / 1024f64 / 1024f64,
                                    self.max_size_mb
                                );
                            }
                        }
                        return resp.text().await.context("leitura do corpo da playlist");
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                        let backoff_ms = (1u64 << attempt).saturating_mul(500).min(10_000);
                        tracing::warn!("fetch_retry" = attempt + 1, "reason" = "429", "backoff_ms" = backoff_ms);
                        sleep(Duration::from_millis(backoff_ms)).await;
                        continue;
                    }

                    let friendly: String = match status {
                        reqwest::StatusCode::NOT_FOUND => {
                            "Playlist não encontrada (404). Verifique a URL.".to_string()
                        }
                        reqwest::StatusCode::FORBIDDEN => {
                            "Acesso negado (403). A playlist pode exigir autenticação.".to_string()
                        }
                        reqwest::StatusCode::TOO_MANY_REQUESTS => {
                            "Muitas requisições (429). O servidor da playlist está limitando acessos.".to_string()
                        }
                        _ => {
                            let reason = status
                                .canonical_reason()
                                .map(|s| s.to_string())
                                .unwrap_or_else(|| "Erro".to_string());
                            format!("HTTP {}: {}", status.as_u16(), reason)
                        }
                    };

                    bail!("{}", friendly);
                }
                Err(err) => {
                    last_err = Some(err);
                    if attempt < self.max_retries {
                        let backoff_ms = (1u64 << attempt).saturating_mul(500).min(10_000);
                        tracing::warn!("fetch_retry" = attempt + 1, "reason" = "network", "backoff_ms" = backoff_ms);
                        sleep(Duration::from_millis(backoff_ms)).await;
                        continue;
                    }
                }
            }
        }

        match last_err {
            Some(e) => Err(e.into()),
            None => Err(anyhow!("Unknown fetch error")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn config_with(paths: Vec<String>, fallback: Option<String>) -> Config {
        let mut config = Config::for_tests();
        config.feed_paths = paths;
        config.feed_fallback_url = fallback;
        config
    }

    #[tokio::test]
    async fn test_first_existing_local_source_wins() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("playlist.m3u");
        let mut file = std::fs::File::create(&good).unwrap();
        writeln!(file, "#EXTM3U").unwrap();

        let config = config_with(
            vec![
                dir.path().join("missing.m3u").display().to_string(),
                good.display().to_string(),
            ],
            None,
        );
        let loader = FeedLoader::new(&config).unwrap();

        let (content, source) = loader.load().await.unwrap();
        assert!(content.starts_with("#EXTM3U"));
        assert_eq!(source, good.display().to_string());
    }

    #[tokio::test]
    async fn test_exhausted_sources_fail_with_feed_unavailable() {
        let dir = TempDir::new().unwrap();
        let config = config_with(
            vec![
                dir.path().join("a.m3u").display().to_string(),
                dir.path().join("b.m3u").display().to_string(),
            ],
            None,
        );
        let loader = FeedLoader::new(&config).unwrap();

        match loader.load().await {
            Err(EngineError::FeedUnavailable { attempted }) => assert_eq!(attempted, 2),
            other => panic!("expected FeedUnavailable, got {:?}", other.map(|(_, s)| s)),
        }
    }

    #[test]
    fn test_remote_fallback_is_ordered_last() {
        let config = config_with(
            vec!["./playlist.m3u".to_string()],
            Some("http://exemplo/get.php".to_string()),
        );
        let loader = FeedLoader::new(&config).unwrap();

        assert_eq!(loader.sources.len(), 2);
        assert!(matches!(loader.sources[0], FeedSource::Local(_)));
        assert!(matches!(loader.sources[1], FeedSource::Remote { .. }));
    }
}
