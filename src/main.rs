use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use telaplay_engine::{Config, Domain, PlaylistEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "telaplay_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting TelaPlay engine v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(sources = config.feed_paths.len(), "Feed sources configured");

    let mut engine = PlaylistEngine::new(&config)?;
    let outcome = engine.load_feed().await?;

    tracing::info!(
        source = %outcome.source,
        from_cache = outcome.from_cache,
        movies = outcome.stats.movie_count,
        series = outcome.stats.series_count,
        episodes = outcome.stats.episode_count,
        channels = outcome.stats.channel_count,
        "Catálogo pronto"
    );

    for domain in [Domain::Filmes, Domain::Series, Domain::Tv] {
        let subcats = engine.subcategories(domain);
        tracing::info!(domain = %domain, subcategories = subcats.len(), "Domínio carregado");
    }

    Ok(())
}
