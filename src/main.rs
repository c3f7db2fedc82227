//! wikiapi server binary.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wikiapi::articles;
use wikiapi::config::{AppConfig, LogFormat};
use wikiapi::store::open_store;
use wikiapi::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    init_tracing(&config);

    let store_config = config.store.to_runtime();
    let store = open_store(&store_config)
        .with_context(|| format!("failed to open article store ({store_config:?})"))?;
    tracing::info!(?store_config, "article store ready");

    let addr = config.listen_addr();
    let server = Server::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    let served = server.serve(articles::routes(store.clone())).await;

    // Close the store even if serving failed, then report whichever error
    // came first.
    let closed = store.close().await;
    served.context("server error")?;
    closed.context("failed to close article store")?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("wikiapi=info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }
}
