use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gear_matcher_api::{
    api::{create_router, AppState},
    config::Config,
    db::{
        create_pool, create_redis_client, BundleSource, Cache, CacheWriterHandle, CatalogStore,
        MemoryStore, PgStore, RedisCache,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let (catalog, bundles): (Arc<dyn CatalogStore>, Arc<dyn BundleSource>) =
        match (&config.database_url, &config.catalog_seed_path) {
            (Some(url), _) => {
                let store = Arc::new(PgStore::new(create_pool(url).await?));
                tracing::info!("Using PostgreSQL catalog");
                (store.clone(), store)
            }
            (None, Some(path)) => {
                let store = Arc::new(MemoryStore::from_seed_file(path)?);
                (store.clone(), store)
            }
            (None, None) => {
                tracing::warn!("No DATABASE_URL or CATALOG_SEED_PATH set, starting with an empty catalog");
                let store = Arc::new(MemoryStore::default());
                (store.clone(), store)
            }
        };

    let (cache, writer): (Cache, Option<CacheWriterHandle>) = match &config.redis_url {
        Some(url) => {
            let client = create_redis_client(url)?;
            let (redis_cache, handle) = RedisCache::new(client).await;
            tracing::info!("Using Redis rule cache");
            (Cache::new(Arc::new(redis_cache)), Some(handle))
        }
        None => {
            tracing::info!("Using in-process rule cache");
            (Cache::in_memory(), None)
        }
    };

    let state = AppState::new(catalog, bundles, cache, &config);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = writer {
        writer.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gear_matcher_api=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
