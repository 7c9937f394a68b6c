use std::sync::Arc;

use backend::{ws, Dispatcher, MemoryStore, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env()?;

    let store = Arc::new(MemoryStore::new());
    let dispatcher = Arc::new(Dispatcher::new(store.clone(), store.clone(), store));
    let app = ws::router(dispatcher, config.keepalive);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Live match server listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
