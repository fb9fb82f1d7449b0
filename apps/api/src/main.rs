mod ai;
mod analyze;
mod builder;
mod config;
mod errors;
mod export;
mod models;
mod platform;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::builder::persist::{FileDraftStore, SAVE_DEBOUNCE};
use crate::builder::store::BuilderStore;
use crate::config::Config;
use crate::export::raster::BlockRasterizer;
use crate::platform::remote::RemoteClient;
use crate::routes::build_router;
use crate::state::{AppState, InFlightFlags};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvstudio API v{}", env!("CARGO_PKG_VERSION"));

    // One HTTP client backs every platform capability
    let remote = Arc::new(RemoteClient::new(
        config.platform_base_url.clone(),
        config.platform_api_key.clone(),
    ));
    info!("Platform client initialized ({})", config.platform_base_url);

    // Builder wizard store, rehydrated from the local draft record
    let draft_store = Arc::new(FileDraftStore::new(&config.draft_path));
    let builder = Arc::new(BuilderStore::open(draft_store, SAVE_DEBOUNCE).await);
    info!("Builder store ready (draft at {})", config.draft_path);

    let state = AppState {
        kv: remote.clone(),
        blobs: remote.clone(),
        ai: remote.clone(),
        converter: remote,
        rasterizer: Arc::new(BlockRasterizer),
        builder,
        flags: Arc::new(InFlightFlags::default()),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
