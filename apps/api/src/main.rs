mod cache;
mod config;
mod errors;
mod extraction;
mod formatter;
mod llm_client;
mod models;
mod parsing;
mod pipeline;
mod repair;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::{FingerprintCache, MemoryCache, NoopCache};
use crate::config::Config;
use crate::extraction::ocr::OcrSettings;
use crate::llm_client::LlmClient;
use crate::pipeline::{PipelineSettings, ResumePipeline};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume ingestion API v{}", env!("CARGO_PKG_VERSION"));

    // Vision runs only when an API key is configured.
    let llm = config.anthropic_api_key.clone().map(LlmClient::new);
    match &llm {
        Some(_) => info!("LLM client initialized (model: {})", llm_client::MODEL),
        None => info!("No ANTHROPIC_API_KEY set, vision strategy disabled"),
    }

    let cache: Arc<dyn FingerprintCache> = if config.cache_enabled {
        Arc::new(MemoryCache::new())
    } else {
        info!("Extraction cache disabled");
        Arc::new(NoopCache)
    };

    let pipeline = ResumePipeline::with_default_strategies(
        llm,
        OcrSettings {
            dpi: config.ocr_dpi,
            max_pages: config.ocr_max_pages,
            lang: config.ocr_lang.clone(),
        },
        cache,
        PipelineSettings {
            timeout: Duration::from_secs(config.pipeline_timeout_secs),
            max_upload_bytes: config.max_upload_bytes,
            ..Default::default()
        },
    );
    info!(
        timeout_secs = config.pipeline_timeout_secs,
        max_upload_bytes = config.max_upload_bytes,
        "Ingestion pipeline initialized"
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: tighten CORS in production
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
