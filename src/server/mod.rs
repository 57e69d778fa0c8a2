pub mod handlers;
pub mod types;

use crate::{
    Result,
    config::Config,
    llm::{OpenAiClient, RetryPolicy, RetryingGenerator, TextGenerator},
    reflection::{EngineSettings, ReflectionEngine},
    scanner::JdScanner,
};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

pub fn router(state: handlers::AppState, cors_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/jd/scan", post(handlers::scan_jd))
        .layer(CorsLayer::new().allow_origin(origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn build_generator(config: &Config) -> Arc<dyn TextGenerator> {
    let openai = OpenAiClient::new(config.llm.clone());
    info!(
        "Generation backend: model {} (up to {} attempts per call)",
        openai.model(),
        config.retry.max_attempts
    );

    let client: Arc<dyn TextGenerator> = Arc::new(openai);
    if config.retry.max_attempts > 1 {
        Arc::new(RetryingGenerator::new(
            client,
            RetryPolicy::from(&config.retry),
        ))
    } else {
        client
    }
}

pub async fn run(config: Config) -> Result<()> {
    let generator = build_generator(&config);
    let engine = ReflectionEngine::new(generator, EngineSettings::from(&config));
    let scanner = JdScanner::from_config(Arc::new(engine), &config);

    let app_state = handlers::AppState {
        scanner: Arc::new(scanner),
    };
    let app = router(app_state, &config.server.cors_origins);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
