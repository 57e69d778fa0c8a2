use anyhow::{Context, Result, anyhow};
use reflect_aggregate::{config, server};
use tracing::info;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// RUST_LOG wins over `server.logs.level`.
fn resolve_log_level(configured: &str) -> Result<String> {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| configured.to_string());
    level.parse::<LevelFilter>().map_err(|_| {
        anyhow!(
            "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
            level
        )
    })?;
    Ok(level)
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing is not up yet, so config problems go to stderr via anyhow
    let config = config::load()
        .await
        .context("Failed to load configuration")?;
    let log_level = resolve_log_level(&config.server.logs.level)?;
    init_tracing(&log_level);

    info!(
        "JD scanner starting: model {}, {} reflections per request (max {}), log level {}",
        config.llm.model,
        config.reflection.reflection_count,
        config.reflection.max_reflection_count,
        log_level
    );

    server::run(config).await?;
    Ok(())
}
