mod types;

pub use types::*;

use crate::Result;
use std::{env, path::Path};
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(&config_path).await
}

pub async fn load_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from: {}", path.display());

    let config_str = tokio::fs::read_to_string(path).await?;
    let mut config: Config = serde_yaml::from_str(&config_str)?;

    if config.llm.api_key.is_empty() {
        if let Ok(key) = env::var("OPENAI_API_KEY") {
            debug!("Using API key from OPENAI_API_KEY");
            config.llm.api_key = key;
        }
    }

    config.validate()?;
    Ok(config)
}
