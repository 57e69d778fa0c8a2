use crate::{
    Error, Result,
    config::{Config, ReflectionConfig},
    reflection::{AggregatedResult, GenerationRequest, ReflectionEngine},
};
use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing::{debug, info};

/// Scans job descriptions into structured JSON using a schema file.
pub struct JdScanner {
    engine: Arc<ReflectionEngine>,
    schema_dir: PathBuf,
    default_schema_file: String,
    defaults: ReflectionConfig,
}

impl JdScanner {
    pub fn new(
        engine: Arc<ReflectionEngine>,
        schema_dir: impl Into<PathBuf>,
        default_schema_file: impl Into<String>,
        defaults: ReflectionConfig,
    ) -> Self {
        Self {
            engine,
            schema_dir: schema_dir.into(),
            default_schema_file: default_schema_file.into(),
            defaults,
        }
    }

    pub fn from_config(engine: Arc<ReflectionEngine>, config: &Config) -> Self {
        Self::new(
            engine,
            &config.server.schema_dir,
            config.server.default_schema_file.clone(),
            config.reflection.clone(),
        )
    }

    pub async fn scan(
        &self,
        job_description: &str,
        reflection_count: Option<usize>,
        schema_file: Option<&str>,
    ) -> Result<AggregatedResult> {
        let reflection_count = reflection_count.unwrap_or(self.defaults.reflection_count);
        if reflection_count > self.defaults.max_reflection_count {
            return Err(Error::invalid_argument(format!(
                "reflection count {} exceeds the limit of {}",
                reflection_count, self.defaults.max_reflection_count
            )));
        }

        let schema_path = self.resolve_schema_path(schema_file)?;
        debug!("Loading output schema from {}", schema_path.display());
        let schema_description = tokio::fs::read_to_string(&schema_path).await?;

        let request = GenerationRequest::new(job_description, schema_description)
            .with_reflection_count(reflection_count)
            .with_timeout(Duration::from_secs(self.defaults.per_call_timeout_secs))
            .with_temperature(self.defaults.temperature);

        let result = self.engine.run(&request).await?;
        info!(
            "Job description scanned: {} keys from {} successful reflections",
            result.merged.len(),
            result.reflections_succeeded
        );
        Ok(result)
    }

    /// Schema files are looked up inside the schema directory only.
    pub fn resolve_schema_path(&self, schema_file: Option<&str>) -> Result<PathBuf> {
        let name = schema_file
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_schema_file);

        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::invalid_argument(format!(
                "schema file must be a relative path inside the schema directory: {}",
                name
            )));
        }

        Ok(self.schema_dir.join(relative))
    }
}
