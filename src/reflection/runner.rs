use super::{
    extract::JsonExtractor,
    prompts::PromptTemplates,
    request::{GenerationRequest, ReflectionResult},
};
use crate::{Error, Result, llm::TextGenerator};
use std::{sync::Arc, time::Duration};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, info, warn};

/// Upper bound on simultaneous reflection calls, whatever the config says.
pub const MAX_CONCURRENT_REFLECTIONS: usize = 10;

pub struct ReflectionRunner {
    generator: Arc<dyn TextGenerator>,
    templates: Arc<PromptTemplates>,
    extractor: JsonExtractor,
    max_concurrency: usize,
}

impl ReflectionRunner {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        templates: Arc<PromptTemplates>,
        extractor: JsonExtractor,
        max_concurrency: usize,
    ) -> Self {
        Self {
            generator,
            templates,
            extractor,
            max_concurrency: max_concurrency.clamp(1, MAX_CONCURRENT_REFLECTIONS),
        }
    }

    /// Number of calls that may be in flight for `reflection_count` slots.
    pub fn worker_count(&self, reflection_count: usize) -> usize {
        reflection_count.min(self.max_concurrency).max(1)
    }

    /// Runs every slot and returns exactly `reflection_count` results in
    /// completion order. Per-slot failures are captured, never propagated.
    pub async fn collect(&self, request: &GenerationRequest) -> Vec<ReflectionResult> {
        let count = request.reflection_count;
        let workers = self.worker_count(count);
        let prompt: Arc<str> = self
            .templates
            .render_reflection(&request.task_text, &request.schema_description)
            .into();

        info!(
            "Starting {} reflections with up to {} concurrent calls",
            count, workers
        );

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        for slot in 0..count {
            let semaphore = Arc::clone(&semaphore);
            let generator = Arc::clone(&self.generator);
            let prompt = Arc::clone(&prompt);
            let extractor = self.extractor;
            let temperature = request.temperature;
            let timeout = request.per_call_timeout;

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return ReflectionResult::Failure(Error::internal(
                            "reflection worker pool closed",
                        ));
                    }
                };
                reflect_once(
                    slot,
                    generator.as_ref(),
                    &prompt,
                    temperature,
                    timeout,
                    extractor,
                )
                .await
            });
        }

        let mut results = Vec::with_capacity(count);
        while let Some(joined) = tasks.join_next().await {
            let result = joined.unwrap_or_else(|e| {
                ReflectionResult::Failure(Error::internal(format!("reflection task failed: {}", e)))
            });
            results.push(result);
        }

        results
    }

    /// Like [`collect`](Self::collect), but fails with
    /// [`Error::AllReflectionsFailed`] when no slot succeeded.
    pub async fn run(&self, request: &GenerationRequest) -> Result<Vec<ReflectionResult>> {
        let results = self.collect(request).await;
        let succeeded = results.iter().filter(|r| r.is_success()).count();

        if succeeded == 0 {
            let errors: Vec<String> = results
                .iter()
                .filter_map(|r| match r {
                    ReflectionResult::Failure(e) => Some(e.to_string()),
                    ReflectionResult::Success(_) => None,
                })
                .collect();
            return Err(Error::AllReflectionsFailed {
                failed: results.len(),
                errors,
            });
        }

        info!(
            "Reflections finished: {} succeeded, {} failed",
            succeeded,
            results.len() - succeeded
        );
        Ok(results)
    }
}

async fn reflect_once(
    slot: usize,
    generator: &dyn TextGenerator,
    prompt: &str,
    temperature: f32,
    timeout: Duration,
    extractor: JsonExtractor,
) -> ReflectionResult {
    let outcome = match tokio::time::timeout(timeout, generator.generate(prompt, temperature)).await
    {
        Err(_) => Err(Error::Timeout { timeout }),
        Ok(Err(e)) => Err(e),
        Ok(Ok(text)) if text.trim().is_empty() => {
            Err(Error::generation("empty response from model"))
        }
        Ok(Ok(text)) => {
            debug!("Raw output for reflection #{}: {}", slot + 1, text);
            extractor.extract(&text)
        }
    };

    if let Err(ref e) = outcome {
        warn!("Reflection #{} failed: {}", slot + 1, e);
    }

    ReflectionResult::from(outcome)
}
