use super::{
    aggregator::Aggregator,
    extract::{ExtractionMode, JsonExtractor},
    fsm::{ReflectionEvent, ReflectionStateMachine},
    prompts::PromptTemplates,
    request::{AggregatedResult, GenerationRequest, JsonObject, ReflectionResult},
    runner::{MAX_CONCURRENT_REFLECTIONS, ReflectionRunner},
};
use crate::{Result, config::Config, llm::TextGenerator};
use std::{sync::Arc, time::Duration};
use tracing::info;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub max_concurrency: usize,
    /// Return the lone success directly instead of issuing a merge call.
    pub short_circuit_single: bool,
    pub extraction: ExtractionMode,
    pub templates: PromptTemplates,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_concurrency: MAX_CONCURRENT_REFLECTIONS,
            short_circuit_single: false,
            extraction: ExtractionMode::default(),
            templates: PromptTemplates::default(),
        }
    }
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_concurrency: config.reflection.max_concurrency,
            short_circuit_single: config.reflection.short_circuit_single,
            extraction: config.reflection.extraction,
            templates: PromptTemplates::from(&config.prompts),
        }
    }
}

/// Fans a task out to several reflections and merges what comes back.
///
/// Every call to [`run`](Self::run) is independent: nothing is cached or
/// shared between requests. Dropping the returned future aborts all
/// in-flight generation calls of that request.
pub struct ReflectionEngine {
    runner: ReflectionRunner,
    aggregator: Aggregator,
    short_circuit_single: bool,
}

impl ReflectionEngine {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: EngineSettings) -> Self {
        let templates = Arc::new(settings.templates);
        let extractor = JsonExtractor::new(settings.extraction);

        Self {
            runner: ReflectionRunner::new(
                Arc::clone(&generator),
                Arc::clone(&templates),
                extractor,
                settings.max_concurrency,
            ),
            aggregator: Aggregator::new(generator, templates, extractor),
            short_circuit_single: settings.short_circuit_single,
        }
    }

    pub async fn reflect_and_aggregate(&self, request: &GenerationRequest) -> Result<JsonObject> {
        self.run(request).await.map(|result| result.merged)
    }

    pub async fn run(&self, request: &GenerationRequest) -> Result<AggregatedResult> {
        let mut fsm = ReflectionStateMachine::new(request.reflection_count);

        if let Err(e) = request.validate() {
            fsm.context.set_error(&e);
            fsm.transition(ReflectionEvent::Rejected)?;
            return Err(e);
        }

        fsm.transition(ReflectionEvent::Start)?;
        let results = match self.runner.run(request).await {
            Ok(results) => results,
            Err(e) => {
                fsm.context.set_error(&e);
                fsm.transition(ReflectionEvent::AllReflectionsFailed)?;
                return Err(e);
            }
        };

        let total = results.len();
        let successes: Vec<JsonObject> = results
            .into_iter()
            .filter_map(ReflectionResult::into_success)
            .collect();
        fsm.context.record_tally(successes.len(), total - successes.len());
        fsm.transition(ReflectionEvent::ReflectionsCollected)?;

        let merged = if self.short_circuit_single && successes.len() == 1 {
            info!("Single successful reflection, skipping merge call");
            Ok(successes.into_iter().next().unwrap_or_default())
        } else {
            self.aggregator
                .aggregate(
                    &successes,
                    &request.schema_description,
                    request.temperature,
                    request.per_call_timeout,
                )
                .await
        };

        match merged {
            Ok(merged) => {
                fsm.transition(ReflectionEvent::AggregationSucceeded)?;
                Ok(AggregatedResult {
                    merged,
                    reflections_succeeded: fsm.context.succeeded,
                    reflections_failed: fsm.context.failed,
                })
            }
            Err(e) => {
                fsm.context.set_error(&e);
                fsm.transition(ReflectionEvent::AggregationFailed)?;
                Err(e)
            }
        }
    }
}

/// One-shot entry point with default engine settings and temperature.
pub async fn reflect_and_aggregate(
    generator: Arc<dyn TextGenerator>,
    task_text: &str,
    schema_description: &str,
    reflection_count: usize,
    per_call_timeout: Duration,
) -> Result<JsonObject> {
    let request = GenerationRequest::new(task_text, schema_description)
        .with_reflection_count(reflection_count)
        .with_timeout(per_call_timeout);

    ReflectionEngine::new(generator, EngineSettings::default())
        .reflect_and_aggregate(&request)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, llm::MockTextGenerator};
    use mockall::Sequence;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_invalid_request_never_calls_generator() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().times(0);

        let engine = ReflectionEngine::new(Arc::new(mock), EngineSettings::default());
        let err = engine
            .run(&GenerationRequest::new("", "{\"a\": \"int\"}"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_single_success_still_merges_by_default() {
        let mut mock = MockTextGenerator::new();
        let mut seq = Sequence::new();
        mock.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("{\"a\": 1}".to_string()));
        mock.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("{\"a\": 1, \"normalized\": true}".to_string()));

        let engine = ReflectionEngine::new(Arc::new(mock), EngineSettings::default());
        let result = engine
            .run(&GenerationRequest::new("task", "schema").with_reflection_count(1))
            .await
            .unwrap();

        let expected = json!({"a": 1, "normalized": true});
        assert_eq!(result.merged, expected.as_object().cloned().unwrap());
        assert_eq!(result.reflections_succeeded, 1);
        assert_eq!(result.reflections_failed, 0);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_merge_call() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Ok("Here: {\"a\": 1}".to_string()));

        let settings = EngineSettings {
            short_circuit_single: true,
            ..EngineSettings::default()
        };
        let engine = ReflectionEngine::new(Arc::new(mock), settings);
        let merged = engine
            .reflect_and_aggregate(
                &GenerationRequest::new("task", "schema").with_reflection_count(1),
            )
            .await
            .unwrap();

        assert_eq!(merged, json!({"a": 1}).as_object().cloned().unwrap());
    }

    #[test]
    fn test_settings_from_config() {
        let yaml = r#"
llm:
  model: "gpt-4o"
reflection:
  max_concurrency: 4
  short_circuit_single: true
  extraction: greedy
prompts:
  aggregation: "Merge {reflected_outputs} into {schema}"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let settings = EngineSettings::from(&config);
        assert_eq!(settings.max_concurrency, 4);
        assert!(settings.short_circuit_single);
        assert_eq!(settings.extraction, ExtractionMode::Greedy);
        assert_eq!(settings.templates.aggregation, "Merge {reflected_outputs} into {schema}");
    }
}
