use super::{extract::JsonExtractor, prompts::PromptTemplates, request::JsonObject};
use crate::{Error, Result, llm::TextGenerator};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info};

/// Merges successful reflections with one further generation call.
///
/// There is no deterministic fallback: if the merge call or its extraction
/// fails, the whole operation fails with [`Error::AggregationFailed`].
pub struct Aggregator {
    generator: Arc<dyn TextGenerator>,
    templates: Arc<PromptTemplates>,
    extractor: JsonExtractor,
}

impl Aggregator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        templates: Arc<PromptTemplates>,
        extractor: JsonExtractor,
    ) -> Self {
        Self {
            generator,
            templates,
            extractor,
        }
    }

    pub async fn aggregate(
        &self,
        reflections: &[JsonObject],
        schema_description: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<JsonObject> {
        if reflections.is_empty() {
            return Err(Error::invalid_argument("no reflections to aggregate"));
        }

        info!("Aggregating {} reflections", reflections.len());

        self.merge(reflections, schema_description, temperature, timeout)
            .await
            .map_err(|e| {
                error!("Failed to aggregate reflections: {}", e);
                Error::aggregation_failed(e)
            })
    }

    async fn merge(
        &self,
        reflections: &[JsonObject],
        schema_description: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<JsonObject> {
        let prompt = self
            .templates
            .render_aggregation(reflections, schema_description)?;

        let text = tokio::time::timeout(timeout, self.generator.generate(&prompt, temperature))
            .await
            .map_err(|_| Error::Timeout { timeout })??;

        debug!("Aggregation output: {}", text);
        self.extractor.extract(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockTextGenerator;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn aggregator(mock: MockTextGenerator) -> Aggregator {
        Aggregator::new(
            Arc::new(mock),
            Arc::new(PromptTemplates::default()),
            JsonExtractor::default(),
        )
    }

    fn object(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_merge_call_receives_every_reflection() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .withf(|prompt, _| prompt.contains("\"python\"") && prompt.contains("\"sql\""))
            .times(1)
            .returning(|_, _| Ok("```json\n{\"skills\": [\"python\", \"sql\"]}\n```".to_string()));

        let merged = aggregator(mock)
            .aggregate(
                &[
                    object(json!({"skills": ["python"]})),
                    object(json!({"skills": ["sql"]})),
                ],
                "{\"skills\": [\"string\"]}",
                0.2,
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert_eq!(merged, object(json!({"skills": ["python", "sql"]})));
    }

    #[tokio::test]
    async fn test_transport_error_is_aggregation_failure() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Err(Error::llm("503 service unavailable")));

        let err = aggregator(mock)
            .aggregate(&[object(json!({"a": 1}))], "{}", 0.2, Duration::from_secs(5))
            .await
            .unwrap_err();

        match err {
            Error::AggregationFailed(cause) => assert!(matches!(*cause, Error::Llm(_))),
            other => panic!("expected AggregationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_merge_output_is_aggregation_failure() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Ok("I could not merge these.".to_string()));

        let err = aggregator(mock)
            .aggregate(&[object(json!({"a": 1}))], "{}", 0.2, Duration::from_secs(5))
            .await
            .unwrap_err();

        match err {
            Error::AggregationFailed(cause) => assert!(matches!(*cause, Error::NoJsonFound)),
            other => panic!("expected AggregationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_generator() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().times(0);

        let err = aggregator(mock)
            .aggregate(&[], "{}", 0.2, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
