use super::request::JsonObject;
use crate::{Result, config::PromptsConfig};

pub const TASK_PLACEHOLDER: &str = "{task}";
pub const SCHEMA_PLACEHOLDER: &str = "{schema}";
pub const OUTPUTS_PLACEHOLDER: &str = "{reflected_outputs}";

pub const DEFAULT_REFLECTION_TEMPLATE: &str = r#"You are an expert HR analyst. Extract structured data from the input below using the format shown.

Respond ONLY with a valid JSON object that fills in the structure. Do not return explanations, comments or schema definitions.

Input:
---
{task}
---

Expected output format:
{schema}
"#;

pub const DEFAULT_AGGREGATION_TEMPLATE: &str = r#"You are an experienced analyst. You are given several structured outputs produced for the same input. Combine them into one consistent and complete output.

JSON outputs:
{reflected_outputs}

The final output must follow exactly this format and include every valid point. Merge duplicates where possible. Respond ONLY with a valid JSON object.

Expected output format:
{schema}
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplates {
    pub reflection: String,
    pub aggregation: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            reflection: DEFAULT_REFLECTION_TEMPLATE.to_string(),
            aggregation: DEFAULT_AGGREGATION_TEMPLATE.to_string(),
        }
    }
}

impl From<&PromptsConfig> for PromptTemplates {
    fn from(config: &PromptsConfig) -> Self {
        let defaults = Self::default();
        Self {
            reflection: config.reflection.clone().unwrap_or(defaults.reflection),
            aggregation: config.aggregation.clone().unwrap_or(defaults.aggregation),
        }
    }
}

impl PromptTemplates {
    pub fn render_reflection(&self, task_text: &str, schema_description: &str) -> String {
        // Task text goes in last so placeholder-like text inside it stays literal
        self.reflection
            .replace(SCHEMA_PLACEHOLDER, schema_description)
            .replace(TASK_PLACEHOLDER, task_text)
    }

    pub fn render_aggregation(
        &self,
        reflections: &[JsonObject],
        schema_description: &str,
    ) -> Result<String> {
        let outputs = serde_json::to_string_pretty(reflections)?;
        Ok(self
            .aggregation
            .replace(SCHEMA_PLACEHOLDER, schema_description)
            .replace(OUTPUTS_PLACEHOLDER, &outputs))
    }
}
