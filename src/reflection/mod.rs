mod aggregator;
mod engine;
mod extract;
pub mod fsm;
pub mod prompts;
mod request;
mod runner;

pub use aggregator::Aggregator;
pub use engine::{EngineSettings, ReflectionEngine, reflect_and_aggregate};
pub use extract::{ExtractionMode, JsonExtractor, extract_json};
pub use fsm::{ReflectionContext, ReflectionEvent, ReflectionState, ReflectionStateMachine};
pub use prompts::PromptTemplates;
pub use request::{
    AggregatedResult, DEFAULT_PER_CALL_TIMEOUT, DEFAULT_REFLECTION_COUNT, DEFAULT_TEMPERATURE,
    GenerationRequest, JsonObject, ReflectionResult,
};
pub use runner::{MAX_CONCURRENT_REFLECTIONS, ReflectionRunner};
