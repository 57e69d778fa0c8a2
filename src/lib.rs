pub mod config;
pub mod error;
pub mod llm;
pub mod reflection;
pub mod scanner;
pub mod server;

pub use error::{Error, Result};
pub use reflection::{GenerationRequest, JsonObject, ReflectionEngine, reflect_and_aggregate};
