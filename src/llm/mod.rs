mod client;
mod retry;
mod types;

pub use client::{OpenAiClient, TextGenerator};
#[cfg(test)]
pub use client::MockTextGenerator;
pub use retry::{RetryPolicy, RetryingGenerator};
pub use types::ChatMessage;
