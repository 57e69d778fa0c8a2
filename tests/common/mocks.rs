use async_trait::async_trait;
use reflect_aggregate::{Error, Result, llm::TextGenerator};
use std::collections::VecDeque;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

/// Mock generator that replays scripted responses in call order.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    pub responses: Arc<Mutex<VecDeque<Result<String>>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut queue = self.responses.lock().unwrap();
            queue.extend(responses.into_iter().map(|r| Ok(r.into())));
        }
        self
    }

    pub fn with_error(self, error: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::generation(error)));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _temperature: f32) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::generation("No more mock responses available")));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        response
    }
}

/// Mock generator that always fails, counting its calls.
#[derive(Debug, Clone, Default)]
pub struct FailingGenerator {
    pub calls: Arc<AtomicUsize>,
}

impl FailingGenerator {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str, _temperature: f32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::generation("simulated transport error"))
    }
}

/// Mock generator that never answers within any reasonable timeout.
///
/// The first `answer_first` calls return `answer` immediately; every later
/// call stalls.
#[derive(Debug, Clone, Default)]
pub struct StalledGenerator {
    pub started: Arc<AtomicUsize>,
    pub finished: Arc<AtomicUsize>,
    pub answer_first: usize,
    pub answer: String,
}

impl StalledGenerator {
    pub fn answering_first(count: usize, answer: &str) -> Self {
        Self {
            answer_first: count,
            answer: answer.to_string(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl TextGenerator for StalledGenerator {
    async fn generate(&self, _prompt: &str, _temperature: f32) -> Result<String> {
        let call = self.started.fetch_add(1, Ordering::SeqCst);
        if call < self.answer_first {
            return Ok(self.answer.clone());
        }
        tokio::time::sleep(Duration::from_secs(3600)).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok("{\"late\": true}".to_string())
    }
}
