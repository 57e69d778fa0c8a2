use crate::{Error, Result};
use tracing::{debug, info, warn};

// Orchestration states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectionState {
    Pending,
    Reflecting,
    Aggregating,
    Done,
    Failed,
}

// Orchestration events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectionEvent {
    Start,
    Rejected,
    ReflectionsCollected,
    AllReflectionsFailed,
    AggregationSucceeded,
    AggregationFailed,
}

#[derive(Debug, Clone, Default)]
pub struct ReflectionContext {
    pub reflection_count: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub last_error: Option<String>,
}

impl ReflectionContext {
    pub fn record_tally(&mut self, succeeded: usize, failed: usize) {
        self.succeeded = succeeded;
        self.failed = failed;
    }

    pub fn set_error(&mut self, error: &Error) {
        self.last_error = Some(error.to_string());
    }
}

pub struct ReflectionStateMachine {
    state: ReflectionState,
    pub context: ReflectionContext,
}

impl ReflectionStateMachine {
    pub fn new(reflection_count: usize) -> Self {
        Self {
            state: ReflectionState::Pending,
            context: ReflectionContext {
                reflection_count,
                ..ReflectionContext::default()
            },
        }
    }

    pub fn current_state(&self) -> ReflectionState {
        self.state
    }

    pub fn transition(&mut self, event: ReflectionEvent) -> Result<ReflectionState> {
        let old_state = self.state;
        debug!("FSM processing event {:?} in state {:?}", event, old_state);

        let new_state = match (old_state, event) {
            (ReflectionState::Pending, ReflectionEvent::Start) => ReflectionState::Reflecting,
            (ReflectionState::Pending, ReflectionEvent::Rejected) => ReflectionState::Failed,
            (ReflectionState::Reflecting, ReflectionEvent::ReflectionsCollected) => {
                ReflectionState::Aggregating
            }
            (ReflectionState::Reflecting, ReflectionEvent::AllReflectionsFailed) => {
                ReflectionState::Failed
            }
            (ReflectionState::Aggregating, ReflectionEvent::AggregationSucceeded) => {
                ReflectionState::Done
            }
            (ReflectionState::Aggregating, ReflectionEvent::AggregationFailed) => {
                ReflectionState::Failed
            }
            _ => {
                warn!(
                    "Invalid FSM transition from {:?} with event {:?}",
                    old_state, event
                );
                return Err(Error::InvalidTransition {
                    current: format!("{:?}", old_state),
                    requested: format!("{:?}", event),
                });
            }
        };

        info!(
            "FSM state transition: {:?} -> {:?} (event: {:?})",
            old_state, new_state, event
        );

        self.state = new_state;
        if self.is_terminal() {
            self.log_outcome();
        }
        Ok(new_state)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ReflectionState::Done | ReflectionState::Failed)
    }

    pub fn get_last_error(&self) -> Option<&str> {
        self.context.last_error.as_deref()
    }

    fn log_outcome(&self) {
        let ctx = &self.context;
        match self.get_last_error() {
            Some(e) => warn!(
                "Reflection run of {} ended in {:?} ({} succeeded, {} failed): {}",
                ctx.reflection_count,
                self.current_state(),
                ctx.succeeded,
                ctx.failed,
                e
            ),
            None => info!(
                "Reflection run of {} ended in {:?} ({} succeeded, {} failed)",
                ctx.reflection_count,
                self.current_state(),
                ctx.succeeded,
                ctx.failed
            ),
        }
    }
}
