//! Solve lifecycle events.
//!
//! Provides hooks for logging, metrics, and custom reactions around task
//! creation and polling.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use super::metrics::MetricsCollector;
use crate::solving::SolveStage;
use crate::transport::TaskId;

/// A task was accepted by the service.
#[derive(Debug, Clone)]
pub struct TaskCreatedEvent {
    pub task_type: &'static str,
    pub task_id: TaskId,
    pub no_cache: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Pending,
    /// Fetch failed transiently; the next tick will try again.
    ServiceUnavailable(String),
}

#[derive(Debug, Clone)]
pub struct PollEvent {
    pub task_type: &'static str,
    pub task_id: TaskId,
    pub attempt: u32,
    pub outcome: PollOutcome,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SolvedEvent {
    pub task_type: &'static str,
    pub task_id: TaskId,
    pub attempts: u32,
    pub elapsed: Duration,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FailedEvent {
    pub task_type: &'static str,
    pub task_id: Option<TaskId>,
    pub stage: SolveStage,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TimedOutEvent {
    pub task_type: &'static str,
    pub task_id: TaskId,
    pub attempts: u32,
    pub timeout: Duration,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum SolveEvent {
    TaskCreated(TaskCreatedEvent),
    Poll(PollEvent),
    Solved(SolvedEvent),
    Failed(FailedEvent),
    TimedOut(TimedOutEvent),
}

/// Trait implemented by event handlers.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &SolveEvent);
}

/// Dispatcher that broadcasts events to registered handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn dispatch(&self, event: SolveEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

/// Logs events using the `log` crate.
#[derive(Debug)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn handle(&self, event: &SolveEvent) {
        match event {
            SolveEvent::TaskCreated(created) => {
                log::info!(
                    "created {} task {} (no_cache={})",
                    created.task_type,
                    created.task_id,
                    created.no_cache
                );
            }
            SolveEvent::Poll(poll) => match &poll.outcome {
                PollOutcome::Pending => {
                    log::debug!(
                        "{} task {} not ready (attempt {})",
                        poll.task_type,
                        poll.task_id,
                        poll.attempt
                    );
                }
                PollOutcome::ServiceUnavailable(reason) => {
                    log::debug!(
                        "{} task {} poll skipped, service unavailable: {}",
                        poll.task_type,
                        poll.task_id,
                        reason
                    );
                }
            },
            SolveEvent::Solved(solved) => {
                log::info!(
                    "{} task {} solved after {} polls ({:.2}s)",
                    solved.task_type,
                    solved.task_id,
                    solved.attempts,
                    solved.elapsed.as_secs_f64()
                );
            }
            SolveEvent::Failed(failed) => match failed.task_id {
                Some(task_id) => log::warn!(
                    "{} task {} failed at {}: {}",
                    failed.task_type,
                    task_id,
                    failed.stage,
                    failed.error
                ),
                None => log::warn!(
                    "{} task failed at {}: {}",
                    failed.task_type,
                    failed.stage,
                    failed.error
                ),
            },
            SolveEvent::TimedOut(timed_out) => {
                log::warn!(
                    "{} task {} timed out after {:.0}s and {} polls",
                    timed_out.task_type,
                    timed_out.task_id,
                    timed_out.timeout.as_secs_f64(),
                    timed_out.attempts
                );
            }
        }
    }
}

/// Metrics handler that feeds the metrics collector.
#[derive(Clone, Debug)]
pub struct MetricsHandler {
    metrics: MetricsCollector,
}

impl MetricsHandler {
    pub fn new(metrics: MetricsCollector) -> Self {
        Self { metrics }
    }
}

impl EventHandler for MetricsHandler {
    fn handle(&self, event: &SolveEvent) {
        match event {
            SolveEvent::TaskCreated(created) => self.metrics.record_created(created.task_type),
            SolveEvent::Poll(poll) => self.metrics.record_poll(
                poll.task_type,
                matches!(poll.outcome, PollOutcome::ServiceUnavailable(_)),
            ),
            SolveEvent::Solved(solved) => {
                self.metrics.record_solved(solved.task_type, solved.elapsed)
            }
            SolveEvent::Failed(failed) => self.metrics.record_failed(failed.task_type),
            SolveEvent::TimedOut(timed_out) => self.metrics.record_timed_out(timed_out.task_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingHandler(std::sync::Mutex<usize>);

    impl EventHandler for CountingHandler {
        fn handle(&self, _event: &SolveEvent) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn dispatches_to_handlers() {
        let mut dispatcher = EventDispatcher::new();
        let counter = Arc::new(CountingHandler(std::sync::Mutex::new(0)));
        dispatcher.register_handler(counter.clone());
        dispatcher.register_handler(Arc::new(LoggingHandler));
        dispatcher.dispatch(SolveEvent::Failed(FailedEvent {
            task_type: "NoCaptchaTaskProxyless",
            task_id: None,
            stage: SolveStage::CreateTask,
            error: "zero balance".into(),
            timestamp: Utc::now(),
        }));
        assert_eq!(*counter.0.lock().unwrap(), 1);
    }

    #[test]
    fn metrics_handler_counts_transient_polls() {
        let metrics = MetricsCollector::new();
        let handler = MetricsHandler::new(metrics.clone());
        for outcome in [
            PollOutcome::Pending,
            PollOutcome::ServiceUnavailable("503 Service Unavailable".into()),
        ] {
            handler.handle(&SolveEvent::Poll(PollEvent {
                task_type: "TurnstileTaskProxyless",
                task_id: TaskId(1),
                attempt: 1,
                outcome,
                timestamp: Utc::now(),
            }));
        }

        let snapshot = metrics.snapshot();
        let stats = snapshot.task_type("TurnstileTaskProxyless").unwrap();
        assert_eq!(stats.polls, 2);
        assert_eq!(stats.transient_errors, 1);
    }
}
