//! Create, poll, resolve.
//!
//! Handles the end-to-end life of one task: validate it locally, submit it,
//! wait out the variant's warm-up delay, poll on the steady interval and
//! hand back either the decoded solution or a classified error. The whole
//! poll phase is raced against the variant deadline, so an in-flight fetch
//! is dropped when time runs out.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::ser::Error as _;
use serde_json::Value;
use thiserror::Error;
use tokio::time::{Instant, sleep_until, timeout_at};
use url::Url;

use super::errors::{CAPTCHA_NOT_READY, RemoteError, RemoteErrorKind};
use super::schedule::PollSchedule;
use crate::modules::events::{
    EventDispatcher, FailedEvent, PollEvent, PollOutcome, SolveEvent, SolvedEvent,
    TaskCreatedEvent, TimedOutEvent,
};
use crate::tasks::{Task, ValidationError};
use crate::transport::{
    CreateTaskRequest, ErrorInfo, SolverTransport, TaskId, TaskStatus, TransportError,
};

/// Deadline used when the requested timeout does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Step of the flow an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStage {
    Validate,
    CreateTask,
    GetTaskResult,
    GetBalance,
}

impl fmt::Display for SolveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolveStage::Validate => "validate",
            SolveStage::CreateTask => "create task",
            SolveStage::GetTaskResult => "get task result",
            SolveStage::GetBalance => "get balance",
        })
    }
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("validate: {0}")]
    Validation(#[from] ValidationError),
    #[error("{stage} failed: {source}")]
    Transport {
        stage: SolveStage,
        #[source]
        source: TransportError,
    },
    #[error("{stage} rejected by service: {source}")]
    Remote {
        stage: SolveStage,
        #[source]
        source: RemoteError,
    },
    #[error("get task result: task {task_id} not solved within {}s", .timeout.as_secs())]
    Timeout { task_id: TaskId, timeout: Duration },
    #[error("create task: service returned no task id")]
    MissingTaskId,
    #[error("get task result: task {0} reported ready without a solution")]
    MissingSolution(TaskId),
    #[error("get task result: failed to decode solution for task {task_id}: {source}")]
    Solution {
        task_id: TaskId,
        #[source]
        source: serde_json::Error,
    },
    #[error("create task: failed to encode task: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("get balance: service returned no balance")]
    MissingBalance,
}

impl SolveError {
    pub fn stage(&self) -> SolveStage {
        match self {
            SolveError::Validation(_) => SolveStage::Validate,
            SolveError::Transport { stage, .. } | SolveError::Remote { stage, .. } => *stage,
            SolveError::MissingTaskId | SolveError::Encode(_) => SolveStage::CreateTask,
            SolveError::Timeout { .. }
            | SolveError::MissingSolution(_)
            | SolveError::Solution { .. } => SolveStage::GetTaskResult,
            SolveError::MissingBalance => SolveStage::GetBalance,
        }
    }

    /// Classified service error, if the failure came from the service.
    pub fn remote_kind(&self) -> Option<RemoteErrorKind> {
        match self {
            SolveError::Remote { source, .. } => Some(source.kind),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SolveError::Timeout { .. })
    }
}

/// Per-call knobs for a single solve.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    pub no_cache: bool,
    pub callback_url: Option<Url>,
    /// Replaces the variant's own timeout when set.
    pub timeout: Option<Duration>,
}

impl SolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn with_callback_url(mut self, url: Url) -> Self {
        self.callback_url = Some(url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Runs solves against a shared transport and reports every step to the
/// event dispatcher.
#[derive(Clone)]
pub struct Solver {
    transport: Arc<dyn SolverTransport>,
    events: Arc<EventDispatcher>,
}

impl Solver {
    pub fn new(transport: Arc<dyn SolverTransport>, events: Arc<EventDispatcher>) -> Self {
        Self { transport, events }
    }

    /// Submit `task` and wait for its solution.
    ///
    /// Steps:
    /// 1. Validate locally; nothing is sent for an invalid task.
    /// 2. Create the task once. Creation errors are never retried.
    /// 3. Poll on the task's schedule until it is ready, fails, or the
    ///    deadline measured from creation passes.
    pub async fn solve<T: Task>(
        &self,
        task: &T,
        options: &SolveOptions,
    ) -> Result<T::Solution, SolveError> {
        let task_type = task.task_type();
        let mut timings = task.timings();
        if let Some(timeout) = options.timeout {
            timings = timings.with_timeout(timeout);
        }
        let no_cache = options.no_cache && timings.supports_no_cache();

        if let Err(err) = task.validate() {
            return Err(self.failed(task_type, None, err.into()));
        }

        let request = encode_task(task, no_cache, options.callback_url.as_ref())
            .map_err(|err| self.failed(task_type, None, err))?;
        let task_id = self
            .create_task(&request)
            .await
            .map_err(|err| self.failed(task_type, None, err))?;

        let submitted_at = Instant::now();
        let deadline = submitted_at
            .checked_add(timings.timeout)
            .unwrap_or_else(|| submitted_at + FAR_FUTURE);
        self.events.dispatch(SolveEvent::TaskCreated(TaskCreatedEvent {
            task_type,
            task_id,
            no_cache,
            timestamp: Utc::now(),
        }));

        let mut schedule = PollSchedule::new(&timings, no_cache, submitted_at);
        let outcome = timeout_at(
            deadline,
            self.poll_until_ready(task_type, task_id, &mut schedule),
        )
        .await;

        match outcome {
            Ok(Ok(value)) => {
                let attempts = schedule.polls();
                let solution = serde_json::from_value::<T::Solution>(value)
                    .map_err(|source| SolveError::Solution { task_id, source })
                    .map_err(|err| self.failed(task_type, Some(task_id), err))?;
                self.events.dispatch(SolveEvent::Solved(SolvedEvent {
                    task_type,
                    task_id,
                    attempts,
                    elapsed: submitted_at.elapsed(),
                    timestamp: Utc::now(),
                }));
                Ok(solution)
            }
            Ok(Err(err)) => Err(self.failed(task_type, Some(task_id), err)),
            Err(_) => {
                self.events.dispatch(SolveEvent::TimedOut(TimedOutEvent {
                    task_type,
                    task_id,
                    attempts: schedule.polls(),
                    timeout: timings.timeout,
                    timestamp: Utc::now(),
                }));
                Err(SolveError::Timeout {
                    task_id,
                    timeout: timings.timeout,
                })
            }
        }
    }

    /// Current account balance.
    pub async fn get_balance(&self) -> Result<f64, SolveError> {
        let response = self
            .transport
            .get_balance()
            .await
            .map_err(|source| SolveError::Transport {
                stage: SolveStage::GetBalance,
                source,
            })?;
        check_remote(&response.error, SolveStage::GetBalance)?;
        response.balance.ok_or(SolveError::MissingBalance)
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<TaskId, SolveError> {
        let response = self
            .transport
            .create_task(request)
            .await
            .map_err(|source| SolveError::Transport {
                stage: SolveStage::CreateTask,
                source,
            })?;
        check_remote(&response.error, SolveStage::CreateTask)?;
        response.task_id.ok_or(SolveError::MissingTaskId)
    }

    async fn poll_until_ready(
        &self,
        task_type: &'static str,
        task_id: TaskId,
        schedule: &mut PollSchedule,
    ) -> Result<Value, SolveError> {
        loop {
            sleep_until(schedule.next_poll()).await;
            let attempt = schedule.record_poll(Instant::now());

            let response = match self.transport.get_task_result(task_id).await {
                Ok(response) => response,
                Err(err) if err.is_transient() => {
                    self.poll_event(
                        task_type,
                        task_id,
                        attempt,
                        PollOutcome::ServiceUnavailable(err.to_string()),
                    );
                    continue;
                }
                Err(source) => {
                    return Err(SolveError::Transport {
                        stage: SolveStage::GetTaskResult,
                        source,
                    });
                }
            };

            if response.error.is_error() && response.error.code() != CAPTCHA_NOT_READY {
                check_remote(&response.error, SolveStage::GetTaskResult)?;
            }

            if response.status == Some(TaskStatus::Ready) {
                return response.solution.ok_or(SolveError::MissingSolution(task_id));
            }

            self.poll_event(task_type, task_id, attempt, PollOutcome::Pending);
        }
    }

    fn poll_event(
        &self,
        task_type: &'static str,
        task_id: TaskId,
        attempt: u32,
        outcome: PollOutcome,
    ) {
        self.events.dispatch(SolveEvent::Poll(PollEvent {
            task_type,
            task_id,
            attempt,
            outcome,
            timestamp: Utc::now(),
        }));
    }

    fn failed(
        &self,
        task_type: &'static str,
        task_id: Option<TaskId>,
        err: SolveError,
    ) -> SolveError {
        self.events.dispatch(SolveEvent::Failed(FailedEvent {
            task_type,
            task_id,
            stage: err.stage(),
            error: err.to_string(),
            timestamp: Utc::now(),
        }));
        err
    }
}

impl fmt::Debug for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver").finish_non_exhaustive()
    }
}

fn check_remote(error: &ErrorInfo, stage: SolveStage) -> Result<(), SolveError> {
    if !error.is_error() {
        return Ok(());
    }
    Err(SolveError::Remote {
        stage,
        source: RemoteError::from_code(error.code(), error.error_description.clone()),
    })
}

/// Serialize the task fields and add the wire discriminator.
fn encode_task<T: Task>(
    task: &T,
    no_cache: bool,
    callback_url: Option<&Url>,
) -> Result<CreateTaskRequest, SolveError> {
    let Value::Object(mut fields) = serde_json::to_value(task).map_err(SolveError::Encode)? else {
        return Err(SolveError::Encode(serde_json::Error::custom(
            "task did not serialize to an object",
        )));
    };
    fields.insert("type".into(), Value::from(task.task_type()));
    if no_cache {
        fields.insert("nocache".into(), Value::Bool(true));
    }
    Ok(CreateTaskRequest {
        task: Value::Object(fields),
        callback_url: callback_url.map(|url| url.to_string()),
    })
}
