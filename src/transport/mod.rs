//! HTTP seam between the polling engine and the service.
//!
//! The engine only speaks to [`SolverTransport`]; the shipped implementation
//! is [`ReqwestTransport`], and tests substitute scripted stubs.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

use std::fmt;

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Identifier the service assigns to a created task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body of a `createTask` call, minus the credential and software id the
/// transport adds itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub task: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

/// Error triple present on every response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    #[serde(default)]
    pub error_id: i64,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ErrorInfo {
    pub fn is_error(&self) -> bool {
        self.error_id != 0
    }

    pub fn code(&self) -> &str {
        self.error_code.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
    #[serde(flatten)]
    pub error: ErrorInfo,
    #[serde(default)]
    pub task_id: Option<TaskId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Ready,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResultResponse {
    #[serde(flatten)]
    pub error: ErrorInfo,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub solution: Option<Value>,
}

impl TaskResultResponse {
    pub fn processing() -> Self {
        Self {
            error: ErrorInfo::default(),
            status: Some(TaskStatus::Processing),
            solution: None,
        }
    }

    pub fn ready(solution: Value) -> Self {
        Self {
            error: ErrorInfo::default(),
            status: Some(TaskStatus::Ready),
            solution: Some(solution),
        }
    }

    pub fn failed(code: impl Into<String>) -> Self {
        Self {
            error: ErrorInfo {
                error_id: 1,
                error_code: Some(code.into()),
                error_description: None,
            },
            status: None,
            solution: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    #[serde(flatten)]
    pub error: ErrorInfo,
    #[serde(default)]
    pub balance: Option<f64>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// Network failures and 5xx answers; worth asking again later.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("unexpected http status {0}")]
    Status(StatusCode),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error("invalid endpoint url: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("http transport error: {0}")]
    Http(String),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::ServiceUnavailable(_))
    }
}

/// Operations the service exposes. Implementations attach the credential to
/// every call and must be safe to share between concurrent solves.
#[async_trait]
pub trait SolverTransport: Send + Sync {
    async fn create_task(
        &self,
        request: &CreateTaskRequest,
    ) -> Result<CreateTaskResponse, TransportError>;

    async fn get_task_result(&self, task_id: TaskId)
    -> Result<TaskResultResponse, TransportError>;

    async fn get_balance(&self) -> Result<BalanceResponse, TransportError>;
}
