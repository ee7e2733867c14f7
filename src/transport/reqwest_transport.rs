//! Reqwest-based implementation of the `SolverTransport` trait.
//!
//! Holds one pooled `reqwest::Client` for the lifetime of the SDK client and
//! injects the account key into every JSON body.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::{
    BalanceResponse, CreateTaskRequest, CreateTaskResponse, SolverTransport, TaskId,
    TaskResultResponse, TransportError,
};
use crate::config::ClientConfig;

const CREATE_TASK: &str = "createTask";
const GET_TASK_RESULT: &str = "getTaskResult";
const GET_BALANCE: &str = "getBalance";

/// Reqwest-backed transport shared by every solve issued through a client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    client_key: String,
    soft_id: Option<u32>,
    create_task_url: Url,
    get_task_result_url: Url,
    get_balance_url: Url,
}

impl ReqwestTransport {
    /// Build a pooled client from the configuration.
    pub fn new(client_key: impl Into<String>, config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| TransportError::Http(err.to_string()))?;

        Self::from_client(client, client_key, config)
    }

    /// Wrap an existing reqwest client. Its timeout and pool settings are
    /// used as-is; only the endpoints and soft id come from `config`.
    pub fn from_client(
        client: Client,
        client_key: impl Into<String>,
        config: &ClientConfig,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            client,
            client_key: client_key.into(),
            soft_id: config.soft_id,
            create_task_url: config.endpoint(CREATE_TASK)?,
            get_task_result_url: config.endpoint(GET_TASK_RESULT)?,
            get_balance_url: config.endpoint(GET_BALANCE)?,
        })
    }

    async fn post<B, R>(&self, url: &Url, body: &B, soft_id: Option<u32>) -> Result<R, TransportError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_vec(&Authenticated {
            client_key: &self.client_key,
            soft_id,
            body,
        })
        .map_err(|err| TransportError::Encode(err.to_string()))?;

        log::trace!("-> POST {url}");
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .body(payload)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        log::trace!("<- POST {url} -> {status}");
        if status.is_server_error() {
            return Err(TransportError::ServiceUnavailable(status.to_string()));
        }
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        let bytes = response.bytes().await.map_err(classify_reqwest_error)?;
        serde_json::from_slice(&bytes).map_err(|err| TransportError::Decode(err.to_string()))
    }
}

#[async_trait]
impl SolverTransport for ReqwestTransport {
    async fn create_task(
        &self,
        request: &CreateTaskRequest,
    ) -> Result<CreateTaskResponse, TransportError> {
        self.post(&self.create_task_url, request, self.soft_id).await
    }

    async fn get_task_result(
        &self,
        task_id: TaskId,
    ) -> Result<TaskResultResponse, TransportError> {
        self.post(&self.get_task_result_url, &TaskIdBody { task_id }, None)
            .await
    }

    async fn get_balance(&self) -> Result<BalanceResponse, TransportError> {
        self.post(&self.get_balance_url, &EmptyBody {}, None).await
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("client_key", &"<redacted>")
            .field("soft_id", &self.soft_id)
            .field("create_task_url", &self.create_task_url.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Authenticated<'a, B: ?Sized> {
    client_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    soft_id: Option<u32>,
    #[serde(flatten)]
    body: &'a B,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskIdBody {
    task_id: TaskId,
}

#[derive(Serialize)]
struct EmptyBody {}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        TransportError::ServiceUnavailable(err.to_string())
    } else if err.is_decode() || err.is_body() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Http(err.to_string())
    }
}
