use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use capmonster_cloud::{
    CapMonsterClient, EventHandler, FunCaptchaTask, GeeTestTask, GeeTestVersion, ProxyType,
    SolveEvent, SolveOptions, SolverTransport, TaskId, TaskProxy, TransportError,
    transport::{
        BalanceResponse, CreateTaskRequest, CreateTaskResponse, ErrorInfo, TaskResultResponse,
    },
};
use serde_json::{Value, json};
use tokio::time::Instant;

/// Answers every task with a fixed solution after a per-task number of
/// not-ready polls.
struct FakeService {
    next_id: Mutex<u64>,
    solutions: Mutex<HashMap<u64, (u32, Value)>>,
    pending_polls: u32,
    created: Mutex<Vec<Value>>,
}

impl FakeService {
    fn new(pending_polls: u32) -> Arc<Self> {
        Arc::new(Self {
            next_id: Mutex::new(100),
            solutions: Mutex::new(HashMap::new()),
            pending_polls,
            created: Mutex::new(Vec::new()),
        })
    }

    fn created(&self) -> Vec<Value> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl SolverTransport for FakeService {
    async fn create_task(
        &self,
        request: &CreateTaskRequest,
    ) -> Result<CreateTaskResponse, TransportError> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = *next_id;
        let solution = match request.task["type"].as_str() {
            Some(kind) if kind.starts_with("FunCaptcha") => json!({ "token": format!("fc-{id}") }),
            _ => json!({
                "challenge": "0f759dd1ea6c4wc76cedc2991039ca4f23",
                "validate": "6275e26419211d1f526e674d97110e15",
                "seccode": "510cd9735583edcb158601067195a5eb|jordan"
            }),
        };
        self.solutions
            .lock()
            .unwrap()
            .insert(id, (self.pending_polls, solution));
        self.created.lock().unwrap().push(request.task.clone());
        Ok(CreateTaskResponse {
            error: ErrorInfo::default(),
            task_id: Some(TaskId(id)),
        })
    }

    async fn get_task_result(
        &self,
        task_id: TaskId,
    ) -> Result<TaskResultResponse, TransportError> {
        let mut solutions = self.solutions.lock().unwrap();
        let Some((remaining, solution)) = solutions.get_mut(&task_id.0) else {
            return Ok(TaskResultResponse::failed("ERROR_NO_SUCH_CAPCHA_ID"));
        };
        if *remaining > 0 {
            *remaining -= 1;
            return Ok(TaskResultResponse::processing());
        }
        Ok(TaskResultResponse::ready(solution.clone()))
    }

    async fn get_balance(&self) -> Result<BalanceResponse, TransportError> {
        Ok(BalanceResponse {
            error: ErrorInfo::default(),
            balance: Some(1.0),
        })
    }
}

#[derive(Default)]
struct EventLog(Mutex<Vec<String>>);

impl EventHandler for EventLog {
    fn handle(&self, event: &SolveEvent) {
        let entry = match event {
            SolveEvent::TaskCreated(e) => format!("created {}", e.task_type),
            SolveEvent::Poll(e) => format!("poll {} #{}", e.task_type, e.attempt),
            SolveEvent::Solved(e) => format!("solved {} after {}", e.task_type, e.attempts),
            SolveEvent::Failed(e) => format!("failed {} at {}", e.task_type, e.stage),
            SolveEvent::TimedOut(e) => format!("timed out {}", e.task_type),
        };
        self.0.lock().unwrap().push(entry);
    }
}

fn proxy() -> TaskProxy {
    TaskProxy::new(ProxyType::Socks5, "proxy.example.com", 1080).with_credentials("user", "pass")
}

#[tokio::test(start_paused = true)]
async fn concurrent_solves_share_one_client() {
    let service = FakeService::new(2);
    let client = CapMonsterClient::builder("key")
        .with_transport(service.clone())
        .build()
        .unwrap();

    let funcaptcha = FunCaptchaTask::proxyless(
        "https://funcaptcha.com/fc/api/nojs/?pkey=69A21A01-CC7B-B9C6-0F9A-E7FA06677FFC",
        "69A21A01-CC7B-B9C6-0F9A-E7FA06677FFC",
    );
    let geetest = GeeTestTask::proxyless(
        "https://www.geetest.com/en/demo",
        "022397c99c9f646f6477822485f30404",
    )
    .with_challenge("7f044f48bc951ecfbfc03842b5e1fe59");

    let started = Instant::now();
    let (fc, gt) = tokio::join!(client.solve(&funcaptcha), client.solve(&geetest));

    assert!(fc.unwrap().token.starts_with("fc-"));
    assert_eq!(
        gt.unwrap().validate.as_deref(),
        Some("6275e26419211d1f526e674d97110e15")
    );
    // Both variants poll after 1s and then every 1s; the third poll is ready.
    assert_eq!(started.elapsed(), Duration::from_secs(3));

    let snapshot = client.metrics().unwrap().snapshot();
    assert_eq!(snapshot.global.created, 2);
    assert_eq!(snapshot.global.solved, 2);
    assert_eq!(snapshot.task_type("GeeTestTaskProxyless").unwrap().polls, 2);
}

#[tokio::test(start_paused = true)]
async fn proxied_geetest_v4_is_sent_with_flattened_proxy() {
    let service = FakeService::new(0);
    let log = Arc::new(EventLog::default());
    let client = CapMonsterClient::builder("key")
        .with_transport(service.clone())
        .with_event_handler(log.clone())
        .disable_metrics()
        .build()
        .unwrap();

    let task = GeeTestTask::new(
        "https://www.geetest.com/en/adaptive-captcha-demo",
        "e392e1d7fd421dc63325744d5a2b9c73",
        proxy(),
    )
    .with_version(GeeTestVersion::V4)
    .with_init_parameter("riskType", json!("slide"))
    .with_user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64)");

    client.solve(&task).await.unwrap();

    let sent = &service.created()[0];
    assert_eq!(sent["type"], "GeeTestTask");
    assert_eq!(sent["version"], 4);
    assert_eq!(sent["proxyType"], "socks5");
    assert_eq!(sent["proxyAddress"], "proxy.example.com");
    assert_eq!(sent["proxyPort"], 1080);
    assert_eq!(sent["proxyLogin"], "user");
    assert_eq!(sent["initParameters"]["riskType"], "slide");
    assert!(sent.get("challenge").is_none());
    assert!(sent.get("nocache").is_none());

    assert_eq!(
        *log.0.lock().unwrap(),
        vec![
            "created GeeTestTask".to_string(),
            "solved GeeTestTask after 1".to_string()
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn no_cache_funcaptcha_waits_ten_seconds() {
    let service = FakeService::new(0);
    let client = CapMonsterClient::builder("key")
        .with_transport(service.clone())
        .build()
        .unwrap();
    let task = FunCaptchaTask::proxyless(
        "https://funcaptcha.com/fc/api/nojs/?pkey=69A21A01-CC7B-B9C6-0F9A-E7FA06677FFC",
        "69A21A01-CC7B-B9C6-0F9A-E7FA06677FFC",
    );

    let started = Instant::now();
    client
        .solve_with(&task, &SolveOptions::new().with_no_cache(true))
        .await
        .unwrap();

    assert_eq!(started.elapsed(), Duration::from_secs(10));
    assert_eq!(service.created()[0]["nocache"], true);
}

#[tokio::test(start_paused = true)]
async fn invalid_geetest_fails_before_creation() {
    let service = FakeService::new(0);
    let log = Arc::new(EventLog::default());
    let client = CapMonsterClient::builder("key")
        .with_transport(service.clone())
        .with_event_handler(log.clone())
        .build()
        .unwrap();

    let task = GeeTestTask::proxyless(
        "https://www.geetest.com/en/demo",
        "022397c99c9f646f6477822485f30404",
    );
    let err = client.solve(&task).await.unwrap_err();

    assert!(err.to_string().contains("challenge"));
    assert!(service.created().is_empty());
    assert_eq!(
        *log.0.lock().unwrap(),
        vec!["failed GeeTestTaskProxyless at validate".to_string()]
    );
    let snapshot = client.metrics().unwrap().snapshot();
    assert_eq!(snapshot.global.failed, 1);
}
