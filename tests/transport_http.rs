use std::time::Duration;

use capmonster_cloud::{
    CapMonsterClient, CapMonsterError, ClientConfig, ImageToTextTask, RemoteErrorKind,
    ReqwestTransport, SolveError, SolveStage, SolverTransport, TaskId, TransportError,
    transport::CreateTaskRequest,
};
use http::StatusCode;
use mockito::{Matcher, Server};
use serde_json::json;

const KEY: &str = "0123456789abcdef0123456789abcdef";

fn config_for(server: &Server) -> ClientConfig {
    ClientConfig::default()
        .with_base_url(&server.url())
        .unwrap()
        .with_request_timeout(Duration::from_secs(5))
}

fn image_request() -> CreateTaskRequest {
    CreateTaskRequest {
        task: json!({ "type": "ImageToTextTask", "body": "R0lGODlhAQABAAAAACw=" }),
        callback_url: None,
    }
}

#[tokio::test]
async fn create_task_injects_key_and_soft_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/createTask")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "clientKey": KEY,
            "softId": 58,
            "task": { "type": "ImageToTextTask" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"errorId":0,"taskId":7654321}"#)
        .expect(1)
        .create_async()
        .await;

    let transport = ReqwestTransport::new(KEY, &config_for(&server)).unwrap();
    let response = transport.create_task(&image_request()).await.unwrap();

    assert_eq!(response.task_id, Some(TaskId(7654321)));
    mock.assert_async().await;
}

#[tokio::test]
async fn task_result_request_carries_task_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/getTaskResult")
        .match_body(Matcher::Json(json!({ "clientKey": KEY, "taskId": 99 })))
        .with_status(200)
        .with_body(r#"{"errorId":0,"status":"processing"}"#)
        .create_async()
        .await;

    let transport = ReqwestTransport::new(KEY, &config_for(&server)).unwrap();
    let response = transport.get_task_result(TaskId(99)).await.unwrap();

    assert!(!response.error.is_error());
    assert!(response.solution.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_are_transient() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/getTaskResult")
        .with_status(503)
        .create_async()
        .await;

    let transport = ReqwestTransport::new(KEY, &config_for(&server)).unwrap();
    let err = transport.get_task_result(TaskId(1)).await.unwrap_err();

    assert!(err.is_transient());
    assert!(matches!(err, TransportError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn client_errors_are_hard_failures() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/getBalance")
        .with_status(401)
        .create_async()
        .await;

    let transport = ReqwestTransport::new(KEY, &config_for(&server)).unwrap();
    let err = transport.get_balance().await.unwrap_err();

    assert!(matches!(err, TransportError::Status(StatusCode::UNAUTHORIZED)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/createTask")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let transport = ReqwestTransport::new(KEY, &config_for(&server)).unwrap();
    let err = transport.create_task(&image_request()).await.unwrap_err();

    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn unreachable_host_is_transient() {
    let config = ClientConfig::default()
        .with_base_url("http://127.0.0.1:1/")
        .unwrap()
        .with_request_timeout(Duration::from_secs(2));
    let transport = ReqwestTransport::new(KEY, &config).unwrap();

    let err = transport.get_balance().await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn image_is_solved_end_to_end() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/createTask")
        .match_body(Matcher::PartialJson(json!({
            "clientKey": KEY,
            "task": { "type": "ImageToTextTask", "body": "R0lGODlhAQABAAAAACw=" }
        })))
        .with_status(200)
        .with_body(r#"{"errorId":0,"taskId":42}"#)
        .expect(1)
        .create_async()
        .await;
    let result = server
        .mock("POST", "/getTaskResult")
        .match_body(Matcher::PartialJson(json!({ "taskId": 42 })))
        .with_status(200)
        .with_body(r#"{"errorId":0,"status":"ready","solution":{"text":"answer"}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = CapMonsterClient::builder(KEY)
        .with_config(config_for(&server))
        .build()
        .unwrap();
    let solution = client
        .solve(&ImageToTextTask::new("R0lGODlhAQABAAAAACw="))
        .await
        .unwrap();

    assert_eq!(solution.text, "answer");
    create.assert_async().await;
    result.assert_async().await;

    let snapshot = client.metrics().unwrap().snapshot();
    let stats = snapshot.task_type("ImageToTextTask").unwrap();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.solved, 1);
}

#[tokio::test]
async fn rejected_key_surfaces_remote_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/createTask")
        .with_status(200)
        .with_body(
            r#"{"errorId":1,"errorCode":"ERROR_KEY_DOES_NOT_EXIST","errorDescription":"Account authorization key not found in the system"}"#,
        )
        .create_async()
        .await;

    let client = CapMonsterClient::builder(KEY)
        .with_config(config_for(&server))
        .build()
        .unwrap();
    let err = client
        .solve(&ImageToTextTask::new("R0lGODlhAQABAAAAACw="))
        .await
        .unwrap_err();

    let CapMonsterError::Solve(err) = err else {
        panic!("expected solve error, got {err:?}");
    };
    assert_eq!(err.stage(), SolveStage::CreateTask);
    assert_eq!(err.remote_kind(), Some(RemoteErrorKind::KeyDoesNotExist));
    assert!(matches!(
        err,
        SolveError::Remote { ref source, .. }
            if source.description.as_deref() == Some("Account authorization key not found in the system")
    ));
}

#[tokio::test]
async fn balance_is_read() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/getBalance")
        .match_body(Matcher::Json(json!({ "clientKey": KEY })))
        .with_status(200)
        .with_body(r#"{"errorId":0,"balance":345.678}"#)
        .create_async()
        .await;

    let client = CapMonsterClient::builder(KEY)
        .with_config(config_for(&server))
        .build()
        .unwrap();
    assert_eq!(client.get_balance().await.unwrap(), 345.678);
    mock.assert_async().await;
}
