//! Integration tests for `PracticumClient` against a throwaway local HTTP server.
//!
//! Each test binds an ephemeral port, serves exactly one canned response and
//! inspects the raw request the client sent.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use verdict_common::error::RelayError;
use verdict_tracker::client::{PracticumClient, ReviewSource};
use verdict_tracker::{validate, verdict};

const TOKEN: &str = "y0_practicum_token";
const PATH: &str = "/api/user_api/homework_statuses/";

/// Serve one response and return the endpoint URL plus a handle yielding the request.
async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_head(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{addr}{PATH}"), handle)
}

/// Read a GET request up to the end of its headers.
async fn read_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn client(endpoint: &str) -> PracticumClient {
    PracticumClient::new(endpoint, TOKEN, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_token_and_cursor() {
    let (endpoint, server) = respond_once(
        "200 OK",
        r#"{"homeworks":[{"homework_name":"hw1","status":"approved"}],"current_date":1700000100}"#,
    )
    .await;

    let response = client(&endpoint).fetch_review_status(1700000000).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with(&format!("GET {PATH}?from_date=1700000000 HTTP/1.1")));
    assert!(
        request
            .to_ascii_lowercase()
            .contains(&format!("authorization: oauth {}", TOKEN.to_ascii_lowercase()))
    );

    // The decoded payload feeds straight into validation and interpretation.
    let homeworks = validate::check_response(&response).unwrap();
    assert_eq!(validate::current_date(&response), Some(1700000100));
    assert_eq!(
        verdict::describe_verdict(&homeworks[0]).unwrap(),
        "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!"
    );
}

#[tokio::test]
async fn test_fetch_non_ok_status_is_unreachable() {
    let (endpoint, _server) = respond_once(
        "503 Service Unavailable",
        r#"{"homeworks":[],"current_date":1700000200}"#,
    )
    .await;

    let err = client(&endpoint).fetch_review_status(1700000000).await.unwrap_err();
    assert!(matches!(err, RelayError::Unreachable { status: 503, .. }));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_fetch_non_ok_success_status_is_unreachable() {
    let (endpoint, _server) = respond_once(
        "202 Accepted",
        r#"{"homeworks":[],"current_date":1700000200}"#,
    )
    .await;

    let err = client(&endpoint).fetch_review_status(0).await.unwrap_err();
    assert!(matches!(err, RelayError::Unreachable { status: 202, .. }));
}

#[tokio::test]
async fn test_fetch_malformed_json() {
    let (endpoint, _server) = respond_once("200 OK", "<html>maintenance</html>").await;

    let err = client(&endpoint).fetch_review_status(1700000000).await.unwrap_err();
    assert!(matches!(err, RelayError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_fetch_connection_refused_is_transport() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = format!("http://{addr}{PATH}");
    let err = client(&endpoint).fetch_review_status(1700000000).await.unwrap_err();

    match err {
        RelayError::Transport { ref request, .. } => {
            assert_eq!(request, &format!("GET {endpoint}?from_date=1700000000"));
        }
        ref other => panic!("expected transport error, got {other:?}"),
    }
    assert!(!err.to_string().contains(TOKEN));
}

#[tokio::test]
async fn test_fetch_unusable_endpoint_is_internal() {
    let err = client("not a url").fetch_review_status(1700000000).await.unwrap_err();
    assert!(matches!(err, RelayError::Internal(_)));
    assert!(!err.is_recoverable());
}
