//! Shared harness for integration tests: boots a real server on an
//! ephemeral port with a throwaway data directory, and provides a minimal
//! SSE client for asserting on pushed events.

#![allow(dead_code)]

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use serde_json::json;

use mmgh_server::auth::jwt;
use mmgh_server::db;
use mmgh_server::mailer::LogMailer;
use mmgh_server::push::registry::ConnectionRegistry;
use mmgh_server::routes;
use mmgh_server::state::AppState;

pub struct TestServer {
    pub base_url: String,
    pub jwt_secret: Vec<u8>,
    pub registry: Arc<ConnectionRegistry>,
    _data_dir: tempfile::TempDir,
}

impl TestServer {
    pub fn admin_token(&self) -> String {
        jwt::issue_token(&self.jwt_secret, "admin-1", "root", "admin").expect("token")
    }

    pub fn token_for(&self, user_id: &str, username: &str, role: &str) -> String {
        jwt::issue_token(&self.jwt_secret, user_id, username, role).expect("token")
    }
}

pub async fn start_server() -> TestServer {
    let data_dir = tempfile::tempdir().expect("tempdir");
    let dir = data_dir.path().to_str().expect("utf8 path").to_string();

    let db = db::init_db(&dir).expect("db init");
    let jwt_secret = jwt::load_or_generate_jwt_secret(&dir).expect("jwt key");
    let registry = Arc::new(ConnectionRegistry::new());

    let state = AppState {
        db,
        jwt_secret: jwt_secret.clone(),
        registry: registry.clone(),
        mailer: Arc::new(LogMailer::new(None)),
        admin_email: "admin@example.test".to_string(),
        app_url: "http://localhost:3000".to_string(),
    };

    let app = routes::build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    TestServer {
        base_url: format!("http://{}", addr),
        jwt_secret,
        registry,
        _data_dir: data_dir,
    }
}

/// Register a pending account and return the created user's id.
pub async fn signup(base_url: &str, username: &str, email: &str) -> String {
    let resp = reqwest::Client::new()
        .post(format!("{base_url}/api/auth/signup"))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "hunter22",
            "fullName": format!("Test {username}"),
        }))
        .send()
        .await
        .expect("signup request");
    assert_eq!(resp.status(), 200, "signup should succeed");
    let body: serde_json::Value = resp.json().await.expect("signup body");
    body["user"]["id"]
        .as_str()
        .expect("user id in signup response")
        .to_string()
}

/// Poll a condition until it holds, failing the test after two seconds.
pub async fn wait_until<F: Fn() -> bool>(what: &str, cond: F) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {what}");
}

pub struct SseFrame {
    pub event: String,
    pub data: serde_json::Value,
}

/// Minimal SSE reader over a reqwest byte stream. Frames are separated by
/// blank lines; comment-only frames (keep-alives) are skipped.
pub struct SseClient {
    stream: Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>,
    buf: String,
}

impl SseClient {
    pub async fn connect(url: &str) -> Self {
        let resp = reqwest::get(url).await.expect("sse connect");
        assert!(resp.status().is_success(), "sse endpoint should accept");
        Self {
            stream: Box::pin(resp.bytes_stream()),
            buf: String::new(),
        }
    }

    /// Next event frame, or panic after five seconds.
    pub async fn next_event(&mut self) -> SseFrame {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(frame) = self.pop_frame() {
                    return frame;
                }
                let chunk = self
                    .stream
                    .next()
                    .await
                    .expect("sse stream ended")
                    .expect("sse read");
                self.buf.push_str(&String::from_utf8_lossy(&chunk));
            }
        })
        .await
        .expect("timed out waiting for sse event")
    }

    /// Assert the stream is still open: a short poll must either time out
    /// (no traffic) or yield more bytes, never report end-of-stream.
    pub async fn assert_open(&mut self) {
        match tokio::time::timeout(Duration::from_millis(300), self.stream.next()).await {
            Err(_) => {}
            Ok(Some(chunk)) => {
                let chunk = chunk.expect("sse read");
                self.buf.push_str(&String::from_utf8_lossy(&chunk));
            }
            Ok(None) => panic!("server closed the sse stream"),
        }
    }

    fn pop_frame(&mut self) -> Option<SseFrame> {
        loop {
            let end = self.buf.find("\n\n")?;
            let raw: String = self.buf.drain(..end + 2).collect();

            let mut event = String::new();
            let mut data = String::new();
            for line in raw.lines() {
                if let Some(rest) = line.strip_prefix("event:") {
                    event = rest.trim().to_string();
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data.push_str(rest.trim_start());
                }
            }
            if event.is_empty() && data.is_empty() {
                continue;
            }
            let data = serde_json::from_str(&data).unwrap_or(serde_json::Value::Null);
            return Some(SseFrame { event, data });
        }
    }
}
