//! End-to-end tests for the thread endpoint against a stubbed posting API.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use xthread_lib::client::{Account, CreatedPost, Session};
use xthread_lib::{ApiError, Connector, PostOptions, PostingApi};
use xthread_web::{build_router, AppState};

// =============================================================================
// Stub API
// =============================================================================

type Calls = Arc<Mutex<Vec<(String, Option<String>)>>>;

struct StubApi {
    calls: Calls,
    fail_on: Option<usize>,
}

#[async_trait]
impl PostingApi for StubApi {
    async fn me(&self) -> Result<Account, ApiError> {
        Ok(Account {
            id: "1".to_string(),
            name: "Stub".to_string(),
            username: "stubuser".to_string(),
        })
    }

    async fn create_post(
        &self,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<CreatedPost, ApiError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((text.to_string(), reply_to.map(str::to_string)));
        let number = calls.len();

        if self.fail_on == Some(number) {
            return Err(ApiError::Decode("duplicate content".to_string()));
        }

        Ok(CreatedPost {
            id: (1000 + number).to_string(),
            text: text.to_string(),
        })
    }
}

/// Shared counters for one test.
#[derive(Default)]
struct StubState {
    connects: AtomicUsize,
    calls: Calls,
}

struct StubConnector {
    state: Arc<StubState>,
    fail_auth: bool,
    fail_on: Option<usize>,
}

#[async_trait]
impl Connector for StubConnector {
    async fn connect(&self) -> Result<Session, ApiError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);

        if self.fail_auth {
            return Err(ApiError::MissingCredential("TWITTER_API_KEY"));
        }

        Ok(Session {
            api: Box::new(StubApi {
                calls: self.state.calls.clone(),
                fail_on: self.fail_on,
            }),
            username: "stubuser".to_string(),
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Start the app on a random port.
async fn start_app(fail_auth: bool, fail_on: Option<usize>) -> (SocketAddr, Arc<StubState>) {
    let stub = Arc::new(StubState::default());
    let connector = StubConnector {
        state: stub.clone(),
        fail_auth,
        fail_on,
    };
    let options = PostOptions {
        status_url_base: "https://twitter.com".to_string(),
        delay: Duration::ZERO,
    };
    let app = build_router(Arc::new(AppState::new(Arc::new(connector), options)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, stub)
}

async fn post_json(addr: SocketAddr, body: Value) -> Value {
    let response = reqwest::Client::new()
        .post(format!("http://{}/post-thread", addr))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.json().await.expect("Response is not JSON")
}

fn log_lines(body: &Value) -> Vec<String> {
    body["log"]
        .as_array()
        .expect("log is an array")
        .iter()
        .map(|v| v.as_str().unwrap_or_default().to_string())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_missing_thread_text() {
    let (addr, stub) = start_app(false, None).await;

    for body in [json!({}), json!({ "thread_text": "" }), json!({ "thread_text": null })] {
        let result = post_json(addr, body).await;
        assert_eq!(result["success"], json!(false));
        assert_eq!(log_lines(&result), vec!["Error: No thread text provided."]);
    }

    assert_eq!(stub.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_whitespace_input_makes_no_api_calls() {
    let (addr, stub) = start_app(false, None).await;

    let result = post_json(addr, json!({ "thread_text": "   \n\n  \t " })).await;

    assert_eq!(result["success"], json!(false));
    assert_eq!(log_lines(&result), vec!["Error: Input is empty or invalid."]);
    assert_eq!(stub.connects.load(Ordering::SeqCst), 0);
    assert!(stub.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_auth_failure_single_log_entry() {
    let (addr, stub) = start_app(true, None).await;

    let result = post_json(addr, json!({ "thread_text": "1/ Hello\n2/ World" })).await;

    assert_eq!(result["success"], json!(false));
    let log = log_lines(&result);
    assert_eq!(log.len(), 1);
    assert_eq!(
        log[0],
        "❌ Authentication Error: TWITTER_API_KEY is not set. Check your API keys and permissions in your environment variables."
    );
    assert_eq!(stub.connects.load(Ordering::SeqCst), 1);
    assert!(stub.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_two_posts_chain_replies() {
    let (addr, stub) = start_app(false, None).await;

    let result = post_json(addr, json!({ "thread_text": "1/ Hello\n2/ World" })).await;

    assert_eq!(result["success"], json!(true));
    assert_eq!(
        *stub.calls.lock().unwrap(),
        vec![
            ("Hello".to_string(), None),
            ("World".to_string(), Some("1001".to_string())),
        ]
    );

    let log = log_lines(&result);
    assert_eq!(
        log,
        vec![
            "Posting tweet 1/2: \"Hello...\"",
            "✅ Success! URL: https://twitter.com/stubuser/status/1001",
            "Posting tweet 2/2: \"World...\"",
            "✅ Success! URL: https://twitter.com/stubuser/status/1002",
            "\n🎉 Full thread posted successfully!",
        ]
    );
}

#[tokio::test]
async fn test_mid_thread_failure_halts() {
    let (addr, stub) = start_app(false, Some(2)).await;

    let result = post_json(addr, json!({ "thread_text": "1/ One\n2/ Two\n3/ Three" })).await;

    assert_eq!(result["success"], json!(false));
    assert_eq!(stub.calls.lock().unwrap().len(), 2);

    let log = log_lines(&result);
    let count = |prefix: &str| log.iter().filter(|l| l.starts_with(prefix)).count();
    assert_eq!(count("✅ Success!"), 1);
    assert_eq!(count("❌ Error on tweet 2: unexpected response: duplicate content"), 1);
    assert_eq!(count("🛑 Halting thread due to error."), 1);
    assert!(!log.iter().any(|l| l.contains("Three") || l.contains("3/3")));
}

#[tokio::test]
async fn test_index_page_served() {
    let (addr, _) = start_app(false, None).await;
    let client = reqwest::Client::new();

    let page = client
        .get(format!("http://{}/", addr))
        .send()
        .await
        .unwrap();
    assert!(page.status().is_success());
    let content_type = page.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    assert!(page.text().await.unwrap().contains("thread-input"));

    let script = client
        .get(format!("http://{}/static/script.js", addr))
        .send()
        .await
        .unwrap();
    assert!(script.status().is_success());
    assert!(script.text().await.unwrap().contains("/post-thread"));
}

#[tokio::test]
async fn test_health() {
    let (addr, _) = start_app(false, None).await;

    let body: Value = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({ "status": "ok" }));
}
