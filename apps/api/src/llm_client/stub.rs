//! Local stand-in for the Messages endpoint, for exercising `LlmClient` end to end.

use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

use super::LlmClient;

#[derive(Clone)]
struct StubState {
    failures: usize,
    failure_status: StatusCode,
    reply: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// A running stub. The first `failures` requests get `failure_status`; the
/// rest get a single text block holding `reply`.
pub struct StubServer {
    pub client: LlmClient,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl StubServer {
    pub async fn start(failures: usize, failure_status: StatusCode, reply: &str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            failures,
            failure_status,
            reply: reply.to_string(),
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/v1/messages", post(messages))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client =
            LlmClient::with_endpoint("test-key".to_string(), format!("http://{addr}/v1/messages"))
                .unwrap();
        Self { client, requests }
    }

    /// Request bodies received so far, in arrival order.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn messages(State(state): State<StubState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let seen = {
        let mut requests = state.requests.lock().unwrap();
        requests.push(body);
        requests.len()
    };

    if seen <= state.failures {
        return (
            state.failure_status,
            Json(json!({"error": {"type": "overloaded_error", "message": "stub failure"}})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "content": [{"type": "text", "text": state.reply}],
            "usage": {"input_tokens": 21, "output_tokens": 8}
        })),
    )
}
