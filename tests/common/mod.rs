use std::sync::{Arc, Mutex, RwLock};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

/// In-process stand-in for both the watched listing page and the message
/// API. Serves `/listing` from a mutable body, answers `/channels/{id}`
/// with a text channel (id `voice` is not text-capable, `broken` accepts
/// resolution but fails posts), and records posted message contents.
pub struct MockServer {
    pub base_url: String,
    pub listing: Arc<RwLock<String>>,
    pub posted: Arc<Mutex<Vec<String>>>,
    _rt: tokio::runtime::Runtime,
}

#[derive(Clone)]
struct MockState {
    listing: Arc<RwLock<String>>,
    posted: Arc<Mutex<Vec<String>>>,
}

pub fn spawn(initial_listing: &str) -> Result<MockServer> {
    let state = MockState {
        listing: Arc::new(RwLock::new(initial_listing.to_string())),
        posted: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route("/listing", get(serve_listing))
        .route("/channels/:id", get(channel_info))
        .route("/channels/:id/messages", post(create_message))
        .with_state(state.clone());

    let rt = tokio::runtime::Runtime::new().context("create runtime")?;
    let listener = rt
        .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
        .context("bind mock server")?;
    let addr = listener.local_addr().context("mock server addr")?;
    rt.spawn(async move {
        axum::serve(listener, app).await.expect("serve mock");
    });

    Ok(MockServer {
        base_url: format!("http://{addr}"),
        listing: state.listing,
        posted: state.posted,
        _rt: rt,
    })
}

impl MockServer {
    pub fn listing_url(&self) -> String {
        format!("{}/listing", self.base_url)
    }

    pub fn set_listing(&self, body: &str) {
        *self.listing.write().expect("listing lock") = body.to_string();
    }

    pub fn posted(&self) -> Vec<String> {
        self.posted.lock().expect("posted lock").clone()
    }
}

async fn serve_listing(State(state): State<MockState>) -> String {
    state.listing.read().expect("listing lock").clone()
}

async fn channel_info(Path(id): Path<String>) -> (StatusCode, Json<serde_json::Value>) {
    match id.as_str() {
        "voice" => (
            StatusCode::OK,
            Json(serde_json::json!({ "type": 2, "name": "voice" })),
        ),
        "unknown" => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "message": "Unknown Channel" })),
        ),
        _ => (
            StatusCode::OK,
            Json(serde_json::json!({ "type": 0, "name": "mirror-updates" })),
        ),
    }
}

async fn create_message(
    Path(id): Path<String>,
    State(state): State<MockState>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    if id == "broken" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "message": "send failed" })),
        );
    }
    let content = body["content"].as_str().unwrap_or_default().to_string();
    state.posted.lock().expect("posted lock").push(content);
    (StatusCode::OK, Json(serde_json::json!({ "id": "1" })))
}
