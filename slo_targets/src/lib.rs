//! In-process stand-in for a Graphite render API.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Step between two generated datapoints, in seconds.
pub const SAMPLE_STEP: i64 = 300;

#[derive(Debug, Clone, Serialize)]
pub struct RecordedRequest {
    pub query: HashMap<String, String>,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub user_agent: Option<String>,
}

struct FakeState {
    status: StatusCode,
    body: String,
    requests: RwLock<Vec<RecordedRequest>>,
}

#[derive(Clone)]
pub struct FakeGraphite {
    state: Arc<FakeState>,
}

impl FakeGraphite {
    /// Serves `body` as JSON from `/render` with status 200.
    pub fn new(body: Value) -> Self {
        Self::with_raw_body(StatusCode::OK, body.to_string())
    }

    pub fn with_raw_body(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            state: Arc::new(FakeState {
                status,
                body: body.into(),
                requests: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/render", get(render))
            .with_state(self.clone())
    }

    /// Binds an ephemeral local port and serves in the background.
    pub async fn spawn(&self) -> anyhow::Result<SocketAddr> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = self.router();

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!("Fake Graphite server stopped: {}", e);
            }
        });

        Ok(addr)
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.read().await.clone()
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn render(
    State(fake): State<FakeGraphite>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    info!("Render request: {:?}", query);

    fake.state.requests.write().await.push(RecordedRequest {
        query,
        accept: header_str(header::ACCEPT),
        content_type: header_str(header::CONTENT_TYPE),
        user_agent: header_str(header::USER_AGENT),
    });

    (
        fake.state.status,
        [(header::CONTENT_TYPE, "application/json")],
        fake.state.body.clone(),
    )
}

/// Twelve five-minute samples of `target` ending at `end`; the last
/// seven are null, as Graphite reports a collector that stopped writing.
pub fn sample_series(target: &str, end: i64) -> Value {
    let values = [
        Some(15281600.0),
        Some(15276100.0),
        Some(15277800.0),
        Some(15269300.0),
        Some(15293800.0),
        None,
        None,
        None,
        None,
        None,
        None,
        None,
    ];

    let start = end - SAMPLE_STEP * (values.len() as i64 - 1);
    let datapoints: Vec<Value> = values
        .iter()
        .enumerate()
        .map(|(i, v)| json!([v, start + SAMPLE_STEP * i as i64]))
        .collect();

    json!([{ "target": target, "datapoints": datapoints }])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_series_shape() {
        let series = sample_series("a.b.c", 1612261200);
        let datapoints = series[0]["datapoints"].as_array().unwrap();

        assert_eq!(series[0]["target"], "a.b.c");
        assert_eq!(datapoints.len(), 12);
        assert_eq!(datapoints[0][1], 1612257900);
        assert_eq!(datapoints[11][1], 1612261200);
        assert!(datapoints[11][0].is_null());
    }

    #[tokio::test]
    async fn test_spawn_records_requests() {
        let fake = FakeGraphite::new(json!([]));
        let addr = fake.spawn().await.unwrap();

        let stream = tokio::net::TcpStream::connect(addr).await;
        assert!(stream.is_ok());
        assert!(fake.requests().await.is_empty());
    }
}
