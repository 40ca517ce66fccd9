//! Shared utilities for probing tests.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::Router;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// A request seen by a mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
}

struct MockState {
    status: u16,
    body: String,
    delay: Duration,
    requests: Vec<RecordedRequest>,
}

/// A local HTTP backend with a programmable response.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn respond(&self, status: u16, body: &str) {
        let mut state = self.state.lock();
        state.status = status;
        state.body = body.to_string();
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = delay;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }
}

/// Start a mock backend on an ephemeral port.
pub async fn start_mock_backend(status: u16, body: &str) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(Mutex::new(MockState {
        status,
        body: body.to_string(),
        delay: Duration::ZERO,
        requests: Vec::new(),
    }));

    let app = Router::new().fallback(handle).with_state(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend { addr, state }
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn handle(
    State(state): State<Arc<Mutex<MockState>>>,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let (status, body, delay) = {
        let mut state = state.lock();
        state.requests.push(RecordedRequest {
            path: uri.path().to_string(),
            authorization: header_value(header::AUTHORIZATION),
            user_agent: header_value(header::USER_AGENT),
        });
        (state.status, state.body.clone(), state.delay)
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    (StatusCode::from_u16(status).unwrap(), body)
}
