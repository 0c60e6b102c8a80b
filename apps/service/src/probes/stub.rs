//! Throwaway HTTP server answering every POST with a canned JSON body.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Json, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use serde_json::Value;
use url::Url;

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: Arc<str>,
    requests: Arc<Mutex<Vec<Value>>>,
}

pub(crate) struct StubServer {
    url: Url,
    requests: Arc<Mutex<Vec<Value>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    pub(crate) async fn start(status: u16, body: impl Into<String>) -> Self {
        let state = StubState {
            status: StatusCode::from_u16(status).unwrap(),
            body: Arc::from(body.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();

        let app = Router::new().route("/", post(respond)).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { url: Url::parse(&format!("http://{addr}/")).unwrap(), requests, _handle: handle }
    }

    pub(crate) fn url(&self) -> Url {
        self.url.clone()
    }

    /// Request bodies received so far.
    pub(crate) fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn respond(State(stub): State<StubState>, Json(request): Json<Value>) -> impl IntoResponse {
    stub.requests.lock().unwrap().push(request);
    (stub.status, [(header::CONTENT_TYPE, "application/json")], stub.body.to_string())
}
