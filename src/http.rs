//! HTTP transport - exposes the dispatcher over axum.
//!
//! Requires the `http` feature.
//!
//! ## Routes
//!
//! Every route accepts GET and POST and reads its arguments from the query
//! string. Domain outcomes are always `200 OK`:
//!
//! - `/resources/get` -> `{ code: display name, ... }`
//! - `/send/message?resource=..&message=..` -> `true` / `false`
//! - `/browse/list?resource=..` -> `{ "1": body, "2": body, ... }`
//! - `/purge/messages?resource=..` -> `true` / `false`
//! - `/health` -> `{ "ok": true, "resources": n }`
//!
//! A missing `resource` behaves like an unknown code. Dispatcher calls block
//! on broker receives, so they run on the blocking thread pool.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jms_toolkit::{http, Dispatcher};
//!
//! let dispatcher = Arc::new(Dispatcher::bootstrap(factory, directory, config));
//! http::serve(dispatcher, "0.0.0.0:8080").await?;
//! ```

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::dispatcher::Dispatcher;

#[derive(Debug, Deserialize)]
struct ResourceParams {
    resource: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendParams {
    resource: Option<String>,
    message: String,
}

/// Build an axum `Router` over the given dispatcher.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/resources/get", get(resources_handler).post(resources_handler))
        .route("/send/message", get(send_handler).post(send_handler))
        .route("/browse/list", get(browse_handler).post(browse_handler))
        .route("/purge/messages", get(purge_handler).post(purge_handler))
        .with_state(dispatcher)
}

/// Serve the dispatcher over HTTP at the given address (e.g. `"0.0.0.0:8080"`).
pub async fn serve(dispatcher: Arc<Dispatcher>, addr: &str) -> Result<(), std::io::Error> {
    let app = router(dispatcher);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// Run a blocking dispatcher call off the async runtime.
async fn blocking<T, F>(dispatcher: Arc<Dispatcher>, call: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce(&Dispatcher) -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(move || call(&dispatcher)).await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => {
            error!(error = %e, "dispatcher task failed");
            let body = json!({ "error": e.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// `GET /health` returns `{ "ok": true, "resources": n }`.
async fn health_handler(State(dispatcher): State<Arc<Dispatcher>>) -> impl IntoResponse {
    Json(json!({ "ok": true, "resources": dispatcher.directory().len() }))
}

async fn resources_handler(State(dispatcher): State<Arc<Dispatcher>>) -> impl IntoResponse {
    Json(dispatcher.list_resources())
}

async fn send_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    Query(params): Query<SendParams>,
) -> Response {
    debug!(resource = ?params.resource, message = %params.message, "send request");
    blocking(dispatcher, move |d| {
        d.send_to(params.resource.as_deref(), &params.message)
    })
    .await
}

async fn browse_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    Query(params): Query<ResourceParams>,
) -> Response {
    debug!(resource = ?params.resource, "browse request");
    blocking(dispatcher, move |d| d.browse(params.resource.as_deref())).await
}

async fn purge_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    Query(params): Query<ResourceParams>,
) -> Response {
    debug!(resource = ?params.resource, "purge request");
    blocking(dispatcher, move |d| d.purge(params.resource.as_deref())).await
}
