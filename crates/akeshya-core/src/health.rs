use std::future::Future;

use axum::extract::State;
use axum::http::StatusCode;

/// Dependency check backing `GET /readyz`.
pub trait ReadinessProbe: Clone + Send + Sync + 'static {
    fn ready(&self) -> impl Future<Output = bool> + Send;
}

/// Liveness handler for `GET /healthz`.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz`. Returns 503 until the probe reports ready.
pub async fn readyz<S: ReadinessProbe>(State(state): State<S>) -> StatusCode {
    if state.ready().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
