use axum::extract::Request;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use uuid::Uuid;

use crate::error::{ErrorCategory, ErrorPayload};

pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Clone, Default)]
pub struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build the request-id layer. Apply with `.layer(request_id_layer())` in router.
pub fn request_id_layer() -> SetRequestIdLayer<MakeUuidRequestId> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeUuidRequestId)
}

/// Re-render error bodies with the request path and method.
///
/// Apply with `.layer(axum::middleware::from_fn(error_context))`. Responses without an
/// [`ErrorPayload`] extension pass through untouched.
pub async fn error_context(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let method = request.method().to_string();

    let mut response = next.run(request).await;
    let Some(payload) = response.extensions_mut().remove::<ErrorPayload>() else {
        return response;
    };

    if payload.category != ErrorCategory::Internal {
        tracing::warn!(
            %method,
            %path,
            kind = payload.error_code,
            message = %payload.message,
            "request rejected"
        );
    }

    let (parts, _) = response.into_parts();
    let mut rendered =
        (parts.status, axum::Json(payload.to_body(&path, &method))).into_response();
    for (name, value) in parts.headers.iter() {
        if name != CONTENT_LENGTH && name != CONTENT_TYPE {
            rendered.headers_mut().append(name.clone(), value.clone());
        }
    }
    rendered
}
