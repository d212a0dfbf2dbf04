use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Message shown to callers for every internal failure. Details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Coarse classification every service error maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Validation,
    Business,
    Authentication,
    Forbidden,
    Internal,
}

impl ErrorCategory {
    pub fn status(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation | Self::Business => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable title rendered as the `error` field.
    pub fn title(self) -> &'static str {
        match self {
            Self::NotFound => "Resource Not Found",
            Self::Validation => "Validation Failed",
            Self::Business => "Business Rule Violation",
            Self::Authentication => "Authentication Failed",
            Self::Forbidden => "Access Denied",
            Self::Internal => "Internal Server Error",
        }
    }

    pub fn default_code(self) -> &'static str {
        match self {
            Self::NotFound => "RESOURCE_NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::Business => "BUSINESS_RULE_VIOLATION",
            Self::Authentication => "AUTHENTICATION_FAILED",
            Self::Forbidden => "ACCESS_DENIED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub rejected_value: Option<serde_json::Value>,
}

/// Structured error body shared by every endpoint.
///
/// `into_response` renders the body without request context and stores a copy in the
/// response extensions; [`crate::middleware::error_context`] re-renders it with the
/// request path and method.
#[derive(Debug, Clone)]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    pub error_code: &'static str,
    pub validation_errors: Vec<FieldError>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            error_code: category.default_code(),
            validation_errors: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.error_code = code;
        self
    }

    pub fn with_validation_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.validation_errors = errors;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.category.status()
    }

    pub fn to_body(&self, path: &str, method: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "path": path,
            "method": method,
            "status": self.status().as_u16(),
            "error": self.category.title(),
            "message": self.message,
            "errorCode": self.error_code,
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        if !self.validation_errors.is_empty() {
            body["validationErrors"] = serde_json::json!(self.validation_errors);
        }
        body
    }
}

impl IntoResponse for ErrorPayload {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.to_body("", "");
        let mut response = (status, axum::Json(body)).into_response();
        response.extensions_mut().insert(self);
        response
    }
}
