//! Response types for the payroll engine API.
//!
//! This module defines the error response structures, the formula
//! validation response, and the mapping from engine errors to HTTP
//! statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// Response body for the `/formulas/validate` endpoint.
///
/// Validation never fails the request: a syntactically invalid expression
/// comes back as `valid: false` with the parser diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaValidationResponse {
    /// Whether the expression parsed.
    pub valid: bool,
    /// Context variables the expression reads, sorted.
    #[serde(default)]
    pub variables: Vec<String>,
    /// Component codes the expression looks up directly, sorted.
    #[serde(default)]
    pub components: Vec<String>,
    /// The parser diagnostic when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        // Errors raised by the request payload are the caller's to fix;
        // everything else points at the rule set or the engine itself.
        let status = match &error {
            EngineError::UnknownComponent { .. }
            | EngineError::UnresolvedVariable { .. }
            | EngineError::DivisionByZero { .. }
            | EngineError::InvalidAttendancePeriod { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = if error.is_configuration_error() {
            ApiError::with_details(error.kind(), "Payroll rule set error", error.to_string())
        } else {
            ApiError::new(error.kind(), error.to_string())
        };

        ApiErrorResponse {
            status,
            error: body,
        }
    }
}
