//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::computation::{compute_staff_payroll, execute_payroll_run};
use crate::expr::parse;
use crate::models::{PayPeriod, StaffComputationInput};

use super::request::{
    ComputationRequest, FormulaValidationRequest, PayPeriodRequest, RunRequest,
};
use super::response::{ApiError, ApiErrorResponse, FormulaValidationResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/compute", post(compute_handler))
        .route("/runs", post(run_handler))
        .route("/formulas/validate", post(validate_formula_handler))
        .with_state(state)
}

/// Handler for POST /compute endpoint.
///
/// Accepts a single-staff computation request and returns the computed
/// payslip values with their audit trace.
async fn compute_handler(
    State(state): State<AppState>,
    payload: Result<Json<ComputationRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing computation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                rejection_to_error(correlation_id, rejection),
            );
        }
    };

    if let Some(error) = validate_period(&request.period) {
        return error_response(StatusCode::BAD_REQUEST, error);
    }

    let period: PayPeriod = request.period.into();
    let input: StaffComputationInput = request.staff.into();

    match compute_staff_payroll(
        state.snapshot(),
        request.client_id.as_deref(),
        period,
        &input,
    ) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                staff_id = %result.staff_id,
                net_pay = %result.values.net_pay,
                duration_us = result.audit_trace.duration_us,
                "Computation completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(result),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Computation failed"
            );
            let api_error: ApiErrorResponse = err.into();
            error_response(api_error.status, api_error.error)
        }
    }
}

/// Handler for POST /runs endpoint.
///
/// Accepts a batch run request and executes it on a blocking worker so the
/// computation threads never stall the async runtime.
async fn run_handler(
    State(state): State<AppState>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll run request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                rejection_to_error(correlation_id, rejection),
            );
        }
    };

    if let Some(error) = validate_period(&request.period) {
        return error_response(StatusCode::BAD_REQUEST, error);
    }

    let period: PayPeriod = request.period.into();
    let client_id = request.client_id;
    let staff: Vec<StaffComputationInput> =
        request.staff.into_iter().map(Into::into).collect();
    let timeout = request.timeout_ms.map(Duration::from_millis);
    let staff_count = staff.len();

    let run = tokio::task::spawn_blocking(move || {
        execute_payroll_run(
            state.snapshot(),
            client_id.as_deref(),
            period,
            &staff,
            timeout,
        )
    })
    .await;

    match run {
        Ok(run) => {
            info!(
                correlation_id = %correlation_id,
                run_id = %run.run_id,
                staff = staff_count,
                succeeded = run.summary.succeeded,
                failed = run.summary.failed.len(),
                "Payroll run completed"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(run),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Payroll run aborted"
            );
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("CALCULATION_ERROR", "Payroll run was aborted"),
            )
        }
    }
}

/// Handler for POST /formulas/validate endpoint.
///
/// Parses the submitted expression and reports the variables and component
/// codes it references. Invalid expressions come back as a 200 with
/// `valid: false`; only a malformed request is an error.
async fn validate_formula_handler(
    payload: Result<Json<FormulaValidationRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                rejection_to_error(correlation_id, rejection),
            );
        }
    };

    let code = request.formula_code.as_deref().unwrap_or("adhoc");
    let response = match parse(&request.expression, code) {
        Ok(expr) => {
            info!(
                correlation_id = %correlation_id,
                formula_code = %code,
                "Formula validated"
            );
            FormulaValidationResponse {
                valid: true,
                variables: expr.variables().into_iter().collect(),
                components: expr.component_refs().into_iter().collect(),
                error: None,
            }
        }
        Err(err) => {
            info!(
                correlation_id = %correlation_id,
                formula_code = %code,
                error = %err,
                "Formula rejected"
            );
            FormulaValidationResponse {
                valid: false,
                variables: Vec::new(),
                components: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(response),
    )
        .into_response()
}

/// Checks the calendar fields of a period request.
fn validate_period(period: &PayPeriodRequest) -> Option<ApiError> {
    if !(1..=12).contains(&period.month) {
        return Some(ApiError::validation_error(format!(
            "month must be between 1 and 12, got {}",
            period.month
        )));
    }
    None
}

/// Renders an error body with the standard content type.
fn error_response(status: StatusCode, error: ApiError) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response()
}

/// Maps a JSON extractor rejection onto an API error body.
fn rejection_to_error(correlation_id: Uuid, rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            // Check if it's a missing field error
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => ApiError::new(
            "MISSING_CONTENT_TYPE",
            "Content-Type must be application/json",
        ),
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}
