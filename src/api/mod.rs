//! HTTP API module for the payroll engine.
//!
//! This module provides the REST API endpoints for computing staff pay
//! under the Nigeria PAYE rules.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AttendanceRequest, ComputationRequest, FormulaValidationRequest, PayPeriodRequest,
    RunRequest, StaffRequest,
};
pub use response::{ApiError, ApiErrorResponse, FormulaValidationResponse};
pub use state::AppState;
