//! Request types for the payroll engine API.
//!
//! This module defines the JSON request structures for the `/compute`,
//! `/runs` and `/formulas/validate` endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{AttendanceRecord, PayGrade, PayPeriod, StaffComputationInput};

/// Request body for the `/compute` endpoint.
///
/// Contains everything needed to compute one staff member's payroll for a
/// period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationRequest {
    /// Client whose formula overrides apply, if any.
    #[serde(default)]
    pub client_id: Option<String>,
    /// The pay period for the computation.
    pub period: PayPeriodRequest,
    /// The staff member to compute.
    pub staff: StaffRequest,
}

/// Request body for the `/runs` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Client whose formula overrides apply, if any.
    #[serde(default)]
    pub client_id: Option<String>,
    /// The pay period for the run.
    pub period: PayPeriodRequest,
    /// The staff list, in the order results should come back.
    pub staff: Vec<StaffRequest>,
    /// Deadline in milliseconds; staff not started by then are reported
    /// as not computed.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Staff information in a computation or run request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRequest {
    /// Unique identifier for the staff member.
    pub staff_id: String,
    /// Annual amount per component code.
    pub emoluments: HashMap<String, Decimal>,
    /// Attendance for the period.
    pub attendance: AttendanceRequest,
}

/// Attendance information in a computation or run request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// Working days the staff member was present.
    pub days_present: u32,
    /// Working days in the period.
    pub total_days: u32,
}

/// Pay period information in a computation or run request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPeriodRequest {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1 to 12.
    pub month: u32,
}

/// Request body for the `/formulas/validate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaValidationRequest {
    /// Code to label diagnostics with; defaults to "adhoc".
    #[serde(default)]
    pub formula_code: Option<String>,
    /// The expression to check.
    pub expression: String,
}

impl From<StaffRequest> for StaffComputationInput {
    fn from(req: StaffRequest) -> Self {
        StaffComputationInput {
            staff_id: req.staff_id,
            pay_grade: PayGrade::new(req.emoluments),
            attendance: req.attendance.into(),
        }
    }
}

impl From<AttendanceRequest> for AttendanceRecord {
    fn from(req: AttendanceRequest) -> Self {
        AttendanceRecord {
            days_present: req.days_present,
            total_days: req.total_days,
        }
    }
}

impl From<PayPeriodRequest> for PayPeriod {
    fn from(req: PayPeriodRequest) -> Self {
        PayPeriod {
            year: req.year,
            month: req.month,
        }
    }
}
