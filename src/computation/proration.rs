//! Attendance proration.
//!
//! Monthly amounts scale by the fraction of scheduled days the staff member
//! was present. The factor is carried at full precision and rounding happens
//! in the step results that consume it: an annual package of 1,200,000 with
//! 20 of 22 days present yields a monthly gross of 90,909.09, where a factor
//! pre-rounded to 0.91 would have produced 91,000.00.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, AuditStep, ComputationWarning};

/// The result of attendance proration, including the factor and audit step.
#[derive(Debug, Clone)]
pub struct ProrationResult {
    /// `days_present / total_days` at full precision, at most 1.
    pub factor: Decimal,
    /// Set when `days_present` exceeded `total_days` and the factor was
    /// clamped.
    pub warning: Option<ComputationWarning>,
    /// The audit step recording this proration.
    pub audit_step: AuditStep,
}

/// Derives the proration factor from an attendance record.
///
/// # Arguments
///
/// * `attendance` - Days present and total scheduled days for the period
/// * `step_number` - Position of this step in the audit trace
///
/// # Returns
///
/// Returns a `ProrationResult` carrying the factor, or an
/// `InvalidAttendancePeriod` error when `total_days` is zero.
///
/// A record claiming more days present than the period holds is tolerated:
/// the factor clamps to 1 and the result carries an `ATTENDANCE_ANOMALY`
/// warning so the caller can flag the record upstream.
pub fn calculate_proration(
    attendance: &AttendanceRecord,
    step_number: u32,
) -> EngineResult<ProrationResult> {
    if attendance.total_days == 0 {
        return Err(EngineError::InvalidAttendancePeriod {
            message: "total_days is zero".to_string(),
        });
    }

    let raw = Decimal::from(attendance.days_present) / Decimal::from(attendance.total_days);

    let (factor, warning) = if raw > Decimal::ONE {
        let warning = ComputationWarning {
            code: "ATTENDANCE_ANOMALY".to_string(),
            message: format!(
                "days_present {} exceeds total_days {}; proration factor clamped to 1",
                attendance.days_present, attendance.total_days
            ),
            severity: "medium".to_string(),
        };
        (Decimal::ONE, Some(warning))
    } else {
        (raw, None)
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "proration_factor".to_string(),
        rule_name: "Attendance Proration".to_string(),
        source: "engine".to_string(),
        input: serde_json::json!({
            "days_present": attendance.days_present,
            "total_days": attendance.total_days,
        }),
        output: serde_json::json!({
            "proration_factor": factor.to_string(),
            "clamped": warning.is_some(),
        }),
        reasoning: format!(
            "Prorated {} of {} scheduled days to factor {}",
            attendance.days_present, attendance.total_days, factor
        ),
    };

    Ok(ProrationResult {
        factor,
        warning,
        audit_step,
    })
}
