//! Staff-side inputs to a payroll computation: pay grades, attendance and
//! pay periods.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Attendance for one staff member in one pay period, supplied by an
/// external attendance subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Working days the staff member was present.
    pub days_present: u32,
    /// Working days in the period. Zero is an invalid period.
    pub total_days: u32,
}

/// The emoluments configured on a staff member's pay grade: annual amounts
/// keyed by component code.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayGrade;
///
/// let json = r#"{
///     "emoluments": {
///         "BASIC_SALARY": "600000",
///         "HOUSING": "300000"
///     }
/// }"#;
/// let grade: PayGrade = serde_json::from_str(json).unwrap();
/// assert_eq!(grade.total_compensation().to_string(), "900000");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayGrade {
    /// Annual amount per component code.
    pub emoluments: HashMap<String, Decimal>,
}

impl PayGrade {
    /// Creates a pay grade from an emoluments map.
    pub fn new(emoluments: HashMap<String, Decimal>) -> Self {
        PayGrade { emoluments }
    }

    /// The sum of every configured emolument, regardless of category.
    pub fn total_compensation(&self) -> Decimal {
        self.emoluments.values().copied().sum()
    }

    /// The configured amount for a component, zero when not configured.
    pub fn amount(&self, code: &str) -> Decimal {
        self.emoluments.get(code).copied().unwrap_or(Decimal::ZERO)
    }
}

/// The monthly pay period a computation belongs to. The period is a label
/// carried through to results; proration comes from the attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1 to 12.
    pub month: u32,
}

impl PayPeriod {
    /// Creates a period label.
    pub fn new(year: i32, month: u32) -> Self {
        PayPeriod { year, month }
    }

    /// The period rendered as `YYYY-MM`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Everything the pipeline needs to compute one staff member's pay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffComputationInput {
    /// Identifier the caller uses to correlate results and failures.
    pub staff_id: String,
    /// The staff member's pay grade.
    pub pay_grade: PayGrade,
    /// Attendance for the period.
    pub attendance: AttendanceRecord,
}
