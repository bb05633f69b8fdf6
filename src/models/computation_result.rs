//! Computation results, audit traces and run summaries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::PayPeriod;

/// One step of the audit trace: which rule ran, what it saw, what it
/// produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStep {
    /// Position in the trace, ascending from 1.
    pub step_number: u32,
    /// The formula code or engine rule that ran (e.g. `PAYE`,
    /// `proration_factor`).
    pub rule_id: String,
    /// Human-readable rule name.
    pub rule_name: String,
    /// Where the rule came from: `system_default`, `client_override` or
    /// `engine`.
    pub source: String,
    /// The inputs the rule saw.
    pub input: Value,
    /// The value the rule produced.
    pub output: Value,
    /// One sentence explaining the outcome.
    pub reasoning: String,
}

/// A non-fatal observation recorded while computing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationWarning {
    /// Stable warning code, e.g. `ATTENDANCE_ANOMALY`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// `low`, `medium` or `high`.
    pub severity: String,
}

/// The full audit trace for one staff computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// Every step in execution order.
    pub steps: Vec<AuditStep>,
    /// Warnings recorded along the way.
    pub warnings: Vec<ComputationWarning>,
    /// Wall-clock duration of the computation in microseconds.
    pub duration_us: u64,
}

/// The twelve named pipeline outputs, each rounded to two decimal places
/// when its step completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedValues {
    /// Annual sum of salary and allowance components.
    pub annual_gross: Decimal,
    /// Annual sum of reimbursable components.
    pub annual_reimbursables: Decimal,
    /// Annual sum of pensionable components.
    pub pensionable_amount: Decimal,
    /// Prorated monthly share of annual gross.
    pub monthly_gross: Decimal,
    /// Prorated monthly share of annual reimbursables.
    pub monthly_reimbursables: Decimal,
    /// Annual taxable income after reliefs, clamped at zero.
    pub taxable_income: Decimal,
    /// Annual progressive income tax.
    pub paye: Decimal,
    /// Monthly employee pension contribution, prorated.
    pub pension: Decimal,
    /// Monthly leave allowance set-aside, prorated.
    pub leave_allowance_deduction: Decimal,
    /// Monthly thirteenth month set-aside, prorated.
    pub thirteenth_month_deduction: Decimal,
    /// Monthly net pay after tax, pension and set-asides.
    pub net_pay: Decimal,
    /// Net pay plus monthly reimbursables: the amount credited to the bank.
    pub credit_to_bank: Decimal,
}

/// The outcome of one staff member's payroll computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationResult {
    /// Unique id for this computation.
    pub computation_id: Uuid,
    /// When the computation ran.
    pub timestamp: DateTime<Utc>,
    /// Version of the engine that produced the result.
    pub engine_version: String,
    /// Version stamp of the payroll snapshot the result was computed
    /// against.
    pub snapshot_version: String,
    /// The staff member.
    pub staff_id: String,
    /// The client whose overrides applied, if any.
    pub client_id: Option<String>,
    /// The pay period.
    pub period: PayPeriod,
    /// The proration factor actually applied, full precision.
    pub proration_factor: Decimal,
    /// The twelve named outputs.
    pub values: ComputedValues,
    /// Step-by-step trace with warnings.
    pub audit_trace: AuditTrace,
}

/// A staff member whose computation failed, with the error kind and detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffFailure {
    /// The staff member that failed.
    pub staff_id: String,
    /// Stable error kind, e.g. `UNRESOLVED_VARIABLE`.
    pub error_kind: String,
    /// Human-readable error detail.
    pub detail: String,
}

/// Aggregate outcome of a payroll run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Staff computed successfully.
    pub succeeded: usize,
    /// Staff whose computation failed, with reasons.
    pub failed: Vec<StaffFailure>,
    /// Staff never scheduled because the run deadline passed.
    pub not_computed: Vec<String>,
    /// Sum of net pay across succeeded staff.
    pub total_net_pay: Decimal,
    /// Sum of bank credits across succeeded staff.
    pub total_credit_to_bank: Decimal,
}

/// The outcome of a payroll run over a batch of staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRunResult {
    /// Unique id for this run.
    pub run_id: Uuid,
    /// When the run started.
    pub timestamp: DateTime<Utc>,
    /// Version of the engine that produced the run.
    pub engine_version: String,
    /// Version stamp of the payroll snapshot used.
    pub snapshot_version: String,
    /// The client whose overrides applied, if any.
    pub client_id: Option<String>,
    /// The pay period.
    pub period: PayPeriod,
    /// Successful results in input order.
    pub results: Vec<ComputationResult>,
    /// Counts, failures and totals.
    pub summary: RunSummary,
}
