//! Computation logic for the payroll engine.
//!
//! This module contains attendance proration, the twelve-step pipeline that
//! turns a pay grade into payslip values, and the batch run executor that
//! computes a staff list in parallel against one snapshot.

mod pipeline;
mod proration;
mod run;

pub use pipeline::{ENGINE_VERSION, PIPELINE_STEPS, compute_staff_payroll, round_half_up};
pub use proration::{ProrationResult, calculate_proration};
pub use run::execute_payroll_run;
