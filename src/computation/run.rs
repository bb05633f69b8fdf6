//! Batch run execution.
//!
//! A run computes many staff members against one immutable snapshot. Staff
//! are distributed across worker threads in stripes and the results are
//! reassembled in input order. One staff member's failure is recorded in the
//! summary and the rest of the run continues. An optional deadline stops
//! staff that have not started from being picked up; they are reported as
//! not computed rather than failed.

use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PayrollSnapshot;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ComputationResult, PayPeriod, PayrollRunResult, RunSummary, StaffComputationInput,
    StaffFailure,
};

use super::pipeline::{ENGINE_VERSION, compute_staff_payroll};

/// Upper bound on worker threads for a run.
const MAX_WORKERS: usize = 8;

/// One staff outcome slot. `None` means the deadline passed before the
/// staff member was picked up.
type Outcome = Option<EngineResult<ComputationResult>>;

/// Executes a payroll run over a staff list.
///
/// Every staff member is computed independently against the same snapshot,
/// in parallel across at most [`MAX_WORKERS`] threads. Worker `w` takes
/// staff `w`, `w + n`, `w + 2n` and so on, and results are reassembled in
/// input order, so the output is deterministic regardless of scheduling.
///
/// # Arguments
///
/// * `snapshot` - The rule set every staff member is computed against
/// * `client_id` - Client whose formula overrides apply, if any
/// * `period` - The pay period the run is labelled with
/// * `staff` - Staff inputs, in the order results should come back
/// * `timeout` - Deadline after which remaining staff are left uncomputed
///
/// # Returns
///
/// Returns a `PayrollRunResult` whose summary separates successes, per-staff
/// failures and staff the deadline cut off. The run itself does not fail
/// when individual staff do.
pub fn execute_payroll_run(
    snapshot: &PayrollSnapshot,
    client_id: Option<&str>,
    period: PayPeriod,
    staff: &[StaffComputationInput],
    timeout: Option<Duration>,
) -> PayrollRunResult {
    let started = Instant::now();
    let run_id = Uuid::new_v4();
    let deadline = timeout.map(|t| started + t);

    let mut outcomes: Vec<Outcome> = (0..staff.len()).map(|_| None).collect();

    if !staff.is_empty() {
        let worker_count = staff.len().min(MAX_WORKERS);

        let joined: Vec<(usize, thread::Result<Vec<(usize, Outcome)>>)> =
            thread::scope(|scope| {
                let handles: Vec<_> = (0..worker_count)
                    .map(|worker| {
                        let handle = scope.spawn(move || {
                            let mut partial = Vec::new();
                            let mut index = worker;
                            while index < staff.len() {
                                let outcome = match deadline {
                                    Some(d) if Instant::now() >= d => None,
                                    _ => Some(compute_staff_payroll(
                                        snapshot,
                                        client_id,
                                        period,
                                        &staff[index],
                                    )),
                                };
                                partial.push((index, outcome));
                                index += worker_count;
                            }
                            partial
                        });
                        (worker, handle)
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|(worker, handle)| (worker, handle.join()))
                    .collect()
            });

        for (worker, stripe) in joined {
            match stripe {
                Ok(partial) => {
                    for (index, outcome) in partial {
                        outcomes[index] = outcome;
                    }
                }
                Err(_) => {
                    // Results collected by a panicking worker are lost with
                    // it; every staff member on its stripe is marked failed.
                    let mut index = worker;
                    while index < staff.len() {
                        outcomes[index] = Some(Err(EngineError::CalculationError {
                            message: "worker thread panicked".to_string(),
                        }));
                        index += worker_count;
                    }
                }
            }
        }
    }

    let mut results = Vec::new();
    let mut failed = Vec::new();
    let mut not_computed = Vec::new();
    let mut total_net_pay = Decimal::ZERO;
    let mut total_credit_to_bank = Decimal::ZERO;

    for (input, outcome) in staff.iter().zip(outcomes) {
        match outcome {
            Some(Ok(result)) => {
                total_net_pay += result.values.net_pay;
                total_credit_to_bank += result.values.credit_to_bank;
                results.push(result);
            }
            Some(Err(error)) => {
                warn!(
                    staff_id = %input.staff_id,
                    error = %error,
                    "staff computation failed"
                );
                failed.push(StaffFailure {
                    staff_id: input.staff_id.clone(),
                    error_kind: error.kind().to_string(),
                    detail: error.to_string(),
                });
            }
            None => not_computed.push(input.staff_id.clone()),
        }
    }

    let succeeded = results.len();
    info!(
        run_id = %run_id,
        staff = staff.len(),
        succeeded,
        failed = failed.len(),
        not_computed = not_computed.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "payroll run complete"
    );

    PayrollRunResult {
        run_id,
        timestamp: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        snapshot_version: snapshot.version().to_string(),
        client_id: client_id.map(|c| c.to_string()),
        period,
        results,
        summary: RunSummary {
            succeeded,
            failed,
            not_computed,
            total_net_pay,
            total_credit_to_bank,
        },
    }
}
