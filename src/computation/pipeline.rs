//! The twelve-step payroll pipeline.
//!
//! Steps run in a fixed order. Each step resolves its formula from the
//! catalog (client override first, system default otherwise), evaluates it
//! against the context built by earlier steps, rounds the result to two
//! decimal places, and publishes it to the context under the lowercase step
//! code. The audit trace records every step with the expression, the
//! resolved inputs, the output and the formula source.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::config::PayrollSnapshot;
use crate::error::{EngineError, EngineResult};
use crate::expr::Evaluator;
use crate::models::{
    AuditStep, AuditTrace, ComputationResult, ComputationWarning, ComputedValues, PayPeriod,
    StaffComputationInput,
};

use super::proration::calculate_proration;

/// The pipeline's step codes, in execution order.
///
/// Annual figures come first, monthly figures follow, and statutory
/// deductions land before `NET_PAY` and `CREDIT_TO_BANK` so that every
/// default formula only ever reads values produced by an earlier step.
pub const PIPELINE_STEPS: [&str; 12] = [
    "ANNUAL_GROSS",
    "ANNUAL_REIMBURSABLES",
    "PENSIONABLE_AMOUNT",
    "MONTHLY_GROSS",
    "MONTHLY_REIMBURSABLES",
    "TAXABLE_INCOME",
    "PAYE",
    "PENSION",
    "LEAVE_ALLOWANCE_DEDUCTION",
    "THIRTEENTH_MONTH_DEDUCTION",
    "NET_PAY",
    "CREDIT_TO_BANK",
];

/// The engine version stamped into every result.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rounds a monetary amount to two decimal places, midpoints away from zero.
///
/// Every completed pipeline step publishes its value through this rounding,
/// so downstream formulas read the same figures that appear on the payslip.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes one staff member's payroll for a period.
///
/// The attendance record is prorated first, then the twelve steps run in
/// [`PIPELINE_STEPS`] order against the snapshot's catalog, registry and
/// bracket table. The proration factor enters the context at full precision;
/// every step result is rounded to two decimal places before later steps
/// can read it.
///
/// # Arguments
///
/// * `snapshot` - The rule set to compute against
/// * `client_id` - Client whose formula overrides apply, if any
/// * `period` - The pay period the result is labelled with
/// * `input` - Staff identifier, pay grade and attendance
///
/// # Returns
///
/// Returns a `ComputationResult` carrying the twelve named values and the
/// full audit trace, or the first error the pipeline hit: an invalid
/// attendance period, a missing formula, an unregistered component code, an
/// unresolved variable or a division by zero.
pub fn compute_staff_payroll(
    snapshot: &PayrollSnapshot,
    client_id: Option<&str>,
    period: PayPeriod,
    input: &StaffComputationInput,
) -> EngineResult<ComputationResult> {
    let started = Instant::now();
    let mut steps: Vec<AuditStep> = Vec::with_capacity(PIPELINE_STEPS.len() + 1);
    let mut warnings: Vec<ComputationWarning> = Vec::new();

    let proration = calculate_proration(&input.attendance, 1)?;
    steps.push(proration.audit_step);
    if let Some(warning) = proration.warning {
        warnings.push(warning);
    }

    let mut context: HashMap<String, Decimal> = HashMap::new();
    context.insert(
        "days_present".to_string(),
        Decimal::from(input.attendance.days_present),
    );
    context.insert(
        "total_days".to_string(),
        Decimal::from(input.attendance.total_days),
    );
    context.insert("proration_factor".to_string(), proration.factor);

    for (index, code) in PIPELINE_STEPS.iter().enumerate() {
        let step_number = (index + 2) as u32;
        let compiled = snapshot.catalog().resolve(code, client_id)?;

        let evaluator = Evaluator::new(
            code,
            &context,
            &input.pay_grade.emoluments,
            snapshot.registry(),
            snapshot.tax_table(),
        );
        let raw = evaluator.evaluate(&compiled.expr)?;
        let rounded = round_half_up(raw);

        // Pension relief can exceed the taxable base under override
        // formulas; taxable income never goes below zero.
        let clamped = *code == "TAXABLE_INCOME" && rounded < Decimal::ZERO;
        let value = if clamped { Decimal::ZERO } else { rounded };

        let mut output = serde_json::Map::new();
        output.insert("value".to_string(), Value::String(value.to_string()));
        if clamped {
            output.insert(
                "clamped_from".to_string(),
                Value::String(rounded.to_string()),
            );
        }
        if compiled.expr.uses_progressive_tax() {
            if let Some(taxable) = context.get("taxable_income") {
                let breakdown: Vec<Value> = snapshot
                    .tax_table()
                    .tier_portions(*taxable)?
                    .iter()
                    .map(|portion| {
                        json!({
                            "tier": portion.tier_number,
                            "taxed_amount": portion.taxed_amount.to_string(),
                            "rate": portion.tax_rate.to_string(),
                            "tax": portion.tax.to_string(),
                        })
                    })
                    .collect();
                output.insert("tier_breakdown".to_string(), Value::Array(breakdown));
            }
        }

        let mut reasoning = match compiled.formula.client_id.as_deref() {
            Some(client) => format!(
                "Evaluated override formula for client '{}' to {}",
                client, value
            ),
            None => format!("Evaluated system default formula to {}", value),
        };
        if clamped {
            reasoning.push_str(&format!(
                " after clamping a negative taxable income of {} to zero",
                rounded
            ));
        }

        steps.push(AuditStep {
            step_number,
            rule_id: code.to_string(),
            rule_name: compiled.formula.name.clone(),
            source: compiled.formula.source().to_string(),
            input: step_input_json(compiled.formula.expression.as_str(), compiled, &context, input),
            output: Value::Object(output),
            reasoning,
        });

        context.insert(code.to_lowercase(), value);
    }

    let values = ComputedValues {
        annual_gross: value_of(&context, "annual_gross")?,
        annual_reimbursables: value_of(&context, "annual_reimbursables")?,
        pensionable_amount: value_of(&context, "pensionable_amount")?,
        monthly_gross: value_of(&context, "monthly_gross")?,
        monthly_reimbursables: value_of(&context, "monthly_reimbursables")?,
        taxable_income: value_of(&context, "taxable_income")?,
        paye: value_of(&context, "paye")?,
        pension: value_of(&context, "pension")?,
        leave_allowance_deduction: value_of(&context, "leave_allowance_deduction")?,
        thirteenth_month_deduction: value_of(&context, "thirteenth_month_deduction")?,
        net_pay: value_of(&context, "net_pay")?,
        credit_to_bank: value_of(&context, "credit_to_bank")?,
    };

    if values.net_pay < Decimal::ZERO {
        warnings.push(ComputationWarning {
            code: "NEGATIVE_NET_PAY".to_string(),
            message: format!(
                "net pay {} is negative; deductions exceed the prorated gross",
                values.net_pay
            ),
            severity: "high".to_string(),
        });
    }

    Ok(ComputationResult {
        computation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        snapshot_version: snapshot.version().to_string(),
        staff_id: input.staff_id.clone(),
        client_id: client_id.map(|c| c.to_string()),
        period,
        proration_factor: proration.factor,
        values,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us: started.elapsed().as_micros() as u64,
        },
    })
}

/// Builds the audit input payload: the expression plus the context
/// variables and pay grade amounts it actually read.
fn step_input_json(
    expression: &str,
    compiled: &crate::models::CompiledFormula,
    context: &HashMap<String, Decimal>,
    input: &StaffComputationInput,
) -> Value {
    let mut payload = serde_json::Map::new();
    payload.insert(
        "expression".to_string(),
        Value::String(expression.to_string()),
    );

    let mut variables = serde_json::Map::new();
    for name in &compiled.variables {
        if let Some(value) = context.get(name.as_str()) {
            variables.insert(name.clone(), Value::String(value.to_string()));
        }
    }
    if !variables.is_empty() {
        payload.insert("variables".to_string(), Value::Object(variables));
    }

    let mut components = serde_json::Map::new();
    for code in &compiled.component_refs {
        components.insert(
            code.clone(),
            Value::String(input.pay_grade.amount(code).to_string()),
        );
    }
    if !components.is_empty() {
        payload.insert("components".to_string(), Value::Object(components));
    }

    Value::Object(payload)
}

fn value_of(context: &HashMap<String, Decimal>, key: &str) -> EngineResult<Decimal> {
    context
        .get(key)
        .copied()
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("pipeline produced no value for {}", key),
        })
}
