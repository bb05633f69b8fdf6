//! Comprehensive integration tests for the payroll engine.
//!
//! This test suite covers all computation scenarios including:
//! - Single staff payslip computation
//! - Attendance proration and factor clamping
//! - Negative net pay warnings
//! - Batch payroll runs with failure isolation
//! - Run deadlines
//! - Formula validation
//! - Error cases
//! - Audit trace structure and determinism

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::PayrollSnapshot;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let snapshot = PayrollSnapshot::load("./config/ng2025").expect("Failed to load snapshot");
    AppState::new(snapshot)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Normalize decimal string by removing trailing zeros after decimal point
fn normalize_decimal(s: &str) -> String {
    let d = Decimal::from_str(s).unwrap();
    d.normalize().to_string()
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn create_staff(staff_id: &str, emoluments: Value, days_present: u32, total_days: u32) -> Value {
    json!({
        "staff_id": staff_id,
        "emoluments": emoluments,
        "attendance": {
            "days_present": days_present,
            "total_days": total_days
        }
    })
}

/// The reference pay grade: four components, 20 of 22 days present.
fn reference_staff(staff_id: &str) -> Value {
    create_staff(
        staff_id,
        json!({
            "BASIC_SALARY": "600000",
            "HOUSING": "300000",
            "TRANSPORT": "200000",
            "OTHER_ALLOWANCES": "100000"
        }),
        20,
        22,
    )
}

fn create_compute_request(staff: Value) -> Value {
    json!({
        "period": { "year": 2025, "month": 8 },
        "staff": staff
    })
}

fn create_run_request(staff: Vec<Value>) -> Value {
    json!({
        "period": { "year": 2025, "month": 8 },
        "staff": staff
    })
}

fn assert_value(result: &Value, field: &str, expected: &str) {
    let actual = result["values"][field].as_str().unwrap();
    let actual_normalized = normalize_decimal(actual);
    let expected_normalized = normalize_decimal(expected);
    assert_eq!(
        actual_normalized, expected_normalized,
        "Expected {} {}, got {}",
        field, expected_normalized, actual_normalized
    );
}

fn find_step<'a>(result: &'a Value, rule_id: &str) -> &'a Value {
    result["audit_trace"]["steps"]
        .as_array()
        .unwrap()
        .iter()
        .find(|step| step["rule_id"] == rule_id)
        .unwrap_or_else(|| panic!("No audit step for rule {}", rule_id))
}

fn warning_codes(result: &Value) -> Vec<String> {
    result["audit_trace"]["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["code"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// SECTION 1: Single Computation Tests - 4 tests
// =============================================================================

#[tokio::test]
async fn test_reference_pay_grade_full_pipeline() {
    // Four-component grade, 20 of 22 days present
    // Annual gross: 600,000 + 300,000 + 200,000 + 100,000 = 1,200,000
    // Pensionable: 600,000 + 300,000 + 200,000 = 1,100,000
    // Taxable: 1,200,000 * 0.95 - 1,100,000 * 8% = 1,052,000
    // PAYE: 0 + 45,000 + 452,000 * 18% = 126,360
    // Net: 90,909.09 - (10,530 + 6,666.67) = 73,712.42
    let router = create_router_for_test();
    let request = create_compute_request(reference_staff("NG-0001"));

    let (status, result) = post_json(router, "/compute", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_value(&result, "annual_gross", "1200000");
    assert_value(&result, "annual_reimbursables", "0");
    assert_value(&result, "pensionable_amount", "1100000");
    assert_value(&result, "monthly_gross", "90909.09");
    assert_value(&result, "monthly_reimbursables", "0");
    assert_value(&result, "taxable_income", "1052000");
    assert_value(&result, "paye", "126360");
    assert_value(&result, "pension", "6666.67");
    assert_value(&result, "leave_allowance_deduction", "0");
    assert_value(&result, "thirteenth_month_deduction", "0");
    assert_value(&result, "net_pay", "73712.42");
    assert_value(&result, "credit_to_bank", "73712.42");
}

#[tokio::test]
async fn test_full_grade_with_every_component() {
    // All eleven components configured, full attendance
    // Annual gross: 1.2M + 600k + 400k + 240k + 120k = 2,560,000
    // Reimbursables: 60k + 80k + 40k + 50k = 230,000
    // Pensionable: 1.2M + 600k + 400k = 2,200,000
    // Taxable: 2,432,000 - 176,000 = 2,256,000; PAYE = 390,880
    let router = create_router_for_test();
    let staff = create_staff(
        "NG-0002",
        json!({
            "BASIC_SALARY": "1200000",
            "HOUSING": "600000",
            "TRANSPORT": "400000",
            "OTHER_ALLOWANCES": "240000",
            "MEAL_ALLOWANCE": "120000",
            "LEAVE_ALLOWANCE": "200000",
            "THIRTEENTH_MONTH": "100000",
            "OTJ_TELEPHONE": "60000",
            "OTJ_TRANSPORT": "80000",
            "UNIFORM": "40000",
            "CLIENT_OP_FUND": "50000"
        }),
        22,
        22,
    );

    let (status, result) = post_json(router, "/compute", create_compute_request(staff)).await;

    assert_eq!(status, StatusCode::OK);
    assert_value(&result, "annual_gross", "2560000");
    assert_value(&result, "annual_reimbursables", "230000");
    assert_value(&result, "pensionable_amount", "2200000");
    assert_value(&result, "monthly_gross", "213333.33");
    assert_value(&result, "monthly_reimbursables", "19166.67");
    assert_value(&result, "taxable_income", "2256000");
    assert_value(&result, "paye", "390880");
    assert_value(&result, "pension", "14666.67");
    assert_value(&result, "leave_allowance_deduction", "16666.67");
    assert_value(&result, "thirteenth_month_deduction", "8333.33");
    assert_value(&result, "net_pay", "141093.33");
    assert_value(&result, "credit_to_bank", "160260");
}

#[tokio::test]
async fn test_client_without_overrides_gets_system_defaults() {
    // The shipped catalog has no rows for this client, so every step
    // falls back to the system default formula.
    let router = create_router_for_test();
    let mut request = create_compute_request(reference_staff("NG-0003"));
    request["client_id"] = json!("acme");

    let (status, result) = post_json(router, "/compute", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["client_id"], "acme");
    assert_value(&result, "net_pay", "73712.42");

    let steps = result["audit_trace"]["steps"].as_array().unwrap();
    for step in steps.iter().skip(1) {
        assert_eq!(step["source"], "system_default");
    }
}

#[tokio::test]
async fn test_unconfigured_components_contribute_zero() {
    // A grade holding only basic salary: every aggregate that sums other
    // components still computes, with the absent codes contributing zero.
    let router = create_router_for_test();
    let staff = create_staff("NG-0004", json!({ "BASIC_SALARY": "1200000" }), 22, 22);

    let (status, result) = post_json(router, "/compute", create_compute_request(staff)).await;

    assert_eq!(status, StatusCode::OK);
    assert_value(&result, "annual_gross", "1200000");
    assert_value(&result, "annual_reimbursables", "0");
    assert_value(&result, "pensionable_amount", "1200000");
    assert_value(&result, "leave_allowance_deduction", "0");
    assert_value(&result, "thirteenth_month_deduction", "0");
}

// =============================================================================
// SECTION 2: Attendance Proration Tests - 4 tests
// =============================================================================

#[tokio::test]
async fn test_partial_attendance_prorates_monthly_amounts() {
    // 15 of 22 days: monthly amounts scale by 15/22, but the annual
    // figures (gross, taxable, PAYE) are untouched.
    let router = create_router_for_test();
    let staff = create_staff(
        "NG-0101",
        json!({
            "BASIC_SALARY": "600000",
            "HOUSING": "300000",
            "TRANSPORT": "200000",
            "OTHER_ALLOWANCES": "100000"
        }),
        15,
        22,
    );

    let (status, result) = post_json(router, "/compute", create_compute_request(staff)).await;

    assert_eq!(status, StatusCode::OK);
    // 100,000 * 15/22 = 68,181.8181... rounds to 68,181.82
    assert_value(&result, "monthly_gross", "68181.82");
    assert_value(&result, "annual_gross", "1200000");
    assert_value(&result, "paye", "126360");

    let factor = decimal(result["proration_factor"].as_str().unwrap());
    assert!(factor > decimal("0.68") && factor < decimal("0.69"));
}

#[tokio::test]
async fn test_full_attendance_factor_is_one() {
    let router = create_router_for_test();
    let staff = create_staff("NG-0102", json!({ "BASIC_SALARY": "600000" }), 22, 22);

    let (status, result) = post_json(router, "/compute", create_compute_request(staff)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(normalize_decimal(result["proration_factor"].as_str().unwrap()), "1");
    assert!(warning_codes(&result).is_empty());
}

#[tokio::test]
async fn test_days_present_above_total_clamps_with_warning() {
    // 25 of 22 days: the factor clamps to 1 and the anomaly is recorded
    // as a warning rather than overpaying.
    let router = create_router_for_test();
    let staff = create_staff("NG-0103", json!({ "BASIC_SALARY": "1200000" }), 25, 22);

    let (status, result) = post_json(router, "/compute", create_compute_request(staff)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(normalize_decimal(result["proration_factor"].as_str().unwrap()), "1");
    assert_value(&result, "monthly_gross", "100000");

    let warnings = result["audit_trace"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["code"], "ATTENDANCE_ANOMALY");
    assert_eq!(warnings[0]["severity"], "medium");
}

#[tokio::test]
async fn test_zero_days_present_flags_negative_net_pay() {
    // Absent all month: monthly amounts are zero but the annual PAYE
    // still divides through net pay, driving it negative.
    let router = create_router_for_test();
    let staff = create_staff(
        "NG-0104",
        json!({
            "BASIC_SALARY": "600000",
            "HOUSING": "300000",
            "TRANSPORT": "200000",
            "OTHER_ALLOWANCES": "100000"
        }),
        0,
        22,
    );

    let (status, result) = post_json(router, "/compute", create_compute_request(staff)).await;

    assert_eq!(status, StatusCode::OK);
    assert_value(&result, "monthly_gross", "0");
    assert_value(&result, "paye", "126360");
    assert_value(&result, "net_pay", "-10530");

    let warnings = result["audit_trace"]["warnings"].as_array().unwrap();
    let negative = warnings
        .iter()
        .find(|w| w["code"] == "NEGATIVE_NET_PAY")
        .expect("Expected NEGATIVE_NET_PAY warning");
    assert_eq!(negative["severity"], "high");
}

// =============================================================================
// SECTION 3: Batch Payroll Run Tests - 4 tests
// =============================================================================

#[tokio::test]
async fn test_run_totals_across_batch() {
    // Two identical staff: totals are twice the single-staff figures.
    let router = create_router_for_test();
    let request = create_run_request(vec![
        reference_staff("NG-0201"),
        reference_staff("NG-0202"),
    ]);

    let (status, run) = post_json(router, "/runs", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["summary"]["succeeded"], 2);
    assert!(run["summary"]["failed"].as_array().unwrap().is_empty());
    assert_eq!(
        normalize_decimal(run["summary"]["total_net_pay"].as_str().unwrap()),
        "147424.84"
    );
    assert_eq!(
        normalize_decimal(run["summary"]["total_credit_to_bank"].as_str().unwrap()),
        "147424.84"
    );
    assert_eq!(run["snapshot_version"], "2025-01-01");
}

#[tokio::test]
async fn test_run_isolates_failing_staff() {
    // One staff member carries an unregistered component. Their failure
    // is reported; everyone else still gets a payslip and the totals
    // cover only the successes.
    let router = create_router_for_test();
    let bad_staff = create_staff("NG-0212", json!({ "BONUS": "50000" }), 22, 22);
    let request = create_run_request(vec![
        reference_staff("NG-0211"),
        bad_staff,
        reference_staff("NG-0213"),
    ]);

    let (status, run) = post_json(router, "/runs", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["summary"]["succeeded"], 2);

    let failed = run["summary"]["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["staff_id"], "NG-0212");
    assert_eq!(failed[0]["error_kind"], "UNKNOWN_COMPONENT");
    assert!(failed[0]["detail"].as_str().unwrap().contains("BONUS"));

    assert_eq!(
        normalize_decimal(run["summary"]["total_net_pay"].as_str().unwrap()),
        "147424.84"
    );
}

#[tokio::test]
async fn test_run_preserves_input_order() {
    let router = create_router_for_test();
    let request = create_run_request(vec![
        reference_staff("NG-0221"),
        reference_staff("NG-0222"),
        reference_staff("NG-0223"),
    ]);

    let (status, run) = post_json(router, "/runs", request).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = run["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["staff_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["NG-0221", "NG-0222", "NG-0223"]);
}

#[tokio::test]
async fn test_run_expired_deadline_leaves_staff_uncomputed() {
    // A zero timeout expires before any staff member is scheduled; they
    // are reported as not computed rather than failed.
    let router = create_router_for_test();
    let mut request = create_run_request(vec![
        reference_staff("NG-0231"),
        reference_staff("NG-0232"),
    ]);
    request["timeout_ms"] = json!(0);

    let (status, run) = post_json(router, "/runs", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["summary"]["succeeded"], 0);
    assert!(run["summary"]["failed"].as_array().unwrap().is_empty());
    assert_eq!(
        run["summary"]["not_computed"],
        json!(["NG-0231", "NG-0232"])
    );
    assert_eq!(
        normalize_decimal(run["summary"]["total_net_pay"].as_str().unwrap()),
        "0"
    );
}

// =============================================================================
// SECTION 4: Formula Validation Tests - 4 tests
// =============================================================================

#[tokio::test]
async fn test_validate_reports_variables_and_components() {
    let router = create_router_for_test();
    let body = json!({
        "formula_code": "LEAVE_ALLOWANCE_DEDUCTION",
        "expression": "(emoluments[\"LEAVE_ALLOWANCE\"] / 12) * proration_factor"
    });

    let (status, result) = post_json(router, "/formulas/validate", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["valid"], true);
    assert_eq!(result["variables"], json!(["proration_factor"]));
    assert_eq!(result["components"], json!(["LEAVE_ALLOWANCE"]));
}

#[tokio::test]
async fn test_validate_lists_variables_sorted() {
    let router = create_router_for_test();
    let body = json!({
        "expression": "monthly_gross - ((paye / 12) + pension + leave_allowance_deduction)"
    });

    let (status, result) = post_json(router, "/formulas/validate", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["valid"], true);
    assert_eq!(
        result["variables"],
        json!([
            "leave_allowance_deduction",
            "monthly_gross",
            "paye",
            "pension"
        ])
    );
}

#[tokio::test]
async fn test_validate_rejects_dangling_operator() {
    let router = create_router_for_test();
    let body = json!({ "expression": "monthly_gross -" });

    let (status, result) = post_json(router, "/formulas/validate", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["valid"], false);
    let error = result["error"].as_str().unwrap();
    assert!(error.contains("position"));
}

#[tokio::test]
async fn test_validate_rejects_unknown_category_label() {
    let router = create_router_for_test();
    let body = json!({
        "expression": "SUM(emoluments WHERE payroll_category = \"bonus\")"
    });

    let (status, result) = post_json(router, "/formulas/validate", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["valid"], false);
    assert!(result["error"].as_str().unwrap().contains("bonus"));
}

// =============================================================================
// SECTION 5: Error Cases Tests - 6 tests
// =============================================================================

#[tokio::test]
async fn test_error_malformed_json() {
    let router = create_router_for_test();

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/compute")
                .header("Content-Type", "application/json")
                .body(Body::from("{invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_error_missing_staff_id() {
    let router = create_router_for_test();

    let body = json!({
        "period": { "year": 2025, "month": 8 },
        "staff": {
            "emoluments": { "BASIC_SALARY": "600000" },
            "attendance": { "days_present": 22, "total_days": 22 }
        }
    });

    let (status, error) = post_json(router, "/compute", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"].as_str().unwrap().contains("missing field"));
}

#[tokio::test]
async fn test_error_unknown_component_code() {
    let router = create_router_for_test();
    let staff = create_staff("NG-0301", json!({ "GYM_MEMBERSHIP": "50000" }), 22, 22);

    let (status, error) = post_json(router, "/compute", create_compute_request(staff)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "UNKNOWN_COMPONENT");
    assert!(error["message"].as_str().unwrap().contains("GYM_MEMBERSHIP"));
}

#[tokio::test]
async fn test_error_month_out_of_range() {
    let router = create_router_for_test();
    let body = json!({
        "period": { "year": 2025, "month": 13 },
        "staff": reference_staff("NG-0302")
    });

    let (status, error) = post_json(router, "/compute", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert!(error["message"].as_str().unwrap().contains("month"));
}

#[tokio::test]
async fn test_error_zero_total_days() {
    let router = create_router_for_test();
    let staff = create_staff("NG-0303", json!({ "BASIC_SALARY": "600000" }), 0, 0);

    let (status, error) = post_json(router, "/compute", create_compute_request(staff)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_ATTENDANCE_PERIOD");
}

#[tokio::test]
async fn test_error_missing_content_type() {
    let router = create_router_for_test();

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/compute")
                .body(Body::from(
                    create_compute_request(reference_staff("NG-0304")).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(error["code"], "MISSING_CONTENT_TYPE");
}

// =============================================================================
// SECTION 6: Audit Trace & Response Field Validation Tests - 6 tests
// =============================================================================

#[tokio::test]
async fn test_audit_trace_numbers_every_step() {
    // Proration plus the twelve formula steps, numbered from 1.
    let router = create_router_for_test();
    let request = create_compute_request(reference_staff("NG-0401"));

    let (status, result) = post_json(router, "/compute", request).await;

    assert_eq!(status, StatusCode::OK);

    let steps = result["audit_trace"]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 13);

    for (index, step) in steps.iter().enumerate() {
        assert_eq!(step["step_number"], (index as u64) + 1);
        assert!(step["rule_id"].is_string());
        assert!(step["rule_name"].is_string());
        assert!(step["source"].is_string());
        assert!(step["reasoning"].is_string());
    }

    assert_eq!(steps[0]["rule_id"], "proration_factor");
    assert_eq!(steps[0]["source"], "engine");
    assert_eq!(steps[12]["rule_id"], "CREDIT_TO_BANK");
}

#[tokio::test]
async fn test_paye_step_carries_tier_breakdown() {
    // Taxable income of 1,052,000 touches the first three tiers.
    let router = create_router_for_test();
    let request = create_compute_request(reference_staff("NG-0402"));

    let (status, result) = post_json(router, "/compute", request).await;

    assert_eq!(status, StatusCode::OK);

    let paye_step = find_step(&result, "PAYE");
    assert_eq!(paye_step["source"], "system_default");

    let breakdown = paye_step["output"]["tier_breakdown"].as_array().unwrap();
    assert_eq!(breakdown.len(), 3);
    assert_eq!(breakdown[0]["tier"], 1);
    assert_eq!(normalize_decimal(breakdown[0]["tax"].as_str().unwrap()), "0");
    assert_eq!(
        normalize_decimal(breakdown[1]["tax"].as_str().unwrap()),
        "45000"
    );
    assert_eq!(
        normalize_decimal(breakdown[2]["tax"].as_str().unwrap()),
        "81360"
    );
}

#[tokio::test]
async fn test_audit_step_input_includes_expression() {
    let router = create_router_for_test();
    let request = create_compute_request(reference_staff("NG-0403"));

    let (status, result) = post_json(router, "/compute", request).await;

    assert_eq!(status, StatusCode::OK);

    let net_step = find_step(&result, "NET_PAY");
    let expression = net_step["input"]["expression"].as_str().unwrap();
    assert!(expression.contains("monthly_gross"));

    let variables = net_step["input"]["variables"].as_object().unwrap();
    assert!(variables.contains_key("paye"));
    assert!(variables.contains_key("pension"));
}

#[tokio::test]
async fn test_audit_trace_duration_recorded() {
    let router = create_router_for_test();
    let request = create_compute_request(reference_staff("NG-0404"));

    let (status, result) = post_json(router, "/compute", request).await;

    assert_eq!(status, StatusCode::OK);

    let duration = result["audit_trace"]["duration_us"].as_u64().unwrap();
    assert!(duration > 0, "Duration should be recorded");
}

#[tokio::test]
async fn test_result_contains_all_required_fields() {
    let router = create_router_for_test();
    let request = create_compute_request(reference_staff("NG-0405"));

    let (status, result) = post_json(router, "/compute", request).await;

    assert_eq!(status, StatusCode::OK);

    // Verify top-level fields
    assert!(result["computation_id"].is_string());
    assert!(result["timestamp"].is_string());
    assert!(result["engine_version"].is_string());
    assert_eq!(result["snapshot_version"], "2025-01-01");
    assert_eq!(result["staff_id"], "NG-0405");
    assert!(result["client_id"].is_null());

    // Verify period
    assert_eq!(result["period"]["year"], 2025);
    assert_eq!(result["period"]["month"], 8);

    // Verify the twelve values serialize as decimal strings
    let values = result["values"].as_object().unwrap();
    assert_eq!(values.len(), 12);
    for (field, value) in values {
        assert!(value.is_string(), "values.{} should be a string", field);
    }

    assert!(result["proration_factor"].is_string());
    assert!(result["audit_trace"]["steps"].is_array());
    assert!(result["audit_trace"]["warnings"].is_array());
}

#[tokio::test]
async fn test_identical_requests_compute_identical_values() {
    // Same staff, same snapshot: the values and trace must match exactly;
    // only the computation id and timestamp differ.
    let request = create_compute_request(reference_staff("NG-0406"));

    let (status_a, first) = post_json(create_router_for_test(), "/compute", request.clone()).await;
    let (status_b, second) = post_json(create_router_for_test(), "/compute", request).await;

    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_b, StatusCode::OK);
    assert_eq!(first["values"], second["values"]);
    assert_eq!(first["proration_factor"], second["proration_factor"]);
    assert_eq!(
        first["audit_trace"]["steps"].as_array().unwrap().len(),
        second["audit_trace"]["steps"].as_array().unwrap().len()
    );
    assert_ne!(first["computation_id"], second["computation_id"]);
}
