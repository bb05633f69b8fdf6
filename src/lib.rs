//! Payroll computation engine for Nigerian staffing clients
//!
//! This crate computes monthly payslips under the Nigeria PAYE rules: it loads
//! a versioned rule snapshot (emolument components, tax brackets, formula
//! catalog), evaluates the formula pipeline per staff member with attendance
//! proration, and serves the results over a small HTTP API with a full audit
//! trace per payslip.

#![warn(missing_docs)]

pub mod api;
pub mod computation;
pub mod config;
pub mod error;
pub mod expr;
pub mod models;
