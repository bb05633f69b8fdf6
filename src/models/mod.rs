//! Core data models for the payroll computation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod component;
mod computation_result;
mod formula;
mod staff;
mod tax_bracket;

pub use component::{
    CalculationMethod, ComponentCategory, ComponentRegistry, EmolumentComponent,
};
pub use computation_result::{
    AuditStep, AuditTrace, ComputationResult, ComputationWarning, ComputedValues,
    PayrollRunResult, RunSummary, StaffFailure,
};
pub use formula::{CompiledFormula, Formula, FormulaCatalog};
pub use staff::{AttendanceRecord, PayGrade, PayPeriod, StaffComputationInput};
pub use tax_bracket::{TaxBracket, TaxBracketTable, TierPortion};
