//! Payroll component definitions and the component registry.
//!
//! Components are the universal vocabulary of compensation items
//! (basic salary, housing, reimbursables and so on). Formulas reference
//! them by code; the registry classifies them by category and by their
//! tax and pension treatment.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The payroll category of a component.
///
/// Categories drive the aggregation formulas: gross pay sums `salary` and
/// `allowance` components, reimbursables are paid outside gross, and
/// `deduction` components are set aside from net pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    /// Core salary, always part of annual gross.
    Salary,
    /// Recurring allowances paid as part of gross.
    Allowance,
    /// Amounts withheld from net pay (leave, thirteenth month).
    Deduction,
    /// Expense reimbursements paid alongside net pay, outside gross.
    Reimbursable,
}

impl ComponentCategory {
    /// The lowercase label used in formula predicates and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentCategory::Salary => "salary",
            ComponentCategory::Allowance => "allowance",
            ComponentCategory::Deduction => "deduction",
            ComponentCategory::Reimbursable => "reimbursable",
        }
    }
}

impl FromStr for ComponentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "salary" => Ok(ComponentCategory::Salary),
            "allowance" => Ok(ComponentCategory::Allowance),
            "deduction" => Ok(ComponentCategory::Deduction),
            "reimbursable" => Ok(ComponentCategory::Reimbursable),
            other => Err(format!("unknown payroll category '{other}'")),
        }
    }
}

/// How a component's amount is determined on a pay grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// A fixed annual amount configured on the pay grade.
    Fixed,
    /// A percentage of another amount.
    Percentage,
    /// Derived by a catalog formula.
    Formula,
}

/// A single payroll component definition.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{ComponentCategory, EmolumentComponent};
///
/// let json = r#"{
///     "code": "BASIC_SALARY",
///     "name": "Basic Salary",
///     "category": "salary",
///     "is_pensionable": true,
///     "is_taxable": true,
///     "calculation_method": "fixed",
///     "display_order": 1
/// }"#;
/// let component: EmolumentComponent = serde_json::from_str(json).unwrap();
/// assert_eq!(component.category, ComponentCategory::Salary);
/// assert!(component.is_pensionable);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmolumentComponent {
    /// Unique code referenced by formulas and pay grades.
    pub code: String,
    /// Human-readable display name.
    pub name: String,
    /// Payroll category.
    pub category: ComponentCategory,
    /// Whether the component counts toward the pensionable amount.
    pub is_pensionable: bool,
    /// Whether the component is subject to income tax.
    pub is_taxable: bool,
    /// How the amount is determined.
    pub calculation_method: CalculationMethod,
    /// Position in payslip listings, ascending.
    pub display_order: u32,
}

/// An immutable registry of payroll components keyed by code.
///
/// Built once per snapshot; lookups of codes that were never registered are
/// errors, never silent zeroes.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    components: HashMap<String, EmolumentComponent>,
}

impl ComponentRegistry {
    /// Builds a registry from a list of component definitions.
    pub fn new(components: Vec<EmolumentComponent>) -> Self {
        let components = components
            .into_iter()
            .map(|c| (c.code.clone(), c))
            .collect();
        ComponentRegistry { components }
    }

    /// Looks up a component by code.
    pub fn component(&self, code: &str) -> EngineResult<&EmolumentComponent> {
        self.components
            .get(code)
            .ok_or_else(|| EngineError::UnknownComponent {
                code: code.to_string(),
            })
    }

    /// Whether a registered component counts toward the pensionable amount.
    ///
    /// An unregistered code is an error, not `false`.
    pub fn is_pensionable(&self, code: &str) -> EngineResult<bool> {
        Ok(self.component(code)?.is_pensionable)
    }

    /// All components in a category, sorted by display order.
    pub fn components_by_category(&self, category: ComponentCategory) -> Vec<&EmolumentComponent> {
        let mut matching: Vec<&EmolumentComponent> = self
            .components
            .values()
            .filter(|c| c.category == category)
            .collect();
        matching.sort_by_key(|c| c.display_order);
        matching
    }

    /// The number of registered components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
