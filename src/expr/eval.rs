//! Evaluation of parsed formula expressions.
//!
//! An [`Evaluator`] borrows the pieces of a single staff computation: the
//! variable context built up by completed pipeline steps, the staff's
//! emoluments map, the component registry and the active tax table. It is
//! pure; evaluating the same expression twice yields the same value.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::expr::ast::{BinaryOp, Expr};
use crate::models::{ComponentRegistry, TaxBracketTable};

/// Evaluates expressions for one formula within one staff computation.
pub struct Evaluator<'a> {
    formula_code: &'a str,
    variables: &'a HashMap<String, Decimal>,
    emoluments: &'a HashMap<String, Decimal>,
    registry: &'a ComponentRegistry,
    tax_table: &'a TaxBracketTable,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator for one formula.
    ///
    /// `formula_code` labels evaluation errors (unresolved variables,
    /// division by zero) with the formula that raised them.
    pub fn new(
        formula_code: &'a str,
        variables: &'a HashMap<String, Decimal>,
        emoluments: &'a HashMap<String, Decimal>,
        registry: &'a ComponentRegistry,
        tax_table: &'a TaxBracketTable,
    ) -> Self {
        Evaluator {
            formula_code,
            variables,
            emoluments,
            registry,
            tax_table,
        }
    }

    /// Evaluates an expression to an unrounded decimal value.
    pub fn evaluate(&self, expr: &Expr) -> EngineResult<Decimal> {
        match expr {
            Expr::Number(value) => Ok(*value),

            Expr::Variable(name) => self.variables.get(name).copied().ok_or_else(|| {
                EngineError::UnresolvedVariable {
                    name: name.clone(),
                    formula_code: self.formula_code.to_string(),
                }
            }),

            Expr::Negate(inner) => Ok(-self.evaluate(inner)?),

            Expr::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                match op {
                    BinaryOp::Add => Ok(left + right),
                    BinaryOp::Subtract => Ok(left - right),
                    BinaryOp::Multiply => Ok(left * right),
                    BinaryOp::Divide => {
                        if right.is_zero() {
                            Err(EngineError::DivisionByZero {
                                formula_code: self.formula_code.to_string(),
                            })
                        } else {
                            Ok(left / right)
                        }
                    }
                }
            }

            // A registered component missing from this staff's pay grade is
            // worth zero; an unregistered code is a resolution error.
            Expr::EmolumentLookup(code) => {
                self.registry.component(code)?;
                Ok(self.emoluments.get(code).copied().unwrap_or(Decimal::ZERO))
            }

            Expr::Sum(filter) => {
                let mut total = Decimal::ZERO;
                for (code, amount) in self.emoluments {
                    let component = self.registry.component(code)?;
                    if filter.matches(component) {
                        total += *amount;
                    }
                }
                Ok(total)
            }

            Expr::ProgressiveTax(arg) => {
                let taxable = self.evaluate(arg)?;
                self.tax_table.tax_due(taxable)
            }
        }
    }
}
