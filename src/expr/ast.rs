//! Abstract syntax tree for catalog formula expressions.
//!
//! The node set is closed: arithmetic, variables, emolument lookups and the
//! two built-in aggregates. There is no dynamic dispatch and no way for an
//! expression to reach outside the computation context.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::models::{ComponentCategory, EmolumentComponent};

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Subtract,
    /// Multiplication.
    Multiply,
    /// Division. Dividing by zero is a computation error, never NaN.
    Divide,
}

impl BinaryOp {
    /// The operator's source symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        }
    }
}

/// One clause of a `SUM` predicate, compiled to typed component flags at
/// parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// `payroll_category = "<label>"`.
    CategoryEquals(ComponentCategory),
    /// `payroll_category IN ("<label>", ...)`.
    CategoryIn(Vec<ComponentCategory>),
    /// `is_pensionable = TRUE | FALSE`.
    Pensionable(bool),
    /// `is_taxable = TRUE | FALSE`.
    Taxable(bool),
}

impl FilterClause {
    fn matches(&self, component: &EmolumentComponent) -> bool {
        match self {
            FilterClause::CategoryEquals(category) => component.category == *category,
            FilterClause::CategoryIn(categories) => categories.contains(&component.category),
            FilterClause::Pensionable(flag) => component.is_pensionable == *flag,
            FilterClause::Taxable(flag) => component.is_taxable == *flag,
        }
    }
}

/// A compiled `SUM` predicate: the conjunction of its clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentFilter {
    clauses: Vec<FilterClause>,
}

impl ComponentFilter {
    /// Builds a filter from compiled clauses.
    pub fn new(clauses: Vec<FilterClause>) -> Self {
        ComponentFilter { clauses }
    }

    /// Whether a component satisfies every clause.
    pub fn matches(&self, component: &EmolumentComponent) -> bool {
        self.clauses.iter().all(|clause| clause.matches(component))
    }

    /// The compiled clauses.
    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }
}

/// A parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal. Percentage literals (`8%`) arrive here already
    /// divided by 100.
    Number(Decimal),
    /// A reference to a computation-context variable.
    Variable(String),
    /// Unary minus.
    Negate(Box<Expr>),
    /// A binary arithmetic operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `emoluments["CODE"]`: the staff's configured amount for one
    /// registered component, zero when the component is not on the
    /// staff's pay grade.
    EmolumentLookup(String),
    /// `SUM(emoluments WHERE ...)` over the staff's pay grade.
    Sum(ComponentFilter),
    /// `progressive_tax(<expr>)` against the snapshot's active bracket
    /// table.
    ProgressiveTax(Box<Expr>),
}

impl Expr {
    /// Every context variable the expression references, sorted.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut BTreeSet<String>) {
        match self {
            Expr::Variable(name) => {
                names.insert(name.clone());
            }
            Expr::Negate(inner) => inner.collect_variables(names),
            Expr::Binary { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Expr::ProgressiveTax(arg) => arg.collect_variables(names),
            Expr::Number(_) | Expr::EmolumentLookup(_) | Expr::Sum(_) => {}
        }
    }

    /// Every component code the expression looks up directly, sorted.
    pub fn component_refs(&self) -> BTreeSet<String> {
        let mut codes = BTreeSet::new();
        self.collect_component_refs(&mut codes);
        codes
    }

    fn collect_component_refs(&self, codes: &mut BTreeSet<String>) {
        match self {
            Expr::EmolumentLookup(code) => {
                codes.insert(code.clone());
            }
            Expr::Negate(inner) => inner.collect_component_refs(codes),
            Expr::Binary { left, right, .. } => {
                left.collect_component_refs(codes);
                right.collect_component_refs(codes);
            }
            Expr::ProgressiveTax(arg) => arg.collect_component_refs(codes),
            Expr::Number(_) | Expr::Variable(_) | Expr::Sum(_) => {}
        }
    }

    /// Whether the expression applies the progressive tax table anywhere.
    pub fn uses_progressive_tax(&self) -> bool {
        match self {
            Expr::ProgressiveTax(_) => true,
            Expr::Negate(inner) => inner.uses_progressive_tax(),
            Expr::Binary { left, right, .. } => {
                left.uses_progressive_tax() || right.uses_progressive_tax()
            }
            Expr::Number(_) | Expr::Variable(_) | Expr::EmolumentLookup(_) | Expr::Sum(_) => false,
        }
    }
}
