//! The formula expression language.
//!
//! Catalog formulas are written in a small, closed expression language:
//! decimal arithmetic, percentage literals, references to earlier pipeline
//! outputs, `emoluments["CODE"]` lookups and two built-in aggregates
//! (`SUM` over the pay grade, `progressive_tax` against the active bracket
//! table). Expressions are parsed once when the catalog is built and
//! evaluated many times, one staff member at a time.

mod ast;
mod eval;
mod lexer;
mod parser;

pub use ast::{BinaryOp, ComponentFilter, Expr, FilterClause};
pub use eval::Evaluator;
pub use lexer::MAX_EXPRESSION_LENGTH;
pub use parser::parse;
