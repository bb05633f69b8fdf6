//! Error types for the payroll computation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading a payroll snapshot
//! or computing a staff member's pay.

use thiserror::Error;

/// The main error type for the payroll computation engine.
///
/// Configuration-level variants surface while loading or validating a
/// snapshot and block every run on it; the remaining variants occur while
/// computing a single staff member and are isolated per staff by the run
/// executor.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The tax bracket table leaves part of the income range uncovered.
    #[error("Incomplete tax bracket coverage: {message}")]
    IncompleteBracketCoverage {
        /// A description of the gap or missing unbounded tier.
        message: String,
    },

    /// The formula catalog contains a dependency cycle.
    #[error("Formula dependency cycle detected: {cycle}")]
    FormulaCycleDetected {
        /// The cycle rendered as a path of formula codes.
        cycle: String,
    },

    /// More than one active formula exists for the same code and scope.
    #[error("Duplicate active formula '{formula_code}' for {scope}")]
    DuplicateFormula {
        /// The formula code that was defined twice.
        formula_code: String,
        /// The scope of the duplicate, either the system default or a client.
        scope: String,
    },

    /// A formula expression failed to parse.
    #[error("Syntax error in formula '{formula_code}': {message}")]
    ExpressionSyntax {
        /// The code of the formula that failed to parse.
        formula_code: String,
        /// A description of the syntax error, including the position.
        message: String,
    },

    /// No active formula exists for the requested code.
    #[error("No active formula found for code '{formula_code}'")]
    FormulaNotFound {
        /// The formula code that could not be resolved.
        formula_code: String,
    },

    /// A formula referenced a variable absent from the computation context.
    #[error("Unresolved variable '{name}' in formula '{formula_code}'")]
    UnresolvedVariable {
        /// The variable name that could not be resolved.
        name: String,
        /// The formula that referenced it.
        formula_code: String,
    },

    /// A formula referenced a component code that is not registered.
    #[error("Unknown payroll component '{code}'")]
    UnknownComponent {
        /// The unregistered component code.
        code: String,
    },

    /// An attendance record cannot yield a proration factor.
    #[error("Invalid attendance period: {message}")]
    InvalidAttendancePeriod {
        /// A description of what made the period invalid.
        message: String,
    },

    /// A formula divided by zero.
    #[error("Division by zero while evaluating formula '{formula_code}'")]
    DivisionByZero {
        /// The formula whose divisor evaluated to zero.
        formula_code: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// A stable machine-readable kind string for run summaries and API
    /// error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            EngineError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            EngineError::IncompleteBracketCoverage { .. } => "INCOMPLETE_BRACKET_COVERAGE",
            EngineError::FormulaCycleDetected { .. } => "FORMULA_CYCLE_DETECTED",
            EngineError::DuplicateFormula { .. } => "DUPLICATE_FORMULA",
            EngineError::ExpressionSyntax { .. } => "EXPRESSION_SYNTAX",
            EngineError::FormulaNotFound { .. } => "FORMULA_NOT_FOUND",
            EngineError::UnresolvedVariable { .. } => "UNRESOLVED_VARIABLE",
            EngineError::UnknownComponent { .. } => "UNKNOWN_COMPONENT",
            EngineError::InvalidAttendancePeriod { .. } => "INVALID_ATTENDANCE_PERIOD",
            EngineError::DivisionByZero { .. } => "DIVISION_BY_ZERO",
            EngineError::CalculationError { .. } => "CALCULATION_ERROR",
        }
    }

    /// True for errors that originate in the snapshot configuration rather
    /// than in a single staff member's data.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            EngineError::ConfigNotFound { .. }
                | EngineError::ConfigParseError { .. }
                | EngineError::IncompleteBracketCoverage { .. }
                | EngineError::FormulaCycleDetected { .. }
                | EngineError::DuplicateFormula { .. }
                | EngineError::ExpressionSyntax { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
