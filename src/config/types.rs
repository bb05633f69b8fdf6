//! Configuration schemas for payroll snapshot files.
//!
//! A snapshot directory holds four YAML files: `snapshot.yaml` (identity),
//! `components.yaml` (the component registry), `tax_brackets.yaml` (the
//! active progressive table) and `formulas.yaml` (system defaults and any
//! client overrides). Monetary values are quoted strings so they parse to
//! exact decimals.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::EngineResult;
use crate::models::{
    CalculationMethod, ComponentCategory, ComponentRegistry, Formula, FormulaCatalog, TaxBracket,
    TaxBracketTable,
};

/// Snapshot identity and provenance, from `snapshot.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotMetadata {
    /// Short identifier, e.g. "ng-paye-2025".
    pub code: String,
    /// The human-readable name of the rule set.
    pub name: String,
    /// Version stamp carried into every result computed against the snapshot.
    pub version: String,
    /// URL to the statutory source the rules were transcribed from.
    pub source_url: String,
}

/// One component definition in `components.yaml`.
///
/// The map key supplies the component code.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentEntry {
    /// The human-readable name of the component.
    pub name: String,
    /// Payroll category.
    pub category: ComponentCategory,
    /// Whether the component counts toward the pensionable amount.
    pub is_pensionable: bool,
    /// Whether the component is subject to income tax.
    pub is_taxable: bool,
    /// How amounts for this component are determined.
    pub calculation_method: CalculationMethod,
    /// Position in payslip listings.
    pub display_order: u32,
}

/// Components configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentsFile {
    /// Map of component code to component definition.
    pub components: HashMap<String, ComponentEntry>,
}

/// Tax brackets configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxBracketsFile {
    /// The date the table came into force.
    pub effective_from: NaiveDate,
    /// The tiers, ascending by tier number.
    pub brackets: Vec<TaxBracket>,
}

/// Formulas configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct FormulasFile {
    /// Default and override formula rows.
    pub formulas: Vec<Formula>,
}

/// The complete payroll rule set loaded from YAML files.
///
/// A snapshot is immutable for its lifetime: every staff member in a run is
/// computed against the same registry, bracket table and formula catalog,
/// and the snapshot version is stamped into every result it produces.
#[derive(Debug, Clone)]
pub struct PayrollSnapshot {
    /// Snapshot metadata.
    metadata: SnapshotMetadata,
    /// The component registry.
    registry: ComponentRegistry,
    /// The active progressive tax table.
    tax_table: TaxBracketTable,
    /// The compiled formula catalog.
    catalog: FormulaCatalog,
}

impl PayrollSnapshot {
    /// Creates a new PayrollSnapshot from its component parts.
    ///
    /// Validation happens here, once: the bracket table must cover all
    /// income from zero upward, and the catalog must reference only
    /// registered components and be free of dependency cycles. A snapshot
    /// that constructs successfully is safe to compute against.
    pub fn new(
        metadata: SnapshotMetadata,
        registry: ComponentRegistry,
        tax_table: TaxBracketTable,
        catalog: FormulaCatalog,
    ) -> EngineResult<Self> {
        tax_table.validate()?;
        catalog.validate(&registry)?;
        Ok(Self {
            metadata,
            registry,
            tax_table,
            catalog,
        })
    }

    /// Returns the snapshot metadata.
    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    /// Returns the component registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Returns the active progressive tax table.
    pub fn tax_table(&self) -> &TaxBracketTable {
        &self.tax_table
    }

    /// Returns the compiled formula catalog.
    pub fn catalog(&self) -> &FormulaCatalog {
        &self.catalog
    }

    /// Returns the version stamp carried into results.
    pub fn version(&self) -> &str {
        &self.metadata.version
    }
}
