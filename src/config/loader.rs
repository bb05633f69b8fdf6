//! Configuration loading functionality.
//!
//! This module implements [`PayrollSnapshot::load`], which reads a snapshot
//! directory of YAML files, assembles the registry, bracket table and
//! formula catalog, and validates the whole rule set before returning it.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::{ComponentRegistry, EmolumentComponent, FormulaCatalog, TaxBracketTable};

use super::types::{
    ComponentsFile, FormulasFile, PayrollSnapshot, SnapshotMetadata, TaxBracketsFile,
};

impl PayrollSnapshot {
    /// Loads a snapshot from the specified directory.
    ///
    /// # Directory Structure
    ///
    /// The snapshot directory should have the following structure:
    /// ```text
    /// config/ng2025/
    /// ├── snapshot.yaml      # Snapshot identity and version
    /// ├── components.yaml    # Emolument component registry
    /// ├── tax_brackets.yaml  # Progressive tax table
    /// └── formulas.yaml      # System default formulas and overrides
    /// ```
    ///
    /// # Returns
    ///
    /// Returns a validated `PayrollSnapshot` on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The bracket table leaves income uncovered
    /// - Any formula fails to parse, references an unregistered component,
    ///   or participates in a dependency cycle
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::PayrollSnapshot;
    ///
    /// let snapshot = PayrollSnapshot::load("./config/ng2025")?;
    /// println!("Loaded rule set version {}", snapshot.version());
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        // Load snapshot.yaml
        let metadata = load_yaml::<SnapshotMetadata>(&path.join("snapshot.yaml"))?;

        // Load components.yaml
        let components_file = load_yaml::<ComponentsFile>(&path.join("components.yaml"))?;
        let components = components_file
            .components
            .into_iter()
            .map(|(code, entry)| EmolumentComponent {
                code,
                name: entry.name,
                category: entry.category,
                is_pensionable: entry.is_pensionable,
                is_taxable: entry.is_taxable,
                calculation_method: entry.calculation_method,
                display_order: entry.display_order,
            })
            .collect();
        let registry = ComponentRegistry::new(components);

        // Load tax_brackets.yaml
        let brackets_file = load_yaml::<TaxBracketsFile>(&path.join("tax_brackets.yaml"))?;
        let tax_table = TaxBracketTable::new(brackets_file.brackets, brackets_file.effective_from);

        // Load formulas.yaml
        let formulas_file = load_yaml::<FormulasFile>(&path.join("formulas.yaml"))?;
        let catalog = FormulaCatalog::new(formulas_file.formulas)?;

        PayrollSnapshot::new(metadata, registry, tax_table, catalog)
    }
}

/// Loads and parses a YAML file.
fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
    let path_str = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
        path: path_str.clone(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
        path: path_str,
        message: e.to_string(),
    })
}
