//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load a payroll snapshot from YAML
//! files, including snapshot metadata, the component registry, the
//! progressive tax table and the formula catalog.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::PayrollSnapshot;
//!
//! let snapshot = PayrollSnapshot::load("./config/ng2025").unwrap();
//! println!("Loaded rule set: {}", snapshot.metadata().name);
//! ```

mod loader;
mod types;

pub use types::{
    ComponentEntry, ComponentsFile, FormulasFile, PayrollSnapshot, SnapshotMetadata,
    TaxBracketsFile,
};
