//! Formula definitions and the catalog that resolves them.
//!
//! A formula row is either a system default (`client_id` absent) or a
//! client override. The catalog compiles every active row once, resolves
//! codes override-first, and validates the whole set at load time so that
//! runs never start against a broken catalog.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::expr::{Expr, parse};
use crate::models::ComponentRegistry;

/// A formula row as configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    /// The step or value this formula produces, e.g. `NET_PAY`.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// The expression source text.
    pub expression: String,
    /// Owning client for an override; absent for system defaults.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Inactive rows are ignored by the catalog.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Formula {
    /// Label used in audit steps: `system_default` or `client_override`.
    pub fn source(&self) -> &'static str {
        if self.client_id.is_some() {
            "client_override"
        } else {
            "system_default"
        }
    }

    fn scope_label(&self) -> String {
        match &self.client_id {
            Some(client) => format!("client '{client}'"),
            None => "system default".to_string(),
        }
    }
}

/// A formula compiled to its AST, with its reference sets cached for
/// dependency validation and audit reporting.
#[derive(Debug, Clone)]
pub struct CompiledFormula {
    /// The configured row.
    pub formula: Formula,
    /// The parsed expression.
    pub expr: Expr,
    /// Context variables the expression reads.
    pub variables: BTreeSet<String>,
    /// Component codes the expression looks up directly.
    pub component_refs: BTreeSet<String>,
}

/// The compiled formula catalog: system defaults layered under client
/// overrides.
#[derive(Debug, Clone)]
pub struct FormulaCatalog {
    defaults: HashMap<String, CompiledFormula>,
    overrides: HashMap<String, HashMap<String, CompiledFormula>>,
}

impl FormulaCatalog {
    /// Compiles the active rows into a catalog.
    ///
    /// Fails if any expression does not parse, or if more than one active
    /// row exists for the same code and scope.
    pub fn new(rows: Vec<Formula>) -> EngineResult<Self> {
        let mut defaults: HashMap<String, CompiledFormula> = HashMap::new();
        let mut overrides: HashMap<String, HashMap<String, CompiledFormula>> = HashMap::new();

        for row in rows {
            if !row.is_active {
                continue;
            }
            let expr = parse(&row.expression, &row.code)?;
            let compiled = CompiledFormula {
                variables: expr.variables(),
                component_refs: expr.component_refs(),
                expr,
                formula: row,
            };
            let code = compiled.formula.code.clone();
            let scope = compiled.formula.scope_label();
            let displaced = match compiled.formula.client_id.clone() {
                None => defaults.insert(code.clone(), compiled),
                Some(client) => overrides
                    .entry(code.clone())
                    .or_default()
                    .insert(client, compiled),
            };
            if displaced.is_some() {
                return Err(EngineError::DuplicateFormula {
                    formula_code: code,
                    scope,
                });
            }
        }

        Ok(FormulaCatalog {
            defaults,
            overrides,
        })
    }

    /// Resolves the formula for a code: the client's active override if one
    /// exists, otherwise the system default.
    pub fn resolve(
        &self,
        code: &str,
        client_id: Option<&str>,
    ) -> EngineResult<&CompiledFormula> {
        if let Some(client) = client_id {
            if let Some(compiled) = self
                .overrides
                .get(code)
                .and_then(|by_client| by_client.get(client))
            {
                return Ok(compiled);
            }
        }
        self.defaults
            .get(code)
            .ok_or_else(|| EngineError::FormulaNotFound {
                formula_code: code.to_string(),
            })
    }

    /// Every compiled formula, defaults and overrides alike.
    pub fn formulas(&self) -> impl Iterator<Item = &CompiledFormula> {
        self.defaults.values().chain(
            self.overrides
                .values()
                .flat_map(|by_client| by_client.values()),
        )
    }

    /// The number of compiled formulas.
    pub fn len(&self) -> usize {
        self.defaults.len()
            + self
                .overrides
                .values()
                .map(|by_client| by_client.len())
                .sum::<usize>()
    }

    /// Whether the catalog holds no formulas.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates the catalog against a component registry.
    ///
    /// Every direct component lookup must name a registered component, and
    /// the dependency graph over formula codes must be acyclic. The graph
    /// is the union over defaults and overrides: a cycle that would only
    /// materialize for one client's override set is still rejected.
    pub fn validate(&self, registry: &ComponentRegistry) -> EngineResult<()> {
        for compiled in self.formulas() {
            for code in &compiled.component_refs {
                registry.component(code)?;
            }
        }

        let known: BTreeSet<String> = self
            .formulas()
            .map(|c| c.formula.code.clone())
            .collect();

        let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for compiled in self.formulas() {
            let targets = edges.entry(compiled.formula.code.clone()).or_default();
            for variable in &compiled.variables {
                let as_code = variable.to_uppercase();
                if known.contains(&as_code) {
                    targets.insert(as_code);
                }
            }
        }

        let mut state: HashMap<String, VisitState> = HashMap::new();
        let mut path: Vec<String> = Vec::new();
        for node in edges.keys() {
            if !state.contains_key(node.as_str()) {
                if let Some(cycle) = find_cycle(node, &edges, &mut state, &mut path) {
                    return Err(EngineError::FormulaCycleDetected { cycle });
                }
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq)]
enum VisitState {
    InProgress,
    Done,
}

fn find_cycle(
    node: &str,
    edges: &BTreeMap<String, BTreeSet<String>>,
    state: &mut HashMap<String, VisitState>,
    path: &mut Vec<String>,
) -> Option<String> {
    state.insert(node.to_string(), VisitState::InProgress);
    path.push(node.to_string());

    if let Some(targets) = edges.get(node) {
        for target in targets {
            match state.get(target.as_str()) {
                Some(VisitState::InProgress) => {
                    let start = path.iter().position(|p| p == target).unwrap_or(0);
                    let mut cycle: Vec<String> = path[start..].to_vec();
                    cycle.push(target.clone());
                    return Some(cycle.join(" -> "));
                }
                Some(VisitState::Done) => {}
                None => {
                    if let Some(cycle) = find_cycle(target, edges, state, path) {
                        return Some(cycle);
                    }
                }
            }
        }
    }

    path.pop();
    state.insert(node.to_string(), VisitState::Done);
    None
}
