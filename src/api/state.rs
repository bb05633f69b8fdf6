//! Application state for the payroll engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::PayrollSnapshot;

/// Shared application state.
///
/// Contains resources that are shared across all request handlers. The
/// snapshot is behind an `Arc` so batch runs can move a handle onto a
/// blocking worker without copying the rule set.
#[derive(Clone)]
pub struct AppState {
    /// The loaded payroll snapshot.
    snapshot: Arc<PayrollSnapshot>,
}

impl AppState {
    /// Creates a new application state with the given snapshot.
    pub fn new(snapshot: PayrollSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }

    /// Returns a reference to the payroll snapshot.
    pub fn snapshot(&self) -> &PayrollSnapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
