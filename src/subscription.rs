// =============================================================================
// Subscription Policy — per-plan symbol allow-lists
// =============================================================================
//
// Maps a subscription plan name to the slice of the symbol universe the plan
// may request. The policy is built from config and injected through AppState
// — it is data, not a module-level constant, so tests can construct their
// own tables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One plan's entitlement. `symbol_limit == None` means unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSpec {
    pub name: String,
    #[serde(default)]
    pub symbol_limit: Option<usize>,
}

/// Per-plan symbol allow-lists over an ordered symbol universe.
///
/// A plan with limit `n` is entitled to the FIRST `n` symbols of the
/// universe, in universe order. An unknown plan is entitled to nothing.
#[derive(Debug, Clone)]
pub struct SubscriptionPolicy {
    universe: Vec<String>,
    limits: HashMap<String, Option<usize>>,
}

impl SubscriptionPolicy {
    pub fn new(universe: Vec<String>, plans: &[PlanSpec]) -> Self {
        let limits = plans
            .iter()
            .map(|p| (p.name.clone(), p.symbol_limit))
            .collect();
        Self { universe, limits }
    }

    /// The symbols the given plan may request, in universe order.
    pub fn allowed_symbols(&self, plan: &str) -> &[String] {
        match self.limits.get(plan) {
            Some(None) => &self.universe,
            Some(Some(limit)) => {
                let end = (*limit).min(self.universe.len());
                &self.universe[..end]
            }
            None => &[],
        }
    }

    pub fn is_allowed(&self, plan: &str, symbol: &str) -> bool {
        self.allowed_symbols(plan).iter().any(|s| s == symbol)
    }

    /// Full ordered symbol universe, independent of any plan.
    pub fn universe(&self) -> &[String] {
        &self.universe
    }
}
