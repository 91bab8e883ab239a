use serde::{Deserialize, Serialize};

/// The deepest either phase searches before giving up.
pub const MAX_DEPTH: u8 = 45;

/// Tuning knobs for [`TwoPhaseSolver`](crate::TwoPhaseSolver).
///
/// Deserializes from a partial TOML table; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Iterative deepening stops after this bound, in each phase.
    pub max_depth: u8,
    /// Only search one order of two consecutive turns of opposite faces,
    /// since they commute.
    pub prune_commuting_faces: bool,
    /// Expand the children with the smallest heuristic first.
    pub order_by_heuristic: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_depth: MAX_DEPTH,
            prune_commuting_faces: true,
            order_by_heuristic: true,
        }
    }
}

impl SolverConfig {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_prune_commuting_faces(mut self, prune: bool) -> Self {
        self.prune_commuting_faces = prune;
        self
    }

    #[must_use]
    pub fn with_order_by_heuristic(mut self, order: bool) -> Self {
        self.order_by_heuristic = order;
        self
    }
}
