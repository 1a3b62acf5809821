use std::time::Duration;

use crate::codec::Configuration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveStatus {
    /// No distinct shapes overlap beyond the feasibility tolerance
    Feasible,
    /// The iteration budget ran out without a feasible configuration; the least infeasible one is returned
    OptimizationFailure { violation: f64 },
}

/// Result of a solve: the best configuration found and its scores
#[derive(Debug, Clone)]
pub struct DockSolution {
    pub configuration: Configuration,
    pub cost: f64,
    /// Overlap including every shape's own area
    pub overlap: f64,
    /// Overlap between distinct shapes only
    pub cross_overlap: f64,
    pub status: SolveStatus,
    pub n_evaluations: usize,
    pub n_accepted: usize,
    pub elapsed: Duration,
}

impl DockSolution {
    pub fn is_feasible(&self) -> bool {
        self.status == SolveStatus::Feasible
    }
}
