use serde::{Deserialize, Serialize};

/// How the start vector of every hop is drawn
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    Uniform,
    /// Uniform displacement around the current state, the classic basin-hopping step
    Perturb,
}

/// Configuration of the global search
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct DockConfig {
    /// Number of hops after the initial local minimization
    pub n_iterations: usize,
    /// Metropolis temperature. Zero only accepts improving hops.
    pub temperature: f64,
    pub sampling: SamplingMode,
    /// Half-width of a perturbation as a fraction of the translation bound (rotations use the same fraction of pi)
    pub perturb_step: f64,
    /// Seed for the PRNG. If undefined, the search runs in non-deterministic mode using entropy
    pub prng_seed: Option<u64>,
    /// Allowed cross overlap as a fraction of the shapes' combined area
    pub feasibility_tolerance: f64,
    /// Number of hops whose local searches run concurrently. 1 keeps everything on the calling thread.
    pub parallel_batch: usize,
    /// Move every shape's centroid to its local origin when parsing an instance
    pub center_shapes: bool,
    pub local_search: LocalSearchConfig,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            n_iterations: 100,
            temperature: 1.0,
            sampling: SamplingMode::Uniform,
            perturb_step: 0.25,
            prng_seed: None,
            feasibility_tolerance: 1e-6,
            parallel_batch: 1,
            center_shapes: false,
            local_search: LocalSearchConfig::default(),
        }
    }
}

/// Configuration of the penalty Nelder–Mead local minimizer
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct LocalSearchConfig {
    /// Budget of objective evaluations per penalty round
    pub max_evaluations: usize,
    pub x_tolerance: f64,
    pub f_tolerance: f64,
    /// Initial simplex step for translations, as a fraction of the translation bound
    pub initial_step_fraction: f64,
    pub initial_rotation_step: f64,
    /// Weight of the overlap violation in the first round
    pub penalty_weight: f64,
    /// Factor applied to the weight after every infeasible round
    pub penalty_growth: f64,
    pub max_penalty_rounds: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            max_evaluations: 2000,
            x_tolerance: 1e-7,
            f_tolerance: 1e-10,
            initial_step_fraction: 0.1,
            initial_rotation_step: 0.5,
            penalty_weight: 1.0,
            penalty_growth: 10.0,
            max_penalty_rounds: 6,
        }
    }
}

impl LocalSearchConfig {
    /// Penalty weight of the last round
    pub fn max_penalty(&self) -> f64 {
        self.penalty_weight * self.penalty_growth.powi(self.max_penalty_rounds.saturating_sub(1) as i32)
    }
}
