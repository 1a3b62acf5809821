use std::f64::consts::{PI, TAU};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use thousands::Separable;

use crate::codec::{self, Configuration};
use crate::cost::LandmarkPairing;
use crate::dock_config::{DockConfig, SamplingMode};
use crate::error::Result;
use crate::geometry::Pose;
use crate::local_search::{self, Bounds, Evaluation, LocalOutcome};
use crate::overlap;
use crate::render::Renderer;
use crate::shape::{transform_all, Shape};
use crate::solution::{DockSolution, SolveStatus};

/// Basin-hopping search over the poses of all shapes but the anchor
pub struct DockOptimizer {
    pub shapes: Vec<Shape>,
    pub config: DockConfig,
    pub pairing: LandmarkPairing,
    pub baseline: f64,
    /// Highest total overlap still considered feasible
    pub threshold: f64,
    pub sample_bounds: Bounds,
    pub search_bounds: Bounds,
    pub steps: Vec<f64>,
    evaluations: AtomicUsize,
}

impl DockOptimizer {
    pub fn new(shapes: Vec<Shape>, config: DockConfig) -> Self {
        let pairing = LandmarkPairing::new(&shapes);
        let baseline = overlap::self_overlap_baseline(&shapes);
        let threshold = baseline * (1.0 + config.feasibility_tolerance.max(0.0));
        let max_coord = Self::max_coord(&shapes);
        let n_free = shapes.len().saturating_sub(1);

        let sample_bounds = Self::generate_bounds(n_free, max_coord, PI);
        let search_bounds = Self::generate_bounds(n_free, 2.0 * max_coord, TAU);
        let steps = (0..n_free)
            .flat_map(|_| {
                let t = config.local_search.initial_step_fraction * max_coord;
                [t, t, config.local_search.initial_rotation_step]
            })
            .collect_vec();

        log::debug!(
            "[DOCK] {} shapes, {} landmark pairs, baseline overlap {:.3}, translation bound {:.3}",
            shapes.len(),
            pairing.len(),
            baseline,
            max_coord
        );

        Self {
            shapes,
            config,
            pairing,
            baseline,
            threshold,
            sample_bounds,
            search_bounds,
            steps,
            evaluations: AtomicUsize::new(0),
        }
    }

    /// Combined extent of all shapes: the sum of every shape's largest absolute bounding box coordinate
    pub fn max_coord(shapes: &[Shape]) -> f64 {
        shapes
            .iter()
            .map(|s| {
                [s.bbox.min().x, s.bbox.min().y, s.bbox.max().x, s.bbox.max().y]
                    .into_iter()
                    .map(f64::abs)
                    .fold(0.0, f64::max)
            })
            .sum()
    }

    pub fn generate_bounds(n_free: usize, translation: f64, rotation: f64) -> Bounds {
        let (lower, upper) = (0..n_free)
            .flat_map(|_| [(-translation, translation), (-translation, translation), (-rotation, rotation)])
            .unzip();
        Bounds::new(lower, upper)
    }

    /// Number of objective evaluations of the last solve
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    pub fn evaluate_configuration(&self, configuration: &[Pose]) -> Evaluation {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let posed = transform_all(&self.shapes, configuration);
        let cost = self.pairing.evaluate(&posed);
        let overlap = overlap::overlap(&posed);
        Evaluation {
            cost,
            overlap,
            violation: (overlap - self.threshold).max(0.0),
        }
    }

    pub fn evaluate(&self, flat: &[f64]) -> Result<Evaluation> {
        let configuration = codec::unpack_for(flat, self.shapes.len())?;
        Ok(self.evaluate_configuration(&configuration))
    }

    pub fn solve(&self) -> Result<DockSolution> {
        self.run(None)
    }

    /// Solves while handing every evaluated configuration to `renderer`.
    /// When local searches run in parallel, only accepted hops are rendered.
    pub fn solve_with_renderer(&self, renderer: &mut dyn Renderer) -> Result<DockSolution> {
        self.run(Some(renderer))
    }

    fn run(&self, mut renderer: Option<&mut (dyn Renderer + '_)>) -> Result<DockSolution> {
        let start_time = Instant::now();
        self.evaluations.store(0, Ordering::Relaxed);
        let n_shapes = self.shapes.len();

        if n_shapes <= 1 {
            log::info!("[DOCK] {} shape(s), nothing to optimize", n_shapes);
            let configuration = codec::identity(n_shapes);
            if let Some(r) = renderer.as_deref_mut() {
                r.render(&self.shapes, &configuration);
            }
            return Ok(self.create_solution(configuration, 0, start_time));
        }

        let mut rng = match self.config.prng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let x0 = self.sample_bounds.sample_uniform(&mut rng);
        let mut current = self.local_search(&x0, renderer.as_deref_mut())?;
        let mut best = current.clone();
        let mut n_accepted = 0;
        log::debug!(
            "[DOCK] initial local search: cost {:.4}, violation {:.4e}",
            current.evaluation.cost,
            current.evaluation.violation
        );

        let batch_size = self.config.parallel_batch.max(1);
        let mut hop = 0;
        while hop < self.config.n_iterations {
            let batch = batch_size.min(self.config.n_iterations - hop);
            let starts = (0..batch).map(|_| self.propose(&current.x, &mut rng)).collect_vec();

            let outcomes = match batch {
                1 => vec![self.local_search(&starts[0], renderer.as_deref_mut())?],
                _ => starts
                    .par_iter()
                    .map(|start| self.local_search(start, None))
                    .collect::<Result<Vec<_>>>()?,
            };

            for outcome in outcomes {
                hop += 1;
                if outcome.evaluation.improves_on(&best.evaluation) {
                    log::debug!(
                        "[DOCK] hop {}: new best, cost {:.4}, violation {:.4e}",
                        hop,
                        outcome.evaluation.cost,
                        outcome.evaluation.violation
                    );
                    best = outcome.clone();
                }
                if self.metropolis(&current.evaluation, &outcome.evaluation, &mut rng) {
                    n_accepted += 1;
                    current = outcome;
                    if batch > 1 {
                        if let Some(r) = renderer.as_deref_mut() {
                            r.render(&self.shapes, &codec::unpack_for(&current.x, n_shapes)?);
                        }
                    }
                }
            }
        }

        let configuration = codec::unpack_for(&best.x, n_shapes)?;
        if let Some(r) = renderer.as_deref_mut() {
            r.render(&self.shapes, &configuration);
        }
        let solution = self.create_solution(configuration, n_accepted, start_time);

        log::info!(
            "[DOCK] {} hops ({} accepted), {} evaluations in {:?}",
            self.config.n_iterations,
            n_accepted,
            solution.n_evaluations.separate_with_commas(),
            solution.elapsed
        );
        match solution.status {
            SolveStatus::Feasible => log::info!(
                "[DOCK] feasible solution, cost {:.4}, cross overlap {:.4e}",
                solution.cost,
                solution.cross_overlap
            ),
            SolveStatus::OptimizationFailure { violation } => log::warn!(
                "[DOCK] no feasible configuration found, cost {:.4}, violation {:.4e}",
                solution.cost,
                violation
            ),
        }
        Ok(solution)
    }

    fn local_search(&self, start: &[f64], mut renderer: Option<&mut (dyn Renderer + '_)>) -> Result<LocalOutcome> {
        let n_shapes = self.shapes.len();
        local_search::minimize_constrained(
            |x| {
                let configuration = codec::unpack_for(x, n_shapes)?;
                if let Some(r) = renderer.as_deref_mut() {
                    r.render(&self.shapes, &configuration);
                }
                Ok(self.evaluate_configuration(&configuration))
            },
            start,
            &self.steps,
            &self.search_bounds,
            &self.config.local_search,
        )
    }

    /// Start vector of the next hop
    fn propose<R: Rng>(&self, current: &[f64], rng: &mut R) -> Vec<f64> {
        match self.config.sampling {
            SamplingMode::Uniform => self.sample_bounds.sample_uniform(rng),
            SamplingMode::Perturb => {
                let step = self.config.perturb_step.abs();
                let mut x = current
                    .iter()
                    .zip(self.sample_bounds.upper.iter())
                    .map(|(v, half_width)| {
                        let w = step * half_width;
                        v + rng.gen_range(-w..=w)
                    })
                    .collect_vec();
                self.search_bounds.clamp(&mut x);
                x
            }
        }
    }

    /// Always accepts improvements, worse states with probability `exp(-delta / T)`
    fn metropolis<R: Rng>(&self, current: &Evaluation, candidate: &Evaluation, rng: &mut R) -> bool {
        let penalty = self.config.local_search.max_penalty();
        let delta = candidate.merit(penalty) - current.merit(penalty);
        if delta <= 0.0 {
            return true;
        }
        let temperature = self.config.temperature;
        temperature > 0.0 && rng.gen::<f64>() < (-delta / temperature).exp()
    }

    fn create_solution(&self, configuration: Configuration, n_accepted: usize, start_time: Instant) -> DockSolution {
        let posed = transform_all(&self.shapes, &configuration);
        let cost = self.pairing.evaluate(&posed);
        let cross_overlap = overlap::cross_overlap(&posed);
        let overlap = overlap::self_overlap(&posed) + cross_overlap;
        let violation = (overlap - self.threshold).max(0.0);
        let status = match violation > 0.0 {
            true => SolveStatus::OptimizationFailure { violation },
            false => SolveStatus::Feasible,
        };

        DockSolution {
            configuration,
            cost,
            overlap,
            cross_overlap,
            status,
            n_evaluations: self.evaluations(),
            n_accepted,
            elapsed: start_time.elapsed(),
        }
    }
}
