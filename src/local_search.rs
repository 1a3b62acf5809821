use itertools::Itertools;
use rand::Rng;

use crate::dock_config::LocalSearchConfig;
use crate::error::Result;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

#[derive(Clone, Debug)]
pub struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bounds {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Self {
        assert_eq!(lower.len(), upper.len());
        assert!(lower.iter().zip(upper.iter()).all(|(l, u)| l <= u));
        Bounds { lower, upper }
    }

    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    pub fn clamp(&self, x: &mut [f64]) {
        for ((v, l), u) in x.iter_mut().zip(self.lower.iter()).zip(self.upper.iter()) {
            *v = v.clamp(*l, *u);
        }
    }

    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(v, (l, u))| v >= l && v <= u)
    }

    pub fn sample_uniform<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(&l, &u)| rng.gen_range(l..=u))
            .collect()
    }
}

/// Objective value and constraint violation of one point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub cost: f64,
    pub overlap: f64,
    /// Amount by which the overlap exceeds the feasibility threshold
    pub violation: f64,
}

impl Evaluation {
    pub fn is_feasible(&self) -> bool {
        self.violation <= 0.0
    }

    pub fn merit(&self, penalty: f64) -> f64 {
        self.cost + penalty * self.violation
    }

    /// Feasible beats infeasible, then lower cost among feasible and lower violation among infeasible
    pub fn improves_on(&self, other: &Evaluation) -> bool {
        match (self.is_feasible(), other.is_feasible()) {
            (true, false) => true,
            (false, true) => false,
            (true, true) => self.cost < other.cost,
            (false, false) => (self.violation, self.cost) < (other.violation, other.cost),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NelderMeadResult {
    pub x: Vec<f64>,
    pub value: f64,
    pub evaluations: usize,
}

/// Minimizes `f` inside `bounds`, starting from a simplex spanned by `x0` and one step along every axis
pub fn nelder_mead<F>(
    mut f: F,
    x0: &[f64],
    steps: &[f64],
    bounds: &Bounds,
    config: &LocalSearchConfig,
) -> Result<NelderMeadResult>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    let n = x0.len();
    debug_assert_eq!(steps.len(), n);

    let mut start = x0.to_vec();
    bounds.clamp(&mut start);
    let f_start = f(&start)?;
    let mut evaluations = 1;
    if n == 0 {
        return Ok(NelderMeadResult {
            x: start,
            value: f_start,
            evaluations,
        });
    }

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((start.clone(), f_start));
    for i in 0..n {
        let mut vertex = start.clone();
        vertex[i] += steps[i];
        if vertex[i] > bounds.upper[i] {
            vertex[i] = start[i] - steps[i];
        }
        bounds.clamp(&mut vertex);
        let value = f(&vertex)?;
        evaluations += 1;
        simplex.push((vertex, value));
    }

    while evaluations < config.max_evaluations {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let (best, best_value) = simplex[0].clone();
        let worst_value = simplex[n].1;
        let diameter = simplex[1..]
            .iter()
            .flat_map(|(v, _)| v.iter().zip(best.iter()).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max);
        if (worst_value - best_value).abs() <= config.f_tolerance * (1.0 + best_value.abs())
            && diameter <= config.x_tolerance
        {
            break;
        }

        let centroid = (0..n)
            .map(|j| simplex[..n].iter().map(|(v, _)| v[j]).sum::<f64>() / n as f64)
            .collect_vec();
        let worst = simplex[n].0.clone();

        let reflected = towards(&centroid, &worst, -REFLECTION, bounds);
        let reflected_value = f(&reflected)?;
        evaluations += 1;

        if reflected_value < best_value {
            let expanded = towards(&centroid, &reflected, EXPANSION, bounds);
            let expanded_value = f(&expanded)?;
            evaluations += 1;
            simplex[n] = match expanded_value < reflected_value {
                true => (expanded, expanded_value),
                false => (reflected, reflected_value),
            };
        } else if reflected_value < simplex[n - 1].1 {
            simplex[n] = (reflected, reflected_value);
        } else {
            let contracted = match reflected_value < worst_value {
                true => towards(&centroid, &reflected, CONTRACTION, bounds),
                false => towards(&centroid, &worst, CONTRACTION, bounds),
            };
            let contracted_value = f(&contracted)?;
            evaluations += 1;
            if contracted_value < reflected_value.min(worst_value) {
                simplex[n] = (contracted, contracted_value);
            } else {
                for vertex in simplex.iter_mut().skip(1) {
                    let shrunk = towards(&best, &vertex.0, SHRINK, bounds);
                    let value = f(&shrunk)?;
                    evaluations += 1;
                    *vertex = (shrunk, value);
                }
            }
        }
    }

    let (x, value) = simplex
        .into_iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap_or((start, f_start));
    Ok(NelderMeadResult { x, value, evaluations })
}

/// `origin + t * (target - origin)`, clamped to the box
fn towards(origin: &[f64], target: &[f64], t: f64, bounds: &Bounds) -> Vec<f64> {
    let mut x = origin
        .iter()
        .zip(target.iter())
        .map(|(o, p)| o + t * (p - o))
        .collect_vec();
    bounds.clamp(&mut x);
    x
}

#[derive(Clone, Debug)]
pub struct LocalOutcome {
    pub x: Vec<f64>,
    pub evaluation: Evaluation,
    pub evaluations: usize,
    pub rounds: usize,
}

/// Penalty rounds of Nelder–Mead until the result is feasible or the round budget is spent, then one polishing restart
pub fn minimize_constrained<E>(
    mut evaluate: E,
    x0: &[f64],
    steps: &[f64],
    bounds: &Bounds,
    config: &LocalSearchConfig,
) -> Result<LocalOutcome>
where
    E: FnMut(&[f64]) -> Result<Evaluation>,
{
    let mut penalty = config.penalty_weight;
    let mut evaluations = 0;
    let mut rounds = 0;

    let mut x = x0.to_vec();
    bounds.clamp(&mut x);

    let mut evaluation = loop {
        rounds += 1;
        let result = nelder_mead(|v| Ok(evaluate(v)?.merit(penalty)), &x, steps, bounds, config)?;
        evaluations += result.evaluations;
        x = result.x;
        let evaluation = evaluate(&x)?;
        evaluations += 1;
        log::trace!(
            "[LS] round {} penalty {:.1e}: cost {:.4}, violation {:.4e}",
            rounds,
            penalty,
            evaluation.cost,
            evaluation.violation
        );
        if evaluation.is_feasible() || rounds >= config.max_penalty_rounds {
            break evaluation;
        }
        penalty *= config.penalty_growth;
    };

    if evaluation.is_feasible() {
        let polished = nelder_mead(|v| Ok(evaluate(v)?.merit(penalty)), &x, steps, bounds, config)?;
        evaluations += polished.evaluations;
        let polished_evaluation = evaluate(&polished.x)?;
        evaluations += 1;
        if polished_evaluation.improves_on(&evaluation) {
            x = polished.x;
            evaluation = polished_evaluation;
        }
    }

    Ok(LocalOutcome {
        x,
        evaluation,
        evaluations,
        rounds,
    })
}
