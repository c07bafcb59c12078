//! Bounded Nelder-Mead simplex minimisation.

/// Result of a Nelder-Mead run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub optimal_point: Vec<f64>,
    pub optimal_value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimisation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    /// Stop when the spread of objective values across the simplex is
    /// below this value.
    pub tolerance: f64,
    /// Initial simplex step size along each axis.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

impl NelderMeadConfig {
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

struct Simplex<'a, F> {
    objective: F,
    bounds: &'a [(f64, f64)],
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
}

impl<'a, F> Simplex<'a, F>
where
    F: Fn(&[f64]) -> f64,
{
    fn new(objective: F, initial: &[f64], bounds: &'a [(f64, f64)], step: f64) -> Self {
        let mut simplex = Self {
            objective,
            bounds,
            vertices: Vec::with_capacity(initial.len() + 1),
            values: Vec::with_capacity(initial.len() + 1),
        };
        simplex.push(initial.to_vec());
        for i in 0..initial.len() {
            let mut vertex = initial.to_vec();
            // Step away from a bound rather than into it.
            let (lo, hi) = simplex.bound(i);
            vertex[i] = if vertex[i] + step <= hi {
                vertex[i] + step
            } else {
                (vertex[i] - step).max(lo)
            };
            simplex.push(vertex);
        }
        simplex
    }

    fn bound(&self, i: usize) -> (f64, f64) {
        self.bounds
            .get(i)
            .copied()
            .unwrap_or((f64::NEG_INFINITY, f64::INFINITY))
    }

    fn clamp(&self, mut point: Vec<f64>) -> Vec<f64> {
        for (i, x) in point.iter_mut().enumerate() {
            let (lo, hi) = self.bound(i);
            *x = x.clamp(lo, hi);
        }
        point
    }

    /// Objective with non-finite values mapped to +inf so they always lose.
    fn eval(&self, point: &[f64]) -> f64 {
        let v = (self.objective)(point);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    }

    fn push(&mut self, vertex: Vec<f64>) {
        let vertex = self.clamp(vertex);
        let value = self.eval(&vertex);
        self.vertices.push(vertex);
        self.values.push(value);
    }

    fn replace(&mut self, idx: usize, vertex: Vec<f64>, value: f64) {
        self.vertices[idx] = vertex;
        self.values[idx] = value;
    }

    /// Indices sorted from best to worst.
    fn ranking(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.values.len()).collect();
        idx.sort_by(|&a, &b| self.values[a].total_cmp(&self.values[b]));
        idx
    }

    fn centroid_without(&self, worst: usize) -> Vec<f64> {
        let dim = self.vertices[0].len();
        let mut c = vec![0.0; dim];
        for (i, v) in self.vertices.iter().enumerate() {
            if i != worst {
                for (cj, vj) in c.iter_mut().zip(v) {
                    *cj += vj;
                }
            }
        }
        let count = (self.vertices.len() - 1) as f64;
        c.iter_mut().for_each(|x| *x /= count);
        c
    }

    /// Point `centroid + coef * (towards - centroid)`, clamped and evaluated.
    fn probe(&self, centroid: &[f64], towards: &[f64], coef: f64) -> (Vec<f64>, f64) {
        let point: Vec<f64> = centroid
            .iter()
            .zip(towards)
            .map(|(c, t)| c + coef * (t - c))
            .collect();
        let point = self.clamp(point);
        let value = self.eval(&point);
        (point, value)
    }

    fn shrink_towards(&mut self, best: usize) {
        let anchor = self.vertices[best].clone();
        for i in 0..self.vertices.len() {
            if i == best {
                continue;
            }
            let shrunk: Vec<f64> = anchor
                .iter()
                .zip(&self.vertices[i])
                .map(|(a, v)| a + SHRINK * (v - a))
                .collect();
            let shrunk = self.clamp(shrunk);
            let value = self.eval(&shrunk);
            self.replace(i, shrunk, value);
        }
    }
}

/// Minimise `objective` starting from `initial`, keeping each coordinate
/// inside `bounds` (missing entries are unbounded).
///
/// # Example
/// ```
/// use tsforecast::utils::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 0.4).powi(2) + (x[1] + 0.2).powi(2),
///     &[0.0, 0.0],
///     &[(-0.99, 0.99), (-0.99, 0.99)],
///     &NelderMeadConfig::default(),
/// );
/// assert!((result.optimal_point[0] - 0.4).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: &[(f64, f64)],
    config: &NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        let value = objective(initial);
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: value,
            iterations: 0,
            converged: value.is_finite(),
        };
    }

    let mut simplex = Simplex::new(objective, initial, bounds, config.initial_step);
    let n = initial.len();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let order = simplex.ranking();
        let (best, second_worst, worst) = (order[0], order[n - 1], order[n]);
        let (f_best, f_second, f_worst) = (
            simplex.values[best],
            simplex.values[second_worst],
            simplex.values[worst],
        );

        if f_best.is_finite() && (f_worst - f_best).abs() < config.tolerance {
            converged = true;
            break;
        }

        let centroid = simplex.centroid_without(worst);
        let worst_vertex = simplex.vertices[worst].clone();
        let (reflected, f_reflected) = simplex.probe(&centroid, &worst_vertex, -REFLECT);

        if f_reflected < f_best {
            let (expanded, f_expanded) = simplex.probe(&centroid, &reflected, EXPAND);
            if f_expanded < f_reflected {
                simplex.replace(worst, expanded, f_expanded);
            } else {
                simplex.replace(worst, reflected, f_reflected);
            }
            continue;
        }

        if f_reflected < f_second {
            simplex.replace(worst, reflected, f_reflected);
            continue;
        }

        let (contracted, f_contracted) = if f_reflected < f_worst {
            simplex.probe(&centroid, &reflected, CONTRACT)
        } else {
            simplex.probe(&centroid, &worst_vertex, CONTRACT)
        };
        if f_contracted < f_worst.min(f_reflected) {
            simplex.replace(worst, contracted, f_contracted);
            continue;
        }

        simplex.shrink_towards(best);
    }

    let best = simplex.ranking()[0];
    NelderMeadResult {
        optimal_point: simplex.vertices[best].clone(),
        optimal_value: simplex.values[best],
        iterations,
        converged,
    }
}
