//! Derivative-free minimisation with the Nelder-Mead simplex method.
//!
//! Deterministic: the same objective and start point always give the same
//! result, which keeps volatility estimates bit-identical between runs.

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct NelderMeadOptions {
    /// Iteration limit per simplex run.
    pub max_iter: usize,
    /// Relative spread of objective values across the simplex at convergence.
    pub ftol: f64,
    /// Absolute floor added to `ftol` for objectives near zero.
    pub fatol: f64,
    /// Number of fresh simplex runs started from the previous optimum.
    pub restarts: usize,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iter: 5000,
            ftol: 1e-12,
            fatol: 1e-14,
            restarts: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimise `f` starting at `x0`, with the initial simplex spanned by
/// `x0 + steps[i] * e_i`. Non-finite objective values count as +inf.
pub fn minimize<F>(f: F, x0: &[f64], steps: &[f64], options: &NelderMeadOptions) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let eval = |x: &[f64]| {
        let v = f(x);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let mut best = run_simplex(&eval, x0, steps, options);
    for _ in 0..options.restarts {
        if !best.converged {
            break;
        }
        let next = run_simplex(&eval, &best.x, steps, options);
        let iterations = best.iterations + next.iterations;
        let converged = next.converged;
        if next.value <= best.value {
            best = next;
        }
        best.iterations = iterations;
        best.converged = converged;
    }
    best
}

fn run_simplex<F>(eval: &F, x0: &[f64], steps: &[f64], options: &NelderMeadOptions) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let n = x0.len();
    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((x0.to_vec(), eval(x0)));
    for i in 0..n {
        let mut x = x0.to_vec();
        x[i] += steps.get(i).copied().unwrap_or(0.1);
        let v = eval(&x);
        simplex.push((x, v));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iter {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let f_lo = simplex[0].1;
        let f_hi = simplex[n].1;
        let spread = f_hi - f_lo;
        if spread <= options.ftol * (f_lo.abs() + f_hi.abs()) * 0.5 + options.fatol {
            converged = true;
            break;
        }
        iterations += 1;

        let centroid: Vec<f64> = (0..n)
            .map(|j| simplex[..n].iter().map(|(x, _)| x[j]).sum::<f64>() / n as f64)
            .collect();
        let worst = simplex[n].0.clone();
        let towards = |coef: f64, from: &[f64]| -> Vec<f64> {
            centroid
                .iter()
                .zip(from)
                .map(|(c, p)| c + coef * (p - c))
                .collect()
        };

        let xr = towards(-REFLECT, &worst);
        let fr = eval(&xr);

        if fr < f_lo {
            let xe = towards(EXPAND, &xr);
            let fe = eval(&xe);
            simplex[n] = if fe < fr { (xe, fe) } else { (xr, fr) };
            continue;
        }

        if fr < simplex[n - 1].1 {
            simplex[n] = (xr, fr);
            continue;
        }

        let (xc, fc, accept) = if fr < f_hi {
            let xc = towards(CONTRACT, &xr);
            let fc = eval(&xc);
            let accept = fc <= fr;
            (xc, fc, accept)
        } else {
            let xc = towards(CONTRACT, &worst);
            let fc = eval(&xc);
            let accept = fc < f_hi;
            (xc, fc, accept)
        };

        if accept {
            simplex[n] = (xc, fc);
            continue;
        }

        let best = simplex[0].0.clone();
        for vertex in simplex.iter_mut().skip(1) {
            let x: Vec<f64> = best
                .iter()
                .zip(&vertex.0)
                .map(|(b, p)| b + SHRINK * (p - b))
                .collect();
            let v = eval(&x);
            *vertex = (x, v);
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (x, value) = simplex.swap_remove(0);
    Minimum {
        x,
        value,
        iterations,
        converged: converged && value.is_finite(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimizes_quadratic_bowl() {
        let f = |x: &[f64]| (x[0] - 3.0).powi(2) + 10.0 * (x[1] + 1.0).powi(2);
        let min = minimize(f, &[0.0, 0.0], &[0.5, 0.5], &NelderMeadOptions::default());

        assert!(min.converged);
        assert!((min.x[0] - 3.0).abs() < 1e-4);
        assert!((min.x[1] + 1.0).abs() < 1e-4);
        assert!(min.value < 1e-8);
    }

    #[test]
    fn minimizes_rosenbrock() {
        let f = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let min = minimize(f, &[-1.2, 1.0], &[0.1, 0.1], &NelderMeadOptions::default());

        assert!(min.converged);
        assert!((min.x[0] - 1.0).abs() < 1e-3);
        assert!((min.x[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn non_finite_objective_is_avoided() {
        let f = |x: &[f64]| {
            if x[0] < 0.0 {
                f64::NAN
            } else {
                (x[0] - 2.0).powi(2)
            }
        };
        let min = minimize(f, &[1.0], &[0.5], &NelderMeadOptions::default());
        assert!(min.converged);
        assert!((min.x[0] - 2.0).abs() < 1e-4);
    }

    #[test]
    fn iteration_limit_reports_not_converged() {
        let f = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let options = NelderMeadOptions {
            max_iter: 3,
            ..NelderMeadOptions::default()
        };
        let min = minimize(f, &[-1.2, 1.0], &[0.1, 0.1], &options);
        assert!(!min.converged);
        assert!(min.iterations <= 3);
    }

    #[test]
    fn deterministic_results() {
        let f = |x: &[f64]| (x[0] - 0.3).powi(2) + (x[1] * x[0] - 1.0).powi(2);
        let a = minimize(f, &[1.0, 1.0], &[0.2, 0.2], &NelderMeadOptions::default());
        let b = minimize(f, &[1.0, 1.0], &[0.2, 0.2], &NelderMeadOptions::default());
        assert_eq!(a, b);
    }
}
