//! GARCH(1,1) with a constant mean and normal innovations.
//!
//! r[t]      = mu + e[t]
//! sigma2[0] = omega + (alpha + beta) * backcast
//! sigma2[t] = omega + alpha * e[t-1]^2 + beta * sigma2[t-1]
//!
//! `backcast` is an exponentially weighted (0.94) mean of the first 75
//! squared residuals. Parameters are fitted by Gaussian maximum likelihood
//! subject to omega > 0, alpha >= 0, beta >= 0, alpha + beta < 1.

use super::optimizer::{self, NelderMeadOptions};
use crate::domain::error::TrendvolError;

const BACKCAST_WINDOW: usize = 75;
const BACKCAST_DECAY: f64 = 0.94;
const MAX_PERSISTENCE: f64 = 0.9999;
const LN_2PI: f64 = 1.837_877_066_409_345_5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GarchParams {
    pub mu: f64,
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl GarchParams {
    pub fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GarchFit {
    pub params: GarchParams,
    pub log_likelihood: f64,
    /// One value per input return, in the units of the input.
    pub conditional_volatility: Vec<f64>,
    pub iterations: usize,
}

/// Fit GARCH(1,1) to the full return sample.
pub fn fit_garch11(returns: &[f64]) -> Result<GarchFit, TrendvolError> {
    if returns.len() < 2 {
        return Err(TrendvolError::ModelFit {
            reason: format!("need at least 2 returns, have {}", returns.len()),
        });
    }
    if let Some(r) = returns.iter().find(|r| !r.is_finite()) {
        return Err(TrendvolError::ModelFit {
            reason: format!("non-finite return {r}"),
        });
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    if variance <= 0.0 || !variance.is_finite() {
        return Err(TrendvolError::ModelFit {
            reason: "returns have zero variance".to_string(),
        });
    }

    let x0 = [
        mean,
        logit(0.1),
        logit(0.9 / MAX_PERSISTENCE),
        logit(0.1 / 0.9),
    ];
    let steps = [0.1 * variance.sqrt(), 0.5, 0.5, 0.5];
    let objective = |x: &[f64]| {
        let params = decode(x, variance);
        neg_log_likelihood(returns, &params)
    };

    let min = optimizer::minimize(objective, &x0, &steps, &NelderMeadOptions::default());
    if !min.converged {
        return Err(TrendvolError::ModelFit {
            reason: format!("optimizer did not converge after {} iterations", min.iterations),
        });
    }

    let params = decode(&min.x, variance);
    let conditional_volatility = conditional_variance(returns, &params)
        .into_iter()
        .map(f64::sqrt)
        .collect();

    Ok(GarchFit {
        params,
        log_likelihood: -min.value,
        conditional_volatility,
        iterations: min.iterations,
    })
}

/// Conditional variance path for the given parameters.
pub fn conditional_variance(returns: &[f64], params: &GarchParams) -> Vec<f64> {
    let residuals: Vec<f64> = returns.iter().map(|r| r - params.mu).collect();
    let backcast = backcast(&residuals);

    let mut sigma2 = Vec::with_capacity(residuals.len());
    let mut prev = params.omega + (params.alpha + params.beta) * backcast;
    sigma2.push(prev);
    for e in residuals.iter().take(residuals.len().saturating_sub(1)) {
        prev = params.omega + params.alpha * e * e + params.beta * prev;
        sigma2.push(prev);
    }
    sigma2
}

fn backcast(residuals: &[f64]) -> f64 {
    let tau = residuals.len().min(BACKCAST_WINDOW);
    let mut weight = 1.0;
    let mut total_weight = 0.0;
    let mut acc = 0.0;
    for e in &residuals[..tau] {
        acc += weight * e * e;
        total_weight += weight;
        weight *= BACKCAST_DECAY;
    }
    if total_weight > 0.0 { acc / total_weight } else { 0.0 }
}

fn neg_log_likelihood(returns: &[f64], params: &GarchParams) -> f64 {
    let sigma2 = conditional_variance(returns, params);
    let mut nll = 0.0;
    for (r, s2) in returns.iter().zip(&sigma2) {
        if *s2 <= 0.0 || !s2.is_finite() {
            return f64::INFINITY;
        }
        let e = r - params.mu;
        nll += 0.5 * (LN_2PI + s2.ln() + e * e / s2);
    }
    nll
}

fn decode(x: &[f64], variance: f64) -> GarchParams {
    let persistence = MAX_PERSISTENCE * logistic(x[2]);
    let arch_share = logistic(x[3]);
    GarchParams {
        mu: x[0],
        omega: variance * logistic(x[1]),
        alpha: persistence * arch_share,
        beta: persistence * (1.0 - arch_share),
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-normal draws (sum of 12 uniforms from xorshift).
    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        let mut uniform = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        (0..n)
            .map(|_| (0..12).map(|_| uniform()).sum::<f64>() - 6.0)
            .collect()
    }

    /// Calm first half, turbulent second half.
    fn regime_returns() -> Vec<f64> {
        noise(600, 0x9E37_79B9_7F4A_7C15)
            .into_iter()
            .enumerate()
            .map(|(i, z)| 0.05 + z * if i < 300 { 0.5 } else { 2.0 })
            .collect()
    }

    #[test]
    fn fit_respects_parameter_constraints() {
        let fit = fit_garch11(&regime_returns()).unwrap();
        let p = fit.params;

        assert!(p.omega > 0.0);
        assert!(p.alpha >= 0.0);
        assert!(p.beta >= 0.0);
        assert!(p.persistence() < 1.0);
        assert!(fit.log_likelihood.is_finite());
    }

    #[test]
    fn conditional_volatility_matches_input_length() {
        let returns = regime_returns();
        let fit = fit_garch11(&returns).unwrap();
        assert_eq!(fit.conditional_volatility.len(), returns.len());
        assert!(
            fit.conditional_volatility
                .iter()
                .all(|v| v.is_finite() && *v > 0.0)
        );
    }

    #[test]
    fn turbulent_regime_has_higher_volatility() {
        let fit = fit_garch11(&regime_returns()).unwrap();
        let calm: f64 = fit.conditional_volatility[50..300].iter().sum::<f64>() / 250.0;
        let wild: f64 = fit.conditional_volatility[350..600].iter().sum::<f64>() / 250.0;
        assert!(wild > calm);
    }

    #[test]
    fn refit_is_bit_identical() {
        let returns = regime_returns();
        let a = fit_garch11(&returns).unwrap();
        let b = fit_garch11(&returns).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_variance_fails() {
        let result = fit_garch11(&[0.0; 200]);
        assert!(matches!(result, Err(TrendvolError::ModelFit { .. })));
    }

    #[test]
    fn too_few_returns_fails() {
        assert!(matches!(
            fit_garch11(&[1.0]),
            Err(TrendvolError::ModelFit { .. })
        ));
    }

    #[test]
    fn non_finite_return_fails() {
        let mut returns = regime_returns();
        returns[10] = f64::NAN;
        assert!(matches!(
            fit_garch11(&returns),
            Err(TrendvolError::ModelFit { .. })
        ));
    }

    #[test]
    fn conditional_variance_recursion() {
        let params = GarchParams {
            mu: 0.0,
            omega: 0.1,
            alpha: 0.2,
            beta: 0.7,
        };
        let returns = [1.0, -2.0, 0.5];
        let sigma2 = conditional_variance(&returns, &params);

        // backcast over 3 residuals with weights 1, 0.94, 0.8836
        let w = [1.0, 0.94, 0.94 * 0.94];
        let bc = (w[0] * 1.0 + w[1] * 4.0 + w[2] * 0.25) / (w[0] + w[1] + w[2]);
        let s0 = 0.1 + 0.9 * bc;
        let s1 = 0.1 + 0.2 * 1.0 + 0.7 * s0;
        let s2 = 0.1 + 0.2 * 4.0 + 0.7 * s1;

        assert_eq!(sigma2.len(), 3);
        assert!((sigma2[0] - s0).abs() < 1e-12);
        assert!((sigma2[1] - s1).abs() < 1e-12);
        assert!((sigma2[2] - s2).abs() < 1e-12);
    }
}
