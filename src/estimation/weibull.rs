// =============================================================================
// Weibull Estimators
// =============================================================================
//
// The Weibull family gets three estimators for the 2-parameter form and an
// iterative one for the 3-parameter form:
//
//   MOMENTS — no closed form exists for Weibull moment matching, so we
//   grid-search beta: for each candidate, alpha follows from the mean
//   (alpha = mean / Gamma(1 + 1/beta)) and we score how far the implied
//   variance lands from the sample variance.
//
//   MLE — Newton-Raphson on the profile-likelihood equation for beta; the
//   scale then has the analytic solution eta = (sum t_i^beta / n)^(1/beta).
//
//   LEAST SQUARES — median rank regression: OLS on the linearized
//   probability plot ln(-ln(1 - F_i)) vs ln(t_i), with Bernard's
//   approximation F_i = (i - 0.3) / (n + 0.4) for the median ranks.
//
//   3P ITERATION — profile the threshold out: for a candidate gamma the
//   shifted sample is an ordinary 2P MLE problem, so the threshold is found
//   by Brent minimization of the negative profile log-likelihood over
//   gamma in [0, min(t)).
//
// =============================================================================

use statrs::function::gamma::gamma as gamma_fn;

use crate::config::EstimationConfig;
use crate::error::{ReliaStatsError, Result};
use crate::laws::Law;

/// Weibull 2P by grid-search moment matching.
///
/// Beta runs over a dense grid (bounds and density from the configuration,
/// [0.5, 10] x 1000 by default); the winner minimizes the squared deviation
/// between the implied variance
/// `alpha^2 * (Gamma(1 + 2/beta) - Gamma(1 + 1/beta)^2)` and the sample
/// variance.
pub fn fit_weibull_moments(mean: f64, var: f64, config: &EstimationConfig) -> Result<Law> {
    if !(mean > 0.0) || !var.is_finite() {
        return Err(ReliaStatsError::InvalidValue(
            "weibull moments require a positive mean and finite variance".to_string(),
        ));
    }

    let n = config.weibull_beta_grid;
    let step = (config.weibull_beta_max - config.weibull_beta_min) / (n - 1) as f64;

    let mut best_beta = config.weibull_beta_min;
    let mut best_obj = f64::INFINITY;

    for i in 0..n {
        let beta = config.weibull_beta_min + step * i as f64;
        let g1 = gamma_fn(1.0 + 1.0 / beta);
        let g2 = gamma_fn(1.0 + 2.0 / beta);
        let alpha = mean / g1;
        let implied_var = alpha * alpha * (g2 - g1 * g1);
        let obj = (implied_var - var) * (implied_var - var);
        if obj < best_obj {
            best_obj = obj;
            best_beta = beta;
        }
    }

    Ok(Law::Weibull2P {
        alpha: mean / gamma_fn(1.0 + 1.0 / best_beta),
        beta: best_beta,
    })
}

/// Weibull 2P by maximum likelihood.
///
/// Newton-Raphson solves the profile-likelihood equation
///
/// ```text
/// f(beta) = n/beta + sum(ln t_i) - n * sum(t_i^beta ln t_i) / sum(t_i^beta) = 0
/// ```
///
/// starting from beta = 1.2; the scale follows analytically.
pub fn fit_weibull_mle(tbf: &[f64], config: &EstimationConfig) -> Result<Law> {
    let (alpha, beta, _) = profile_mle(tbf, config)?;
    Ok(Law::Weibull2P { alpha, beta })
}

/// Weibull 2P by least-squares regression on the probability plot
/// (median rank regression).
pub fn fit_weibull_mrr(tbf: &[f64]) -> Result<Law> {
    let n = tbf.len();
    if tbf.iter().any(|&t| !(t > 0.0) || !t.is_finite()) {
        return Err(ReliaStatsError::InvalidValue(
            "weibull regression requires strictly positive finite times".to_string(),
        ));
    }

    let mut sorted = tbf.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let n_f = n as f64;
    // x = ln t, y = ln(-ln(1 - F_i)) with Bernard's median ranks
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, &t) in sorted.iter().enumerate() {
        let f_i = ((i + 1) as f64 - 0.3) / (n_f + 0.4);
        let x = t.ln();
        let y = (-(1.0 - f_i).ln()).ln();
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denom = n_f * sum_x2 - sum_x * sum_x;
    if denom.abs() < 1e-30 {
        return Err(ReliaStatsError::InvalidValue(
            "weibull regression degenerate: identical failure times".to_string(),
        ));
    }

    let slope = (n_f * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n_f;

    if !(slope > 0.0) || !slope.is_finite() {
        return Err(ReliaStatsError::InvalidValue(format!(
            "weibull regression produced non-positive shape {slope}"
        )));
    }

    Ok(Law::Weibull2P {
        // slope is beta; the intercept is -beta * ln(alpha)
        alpha: (-intercept / slope).exp(),
        beta: slope,
    })
}

/// Weibull 3P by iterative maximum likelihood.
///
/// The threshold gamma is profiled out: each candidate reduces to a 2P MLE
/// on the shifted sample, and Brent's method minimizes the negative profile
/// log-likelihood over gamma in [0, min(t)). The smallest observation caps
/// the threshold — a shift at or past it would put a data point outside the
/// support.
pub fn fit_weibull_3p(tbf: &[f64], config: &EstimationConfig) -> Result<Law> {
    let t_min = tbf.iter().cloned().fold(f64::INFINITY, f64::min);
    if !(t_min > 0.0) {
        return Err(ReliaStatsError::InvalidValue(
            "weibull 3P requires strictly positive times".to_string(),
        ));
    }

    let upper = t_min * 0.999;
    let objective = |gamma: f64| -> f64 {
        let shifted: Vec<f64> = tbf.iter().map(|&t| t - gamma).collect();
        match profile_mle(&shifted, config) {
            Ok((_, _, loglik)) => -loglik,
            Err(_) => f64::INFINITY,
        }
    };

    let gamma_best = brent_minimize(objective, 0.0, upper, 1e-6, 200);
    let shifted: Vec<f64> = tbf.iter().map(|&t| t - gamma_best).collect();
    let (alpha, beta, _) = profile_mle(&shifted, config).map_err(|e| {
        ReliaStatsError::InvalidValue(format!("weibull 3P did not converge: {e}"))
    })?;

    Ok(Law::Weibull3P {
        alpha,
        beta,
        gamma: gamma_best,
    })
}

// =============================================================================
// Profile likelihood core
// =============================================================================

/// Newton-Raphson MLE shared by the 2P and (shifted) 3P fits.
///
/// Returns (alpha, beta, log-likelihood).
fn profile_mle(tbf: &[f64], config: &EstimationConfig) -> Result<(f64, f64, f64)> {
    let n = tbf.len();
    if n < 2 {
        return Err(ReliaStatsError::EmptyInput(
            "weibull MLE needs at least 2 observations".to_string(),
        ));
    }
    if tbf.iter().any(|&t| !(t > 0.0) || !t.is_finite()) {
        return Err(ReliaStatsError::InvalidValue(
            "weibull MLE requires strictly positive finite times".to_string(),
        ));
    }

    let ln_t: Vec<f64> = tbf.iter().map(|t| t.ln()).collect();
    let sum_ln_t: f64 = ln_t.iter().sum();
    let n_f = n as f64;

    // f(beta)  = n/beta + sum(ln t) - n * S1/S0
    // f'(beta) = -n/beta^2 - n * (S2*S0 - S1^2) / S0^2
    // with S_k = sum(t_i^beta * (ln t_i)^k)
    let mut beta = 1.2_f64;
    let mut converged = false;

    for _ in 0..config.mle_max_iterations {
        let (mut s0, mut s1, mut s2) = (0.0_f64, 0.0_f64, 0.0_f64);
        for (&t, &lt) in tbf.iter().zip(ln_t.iter()) {
            let t_beta = t.powf(beta);
            s0 += t_beta;
            s1 += t_beta * lt;
            s2 += t_beta * lt * lt;
        }
        if s0 == 0.0 || !s0.is_finite() {
            return Err(ReliaStatsError::InvalidValue(
                "weibull MLE overflow in power sums".to_string(),
            ));
        }

        let f_val = n_f / beta + sum_ln_t - n_f * s1 / s0;
        let f_prime = -n_f / (beta * beta) - n_f * (s2 * s0 - s1 * s1) / (s0 * s0);
        if f_prime.abs() < 1e-30 {
            return Err(ReliaStatsError::InvalidValue(
                "weibull MLE derivative vanished".to_string(),
            ));
        }

        let delta = f_val / f_prime;
        beta -= delta;
        if beta <= 0.0 {
            beta = 0.01;
        }
        if delta.abs() < config.mle_tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(ReliaStatsError::InvalidValue(format!(
            "weibull MLE did not converge in {} iterations",
            config.mle_max_iterations
        )));
    }

    let s0: f64 = tbf.iter().map(|t| t.powf(beta)).sum();
    let alpha = (s0 / n_f).powf(1.0 / beta);
    if !alpha.is_finite() || alpha <= 0.0 {
        return Err(ReliaStatsError::InvalidValue(
            "weibull MLE produced a degenerate scale".to_string(),
        ));
    }

    let loglik = n_f * beta.ln() - n_f * beta * alpha.ln() + (beta - 1.0) * sum_ln_t
        - tbf.iter().map(|&t| (t / alpha).powf(beta)).sum::<f64>();

    Ok((alpha, beta, loglik))
}

// =============================================================================
// Brent's method
// =============================================================================

/// Minimize a 1-D function on [a, b] by Brent's method (golden-section
/// bracketing with parabolic acceleration). Returns the abscissa of the
/// minimum; if the iteration budget runs out, the best point seen so far.
fn brent_minimize<F>(f: F, a: f64, b: f64, tol: f64, max_iter: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    const GOLDEN: f64 = 0.381_966_011_250_105; // (3 - sqrt 5) / 2

    let (mut a, mut b) = (a, b);
    let mut x = a + GOLDEN * (b - a);
    let (mut w, mut v) = (x, x);
    let mut fx = f(x);
    let (mut fw, mut fv) = (fx, fx);

    let mut d: f64 = 0.0;
    let mut e: f64 = 0.0;

    for _ in 0..max_iter {
        let mid = 0.5 * (a + b);
        let tol1 = tol * x.abs() + 1e-10;
        let tol2 = 2.0 * tol1;

        if (x - mid).abs() <= tol2 - 0.5 * (b - a) {
            return x;
        }

        let mut use_golden = true;
        let mut u = x;

        if e.abs() > tol1 {
            // Parabola through (x, w, v)
            let r = (x - w) * (fx - fv);
            let q = (x - v) * (fx - fw);
            let p = (x - v) * q - (x - w) * r;
            let q = 2.0 * (q - r);
            let (p, q) = if q > 0.0 { (-p, q) } else { (p, -q) };

            let e_old = e;
            e = d;

            if p.abs() < (0.5 * q * e_old).abs() && p > q * (a - x) && p < q * (b - x) {
                d = p / q;
                u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = if x < mid { tol1 } else { -tol1 };
                    u = x + d;
                }
                use_golden = false;
            }
        }

        if use_golden {
            e = if x < mid { b - x } else { a - x };
            d = GOLDEN * e;
            u = x + if d.abs() >= tol1 { d } else { tol1.copysign(d) };
        }

        let fu = f(u);

        if fu <= fx {
            if u < x {
                b = x;
            } else {
                a = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    x
}
