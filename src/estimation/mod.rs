// =============================================================================
// Parameter Estimation
// =============================================================================
//
// For one (site, component) group of inter-failure times (TBF), fit every
// family that has an estimator:
//
//   Weibull 2P   Moments (grid-search moment matching)
//   Weibull 2P   MLE (Newton-Raphson on the profile likelihood)
//   Weibull 2P   Least squares (median rank regression)
//   Weibull 3P   Iteration (threshold search + inner 2P MLE)
//   Gamma        Moments (closed form)
//   Lognormale   Moments on the log sample (closed form)
//   Gumbel       Moments (closed form)
//   Exponentielle MLE (closed form, identical to moments)
//
// A family whose estimator degenerates (zero variance, non-positive data,
// no convergence) is recorded as a per-family failure and logged; the
// remaining families are still attempted. Nothing here aborts the batch.
//
// The caller enforces the minimum-observation rule (3 by default) and maps
// an undersized group to a skip outcome before ever calling `fit_group`.
//
// =============================================================================

mod weibull;

pub use weibull::{fit_weibull_3p, fit_weibull_mle, fit_weibull_moments, fit_weibull_mrr};

use log::warn;
use serde::Serialize;

use crate::config::EstimationConfig;
use crate::error::{ReliaStatsError, Result};
use crate::laws::Law;

/// Identifies one (site, component) group. This is the explicit relation
/// every downstream table and the site composition step key on — component
/// membership in a site is never inferred from label prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    pub site: String,
    pub component: String,
}

impl GroupKey {
    pub fn new(site: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            component: component.into(),
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.site, self.component)
    }
}

/// How a law's parameters were estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitMethod {
    Moments,
    MaximumLikelihood,
    LeastSquares,
    Iteration,
}

impl FitMethod {
    /// Label used in the output tables (source-system naming).
    pub fn label(&self) -> &'static str {
        match self {
            FitMethod::Moments => "Moments",
            FitMethod::MaximumLikelihood => "MLE",
            FitMethod::LeastSquares => "Régression",
            FitMethod::Iteration => "Itération",
        }
    }
}

impl std::fmt::Display for FitMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One fitted (family, method) combination for a group. Immutable once
/// created; the validator consumes these together with the original sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitRecord {
    pub key: GroupKey,
    pub method: FitMethod,
    pub law: Law,
}

/// A family whose estimator failed for this group, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyFailure {
    pub family: &'static str,
    pub method: FitMethod,
    pub reason: String,
}

/// All fits attempted for one group: the records that succeeded plus the
/// families that degenerated.
#[derive(Debug, Clone, Default)]
pub struct GroupFit {
    pub records: Vec<FitRecord>,
    pub failures: Vec<FamilyFailure>,
}

/// Fit every applicable (family, method) combination on one group's TBF
/// sample.
///
/// The sample must already satisfy the minimum-observation rule; values are
/// expected positive and finite (anything else surfaces as per-family
/// failures, e.g. the lognormal fit rejecting a non-positive value).
pub fn fit_group(key: &GroupKey, tbf: &[f64], config: &EstimationConfig) -> GroupFit {
    let mut out = GroupFit::default();

    let mean = sample_mean(tbf);
    let std = sample_std(tbf);
    let var = std * std;

    let mut attempt = |family: &'static str, method: FitMethod, fit: Result<Law>| match fit
        .and_then(|law| law.validate().map(|_| law))
    {
        Ok(law) => out.records.push(FitRecord {
            key: key.clone(),
            method,
            law,
        }),
        Err(e) => {
            warn!("fit failed for {} [{} / {}]: {}", key, family, method, e);
            out.failures.push(FamilyFailure {
                family,
                method,
                reason: e.to_string(),
            });
        }
    };

    attempt(
        "Weibull 2P",
        FitMethod::Moments,
        fit_weibull_moments(mean, var, config),
    );
    attempt(
        "Weibull 2P",
        FitMethod::MaximumLikelihood,
        fit_weibull_mle(tbf, config),
    );
    attempt("Weibull 2P", FitMethod::LeastSquares, fit_weibull_mrr(tbf));
    attempt("Weibull 3P", FitMethod::Iteration, fit_weibull_3p(tbf, config));
    attempt("Gamma", FitMethod::Moments, fit_gamma_moments(mean, var));
    attempt("Lognormale", FitMethod::Moments, fit_lognormal_moments(tbf));
    attempt(
        "Gumbel",
        FitMethod::Moments,
        Ok(fit_gumbel_moments(mean, std, config.gumbel_scale_floor)),
    );
    attempt(
        "Exponentielle",
        FitMethod::MaximumLikelihood,
        fit_exponential_mle(mean),
    );

    out
}

// =============================================================================
// Closed-form estimators
// =============================================================================

/// Gamma method of moments: k = mean^2 / var, theta = var / mean.
pub fn fit_gamma_moments(mean: f64, var: f64) -> Result<Law> {
    if !(var > 0.0) || !(mean > 0.0) {
        return Err(ReliaStatsError::InvalidValue(
            "gamma moments require positive mean and variance".to_string(),
        ));
    }
    Ok(Law::Gamma {
        k: mean * mean / var,
        theta: var / mean,
    })
}

/// Lognormal method of moments on the log-transformed sample:
/// mu = mean(ln t), sigma = sample standard deviation of ln t (divisor n-1).
pub fn fit_lognormal_moments(tbf: &[f64]) -> Result<Law> {
    if tbf.iter().any(|&t| !(t > 0.0) || !t.is_finite()) {
        return Err(ReliaStatsError::InvalidValue(
            "lognormal fit requires strictly positive finite times".to_string(),
        ));
    }
    let logs: Vec<f64> = tbf.iter().map(|t| t.ln()).collect();
    Ok(Law::Lognormal {
        mu: sample_mean(&logs),
        sigma: sample_std(&logs),
    })
}

/// Gumbel method of moments: beta = std * sqrt(6) / pi (floored),
/// mu = mean - EULER_MASCHERONI * beta.
pub fn fit_gumbel_moments(mean: f64, std: f64, scale_floor: f64) -> Law {
    let beta = (std * 6.0_f64.sqrt() / std::f64::consts::PI).max(scale_floor);
    Law::Gumbel {
        mu: mean - crate::laws::EULER_MASCHERONI * beta,
        beta,
    }
}

/// Exponential MLE (equal to the moment estimator): lambda = 1 / mean.
pub fn fit_exponential_mle(mean: f64) -> Result<Law> {
    if !(mean > 0.0) {
        return Err(ReliaStatsError::InvalidValue(
            "exponential fit requires a positive mean".to_string(),
        ));
    }
    Ok(Law::Exponential { lambda: 1.0 / mean })
}

// =============================================================================
// Sample moments
// =============================================================================

pub(crate) fn sample_mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// Unbiased sample standard deviation (divisor n - 1).
pub(crate) fn sample_std(x: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return 0.0;
    }
    let mean = sample_mean(x);
    let ss: f64 = x.iter().map(|&v| (v - mean) * (v - mean)).sum();
    (ss / (n - 1) as f64).sqrt()
}
