// =============================================================================
// Lifetime Distribution Laws
// =============================================================================
//
// The six parametric families the analysis supports, as one tagged enum.
// Every downstream stage dispatches on `Law` with an exhaustive match, so
// adding a seventh family is a compile-error checklist rather than a string
// comparison that can silently skip a branch.
//
// Each law exposes four pure functions over t >= 0:
//
//   survival(t)  R(t) = P(T > t)
//   density(t)   f(t) = -dR/dt
//   hazard(t)    lambda(t) = f(t) / R(t), defined as 0 wherever R(t) <= 0
//   quantile(p)  F^-1(p)
//
// plus `summary_stats()` (MTBF, median, mode, Q75, Q99 — see `stats`).
//
// Closed forms are used where they exist (Weibull, Gumbel, Exponential);
// Gamma and Lognormal delegate CDF/PDF/inverse-CDF to statrs.
//
// NUMERICAL GUARDS
// ----------------
// - Weibull 3P clamps the shifted argument (t - gamma) to >= 0 before
//   exponentiation, so R(t) = 1 for t < gamma.
// - Gumbel clips the exponent argument to [-700, 700] before exp() and
//   floors its scale at a small epsilon; a near-zero scale would otherwise
//   produce a degenerate step distribution.
//
// =============================================================================

mod stats;

pub use stats::{LawStats, StatPoint};
pub(crate) use stats::EULER_MASCHERONI;

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Gamma as GammaDist, LogNormal};

use crate::error::{ReliaStatsError, Result};

/// Exponent clip bound for the Gumbel survival function (matches the range
/// where exp() stays finite in f64).
const GUMBEL_EXP_CLIP: f64 = 700.0;

/// Floor for the Gumbel scale parameter.
pub const GUMBEL_SCALE_FLOOR: f64 = 1e-6;

/// One of the six supported lifetime-distribution families, with its
/// parameters.
///
/// Parameter domains:
/// - `Weibull2P`: alpha > 0 (scale), beta > 0 (shape)
/// - `Weibull3P`: alpha > 0, beta > 0, gamma is a real threshold shift
/// - `Gamma`: k > 0 (shape), theta > 0 (scale)
/// - `Lognormal`: mu real, sigma > 0 (parameters of ln T)
/// - `Gumbel`: mu real (location), beta > 0 (scale, floored at 1e-6)
/// - `Exponential`: lambda > 0 (rate)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Law {
    Weibull2P { alpha: f64, beta: f64 },
    Weibull3P { alpha: f64, beta: f64, gamma: f64 },
    Gamma { k: f64, theta: f64 },
    Lognormal { mu: f64, sigma: f64 },
    Gumbel { mu: f64, beta: f64 },
    Exponential { lambda: f64 },
}

impl Law {
    /// The family label used in the output tables (the source system's
    /// French naming is kept so existing spreadsheets keep working).
    pub fn family_name(&self) -> &'static str {
        match self {
            Law::Weibull2P { .. } => "Weibull 2P",
            Law::Weibull3P { .. } => "Weibull 3P",
            Law::Gamma { .. } => "Gamma",
            Law::Lognormal { .. } => "Lognormale",
            Law::Gumbel { .. } => "Gumbel",
            Law::Exponential { .. } => "Exponentielle",
        }
    }

    /// Check that every parameter is finite and inside its domain.
    pub fn validate(&self) -> Result<()> {
        let ok = match *self {
            Law::Weibull2P { alpha, beta } => {
                alpha.is_finite() && alpha > 0.0 && beta.is_finite() && beta > 0.0
            }
            Law::Weibull3P { alpha, beta, gamma } => {
                alpha.is_finite() && alpha > 0.0 && beta.is_finite() && beta > 0.0 && gamma.is_finite()
            }
            Law::Gamma { k, theta } => k.is_finite() && k > 0.0 && theta.is_finite() && theta > 0.0,
            Law::Lognormal { mu, sigma } => mu.is_finite() && sigma.is_finite() && sigma > 0.0,
            Law::Gumbel { mu, beta } => mu.is_finite() && beta.is_finite() && beta > 0.0,
            Law::Exponential { lambda } => lambda.is_finite() && lambda > 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(ReliaStatsError::InvalidValue(format!(
                "parameters out of domain for {}: {:?}",
                self.family_name(),
                self
            )))
        }
    }

    /// Cumulative distribution function F(t) = P(T <= t).
    pub fn cdf(&self, t: f64) -> f64 {
        match *self {
            Law::Weibull2P { alpha, beta } => {
                let t = t.max(0.0);
                1.0 - (-(t / alpha).powf(beta)).exp()
            }
            Law::Weibull3P { alpha, beta, gamma } => {
                let t_adj = (t - gamma).max(0.0);
                1.0 - (-(t_adj / alpha).powf(beta)).exp()
            }
            Law::Gamma { k, theta } => {
                if t <= 0.0 {
                    0.0
                } else {
                    match GammaDist::new(k, 1.0 / theta) {
                        Ok(d) => d.cdf(t),
                        Err(_) => f64::NAN,
                    }
                }
            }
            Law::Lognormal { mu, sigma } => {
                if t <= 0.0 {
                    0.0
                } else {
                    match LogNormal::new(mu, sigma) {
                        Ok(d) => d.cdf(t),
                        Err(_) => f64::NAN,
                    }
                }
            }
            Law::Gumbel { mu, beta } => {
                let beta = beta.max(GUMBEL_SCALE_FLOOR);
                let z = (-(t - mu) / beta).clamp(-GUMBEL_EXP_CLIP, GUMBEL_EXP_CLIP);
                (-z.exp()).exp()
            }
            Law::Exponential { lambda } => {
                let t = t.max(0.0);
                1.0 - (-lambda * t).exp()
            }
        }
    }

    /// Survival / reliability function R(t) = P(T > t).
    ///
    /// Defined as 1 for t below the support (t < gamma for Weibull 3P,
    /// t < 0 elsewhere).
    pub fn survival(&self, t: f64) -> f64 {
        1.0 - self.cdf(t)
    }

    /// Probability density f(t) = -dR/dt. Zero outside the support.
    pub fn density(&self, t: f64) -> f64 {
        match *self {
            Law::Weibull2P { alpha, beta } => weibull_pdf(t, alpha, beta),
            Law::Weibull3P { alpha, beta, gamma } => weibull_pdf(t - gamma, alpha, beta),
            Law::Gamma { k, theta } => {
                if t <= 0.0 {
                    0.0
                } else {
                    match GammaDist::new(k, 1.0 / theta) {
                        Ok(d) => d.pdf(t),
                        Err(_) => f64::NAN,
                    }
                }
            }
            Law::Lognormal { mu, sigma } => {
                if t <= 0.0 {
                    0.0
                } else {
                    match LogNormal::new(mu, sigma) {
                        Ok(d) => d.pdf(t),
                        Err(_) => f64::NAN,
                    }
                }
            }
            Law::Gumbel { mu, beta } => {
                let beta = beta.max(GUMBEL_SCALE_FLOOR);
                let z = ((t - mu) / beta).clamp(-GUMBEL_EXP_CLIP, GUMBEL_EXP_CLIP);
                (-(z + (-z).exp())).exp() / beta
            }
            Law::Exponential { lambda } => {
                if t < 0.0 {
                    0.0
                } else {
                    lambda * (-lambda * t).exp()
                }
            }
        }
    }

    /// Hazard rate lambda(t) = f(t) / R(t), or 0 wherever R(t) <= 0.
    ///
    /// The guard covers both the right tail (R has decayed to 0) and, for
    /// the shifted Weibull, any point before the threshold (f is 0 there).
    pub fn hazard(&self, t: f64) -> f64 {
        let r = self.survival(t);
        if r > 0.0 {
            self.density(t) / r
        } else {
            0.0
        }
    }

    /// Quantile function F^-1(p) for p in (0, 1).
    ///
    /// Weibull, Gumbel and Exponential use their closed forms; Gamma and
    /// Lognormal use the statrs numerical inverse CDF.
    pub fn quantile(&self, p: f64) -> f64 {
        if !(0.0..1.0).contains(&p) || p == 0.0 {
            return f64::NAN;
        }
        match *self {
            Law::Weibull2P { alpha, beta } => alpha * (-(1.0 - p).ln()).powf(1.0 / beta),
            Law::Weibull3P { alpha, beta, gamma } => {
                gamma + alpha * (-(1.0 - p).ln()).powf(1.0 / beta)
            }
            Law::Gamma { k, theta } => match GammaDist::new(k, 1.0 / theta) {
                Ok(d) => d.inverse_cdf(p),
                Err(_) => f64::NAN,
            },
            Law::Lognormal { mu, sigma } => match LogNormal::new(mu, sigma) {
                Ok(d) => d.inverse_cdf(p),
                Err(_) => f64::NAN,
            },
            Law::Gumbel { mu, beta } => {
                let beta = beta.max(GUMBEL_SCALE_FLOOR);
                mu - beta * (-p.ln()).ln()
            }
            Law::Exponential { lambda } => -(1.0 - p).ln() / lambda,
        }
    }
}

/// Two-parameter Weibull density; also serves the 3P form via a shifted t.
fn weibull_pdf(t: f64, alpha: f64, beta: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    let z = t / alpha;
    (beta / alpha) * z.powf(beta - 1.0) * (-z.powf(beta)).exp()
}
