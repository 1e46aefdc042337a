// =============================================================================
// Descriptive Statistics per Law
// =============================================================================
//
// For a fitted law the maintenance engineers want five landmark times —
// MTBF (mean), median, mode, 75th and 99th percentile — each reported
// together with the hazard rate at that time, so the table reads
// "value (instantaneous failure rate)".
//
// Closed forms where they exist; Gamma and Gumbel percentiles go through
// the quantile function (numerical inverse CDF for Gamma).
//
// Modes without an interior maximum are reported as the left end of the
// support: Weibull with beta <= 1 -> 0 (gamma for the 3P form), Gamma with
// k < 1 -> 0, Exponential -> 0.
//
// =============================================================================

use serde::Serialize;
use statrs::function::gamma::gamma as gamma_fn;

use super::Law;

/// Euler–Mascheroni constant (Gumbel mean = mu + beta * EULER_MASCHERONI).
pub(crate) const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_9;

/// A landmark time paired with the hazard rate evaluated there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatPoint {
    pub value: f64,
    pub hazard: f64,
}

/// The five landmark statistics of a fitted law.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LawStats {
    /// Mean time between failures.
    pub mtbf: StatPoint,
    pub median: StatPoint,
    pub mode: StatPoint,
    /// 75th percentile.
    pub q75: StatPoint,
    /// 99th percentile.
    pub q99: StatPoint,
}

impl Law {
    /// Descriptive statistics of the law, each paired with the hazard rate
    /// at that point.
    pub fn summary_stats(&self) -> LawStats {
        let (mean, median, mode) = match *self {
            Law::Weibull2P { alpha, beta } => (
                alpha * gamma_fn(1.0 + 1.0 / beta),
                alpha * std::f64::consts::LN_2.powf(1.0 / beta),
                weibull_mode(alpha, beta, 0.0),
            ),
            Law::Weibull3P { alpha, beta, gamma } => (
                gamma + alpha * gamma_fn(1.0 + 1.0 / beta),
                gamma + alpha * std::f64::consts::LN_2.powf(1.0 / beta),
                weibull_mode(alpha, beta, gamma),
            ),
            Law::Gamma { k, theta } => (
                k * theta,
                self.quantile(0.5),
                if k >= 1.0 { (k - 1.0) * theta } else { 0.0 },
            ),
            Law::Lognormal { mu, sigma } => (
                (mu + sigma * sigma / 2.0).exp(),
                mu.exp(),
                (mu - sigma * sigma).exp(),
            ),
            Law::Gumbel { mu, beta } => (
                mu + beta * EULER_MASCHERONI,
                mu - beta * std::f64::consts::LN_2.ln(),
                mu,
            ),
            Law::Exponential { lambda } => {
                (1.0 / lambda, std::f64::consts::LN_2 / lambda, 0.0)
            }
        };

        let q75 = self.quantile(0.75);
        let q99 = self.quantile(0.99);

        LawStats {
            mtbf: self.stat_point(mean),
            median: self.stat_point(median),
            mode: self.stat_point(mode),
            q75: self.stat_point(q75),
            q99: self.stat_point(q99),
        }
    }

    fn stat_point(&self, value: f64) -> StatPoint {
        StatPoint {
            value,
            hazard: self.hazard(value),
        }
    }
}

/// Weibull mode: alpha * ((beta-1)/beta)^(1/beta) above the shift when
/// beta > 1; otherwise the density has no interior maximum and the mode is
/// reported as the shift itself (0 for the 2P form).
fn weibull_mode(alpha: f64, beta: f64, shift: f64) -> f64 {
    if beta > 1.0 {
        shift + alpha * ((beta - 1.0) / beta).powf(1.0 / beta)
    } else {
        shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_weibull_stats_closed_forms() {
        let law = Law::Weibull2P { alpha: 100.0, beta: 2.0 };
        let s = law.summary_stats();

        // mean = alpha * Gamma(1.5) = 100 * sqrt(pi)/2
        assert_relative_eq!(
            s.mtbf.value,
            100.0 * std::f64::consts::PI.sqrt() / 2.0,
            max_relative = 1e-10
        );
        assert_relative_eq!(s.median.value, 100.0 * 2.0_f64.ln().sqrt(), max_relative = 1e-10);
        // mode = alpha * (1/2)^(1/2)
        assert_relative_eq!(s.mode.value, 100.0 * 0.5_f64.sqrt(), max_relative = 1e-10);
        // hazard is attached at each landmark
        assert_abs_diff_eq!(s.median.hazard, law.hazard(s.median.value), epsilon = 1e-12);
    }

    #[test]
    fn test_weibull_mode_is_zero_when_beta_at_most_one() {
        let s = Law::Weibull2P { alpha: 50.0, beta: 0.8 }.summary_stats();
        assert_eq!(s.mode.value, 0.0);

        // The 3P form falls back to its threshold instead of 0
        let s3 = Law::Weibull3P { alpha: 50.0, beta: 1.0, gamma: 12.0 }.summary_stats();
        assert_eq!(s3.mode.value, 12.0);
    }

    #[test]
    fn test_lognormal_mode_closed_form() {
        // mode = exp(mu - sigma^2)
        let s = Law::Lognormal { mu: 2.0, sigma: 0.5 }.summary_stats();
        assert_relative_eq!(s.mode.value, (2.0 - 0.25_f64).exp(), max_relative = 1e-10);
    }

    #[test]
    fn test_exponential_stats() {
        let law = Law::Exponential { lambda: 0.02 };
        let s = law.summary_stats();
        assert_relative_eq!(s.mtbf.value, 50.0, max_relative = 1e-10);
        assert_relative_eq!(s.median.value, 2.0_f64.ln() / 0.02, max_relative = 1e-10);
        assert_eq!(s.mode.value, 0.0);
        // Constant hazard everywhere
        assert_abs_diff_eq!(s.mtbf.hazard, 0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(s.q99.hazard, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_gamma_stats_use_numerical_quantiles() {
        let law = Law::Gamma { k: 3.0, theta: 10.0 };
        let s = law.summary_stats();
        assert_relative_eq!(s.mtbf.value, 30.0, max_relative = 1e-10);
        assert_relative_eq!(s.mode.value, 20.0, max_relative = 1e-10);
        // Q75 and Q99 must actually invert the CDF
        assert_abs_diff_eq!(law.cdf(s.q75.value), 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(law.cdf(s.q99.value), 0.99, epsilon = 1e-6);
        assert!(s.q75.value < s.q99.value);
    }

    #[test]
    fn test_gumbel_stats() {
        let law = Law::Gumbel { mu: 100.0, beta: 20.0 };
        let s = law.summary_stats();
        assert_relative_eq!(s.mtbf.value, 100.0 + 20.0 * EULER_MASCHERONI, max_relative = 1e-10);
        assert_relative_eq!(s.mode.value, 100.0, max_relative = 1e-10);
        assert_abs_diff_eq!(law.cdf(s.median.value), 0.5, epsilon = 1e-10);
    }
}
