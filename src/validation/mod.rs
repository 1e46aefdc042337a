// =============================================================================
// Goodness-of-Fit Validation
// =============================================================================
//
// Every fitted (family, method) combination is scored against the group's
// empirical sample with two statistics:
//
//   KS — one-sample Kolmogorov-Smirnov distance between the empirical CDF
//   and the fitted CDF, with a p-value from the Kolmogorov asymptotic
//   series (Stephens' small-sample correction on the argument).
//
//   AD — the Anderson-Darling statistic computed directly against the
//   fitted CDF:
//
//       A^2 = -n - (1/n) * sum (2i - 1) * [ln F(x_(i)) + ln(1 - F(x_(n+1-i)))]
//
//   The AD statistic tail-weights the comparison, so the combination of
//   the two catches both bulk and tail misfit.
//
// Score = KS + AD, ranked ascending within each (site, component) group;
// the top 3 are retained and rank 1 is the group's "best law".
//
// SCORE ORDERING
// --------------
// A sample point outside the fitted support (F = 0 or 1 exactly) makes the
// AD log terms -inf, so the score becomes +inf or NaN. Such fits sort
// strictly after every finite score, NaN after +inf, and the sort is
// stable, so re-running on the same input always yields the same ranking.
// This replaces the source system's habit of testing unsupported families
// against a fixed reference distribution, which silently biased the
// comparison.
//
// =============================================================================

use std::cmp::Ordering;

use serde::Serialize;

use crate::config::ValidationConfig;
use crate::estimation::FitRecord;
use crate::laws::Law;

/// A scored and ranked fit. `rank` is 1-based within the (site, component)
/// group; only the top `top_k` records survive ranking.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRecord {
    pub fit: FitRecord,
    pub ks_stat: f64,
    pub ks_pvalue: f64,
    pub ad_stat: f64,
    /// Combined score KS_stat + AD_stat (lower is better).
    pub score: f64,
    pub rank: usize,
}

/// Score every fit of one group against its sample, rank ascending by
/// combined score and keep the best `top_k`.
///
/// The caller enforces the minimum-observation rule (5 by default); the
/// fits must all belong to the same (site, component) as the sample.
pub fn validate_group(
    fits: &[FitRecord],
    tbf: &[f64],
    config: &ValidationConfig,
) -> Vec<ValidationRecord> {
    let mut sorted = tbf.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let mut scored: Vec<ValidationRecord> = fits
        .iter()
        .map(|fit| {
            let (ks_stat, ks_pvalue) = ks_test_sorted(&sorted, &fit.law);
            let ad_stat = anderson_darling_sorted(&sorted, &fit.law);
            ValidationRecord {
                fit: fit.clone(),
                ks_stat,
                ks_pvalue,
                ad_stat,
                score: ks_stat + ad_stat,
                rank: 0,
            }
        })
        .collect();

    // Stable sort: equal scores keep the original fit order
    scored.sort_by(|a, b| score_order(a.score, b.score));
    scored.truncate(config.top_k);
    for (i, rec) in scored.iter_mut().enumerate() {
        rec.rank = i + 1;
    }
    scored
}

/// The rank-1 record of a ranked group, if any.
pub fn best_law(ranked: &[ValidationRecord]) -> Option<&ValidationRecord> {
    ranked.iter().find(|r| r.rank == 1)
}

/// Ascending score order with every non-comparable (NaN) score strictly
/// last. +inf sorts after all finite scores, NaN after +inf.
fn score_order(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

// =============================================================================
// Test statistics
// =============================================================================

/// One-sample KS test of an ascending-sorted sample against a fitted law.
///
/// D is the largest gap between the empirical CDF (evaluated from both
/// sides of each jump) and the fitted CDF. The p-value uses the Kolmogorov
/// series P(D > d) = 2 * sum_k (-1)^(k-1) exp(-2 k^2 lambda^2) with
/// lambda = (sqrt(n) + 0.12 + 0.11/sqrt(n)) * D.
pub fn ks_test(sample: &[f64], law: &Law) -> (f64, f64) {
    let mut sorted = sample.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    ks_test_sorted(&sorted, law)
}

fn ks_test_sorted(sorted: &[f64], law: &Law) -> (f64, f64) {
    let n = sorted.len();
    let n_f = n as f64;

    let mut d_stat = 0.0_f64;
    for (i, &x) in sorted.iter().enumerate() {
        let cdf = law.cdf(x);
        let above = (i + 1) as f64 / n_f;
        let below = i as f64 / n_f;
        d_stat = d_stat.max((above - cdf).abs()).max((below - cdf).abs());
    }

    let lambda = (n_f.sqrt() + 0.12 + 0.11 / n_f.sqrt()) * d_stat;
    let mut p = 0.0_f64;
    for k in 1..=100 {
        let kf = k as f64;
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = sign * (-2.0 * kf * kf * lambda * lambda).exp();
        p += term;
        if term.abs() < 1e-15 {
            break;
        }
    }
    (d_stat, (2.0 * p).clamp(0.0, 1.0))
}

/// Anderson-Darling statistic of an ascending-sorted sample against a
/// fitted law. Returns +inf (or NaN) when a sample point falls outside the
/// fitted support; see the module notes on score ordering.
pub fn anderson_darling(sample: &[f64], law: &Law) -> f64 {
    let mut sorted = sample.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    anderson_darling_sorted(&sorted, law)
}

fn anderson_darling_sorted(sorted: &[f64], law: &Law) -> f64 {
    let n = sorted.len();
    let n_f = n as f64;

    let mut acc = 0.0_f64;
    for i in 0..n {
        let f_lo = law.cdf(sorted[i]);
        let f_hi = law.cdf(sorted[n - 1 - i]);
        acc += (2.0 * i as f64 + 1.0) * (f_lo.ln() + (1.0 - f_hi).ln());
    }
    -n_f - acc / n_f
}
