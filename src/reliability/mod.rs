// =============================================================================
// Reliability Composition & Sensitivity
// =============================================================================
//
// Takes each component's best law, evaluates R(t) over one shared time grid,
// and composes per-site reliability as the elementwise PRODUCT of the site's
// component curves — the series-system model: the site is up only if every
// component is up.
//
// The marginal importance of a component is the sensitivity of the site
// curve to that component's curve, approximated by a centered finite
// difference: perturb only that component's curve by +/- delta (clamped
// into [0, 1]), recompose the site product with everything else held fixed,
// and divide the gap by 2*delta. For a series product this approximates
// d(R_site)/d(R_c) = product of the OTHER components' reliabilities.
//
// Site membership comes from the explicit site key on each record; nothing
// here matches label prefixes.
//
// CLAMP EDGE
// ----------
// At a grid point where a curve sits exactly at 1 (t = 0) or 0, one side of
// the perturbation is clamped away and the centered difference degrades to
// a half-width one-sided difference (a single-component site reads 0.5
// there instead of 1). Interior points are unaffected.
//
// =============================================================================

use ndarray::Array1;
use serde::Serialize;

use crate::config::ReliabilityConfig;
use crate::error::{ReliaStatsError, Result};
use crate::estimation::GroupKey;
use crate::laws::Law;

/// R(t) samples for one component over the shared grid, tagged with the
/// best law that produced them.
#[derive(Debug, Clone)]
pub struct ComponentCurve {
    pub key: GroupKey,
    pub law: Law,
    pub values: Array1<f64>,
}

/// Series-composed R(t) for one site.
#[derive(Debug, Clone)]
pub struct SiteCurve {
    pub site: String,
    pub values: Array1<f64>,
}

/// Marginal importance of one component at one grid time.
#[derive(Debug, Clone, Serialize)]
pub struct ImportanceRecord {
    pub key: GroupKey,
    pub time: f64,
    pub importance: f64,
}

/// Everything the composition stage produces.
#[derive(Debug, Clone)]
pub struct ReliabilityReport {
    pub times: Array1<f64>,
    pub component_curves: Vec<ComponentCurve>,
    pub site_curves: Vec<SiteCurve>,
    pub importance: Vec<ImportanceRecord>,
}

/// The shared, fixed time grid: `n_points` evenly spaced over [0, t_max].
pub fn time_grid(config: &ReliabilityConfig) -> Array1<f64> {
    Array1::linspace(0.0, config.t_max, config.n_points)
}

/// Evaluate a law's survival function over the grid.
pub fn component_curve(key: &GroupKey, law: &Law, times: &Array1<f64>) -> ComponentCurve {
    ComponentCurve {
        key: key.clone(),
        law: *law,
        values: times.mapv(|t| law.survival(t)),
    }
}

/// Elementwise product of component curves (series-system composition).
pub fn compose_series(curves: &[&Array1<f64>], n_points: usize) -> Array1<f64> {
    let mut site = Array1::<f64>::ones(n_points);
    for c in curves {
        site = site * *c;
    }
    site
}

/// Run the full composition and sensitivity analysis on a set of best laws.
///
/// Components are grouped into sites by their explicit site key, in first-
/// appearance order. Returns an error only if the best-law set is empty.
pub fn analyze(best_laws: &[(GroupKey, Law)], config: &ReliabilityConfig) -> Result<ReliabilityReport> {
    if best_laws.is_empty() {
        return Err(ReliaStatsError::EmptyInput(
            "no best laws to compose".to_string(),
        ));
    }

    let times = time_grid(config);

    let component_curves: Vec<ComponentCurve> = best_laws
        .iter()
        .map(|(key, law)| component_curve(key, law, &times))
        .collect();

    // Explicit site -> component indices relation, first-appearance order
    let mut sites: Vec<(String, Vec<usize>)> = Vec::new();
    for (i, curve) in component_curves.iter().enumerate() {
        match sites.iter_mut().find(|(s, _)| *s == curve.key.site) {
            Some((_, members)) => members.push(i),
            None => sites.push((curve.key.site.clone(), vec![i])),
        }
    }

    let mut site_curves = Vec::with_capacity(sites.len());
    let mut importance = Vec::new();

    for (site, members) in &sites {
        let member_values: Vec<&Array1<f64>> =
            members.iter().map(|&i| &component_curves[i].values).collect();
        site_curves.push(SiteCurve {
            site: site.clone(),
            values: compose_series(&member_values, config.n_points),
        });

        for &c in members {
            let imp = marginal_importance(&component_curves, members, c, config.delta);
            let key = &component_curves[c].key;
            importance.extend(times.iter().zip(imp.iter()).map(|(&t, &v)| ImportanceRecord {
                key: key.clone(),
                time: t,
                importance: v,
            }));
        }
    }

    Ok(ReliabilityReport {
        times,
        component_curves,
        site_curves,
        importance,
    })
}

/// Centered finite-difference importance of component `target` within its
/// site: perturb only its curve by +/- delta (clamped into [0, 1]),
/// recompose the site product, take the gap over 2*delta.
fn marginal_importance(
    curves: &[ComponentCurve],
    members: &[usize],
    target: usize,
    delta: f64,
) -> Array1<f64> {
    let n = curves[target].values.len();

    // Product of every OTHER member's curve; the perturbed target
    // substitutes back in
    let mut rest = Array1::<f64>::ones(n);
    for &i in members {
        if i != target {
            rest = rest * &curves[i].values;
        }
    }

    let v = &curves[target].values;
    let plus = v.mapv(|r| (r + delta).clamp(0.0, 1.0));
    let minus = v.mapv(|r| (r - delta).clamp(0.0, 1.0));

    (&rest * (&plus - &minus)) / (2.0 * delta)
}
