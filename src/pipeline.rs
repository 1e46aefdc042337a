// =============================================================================
// Batch Pipeline
// =============================================================================
//
// Chains the three stages over a full maintenance log:
//
//     failure log -> Estimator -> Validator -> Composer
//
// Groups are keyed by (Site, Composant) and processed independently — the
// estimation and validation of different groups share nothing, so they run
// on the rayon pool. The composer needs every group's best law, so it runs
// after the parallel section joins.
//
// OUTCOME MODEL
// -------------
// Each group resolves to exactly one `GroupOutcome`:
//
//   Fitted   — at least one family fit succeeded (the group may still lack
//              validation if it has fewer than 5 observations)
//   Skipped  — below the fitting minimum; not an error, no record emitted
//   Failed   — enough data but every family estimator degenerated
//
// Per-family failures inside a Fitted group are kept alongside the records.
// Only a systemic problem (an empty input table, invalid configuration)
// returns `Err` and halts the batch.
//
// =============================================================================

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::{ReliaStatsError, Result};
use crate::estimation::{fit_group, FamilyFailure, FitRecord, GroupKey};
use crate::laws::LawStats;
use crate::reliability::{analyze, ReliabilityReport};
use crate::tables::FailureRow;
use crate::validation::{best_law, validate_group, ValidationRecord};

/// Why a group produced no output at a given stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Fewer observations than the fitting minimum: no fits attempted.
    TooFewForFit { observed: usize, required: usize },
    /// Enough to fit but fewer than the validation minimum: fits exist,
    /// no goodness-of-fit ranking.
    TooFewForValidation { observed: usize, required: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::TooFewForFit { observed, required } => {
                write!(f, "{observed} observations, {required} required for fitting")
            }
            SkipReason::TooFewForValidation { observed, required } => {
                write!(f, "{observed} observations, {required} required for validation")
            }
        }
    }
}

/// Resolution of one (site, component) group.
#[derive(Debug, Clone)]
pub enum GroupOutcome {
    Fitted {
        fits: Vec<FitRecord>,
        family_failures: Vec<FamilyFailure>,
        /// Ranked top-k validation records; empty when the group was too
        /// small to validate.
        validations: Vec<ValidationRecord>,
        validation_skip: Option<SkipReason>,
    },
    Skipped(SkipReason),
    Failed(String),
}

/// One group's key and outcome.
#[derive(Debug, Clone)]
pub struct GroupReport {
    pub key: GroupKey,
    pub outcome: GroupOutcome,
}

/// Batch-level tallies: the user-visible "what happened" summary.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub groups: usize,
    pub fitted: usize,
    pub validated: usize,
    pub skipped: Vec<(GroupKey, SkipReason)>,
    pub failed: Vec<(GroupKey, String)>,
}

/// A best law with its descriptive statistics, ready for the summary sheet.
#[derive(Debug, Clone)]
pub struct BestLawSummary {
    pub record: ValidationRecord,
    pub stats: LawStats,
}

/// Everything the pipeline produces.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub groups: Vec<GroupReport>,
    pub best_laws: Vec<BestLawSummary>,
    /// Present when at least one group yielded a best law.
    pub reliability: Option<ReliabilityReport>,
    pub summary: BatchSummary,
}

/// Run the full analysis over a failure log.
///
/// Rows are grouped by (Site, Composant) in first-appearance order; TBF
/// values that are NaN are dropped (missing cells in the source sheet),
/// mirroring how the log is cleaned upstream. Returns `Err` only for
/// systemic problems: an invalid configuration or an input with no usable
/// rows.
pub fn run_pipeline(rows: &[FailureRow], config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;

    let groups = group_observations(rows)?;

    // Estimation + validation are independent per group
    let group_reports: Vec<GroupReport> = groups
        .par_iter()
        .map(|(key, tbf)| GroupReport {
            key: key.clone(),
            outcome: process_group(key, tbf, config),
        })
        .collect();

    // Join: collect best laws in group order, then compose
    let mut best_laws = Vec::new();
    for report in &group_reports {
        if let GroupOutcome::Fitted { validations, .. } = &report.outcome {
            if let Some(best) = best_law(validations) {
                best_laws.push(BestLawSummary {
                    record: best.clone(),
                    stats: best.fit.law.summary_stats(),
                });
            }
        }
    }

    let reliability = if best_laws.is_empty() {
        None
    } else {
        let laws: Vec<(GroupKey, crate::laws::Law)> = best_laws
            .iter()
            .map(|b| (b.record.fit.key.clone(), b.record.fit.law))
            .collect();
        Some(analyze(&laws, &config.reliability)?)
    };

    let summary = summarize(&group_reports);
    info!(
        "pipeline done: {} groups, {} fitted, {} validated, {} skipped, {} failed",
        summary.groups,
        summary.fitted,
        summary.validated,
        summary.skipped.len(),
        summary.failed.len()
    );
    for (key, reason) in &summary.skipped {
        info!("skipped {key}: {reason}");
    }
    for (key, reason) in &summary.failed {
        warn!("failed {key}: {reason}");
    }

    Ok(PipelineReport {
        groups: group_reports,
        best_laws,
        reliability,
        summary,
    })
}

/// Group the log by (Site, Composant), preserving first-appearance order
/// and dropping NaN intervals.
fn group_observations(rows: &[FailureRow]) -> Result<Vec<(GroupKey, Vec<f64>)>> {
    let mut groups: Vec<(GroupKey, Vec<f64>)> = Vec::new();
    for row in rows {
        if row.tbf.is_nan() {
            continue;
        }
        let key = row.key();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, tbf)) => tbf.push(row.tbf),
            None => groups.push((key, vec![row.tbf])),
        }
    }
    if groups.is_empty() {
        return Err(ReliaStatsError::EmptyInput(
            "failure log contains no usable rows".to_string(),
        ));
    }
    Ok(groups)
}

/// Estimate and (when large enough) validate one group.
fn process_group(key: &GroupKey, tbf: &[f64], config: &PipelineConfig) -> GroupOutcome {
    let n = tbf.len();
    if n < config.estimation.min_observations {
        return GroupOutcome::Skipped(SkipReason::TooFewForFit {
            observed: n,
            required: config.estimation.min_observations,
        });
    }

    let fit = fit_group(key, tbf, &config.estimation);
    if fit.records.is_empty() {
        let reasons: Vec<String> = fit
            .failures
            .iter()
            .map(|f| format!("{} [{}]: {}", f.family, f.method, f.reason))
            .collect();
        return GroupOutcome::Failed(format!(
            "every family fit degenerated: {}",
            reasons.join("; ")
        ));
    }

    if n < config.validation.min_observations {
        return GroupOutcome::Fitted {
            fits: fit.records,
            family_failures: fit.failures,
            validations: Vec::new(),
            validation_skip: Some(SkipReason::TooFewForValidation {
                observed: n,
                required: config.validation.min_observations,
            }),
        };
    }

    let validations = validate_group(&fit.records, tbf, &config.validation);
    GroupOutcome::Fitted {
        fits: fit.records,
        family_failures: fit.failures,
        validations,
        validation_skip: None,
    }
}

fn summarize(reports: &[GroupReport]) -> BatchSummary {
    let mut summary = BatchSummary {
        groups: reports.len(),
        ..BatchSummary::default()
    };
    for report in reports {
        match &report.outcome {
            GroupOutcome::Fitted { validations, validation_skip, .. } => {
                summary.fitted += 1;
                if !validations.is_empty() {
                    summary.validated += 1;
                }
                if let Some(reason) = validation_skip {
                    summary.skipped.push((report.key.clone(), reason.clone()));
                }
            }
            GroupOutcome::Skipped(reason) => {
                summary.skipped.push((report.key.clone(), reason.clone()));
            }
            GroupOutcome::Failed(reason) => {
                summary.failed.push((report.key.clone(), reason.clone()));
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use crate::laws::Law;

    fn rows_for(site: &str, component: &str, tbf: &[f64]) -> Vec<FailureRow> {
        tbf.iter()
            .map(|&t| FailureRow::new(site, component, t))
            .collect()
    }

    #[test]
    fn test_end_to_end_exponential_scenario() {
        // TBF = [10, 20, 15, 25, 30]: mean 20, exponential MLE lambda 0.05,
        // survival(20) = exp(-1)
        let rows = rows_for("SiteA", "PumpX", &[10.0, 20.0, 15.0, 25.0, 30.0]);
        let report = run_pipeline(&rows, &PipelineConfig::default()).unwrap();

        let fits = match &report.groups[0].outcome {
            GroupOutcome::Fitted { fits, .. } => fits,
            other => panic!("expected fitted outcome, got {:?}", other),
        };
        let expo = fits
            .iter()
            .find_map(|f| match f.law {
                Law::Exponential { lambda } => Some(lambda),
                _ => None,
            })
            .expect("exponential fit must exist");
        assert_relative_eq!(expo, 0.05, max_relative = 1e-12);
        assert_abs_diff_eq!(
            Law::Exponential { lambda: expo }.survival(20.0),
            (-1.0_f64).exp(),
            epsilon = 1e-12
        );

        // 5 observations: validated, best law selected, reliability composed
        assert_eq!(report.summary.validated, 1);
        assert_eq!(report.best_laws.len(), 1);
        assert!(report.reliability.is_some());
    }

    #[test]
    fn test_two_observations_produce_no_fit() {
        let rows = rows_for("SiteA", "PumpX", &[10.0, 20.0]);
        let report = run_pipeline(&rows, &PipelineConfig::default()).unwrap();

        assert!(matches!(
            report.groups[0].outcome,
            GroupOutcome::Skipped(SkipReason::TooFewForFit { observed: 2, required: 3 })
        ));
        assert_eq!(report.summary.fitted, 0);
        assert!(report.best_laws.is_empty());
        assert!(report.reliability.is_none());
    }

    #[test]
    fn test_four_observations_fit_but_do_not_validate() {
        let rows = rows_for("SiteA", "PumpX", &[10.0, 20.0, 15.0, 25.0]);
        let report = run_pipeline(&rows, &PipelineConfig::default()).unwrap();

        match &report.groups[0].outcome {
            GroupOutcome::Fitted { fits, validations, validation_skip, .. } => {
                assert!(!fits.is_empty());
                assert!(validations.is_empty());
                assert!(matches!(
                    validation_skip,
                    Some(SkipReason::TooFewForValidation { observed: 4, required: 5 })
                ));
            }
            other => panic!("expected fitted outcome, got {:?}", other),
        }
        assert_eq!(report.summary.fitted, 1);
        assert_eq!(report.summary.validated, 0);
        // No best law means nothing to compose
        assert!(report.reliability.is_none());
    }

    #[test]
    fn test_one_bad_group_does_not_abort_the_batch() {
        let mut rows = rows_for("SiteA", "PumpX", &[12.0, 25.0, 31.0, 44.0, 58.0, 71.0]);
        rows.extend(rows_for("SiteA", "Tiny", &[5.0])); // below fit minimum
        rows.extend(rows_for("SiteB", "Motor", &[30.0, 45.0, 60.0, 80.0, 95.0]));

        let report = run_pipeline(&rows, &PipelineConfig::default()).unwrap();

        assert_eq!(report.summary.groups, 3);
        assert_eq!(report.summary.fitted, 2);
        assert_eq!(report.summary.skipped.len(), 1);
        assert_eq!(report.summary.skipped[0].0, GroupKey::new("SiteA", "Tiny"));
        assert_eq!(report.best_laws.len(), 2);
    }

    #[test]
    fn test_nan_intervals_are_dropped_like_missing_cells() {
        let mut rows = rows_for("SiteA", "PumpX", &[10.0, 20.0, 15.0, 25.0, 30.0]);
        rows.push(FailureRow::new("SiteA", "PumpX", f64::NAN));
        let report = run_pipeline(&rows, &PipelineConfig::default()).unwrap();

        // Still exactly 5 usable observations: validation proceeds
        assert_eq!(report.summary.validated, 1);
    }

    #[test]
    fn test_empty_input_is_systemic() {
        assert!(run_pipeline(&[], &PipelineConfig::default()).is_err());
        let only_nan = vec![FailureRow::new("S", "C", f64::NAN)];
        assert!(run_pipeline(&only_nan, &PipelineConfig::default()).is_err());
    }

    #[test]
    fn test_sites_compose_from_explicit_keys() {
        // Site names where one is a prefix of the other: membership must
        // come from the key, not from the label text
        let mut rows = rows_for("Nord", "Pump", &[12.0, 25.0, 31.0, 44.0, 58.0]);
        rows.extend(rows_for("Nord-Est", "Pump", &[30.0, 45.0, 60.0, 80.0, 95.0]));

        let report = run_pipeline(&rows, &PipelineConfig::default()).unwrap();
        let rel = report.reliability.expect("two validated groups");

        assert_eq!(rel.site_curves.len(), 2);
        let nord = rel.site_curves.iter().find(|s| s.site == "Nord").unwrap();
        let nord_pump = rel
            .component_curves
            .iter()
            .find(|c| c.key == GroupKey::new("Nord", "Pump"))
            .unwrap();
        // "Nord" contains exactly one component, never Nord-Est's
        for j in 0..nord.values.len() {
            assert_abs_diff_eq!(nord.values[j], nord_pump.values[j], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_best_law_summary_carries_stats() {
        let rows = rows_for("SiteA", "PumpX", &[15.0, 22.0, 31.0, 47.0, 60.0, 74.0, 92.0]);
        let report = run_pipeline(&rows, &PipelineConfig::default()).unwrap();

        let best = &report.best_laws[0];
        assert_eq!(best.record.rank, 1);
        assert!(best.stats.mtbf.value > 0.0);
        assert!(best.stats.q75.value < best.stats.q99.value);
    }
}
