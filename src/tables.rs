// =============================================================================
// External Table Shapes
// =============================================================================
//
// The crate computes purely in memory; persistence (spreadsheets) is an
// external collaborator. This module is the contract with that collaborator:
// flat row types carrying the exact column names of the source system's
// workbooks (French headers included), serde-serializable so an adapter can
// stream them straight into a sheet or CSV.
//
// A FitRow flattens the `Law` enum into the nullable per-family parameter
// columns of the workbook: exactly one family's columns are populated per
// row, the rest stay empty.
//
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::estimation::{FitRecord, GroupKey};
use crate::laws::{Law, LawStats};
use crate::reliability::{ImportanceRecord, ReliabilityReport};
use crate::validation::ValidationRecord;

/// One observed inter-failure interval (input table row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRow {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Composant")]
    pub component: String,
    #[serde(rename = "TBF")]
    pub tbf: f64,
}

impl FailureRow {
    pub fn new(site: impl Into<String>, component: impl Into<String>, tbf: f64) -> Self {
        Self {
            site: site.into(),
            component: component.into(),
            tbf,
        }
    }

    pub fn key(&self) -> GroupKey {
        GroupKey::new(self.site.clone(), self.component.clone())
    }
}

/// One estimated parameter set (the "Parametres_Fiabilite" sheet shape).
#[derive(Debug, Clone, Default, Serialize)]
pub struct FitRow {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Composant")]
    pub component: String,
    #[serde(rename = "Loi")]
    pub law: &'static str,
    #[serde(rename = "Méthode")]
    pub method: &'static str,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
    pub k: Option<f64>,
    pub theta: Option<f64>,
    pub mu_ln: Option<f64>,
    pub sigma_ln: Option<f64>,
    pub mu_gumbel: Option<f64>,
    pub beta_gumbel: Option<f64>,
    pub lambda_: Option<f64>,
}

impl From<&FitRecord> for FitRow {
    fn from(rec: &FitRecord) -> Self {
        let mut row = FitRow {
            site: rec.key.site.clone(),
            component: rec.key.component.clone(),
            law: rec.law.family_name(),
            method: rec.method.label(),
            ..FitRow::default()
        };
        match rec.law {
            Law::Weibull2P { alpha, beta } => {
                row.alpha = Some(alpha);
                row.beta = Some(beta);
            }
            Law::Weibull3P { alpha, beta, gamma } => {
                row.alpha = Some(alpha);
                row.beta = Some(beta);
                row.gamma = Some(gamma);
            }
            Law::Gamma { k, theta } => {
                row.k = Some(k);
                row.theta = Some(theta);
            }
            Law::Lognormal { mu, sigma } => {
                row.mu_ln = Some(mu);
                row.sigma_ln = Some(sigma);
            }
            Law::Gumbel { mu, beta } => {
                row.mu_gumbel = Some(mu);
                row.beta_gumbel = Some(beta);
            }
            Law::Exponential { lambda } => {
                row.lambda_ = Some(lambda);
            }
        }
        row
    }
}

/// One goodness-of-fit test result with its rank (the "Classement Top 3"
/// sheet shape).
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRow {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Composant")]
    pub component: String,
    #[serde(rename = "Loi")]
    pub law: &'static str,
    #[serde(rename = "Méthode")]
    pub method: &'static str,
    #[serde(rename = "KS_Stat")]
    pub ks_stat: f64,
    #[serde(rename = "KS_pval")]
    pub ks_pvalue: f64,
    #[serde(rename = "AD_Stat")]
    pub ad_stat: f64,
    #[serde(rename = "Score_Global")]
    pub score: f64,
    #[serde(rename = "Classement")]
    pub rank: usize,
}

impl From<&ValidationRecord> for ValidationRow {
    fn from(rec: &ValidationRecord) -> Self {
        ValidationRow {
            site: rec.fit.key.site.clone(),
            component: rec.fit.key.component.clone(),
            law: rec.fit.law.family_name(),
            method: rec.fit.method.label(),
            ks_stat: rec.ks_stat,
            ks_pvalue: rec.ks_pvalue,
            ad_stat: rec.ad_stat,
            score: rec.score,
            rank: rec.rank,
        }
    }
}

/// One rank-1 law with its parameters merged back in (the "Résumé
/// Meilleure Loi" sheet shape): the key columns of the validation row plus
/// the full parameter columns.
#[derive(Debug, Clone, Serialize)]
pub struct BestLawRow {
    #[serde(flatten)]
    pub parameters: FitRow,
    #[serde(rename = "Score_Global")]
    pub score: f64,
}

impl From<&ValidationRecord> for BestLawRow {
    fn from(rec: &ValidationRecord) -> Self {
        BestLawRow {
            parameters: FitRow::from(&rec.fit),
            score: rec.score,
        }
    }
}

/// Landmark statistics of a best law, each "value (hazard)" pair flattened
/// into two columns (the "Statistiques_Fiabilite" sheet shape).
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStatsRow {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Composant")]
    pub component: String,
    #[serde(rename = "Loi")]
    pub law: &'static str,
    #[serde(rename = "Méthode")]
    pub method: &'static str,
    #[serde(rename = "MTBF")]
    pub mtbf: f64,
    #[serde(rename = "MTBF_lambda")]
    pub mtbf_hazard: f64,
    #[serde(rename = "Mediane")]
    pub median: f64,
    #[serde(rename = "Mediane_lambda")]
    pub median_hazard: f64,
    #[serde(rename = "Mode")]
    pub mode: f64,
    #[serde(rename = "Mode_lambda")]
    pub mode_hazard: f64,
    #[serde(rename = "Q75")]
    pub q75: f64,
    #[serde(rename = "Q75_lambda")]
    pub q75_hazard: f64,
    #[serde(rename = "Q99")]
    pub q99: f64,
    #[serde(rename = "Q99_lambda")]
    pub q99_hazard: f64,
}

impl SummaryStatsRow {
    pub fn from_stats(rec: &FitRecord, stats: &LawStats) -> Self {
        SummaryStatsRow {
            site: rec.key.site.clone(),
            component: rec.key.component.clone(),
            law: rec.law.family_name(),
            method: rec.method.label(),
            mtbf: stats.mtbf.value,
            mtbf_hazard: stats.mtbf.hazard,
            median: stats.median.value,
            median_hazard: stats.median.hazard,
            mode: stats.mode.value,
            mode_hazard: stats.mode.hazard,
            q75: stats.q75.value,
            q75_hazard: stats.q75.hazard,
            q99: stats.q99.value,
            q99_hazard: stats.q99.hazard,
        }
    }
}

/// One sampled point of a reliability curve in long form (the
/// "R_composants" and "R_sites" sheet shapes). Site-level rows leave
/// the `Composant` column empty.
#[derive(Debug, Clone, Serialize)]
pub struct CurveRow {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Composant")]
    pub component: Option<String>,
    #[serde(rename = "Temps")]
    pub time: f64,
    #[serde(rename = "Fiabilite")]
    pub reliability: f64,
}

/// Flattens a reliability report into curve rows: every component curve
/// over the shared grid, then every site curve.
pub fn curve_rows(report: &ReliabilityReport) -> Vec<CurveRow> {
    let mut rows = Vec::new();
    for curve in &report.component_curves {
        for (t, r) in report.times.iter().zip(curve.values.iter()) {
            rows.push(CurveRow {
                site: curve.key.site.clone(),
                component: Some(curve.key.component.clone()),
                time: *t,
                reliability: *r,
            });
        }
    }
    for curve in &report.site_curves {
        for (t, r) in report.times.iter().zip(curve.values.iter()) {
            rows.push(CurveRow {
                site: curve.site.clone(),
                component: None,
                time: *t,
                reliability: *r,
            });
        }
    }
    rows
}

/// One marginal-importance sample (the "Importance" sheet shape).
#[derive(Debug, Clone, Serialize)]
pub struct ImportanceRow {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Composant")]
    pub component: String,
    #[serde(rename = "Temps")]
    pub time: f64,
    #[serde(rename = "Importance_Marginale")]
    pub importance: f64,
}

impl From<&ImportanceRecord> for ImportanceRow {
    fn from(rec: &ImportanceRecord) -> Self {
        ImportanceRow {
            site: rec.key.site.clone(),
            component: rec.key.component.clone(),
            time: rec.time,
            importance: rec.importance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::FitMethod;

    #[test]
    fn test_fit_row_populates_exactly_one_family() {
        let rec = FitRecord {
            key: GroupKey::new("SiteA", "PumpX"),
            method: FitMethod::Moments,
            law: Law::Gamma { k: 2.0, theta: 30.0 },
        };
        let row = FitRow::from(&rec);

        assert_eq!(row.law, "Gamma");
        assert_eq!(row.k, Some(2.0));
        assert_eq!(row.theta, Some(30.0));
        // Every other family's columns stay empty
        assert!(row.alpha.is_none() && row.beta.is_none() && row.gamma.is_none());
        assert!(row.mu_ln.is_none() && row.sigma_ln.is_none());
        assert!(row.mu_gumbel.is_none() && row.beta_gumbel.is_none());
        assert!(row.lambda_.is_none());
    }

    #[test]
    fn test_fit_row_weibull3p_has_three_parameters() {
        let rec = FitRecord {
            key: GroupKey::new("S", "C"),
            method: FitMethod::Iteration,
            law: Law::Weibull3P { alpha: 40.0, beta: 1.7, gamma: 12.0 },
        };
        let row = FitRow::from(&rec);
        assert_eq!(row.method, "Itération");
        assert_eq!(row.alpha, Some(40.0));
        assert_eq!(row.beta, Some(1.7));
        assert_eq!(row.gamma, Some(12.0));
        assert!(row.lambda_.is_none());
    }

    #[test]
    fn test_serde_emits_source_system_column_names() {
        let row = FitRow::from(&FitRecord {
            key: GroupKey::new("SiteA", "PumpX"),
            method: FitMethod::MaximumLikelihood,
            law: Law::Exponential { lambda: 0.05 },
        });
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"Site\":\"SiteA\""));
        assert!(json.contains("\"Composant\":\"PumpX\""));
        assert!(json.contains("\"Loi\":\"Exponentielle\""));
        assert!(json.contains("\"Méthode\":\"MLE\""));
        assert!(json.contains("\"lambda_\":0.05"));
    }

    fn sample_record() -> ValidationRecord {
        ValidationRecord {
            fit: FitRecord {
                key: GroupKey::new("SiteA", "PumpX"),
                method: FitMethod::Moments,
                law: Law::Exponential { lambda: 0.01 },
            },
            ks_stat: 0.12,
            ks_pvalue: 0.85,
            ad_stat: 0.4,
            score: 0.52,
            rank: 1,
        }
    }

    #[test]
    fn test_validation_row_column_names() {
        let json = serde_json::to_string(&ValidationRow::from(&sample_record())).unwrap();
        assert!(json.contains("\"KS_Stat\":0.12"));
        assert!(json.contains("\"KS_pval\":0.85"));
        assert!(json.contains("\"AD_Stat\":0.4"));
        assert!(json.contains("\"Score_Global\":0.52"));
        assert!(json.contains("\"Classement\":1"));
    }

    #[test]
    fn test_best_law_row_merges_parameters_and_score() {
        let json = serde_json::to_string(&BestLawRow::from(&sample_record())).unwrap();
        // Flattened parameter columns next to the score
        assert!(json.contains("\"Site\":\"SiteA\""));
        assert!(json.contains("\"Loi\":\"Exponentielle\""));
        assert!(json.contains("\"lambda_\":0.01"));
        assert!(json.contains("\"Score_Global\":0.52"));
    }

    #[test]
    fn test_summary_stats_row_column_names() {
        let rec = sample_record().fit;
        let stats = rec.law.summary_stats();
        let json = serde_json::to_string(&SummaryStatsRow::from_stats(&rec, &stats)).unwrap();
        assert!(json.contains("\"MTBF\":100.0"));
        assert!(json.contains("\"MTBF_lambda\":"));
        assert!(json.contains("\"Mediane\":"));
        assert!(json.contains("\"Mode\":"));
        assert!(json.contains("\"Q75\":"));
        assert!(json.contains("\"Q99_lambda\":"));
    }

    #[test]
    fn test_importance_row_column_names() {
        let rec = ImportanceRecord {
            key: GroupKey::new("SiteA", "PumpX"),
            time: 50.0,
            importance: 0.75,
        };
        let json = serde_json::to_string(&ImportanceRow::from(&rec)).unwrap();
        assert!(json.contains("\"Temps\":50.0"));
        assert!(json.contains("\"Importance_Marginale\":0.75"));
    }

    #[test]
    fn test_curve_rows_cover_components_then_sites() {
        let best = vec![(
            GroupKey::new("SiteA", "PumpX"),
            Law::Exponential { lambda: 0.01 },
        )];
        let config = crate::config::ReliabilityConfig {
            t_max: 100.0,
            n_points: 3,
            delta: 1e-4,
        };
        let report = crate::reliability::analyze(&best, &config).unwrap();
        let rows = curve_rows(&report);
        // One component curve and one site curve, 3 grid points each
        assert_eq!(rows.len(), 6);

        let json = serde_json::to_string(&rows[0]).unwrap();
        assert!(json.contains("\"Site\":\"SiteA\""));
        assert!(json.contains("\"Composant\":\"PumpX\""));
        assert!(json.contains("\"Temps\":0.0"));
        assert!(json.contains("\"Fiabilite\":1.0"));

        let site_row = rows.iter().find(|r| r.component.is_none()).unwrap();
        let json = serde_json::to_string(site_row).unwrap();
        assert!(json.contains("\"Composant\":null"));
    }
}
