// =============================================================================
// ReliaStats
// =============================================================================
//
// Reliability-engineering analysis for a fleet of industrial sites and their
// components, starting from raw maintenance logs of time-between-failure
// intervals.
//
// PIPELINE:
// ---------
//   failure log
//     -> estimation   fit six lifetime families per (site, component)
//     -> validation   KS + AD goodness-of-fit, rank, pick the best law
//     -> reliability  R(t) curves, series-system site reliability,
//                     marginal importance factors
//
// STRUCTURE:
// ----------
// The library is organized into modules, each handling a specific concern:
//
//   - laws:        The six lifetime-distribution families (survival,
//                  density, hazard, quantiles, summary statistics)
//   - estimation:  Parameter estimators (moments, MLE, least squares,
//                  3-parameter iteration)
//   - validation:  Goodness-of-fit tests, scoring, ranking
//   - reliability: Series composition and finite-difference importance
//   - pipeline:    Batch orchestration, per-group outcomes, summary
//   - tables:      The flat row types external adapters read and write
//   - config:      Explicit, documented pipeline settings
//   - error:       Error types used throughout the library
//
// Spreadsheet I/O, plotting and the ABC/Pareto classification are external
// collaborators: they consume and produce the row types in `tables` and
// never appear here.
//
// =============================================================================

pub mod config;
pub mod error;
pub mod estimation;
pub mod laws;
pub mod pipeline;
pub mod reliability;
pub mod tables;
pub mod validation;

// Re-export the items most callers need at the top level
pub use config::{EstimationConfig, PipelineConfig, ReliabilityConfig, ValidationConfig};
pub use error::{ReliaStatsError, Result};
pub use estimation::{fit_group, FitMethod, FitRecord, GroupKey};
pub use laws::{Law, LawStats, StatPoint};
pub use pipeline::{run_pipeline, BatchSummary, GroupOutcome, PipelineReport};
pub use reliability::{ReliabilityReport, SiteCurve};
pub use tables::FailureRow;
pub use validation::{validate_group, ValidationRecord};
