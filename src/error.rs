// =============================================================================
// Error Types
// =============================================================================
//
// Errors returned by reliastats fall into two very different buckets:
//
//   1. SYSTEMIC errors — the input itself is unusable (empty table,
//      nonsensical configuration). These are the only ones that surface
//      as `Err` and halt the pipeline.
//
//   2. PER-GROUP problems — a single (site, component) group has too few
//      observations or a single family's fit degenerates numerically.
//      These are NOT errors: they become `GroupOutcome` values in the
//      batch report (see `pipeline`) so one bad pump never aborts the run.
//
// =============================================================================

use thiserror::Error;

/// Errors that halt the whole pipeline.
#[derive(Debug, Error)]
pub enum ReliaStatsError {
    /// The input table is empty or a stage received no data at all.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A value is outside its valid domain (non-positive scale, NaN time, ...).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A configuration field is out of range (zero grid points, negative delta, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReliaStatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_identify_the_problem() {
        let e = ReliaStatsError::EmptyInput("no rows with finite TBF".to_string());
        assert!(e.to_string().contains("TBF"));

        let e = ReliaStatsError::InvalidConfig("n_points must be > 0".to_string());
        assert!(e.to_string().contains("n_points"));
    }
}
