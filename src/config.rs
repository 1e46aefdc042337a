// =============================================================================
// Pipeline Configuration
// =============================================================================
//
// Every tunable of the analysis lives here, with documented defaults, and is
// passed explicitly into the pipeline entry point. Nothing in this crate
// reads process-wide mutable state.
//
// The defaults reproduce the production analysis settings: a 200-point time
// grid over [0, 10 000] time units, a ±1e-4 perturbation for the importance
// factors, and the 3-observation / 5-observation minimums for fitting and
// validation respectively.
//
// =============================================================================

use crate::error::{ReliaStatsError, Result};

/// Settings for the parameter estimation stage.
#[derive(Debug, Clone)]
pub struct EstimationConfig {
    /// Minimum number of inter-failure intervals required to attempt any fit.
    /// Default: 3
    pub min_observations: usize,

    /// Lower bound of the Weibull moment-matching beta grid. Default: 0.5
    pub weibull_beta_min: f64,

    /// Upper bound of the Weibull moment-matching beta grid. Default: 10.0
    pub weibull_beta_max: f64,

    /// Number of points in the Weibull moment-matching beta grid.
    /// Default: 1000
    pub weibull_beta_grid: usize,

    /// Maximum Newton-Raphson iterations for the Weibull MLE. Default: 100
    pub mle_max_iterations: usize,

    /// Newton-Raphson convergence tolerance. Default: 1e-10
    pub mle_tolerance: f64,

    /// Floor applied to the Gumbel scale parameter so a degenerate sample
    /// never produces a zero-scale distribution. Default: 1e-6
    pub gumbel_scale_floor: f64,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            min_observations: 3,
            weibull_beta_min: 0.5,
            weibull_beta_max: 10.0,
            weibull_beta_grid: 1000,
            mle_max_iterations: 100,
            mle_tolerance: 1e-10,
            gumbel_scale_floor: 1e-6,
        }
    }
}

/// Settings for the goodness-of-fit validation stage.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Minimum number of observations required to run the KS/AD tests.
    /// Default: 5
    pub min_observations: usize,

    /// How many ranked fits to retain per (site, component). Default: 3
    pub top_k: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_observations: 5,
            top_k: 3,
        }
    }
}

/// Settings for the reliability composition and sensitivity stage.
#[derive(Debug, Clone)]
pub struct ReliabilityConfig {
    /// Upper bound of the shared time grid (the lower bound is 0).
    /// Default: 10_000.0
    pub t_max: f64,

    /// Number of evenly spaced grid points. Default: 200
    pub n_points: usize,

    /// Perturbation applied to a component curve when estimating its
    /// marginal importance by centered finite difference. Default: 1e-4
    pub delta: f64,
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            t_max: 10_000.0,
            n_points: 200,
            delta: 1e-4,
        }
    }
}

/// Full pipeline configuration: one field per stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub estimation: EstimationConfig,
    pub validation: ValidationConfig,
    pub reliability: ReliabilityConfig,
}

impl PipelineConfig {
    /// Check the configuration for values that would make the pipeline
    /// meaningless rather than merely slow.
    pub fn validate(&self) -> Result<()> {
        if self.estimation.min_observations < 2 {
            return Err(ReliaStatsError::InvalidConfig(
                "estimation.min_observations must be at least 2".to_string(),
            ));
        }
        if self.estimation.weibull_beta_min <= 0.0
            || self.estimation.weibull_beta_max <= self.estimation.weibull_beta_min
        {
            return Err(ReliaStatsError::InvalidConfig(
                "weibull beta grid bounds must satisfy 0 < min < max".to_string(),
            ));
        }
        if self.estimation.weibull_beta_grid < 2 {
            return Err(ReliaStatsError::InvalidConfig(
                "weibull_beta_grid must contain at least 2 points".to_string(),
            ));
        }
        if self.validation.min_observations < self.estimation.min_observations {
            return Err(ReliaStatsError::InvalidConfig(
                "validation.min_observations must be >= estimation.min_observations".to_string(),
            ));
        }
        if self.validation.top_k == 0 {
            return Err(ReliaStatsError::InvalidConfig(
                "validation.top_k must be > 0".to_string(),
            ));
        }
        if !(self.reliability.t_max > 0.0) {
            return Err(ReliaStatsError::InvalidConfig(
                "reliability.t_max must be positive".to_string(),
            ));
        }
        if self.reliability.n_points < 2 {
            return Err(ReliaStatsError::InvalidConfig(
                "reliability.n_points must be at least 2".to_string(),
            ));
        }
        if !(self.reliability.delta > 0.0 && self.reliability.delta < 0.5) {
            return Err(ReliaStatsError::InvalidConfig(
                "reliability.delta must be in (0, 0.5)".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        let mut cfg = PipelineConfig::default();
        cfg.reliability.n_points = 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_beta_bounds() {
        let mut cfg = PipelineConfig::default();
        cfg.estimation.weibull_beta_min = 5.0;
        cfg.estimation.weibull_beta_max = 1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_validation_minimum_below_fit_minimum() {
        let mut cfg = PipelineConfig::default();
        cfg.validation.min_observations = 2;
        assert!(cfg.validate().is_err());
    }
}
