//! Business-configured scoring weights and normalization constants.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RankError, Result};

pub const DEFAULT_REVENUE_NORM: f64 = 200_000.0;
pub const DEFAULT_TENURE_NORM: f64 = 20.0;
pub const DEFAULT_OVERRIDE_SCORE: f64 = 999.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ScoringWeights {
    pub service_rating_weight: f64,
    pub conversion_weight: f64,
    pub revenue_weight: f64,
    pub tenure_weight: f64,
    pub comm_weight: f64,
    pub lead_weight: f64,
    pub dest_weight: f64,
    pub launch_weight: f64,
    /// Revenue that maps to a normalized value of 1.0.
    pub revenue_norm: f64,
    /// Years of service that map to a normalized value of 1.0.
    pub tenure_norm: f64,
    /// Score given to the returning customer's prior agent.
    pub override_score: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            service_rating_weight: 0.30,
            conversion_weight: 0.25,
            revenue_weight: 0.25,
            tenure_weight: 0.10,
            comm_weight: 0.05,
            lead_weight: 0.05,
            dest_weight: 0.05,
            launch_weight: 0.05,
            revenue_norm: DEFAULT_REVENUE_NORM,
            tenure_norm: DEFAULT_TENURE_NORM,
            override_score: DEFAULT_OVERRIDE_SCORE,
        }
    }
}

impl ScoringWeights {
    /// Load weights from a TOML file. Keys left out keep their defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            RankError::InvalidConfig(format!("cannot read {}: {err}", path.display()))
        })?;
        let weights = Self::from_toml(&content)?;
        info!("Loaded scoring weights from {}", path.display());
        Ok(weights)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let weights: ScoringWeights =
            toml::from_str(content).map_err(|err| RankError::InvalidConfig(err.to_string()))?;
        weights.validate()?;
        Ok(weights)
    }

    pub fn weight_sum(&self) -> f64 {
        self.service_rating_weight
            + self.conversion_weight
            + self.revenue_weight
            + self.tenure_weight
            + self.comm_weight
            + self.lead_weight
            + self.dest_weight
            + self.launch_weight
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("serviceRatingWeight", self.service_rating_weight),
            ("conversionWeight", self.conversion_weight),
            ("revenueWeight", self.revenue_weight),
            ("tenureWeight", self.tenure_weight),
            ("commWeight", self.comm_weight),
            ("leadWeight", self.lead_weight),
            ("destWeight", self.dest_weight),
            ("launchWeight", self.launch_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(RankError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        for (name, value) in [("revenueNorm", self.revenue_norm), ("tenureNorm", self.tenure_norm)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(RankError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        // Normalized inputs top out at 1.0, so the weighted formula cannot
        // exceed the weight sum for in-range data.
        if !self.override_score.is_finite() || self.override_score <= self.weight_sum() {
            return Err(RankError::InvalidConfig(format!(
                "overrideScore {} must exceed the weight sum {:.2}",
                self.override_score,
                self.weight_sum()
            )));
        }

        Ok(())
    }
}
