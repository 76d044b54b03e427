use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Matching policy, passed explicitly into the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum similarity each reference sample, and the aggregate, must reach.
    pub match_threshold: f32,
    /// Minimum separation between the best and second-best aggregate scores.
    pub gap_threshold: f32,
    /// Number of captures required per enrollment (K).
    pub required_samples: usize,
    /// Skip candidates whose centroid scores below this before per-sample scoring.
    pub centroid_prefilter: Option<f32>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.5,
            gap_threshold: 0.03,
            required_samples: 3,
            centroid_prefilter: None,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-1.0..=1.0).contains(&self.match_threshold) {
            return Err(ConfigError::MatchThreshold(self.match_threshold));
        }
        if !(0.0..=2.0).contains(&self.gap_threshold) {
            return Err(ConfigError::GapThreshold(self.gap_threshold));
        }
        if let Some(min) = self.centroid_prefilter {
            if !(-1.0..=1.0).contains(&min) {
                return Err(ConfigError::CentroidPrefilter(min));
            }
        }
        if self.required_samples == 0 {
            return Err(ConfigError::RequiredSamples);
        }
        Ok(())
    }
}
