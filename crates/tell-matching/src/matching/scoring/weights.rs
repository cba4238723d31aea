use serde::{Deserialize, Serialize};

use super::super::domain::MatchFactors;

const SUM_TOLERANCE: f32 = 1e-6;

/// Relative importance of each factor in the compatibility score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub career_field: f32,
    pub experience_level: f32,
    pub learning_style: f32,
    pub skills: f32,
    pub career_goals: f32,
}

impl FactorWeights {
    pub const STANDARD: FactorWeights = FactorWeights {
        career_field: 0.30,
        experience_level: 0.20,
        learning_style: 0.20,
        skills: 0.15,
        career_goals: 0.15,
    };

    pub fn sum(&self) -> f32 {
        self.career_field
            + self.experience_level
            + self.learning_style
            + self.skills
            + self.career_goals
    }

    /// Accept an alternate weight set if it is finite, non-negative, and sums to one.
    pub fn validated(self) -> Result<Self, WeightsError> {
        let weights = [
            self.career_field,
            self.experience_level,
            self.learning_style,
            self.skills,
            self.career_goals,
        ];
        if weights
            .iter()
            .any(|weight| !weight.is_finite() || *weight < 0.0)
        {
            return Err(WeightsError::InvalidWeight);
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(WeightsError::SumMismatch { sum });
        }

        Ok(self)
    }

    /// Weighted sum of the factors, rounded to the nearest integer and kept in 0..=100.
    pub fn aggregate(&self, factors: &MatchFactors) -> u8 {
        let total = self.career_field * factors.career_field_match
            + self.experience_level * factors.experience_level_match
            + self.learning_style * factors.learning_style_match
            + self.skills * factors.skills_match
            + self.career_goals * factors.career_goals_match;

        total.round().clamp(0.0, 100.0) as u8
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightsError {
    #[error("factor weights must be finite and non-negative")]
    InvalidWeight,
    #[error("factor weights must sum to 1.0 (found {sum:.4})")]
    SumMismatch { sum: f32 },
}
