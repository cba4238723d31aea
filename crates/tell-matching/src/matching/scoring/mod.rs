mod factors;
mod weights;

pub use factors::{
    career_field_match, career_goals_match, experience_level_match, learning_style_match,
    skills_match, NEUTRAL_SCORE,
};
pub use weights::{FactorWeights, WeightsError};

use super::domain::{MatchFactors, Mentor, MentorId, UserContext};
use serde::{Deserialize, Serialize};

/// Stateless scorer that applies the factor rubric and weight set to a (user, mentor) pair.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    weights: FactorWeights,
}

impl MatchingEngine {
    pub fn new(weights: FactorWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &FactorWeights {
        &self.weights
    }

    pub fn factors(&self, user: &UserContext, mentor: &Mentor) -> MatchFactors {
        MatchFactors {
            career_field_match: career_field_match(user, mentor),
            experience_level_match: experience_level_match(user, mentor),
            learning_style_match: learning_style_match(user.learning_styles.as_ref(), mentor),
            skills_match: skills_match(&user.skills, mentor),
            career_goals_match: career_goals_match(&user.career_goals, mentor),
        }
    }

    pub fn score(&self, user: &UserContext, mentor: &Mentor) -> MatchScore {
        let match_factors = self.factors(user, mentor);
        let compatibility_score = self.weights.aggregate(&match_factors);

        MatchScore {
            mentor_id: mentor.mentor_id.clone(),
            compatibility_score,
            match_factors,
        }
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(FactorWeights::STANDARD)
    }
}

/// Freshly computed result for one mentor, as returned to single-user callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub mentor_id: MentorId,
    pub compatibility_score: u8,
    pub match_factors: MatchFactors,
}
