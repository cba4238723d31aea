use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for mentees.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for mentors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MentorId(pub String);

/// Identifier of a career field (e.g. "software-engineering").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CareerFieldId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for MentorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the mentee currently sits in their career.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerStage {
    Student,
    EarlyCareer,
    MidCareer,
    Senior,
}

impl CareerStage {
    pub const fn level(self) -> i8 {
        match self {
            CareerStage::Student => 1,
            CareerStage::EarlyCareer => 2,
            CareerStage::MidCareer => 3,
            CareerStage::Senior => 4,
        }
    }
}

/// Seniority a mentor advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ExperienceLevel {
    pub const fn level(self) -> i8 {
        match self {
            ExperienceLevel::Beginner => 1,
            ExperienceLevel::Intermediate => 2,
            ExperienceLevel::Advanced => 3,
            ExperienceLevel::Expert => 4,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }
}

/// The four canonical learning styles captured by the learning assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Reading,
    Kinesthetic,
}

impl LearningStyle {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Visual,
            Self::Auditory,
            Self::Reading,
            Self::Kinesthetic,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            LearningStyle::Visual => "visual",
            LearningStyle::Auditory => "auditory",
            LearningStyle::Reading => "reading",
            LearningStyle::Kinesthetic => "kinesthetic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillProficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub proficiency: SkillProficiency,
}

/// Account-level record; its absence means the user does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: UserId,
    pub name: String,
}

/// Mentee profile. Required for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub career_field: Option<CareerFieldId>,
    pub career_stage: Option<CareerStage>,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerGoal {
    pub title: String,
    pub related_skills: Vec<String>,
    pub target_date: Option<NaiveDate>,
}

/// Result of a learning style assessment; scores are 0..=100 per style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningAssessment {
    pub user_id: UserId,
    pub results: BTreeMap<LearningStyle, f32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Everything the factor scorers know about a mentee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: UserId,
    pub career_field: Option<CareerFieldId>,
    pub career_stage: Option<CareerStage>,
    pub skills: Vec<Skill>,
    pub career_goals: Vec<CareerGoal>,
    pub learning_styles: Option<BTreeMap<LearningStyle, f32>>,
}

impl UserContext {
    /// Build the scoring context from a profile plus its optional sub-records.
    ///
    /// Only the most recent active assessment contributes learning style results.
    pub fn assemble(
        profile: UserProfile,
        assessments: Vec<LearningAssessment>,
        career_goals: Vec<CareerGoal>,
    ) -> Self {
        let learning_styles = assessments
            .into_iter()
            .filter(|assessment| assessment.is_active)
            .max_by_key(|assessment| assessment.created_at)
            .map(|assessment| assessment.results);

        Self {
            user_id: profile.user_id,
            career_field: profile.career_field,
            career_stage: profile.career_stage,
            skills: profile.skills,
            career_goals,
            learning_styles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mentor {
    pub mentor_id: MentorId,
    pub name: String,
    pub headline: String,
    pub career_fields: BTreeSet<CareerFieldId>,
    pub experience_level: Option<ExperienceLevel>,
    pub skills: Vec<String>,
    /// Affinity per style on a 1..=10 scale.
    pub learning_style_compatibility: Option<BTreeMap<LearningStyle, u8>>,
    pub is_active: bool,
}

impl Mentor {
    pub fn summary(&self) -> MentorSummary {
        MentorSummary {
            mentor_id: self.mentor_id.clone(),
            name: self.name.clone(),
            headline: self.headline.clone(),
        }
    }
}

/// Display fields attached to persisted matches on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorSummary {
    pub mentor_id: MentorId,
    pub name: String,
    pub headline: String,
}

/// The five factor sub-scores, each within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchFactors {
    pub career_field_match: f32,
    pub experience_level_match: f32,
    pub learning_style_match: f32,
    pub skills_match: f32,
    pub career_goals_match: f32,
}
