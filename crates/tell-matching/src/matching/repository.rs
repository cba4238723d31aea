use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    CareerGoal, LearningAssessment, MatchFactors, Mentor, MentorId, MentorSummary, UserAccount,
    UserId, UserProfile,
};

/// Persisted compatibility result for one (user, mentor) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub user_id: UserId,
    pub mentor_id: MentorId,
    pub compatibility_score: u8,
    pub match_factors: MatchFactors,
    pub is_active: bool,
    pub last_calculated: DateTime<Utc>,
}

impl MatchRecord {
    pub fn with_mentor(self, mentor: Option<MentorSummary>) -> TopMatchView {
        TopMatchView {
            mentor,
            record: self,
        }
    }
}

/// Persisted match enriched with mentor display fields for API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopMatchView {
    #[serde(flatten)]
    pub record: MatchRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor: Option<MentorSummary>,
}

/// Storage abstraction for match records.
///
/// Implementations must keep at most one record per (user, mentor) key; concurrent upserts to the
/// same key resolve last-writer-wins.
pub trait MatchRepository: Send + Sync {
    /// Replace score, factors, and `last_calculated` for the key, inserting an active record if
    /// none exists yet.
    fn upsert(
        &self,
        user_id: &UserId,
        mentor_id: &MentorId,
        match_factors: MatchFactors,
        compatibility_score: u8,
    ) -> Result<MatchRecord, RepositoryError>;
    fn fetch(
        &self,
        user_id: &UserId,
        mentor_id: &MentorId,
    ) -> Result<Option<MatchRecord>, RepositoryError>;
    /// Active records for the user ordered by score, highest first.
    fn top_for_user(&self, user_id: &UserId, limit: usize)
        -> Result<Vec<MatchRecord>, RepositoryError>;
    fn set_active(
        &self,
        user_id: &UserId,
        mentor_id: &MentorId,
        active: bool,
    ) -> Result<(), RepositoryError>;
    /// Soft-exclude every record for the mentor, returning how many were flipped.
    fn deactivate_mentor(&self, mentor_id: &MentorId) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("match record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view over the profile and mentor data owned by the rest of the platform.
pub trait MatchingDirectory: Send + Sync {
    fn user(&self, user_id: &UserId) -> Result<Option<UserAccount>, DirectoryError>;
    fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DirectoryError>;
    /// Every assessment on file for the user, in any order.
    fn assessments(&self, user_id: &UserId) -> Result<Vec<LearningAssessment>, DirectoryError>;
    fn career_goals(&self, user_id: &UserId) -> Result<Vec<CareerGoal>, DirectoryError>;
    fn user_ids(&self) -> Result<Vec<UserId>, DirectoryError>;
    fn active_mentors(&self) -> Result<Vec<Mentor>, DirectoryError>;
    fn mentor(&self, mentor_id: &MentorId) -> Result<Option<Mentor>, DirectoryError>;
}

/// Lookup failure raised by the directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
