use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{UserContext, UserId};
use super::repository::{
    DirectoryError, MatchRepository, MatchingDirectory, RepositoryError, TopMatchView,
};
use super::scoring::{MatchScore, MatchingEngine};
use crate::config::MatchingConfig;

/// Service composing the directory, match store, and scoring engine.
pub struct MatchingService<D, R> {
    directory: Arc<D>,
    repository: Arc<R>,
    engine: MatchingEngine,
    default_top_limit: usize,
}

impl<D, R> MatchingService<D, R>
where
    D: MatchingDirectory + 'static,
    R: MatchRepository + 'static,
{
    pub fn new(directory: Arc<D>, repository: Arc<R>, config: &MatchingConfig) -> Self {
        Self {
            directory,
            repository,
            engine: MatchingEngine::new(config.weights),
            default_top_limit: config.default_top_limit.max(1),
        }
    }

    pub fn directory(&self) -> &Arc<D> {
        &self.directory
    }

    pub fn default_top_limit(&self) -> usize {
        self.default_top_limit
    }

    /// Assemble the scoring context; missing assessments or goals degrade to neutral scores.
    pub fn load_context(&self, user_id: &UserId) -> Result<UserContext, MatchingError> {
        self.directory
            .user(user_id)?
            .ok_or_else(|| MatchingError::UserNotFound(user_id.clone()))?;
        let profile = self
            .directory
            .profile(user_id)?
            .ok_or_else(|| MatchingError::ProfileNotFound(user_id.clone()))?;

        let assessments = self.directory.assessments(user_id)?;
        let career_goals = self.directory.career_goals(user_id)?;

        Ok(UserContext::assemble(profile, assessments, career_goals))
    }

    /// Score the user against every active mentor, persist each result, and return the ranking.
    pub fn calculate_matching(&self, user_id: &UserId) -> Result<Vec<MatchScore>, MatchingError> {
        let context = self.load_context(user_id)?;
        let mentors = self.directory.active_mentors()?;

        let mut scores = Vec::with_capacity(mentors.len());
        for mentor in mentors.iter().filter(|mentor| mentor.is_active) {
            let score = self.engine.score(&context, mentor);
            self.repository.upsert(
                user_id,
                &score.mentor_id,
                score.match_factors,
                score.compatibility_score,
            )?;
            debug!(
                user = %user_id,
                mentor = %score.mentor_id,
                score = score.compatibility_score,
                "scored mentor"
            );
            scores.push(score);
        }

        scores.sort_by(|a, b| {
            b.compatibility_score
                .cmp(&a.compatibility_score)
                .then_with(|| a.mentor_id.cmp(&b.mentor_id))
        });

        info!(user = %user_id, mentors = scores.len(), "matching calculated");
        Ok(scores)
    }

    /// Read persisted active matches, best first, with mentor display fields attached.
    pub fn top_matches(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<TopMatchView>, MatchingError> {
        let limit = limit.unwrap_or(self.default_top_limit);
        let records = self.repository.top_for_user(user_id, limit)?;

        records
            .into_iter()
            .map(|record| -> Result<TopMatchView, MatchingError> {
                let mentor = self
                    .directory
                    .mentor(&record.mentor_id)?
                    .map(|mentor| mentor.summary());
                Ok(record.with_mentor(mentor))
            })
            .collect()
    }
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("profile for user {0} not found")]
    ProfileNotFound(UserId),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl MatchingError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MatchingError::UserNotFound(_) | MatchingError::ProfileNotFound(_)
        )
    }
}
