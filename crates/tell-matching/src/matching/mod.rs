//! Mentee-to-mentor compatibility scoring, persistence, and ranking.

pub mod batch;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod roster;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use batch::{
    BatchCoordinator, BatchError, BatchFailure, BatchJobId, BatchJobSnapshot, BatchJobStatus,
    BatchTicket,
};
pub use domain::{
    CareerFieldId, CareerGoal, CareerStage, ExperienceLevel, LearningAssessment, LearningStyle,
    MatchFactors, Mentor, MentorId, MentorSummary, Skill, SkillProficiency, UserAccount,
    UserContext, UserId, UserProfile,
};
pub use memory::{InMemoryDirectory, InMemoryMatchStore};
pub use repository::{
    DirectoryError, MatchRecord, MatchRepository, MatchingDirectory, RepositoryError, TopMatchView,
};
pub use roster::{MentorRosterImportError, MentorRosterImporter};
pub use router::matching_router;
pub use scoring::{FactorWeights, MatchScore, MatchingEngine, WeightsError, NEUTRAL_SCORE};
pub use service::{MatchingError, MatchingService};
