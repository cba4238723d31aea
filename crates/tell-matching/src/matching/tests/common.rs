use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::config::MatchingConfig;
use crate::matching::domain::{
    CareerFieldId, CareerGoal, CareerStage, ExperienceLevel, LearningAssessment, LearningStyle,
    MatchFactors, Mentor, MentorId, Skill, SkillProficiency, UserAccount, UserContext, UserId,
    UserProfile,
};
use crate::matching::repository::{
    DirectoryError, MatchRecord, MatchRepository, MatchingDirectory, RepositoryError,
};
use crate::matching::{
    matching_router, BatchCoordinator, InMemoryDirectory, InMemoryMatchStore, MatchingService,
};

pub(super) type MemoryService = MatchingService<InMemoryDirectory, InMemoryMatchStore>;

pub(super) fn user_id(raw: &str) -> UserId {
    UserId(raw.to_string())
}

pub(super) fn mentor_id(raw: &str) -> MentorId {
    MentorId(raw.to_string())
}

pub(super) fn skill(name: &str) -> Skill {
    Skill {
        name: name.to_string(),
        proficiency: SkillProficiency::Intermediate,
    }
}

pub(super) fn empty_context() -> UserContext {
    UserContext {
        user_id: user_id("u-empty"),
        career_field: None,
        career_stage: None,
        skills: Vec::new(),
        career_goals: Vec::new(),
        learning_styles: None,
    }
}

pub(super) fn context(
    field: Option<&str>,
    stage: Option<CareerStage>,
    skills: &[&str],
) -> UserContext {
    UserContext {
        user_id: user_id("u-ctx"),
        career_field: field.map(|value| CareerFieldId(value.to_string())),
        career_stage: stage,
        skills: skills.iter().map(|name| skill(name)).collect(),
        career_goals: Vec::new(),
        learning_styles: None,
    }
}

pub(super) fn goal(title: &str, related: &[&str]) -> CareerGoal {
    CareerGoal {
        title: title.to_string(),
        related_skills: related.iter().map(|name| name.to_string()).collect(),
        target_date: None,
    }
}

pub(super) fn bare_mentor(id: &str) -> Mentor {
    Mentor {
        mentor_id: mentor_id(id),
        name: format!("Mentor {id}"),
        headline: "Mentor".to_string(),
        career_fields: BTreeSet::new(),
        experience_level: None,
        skills: Vec::new(),
        learning_style_compatibility: None,
        is_active: true,
    }
}

pub(super) fn mentor(
    id: &str,
    fields: &[&str],
    level: Option<ExperienceLevel>,
    skills: &[&str],
) -> Mentor {
    Mentor {
        career_fields: fields
            .iter()
            .map(|field| CareerFieldId(field.to_string()))
            .collect(),
        experience_level: level,
        skills: skills.iter().map(|name| name.to_string()).collect(),
        ..bare_mentor(id)
    }
}

pub(super) fn styles(values: [(LearningStyle, f32); 4]) -> BTreeMap<LearningStyle, f32> {
    values.into_iter().collect()
}

pub(super) fn factors(value: f32) -> MatchFactors {
    MatchFactors {
        career_field_match: value,
        experience_level_match: value,
        learning_style_match: value,
        skills_match: value,
        career_goals_match: value,
    }
}

pub(super) fn account(id: &str) -> UserAccount {
    UserAccount {
        user_id: user_id(id),
        name: format!("User {id}"),
    }
}

pub(super) fn profile(id: &str, field: &str, stage: CareerStage, skills: &[&str]) -> UserProfile {
    UserProfile {
        user_id: user_id(id),
        career_field: Some(CareerFieldId(field.to_string())),
        career_stage: Some(stage),
        skills: skills.iter().map(|name| skill(name)).collect(),
    }
}

pub(super) fn assessment(id: &str, visual: f32, day: u32, active: bool) -> LearningAssessment {
    LearningAssessment {
        user_id: user_id(id),
        results: styles([
            (LearningStyle::Visual, visual),
            (LearningStyle::Auditory, 0.0),
            (LearningStyle::Reading, 0.0),
            (LearningStyle::Kinesthetic, 0.0),
        ]),
        is_active: active,
        created_at: Utc
            .with_ymd_and_hms(2025, 6, day, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

/// Three mentors (one inactive) and two fully profiled users plus one without a profile.
pub(super) fn seeded_directory() -> Arc<InMemoryDirectory> {
    let directory = Arc::new(InMemoryDirectory::default());

    directory.upsert_mentor(mentor(
        "m-ada",
        &["software"],
        Some(ExperienceLevel::Intermediate),
        &["rust", "python", "sql"],
    ));
    directory.upsert_mentor(mentor(
        "m-bo",
        &["design"],
        Some(ExperienceLevel::Expert),
        &["figma"],
    ));
    let mut retired = mentor(
        "m-cy",
        &["software"],
        Some(ExperienceLevel::Advanced),
        &["rust"],
    );
    retired.is_active = false;
    directory.upsert_mentor(retired);

    directory.insert_user(account("u-1"));
    directory.insert_profile(profile(
        "u-1",
        "software",
        CareerStage::Student,
        &["Python", "Rust"],
    ));
    directory.set_career_goals(user_id("u-1"), vec![goal("Ship a service", &["SQL", "Go"])]);

    directory.insert_user(account("u-2"));
    directory.insert_profile(profile("u-2", "design", CareerStage::Senior, &["Figma"]));

    directory.insert_user(account("u-no-profile"));

    directory
}

pub(super) fn build_service(
    directory: Arc<InMemoryDirectory>,
) -> (Arc<MemoryService>, Arc<InMemoryMatchStore>) {
    let store = Arc::new(InMemoryMatchStore::default());
    let service = Arc::new(MatchingService::new(
        directory,
        store.clone(),
        &MatchingConfig::default(),
    ));
    (service, store)
}

pub(super) fn router_for(service: Arc<MemoryService>) -> axum::Router {
    let batches = BatchCoordinator::new(service.clone(), 2);
    matching_router(service, batches)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Delegates to an in-memory directory but fails profile lookups for chosen users.
pub(super) struct FlakyDirectory {
    pub(super) inner: InMemoryDirectory,
    pub(super) broken_profiles: BTreeSet<UserId>,
}

impl MatchingDirectory for FlakyDirectory {
    fn user(&self, user_id: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        self.inner.user(user_id)
    }

    fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DirectoryError> {
        if self.broken_profiles.contains(user_id) {
            return Err(DirectoryError::Unavailable(format!(
                "profile shard for {user_id} offline"
            )));
        }
        self.inner.profile(user_id)
    }

    fn assessments(&self, user_id: &UserId) -> Result<Vec<LearningAssessment>, DirectoryError> {
        self.inner.assessments(user_id)
    }

    fn career_goals(&self, user_id: &UserId) -> Result<Vec<CareerGoal>, DirectoryError> {
        self.inner.career_goals(user_id)
    }

    fn user_ids(&self) -> Result<Vec<UserId>, DirectoryError> {
        self.inner.user_ids()
    }

    fn active_mentors(&self) -> Result<Vec<Mentor>, DirectoryError> {
        self.inner.active_mentors()
    }

    fn mentor(&self, mentor_id: &MentorId) -> Result<Option<Mentor>, DirectoryError> {
        self.inner.mentor(mentor_id)
    }
}

pub(super) struct UnavailableDirectory;

impl MatchingDirectory for UnavailableDirectory {
    fn user(&self, _user_id: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn profile(&self, _user_id: &UserId) -> Result<Option<UserProfile>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn assessments(&self, _user_id: &UserId) -> Result<Vec<LearningAssessment>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn career_goals(&self, _user_id: &UserId) -> Result<Vec<CareerGoal>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn user_ids(&self) -> Result<Vec<UserId>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn active_mentors(&self) -> Result<Vec<Mentor>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn mentor(&self, _mentor_id: &MentorId) -> Result<Option<Mentor>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl MatchRepository for UnavailableStore {
    fn upsert(
        &self,
        _user_id: &UserId,
        _mentor_id: &MentorId,
        _match_factors: MatchFactors,
        _compatibility_score: u8,
    ) -> Result<MatchRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _user_id: &UserId,
        _mentor_id: &MentorId,
    ) -> Result<Option<MatchRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn top_for_user(
        &self,
        _user_id: &UserId,
        _limit: usize,
    ) -> Result<Vec<MatchRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_active(
        &self,
        _user_id: &UserId,
        _mentor_id: &MentorId,
        _active: bool,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn deactivate_mentor(&self, _mentor_id: &MentorId) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
