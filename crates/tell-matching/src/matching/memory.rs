//! Process-local adapters for the match store and the matching directory.
//!
//! Used by the API binary, the CLI demo, and tests. Both adapters recover the guarded data after a
//! panicking writer since every mutation replaces whole values.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use super::domain::{
    CareerGoal, LearningAssessment, MatchFactors, Mentor, MentorId, UserAccount, UserId,
    UserProfile,
};
use super::repository::{
    DirectoryError, MatchRecord, MatchRepository, MatchingDirectory, RepositoryError,
};

/// Match store keyed by (user, mentor); the single lock makes each upsert atomic.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    records: Mutex<HashMap<(UserId, MentorId), MatchRecord>>,
}

impl InMemoryMatchStore {
    fn records(&self) -> MutexGuard<'_, HashMap<(UserId, MentorId), MatchRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Every record for the user regardless of `is_active`, highest score first.
    pub fn records_for_user(&self, user_id: &UserId) -> Vec<MatchRecord> {
        let mut records: Vec<MatchRecord> = self
            .records()
            .values()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect();
        sort_by_score(&mut records);
        records
    }
}

impl MatchRepository for InMemoryMatchStore {
    fn upsert(
        &self,
        user_id: &UserId,
        mentor_id: &MentorId,
        match_factors: MatchFactors,
        compatibility_score: u8,
    ) -> Result<MatchRecord, RepositoryError> {
        let now = Utc::now();
        let mut records = self.records();
        let record = records
            .entry((user_id.clone(), mentor_id.clone()))
            .and_modify(|existing| {
                existing.compatibility_score = compatibility_score;
                existing.match_factors = match_factors;
                existing.last_calculated = now;
            })
            .or_insert_with(|| MatchRecord {
                user_id: user_id.clone(),
                mentor_id: mentor_id.clone(),
                compatibility_score,
                match_factors,
                is_active: true,
                last_calculated: now,
            });
        Ok(record.clone())
    }

    fn fetch(
        &self,
        user_id: &UserId,
        mentor_id: &MentorId,
    ) -> Result<Option<MatchRecord>, RepositoryError> {
        Ok(self
            .records()
            .get(&(user_id.clone(), mentor_id.clone()))
            .cloned())
    }

    fn top_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, RepositoryError> {
        let mut records: Vec<MatchRecord> = self
            .records()
            .values()
            .filter(|record| &record.user_id == user_id && record.is_active)
            .cloned()
            .collect();
        sort_by_score(&mut records);
        records.truncate(limit);
        Ok(records)
    }

    fn set_active(
        &self,
        user_id: &UserId,
        mentor_id: &MentorId,
        active: bool,
    ) -> Result<(), RepositoryError> {
        match self
            .records()
            .get_mut(&(user_id.clone(), mentor_id.clone()))
        {
            Some(record) => {
                record.is_active = active;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn deactivate_mentor(&self, mentor_id: &MentorId) -> Result<usize, RepositoryError> {
        let mut flipped = 0;
        for record in self.records().values_mut() {
            if &record.mentor_id == mentor_id && record.is_active {
                record.is_active = false;
                flipped += 1;
            }
        }
        Ok(flipped)
    }
}

/// Highest score first; ties fall back to mentor id so rankings are stable.
pub(crate) fn sort_by_score(records: &mut [MatchRecord]) {
    records.sort_by(|a, b| {
        b.compatibility_score
            .cmp(&a.compatibility_score)
            .then_with(|| a.mentor_id.cmp(&b.mentor_id))
    });
}

#[derive(Debug, Default)]
struct DirectoryData {
    users: BTreeMap<UserId, UserAccount>,
    profiles: HashMap<UserId, UserProfile>,
    assessments: HashMap<UserId, Vec<LearningAssessment>>,
    career_goals: HashMap<UserId, Vec<CareerGoal>>,
    mentors: BTreeMap<MentorId, Mentor>,
}

/// Directory over in-process collections of users, profiles, and mentors.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    data: Mutex<DirectoryData>,
}

impl InMemoryDirectory {
    fn data(&self) -> MutexGuard<'_, DirectoryData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_user(&self, account: UserAccount) {
        self.data().users.insert(account.user_id.clone(), account);
    }

    pub fn insert_profile(&self, profile: UserProfile) {
        self.data().profiles.insert(profile.user_id.clone(), profile);
    }

    pub fn add_assessment(&self, assessment: LearningAssessment) {
        self.data()
            .assessments
            .entry(assessment.user_id.clone())
            .or_default()
            .push(assessment);
    }

    pub fn set_career_goals(&self, user_id: UserId, goals: Vec<CareerGoal>) {
        self.data().career_goals.insert(user_id, goals);
    }

    pub fn upsert_mentor(&self, mentor: Mentor) {
        self.data().mentors.insert(mentor.mentor_id.clone(), mentor);
    }

    /// Swap the whole roster, e.g. after a CSV import.
    pub fn replace_mentors(&self, mentors: Vec<Mentor>) {
        let mut data = self.data();
        data.mentors = mentors
            .into_iter()
            .map(|mentor| (mentor.mentor_id.clone(), mentor))
            .collect();
    }

    /// Returns `false` when the mentor is unknown.
    pub fn set_mentor_active(&self, mentor_id: &MentorId, active: bool) -> bool {
        match self.data().mentors.get_mut(mentor_id) {
            Some(mentor) => {
                mentor.is_active = active;
                true
            }
            None => false,
        }
    }

    pub fn mentor_count(&self) -> usize {
        self.data().mentors.len()
    }
}

impl MatchingDirectory for InMemoryDirectory {
    fn user(&self, user_id: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        Ok(self.data().users.get(user_id).cloned())
    }

    fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DirectoryError> {
        Ok(self.data().profiles.get(user_id).cloned())
    }

    fn assessments(&self, user_id: &UserId) -> Result<Vec<LearningAssessment>, DirectoryError> {
        Ok(self
            .data()
            .assessments
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn career_goals(&self, user_id: &UserId) -> Result<Vec<CareerGoal>, DirectoryError> {
        Ok(self
            .data()
            .career_goals
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn user_ids(&self) -> Result<Vec<UserId>, DirectoryError> {
        Ok(self.data().users.keys().cloned().collect())
    }

    fn active_mentors(&self) -> Result<Vec<Mentor>, DirectoryError> {
        Ok(self
            .data()
            .mentors
            .values()
            .filter(|mentor| mentor.is_active)
            .cloned()
            .collect())
    }

    fn mentor(&self, mentor_id: &MentorId) -> Result<Option<Mentor>, DirectoryError> {
        Ok(self.data().mentors.get(mentor_id).cloned())
    }
}
