use std::collections::{BTreeMap, HashSet};

use super::super::domain::{CareerGoal, LearningStyle, Mentor, Skill, UserContext};

/// Score used whenever a factor's input is missing.
pub const NEUTRAL_SCORE: f32 = 50.0;

const FIELD_MATCH: f32 = 100.0;
const FIELD_MISMATCH: f32 = 30.0;

const LEVEL_IDEAL: f32 = 100.0;
const LEVEL_PEER: f32 = 70.0;
const LEVEL_TOO_SENIOR: f32 = 50.0;
const LEVEL_JUNIOR: f32 = 30.0;

const UNKNOWN_MENTOR_LEVEL: i8 = 4;
const DEFAULT_STYLE_AFFINITY: u8 = 5;

pub fn career_field_match(user: &UserContext, mentor: &Mentor) -> f32 {
    match &user.career_field {
        Some(field) if !mentor.career_fields.is_empty() => {
            if mentor.career_fields.contains(field) {
                FIELD_MATCH
            } else {
                FIELD_MISMATCH
            }
        }
        _ => NEUTRAL_SCORE,
    }
}

/// Rewards mentors one or two levels ahead of the mentee over peers, distant seniors, and juniors.
pub fn experience_level_match(user: &UserContext, mentor: &Mentor) -> f32 {
    let Some(stage) = user.career_stage else {
        return NEUTRAL_SCORE;
    };

    let mentor_level = mentor
        .experience_level
        .map(|level| level.level())
        .unwrap_or(UNKNOWN_MENTOR_LEVEL);

    match mentor_level - stage.level() {
        1 | 2 => LEVEL_IDEAL,
        0 => LEVEL_PEER,
        diff if diff > 2 => LEVEL_TOO_SENIOR,
        _ => LEVEL_JUNIOR,
    }
}

/// Mentor affinity per style, weighted by how strongly the mentee exhibits that style.
pub fn learning_style_match(
    learning_styles: Option<&BTreeMap<LearningStyle, f32>>,
    mentor: &Mentor,
) -> f32 {
    let (Some(results), Some(compatibility)) =
        (learning_styles, mentor.learning_style_compatibility.as_ref())
    else {
        return NEUTRAL_SCORE;
    };

    let mut total_contribution = 0.0_f32;
    let mut total_weight = 0.0_f32;

    for style in LearningStyle::ordered() {
        let weight = results.get(&style).copied().unwrap_or(0.0).clamp(0.0, 100.0) / 100.0;
        let affinity = compatibility
            .get(&style)
            .copied()
            .unwrap_or(DEFAULT_STYLE_AFFINITY)
            .clamp(1, 10);

        total_contribution += (f32::from(affinity) / 10.0 * 100.0) * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        total_contribution / total_weight
    } else {
        0.0
    }
}

pub fn skills_match(skills: &[Skill], mentor: &Mentor) -> f32 {
    coverage_score(skills.iter().map(|skill| skill.name.as_str()), mentor)
}

/// Coverage of every goal's related skills, deduplicated across goals.
pub fn career_goals_match(goals: &[CareerGoal], mentor: &Mentor) -> f32 {
    if goals.is_empty() {
        return NEUTRAL_SCORE;
    }

    let mut seen = HashSet::new();
    let related: Vec<&str> = goals
        .iter()
        .flat_map(|goal| goal.related_skills.iter())
        .map(|skill| skill.trim())
        .filter(|skill| seen.insert(skill.to_lowercase()))
        .collect();

    coverage_score(related.into_iter(), mentor)
}

fn coverage_score<'a, I>(wanted: I, mentor: &Mentor) -> f32
where
    I: Iterator<Item = &'a str>,
{
    let wanted: Vec<String> = wanted
        .map(|skill| skill.trim().to_lowercase())
        .filter(|skill| !skill.is_empty())
        .collect();
    let offered: HashSet<String> = mentor
        .skills
        .iter()
        .map(|skill| skill.trim().to_lowercase())
        .filter(|skill| !skill.is_empty())
        .collect();

    if wanted.is_empty() || offered.is_empty() {
        return NEUTRAL_SCORE;
    }

    let covered = wanted.iter().filter(|skill| offered.contains(*skill)).count();
    (covered as f32 / wanted.len() as f32 * 100.0).round()
}
