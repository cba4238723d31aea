use chrono::{Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tell_matching::matching::{
    CareerFieldId, CareerGoal, CareerStage, ExperienceLevel, InMemoryDirectory,
    LearningAssessment, LearningStyle, Mentor, MentorId, Skill, SkillProficiency, UserAccount,
    UserId, UserProfile,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Directory seeded with the demo mentees and, unless a roster is supplied, the demo mentors.
pub(crate) fn seed_demo_directory(roster: Option<Vec<Mentor>>) -> InMemoryDirectory {
    let directory = InMemoryDirectory::default();
    directory.replace_mentors(roster.unwrap_or_else(demo_mentors));

    for mentee in demo_mentees() {
        let user_id = UserId(mentee.id.to_string());
        directory.insert_user(UserAccount {
            user_id: user_id.clone(),
            name: mentee.name.to_string(),
        });
        directory.insert_profile(UserProfile {
            user_id: user_id.clone(),
            career_field: Some(CareerFieldId(mentee.field.to_string())),
            career_stage: Some(mentee.stage),
            skills: mentee
                .skills
                .iter()
                .map(|(name, proficiency)| Skill {
                    name: name.to_string(),
                    proficiency: *proficiency,
                })
                .collect(),
        });
        if let Some(results) = mentee.assessment {
            directory.add_assessment(LearningAssessment {
                user_id: user_id.clone(),
                results: styles(results),
                is_active: true,
                created_at: Utc::now() - Duration::days(7),
            });
        }
        directory.set_career_goals(
            user_id,
            mentee
                .goals
                .iter()
                .map(|(title, related)| CareerGoal {
                    title: title.to_string(),
                    related_skills: related.iter().map(|skill| skill.to_string()).collect(),
                    target_date: None,
                })
                .collect(),
        );
    }

    directory
}

pub(crate) fn demo_mentors() -> Vec<Mentor> {
    vec![
        mentor(
            "m-ines",
            "Ines Duarte",
            "Staff backend engineer",
            &["software", "data"],
            Some(ExperienceLevel::Expert),
            &["Rust", "Go", "PostgreSQL", "Kubernetes"],
            Some([6, 8, 9, 5]),
            true,
        ),
        mentor(
            "m-kofi",
            "Kofi Mensah",
            "Product design lead",
            &["design"],
            Some(ExperienceLevel::Advanced),
            &["Figma", "User Research", "Prototyping"],
            Some([10, 4, 5, 8]),
            true,
        ),
        mentor(
            "m-lena",
            "Lena Park",
            "Data science manager",
            &["data"],
            Some(ExperienceLevel::Advanced),
            &["Python", "SQL", "Statistics", "Machine Learning"],
            Some([7, 5, 9, 4]),
            true,
        ),
        mentor(
            "m-raj",
            "Raj Patel",
            "Frontend engineer",
            &["software"],
            Some(ExperienceLevel::Intermediate),
            &["TypeScript", "React", "CSS"],
            None,
            true,
        ),
        mentor(
            "m-sol",
            "Sol Rivera",
            "Engineering director (on leave)",
            &["software"],
            Some(ExperienceLevel::Expert),
            &["Rust", "Leadership"],
            None,
            false,
        ),
    ]
}

struct DemoMentee {
    id: &'static str,
    name: &'static str,
    field: &'static str,
    stage: CareerStage,
    skills: &'static [(&'static str, SkillProficiency)],
    goals: &'static [(&'static str, &'static [&'static str])],
    assessment: Option<[f32; 4]>,
}

fn demo_mentees() -> [DemoMentee; 4] {
    [
        DemoMentee {
            id: "u-amara",
            name: "Amara Obi",
            field: "software",
            stage: CareerStage::Student,
            skills: &[
                ("Python", SkillProficiency::Intermediate),
                ("SQL", SkillProficiency::Beginner),
            ],
            goals: &[("Backend internship", &["Rust", "PostgreSQL", "Go"])],
            assessment: Some([30.0, 20.0, 80.0, 40.0]),
        },
        DemoMentee {
            id: "u-bao",
            name: "Bao Tran",
            field: "design",
            stage: CareerStage::EarlyCareer,
            skills: &[
                ("Figma", SkillProficiency::Advanced),
                ("Sketching", SkillProficiency::Intermediate),
            ],
            goals: &[("Lead a design sprint", &["User Research", "Prototyping"])],
            assessment: Some([90.0, 10.0, 30.0, 70.0]),
        },
        DemoMentee {
            id: "u-chen",
            name: "Chen Wei",
            field: "data",
            stage: CareerStage::MidCareer,
            skills: &[
                ("Python", SkillProficiency::Expert),
                ("Statistics", SkillProficiency::Advanced),
            ],
            goals: &[],
            assessment: Some([50.0, 40.0, 90.0, 20.0]),
        },
        DemoMentee {
            id: "u-dara",
            name: "Dara Kelly",
            field: "software",
            stage: CareerStage::Senior,
            skills: &[
                ("Rust", SkillProficiency::Expert),
                ("Kubernetes", SkillProficiency::Advanced),
            ],
            goals: &[("Move into platform leadership", &["Leadership", "Kubernetes"])],
            assessment: None,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn mentor(
    id: &str,
    name: &str,
    headline: &str,
    fields: &[&str],
    experience_level: Option<ExperienceLevel>,
    skills: &[&str],
    affinities: Option<[u8; 4]>,
    is_active: bool,
) -> Mentor {
    Mentor {
        mentor_id: MentorId(id.to_string()),
        name: name.to_string(),
        headline: headline.to_string(),
        career_fields: fields
            .iter()
            .map(|field| CareerFieldId(field.to_string()))
            .collect(),
        experience_level,
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        learning_style_compatibility: affinities
            .map(|values| LearningStyle::ordered().into_iter().zip(values).collect()),
        is_active,
    }
}

fn styles(values: [f32; 4]) -> BTreeMap<LearningStyle, f32> {
    LearningStyle::ordered().into_iter().zip(values).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tell_matching::matching::MatchingDirectory;

    #[test]
    fn demo_directory_holds_every_mentee_and_active_mentor() {
        let directory = seed_demo_directory(None);

        let users = directory.user_ids().expect("user ids");
        assert_eq!(users.len(), 4);
        assert_eq!(directory.mentor_count(), 5);
        assert_eq!(directory.active_mentors().expect("mentors").len(), 4);

        let amara = UserId("u-amara".to_string());
        assert!(directory.profile(&amara).expect("profile").is_some());
        assert_eq!(directory.assessments(&amara).expect("assessments").len(), 1);
        assert_eq!(directory.career_goals(&amara).expect("goals").len(), 1);
    }

    #[test]
    fn supplied_roster_replaces_demo_mentors() {
        let roster = vec![mentor(
            "m-only",
            "Only Mentor",
            "",
            &[],
            None,
            &[],
            None,
            true,
        )];
        let directory = seed_demo_directory(Some(roster));

        assert_eq!(directory.mentor_count(), 1);
        assert!(directory
            .mentor(&MentorId("m-ines".to_string()))
            .expect("lookup")
            .is_none());
    }
}
