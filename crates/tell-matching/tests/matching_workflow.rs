//! Integration specifications for mentee-to-mentor matching.
//!
//! Scenarios drive the public service facade, batch coordinator, roster importer, and HTTP router
//! against the in-memory adapters, without reaching into private modules.

mod common {
    use std::collections::BTreeMap;
    use std::io::Cursor;
    use std::sync::Arc;

    use chrono::Utc;

    use tell_matching::config::MatchingConfig;
    use tell_matching::matching::{
        CareerFieldId, CareerGoal, CareerStage, InMemoryDirectory, InMemoryMatchStore,
        LearningAssessment, LearningStyle, MatchingService, MentorRosterImporter, Skill,
        SkillProficiency, UserAccount, UserId, UserProfile,
    };

    pub(super) type Service = MatchingService<InMemoryDirectory, InMemoryMatchStore>;

    pub(super) const ROSTER: &str = "\
Mentor ID,Name,Headline,Career Fields,Experience Level,Skills,Visual,Auditory,Reading,Kinesthetic,Active
m-ana,Ana Lima,Platform engineer,software,Advanced,Rust;Kubernetes;Go,9,4,6,5,yes
m-ben,Ben Cole,Data lead,data;software,Expert,Python;SQL,5,5,9,3,true
m-cai,Cai Ito,Design manager,design,Advanced,Figma;Research,,,,,
m-dev,Dev Rao,Retired architect,software,Expert,Rust,,,,,no
";

    pub(super) fn user_id(raw: &str) -> UserId {
        UserId(raw.to_string())
    }

    fn skill(name: &str) -> Skill {
        Skill {
            name: name.to_string(),
            proficiency: SkillProficiency::Intermediate,
        }
    }

    fn enrol(
        directory: &InMemoryDirectory,
        id: &str,
        field: &str,
        stage: CareerStage,
        skills: &[&str],
    ) {
        directory.insert_user(UserAccount {
            user_id: user_id(id),
            name: id.to_uppercase(),
        });
        directory.insert_profile(UserProfile {
            user_id: user_id(id),
            career_field: Some(CareerFieldId(field.to_string())),
            career_stage: Some(stage),
            skills: skills.iter().map(|name| skill(name)).collect(),
        });
    }

    /// Roster imported from CSV plus three mentees; `u-jo` prefers visual learning.
    pub(super) fn directory() -> Arc<InMemoryDirectory> {
        let mentors =
            MentorRosterImporter::from_reader(Cursor::new(ROSTER)).expect("roster imports");
        let directory = InMemoryDirectory::default();
        directory.replace_mentors(mentors);

        enrol(&directory, "u-jo", "software", CareerStage::EarlyCareer, &["rust", "GO"]);
        directory.add_assessment(LearningAssessment {
            user_id: user_id("u-jo"),
            results: BTreeMap::from([
                (LearningStyle::Visual, 90.0),
                (LearningStyle::Auditory, 10.0),
                (LearningStyle::Reading, 20.0),
                (LearningStyle::Kinesthetic, 10.0),
            ]),
            is_active: true,
            created_at: Utc::now(),
        });
        directory.set_career_goals(
            user_id("u-jo"),
            vec![CareerGoal {
                title: "Own a production cluster".to_string(),
                related_skills: vec!["Kubernetes".to_string(), "Terraform".to_string()],
                target_date: None,
            }],
        );

        enrol(&directory, "u-kai", "data", CareerStage::Student, &["SQL"]);
        enrol(&directory, "u-lu", "design", CareerStage::MidCareer, &["Figma"]);

        Arc::new(directory)
    }

    pub(super) fn build_service() -> (Arc<Service>, Arc<InMemoryMatchStore>) {
        let store = Arc::new(InMemoryMatchStore::default());
        let service = Arc::new(MatchingService::new(
            directory(),
            store.clone(),
            &MatchingConfig::default(),
        ));
        (service, store)
    }
}

mod ranking {
    use super::common::{build_service, user_id};
    use tell_matching::matching::{MatchRepository, MentorId};

    #[test]
    fn imported_roster_drives_single_user_ranking() {
        let (service, store) = build_service();

        let scores = service
            .calculate_matching(&user_id("u-jo"))
            .expect("matching succeeds");

        // m-dev is inactive in the roster
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].mentor_id, MentorId("m-ana".to_string()));
        assert_eq!(scores[0].match_factors.skills_match, 100.0);
        assert_eq!(scores[0].match_factors.career_goals_match, 50.0);
        assert!(scores
            .windows(2)
            .all(|pair| pair[0].compatibility_score >= pair[1].compatibility_score));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn top_matches_only_return_active_records() {
        let (service, store) = build_service();
        let user = user_id("u-kai");
        service.calculate_matching(&user).expect("matching");

        let best = service.top_matches(&user, Some(1)).expect("top");
        assert_eq!(best.len(), 1);
        let best_mentor = best[0].record.mentor_id.clone();

        store
            .set_active(&user, &best_mentor, false)
            .expect("deactivate");
        let remaining = service.top_matches(&user, Some(3)).expect("top");

        assert_eq!(remaining.len(), 2);
        assert!(remaining
            .iter()
            .all(|entry| entry.record.mentor_id != best_mentor && entry.record.is_active));
        assert!(remaining.iter().all(|entry| entry.mentor.is_some()));
    }
}

mod batch {
    use super::common::{build_service, user_id};
    use tell_matching::matching::{BatchCoordinator, BatchJobStatus};

    #[tokio::test]
    async fn batch_recomputes_every_mentee() {
        let (service, store) = build_service();
        let batches = BatchCoordinator::new(service, 2);

        let ticket = batches.start(None).expect("batch accepted");
        assert_eq!(ticket.total_users, 3);

        let snapshot = batches.wait(&ticket.job_id).await.expect("known job");
        assert_eq!(snapshot.status, BatchJobStatus::Completed);
        assert_eq!(snapshot.processed, 3);
        assert_eq!(snapshot.failed, 0);
        assert_eq!(store.len(), 9);
        assert_eq!(store.records_for_user(&user_id("u-lu")).len(), 3);
    }
}

mod routing {
    use super::common::build_service;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tell_matching::matching::{matching_router, BatchCoordinator};
    use tower::ServiceExt;

    async fn json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    fn build_router() -> axum::Router {
        let (service, _store) = build_service();
        let batches = BatchCoordinator::new(service.clone(), 2);
        matching_router(service, batches)
    }

    #[tokio::test]
    async fn calculate_then_read_top_matches() {
        let router = build_router();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/matching/users/u-lu/calculate")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/matching/users/u-lu/top")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);

        let payload = json(response).await;
        let matches = payload["matches"].as_array().expect("matches array");
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0]["mentor_id"], "m-cai");
        assert_eq!(matches[0]["mentor"]["headline"], "Design manager");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let response = build_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/matching/users/u-missing/calculate")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
