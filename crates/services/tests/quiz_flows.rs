mod common;

use std::sync::Arc;

use career_core::model::{Blocked, FitLevel, QuizPhase, UserId};
use career_core::time::fixed_clock;
use serde_json::json;
use services::{
    DiscoverService, GENERIC_BACKEND_MESSAGE, GoalFitService, QuizFlowError, StepOutcome,
    UserSession, ValidationError,
};
use storage::repository::{DiscoverRepository, InMemoryRepository};

use common::{FakeBackend, backend_down, discover_reply};

const DISCOVERY_PICKS: [&str; 6] = [
    "public_visibility",
    "stable_peaceful",
    "strategist",
    "self_disappointment",
    "people_interaction",
    "long_term_study",
];

#[tokio::test]
async fn discovery_quiz_submits_once_and_saves_latest() {
    let backend = FakeBackend::replying(vec![Ok(discover_reply())]);
    let repo = InMemoryRepository::new();
    let service = DiscoverService::new(fixed_clock(), backend.clone(), Arc::new(repo.clone()));
    let user = UserSession::signed_in(UserId::new("u1"));

    let mut run = service.start().unwrap();
    for (step, value) in DISCOVERY_PICKS.iter().enumerate() {
        assert_eq!(
            service.choose(&mut run, value, &user).await.unwrap(),
            StepOutcome::Selected
        );
        if step == 4 {
            run.set_free_text("  Endless small talk  ");
        }
        let outcome = service.advance(&mut run, &user).await.unwrap();
        if step < 5 {
            assert_eq!(outcome, StepOutcome::Moved { step: step + 1 });
        } else {
            assert_eq!(outcome, StepOutcome::Completed);
        }
    }

    assert_eq!(run.session().phase(), QuizPhase::ResultsVisible);
    assert_eq!(run.session().cursor(), 5);
    let profile = run.result().unwrap();
    assert_eq!(
        profile.stream_names(),
        ["Engineering & Technology", "Design & Creative Arts"]
    );

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    let (endpoint, body) = &calls[0];
    assert_eq!(*endpoint, "generate-discover");
    assert_eq!(body["team_role"], "strategist");
    assert_eq!(body["energy_drain"], "Endless small talk");
    assert_eq!(
        body["custom_inputs"],
        json!({"energy_drain": "Endless small talk"})
    );

    // A finished run does not resubmit.
    assert!(matches!(
        service.advance(&mut run, &user).await,
        Err(QuizFlowError::Blocked(Blocked::Submitted))
    ));
    assert_eq!(backend.calls().len(), 1);

    let saved = repo
        .latest_discover(&UserId::new("u1"))
        .await
        .unwrap()
        .expect("saved");
    assert_eq!(saved.answers.len(), 6);
    assert_eq!(
        saved.result["suitable_career_streams"][0],
        json!({"name": "Engineering & Technology"})
    );
}

#[tokio::test]
async fn failed_submission_keeps_answers_and_allows_retry() {
    let backend = FakeBackend::replying(vec![Err(backend_down()), Ok(discover_reply())]);
    let service = DiscoverService::new(
        fixed_clock(),
        backend.clone(),
        Arc::new(InMemoryRepository::new()),
    );
    let user = UserSession::anonymous();

    let mut run = service.start().unwrap();
    for value in &DISCOVERY_PICKS[..5] {
        service.choose(&mut run, value, &user).await.unwrap();
        service.advance(&mut run, &user).await.unwrap();
    }
    service.choose(&mut run, DISCOVERY_PICKS[5], &user).await.unwrap();

    let err = service.advance(&mut run, &user).await.unwrap_err();
    assert!(matches!(err, QuizFlowError::Backend(_)));
    assert_eq!(run.error_message(), Some(GENERIC_BACKEND_MESSAGE));
    assert_eq!(run.session().phase(), QuizPhase::Answering);
    assert_eq!(run.session().cursor(), 5);
    assert_eq!(run.session().answer(0), Some("public_visibility"));
    assert!(run.result().is_none());

    assert_eq!(
        service.advance(&mut run, &user).await.unwrap(),
        StepOutcome::Completed
    );
    assert_eq!(run.error_message(), None);
    assert_eq!(backend.calls().len(), 2);
}

#[tokio::test]
async fn gate_blocks_advance_without_an_answer() {
    let backend = FakeBackend::replying(vec![]);
    let service = DiscoverService::new(
        fixed_clock(),
        backend.clone(),
        Arc::new(InMemoryRepository::new()),
    );
    let user = UserSession::anonymous();
    let mut run = service.start().unwrap();

    run.set_free_text("   ");
    assert!(matches!(
        service.advance(&mut run, &user).await,
        Err(QuizFlowError::Blocked(Blocked::NoAnswer))
    ));
    assert_eq!(run.session().cursor(), 0);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn anonymous_discovery_is_not_saved() {
    let repo = InMemoryRepository::new();
    let service = DiscoverService::new(
        fixed_clock(),
        FakeBackend::replying(vec![Ok(discover_reply())]),
        Arc::new(repo.clone()),
    );
    let user = UserSession::anonymous();

    let mut run = service.start().unwrap();
    for value in DISCOVERY_PICKS {
        service.choose(&mut run, value, &user).await.unwrap();
        service.advance(&mut run, &user).await.unwrap();
    }

    assert!(run.result().is_some());
    assert!(service.latest(&user).await.unwrap().is_none());
    assert!(
        repo.latest_discover(&UserId::new("u1"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn goal_fit_auto_advances_and_classifies() {
    let backend = FakeBackend::replying(vec![Ok(json!({
        "alignment_score": 64,
        "fit_level": "Conditional Fit",
        "core_analysis": "Good reader, nervous speaker.",
        "strengths": ["Deep reading"],
        "risk_factors": "Stage fright",
        "final_verdict": "Work on debating first."
    }))]);
    let service = GoalFitService::new(fixed_clock(), backend.clone());

    let mut run = service.start("law & public policy").unwrap();
    assert_eq!(run.subject(), "Law & Public Policy");

    let picks = [
        "not_confident",
        "enjoy_deep_reading",
        "prepare_stronger",
        "love_debate_and_justice",
    ];
    for (step, value) in picks.iter().enumerate() {
        let outcome = service.choose(&mut run, value).await.unwrap();
        if step < 3 {
            assert_eq!(outcome, StepOutcome::Moved { step: step + 1 });
        } else {
            assert_eq!(outcome, StepOutcome::Completed);
        }
    }

    let fit = run.result().unwrap();
    assert_eq!(fit.alignment_score, 64);
    assert_eq!(fit.fit_level, FitLevel::ConditionalFit);
    assert_eq!(fit.risk_factors, ["Stage fright"]);
    assert!(fit.improvement_advice.is_empty());

    let calls = backend.calls();
    assert_eq!(calls[0].0, "generate-stream-analysis");
    assert_eq!(calls[0].1["selected_stream"], "Law & Public Policy");
    assert_eq!(calls[0].1["answers"]["q2"], "enjoy_deep_reading");
}

#[tokio::test]
async fn unknown_goal_stream_is_a_validation_error() {
    let service = GoalFitService::new(fixed_clock(), FakeBackend::replying(vec![]));
    assert!(matches!(
        service.start("Astronomy"),
        Err(QuizFlowError::Validation(ValidationError::UnknownGoalStream(_)))
    ));
}

#[tokio::test]
async fn restart_clears_the_run() {
    let service = DiscoverService::new(
        fixed_clock(),
        FakeBackend::replying(vec![Ok(discover_reply())]),
        Arc::new(InMemoryRepository::new()),
    );
    let user = UserSession::anonymous();
    let mut run = service.start().unwrap();
    for value in DISCOVERY_PICKS {
        service.choose(&mut run, value, &user).await.unwrap();
        service.advance(&mut run, &user).await.unwrap();
    }

    run.restart();
    assert_eq!(run.session().phase(), QuizPhase::Answering);
    assert_eq!(run.session().cursor(), 0);
    assert_eq!(run.session().answer(0), None);
    assert!(run.result().is_none());
}
