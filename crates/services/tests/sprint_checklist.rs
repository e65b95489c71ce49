mod common;

use std::sync::Arc;
use std::time::Duration;

use career_core::model::{CompletionMap, DiscoverProfile, TaskId, UserId};
use career_core::normalize::Hydrate;
use career_core::time::{fixed_clock, fixed_now};
use services::{
    LoadState, PersistPolicy, RoadmapService, SprintError, SprintService, UserSession,
    ValidationError,
};
use storage::repository::{InMemoryRepository, SprintPlanRecord, SprintRepository};

use common::{
    BrokenProgress, DelayedWrites, FakeBackend, discover_reply, roadmap_reply, sprint_reply,
};

fn user() -> UserSession {
    UserSession::signed_in(UserId::new("u1"))
}

async fn seeded(repo: &InMemoryRepository) {
    let record = SprintPlanRecord {
        stream: "Engineering & Technology".into(),
        plan: career_core::normalize::normalize::<career_core::model::SprintPlan>(&sprint_reply()),
        created_at: fixed_now(),
    };
    repo.save_sprint_plan(&UserId::new("u1"), &record)
        .await
        .unwrap();
}

#[tokio::test]
async fn generated_sprint_is_stored_with_fresh_progress() {
    let backend = FakeBackend::replying(vec![Ok(sprint_reply())]);
    let repo = InMemoryRepository::new();
    let service = SprintService::new(fixed_clock(), backend.clone(), Arc::new(repo.clone()));
    let roadmap = career_core::model::Roadmap::hydrate(&roadmap_reply());

    let tracker = service
        .generate(&user(), "Engineering & Technology", &roadmap, "Calm planner")
        .await
        .unwrap();

    assert_eq!(tracker.state(), LoadState::Loaded);
    let view = tracker.view();
    assert_eq!((view.completed, view.total, view.percent), (0, 36, 0));

    let calls = backend.calls();
    assert_eq!(calls[0].1["roadmapPhase1Focus"], serde_json::json!(["Python", "Git"]));
    assert_eq!(calls[0].1["personalityProfile"], "Calm planner");

    let uid = UserId::new("u1");
    assert!(repo.latest_sprint_plan(&uid).await.unwrap().is_some());
    let progress = repo.get_progress(&uid).await.unwrap().unwrap();
    assert_eq!(progress.completed.len(), 36);
    assert_eq!(progress.completed.completed_count(), 0);
}

#[tokio::test]
async fn sprint_requires_stream_and_roadmap() {
    let backend = FakeBackend::replying(vec![]);
    let service = SprintService::new(
        fixed_clock(),
        backend.clone(),
        Arc::new(InMemoryRepository::new()),
    );
    let roadmap = career_core::model::Roadmap::hydrate(&roadmap_reply());

    assert!(matches!(
        service.generate(&user(), " ", &roadmap, "").await,
        Err(SprintError::Validation(ValidationError::NoStreamSelected))
    ));
    assert!(matches!(
        service
            .generate(&user(), "Law", &career_core::model::Roadmap::default(), "")
            .await,
        Err(SprintError::Validation(ValidationError::NoRoadmap))
    ));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn double_toggle_restores_state_and_ratio_tracks_memory() {
    let repo = InMemoryRepository::new();
    seeded(&repo).await;
    let service = SprintService::new(
        fixed_clock(),
        FakeBackend::replying(vec![]),
        Arc::new(repo.clone()),
    );

    let mut tracker = service.tracker(&user());
    tracker.load().await;
    let original = tracker.completed().clone();
    let id = TaskId::new("w4-t2");

    tracker.toggle(&id).unwrap().settled().await;
    assert_eq!(tracker.view().completed, 1);
    assert_eq!(tracker.view().percent, 3);

    tracker.toggle(&id).unwrap().settled().await;
    assert_eq!(tracker.completed(), &original);
    assert_eq!(tracker.view().percent, 0);

    let stored = repo.get_progress(&UserId::new("u1")).await.unwrap().unwrap();
    assert!(!stored.completed.is_done(&id));
}

#[tokio::test]
async fn two_quick_toggles_both_persist() {
    let repo = InMemoryRepository::new();
    seeded(&repo).await;
    let delayed = DelayedWrites::new(repo.clone(), vec![]);
    let service = SprintService::new(
        fixed_clock(),
        FakeBackend::replying(vec![]),
        Arc::new(delayed.clone()),
    );

    let mut tracker = service.tracker(&user());
    tracker.load().await;

    let first = tracker.toggle(&TaskId::new("w1-t1")).unwrap();
    let second = tracker.toggle(&TaskId::new("w1-t2")).unwrap();
    assert_eq!(tracker.view().completed, 2);

    first.settled().await;
    second.settled().await;
    assert_eq!(delayed.landed.lock().unwrap().len(), 2);
    assert!(!tracker.is_saving());
    assert_eq!(tracker.view().completed, 2);
}

#[tokio::test]
async fn last_write_wins_lets_a_stale_snapshot_land_last() {
    let repo = InMemoryRepository::new();
    seeded(&repo).await;
    let delayed = DelayedWrites::new(repo.clone(), vec![Duration::from_millis(80), Duration::ZERO]);
    let service = SprintService::new(
        fixed_clock(),
        FakeBackend::replying(vec![]),
        Arc::new(delayed.clone()),
    );

    let mut tracker = service.tracker(&user());
    tracker.load().await;
    let a = TaskId::new("w1-t1");
    let b = TaskId::new("w1-t2");

    let slow = tracker.toggle(&a).unwrap();
    let fast = tracker.toggle(&b).unwrap();
    fast.settled().await;
    slow.settled().await;

    // Memory reflects both flips regardless of write order.
    assert!(tracker.completed().is_done(&a) && tracker.completed().is_done(&b));

    let stored = repo.get_progress(&UserId::new("u1")).await.unwrap().unwrap();
    assert!(stored.completed.is_done(&a));
    assert!(!stored.completed.is_done(&b));
}

#[tokio::test]
async fn serialized_policy_lands_writes_in_toggle_order() {
    let repo = InMemoryRepository::new();
    seeded(&repo).await;
    let delayed = DelayedWrites::new(repo.clone(), vec![Duration::from_millis(80), Duration::ZERO]);
    let service = SprintService::new(
        fixed_clock(),
        FakeBackend::replying(vec![]),
        Arc::new(delayed.clone()),
    )
    .with_policy(PersistPolicy::Serialized);

    let mut tracker = service.tracker(&user());
    tracker.load().await;
    let a = TaskId::new("w1-t1");
    let b = TaskId::new("w1-t2");

    let first = tracker.toggle(&a).unwrap();
    let second = tracker.toggle(&b).unwrap();
    second.settled().await;
    first.settled().await;

    let stored = repo.get_progress(&UserId::new("u1")).await.unwrap().unwrap();
    assert!(stored.completed.is_done(&a));
    assert!(stored.completed.is_done(&b));

    let landed = delayed.landed.lock().unwrap();
    assert_eq!(landed.len(), 2);
    assert_eq!(landed[0].completed_count(), 1);
    assert_eq!(landed[1].completed_count(), 2);
}

#[tokio::test]
async fn persistence_failures_never_reach_the_user() {
    let repo = InMemoryRepository::new();
    seeded(&repo).await;
    let service = SprintService::new(
        fixed_clock(),
        FakeBackend::replying(vec![]),
        Arc::new(BrokenProgress(repo.clone())),
    );

    let mut tracker = service.tracker(&user());
    tracker.load().await;
    assert_eq!(tracker.state(), LoadState::LoadFailed);
    assert_eq!(tracker.completed().len(), 36);

    tracker
        .toggle(&TaskId::new("w2-t3"))
        .unwrap()
        .settled()
        .await;
    assert_eq!(tracker.view().completed, 1);
}

#[tokio::test]
async fn stored_progress_is_adopted_verbatim() {
    let repo = InMemoryRepository::new();
    seeded(&repo).await;
    let stored: CompletionMap = [(TaskId::new("w1-t1"), true), (TaskId::new("legacy"), true)]
        .into_iter()
        .collect();
    repo.replace_progress(&UserId::new("u1"), &stored, fixed_now())
        .await
        .unwrap();

    let service = SprintService::new(
        fixed_clock(),
        FakeBackend::replying(vec![]),
        Arc::new(repo),
    );
    let mut tracker = service.tracker(&user());
    tracker.load().await;

    assert_eq!(tracker.completed(), &stored);
    let view = tracker.view();
    assert_eq!(view.total, 36);
    assert_eq!(view.completed, 2);
}

#[tokio::test]
async fn roadmap_is_saved_only_for_signed_in_users() {
    let backend = FakeBackend::replying(vec![Ok(roadmap_reply()), Ok(roadmap_reply())]);
    let repo = InMemoryRepository::new();
    let service = RoadmapService::new(fixed_clock(), backend.clone(), Arc::new(repo.clone()));
    let profile = DiscoverProfile::hydrate(&discover_reply());

    let generated = service
        .generate(&user(), &profile, Some("design & creative arts"))
        .await
        .unwrap();
    assert_eq!(generated.stream, "Design & Creative Arts");
    assert!(generated.saved_id.is_some());
    assert_eq!(generated.roadmap.first_phase_focus(), ["Python", "Git"]);

    let anonymous = service
        .generate(&UserSession::anonymous(), &profile, Some("Engineering & Technology"))
        .await
        .unwrap();
    assert!(anonymous.saved_id.is_none());

    let recent = service.recent(&user(), 5).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].source, "discover");
    assert_eq!(recent[0].roadmap, generated.roadmap);

    let body = &backend.calls()[0].1;
    assert_eq!(body["selected_stream"], "Design & Creative Arts");
    assert!(body["goals"]
        .as_str()
        .unwrap()
        .starts_with("I want to pursue a career in Design & Creative Arts."));
}

#[tokio::test]
async fn roadmap_without_selection_makes_no_call() {
    let backend = FakeBackend::replying(vec![]);
    let service = RoadmapService::new(
        fixed_clock(),
        backend.clone(),
        Arc::new(InMemoryRepository::new()),
    );
    let profile = DiscoverProfile::hydrate(&discover_reply());

    assert!(matches!(
        service.generate(&user(), &profile, None).await,
        Err(services::RoadmapError::Validation(ValidationError::NoStreamSelected))
    ));
    assert!(backend.calls().is_empty());
}
