use std::sync::Arc;

use tracing::{info, warn};

use career_core::Clock;
use career_core::model::{CompletionMap, Roadmap, SprintPlan, UserId};
use career_core::normalize::Hydrate;
use storage::repository::{SprintPlanRecord, SprintRepository};

use crate::ai::{GuidanceBackend, SprintRequest};
use crate::checklist::{ChecklistTracker, PersistPolicy};
use crate::error::{SprintError, ValidationError};
use crate::user_session::UserSession;

/// Generates 12-week sprint plans and hands out checklist trackers.
#[derive(Clone)]
pub struct SprintService {
    clock: Clock,
    policy: PersistPolicy,
    backend: Arc<dyn GuidanceBackend>,
    sprints: Arc<dyn SprintRepository>,
}

impl SprintService {
    #[must_use]
    pub fn new(
        clock: Clock,
        backend: Arc<dyn GuidanceBackend>,
        sprints: Arc<dyn SprintRepository>,
    ) -> Self {
        Self {
            clock,
            policy: PersistPolicy::default(),
            backend,
            sprints,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: PersistPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// An unloaded tracker for the user's stored sprint.
    #[must_use]
    pub fn tracker(&self, user: &UserSession) -> ChecklistTracker {
        ChecklistTracker::new(
            self.clock,
            self.policy,
            Arc::clone(&self.sprints),
            user.user_id().cloned(),
        )
    }

    /// Generate a sprint from the first phase of `roadmap`.
    ///
    /// Signed-in users get the plan stored along with a fresh, all-unchecked
    /// progress map. Save failures are logged only.
    ///
    /// # Errors
    ///
    /// Returns `SprintError::Validation` before any call when no stream is
    /// given or the roadmap is empty, `SprintError::Backend` when the call
    /// fails, and `SprintError::Plan` when the backend's plan has no tasks.
    pub async fn generate(
        &self,
        user: &UserSession,
        stream: &str,
        roadmap: &Roadmap,
        personality_profile: &str,
    ) -> Result<ChecklistTracker, SprintError> {
        let stream = stream.trim();
        if stream.is_empty() {
            return Err(ValidationError::NoStreamSelected.into());
        }
        if roadmap.is_empty() {
            return Err(ValidationError::NoRoadmap.into());
        }

        let request = SprintRequest {
            selected_stream: stream.to_string(),
            roadmap_phase1_focus: roadmap.first_phase_focus().to_vec(),
            personality_profile: personality_profile.to_string(),
        };
        info!(%stream, "generating sprint plan");
        let raw = self.backend.generate_sprint(&request).await?;
        let plan = SprintPlan::hydrate(&raw);
        plan.validate()?;

        let completed = CompletionMap::for_plan(&plan);
        if let Some(user_id) = user.user_id() {
            self.save(user_id, stream, &plan, &completed).await;
        }

        Ok(self.tracker(user).with_plan(plan, completed))
    }

    async fn save(
        &self,
        user_id: &UserId,
        stream: &str,
        plan: &SprintPlan,
        completed: &CompletionMap,
    ) {
        let plan = match serde_json::to_value(plan) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(error = %err, "sprint save skipped");
                return;
            }
        };
        let now = self.clock.now();
        let record = SprintPlanRecord {
            stream: stream.to_string(),
            plan,
            created_at: now,
        };
        if let Err(err) = self.sprints.save_sprint_plan(user_id, &record).await {
            warn!(user = %user_id, error = %err, "sprint save skipped");
            return;
        }
        if let Err(err) = self.sprints.replace_progress(user_id, completed, now).await {
            warn!(user = %user_id, error = %err, "sprint progress reset skipped");
        }
    }
}
