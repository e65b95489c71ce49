use chrono::{DateTime, Utc};

use career_core::model::DiscoverProfile;

use crate::checklist::{ChecklistView, LoadState};
use crate::error::RoadmapError;
use crate::quiz_flow::DiscoverService;
use crate::roadmap_service::{RoadmapService, SavedRoadmap};
use crate::sprint_service::SprintService;
use crate::user_session::UserSession;

/// Everything stored for a user, gathered for an overview screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dashboard {
    pub profile: Option<(DiscoverProfile, DateTime<Utc>)>,
    pub recent_roadmaps: Vec<SavedRoadmap>,
    /// `None` when no sprint is stored or it could not be loaded.
    pub sprint: Option<ChecklistView>,
}

impl Dashboard {
    /// Gather the dashboard. Anonymous users get an empty one.
    ///
    /// # Errors
    ///
    /// Returns `RoadmapError::Storage` if stored results cannot be read.
    pub async fn load(
        user: &UserSession,
        discover: &DiscoverService,
        roadmaps: &RoadmapService,
        sprints: &SprintService,
        roadmap_limit: u32,
    ) -> Result<Self, RoadmapError> {
        if !user.is_signed_in() {
            return Ok(Self::default());
        }

        let profile = discover
            .latest(user)
            .await?
            .map(|saved| (saved.profile, saved.saved_at));
        let recent_roadmaps = roadmaps.recent(user, roadmap_limit).await?;

        let mut tracker = sprints.tracker(user);
        tracker.load().await;
        let sprint = (tracker.state() == LoadState::Loaded && tracker.plan().is_some())
            .then(|| tracker.view());

        Ok(Self {
            profile,
            recent_roadmaps,
            sprint,
        })
    }
}
