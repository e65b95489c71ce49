use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use career_core::Clock;
use career_core::model::{DiscoverProfile, Roadmap, RoadmapId};
use career_core::normalize::Hydrate;
use storage::repository::{NewRoadmap, RoadmapRepository};

use crate::ai::{GuidanceBackend, RoadmapRequest};
use crate::error::{RoadmapError, ValidationError};
use crate::user_session::UserSession;

/// Roadmaps generated from the discovery quiz carry this source tag.
pub const DISCOVER_SOURCE: &str = "discover";

/// A roadmap fresh from the backend, and where it was saved if it was.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedRoadmap {
    pub stream: String,
    pub roadmap: Roadmap,
    pub saved_id: Option<RoadmapId>,
}

/// A roadmap read back from the user's history.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRoadmap {
    pub id: RoadmapId,
    pub stream: String,
    pub roadmap: Roadmap,
    pub source: String,
    pub generated_at: DateTime<Utc>,
}

/// Resolve `requested` against the streams the profile suggested.
///
/// Matching ignores case and surrounding whitespace; the profile's spelling is returned.
///
/// # Errors
///
/// Returns `ValidationError` when nothing is selected or the stream was not suggested.
pub fn select_stream(profile: &DiscoverProfile, requested: &str) -> Result<String, ValidationError> {
    let requested = requested.trim();
    if requested.is_empty() {
        return Err(ValidationError::NoStreamSelected);
    }
    profile
        .stream_names()
        .into_iter()
        .find(|name| name.trim().eq_ignore_ascii_case(requested))
        .map(str::to_string)
        .ok_or_else(|| ValidationError::StreamNotSuggested(requested.to_string()))
}

/// The free-text goal statement sent along with the profile.
#[must_use]
pub fn goals_sentence(profile: &DiscoverProfile, selected_stream: &str) -> String {
    format!(
        "I want to pursue a career in {selected_stream}. Other potential streams: {}. Potential roles: {}.",
        profile.stream_names().join(", "),
        profile.role_names().join(", "),
    )
}

#[derive(Clone)]
pub struct RoadmapService {
    clock: Clock,
    backend: Arc<dyn GuidanceBackend>,
    roadmaps: Arc<dyn RoadmapRepository>,
}

impl RoadmapService {
    #[must_use]
    pub fn new(
        clock: Clock,
        backend: Arc<dyn GuidanceBackend>,
        roadmaps: Arc<dyn RoadmapRepository>,
    ) -> Self {
        Self {
            clock,
            backend,
            roadmaps,
        }
    }

    /// Generate a phased roadmap for one of the profile's suggested streams.
    ///
    /// Signed-in users get the roadmap appended to their history; a failed
    /// save is logged and does not fail the generation.
    ///
    /// # Errors
    ///
    /// Returns `RoadmapError::Validation` before any call when the stream is
    /// missing or was not suggested, and `RoadmapError::Backend` when the
    /// backend call fails.
    pub async fn generate(
        &self,
        user: &UserSession,
        profile: &DiscoverProfile,
        selected_stream: Option<&str>,
    ) -> Result<GeneratedRoadmap, RoadmapError> {
        let stream = select_stream(profile, selected_stream.unwrap_or_default())?;
        let request = RoadmapRequest {
            discover_result: serde_json::to_value(profile)?,
            selected_stream: stream.clone(),
            goals: goals_sentence(profile, &stream),
        };

        info!(%stream, "generating roadmap");
        let raw = self.backend.generate_roadmap(&request).await?;
        let roadmap = Roadmap::hydrate(&raw);
        let saved_id = self.save(user, &stream, &roadmap).await;

        Ok(GeneratedRoadmap {
            stream,
            roadmap,
            saved_id,
        })
    }

    async fn save(&self, user: &UserSession, stream: &str, roadmap: &Roadmap) -> Option<RoadmapId> {
        let user_id = user.user_id()?;
        if roadmap.is_empty() {
            return None;
        }
        let draft = NewRoadmap {
            stream: stream.to_string(),
            roadmap: match serde_json::to_value(roadmap) {
                Ok(value) => value,
                Err(err) => {
                    warn!(error = %err, "roadmap save skipped");
                    return None;
                }
            },
            source: DISCOVER_SOURCE.to_string(),
            generated_at: self.clock.now(),
        };
        match self.roadmaps.append_roadmap(user_id, &draft).await {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(user = %user_id, error = %err, "roadmap save skipped");
                None
            }
        }
    }

    /// Most recent roadmaps first; empty for anonymous users.
    ///
    /// # Errors
    ///
    /// Returns `RoadmapError::Storage` if the history cannot be read.
    pub async fn recent(
        &self,
        user: &UserSession,
        limit: u32,
    ) -> Result<Vec<SavedRoadmap>, RoadmapError> {
        let Some(user_id) = user.user_id() else {
            return Ok(Vec::new());
        };
        let records = self.roadmaps.recent_roadmaps(user_id, limit).await?;
        Ok(records
            .into_iter()
            .map(|record| SavedRoadmap {
                id: record.id,
                stream: record.stream,
                roadmap: Roadmap::hydrate(&record.roadmap),
                source: record.source,
                generated_at: record.generated_at,
            })
            .collect())
    }
}
