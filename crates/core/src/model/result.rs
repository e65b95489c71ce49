use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// A suggested career stream. Older payloads send bare names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamOption {
    pub name: String,
    #[serde(rename = "avgSalaryRange", skip_serializing_if = "Option::is_none")]
    pub avg_salary_range: Option<String>,
    /// Any further attributes the backend attached, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A suggested role. Older payloads send bare role names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleOption {
    pub role: String,
    #[serde(rename = "avgStartingSalary", skip_serializing_if = "Option::is_none")]
    pub avg_starting_salary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalityAxis {
    pub axis: String,
    pub score: u8,
}

/// Behavioral profile returned for the discovery quiz.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DiscoverProfile {
    pub core_personality_insight: String,
    pub honest_reality_check: String,
    pub suitable_career_streams: Vec<StreamOption>,
    pub ideal_career_roles: Vec<RoleOption>,
    pub career_types_to_avoid: Vec<String>,
    pub skill_gaps: Vec<String>,
    pub personality_axes: Vec<PersonalityAxis>,
    pub radar_trait_explanation: BTreeMap<String, String>,
}

impl DiscoverProfile {
    #[must_use]
    pub fn stream_names(&self) -> Vec<&str> {
        self.suitable_career_streams
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }

    #[must_use]
    pub fn role_names(&self) -> Vec<&str> {
        self.ideal_career_roles
            .iter()
            .map(|r| r.role.as_str())
            .collect()
    }

    #[must_use]
    pub fn has_stream(&self, name: &str) -> bool {
        self.suitable_career_streams.iter().any(|s| s.name == name)
    }
}

//
// ─── GOAL FIT ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitLevel {
    #[serde(rename = "Strong Fit")]
    StrongFit,
    #[serde(rename = "Conditional Fit")]
    ConditionalFit,
    #[serde(rename = "High Risk of Regret")]
    HighRiskOfRegret,
}

impl FitLevel {
    /// Anything that is not recognizably strong or conditional is treated as high risk.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_ascii_lowercase();
        if lower.contains("strong") {
            Self::StrongFit
        } else if lower.contains("conditional") {
            Self::ConditionalFit
        } else {
            Self::HighRiskOfRegret
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::StrongFit => "Strong Fit",
            Self::ConditionalFit => "Conditional Fit",
            Self::HighRiskOfRegret => "High Risk of Regret",
        }
    }
}

/// Alignment verdict for one target stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamFit {
    pub alignment_score: u8,
    pub fit_level: FitLevel,
    pub core_analysis: String,
    pub strengths: Vec<String>,
    pub risk_factors: Vec<String>,
    pub improvement_advice: Vec<String>,
    pub final_verdict: String,
}

//
// ─── ROADMAP ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningResource {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(rename = "estimatedTime", skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

impl LearningResource {
    #[must_use]
    pub fn is_video(&self) -> bool {
        matches!(self.kind.as_str(), "youtube" | "YouTube" | "Video")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapPhase {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub focus: Vec<String>,
    pub avoid: Vec<String>,
    pub resources: Vec<LearningResource>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Roadmap {
    pub phases: Vec<RoadmapPhase>,
}

impl Roadmap {
    /// Focus items of the first phase, the seed for a sprint plan.
    #[must_use]
    pub fn first_phase_focus(&self) -> &[String] {
        self.phases.first().map_or(&[], |phase| phase.focus.as_slice())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}
