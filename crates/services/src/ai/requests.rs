use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use career_core::model::QuizSubmission;

/// Discovery answers in the backend's flat shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoverRequest {
    pub pressure_fear: String,
    pub life_preference: String,
    pub team_role: String,
    pub failure_response: String,
    pub energy_drain: String,
    pub risk_tolerance: String,
    /// Free-text answers keyed by question id.
    pub custom_inputs: BTreeMap<String, String>,
}

impl DiscoverRequest {
    #[must_use]
    pub fn from_submission(submission: &QuizSubmission) -> Self {
        Self {
            pressure_fear: submission.answer("pressure_fear").to_string(),
            life_preference: submission.answer("life_preference").to_string(),
            team_role: submission.answer("team_role").to_string(),
            failure_response: submission.answer("failure_response").to_string(),
            energy_drain: submission.answer("energy_drain").to_string(),
            risk_tolerance: submission.answer("risk_tolerance").to_string(),
            custom_inputs: submission
                .custom_inputs
                .iter()
                .map(|(id, value)| (id.as_str().to_string(), value.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamAnalysisRequest {
    pub selected_stream: String,
    pub answers: BTreeMap<String, String>,
}

impl StreamAnalysisRequest {
    #[must_use]
    pub fn from_submission(selected_stream: &str, submission: &QuizSubmission) -> Self {
        Self {
            selected_stream: selected_stream.to_string(),
            answers: submission
                .answers
                .iter()
                .map(|(id, value)| (id.as_str().to_string(), value.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapRequest {
    pub discover_result: Value,
    pub selected_stream: String,
    pub goals: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SprintRequest {
    #[serde(rename = "selectedStream")]
    pub selected_stream: String,
    #[serde(rename = "roadmapPhase1Focus")]
    pub roadmap_phase1_focus: Vec<String>,
    #[serde(rename = "personalityProfile")]
    pub personality_profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use career_core::model::QuestionId;
    use serde_json::json;

    #[test]
    fn discover_request_fills_missing_answers_with_empty_strings() {
        let mut submission = QuizSubmission::default();
        submission
            .answers
            .insert(QuestionId::new("team_role"), "leader".into());
        submission
            .answers
            .insert(QuestionId::new("energy_drain"), "long commutes".into());
        submission
            .custom_inputs
            .insert(QuestionId::new("energy_drain"), "long commutes".into());

        let body = serde_json::to_value(DiscoverRequest::from_submission(&submission)).unwrap();
        assert_eq!(body["team_role"], "leader");
        assert_eq!(body["pressure_fear"], "");
        assert_eq!(body["custom_inputs"], json!({"energy_drain": "long commutes"}));
    }

    #[test]
    fn sprint_request_uses_camel_case_keys() {
        let body = serde_json::to_value(SprintRequest {
            selected_stream: "Design & Creative Arts".into(),
            roadmap_phase1_focus: vec!["Figma".into()],
            personality_profile: "Curious".into(),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "selectedStream": "Design & Creative Arts",
                "roadmapPhase1Focus": ["Figma"],
                "personalityProfile": "Curious",
            })
        );
    }
}
