//! Defensive hydration of AI-generated payloads.
//!
//! The backend's output drifts: list entries arrive as bare strings or as
//! records, fields go missing, numbers come back as strings. Every
//! [`Hydrate`] impl reads an arbitrary [`Value`] and never fails; absent
//! fields become empty collections, scalars in record lists are lifted into
//! records, and optional display attributes are carried over only when the
//! payload actually has them.
//!
//! Hydrated types serialize back into the shape they are read from, so
//! `normalize::<T>(&normalize::<T>(&x)) == normalize::<T>(&x)`.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{
    DiscoverProfile, FitLevel, LearningResource, PersonalityAxis, ResourceRef, RoleOption,
    Roadmap, RoadmapPhase, SprintPlan, SprintTask, SprintWeek, StreamFit, StreamOption, TaskId,
};

/// Build a typed result from an untyped payload without ever failing.
pub trait Hydrate: Sized {
    fn hydrate(value: &Value) -> Self;
}

/// Hydrate and serialize back, yielding the canonical JSON shape of `T`.
#[must_use]
pub fn normalize<T: Hydrate + Serialize>(value: &Value) -> Value {
    serde_json::to_value(T::hydrate(value)).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// Lift every entry of a list into a record; a scalar `s` becomes `{key: s}`.
///
/// A lone record or scalar in place of a list is treated as a one-element list.
#[must_use]
pub fn record_list(value: Option<&Value>, key: &str) -> Vec<Map<String, Value>> {
    let entries: &[Value] = match value {
        Some(Value::Array(items)) => items,
        Some(single @ (Value::Object(_) | Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
            std::slice::from_ref(single)
        }
        _ => &[],
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(map) => Some(map.clone()),
            scalar => scalar_text(scalar).map(|text| {
                let mut map = Map::new();
                map.insert(key.to_string(), Value::String(text));
                map
            }),
        })
        .collect()
}

/// Flatten a list into display strings. Records contribute their first naming field.
#[must_use]
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return match value.and_then(scalar_text) {
            Some(text) => vec![text],
            None => Vec::new(),
        };
    };

    items
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(map) => ["name", "title", "text", "role"]
                .iter()
                .find_map(|key| map.get(*key).and_then(scalar_text)),
            scalar => scalar_text(scalar),
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

fn text(value: Option<&Value>) -> String {
    value.and_then(scalar_text).unwrap_or_default()
}

fn first_text(map: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(scalar_text))
        .unwrap_or_default()
}

fn score(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    let clamped = raw.filter(|v| v.is_finite()).unwrap_or(0.0).clamp(0.0, 100.0);
    // In range 0..=100 after the clamp.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = clamped.round() as u8;
    rounded
}

fn week_number(value: Option<&Value>) -> Option<u32> {
    match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Remove `key` only when it holds text, so structured values stay in the map.
fn take_text(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    let text = map.get(key).and_then(scalar_text)?;
    map.remove(key);
    Some(text)
}

//
// ─── DISCOVER PROFILE ──────────────────────────────────────────────────────────
//

fn stream_option(mut map: Map<String, Value>) -> Option<StreamOption> {
    let name = first_text(&map, &["name", "title", "stream"]);
    if name.is_empty() {
        return None;
    }
    // `name` is owned by the record itself.
    map.remove("name");
    let avg_salary_range = take_text(&mut map, "avgSalaryRange");
    Some(StreamOption {
        name,
        avg_salary_range,
        extra: map,
    })
}

fn role_option(mut map: Map<String, Value>) -> Option<RoleOption> {
    let role = first_text(&map, &["role", "name", "title"]);
    if role.is_empty() {
        return None;
    }
    map.remove("role");
    let avg_starting_salary = take_text(&mut map, "avgStartingSalary");
    Some(RoleOption {
        role,
        avg_starting_salary,
        extra: map,
    })
}

impl Hydrate for DiscoverProfile {
    fn hydrate(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let roles = |key: &str| -> Vec<RoleOption> {
            record_list(obj.get(key), "role")
                .into_iter()
                .filter_map(role_option)
                .collect()
        };
        let mut ideal_career_roles = roles("ideal_career_roles");
        if ideal_career_roles.is_empty() {
            ideal_career_roles = roles("suitable_career_roles");
        }

        let personality_axes = record_list(obj.get("personality_axes"), "axis")
            .into_iter()
            .filter_map(|map| {
                let axis = first_text(&map, &["axis", "name"]);
                (!axis.is_empty()).then(|| PersonalityAxis {
                    axis,
                    score: score(map.get("score")),
                })
            })
            .collect();

        let radar_trait_explanation = match obj.get("radar_trait_explanation") {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(k, v)| scalar_text(v).map(|text| (k.clone(), text)))
                .collect(),
            _ => BTreeMap::new(),
        };

        Self {
            core_personality_insight: text(obj.get("core_personality_insight")),
            honest_reality_check: text(obj.get("honest_reality_check")),
            suitable_career_streams: record_list(obj.get("suitable_career_streams"), "name")
                .into_iter()
                .filter_map(stream_option)
                .collect(),
            ideal_career_roles,
            career_types_to_avoid: string_list(obj.get("career_types_to_avoid")),
            skill_gaps: string_list(obj.get("skill_gaps")),
            personality_axes,
            radar_trait_explanation,
        }
    }
}

//
// ─── STREAM FIT ────────────────────────────────────────────────────────────────
//

impl Hydrate for StreamFit {
    fn hydrate(value: &Value) -> Self {
        let empty = Map::new();
        let obj = value.as_object().unwrap_or(&empty);
        let alignment_score = score(obj.get("alignment_score"));
        let label = text(obj.get("fit_level"));
        let fit_level = if label.is_empty() {
            match alignment_score {
                75..=100 => FitLevel::StrongFit,
                50..=74 => FitLevel::ConditionalFit,
                _ => FitLevel::HighRiskOfRegret,
            }
        } else {
            FitLevel::from_label(&label)
        };

        Self {
            alignment_score,
            fit_level,
            core_analysis: text(obj.get("core_analysis")),
            strengths: string_list(obj.get("strengths")),
            risk_factors: string_list(obj.get("risk_factors")),
            improvement_advice: string_list(obj.get("improvement_advice")),
            final_verdict: text(obj.get("final_verdict")),
        }
    }
}

//
// ─── ROADMAP ───────────────────────────────────────────────────────────────────
//

fn learning_resource(map: &Map<String, Value>) -> Option<LearningResource> {
    let title = first_text(map, &["title", "name"]);
    if title.is_empty() {
        return None;
    }
    Some(LearningResource {
        kind: text(map.get("type")),
        title,
        url: map.get("url").and_then(scalar_text),
        provider: map.get("provider").and_then(scalar_text),
        estimated_time: map.get("estimatedTime").and_then(scalar_text),
    })
}

fn roadmap_phase(index: usize, map: &Map<String, Value>) -> RoadmapPhase {
    let id = Some(text(map.get("id")))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("phase_{}", index + 1));
    let title = Some(text(map.get("title")))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| format!("Phase {}", index + 1));

    RoadmapPhase {
        id,
        title,
        subtitle: map.get("subtitle").and_then(scalar_text),
        focus: string_list(map.get("focus")),
        avoid: string_list(map.get("avoid")),
        resources: record_list(map.get("resources"), "title")
            .iter()
            .filter_map(learning_resource)
            .collect(),
    }
}

impl Hydrate for Roadmap {
    fn hydrate(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        if let Some(phases) = obj.get("phases") {
            return Self {
                phases: record_list(Some(phases), "title")
                    .iter()
                    .enumerate()
                    .map(|(i, map)| roadmap_phase(i, map))
                    .collect(),
            };
        }

        // Older backends answer with `year_1`, `year_2`, ... lists instead of phases.
        let mut years: Vec<(u32, &Value)> = obj
            .iter()
            .filter_map(|(key, items)| {
                key.strip_prefix("year_")
                    .and_then(|n| n.parse::<u32>().ok())
                    .map(|n| (n, items))
            })
            .collect();
        years.sort_by_key(|(n, _)| *n);

        Self {
            phases: years
                .into_iter()
                .map(|(n, items)| RoadmapPhase {
                    id: format!("year_{n}"),
                    title: format!("Year {n}"),
                    subtitle: None,
                    focus: string_list(Some(items)),
                    avoid: Vec::new(),
                    resources: Vec::new(),
                })
                .collect(),
        }
    }
}

//
// ─── SPRINT PLAN ───────────────────────────────────────────────────────────────
//

fn sprint_task(week: u32, position: usize, map: &Map<String, Value>) -> SprintTask {
    let id = Some(text(map.get("id")))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("w{week}-t{}", position + 1));
    let resource = map
        .get("resourceUrl")
        .and_then(scalar_text)
        .map(|url| ResourceRef {
            url,
            label: map.get("resourceName").and_then(scalar_text),
        });

    SprintTask {
        id: TaskId::new(id),
        description: first_text(map, &["task", "description", "title"]),
        resource,
        estimate: map.get("estimatedTime").and_then(scalar_text),
    }
}

/// Repeated task ids get `-2`, `-3`, ... so every checklist entry stays
/// addressable.
fn unique_id(seen: &mut HashSet<String>, id: TaskId) -> TaskId {
    let base = id.as_str().to_string();
    if seen.insert(base.clone()) {
        return id;
    }
    let mut n = 2_u32;
    loop {
        let candidate = format!("{base}-{n}");
        if seen.insert(candidate.clone()) {
            return TaskId::new(candidate);
        }
        n += 1;
    }
}

impl Hydrate for SprintPlan {
    fn hydrate(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let mut seen = HashSet::new();
        let mut weeks = Vec::new();
        for (i, map) in record_list(obj.get("weeks"), "theme").iter().enumerate() {
            let fallback = u32::try_from(i + 1).unwrap_or(u32::MAX);
            let index = week_number(map.get("week")).unwrap_or(fallback);
            let mut tasks = Vec::new();
            for (pos, raw) in record_list(map.get("tasks"), "task").iter().enumerate() {
                let mut task = sprint_task(index, pos, raw);
                task.id = unique_id(&mut seen, task.id);
                tasks.push(task);
            }
            weeks.push(SprintWeek {
                index,
                theme: map.get("theme").and_then(scalar_text),
                tasks,
            });
        }

        Self { weeks }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mixed_stream_entries_become_uniform_records() {
        let raw = json!({
            "suitable_career_streams": ["X", {"name": "Y", "avgSalaryRange": "10-20"}]
        });
        let normalized = normalize::<DiscoverProfile>(&raw);
        assert_eq!(
            normalized["suitable_career_streams"],
            json!([{"name": "X"}, {"name": "Y", "avgSalaryRange": "10-20"}])
        );
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let profile = DiscoverProfile::hydrate(&json!({}));
        assert_eq!(profile, DiscoverProfile::default());

        let not_an_object = DiscoverProfile::hydrate(&json!("oops"));
        assert!(not_an_object.suitable_career_streams.is_empty());
        assert!(not_an_object.skill_gaps.is_empty());
    }

    #[test]
    fn salary_is_never_invented() {
        let profile = DiscoverProfile::hydrate(&json!({
            "suitable_career_streams": ["Design"],
            "ideal_career_roles": ["UX Researcher", {"role": "PM", "avgStartingSalary": "8 LPA"}]
        }));
        assert_eq!(profile.suitable_career_streams[0].avg_salary_range, None);
        assert_eq!(profile.ideal_career_roles[0].avg_starting_salary, None);
        assert_eq!(
            profile.ideal_career_roles[1].avg_starting_salary.as_deref(),
            Some("8 LPA")
        );
    }

    #[test]
    fn roles_fall_back_to_suitable_roles() {
        let profile = DiscoverProfile::hydrate(&json!({
            "suitable_career_roles": ["Analyst"]
        }));
        assert_eq!(profile.role_names(), vec!["Analyst"]);
    }

    #[test]
    fn empty_ideal_roles_fall_back_too() {
        let profile = DiscoverProfile::hydrate(&json!({
            "ideal_career_roles": [],
            "suitable_career_roles": ["Analyst"]
        }));
        assert_eq!(profile.role_names(), vec!["Analyst"]);

        let blank = DiscoverProfile::hydrate(&json!({
            "ideal_career_roles": ["", null],
            "suitable_career_roles": [{"role": "Auditor"}]
        }));
        assert_eq!(blank.role_names(), vec!["Auditor"]);
    }

    #[test]
    fn structured_salary_is_kept_verbatim() {
        let raw = json!({
            "suitable_career_streams": [{"name": "Y", "avgSalaryRange": {"min": 10, "max": 20}}],
            "ideal_career_roles": [{"role": "PM", "avgStartingSalary": ["6 LPA", "9 LPA"]}]
        });
        let profile = DiscoverProfile::hydrate(&raw);
        assert_eq!(profile.suitable_career_streams[0].avg_salary_range, None);

        let once = normalize::<DiscoverProfile>(&raw);
        assert_eq!(
            once["suitable_career_streams"],
            json!([{"name": "Y", "avgSalaryRange": {"min": 10, "max": 20}}])
        );
        assert_eq!(
            once["ideal_career_roles"],
            json!([{"role": "PM", "avgStartingSalary": ["6 LPA", "9 LPA"]}])
        );
        assert_eq!(normalize::<DiscoverProfile>(&once), once);
    }

    #[test]
    fn discover_normalization_is_idempotent() {
        let raw = json!({
            "core_personality_insight": "Calm under pressure",
            "suitable_career_streams": ["X", {"name": "Y", "avgSalaryRange": 12, "demand": "high"}],
            "ideal_career_roles": [{"name": "Engineer"}, "Researcher"],
            "career_types_to_avoid": ["Sales", {"title": "Call centre"}, null, ""],
            "skill_gaps": "Public speaking",
            "personality_axes": [{"axis": "Grit", "score": "81.6"}, {"axis": "Risk", "score": 140}],
            "radar_trait_explanation": {"Grit": "Keeps going", "bad": {"nested": true}}
        });
        let once = normalize::<DiscoverProfile>(&raw);
        let twice = normalize::<DiscoverProfile>(&once);
        assert_eq!(once, twice);

        let profile = DiscoverProfile::hydrate(&raw);
        assert_eq!(profile.career_types_to_avoid, vec!["Sales", "Call centre"]);
        assert_eq!(profile.skill_gaps, vec!["Public speaking"]);
        assert_eq!(profile.personality_axes[0].score, 82);
        assert_eq!(profile.personality_axes[1].score, 100);
        assert_eq!(profile.suitable_career_streams[1].avg_salary_range.as_deref(), Some("12"));
        assert_eq!(profile.suitable_career_streams[1].extra.get("demand"), Some(&json!("high")));
        assert_eq!(profile.radar_trait_explanation.len(), 1);
    }

    #[test]
    fn stream_fit_parses_scores_and_labels() {
        let fit = StreamFit::hydrate(&json!({
            "alignment_score": "72",
            "fit_level": "conditional fit",
            "strengths": ["Patient"],
        }));
        assert_eq!(fit.alignment_score, 72);
        assert_eq!(fit.fit_level, FitLevel::ConditionalFit);
        assert!(fit.risk_factors.is_empty());

        let once = normalize::<StreamFit>(&json!({"alignment_score": 91}));
        assert_eq!(once["fit_level"], json!("Strong Fit"));
        assert_eq!(normalize::<StreamFit>(&once), once);
    }

    #[test]
    fn roadmap_phases_get_ids_and_defaults() {
        let raw = json!({
            "phases": [
                {"title": "Foundation", "focus": ["Maths"], "resources": ["Khan Academy", {"type": "youtube", "title": "Intro", "url": "https://y.t/1"}]},
                "Execution"
            ]
        });
        let roadmap = Roadmap::hydrate(&raw);
        assert_eq!(roadmap.phases.len(), 2);
        assert_eq!(roadmap.phases[0].id, "phase_1");
        assert!(roadmap.phases[0].avoid.is_empty());
        assert_eq!(roadmap.phases[0].resources[0].title, "Khan Academy");
        assert_eq!(roadmap.phases[0].resources[0].url, None);
        assert!(roadmap.phases[0].resources[1].is_video());
        assert_eq!(roadmap.phases[1].title, "Execution");
        assert_eq!(roadmap.first_phase_focus(), ["Maths".to_string()]);

        let once = normalize::<Roadmap>(&raw);
        assert_eq!(normalize::<Roadmap>(&once), once);
    }

    #[test]
    fn roadmap_accepts_yearly_shape() {
        let roadmap = Roadmap::hydrate(&json!({
            "year_2": ["Internship"],
            "year_1": ["Python", {"name": "Git"}],
        }));
        assert_eq!(roadmap.phases[0].id, "year_1");
        assert_eq!(roadmap.phases[0].focus, vec!["Python", "Git"]);
        assert_eq!(roadmap.phases[1].title, "Year 2");
    }

    #[test]
    fn sprint_tasks_get_stable_ids() {
        let raw = json!({
            "weeks": [
                {"week": 1, "theme": "Setup", "tasks": ["Install tools", {"id": "custom", "task": "Read", "resourceUrl": "https://docs", "resourceName": "Docs"}]},
                {"tasks": [{"task": "Practice", "estimatedTime": "1h"}]}
            ]
        });
        let plan = SprintPlan::hydrate(&raw);
        assert_eq!(plan.weeks[0].tasks[0].id, TaskId::new("w1-t1"));
        assert_eq!(plan.weeks[0].tasks[1].id, TaskId::new("custom"));
        assert_eq!(
            plan.weeks[0].tasks[1].resource.as_ref().map(ResourceRef::display_label),
            Some("Docs")
        );
        assert_eq!(plan.weeks[1].index, 2);
        assert_eq!(plan.weeks[1].tasks[0].id, TaskId::new("w2-t1"));
        assert_eq!(plan.weeks[1].tasks[0].estimate.as_deref(), Some("1h"));

        let once = normalize::<SprintPlan>(&raw);
        assert_eq!(normalize::<SprintPlan>(&once), once);
    }

    #[test]
    fn repeated_task_ids_are_suffixed() {
        let raw = json!({
            "weeks": [
                {"week": 1, "tasks": [{"id": "read", "task": "A"}, {"id": "read", "task": "B"}, {"id": "read-2", "task": "C"}]},
                {"week": 2, "tasks": [{"id": "w2-t2", "task": "D"}, "E"]}
            ]
        });
        let plan = SprintPlan::hydrate(&raw);
        let ids: Vec<&str> = plan.tasks().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, ["read", "read-2", "read-2-2", "w2-t2", "w2-t2-2"]);
        assert_eq!(plan.validate(), Ok(()));

        let once = normalize::<SprintPlan>(&raw);
        assert_eq!(normalize::<SprintPlan>(&once), once);
    }
}
