use std::collections::{BTreeMap, HashSet};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use super::TaskId;

/// Weeks in a full sprint plan.
pub const SPRINT_WEEKS: usize = 12;
/// Tasks per week in a full sprint plan.
pub const TASKS_PER_WEEK: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SprintPlanError {
    #[error("sprint plan has no tasks")]
    Empty,

    #[error("duplicate task id: {0}")]
    DuplicateTaskId(TaskId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub url: String,
    pub label: Option<String>,
}

impl ResourceRef {
    /// Link text, falling back to a generic label.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("Resource")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintTask {
    pub id: TaskId,
    pub description: String,
    pub resource: Option<ResourceRef>,
    pub estimate: Option<String>,
}

// Serialized in the backend's flat shape (`task`, `resourceUrl`, `resourceName`, ...).
impl Serialize for SprintTask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SprintTask", 5)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("task", &self.description)?;
        match &self.resource {
            Some(resource) => {
                state.serialize_field("resourceUrl", &resource.url)?;
                match &resource.label {
                    Some(label) => state.serialize_field("resourceName", label)?,
                    None => state.skip_field("resourceName")?,
                }
            }
            None => {
                state.skip_field("resourceUrl")?;
                state.skip_field("resourceName")?;
            }
        }
        match &self.estimate {
            Some(estimate) => state.serialize_field("estimatedTime", estimate)?,
            None => state.skip_field("estimatedTime")?,
        }
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SprintWeek {
    #[serde(rename = "week")]
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    pub tasks: Vec<SprintTask>,
}

impl SprintWeek {
    #[must_use]
    pub fn done_count(&self, completed: &CompletionMap) -> usize {
        self.tasks
            .iter()
            .filter(|task| completed.is_done(&task.id))
            .count()
    }
}

/// A 12-week action plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SprintPlan {
    pub weeks: Vec<SprintWeek>,
}

impl SprintPlan {
    pub fn tasks(&self) -> impl Iterator<Item = &SprintTask> {
        self.weeks.iter().flat_map(|week| week.tasks.iter())
    }

    #[must_use]
    pub fn has_task(&self, id: &TaskId) -> bool {
        self.tasks().any(|task| &task.id == id)
    }

    #[must_use]
    pub fn task_count(&self) -> usize {
        self.weeks.iter().map(|week| week.tasks.len()).sum()
    }

    /// # Errors
    ///
    /// Returns `SprintPlanError` if the plan has no tasks or task ids repeat.
    pub fn validate(&self) -> Result<(), SprintPlanError> {
        if self.task_count() == 0 {
            return Err(SprintPlanError::Empty);
        }
        let mut seen = HashSet::new();
        for task in self.tasks() {
            if !seen.insert(&task.id) {
                return Err(SprintPlanError::DuplicateTaskId(task.id.clone()));
            }
        }
        Ok(())
    }
}

//
// ─── COMPLETION MAP ────────────────────────────────────────────────────────────
//

/// Per-task checklist state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionMap(BTreeMap<TaskId, bool>);

impl CompletionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every task of the plan, not done.
    #[must_use]
    pub fn for_plan(plan: &SprintPlan) -> Self {
        Self(plan.tasks().map(|task| (task.id.clone(), false)).collect())
    }

    /// Flip the flag for `id` (unknown ids start as not done). Returns the new value.
    pub fn toggle(&mut self, id: &TaskId) -> bool {
        let entry = self.0.entry(id.clone()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn set(&mut self, id: TaskId, done: bool) {
        self.0.insert(id, done);
    }

    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.0.contains_key(id)
    }

    #[must_use]
    pub fn is_done(&self, id: &TaskId) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.0.values().filter(|done| **done).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, bool)> {
        self.0.iter().map(|(id, done)| (id, *done))
    }

    /// Field-wise merge: entries of `other` win, entries only present here stay.
    pub fn merge_from(&mut self, other: &CompletionMap) {
        for (id, done) in other.iter() {
            self.0.insert(id.clone(), done);
        }
    }

    /// Completed share of `total`, rounded to the nearest percent.
    #[must_use]
    pub fn percent_of(&self, total: usize) -> u8 {
        if total == 0 {
            return 0;
        }
        let pct = (self.completed_count() * 100 + total / 2) / total;
        u8::try_from(pct.min(100)).unwrap_or(100)
    }
}

impl FromIterator<(TaskId, bool)> for CompletionMap {
    fn from_iter<I: IntoIterator<Item = (TaskId, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
