//! Sprint checklist with best-effort background persistence.
//!
//! The in-memory [`CompletionMap`] is the source of truth for everything the
//! user sees. Every toggle flips it synchronously and then hands a snapshot of
//! the whole map to the store as a merge write. Failed writes are logged and
//! dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use career_core::Clock;
use career_core::model::{CompletionMap, SprintPlan, TaskId, UserId};
use career_core::normalize::Hydrate;
use storage::repository::SprintRepository;

use crate::error::{SprintError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    LoadFailed,
}

/// How overlapping progress writes are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistPolicy {
    /// Every toggle writes independently; whichever write lands last wins,
    /// which is not necessarily the latest toggle.
    #[default]
    LastWriteWins,
    /// A single writer task applies writes in toggle order.
    Serialized,
}

/// Handle for one background progress write. Dropping it does not cancel the write.
#[must_use = "await `settled` to observe the write, or drop it to fire and forget"]
pub struct PendingWrite(PendingInner);

enum PendingInner {
    Skipped,
    Spawned(JoinHandle<()>),
    Queued(oneshot::Receiver<()>),
}

impl PendingWrite {
    fn skipped() -> Self {
        Self(PendingInner::Skipped)
    }

    /// `true` when nothing is written, e.g. for anonymous users.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self.0, PendingInner::Skipped)
    }

    /// Wait until the write has landed or failed.
    pub async fn settled(self) {
        match self.0 {
            PendingInner::Skipped => {}
            PendingInner::Spawned(handle) => {
                let _ = handle.await;
            }
            PendingInner::Queued(done) => {
                let _ = done.await;
            }
        }
    }
}

struct WriteJob {
    snapshot: CompletionMap,
    updated_at: DateTime<Utc>,
    done: oneshot::Sender<()>,
}

/// Per-week completion, for progress bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekProgress {
    pub index: u32,
    pub theme: Option<String>,
    pub done: usize,
    pub total: usize,
}

impl WeekProgress {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.done == self.total
    }
}

/// Presentation-agnostic snapshot of the checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistView {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub weeks: Vec<WeekProgress>,
}

impl ChecklistView {
    #[must_use]
    pub fn is_sprint_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

pub struct ChecklistTracker {
    clock: Clock,
    policy: PersistPolicy,
    sprints: Arc<dyn SprintRepository>,
    user: Option<UserId>,
    state: LoadState,
    plan: Option<SprintPlan>,
    completed: CompletionMap,
    in_flight: Arc<AtomicUsize>,
    writer: Option<mpsc::UnboundedSender<WriteJob>>,
}

impl ChecklistTracker {
    #[must_use]
    pub fn new(
        clock: Clock,
        policy: PersistPolicy,
        sprints: Arc<dyn SprintRepository>,
        user: Option<UserId>,
    ) -> Self {
        Self {
            clock,
            policy,
            sprints,
            user,
            state: LoadState::Unloaded,
            plan: None,
            completed: CompletionMap::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            writer: None,
        }
    }

    /// A tracker for a plan that was just generated, already loaded.
    #[must_use]
    pub fn with_plan(mut self, plan: SprintPlan, completed: CompletionMap) -> Self {
        self.plan = Some(plan);
        self.completed = completed;
        self.state = LoadState::Loaded;
        self
    }

    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state
    }

    #[must_use]
    pub fn plan(&self) -> Option<&SprintPlan> {
        self.plan.as_ref()
    }

    #[must_use]
    pub fn completed(&self) -> &CompletionMap {
        &self.completed
    }

    /// `true` while at least one progress write is still in flight.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Load the stored plan and progress once.
    ///
    /// A stored completion map is adopted as-is; without one every task of
    /// the plan starts unchecked. Anonymous users load nothing.
    pub async fn load(&mut self) {
        if self.state != LoadState::Unloaded {
            return;
        }
        self.state = LoadState::Loading;

        let Some(user) = self.user.clone() else {
            self.state = LoadState::Loaded;
            return;
        };

        let record = match self.sprints.latest_sprint_plan(&user).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.state = LoadState::Loaded;
                return;
            }
            Err(err) => {
                warn!(user = %user, error = %err, "could not load sprint");
                self.state = LoadState::LoadFailed;
                return;
            }
        };
        let plan = SprintPlan::hydrate(&record.plan);

        match self.sprints.get_progress(&user).await {
            Ok(Some(progress)) => {
                self.completed = progress.completed;
                self.state = LoadState::Loaded;
            }
            Ok(None) => {
                self.completed = CompletionMap::for_plan(&plan);
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                warn!(user = %user, error = %err, "could not load sprint progress");
                self.completed = CompletionMap::for_plan(&plan);
                self.state = LoadState::LoadFailed;
            }
        }
        self.plan = Some(plan);
    }

    /// Flip one task locally, then persist the whole map in the background.
    ///
    /// # Errors
    ///
    /// Returns `SprintError::Validation` for task ids that are neither in the
    /// plan nor in the loaded map.
    pub fn toggle(&mut self, id: &TaskId) -> Result<PendingWrite, SprintError> {
        let known = self.plan.as_ref().is_some_and(|plan| plan.has_task(id))
            || self.completed.contains(id);
        if !known {
            return Err(ValidationError::UnknownTask(id.clone()).into());
        }

        let done = self.completed.toggle(id);
        debug!(task = %id, done, "checklist task toggled");
        Ok(self.persist_snapshot())
    }

    fn persist_snapshot(&mut self) -> PendingWrite {
        let Some(user) = self.user.clone() else {
            return PendingWrite::skipped();
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime; progress not persisted");
            return PendingWrite::skipped();
        };

        let snapshot = self.completed.clone();
        let updated_at = self.clock.now();

        match self.policy {
            PersistPolicy::LastWriteWins => {
                let sprints = Arc::clone(&self.sprints);
                let in_flight = Arc::clone(&self.in_flight);
                in_flight.fetch_add(1, Ordering::SeqCst);
                let handle = runtime.spawn(async move {
                    if let Err(err) = sprints.merge_progress(&user, &snapshot, updated_at).await {
                        warn!(user = %user, error = %err, "progress save failed");
                    }
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                });
                PendingWrite(PendingInner::Spawned(handle))
            }
            PersistPolicy::Serialized => {
                let (done, settled) = oneshot::channel();
                let job = WriteJob {
                    snapshot,
                    updated_at,
                    done,
                };
                self.in_flight.fetch_add(1, Ordering::SeqCst);
                let writer = self.writer.get_or_insert_with(|| {
                    spawn_writer(&runtime, user, Arc::clone(&self.sprints), Arc::clone(&self.in_flight))
                });
                if writer.send(job).is_err() {
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    warn!("progress writer stopped; progress not persisted");
                    return PendingWrite::skipped();
                }
                PendingWrite(PendingInner::Queued(settled))
            }
        }
    }

    #[must_use]
    pub fn view(&self) -> ChecklistView {
        let total = self
            .plan
            .as_ref()
            .map_or(self.completed.len(), SprintPlan::task_count);
        let weeks = self
            .plan
            .as_ref()
            .map(|plan| {
                plan.weeks
                    .iter()
                    .map(|week| WeekProgress {
                        index: week.index,
                        theme: week.theme.clone(),
                        done: week.done_count(&self.completed),
                        total: week.tasks.len(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        ChecklistView {
            completed: self.completed.completed_count(),
            total,
            percent: self.completed.percent_of(total),
            weeks,
        }
    }
}

fn spawn_writer(
    runtime: &tokio::runtime::Handle,
    user: UserId,
    sprints: Arc<dyn SprintRepository>,
    in_flight: Arc<AtomicUsize>,
) -> mpsc::UnboundedSender<WriteJob> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WriteJob>();
    runtime.spawn(async move {
        while let Some(job) = rx.recv().await {
            if let Err(err) = sprints
                .merge_progress(&user, &job.snapshot, job.updated_at)
                .await
            {
                warn!(user = %user, error = %err, "progress save failed");
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
            let _ = job.done.send(());
        }
    });
    tx
}
