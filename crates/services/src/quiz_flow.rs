//! Quiz flows: a [`QuizSession`] plus the async submission that closes it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use career_core::catalog::{self, GoalStream};
use career_core::model::{
    Advance, Blocked, DiscoverProfile, QuestionId, QuizConfig, QuizSession, QuizSubmission,
    StreamFit,
};
use career_core::normalize::{Hydrate, normalize};
use career_core::{Clock, CoreError};
use storage::repository::{DiscoverRecord, DiscoverRepository, StorageError};

use crate::ai::{DiscoverRequest, GuidanceBackend, StreamAnalysisRequest};
use crate::error::{AiClientError, QuizFlowError, ValidationError};
use crate::user_session::UserSession;

/// What an answer or navigation action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The choice was recorded; the cursor stays put.
    Selected,
    Moved { step: usize },
    /// The submission succeeded and the result is available.
    Completed,
}

/// One run of a quiz together with its outcome.
#[derive(Debug, Clone)]
pub struct QuizRun<R> {
    subject: String,
    session: QuizSession,
    result: Option<R>,
    error_message: Option<&'static str>,
}

impl<R> QuizRun<R> {
    #[must_use]
    pub fn new(subject: impl Into<String>, session: QuizSession) -> Self {
        Self {
            subject: subject.into(),
            session,
            result: None,
            error_message: None,
        }
    }

    /// `"discovery"` or the goal stream id.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    /// User-facing message from the last failed submission.
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.error_message
    }

    /// # Errors
    ///
    /// Returns `Blocked` when the session rejects the selection.
    pub fn select_answer(&mut self, step: usize, value: impl Into<String>) -> Result<(), Blocked> {
        self.session.select_answer(step, value)
    }

    pub fn set_free_text(&mut self, text: impl Into<String>) {
        self.session.set_free_text(text);
    }

    /// # Errors
    ///
    /// Returns `Blocked` at the first step or while not navigable.
    pub fn retreat(&mut self) -> Result<usize, Blocked> {
        self.session.retreat()
    }

    /// Start over with no answers and no result.
    pub fn restart(&mut self) {
        self.session.restart();
        self.result = None;
        self.error_message = None;
    }

    fn succeed(&mut self, result: R) {
        self.session.complete_submission();
        self.result = Some(result);
        self.error_message = None;
    }

    fn fail(&mut self, err: &AiClientError) {
        self.session.fail_submission();
        self.error_message = Some(err.user_message());
    }
}

pub type DiscoverRun = QuizRun<DiscoverProfile>;
pub type GoalFitRun = QuizRun<StreamFit>;

/// A discover profile as it was last persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedDiscover {
    pub profile: DiscoverProfile,
    pub answers: std::collections::BTreeMap<QuestionId, String>,
    pub saved_at: DateTime<Utc>,
}

//
// ─── DISCOVERY ─────────────────────────────────────────────────────────────────
//

/// Runs the behavioral discovery quiz and stores its latest outcome.
#[derive(Clone)]
pub struct DiscoverService {
    clock: Clock,
    config: QuizConfig,
    backend: Arc<dyn GuidanceBackend>,
    discover: Arc<dyn DiscoverRepository>,
}

impl DiscoverService {
    #[must_use]
    pub fn new(
        clock: Clock,
        backend: Arc<dyn GuidanceBackend>,
        discover: Arc<dyn DiscoverRepository>,
    ) -> Self {
        Self {
            clock,
            config: QuizConfig::discovery(),
            backend,
            discover,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: QuizConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    ///
    /// Returns `QuizFlowError` if the built-in catalog is malformed.
    pub fn start(&self) -> Result<DiscoverRun, QuizFlowError> {
        let questions = catalog::discovery_questions().map_err(CoreError::from)?;
        Ok(QuizRun::new(
            "discovery",
            QuizSession::new(questions, self.config, self.clock),
        ))
    }

    /// Pick a predefined choice for the current step.
    ///
    /// # Errors
    ///
    /// Same as [`Self::advance`].
    pub async fn choose(
        &self,
        run: &mut DiscoverRun,
        value: &str,
        user: &UserSession,
    ) -> Result<StepOutcome, QuizFlowError> {
        match run.session.choose(value)? {
            None => Ok(StepOutcome::Selected),
            Some(advance) => self.settle(run, advance, user).await,
        }
    }

    /// Move on, submitting from the last step.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Blocked` when the gate rejects and
    /// `QuizFlowError::Backend` when the submission fails. After a failure the
    /// run keeps its answers and can be advanced again.
    pub async fn advance(
        &self,
        run: &mut DiscoverRun,
        user: &UserSession,
    ) -> Result<StepOutcome, QuizFlowError> {
        let advance = run.session.advance()?;
        self.settle(run, advance, user).await
    }

    async fn settle(
        &self,
        run: &mut DiscoverRun,
        advance: Advance,
        user: &UserSession,
    ) -> Result<StepOutcome, QuizFlowError> {
        let submission = match advance {
            Advance::Moved { step } => return Ok(StepOutcome::Moved { step }),
            Advance::Submitted(submission) => submission,
        };

        info!(
            answers = submission.answers.len(),
            custom_inputs = submission.custom_inputs.len(),
            "submitting discovery quiz"
        );
        let request = DiscoverRequest::from_submission(&submission);
        match self.backend.generate_discover(&request).await {
            Ok(raw) => {
                let profile = DiscoverProfile::hydrate(&raw);
                self.save_latest(user, &raw, &submission).await;
                run.succeed(profile);
                Ok(StepOutcome::Completed)
            }
            Err(err) => {
                run.fail(&err);
                Err(err.into())
            }
        }
    }

    async fn save_latest(
        &self,
        user: &UserSession,
        raw: &serde_json::Value,
        submission: &QuizSubmission,
    ) {
        let Some(user_id) = user.user_id() else {
            return;
        };
        let record = DiscoverRecord {
            result: normalize::<DiscoverProfile>(raw),
            answers: submission.answers.clone(),
            saved_at: self.clock.now(),
        };
        if let Err(err) = self.discover.save_latest_discover(user_id, &record).await {
            warn!(user = %user_id, error = %err, "discover result save skipped");
        }
    }

    /// The last stored profile, if the user is signed in and ever finished the quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be read.
    pub async fn latest(&self, user: &UserSession) -> Result<Option<SavedDiscover>, StorageError> {
        let Some(user_id) = user.user_id() else {
            return Ok(None);
        };
        Ok(self
            .discover
            .latest_discover(user_id)
            .await?
            .map(|record| SavedDiscover {
                profile: DiscoverProfile::hydrate(&record.result),
                answers: record.answers,
                saved_at: record.saved_at,
            }))
    }
}

//
// ─── GOAL FIT ──────────────────────────────────────────────────────────────────
//

/// Runs the per-stream goal-fit quiz. Choosing an option advances right away.
#[derive(Clone)]
pub struct GoalFitService {
    clock: Clock,
    config: QuizConfig,
    backend: Arc<dyn GuidanceBackend>,
}

impl GoalFitService {
    #[must_use]
    pub fn new(clock: Clock, backend: Arc<dyn GuidanceBackend>) -> Self {
        Self {
            clock,
            config: QuizConfig::goal_fit(),
            backend,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: QuizConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    ///
    /// Returns `QuizFlowError` if the built-in catalog is malformed.
    pub fn streams(&self) -> Result<Vec<GoalStream>, QuizFlowError> {
        Ok(catalog::goal_streams().map_err(CoreError::from)?)
    }

    /// # Errors
    ///
    /// Returns `ValidationError::UnknownGoalStream` for ids outside the catalog.
    pub fn start(&self, stream_id: &str) -> Result<GoalFitRun, QuizFlowError> {
        let stream = catalog::find_goal_stream(stream_id)
            .map_err(CoreError::from)?
            .ok_or_else(|| ValidationError::UnknownGoalStream(stream_id.to_string()))?;
        Ok(QuizRun::new(
            stream.id,
            QuizSession::new(stream.questions, self.config, self.clock),
        ))
    }

    /// # Errors
    ///
    /// Same as [`Self::advance`].
    pub async fn choose(
        &self,
        run: &mut GoalFitRun,
        value: &str,
    ) -> Result<StepOutcome, QuizFlowError> {
        match run.session.choose(value)? {
            None => Ok(StepOutcome::Selected),
            Some(advance) => self.settle(run, advance).await,
        }
    }

    /// # Errors
    ///
    /// Returns `QuizFlowError::Blocked` when the gate rejects and
    /// `QuizFlowError::Backend` when the analysis request fails.
    pub async fn advance(&self, run: &mut GoalFitRun) -> Result<StepOutcome, QuizFlowError> {
        let advance = run.session.advance()?;
        self.settle(run, advance).await
    }

    async fn settle(
        &self,
        run: &mut GoalFitRun,
        advance: Advance,
    ) -> Result<StepOutcome, QuizFlowError> {
        let submission = match advance {
            Advance::Moved { step } => return Ok(StepOutcome::Moved { step }),
            Advance::Submitted(submission) => submission,
        };

        info!(stream = %run.subject, "submitting goal-fit quiz");
        let request = StreamAnalysisRequest::from_submission(&run.subject, &submission);
        match self.backend.analyze_stream(&request).await {
            Ok(raw) => {
                let fit = StreamFit::hydrate(&raw);
                info!(
                    stream = %run.subject,
                    score = fit.alignment_score,
                    verdict = fit.fit_level.label(),
                    "goal-fit analysis ready"
                );
                run.succeed(fit);
                Ok(StepOutcome::Completed)
            }
            Err(err) => {
                run.fail(&err);
                Err(err.into())
            }
        }
    }
}
