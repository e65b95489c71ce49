use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::{QuestionId, QuestionSet};
use crate::Clock;

//
// ─── CONFIGURATION ─────────────────────────────────────────────────────────────
//

/// Whether answering a step is held back until the user has spent some time on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerTiming {
    #[default]
    Untimed,
    /// Selection and advancing are rejected until this long after entering the step.
    MinDwell(Duration),
}

/// Per-quiz behavior switches. The discovery and goal-fit quizzes differ here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuizConfig {
    pub timing: AnswerTiming,
    /// Picking a predefined choice also advances in the same action.
    pub auto_advance: bool,
}

impl QuizConfig {
    /// Explicit "next" action, free text allowed.
    #[must_use]
    pub fn discovery() -> Self {
        Self {
            timing: AnswerTiming::Untimed,
            auto_advance: false,
        }
    }

    /// Choosing an option moves on immediately.
    #[must_use]
    pub fn goal_fit() -> Self {
        Self {
            timing: AnswerTiming::Untimed,
            auto_advance: true,
        }
    }

    #[must_use]
    pub fn with_timing(mut self, timing: AnswerTiming) -> Self {
        self.timing = timing;
        self
    }
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Why a navigation or answer action left the session untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Blocked {
    #[error("no answer for the current step")]
    NoAnswer,

    #[error("a submission is pending")]
    Pending,

    #[error("the session was already submitted")]
    Submitted,

    #[error("step {step} is out of range")]
    OutOfRange { step: usize },

    #[error("answering opens in {remaining_secs}s")]
    DwellPending { remaining_secs: i64 },

    #[error("already at the first step")]
    AtStart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved { step: usize },
    Submitted(QuizSubmission),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    Answering,
    Pending,
    ResultsVisible,
}

/// Answers packaged for the outbound request, keyed by stable question id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct QuizSubmission {
    pub answers: BTreeMap<QuestionId, String>,
    /// Answers that match none of their question's predefined values.
    pub custom_inputs: BTreeMap<QuestionId, String>,
}

impl QuizSubmission {
    /// Answer for `id`, or an empty string when the question was never answered.
    #[must_use]
    pub fn answer(&self, id: &str) -> &str {
        self.answers
            .iter()
            .find(|(key, _)| key.as_str() == id)
            .map_or("", |(_, value)| value.as_str())
    }
}

/// Aggregated view of where the user is, useful for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    /// 1-based position of the current step.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub percent: u8,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run through an ordered question list.
///
/// Holds the answer store, the step cursor and the transient free-text draft.
/// Every mutation is a plain `&mut self` call; the async submission lives in
/// the services layer, which moves the session between phases.
#[derive(Clone)]
pub struct QuizSession {
    questions: QuestionSet,
    config: QuizConfig,
    clock: Clock,
    cursor: usize,
    answers: BTreeMap<usize, String>,
    free_text_draft: String,
    phase: QuizPhase,
    step_entered_at: DateTime<Utc>,
}

impl QuizSession {
    #[must_use]
    pub fn new(questions: QuestionSet, config: QuizConfig, clock: Clock) -> Self {
        let step_entered_at = clock.now();
        Self {
            questions,
            config,
            clock,
            cursor: 0,
            answers: BTreeMap::new(),
            free_text_draft: String::new(),
            phase: QuizPhase::Answering,
            step_entered_at,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn config(&self) -> QuizConfig {
        self.config
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn free_text_draft(&self) -> &str {
        &self.free_text_draft
    }

    #[must_use]
    pub fn answer(&self, step: usize) -> Option<&str> {
        self.answers.get(&step).map(String::as_str)
    }

    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.cursor == self.questions.last_index()
    }

    /// Replace the clock, e.g. to let time pass in tests of timed quizzes.
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.questions.len();
        let position = self.cursor + 1;
        let percent = u8::try_from(position * 100 / total.max(1)).unwrap_or(100);
        QuizProgress {
            position,
            total,
            answered: self.answers.values().filter(|v| !v.is_empty()).count(),
            percent,
        }
    }

    /// Completion gate: a recorded answer or a non-blank draft for the current step.
    #[must_use]
    pub fn has_answer(&self) -> bool {
        let recorded = self
            .answers
            .get(&self.cursor)
            .is_some_and(|value| !value.is_empty());
        recorded || !self.free_text_draft.trim().is_empty()
    }

    /// Record `value` for `step`, overwriting any prior value. The cursor does not move.
    ///
    /// # Errors
    ///
    /// Returns `Blocked` when the session is not answerable, the step is out of
    /// range, or the dwell time for a timed quiz has not elapsed yet.
    pub fn select_answer(&mut self, step: usize, value: impl Into<String>) -> Result<(), Blocked> {
        self.ensure_navigable()?;
        if step >= self.questions.len() {
            return Err(Blocked::OutOfRange { step });
        }
        self.ensure_dwell_elapsed()?;
        self.answers.insert(step, value.into());
        Ok(())
    }

    /// Pick a value for the current step, advancing right away when the quiz
    /// is configured to auto-advance.
    ///
    /// # Errors
    ///
    /// Same as [`Self::select_answer`] and [`Self::advance`].
    pub fn choose(&mut self, value: impl Into<String>) -> Result<Option<Advance>, Blocked> {
        self.select_answer(self.cursor, value)?;
        if self.config.auto_advance {
            return self.advance().map(Some);
        }
        Ok(None)
    }

    /// Update the free-text draft for the current step.
    ///
    /// The draft and a predefined selection may coexist; `advance` decides
    /// which one wins.
    pub fn set_free_text(&mut self, text: impl Into<String>) {
        if self.phase == QuizPhase::Answering {
            self.free_text_draft = text.into();
        }
    }

    /// Move to the next step, or fire the submission from the last one.
    ///
    /// A non-blank draft overrides the predefined selection for this step.
    ///
    /// # Errors
    ///
    /// Returns `Blocked` and leaves the session untouched when the gate rejects.
    pub fn advance(&mut self) -> Result<Advance, Blocked> {
        self.ensure_navigable()?;
        self.ensure_dwell_elapsed()?;
        if !self.has_answer() {
            return Err(Blocked::NoAnswer);
        }

        let draft = self.free_text_draft.trim();
        if !draft.is_empty() {
            let draft = draft.to_string();
            self.answers.insert(self.cursor, draft);
        }
        self.free_text_draft.clear();

        if self.is_last_step() {
            let submission = self.package();
            self.phase = QuizPhase::Pending;
            debug!(answers = submission.answers.len(), "quiz submission fired");
            return Ok(Advance::Submitted(submission));
        }

        self.cursor += 1;
        self.step_entered_at = self.clock.now();
        debug!(step = self.cursor, "quiz advanced");
        Ok(Advance::Moved { step: self.cursor })
    }

    /// Step back one question. Recorded answers are kept.
    ///
    /// # Errors
    ///
    /// Returns `Blocked::AtStart` on the first step, or a phase block while
    /// pending or submitted.
    pub fn retreat(&mut self) -> Result<usize, Blocked> {
        self.ensure_navigable()?;
        if self.cursor == 0 {
            return Err(Blocked::AtStart);
        }
        self.cursor -= 1;
        self.free_text_draft.clear();
        self.step_entered_at = self.clock.now();
        debug!(step = self.cursor, "quiz retreated");
        Ok(self.cursor)
    }

    /// The external call succeeded; the session is closed to navigation.
    pub fn complete_submission(&mut self) {
        if self.phase == QuizPhase::Pending {
            self.phase = QuizPhase::ResultsVisible;
        }
    }

    /// The external call failed; answers survive and the last step is navigable again.
    pub fn fail_submission(&mut self) {
        if self.phase == QuizPhase::Pending {
            self.phase = QuizPhase::Answering;
        }
    }

    /// Back to the first step with nothing answered.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.answers.clear();
        self.free_text_draft.clear();
        self.phase = QuizPhase::Answering;
        self.step_entered_at = self.clock.now();
    }

    fn ensure_navigable(&self) -> Result<(), Blocked> {
        match self.phase {
            QuizPhase::Answering => Ok(()),
            QuizPhase::Pending => Err(Blocked::Pending),
            QuizPhase::ResultsVisible => Err(Blocked::Submitted),
        }
    }

    fn ensure_dwell_elapsed(&self) -> Result<(), Blocked> {
        let AnswerTiming::MinDwell(min) = self.config.timing else {
            return Ok(());
        };
        let elapsed = self.clock.elapsed_since(self.step_entered_at);
        if elapsed < min {
            let remaining = min - elapsed;
            // Round up so "0s remaining" never blocks.
            let remaining_secs = (remaining.num_milliseconds() + 999) / 1000;
            return Err(Blocked::DwellPending { remaining_secs });
        }
        Ok(())
    }

    fn package(&self) -> QuizSubmission {
        let mut submission = QuizSubmission::default();
        for (step, question) in self.questions.iter().enumerate() {
            let Some(value) = self.answers.get(&step).filter(|v| !v.is_empty()) else {
                continue;
            };
            if !question.is_predefined(value) {
                submission
                    .custom_inputs
                    .insert(question.id().clone(), value.clone());
            }
            submission
                .answers
                .insert(question.id().clone(), value.clone());
        }
        submission
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("cursor", &self.cursor)
            .field("answers_len", &self.answers.len())
            .field("phase", &self.phase)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
