use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("question set is empty")]
    Empty,

    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),

    #[error("question {0} has no choices")]
    NoChoices(QuestionId),
}

/// A predefined answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    choices: Vec<Choice>,
}

impl Question {
    #[must_use]
    pub fn new(id: impl Into<QuestionId>, prompt: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            choices,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Whether `value` is one of this question's predefined choice values.
    #[must_use]
    pub fn is_predefined(&self, value: &str) -> bool {
        self.choices.iter().any(|choice| choice.value == value)
    }
}

/// Ordered, immutable question list a quiz session walks through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    /// # Errors
    ///
    /// Returns `QuestionSetError` if the list is empty, ids repeat, or a
    /// question has no choices.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionSetError> {
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if question.choices.is_empty() {
                return Err(QuestionSetError::NoChoices(question.id.clone()));
            }
            if !seen.insert(question.id.clone()) {
                return Err(QuestionSetError::DuplicateId(question.id.clone()));
            }
        }
        Ok(Self { questions })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    #[must_use]
    pub fn get(&self, step: usize) -> Option<&Question> {
        self.questions.get(step)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str) -> Question {
        Question::new(id, "Prompt?", vec![Choice::new("Yes", "yes")])
    }

    #[test]
    fn rejects_empty_set() {
        assert_eq!(QuestionSet::new(Vec::new()), Err(QuestionSetError::Empty));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = QuestionSet::new(vec![question("q1"), question("q1")]).unwrap_err();
        assert_eq!(err, QuestionSetError::DuplicateId(QuestionId::new("q1")));
    }

    #[test]
    fn rejects_question_without_choices() {
        let bare = Question::new("q1", "Prompt?", Vec::new());
        let err = QuestionSet::new(vec![bare]).unwrap_err();
        assert!(matches!(err, QuestionSetError::NoChoices(_)));
    }

    #[test]
    fn predefined_check_uses_values_not_labels() {
        let q = question("q1");
        assert!(q.is_predefined("yes"));
        assert!(!q.is_predefined("Yes"));
    }
}
