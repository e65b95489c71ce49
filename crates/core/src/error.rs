use thiserror::Error;

use crate::model::{QuestionSetError, SprintPlanError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    #[error(transparent)]
    QuestionSet(#[from] QuestionSetError),
    #[error(transparent)]
    SprintPlan(#[from] SprintPlanError),
}
