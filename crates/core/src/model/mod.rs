mod ids;
mod question;
mod quiz;
mod result;
mod sprint;

pub use ids::{QuestionId, RoadmapId, TaskId, UserId};
pub use question::{Choice, Question, QuestionSet, QuestionSetError};
pub use quiz::{
    Advance, AnswerTiming, Blocked, QuizConfig, QuizPhase, QuizProgress, QuizSession,
    QuizSubmission,
};
pub use result::{
    DiscoverProfile, FitLevel, LearningResource, PersonalityAxis, RoleOption, Roadmap,
    RoadmapPhase, StreamFit, StreamOption,
};
pub use sprint::{
    CompletionMap, ResourceRef, SPRINT_WEEKS, SprintPlan, SprintPlanError, SprintTask,
    SprintWeek, TASKS_PER_WEEK,
};
