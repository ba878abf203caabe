pub mod aggregate;
pub mod flashcard;
pub mod quiz_attempt;
pub mod quiz_session;
pub mod scheduler;
pub mod streak;
pub mod subject;
pub mod topic;

pub use aggregate::{
    AccuracyTier, DailyProgress, GlobalStats, HistoryEntry, StudyPlanEntry, attempt_history,
    daily_progress, global_stats, study_plan, subject_mastery,
};
pub use flashcard::Flashcard;
pub use quiz_attempt::{QuizAttempt, QuizQuestion};
pub use quiz_session::{QuizOutcome, complete_quiz};
pub use scheduler::{compute_next_review, is_due};
pub use streak::{StreakState, advance_streak};
pub use subject::Subject;
pub use topic::{ChatMessage, ChatRole, Note, Topic, TopicStatus};
