//! Completing a quiz on a topic.
//!
//! Turns a graded attempt into the new topic record and the new streak. Both
//! are computed in full before anything is returned, so the caller either
//! persists a consistent pair or nothing at all.

use super::{QuizAttempt, StreakState, Topic, scheduler};
use crate::error::EngineResult;
use chrono::{DateTime, TimeZone, Utc};
use log::debug;

/// Result of one completed quiz, ready to be written back by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizOutcome {
    pub topic: Topic,
    pub streak: StreakState,
    pub interval_days: u64,
    pub next_review_date: DateTime<Utc>,
}

/// Schedules the next review, advances the streak and prepends the attempt.
/// The streak advances whatever the score; retries schedule like any attempt.
pub fn complete_quiz<Tz: TimeZone>(
    topic: &Topic,
    streak: &StreakState,
    attempt: QuizAttempt,
    now: &DateTime<Tz>,
) -> EngineResult<QuizOutcome> {
    let interval_days = scheduler::interval_days(attempt.score(), attempt.total())?;
    let next_review_date =
        scheduler::compute_next_review(attempt.score(), attempt.total(), now)?.with_timezone(&Utc);
    let streak = streak.advance(now);

    let mut topic = topic.clone();
    topic.record_attempt(attempt);
    topic.next_review_date = Some(next_review_date);

    debug!(
        "topic '{}' reviewed, next review {} (streak {})",
        topic.name, next_review_date, streak.count
    );

    Ok(QuizOutcome {
        topic,
        streak,
        interval_days,
        next_review_date,
    })
}
