//! Fixed-interval review scheduler.
//!
//! The next review date depends only on the score ratio of the attempt just
//! completed:
//! - ratio >= 0.90: review again in 14 days
//! - ratio >= 0.70: 7 days
//! - ratio >= 0.50: 3 days
//! - anything lower: 1 day
//!
//! There is no per-topic ease factor and no memory of earlier intervals.
//! Days are added on the calendar, so the time of day is kept.

use super::quiz_attempt::validate_score;
use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Days, LocalResult, TimeZone, Utc};
use log::debug;

/// (numerator, denominator, days): the first row with
/// `score / total >= numerator / denominator` wins.
const INTERVAL_TABLE: [(u64, u64, u64); 3] = [(9, 10, 14), (7, 10, 7), (1, 2, 3)];
const FALLBACK_INTERVAL_DAYS: u64 = 1;

/// Review interval in days for a completed attempt.
pub fn interval_days(score: u32, total: u32) -> EngineResult<u64> {
    validate_score(score, total)?;

    // Compare ratios with integer cross-multiplication so boundaries are exact.
    let (score, total) = (u64::from(score), u64::from(total));
    let days = INTERVAL_TABLE
        .iter()
        .find(|&&(num, den, _)| score * den >= total * num)
        .map(|&(_, _, days)| days)
        .unwrap_or(FALLBACK_INTERVAL_DAYS);

    Ok(days)
}

/// Calculates when a topic should be reviewed next.
pub fn compute_next_review<Tz: TimeZone>(
    score: u32,
    total: u32,
    now: &DateTime<Tz>,
) -> EngineResult<DateTime<Tz>> {
    let days = interval_days(score, total)?;
    let wall_clock = now
        .naive_local()
        .checked_add_days(Days::new(days))
        .ok_or(EngineError::DateOutOfRange)?;
    let next = earliest_instant(now.timezone().from_local_datetime(&wall_clock))?;

    debug!("score {}/{} schedules next review in {} days", score, total, days);
    Ok(next)
}

/// Picks the earlier instant when a wall-clock time occurs twice (clocks set
/// back). A wall-clock time skipped by the zone has no instant.
fn earliest_instant<Tz: TimeZone>(
    mapped: LocalResult<DateTime<Tz>>,
) -> EngineResult<DateTime<Tz>> {
    mapped.earliest().ok_or(EngineError::DateOutOfRange)
}

/// A topic is due once its review date is set and not in the future.
/// Topics never attempted are never due.
pub fn is_due<Tz: TimeZone>(next_review: Option<&DateTime<Utc>>, now: &DateTime<Tz>) -> bool {
    let now = now.with_timezone(&Utc);
    next_review.is_some_and(|next| *next <= now)
}
