//! Day-granular engagement streak.
use chrono::{DateTime, NaiveDate, TimeZone};
use log::debug;
use serde::{Deserialize, Serialize};

/// Streak as of the last completed review. `last_date` is `None` before the
/// first review and is stored as an empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub count: u32,
    #[serde(default, with = "calendar_day")]
    pub last_date: Option<NaiveDate>,
}

impl StreakState {
    /// Returns the state after one more completed review at `now`.
    ///
    /// Days are compared in the time zone of `now`:
    /// same day leaves the state untouched, the following day extends the
    /// streak, and anything else restarts it at 1.
    pub fn advance<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> StreakState {
        let today = now.date_naive();

        let next = match self.last_date {
            Some(last) if last == today => return self.clone(),
            Some(last) if today.pred_opt() == Some(last) => StreakState {
                count: self.count.saturating_add(1),
                last_date: Some(today),
            },
            _ => StreakState {
                count: 1,
                last_date: Some(today),
            },
        };

        debug!("streak {} -> {} on {}", self.count, next.count, today);
        next
    }
}

pub fn advance_streak<Tz: TimeZone>(state: &StreakState, now: &DateTime<Tz>) -> StreakState {
    state.advance(now)
}

pub(crate) mod calendar_day {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(value: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
        if value.trim().is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(value.trim(), FORMAT).map(Some)
    }

    pub fn format(date: Option<NaiveDate>) -> String {
        date.map(|d| d.format(FORMAT).to_string()).unwrap_or_default()
    }

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse(&value).map_err(serde::de::Error::custom)
    }
}
