//! Runtime configuration read from the environment.
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "study.sqlite3";
pub const DEFAULT_OWNER: &str = "local";
pub const DEFAULT_DAILY_GOAL: u32 = 3;
pub const DEFAULT_MASTERY_THRESHOLD: f64 = 0.90;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub owner_id: String,
    pub daily_goal: u32,
    pub mastery_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            owner_id: DEFAULT_OWNER.to_string(),
            daily_goal: DEFAULT_DAILY_GOAL,
            mastery_threshold: DEFAULT_MASTERY_THRESHOLD,
        }
    }
}

impl Config {
    /// Reads `STUDY_DB_PATH`, `STUDY_OWNER`, `STUDY_DAILY_GOAL` and
    /// `STUDY_MASTERY_THRESHOLD`. Missing or unparsable values keep their default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_path = lookup("STUDY_DB_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let owner_id = lookup("STUDY_OWNER")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.owner_id);

        let daily_goal = lookup("STUDY_DAILY_GOAL")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(defaults.daily_goal);

        let mastery_threshold = lookup("STUDY_MASTERY_THRESHOLD")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| (0.0..=1.0).contains(value))
            .unwrap_or(defaults.mastery_threshold);

        Self {
            db_path,
            owner_id,
            daily_goal,
            mastery_threshold,
        }
    }
}
