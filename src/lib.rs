pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use config::Config;
pub use error::{EngineError, EngineResult, StoreError, StoreResult};
pub use models::{QuizAttempt, StreakState, Subject, Topic};
