//! Immutable record of one completed quiz.
//!
//! An attempt keeps a snapshot of the exact questions shown and the answers
//! given, so a past quiz can be replayed in review mode regardless of later
//! edits to the topic. Attempts can only be built through validating
//! constructors (or deserialized through the same validation), which keeps
//! `0 <= score <= total` and `total > 0` true for every value in memory.

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One multiple-choice question as it was presented to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_reused: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawQuizAttempt")]
pub struct QuizAttempt {
    id: String,
    date: DateTime<Utc>,
    score: u32,
    total: u32,
    questions: Vec<QuizQuestion>,
    user_answers: Vec<Option<usize>>,
    is_retry: bool,
    is_reviewed: bool,
}

/// Wire shape of an attempt before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuizAttempt {
    id: String,
    date: DateTime<Utc>,
    score: u32,
    total: u32,
    #[serde(default)]
    questions: Vec<QuizQuestion>,
    #[serde(default)]
    user_answers: Vec<Option<usize>>,
    #[serde(default)]
    is_retry: bool,
    #[serde(default)]
    is_reviewed: bool,
}

impl TryFrom<RawQuizAttempt> for QuizAttempt {
    type Error = EngineError;

    fn try_from(raw: RawQuizAttempt) -> Result<Self, Self::Error> {
        if raw.id.trim().is_empty() {
            return Err(EngineError::InvalidRecord(
                "quiz attempt without id".to_string(),
            ));
        }
        let mut attempt = QuizAttempt::new(
            raw.id,
            raw.date,
            raw.score,
            raw.total,
            raw.questions,
            raw.user_answers,
            raw.is_retry,
        )?;
        attempt.is_reviewed = raw.is_reviewed;
        Ok(attempt)
    }
}

/// Rejects a score/total pair that cannot describe a completed quiz.
pub fn validate_score(score: u32, total: u32) -> EngineResult<()> {
    if total == 0 {
        return Err(EngineError::InvalidAttempt(
            "total must be greater than zero".to_string(),
        ));
    }
    if score > total {
        return Err(EngineError::InvalidAttempt(format!(
            "score {} exceeds total {}",
            score, total
        )));
    }
    Ok(())
}

impl QuizAttempt {
    pub fn new(
        id: String,
        date: DateTime<Utc>,
        score: u32,
        total: u32,
        questions: Vec<QuizQuestion>,
        user_answers: Vec<Option<usize>>,
        is_retry: bool,
    ) -> EngineResult<Self> {
        validate_score(score, total)?;

        if !questions.is_empty() && questions.len() != user_answers.len() {
            return Err(EngineError::InvalidAttempt(format!(
                "{} answers recorded for {} questions",
                user_answers.len(),
                questions.len()
            )));
        }

        Ok(Self {
            id,
            date,
            score,
            total,
            questions,
            user_answers,
            is_retry,
            is_reviewed: false,
        })
    }

    /// Grades a finished quiz. The score is the number of answers matching
    /// each question's correct option; unanswered questions count as wrong.
    pub fn grade<Tz: TimeZone>(
        questions: Vec<QuizQuestion>,
        user_answers: Vec<Option<usize>>,
        is_retry: bool,
        now: &DateTime<Tz>,
    ) -> EngineResult<Self> {
        if questions.len() != user_answers.len() {
            return Err(EngineError::InvalidAttempt(format!(
                "{} answers recorded for {} questions",
                user_answers.len(),
                questions.len()
            )));
        }

        let score = questions
            .iter()
            .zip(&user_answers)
            .filter(|(question, answer)| **answer == Some(question.correct_answer_index))
            .count();

        let total = u32::try_from(questions.len())
            .map_err(|_| EngineError::InvalidAttempt("too many questions".to_string()))?;
        // score <= total, so it fits as well
        let score = score as u32;

        Self::new(
            uuid::Uuid::new_v4().to_string(),
            now.with_timezone(&Utc),
            score,
            total,
            questions,
            user_answers,
            is_retry,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn user_answers(&self) -> &[Option<usize>] {
        &self.user_answers
    }

    pub fn is_retry(&self) -> bool {
        self.is_retry
    }

    pub fn is_reviewed(&self) -> bool {
        self.is_reviewed
    }

    /// Fraction of correct answers in `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        f64::from(self.score) / f64::from(self.total)
    }

    /// Score as a rounded percentage.
    pub fn percent(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }
}
