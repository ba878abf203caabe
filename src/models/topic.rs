//! Topic is a unit of study material with its quiz history and review schedule.
use super::scheduler;
use super::{Flashcard, QuizAttempt};
use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub text: String,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// Progress badge derived from the latest attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopicStatus {
    Pending,
    InProgress,
    Mastered,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
    /// Newest first.
    #[serde(default)]
    quiz_history: Vec<QuizAttempt>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review_date: Option<DateTime<Utc>>,
}

impl Topic {
    pub fn new(name: &str, content: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            content: content.to_string(),
            summary: None,
            flashcards: Vec::new(),
            quiz_history: Vec::new(),
            chat_history: Vec::new(),
            notes: Vec::new(),
            next_review_date: None,
        }
    }

    pub fn quiz_history(&self) -> &[QuizAttempt] {
        &self.quiz_history
    }

    /// Head of the history, if the topic was ever quizzed.
    pub fn latest_attempt(&self) -> Option<&QuizAttempt> {
        self.quiz_history.first()
    }

    /// Prepends an attempt. History is never edited in place.
    pub fn record_attempt(&mut self, attempt: QuizAttempt) {
        self.quiz_history.insert(0, attempt);
    }

    /// Appends a note and returns its id.
    pub fn add_note(&mut self, text: &str, date: DateTime<Utc>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.notes.push(Note {
            id: id.clone(),
            text: text.to_string(),
            date,
        });
        id
    }

    /// Removes a note by id. Returns false when no note matched.
    pub fn remove_note(&mut self, note_id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != note_id);
        self.notes.len() != before
    }

    pub fn is_due<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        scheduler::is_due(self.next_review_date.as_ref(), now)
    }

    pub fn is_mastered(&self, threshold: f64) -> bool {
        self.latest_attempt()
            .is_some_and(|attempt| attempt.ratio() >= threshold)
    }

    pub fn status(&self, threshold: f64) -> TopicStatus {
        match self.latest_attempt() {
            None => TopicStatus::Pending,
            Some(attempt) if attempt.ratio() >= threshold => TopicStatus::Mastered,
            Some(_) => TopicStatus::InProgress,
        }
    }

    pub(crate) fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidRecord("topic without id".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidRecord(format!(
                "topic {} has an empty name",
                self.id
            )));
        }
        Ok(())
    }
}
