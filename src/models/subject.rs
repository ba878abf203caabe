//! Subject is a named set of topics owned by one user
use super::Topic;
use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

impl Subject {
    pub fn new(owner_id: &str, name: &str, icon: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            topics: Vec::new(),
        }
    }

    /// Parses and validates a subject document.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let subject: Subject = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidRecord(format!("malformed subject: {}", e)))?;
        subject.validate()?;
        Ok(subject)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidRecord("subject without id".to_string()));
        }
        if self.owner_id.trim().is_empty() {
            return Err(EngineError::InvalidRecord(format!(
                "subject {} has no owner",
                self.id
            )));
        }

        let mut seen = HashSet::new();
        for topic in &self.topics {
            topic.validate()?;
            if !seen.insert(topic.id.as_str()) {
                return Err(EngineError::InvalidRecord(format!(
                    "duplicate topic id {} in subject {}",
                    topic.id, self.id
                )));
            }
        }
        Ok(())
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    /// Swaps in an updated copy of an existing topic. Returns false when the
    /// subject has no topic with that id.
    pub fn replace_topic(&mut self, topic: Topic) -> bool {
        match self.topics.iter_mut().find(|t| t.id == topic.id) {
            Some(slot) => {
                *slot = topic;
                true
            }
            None => false,
        }
    }

    /// Removes a topic along with its history and notes.
    pub fn remove_topic(&mut self, topic_id: &str) -> Option<Topic> {
        let index = self.topics.iter().position(|t| t.id == topic_id)?;
        Some(self.topics.remove(index))
    }

    pub fn due_count<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> usize {
        self.topics.iter().filter(|t| t.is_due(now)).count()
    }

    pub fn note_count(&self) -> usize {
        self.topics.iter().map(|t| t.notes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_subject_creation() {
        let subject = Subject::new("user-1", "Biology", "dna");
        assert_eq!(subject.owner_id, "user-1");
        assert!(subject.topics.is_empty());
        assert!(subject.validate().is_ok());
    }

    #[test]
    fn test_replace_topic() {
        let mut subject = Subject::new("user-1", "Biology", "dna");
        let topic = Topic::new("Cells", "");
        subject.topics.push(topic.clone());

        let mut updated = topic.clone();
        updated.content = "Updated".to_string();
        assert!(subject.replace_topic(updated));
        assert_eq!(subject.topics[0].content, "Updated");

        assert!(!subject.replace_topic(Topic::new("Unknown", "")));
        assert_eq!(subject.topics.len(), 1);
    }

    #[test]
    fn test_remove_topic_keeps_order() {
        let mut subject = Subject::new("user-1", "Biology", "dna");
        for name in ["Cells", "Genetics", "Ecology"] {
            subject.topics.push(Topic::new(name, ""));
        }
        let genetics_id = subject.topics[1].id.clone();

        let removed = subject.remove_topic(&genetics_id).unwrap();
        assert_eq!(removed.name, "Genetics");
        let names: Vec<&str> = subject.topics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Cells", "Ecology"]);

        assert!(subject.remove_topic(&genetics_id).is_none());
    }

    #[test]
    fn test_counters() {
        let now = Utc::now();
        let mut subject = Subject::new("user-1", "Biology", "dna");

        let mut due = Topic::new("Cells", "");
        due.next_review_date = Some(now - Duration::days(1));
        due.add_note("remember mitosis", now);
        due.add_note("and meiosis", now);

        let mut later = Topic::new("Genetics", "");
        later.next_review_date = Some(now + Duration::days(3));
        later.add_note("Mendel", now);

        subject.topics.push(due);
        subject.topics.push(later);
        subject.topics.push(Topic::new("Ecology", ""));

        assert_eq!(subject.due_count(&now), 1);
        assert_eq!(subject.note_count(), 3);
    }

    #[test]
    fn test_from_json_rejects_missing_owner() {
        let json = r#"{"id": "s1", "name": "Biology", "topics": []}"#;
        assert!(matches!(
            Subject::from_json(json),
            Err(EngineError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_duplicate_topics() {
        let json = r#"{
            "id": "s1", "ownerId": "u1", "name": "Biology",
            "topics": [
                {"id": "t1", "name": "Cells"},
                {"id": "t1", "name": "Cells again"}
            ]
        }"#;
        assert!(matches!(
            Subject::from_json(json),
            Err(EngineError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_invalid_attempt() {
        let json = r#"{
            "id": "s1", "ownerId": "u1", "name": "Biology",
            "topics": [{
                "id": "t1", "name": "Cells",
                "quizHistory": [{"id": "a", "date": "2024-01-01T10:00:00Z", "score": 5, "total": 0}]
            }]
        }"#;
        assert!(Subject::from_json(json).is_err());
    }
}
