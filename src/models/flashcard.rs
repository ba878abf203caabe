//! Flashcard is a pair <front, back> generated from a topic's content
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub front: String,
    pub back: String,
}

impl Flashcard {
    pub fn new(front: &str, back: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            front: front.to_string(),
            back: back.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_creation() {
        let card = Flashcard::new("mitochondria", "powerhouse of the cell");

        assert_eq!(card.front, "mitochondria");
        assert_eq!(card.back, "powerhouse of the cell");
        assert!(!card.id.is_empty());
    }

    #[test]
    fn test_flashcards_get_distinct_ids() {
        let card1 = Flashcard::new("a", "b");
        let card2 = Flashcard::new("a", "b");
        assert_ne!(card1.id, card2.id);
    }
}
