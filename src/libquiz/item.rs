use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::libquiz::error::{DeckError, Result};
use crate::libquiz::kind::QuizKind;
use crate::libquiz::options;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardItem {
    #[serde(default)]
    pub id: i64,
    pub question: String,
    pub answer: String,
}

/// A multiple-choice question. `answer` is expected to be one of `options`, but
/// that is left to whoever builds the item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqItem {
    #[serde(default)]
    pub id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// One row of a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Card(CardItem),
    Mcq(McqItem),
}

impl CardItem {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        CardItem {
            id: 0,
            question: question.into(),
            answer: answer.into(),
        }
    }

    // rowid, question, answer
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<CardItem> {
        Ok(CardItem {
            id: row.get(0)?,
            question: row.get(1)?,
            answer: row.get(2)?,
        })
    }
}

impl McqItem {
    pub fn new<S: Into<String>>(
        question: impl Into<String>,
        options: impl IntoIterator<Item = S>,
        answer: impl Into<String>,
    ) -> Self {
        McqItem {
            id: 0,
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            answer: answer.into(),
        }
    }

    // rowid, question, options, answer
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<McqItem> {
        Ok(McqItem {
            id: row.get(0)?,
            question: row.get(1)?,
            options: options::decode(&row.get::<usize, String>(2)?),
            answer: row.get(3)?,
        })
    }
}

impl Item {
    /// The zero value for `kind`, handed back where a read produced nothing.
    pub fn empty(kind: QuizKind) -> Result<Item> {
        match kind {
            QuizKind::Flashcard => Ok(Item::Card(CardItem::default())),
            QuizKind::MultipleChoice => Ok(Item::Mcq(McqItem::default())),
            QuizKind::Unspecified => Err(DeckError::InvalidKind(kind.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Item::Card(card) => *card == CardItem::default(),
            Item::Mcq(mcq) => *mcq == McqItem::default(),
        }
    }

    pub fn kind(&self) -> QuizKind {
        match self {
            Item::Card(_) => QuizKind::Flashcard,
            Item::Mcq(_) => QuizKind::MultipleChoice,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Item::Card(card) => card.id,
            Item::Mcq(mcq) => mcq.id,
        }
    }

    pub fn question(&self) -> &str {
        match self {
            Item::Card(card) => &card.question,
            Item::Mcq(mcq) => &mcq.question,
        }
    }

    pub fn answer(&self) -> &str {
        match self {
            Item::Card(card) => &card.answer,
            Item::Mcq(mcq) => &mcq.answer,
        }
    }

    /// Row decoder for a deck of `kind`.
    pub(crate) fn decoder(kind: QuizKind) -> Result<fn(&Row) -> rusqlite::Result<Item>> {
        match kind {
            QuizKind::Flashcard => Ok(card_from_row),
            QuizKind::MultipleChoice => Ok(mcq_from_row),
            QuizKind::Unspecified => Err(DeckError::InvalidKind(kind.to_string())),
        }
    }
}

fn card_from_row(row: &Row) -> rusqlite::Result<Item> {
    CardItem::from_row(row).map(Item::Card)
}

fn mcq_from_row(row: &Row) -> rusqlite::Result<Item> {
    McqItem::from_row(row).map(Item::Mcq)
}

impl From<CardItem> for Item {
    fn from(card: CardItem) -> Self {
        Item::Card(card)
    }
}

impl From<McqItem> for Item {
    fn from(mcq: McqItem) -> Self {
        Item::Mcq(mcq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_kind() {
        let card = Item::empty(QuizKind::Flashcard).unwrap();
        let mcq = Item::empty(QuizKind::MultipleChoice).unwrap();
        assert_eq!(card.kind(), QuizKind::Flashcard);
        assert_eq!(mcq.kind(), QuizKind::MultipleChoice);
        assert!(card.is_empty());
        assert!(mcq.is_empty());
    }

    #[test]
    fn unspecified_kind_has_no_item_shape() {
        assert!(matches!(
            Item::empty(QuizKind::Unspecified),
            Err(DeckError::InvalidKind(_))
        ));
        assert!(matches!(
            Item::decoder(QuizKind::Unspecified),
            Err(DeckError::InvalidKind(_))
        ));
    }

    #[test]
    fn filled_item_is_not_empty() {
        let item: Item = CardItem::new("What is the capital of France?", "Paris").into();
        assert!(!item.is_empty());
        assert_eq!(item.question(), "What is the capital of France?");
        assert_eq!(item.answer(), "Paris");
        assert_eq!(item.id(), 0);
    }

    #[test]
    fn json_is_tagged_by_kind() {
        let item: Item = McqItem::new("Capital of France?", ["Paris", "Rome"], "Paris").into();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "mcq");
        assert_eq!(json["options"][1], "Rome");

        let parsed: Item = serde_json::from_str(
            r#"{"kind":"card","question":"Tallest mountain?","answer":"Mount Everest"}"#,
        )
        .unwrap();
        assert_eq!(parsed, CardItem::new("Tallest mountain?", "Mount Everest").into());
    }
}
