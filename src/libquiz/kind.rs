use std::fmt;

use crate::libquiz::error::{DeckError, Result};

/// The kind of quiz stored in a deck file.
///
/// `Unspecified` only ever shows up as an error sentinel and is never written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuizKind {
    #[default]
    Unspecified,
    Flashcard,
    MultipleChoice,
}

impl QuizKind {
    /// The 3-letter tag used as the deck file prefix.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            QuizKind::Flashcard => Some("CRD"),
            QuizKind::MultipleChoice => Some("MCQ"),
            QuizKind::Unspecified => None,
        }
    }

    pub fn require_tag(self) -> Result<&'static str> {
        self.tag()
            .ok_or_else(|| DeckError::InvalidKind(self.to_string()))
    }

    pub fn from_tag(tag: &str) -> Option<QuizKind> {
        match tag {
            "CRD" => Some(QuizKind::Flashcard),
            "MCQ" => Some(QuizKind::MultipleChoice),
            _ => None,
        }
    }

    /// Data columns of the `cards` table, in storage order, excluding `id`.
    pub(crate) fn columns(self) -> &'static [&'static str] {
        match self {
            QuizKind::Flashcard => &["question", "answer"],
            QuizKind::MultipleChoice => &["question", "options", "answer"],
            QuizKind::Unspecified => &[],
        }
    }
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().unwrap_or("Unknown"))
    }
}
