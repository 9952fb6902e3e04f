use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::libquiz::kind::QuizKind;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("invalid quiz kind '{0}': must be CRD or MCQ")]
    InvalidKind(String),
    #[error("invalid deck name '{0}': must start with CRD_ or MCQ_")]
    InvalidDeckName(String),
    #[error("quiz already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("illegal database: {0}")]
    IllegalDeck(PathBuf),
    #[error("deck contains no rows")]
    NoRows,
    #[error("card {0} not found")]
    NotFound(i64),
    #[error("error in preparing statement")]
    Statement,
    #[error("cannot create deck table")]
    Schema(#[source] rusqlite::Error),
    #[error("multiple choice item has no options")]
    NoOptions,
    #[error("cannot store a {item} item in a {deck} deck")]
    KindMismatch { deck: QuizKind, item: QuizKind },
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DeckError>;
