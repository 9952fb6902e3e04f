//! Deck addressing inside a root storage directory.
//!
//! A deck named `capitals` of kind [`QuizKind::Flashcard`] lives at
//! `<root>/CRD_capitals.db`; the same name as a multiple-choice deck is
//! `<root>/MCQ_capitals.db`.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::libquiz::db::Deck;
use crate::libquiz::error::{DeckError, Result};
use crate::libquiz::kind::QuizKind;

pub const DECK_EXTENSION: &str = "db";
const DEFAULT_DIR: &str = ".quiz";

#[derive(Debug, Clone)]
pub struct Library {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckSummary {
    pub file_name: String,
    pub kind: QuizKind,
    pub items: usize,
}

/// `<TAG>_<name>.db`
pub fn deck_file_name(name: &str, kind: QuizKind) -> Result<String> {
    let tag = kind.require_tag()?;
    Ok(format!("{}_{}.{}", tag, name, DECK_EXTENSION))
}

/// Works out the kind of a deck from the `CRD_`/`MCQ_` prefix of its file name.
pub fn classify(file_name: &str) -> Result<QuizKind> {
    match file_name.get(..4) {
        Some("CRD_") => Ok(QuizKind::Flashcard),
        Some("MCQ_") => Ok(QuizKind::MultipleChoice),
        _ => Err(DeckError::InvalidDeckName(file_name.to_string())),
    }
}

impl Library {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Library { root: root.into() }
    }

    /// `~/.quiz`, or `None` if the platform reports no home directory.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_DIR))
    }

    pub fn find_or_create(root: impl Into<PathBuf>) -> Result<Self> {
        let library = Self::new(root);
        if !library.root.exists() {
            info!("[Library] Creating root directory {:?}", library.root);
            fs::create_dir_all(&library.root)?;
        }
        Ok(library)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn deck_path(&self, name: &str, kind: QuizKind) -> Result<PathBuf> {
        Ok(self.root.join(deck_file_name(name, kind)?))
    }

    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// File names directly inside the root, sorted.
    pub fn entries(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Every `.db` file in the root that opens and scans as a deck.
    pub fn decks(&self) -> Result<Vec<DeckSummary>> {
        let mut decks = Vec::new();
        for file_name in self.entries()? {
            if Path::new(&file_name).extension().and_then(|ext| ext.to_str())
                != Some(DECK_EXTENSION)
            {
                continue;
            }
            let deck = match Deck::open(self, &file_name) {
                Ok(deck) => deck,
                Err(err) => {
                    warn!("[Library] Skipping {}: {}", file_name, err);
                    continue;
                }
            };
            let items = match deck.parse() {
                Ok(items) => items.len(),
                Err(DeckError::NoRows) => 0,
                Err(err) => {
                    warn!("[Library] Skipping {}: {}", file_name, err);
                    continue;
                }
            };
            let kind = deck.kind();
            if let Err(err) = deck.close() {
                warn!("[Library] Cannot close {}: {}", file_name, err);
            }
            debug!("[Library] Found {} deck {} ({} items)", kind, file_name, items);
            decks.push(DeckSummary {
                file_name,
                kind,
                items,
            });
        }
        Ok(decks)
    }
}
