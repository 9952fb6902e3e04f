use log::{debug, error, info, warn};
use rusqlite::{params, Connection, OpenFlags, Result as SqlResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::libquiz::error::{DeckError, Result};
use crate::libquiz::item::Item;
use crate::libquiz::kind::QuizKind;
use crate::libquiz::library::{classify, Library};
use crate::libquiz::options;

/// An open deck file. The connection is closed when the deck is dropped or
/// passed to [`Deck::close`].
#[derive(Debug)]
pub struct Deck {
    connection: Connection,
    kind: QuizKind,
    path: PathBuf,
}

impl Deck {
    /// Creates `<root>/<TAG>_<name>.db` with the table for `kind` and closes it again.
    pub fn create(library: &Library, name: &str, kind: QuizKind) -> Result<PathBuf> {
        let path = library.deck_path(name, kind)?;
        if path.exists() {
            warn!("[DB] Deck {:?} already exists", path);
            return Err(DeckError::AlreadyExists(path));
        }

        let now = Instant::now();
        info!("[DB] Creating new {} deck {:?}", kind, path);
        let connection = Connection::open(&path)?;
        if let Err(err) = init_deck(&connection, kind) {
            close_connection(connection)?;
            if let Err(io_err) = fs::remove_file(&path) {
                warn!("[DB] Cannot remove half-created deck {:?}: {}", path, io_err);
            }
            return Err(err);
        }
        close_connection(connection)?;
        debug!("[DB] Creating took {} ms.", now.elapsed().as_millis());
        Ok(path)
    }

    /// Opens an existing deck by file name and checks its table against the
    /// kind its prefix claims.
    pub fn open(library: &Library, file_name: &str) -> Result<Deck> {
        let kind = classify(file_name).map_err(|_| DeckError::InvalidKind(file_name.to_string()))?;
        let path = library.file_path(file_name);

        let now = Instant::now();
        info!("[DB] Opening {} deck {:?}", kind, path);
        let connection = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        if !has_layout(&connection, kind) {
            error!("[DB] {:?} does not hold a valid {} table", path, kind);
            if let Err(err) = close_connection(connection) {
                warn!("[DB] Failed to close rejected deck: {}", err);
            }
            return Err(DeckError::IllegalDeck(path));
        }

        debug!("[DB] Opening took {} ms.", now.elapsed().as_millis());
        Ok(Deck {
            connection,
            kind,
            path,
        })
    }

    pub fn kind(&self) -> QuizKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn close(self) -> Result<()> {
        close_connection(self.connection)
    }

    pub fn parse(&self) -> Result<Vec<Item>> {
        parse_deck(&self.connection, self.kind)
    }

    /// Stores a new item and returns the row id the engine assigned to it.
    /// The item's own `id` is ignored.
    pub fn insert(&self, item: &Item) -> Result<i64> {
        self.check_item(item)?;
        let inserted = match item {
            Item::Card(card) => self
                .connection
                .prepare("INSERT INTO cards (question, answer) VALUES (?1, ?2)")
                .and_then(|mut statement| statement.execute(params![card.question, card.answer])),
            Item::Mcq(mcq) => self
                .connection
                .prepare("INSERT INTO cards (question, answer, options) VALUES (?1, ?2, ?3)")
                .and_then(|mut statement| {
                    statement.execute(params![
                        mcq.question,
                        mcq.answer,
                        options::encode(&mcq.options)
                    ])
                }),
        };
        if let Err(err) = inserted {
            error!("[DB] Error while inserting into {:?}: {:?}", self.path, err);
            return Err(DeckError::Statement);
        }

        let id = self.connection.last_insert_rowid();
        debug!("[DB] Inserted card {} into {:?}", id, self.path);
        Ok(id)
    }

    pub fn retrieve(&self, id: i64) -> Result<Item> {
        let sql = format!("{} WHERE rowid = ?1", select_sql(self.kind)?);
        let decode = Item::decoder(self.kind)?;
        let mut statement = self.connection.prepare(&sql).map_err(statement_error)?;
        match statement.query_row(params![id], decode) {
            Ok(item) => Ok(item),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(DeckError::NotFound(id)),
            Err(err) => {
                error!("[DB] Error while reading card {}: {:?}", id, err);
                Err(err.into())
            }
        }
    }

    /// Like [`Deck::retrieve`], but hands back the kind's empty item on failure.
    pub fn retrieve_or_empty(&self, id: i64) -> Result<Item> {
        self.retrieve(id).or_else(|err| {
            debug!("[DB] Card {} unavailable: {}", id, err);
            Item::empty(self.kind)
        })
    }

    /// Overwrites every field of the row with `item.id()`.
    pub fn update(&self, item: &Item) -> Result<()> {
        self.check_item(item)?;
        let changed = match item {
            Item::Card(card) => {
                let mut statement = self
                    .connection
                    .prepare("UPDATE cards SET question = ?1, answer = ?2 WHERE rowid = ?3")
                    .map_err(statement_error)?;
                statement.execute(params![card.question, card.answer, card.id])?
            }
            Item::Mcq(mcq) => {
                let mut statement = self
                    .connection
                    .prepare(
                        "UPDATE cards SET question = ?1, answer = ?2, options = ?3 WHERE rowid = ?4",
                    )
                    .map_err(statement_error)?;
                statement.execute(params![
                    mcq.question,
                    mcq.answer,
                    options::encode(&mcq.options),
                    mcq.id
                ])?
            }
        };
        expect_single_row(changed, item.id())?;
        debug!("[DB] Updated card {} in {:?}", item.id(), self.path);
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let mut statement = self
            .connection
            .prepare("DELETE FROM cards WHERE rowid = ?1")
            .map_err(statement_error)?;
        let changed = statement.execute(params![id])?;
        expect_single_row(changed, id)?;
        debug!("[DB] Deleted card {} from {:?}", id, self.path);
        Ok(())
    }

    /// Inserts all items in one transaction; nothing is kept if any insert fails.
    pub fn import(&self, items: &[Item]) -> Result<Vec<i64>> {
        let now = Instant::now();
        let transaction = self.connection.unchecked_transaction()?;
        let ids = items
            .iter()
            .map(|item| self.insert(item))
            .collect::<Result<Vec<i64>>>()?;
        transaction.commit()?;
        debug!(
            "[DB] Imported {} cards in {} ms.",
            ids.len(),
            now.elapsed().as_millis()
        );
        Ok(ids)
    }

    fn check_item(&self, item: &Item) -> Result<()> {
        if item.kind() != self.kind {
            return Err(DeckError::KindMismatch {
                deck: self.kind,
                item: item.kind(),
            });
        }
        match item {
            Item::Mcq(mcq) if mcq.options.is_empty() => Err(DeckError::NoOptions),
            _ => Ok(()),
        }
    }
}

/// Reads every row of the deck in storage order. An empty table is reported
/// as [`DeckError::NoRows`].
pub fn parse_deck(connection: &Connection, kind: QuizKind) -> Result<Vec<Item>> {
    let now = Instant::now();
    let decode = Item::decoder(kind)?;
    let mut statement = connection.prepare(&select_sql(kind)?)?;
    let items = statement
        .query_map([], decode)?
        .collect::<SqlResult<Vec<Item>>>()?;

    if items.is_empty() {
        return Err(DeckError::NoRows);
    }
    debug!(
        "[DB] Parsed {} cards in {} ms.",
        items.len(),
        now.elapsed().as_millis()
    );
    Ok(items)
}

/// Creates the `cards` table for `kind`. Running it against a deck that
/// already has the table is a no-op.
pub fn init_deck(connection: &Connection, kind: QuizKind) -> Result<()> {
    let schema = match kind {
        QuizKind::Flashcard => {
            "CREATE TABLE IF NOT EXISTS cards (
              id INTEGER PRIMARY KEY,
              question TEXT NOT NULL,
              answer TEXT NOT NULL
            )"
        }
        QuizKind::MultipleChoice => {
            "CREATE TABLE IF NOT EXISTS cards (
              id INTEGER PRIMARY KEY,
              question TEXT NOT NULL,
              options TEXT NOT NULL,
              answer TEXT NOT NULL
            )"
        }
        QuizKind::Unspecified => return Err(DeckError::InvalidKind(kind.to_string())),
    };
    connection.execute(schema, ()).map_err(|err| {
        error!("[DB INIT] Error while creating table cards: {:?}", err);
        DeckError::Schema(err)
    })?;
    info!("[DB INIT] Created {} table cards", kind);
    Ok(())
}

pub(crate) fn close_connection(connection: Connection) -> Result<()> {
    info!("[DB] Closing Database");
    match connection.close() {
        Ok(_) => Ok(()),
        Err((connection, err)) => {
            error!("[DB] Cannot close connection ({}). Retrying...", err);
            connection.close().map_err(|(_, err)| {
                error!("[DB] Cannot close connection! Giving up.");
                DeckError::from(err)
            })
        }
    }
}

// The table may carry an explicit `id` column or rely on the implicit rowid.
// Reading the first row makes damaged table pages fail here rather than later.
fn has_layout(connection: &Connection, kind: QuizKind) -> bool {
    let mut statement = match connection.prepare("SELECT * FROM cards") {
        Ok(statement) => statement,
        Err(err) => {
            debug!("[DB] Probe failed: {:?}", err);
            return false;
        }
    };
    let matches = {
        let columns: Vec<&str> = statement
            .column_names()
            .into_iter()
            .filter(|name| !name.eq_ignore_ascii_case("id"))
            .collect();
        columns.as_slice() == kind.columns()
    };
    if !matches {
        return false;
    }
    let first_row = statement.query([]).and_then(|mut rows| {
        let found = rows.next()?.is_some();
        Ok(found)
    });
    match first_row {
        Ok(_) => true,
        Err(err) => {
            debug!("[DB] Probe read failed: {:?}", err);
            false
        }
    }
}

fn select_sql(kind: QuizKind) -> Result<String> {
    kind.require_tag()?;
    Ok(format!("SELECT rowid, {} FROM cards", kind.columns().join(", ")))
}

fn statement_error(err: rusqlite::Error) -> DeckError {
    error!("[DB] Error in preparing statement: {:?}", err);
    DeckError::Statement
}

fn expect_single_row(changed: usize, id: i64) -> Result<()> {
    if changed == 0 {
        Err(DeckError::NotFound(id))
    } else {
        Ok(())
    }
}
