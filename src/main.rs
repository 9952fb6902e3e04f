use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use env_logger::Env;
use log::{debug, error, info, warn};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use quizdeck::libquiz::db::Deck;
use quizdeck::libquiz::error::DeckError;
use quizdeck::libquiz::item::{CardItem, Item, McqItem};
use quizdeck::libquiz::kind::QuizKind;
use quizdeck::libquiz::library::Library;
use quizdeck::libquiz::options;

#[derive(Parser, Debug)]
#[command(name = "quizdeck")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, default_value = "error")]
    log_level: String,
    /// Directory holding the deck files [default: ~/.quiz]
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every valid deck in the root directory
    List,
    /// Create an empty deck
    Create {
        name: String,
        #[arg(short, long, value_enum)]
        kind: KindArg,
    },
    /// Print every item of a deck
    Show { deck: String },
    /// Add an item to a deck
    Add {
        deck: String,
        #[command(flatten)]
        item: ItemArgs,
    },
    /// Print a single item
    Get { deck: String, id: i64 },
    /// Replace the contents of an item
    Edit {
        deck: String,
        id: i64,
        #[command(flatten)]
        item: ItemArgs,
    },
    /// Remove an item
    Delete { deck: String, id: i64 },
    /// Print a deck as JSON
    Export { deck: String },
    /// Add every item from a JSON file to a deck
    Import { deck: String, json: PathBuf },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    /// Flashcards (question and answer)
    Crd,
    /// Multiple choice (question, options and answer)
    Mcq,
}

#[derive(clap::Args, Debug)]
struct ItemArgs {
    #[arg(short, long)]
    question: String,
    #[arg(short, long)]
    answer: String,
    /// Multiple choice option, repeat for each one
    #[arg(short, long = "option")]
    options: Vec<String>,
}

#[derive(Debug, Error)]
enum Error {
    #[error("cannot find a home directory, pass --root")]
    NoHome,
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error("cannot read {0:?}")]
    Read(PathBuf, #[source] io::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<KindArg> for QuizKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Crd => QuizKind::Flashcard,
            KindArg::Mcq => QuizKind::MultipleChoice,
        }
    }
}

impl ItemArgs {
    fn into_item(self, kind: QuizKind, id: i64) -> Result<Item, Error> {
        match kind {
            QuizKind::MultipleChoice => {
                if self.options.iter().any(|opt| opt.contains(options::SEPARATOR)) {
                    warn!("[Input] Options containing ',' are split apart when stored");
                }
                if !self.options.contains(&self.answer) {
                    warn!("[Input] Answer {:?} is not one of the options", self.answer);
                }
                Ok(Item::Mcq(McqItem {
                    id,
                    question: self.question,
                    options: self.options,
                    answer: self.answer,
                }))
            }
            QuizKind::Flashcard => {
                if !self.options.is_empty() {
                    warn!("[Input] Flashcard decks have no options, ignoring them");
                }
                Ok(Item::Card(CardItem {
                    id,
                    question: self.question,
                    answer: self.answer,
                }))
            }
            QuizKind::Unspecified => Err(DeckError::InvalidKind(kind.to_string()).into()),
        }
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str()))
        .init();

    if let Err(err) = run(args) {
        error!("{}", format!("{}", err).red());
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Error> {
    let root = match args.root {
        Some(root) => root,
        None => Library::default_root().ok_or(Error::NoHome)?,
    };
    let library = Library::find_or_create(root)?;
    debug!("[Setup] Library at {:?}", library.root());

    match args.command {
        Commands::List => list(&library),
        Commands::Create { name, kind } => {
            let path = Deck::create(&library, &name, kind.into())?;
            println!("{}", format!("Created {}", path.display()).green());
            Ok(())
        }
        Commands::Show { deck } => with_deck(&library, &deck, show),
        Commands::Add { deck, item } => with_deck(&library, &deck, |deck| {
            let id = deck.insert(&item.into_item(deck.kind(), 0)?)?;
            println!("{}", format!("Added card {}", id).green());
            Ok(())
        }),
        Commands::Get { deck, id } => with_deck(&library, &deck, |deck| {
            print_item(&deck.retrieve(id)?);
            Ok(())
        }),
        Commands::Edit { deck, id, item } => with_deck(&library, &deck, |deck| {
            deck.update(&item.into_item(deck.kind(), id)?)?;
            println!("{}", format!("Updated card {}", id).green());
            Ok(())
        }),
        Commands::Delete { deck, id } => with_deck(&library, &deck, |deck| {
            deck.delete(id)?;
            println!("{}", format!("Deleted card {}", id).green());
            Ok(())
        }),
        Commands::Export { deck } => with_deck(&library, &deck, |deck| {
            let items = match deck.parse() {
                Ok(items) => items,
                Err(DeckError::NoRows) => Vec::new(),
                Err(err) => return Err(err.into()),
            };
            println!("{}", serde_json::to_string_pretty(&items)?);
            Ok(())
        }),
        Commands::Import { deck, json } => with_deck(&library, &deck, |deck| {
            let content = std::fs::read_to_string(&json).map_err(|err| Error::Read(json.clone(), err))?;
            let items: Vec<Item> = serde_json::from_str(&content)?;
            info!("[Import] Importing {} cards from {:?}", items.len(), json);
            let ids = deck.import(&items)?;
            println!("{}", format!("Imported {} cards", ids.len()).green());
            Ok(())
        }),
    }
}

fn with_deck<F>(library: &Library, file_name: &str, action: F) -> Result<(), Error>
where
    F: FnOnce(&Deck) -> Result<(), Error>,
{
    let deck = Deck::open(library, file_name)?;
    let result = action(&deck);
    finish(deck, result)
}

fn finish(deck: Deck, result: Result<(), Error>) -> Result<(), Error> {
    let closed = deck.close();
    result?;
    closed.map_err(Error::from)
}

fn list(library: &Library) -> Result<(), Error> {
    let decks = library.decks()?;
    if decks.is_empty() {
        println!(
            "{}",
            format!("No decks in {}. Create one with `quizdeck create`.", library.root().display())
                .yellow()
        );
        return Ok(());
    }
    for deck in decks {
        println!(
            "{} {} ({} cards)",
            deck.kind.to_string().cyan().bold(),
            deck.file_name,
            deck.items
        );
    }
    Ok(())
}

fn show(deck: &Deck) -> Result<(), Error> {
    match deck.parse() {
        Ok(items) => {
            items.iter().for_each(print_item);
            Ok(())
        }
        Err(DeckError::NoRows) => {
            println!("{}", "This deck is empty.".yellow());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn print_item(item: &Item) {
    let leading = format!("{}. ", item.id());
    println!("{}{}", leading.cyan(), item.question().bold());
    let indent = " ".repeat(leading.len());
    match item {
        Item::Card(card) => println!("{}{}", indent, card.answer.green()),
        Item::Mcq(mcq) => {
            for (i, option) in mcq.options.iter().enumerate() {
                let line = format!("{}{}. {}", indent, i + 1, option);
                if *option == mcq.answer {
                    println!("{}", line.green());
                } else {
                    println!("{}", line);
                }
            }
        }
    }
}
