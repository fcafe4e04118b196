use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use log::debug;
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

mod cli;

use pctechlibrary::libpctech::calculator::{self, CalculatorError, Part, PartChoice};
use pctechlibrary::libpctech::clipboard::{Osc52Clipboard, SystemClipboard};
use pctechlibrary::libpctech::comments::{BoardConfig, BoardError, CommentBoard, DeleteOutcome};
use pctechlibrary::libpctech::content::{self, LibraryError};
use pctechlibrary::libpctech::controls::{CopyButton, CopyMethod};
use pctechlibrary::libpctech::db::{SqliteCommentStore, StoreError};
use pctechlibrary::libpctech::question::{self, CatalogError};
use pctechlibrary::libpctech::quiz::{Quiz, QuizConfig};
use pctechlibrary::libpctech::search::{Category, SearchConfig, SearchEngine};

#[derive(Parser, Debug)]
#[command(name = "PC Tech Library")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "error")]
    log_level: String,
    #[arg(short, long, value_name = "FILE", default_value = "comments.db")]
    db: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a shuffled multiple-choice quiz.
    Quiz {
        #[arg(short, long, default_value = "10")]
        question_count: usize,
    },
    /// Filter the knowledge base and highlight matches.
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(short, long, default_value = "all")]
        category: String,
        #[arg(long, value_name = "FILE")]
        library: Option<PathBuf>,
    },
    /// Read and write the comment board.
    Comments {
        #[command(subcommand)]
        action: CommentAction,
        #[arg(long, default_value = "50")]
        feed_limit: usize,
    },
    /// Estimate the price of a build. Parts take `PRICE` or `LABEL=PRICE`.
    Calc {
        #[arg(long)]
        cpu: Option<String>,
        #[arg(long)]
        gpu: Option<String>,
        #[arg(long)]
        ram: Option<String>,
        #[arg(long)]
        storage: Option<String>,
        #[arg(long)]
        psu: Option<String>,
        #[arg(long)]
        mobo: Option<String>,
    },
    /// Copy text to the clipboard.
    Copy { text: String },
}

#[derive(Subcommand, Debug)]
enum CommentAction {
    List {
        /// Print the rendered HTML instead of terminal output.
        #[arg(long)]
        html: bool,
    },
    Post {
        #[arg(short, long, default_value = "")]
        name: String,
        #[arg(short, long, default_value = "General")]
        topic: String,
        #[arg(short, long)]
        rating: Option<u8>,
        text: String,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Calculator(#[from] CalculatorError),
    #[error("unknown category {0:?}")]
    UnknownCategory(String),
    #[error("cannot talk to the terminal")]
    Io(#[from] io::Error),
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();
    debug!("[Setup] Args: {:?}", args.command);

    match args.command {
        Commands::Quiz { question_count } => {
            let mut quiz = Quiz::new(question::catalog()?, QuizConfig { question_count })?;
            cli::quiz_loop(&mut quiz)
        }
        Commands::Search {
            query,
            category,
            library,
        } => {
            let cards = match library {
                Some(path) => content::load_library(&path)?,
                None => content::default_library()?,
            };
            let mut engine = SearchEngine::new(cards, SearchConfig::default());

            let category = Category::parse(&category);
            if engine.set_category(category.clone()).is_none() {
                return Err(Error::UnknownCategory(category.to_string()));
            }
            let outcome = engine.apply_filter(query.trim());
            cli::print_search(&engine, &outcome);
            Ok(())
        }
        Commands::Comments { action, feed_limit } => {
            let store = SqliteCommentStore::create_or_open(&args.db)?;
            let config = BoardConfig {
                feed_limit,
                ..BoardConfig::default()
            };
            let mut board = CommentBoard::new(store, config)?;
            match action {
                CommentAction::List { html } => {
                    if html {
                        println!("{}", board.rendered());
                    } else {
                        cli::print_comments(board.comments());
                    }
                }
                CommentAction::Post {
                    name,
                    topic,
                    rating,
                    text,
                } => {
                    board.form.name = name;
                    board.form.topic = topic;
                    board.form.rating = rating;
                    board.form.text = text;
                    match board.submit(Instant::now()) {
                        Ok(id) => {
                            println!("{}", format!("Comment posted! ({})", id).bright_green());
                            cli::print_comments(board.comments());
                        }
                        Err(BoardError::EmptyBody) => {
                            println!("{}", "Please write something first.".bright_red());
                        }
                        Err(err) => println!("{}", err.to_string().bright_red()),
                    }
                }
                CommentAction::Delete { id, yes } => {
                    match board.delete(&id, |prompt| yes || cli::confirm(prompt)) {
                        DeleteOutcome::Cancelled => println!("{}", "Kept.".cyan()),
                        DeleteOutcome::Requested => {
                            board.pump();
                            println!("{}", "Deleted.".bright_green());
                            cli::print_comments(board.comments());
                        }
                        DeleteOutcome::Failed(alert) => println!("{}", alert.bright_red()),
                    }
                }
            }
            board.into_store().close()?;
            Ok(())
        }
        Commands::Calc {
            cpu,
            gpu,
            ram,
            storage,
            psu,
            mobo,
        } => {
            let parts = [
                (Part::Cpu, cpu),
                (Part::Gpu, gpu),
                (Part::Ram, ram),
                (Part::Storage, storage),
                (Part::Psu, psu),
                (Part::Motherboard, mobo),
            ];
            let mut choices = Vec::with_capacity(parts.len());
            for (part, raw) in parts {
                if let Some(raw) = raw {
                    choices.push(PartChoice::parse(part, &raw)?);
                }
            }
            match calculator::estimate(&choices) {
                Ok(estimate) => cli::print_estimate(&estimate),
                Err(CalculatorError::NoPartsSelected) => {
                    println!("{}", "Select at least one part! 😅".yellow())
                }
                Err(err) => return Err(err.into()),
            }
            Ok(())
        }
        Commands::Copy { text } => {
            let mut button = CopyButton::default();
            let mut fallback = Osc52Clipboard::new(io::stdout());
            let method =
                button.copy_text(&text, &mut SystemClipboard, &mut fallback, Instant::now());
            let how = match method {
                CopyMethod::Clipboard => "clipboard",
                CopyMethod::Fallback => "terminal",
            };
            println!("{} ({})", button.label(Instant::now()).bright_green(), how);
            Ok(())
        }
    }
}
