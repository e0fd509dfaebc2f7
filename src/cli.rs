use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "shelf", version)]
#[command(about = "Browse, search and ask about a local book library", long_about = None)]
pub struct Cli {
    /// Configuration file (toml, yaml or json).
    #[arg(short, long, global = true, env = "SHELF_CONFIG")]
    pub config: Option<PathBuf>,
    /// More logging; repeat for more. `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rebuild the catalog from the library directory.
    Sync,
    /// List genres.
    Genres,
    /// Show one page of a genre.
    Browse {
        genre_id: i64,
        #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
        page: i64,
    },
    /// Fuzzy search by title or author.
    Search {
        query: String,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(short, long)]
        min_score: Option<f64>,
    },
    /// List the formats a book is available in.
    Files { book_id: i64 },
    /// Print where one format of a book can be delivered from.
    Locate { book_id: i64, format: String },
    /// Ask a question about a book, counted against the user's daily quota.
    Ask {
        #[arg(short, long)]
        user: i64,
        book_id: i64,
        question: String,
    },
    /// Show how much of today's quota a user has used.
    Quota {
        #[arg(short, long)]
        user: i64,
    },
}
