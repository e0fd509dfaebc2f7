//! Fuzzy catalog search.
//!
//! A raw query goes through four stages:
//! - **Tokenize**: significant lowercase words (see [`Tokenizer`]).
//! - **Retrieve**: a loose substring filter, evaluated by whoever owns the
//!   catalog (see [`CandidateSource`]).
//! - **Score**: several similarity metrics per field plus match bonuses,
//!   weighted into a single value in `[0, 100]` (see [`Scorer`]).
//! - **Rank**: threshold, stable sort and truncation (see [`Ranker`]).
//!
//! Nothing in here knows about storage; the catalog crate plugs its
//! repository in as a [`CandidateSource`].

mod config;
pub mod error;
mod paginate;
mod rank;
mod retrieve;
mod score;
pub mod similarity;
mod tokenize;

pub use crate::config::SearchConfig;
pub use crate::paginate::{Pagination, paginate};
pub use crate::rank::Ranker;
pub use crate::retrieve::{CandidateSource, Entry, FRAGMENT_LEN, Retrieval};
pub use crate::score::{MAX_SCORE, PreparedQuery, Scorer};
pub use crate::tokenize::{Tokenizer, normalize_phrase};
