//! Client for the language-model completion endpoint used to answer
//! questions about a book.
//!
//! [`Completion`] is the seam services depend on; [`YandexGpt`] is the HTTP
//! implementation. Every failure is an [`error::ErrorKind`], and none of them
//! are retried here.

mod client;
mod config;
pub mod error;
mod prompt;

pub use crate::client::{Completion, YandexGpt};
pub use crate::config::{DEFAULT_URL, LlmConfig};
pub use crate::prompt::system_prompt;
