//! Filter query language.
//!
//! A query string is either structured (`arch:aggro color:R cmc<3`) or free
//! text. It is parsed once into a [`Query`] and then evaluated against decks
//! or single cards.

mod eval;
mod parse;

pub use eval::{card_matches, deck_matches, Searchable};
pub use parse::{tokenize, Field, Operator, Query, Term};

use thiserror::Error;

/// Errors from strict query parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unsupported query term: {0}")]
    UnsupportedTerm(String),
}
