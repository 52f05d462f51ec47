//! Core data models for cube draft analytics.

mod card;
pub mod colors;
mod cube;
mod deck;
mod index;
mod stats;

pub use card::*;
pub use cube::*;
pub use deck::*;
pub use index::*;
pub use stats::*;
