//! Candidate retrieval structures
//!
//! - Token index: inverted index from catalog tokens to entries
//! - Result cache: bounded LRU of lookup outcomes, versioned per index build

pub mod cache;
pub mod token_index;

pub use cache::*;
pub use token_index::*;
