//! Term extraction for the string storage: tokenizers splitting raw byte
//! strings into searchable terms, and the [`TermExtractor`] policy built on
//! top of them.

pub mod terms;
pub mod tokenizers;

pub use terms::TermExtractor;
pub use tokenizers::{Tokenizer, TokenizerKind, TokenizerType, create_tokenizer};
