//! Term extraction policy of the string storage.

use itertools::Itertools;
use lexis_common::Result;

use crate::tokenizers::{SeparatorTokenizer, Tokenizer, TokenizerType, create_tokenizer};

/// Term standing for a string without any token. Every indexed string has
/// at least one term, so a string made of separators only is still reachable
/// through this one.
pub const SENTINEL_TERM: &[u8] = b"";

/// Decomposes strings into the terms they are indexed and searched by.
#[derive(Debug, Clone)]
pub struct TermExtractor {
    tokenizer: TokenizerType,
}

impl TermExtractor {
    pub fn new(tokenizer: TokenizerType) -> Self {
        Self { tokenizer }
    }

    /// Extractor built from a tokenizer name and a separator set.
    pub fn with_tokenizer(name: &str, separators: &[u8]) -> Result<Self> {
        Ok(Self::new(create_tokenizer(name, separators)?))
    }

    pub fn tokenizer(&self) -> &TokenizerType {
        &self.tokenizer
    }

    /// Leading term of `input`, or the sentinel when it has none.
    pub fn first_term<'a>(&'a self, input: &'a [u8]) -> &'a [u8] {
        self.tokenizer.tokenize(input).next().unwrap_or(SENTINEL_TERM)
    }

    /// Distinct terms of `input` in order of first occurrence, or the single
    /// sentinel term when it has none.
    pub fn terms<'a>(&'a self, input: &'a [u8]) -> Vec<&'a [u8]> {
        let terms: Vec<&[u8]> = self.tokenizer.tokenize(input).unique().collect();
        if terms.is_empty() {
            vec![SENTINEL_TERM]
        } else {
            terms
        }
    }
}

impl Default for TermExtractor {
    fn default() -> Self {
        Self::new(TokenizerType::Separators(SeparatorTokenizer::default()))
    }
}
