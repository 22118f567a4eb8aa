use std::iter;

use super::{Tokenizer, TokenizerKind};

/// Returns the whole input as its only term. Suited for identifier-like
/// strings searched by equality or prefix only.
#[derive(Debug, Clone, Default)]
pub struct TrivialTokenizer;

impl TrivialTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for TrivialTokenizer {
    type TokenIter<'a> = iter::Take<iter::Once<&'a [u8]>>;

    fn tokenize<'a>(&'a self, input: &'a [u8]) -> Self::TokenIter<'a> {
        iter::once(input).take(usize::from(!input.is_empty()))
    }

    fn kind(&self) -> TokenizerKind {
        TokenizerKind::Trivial
    }
}
