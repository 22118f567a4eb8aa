//! Tokenizers splitting raw byte strings into terms.
//!
//! The same tokenizer must be used when a string is indexed and when a query
//! is decomposed, otherwise the query terms never meet the indexed ones.
//! Tokenizers work on bytes: stored strings are not required to be UTF-8.

pub mod separators;
pub mod trivial;

use lexis_common::{Result, error::Error};
pub use separators::SeparatorTokenizer;
pub use trivial::TrivialTokenizer;

/// Separators used when none are configured.
pub const DEFAULT_SEPARATORS: &str = " _\t\n\r";

/// A tokenizer extracts terms from a raw byte string.
///
/// Terms are yielded as subslices of the input, in input order, and are never
/// empty. Duplicates are not removed at this level.
pub trait Tokenizer: Send + Sync {
    type TokenIter<'a>: Iterator<Item = &'a [u8]>
    where
        Self: 'a;

    fn tokenize<'a>(&'a self, input: &'a [u8]) -> Self::TokenIter<'a>;

    fn kind(&self) -> TokenizerKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Creates a tokenizer by name. `separators` is only used by the
/// `"separators"` tokenizer.
pub fn create_tokenizer(name: &str, separators: &[u8]) -> Result<TokenizerType> {
    match name.try_into()? {
        TokenizerKind::Separators => Ok(TokenizerType::Separators(SeparatorTokenizer::new(
            separators,
        ))),
        TokenizerKind::Trivial => Ok(TokenizerType::Trivial(TrivialTokenizer::new())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerKind {
    /// Splits the input on any byte of a configured separator set.
    Separators,
    /// Returns the whole input as a single term.
    Trivial,
}

impl TryFrom<&str> for TokenizerKind {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        match name {
            "separators" => Ok(TokenizerKind::Separators),
            "trivial" => Ok(TokenizerKind::Trivial),
            _ => Err(Error::invalid_arg(
                "tokenizer",
                format!("unrecognized tokenizer: {name}"),
            )),
        }
    }
}

impl TokenizerKind {
    pub const fn name(&self) -> &'static str {
        match self {
            TokenizerKind::Separators => "separators",
            TokenizerKind::Trivial => "trivial",
        }
    }
}

/// All available tokenizers, for configuration-driven selection.
#[derive(Debug, Clone)]
pub enum TokenizerType {
    Separators(SeparatorTokenizer),
    Trivial(TrivialTokenizer),
}

impl Tokenizer for TokenizerType {
    type TokenIter<'a> = Box<dyn Iterator<Item = &'a [u8]> + 'a>;

    fn tokenize<'a>(&'a self, input: &'a [u8]) -> Self::TokenIter<'a> {
        match self {
            TokenizerType::Separators(tokenizer) => Box::new(tokenizer.tokenize(input)),
            TokenizerType::Trivial(tokenizer) => Box::new(tokenizer.tokenize(input)),
        }
    }

    fn kind(&self) -> TokenizerKind {
        match self {
            TokenizerType::Separators(tokenizer) => tokenizer.kind(),
            TokenizerType::Trivial(tokenizer) => tokenizer.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tokenizer() {
        let separators = DEFAULT_SEPARATORS.as_bytes();
        assert!(create_tokenizer("separators", separators).is_ok());
        assert!(create_tokenizer("trivial", separators).is_ok());
        assert!(create_tokenizer("unicode-word", separators).is_err());

        assert_eq!(
            create_tokenizer("separators", separators).unwrap().name(),
            "separators"
        );
        assert_eq!(
            create_tokenizer("trivial", separators).unwrap().name(),
            "trivial"
        );
    }

    #[test]
    fn test_dispatch() {
        let tokenizer = create_tokenizer("separators", b" ").unwrap();
        let terms: Vec<&[u8]> = tokenizer.tokenize(b"a b").collect();
        assert_eq!(terms, vec![&b"a"[..], &b"b"[..]]);

        let tokenizer = create_tokenizer("trivial", b" ").unwrap();
        let terms: Vec<&[u8]> = tokenizer.tokenize(b"a b").collect();
        assert_eq!(terms, vec![&b"a b"[..]]);
    }
}
