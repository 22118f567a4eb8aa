use super::{DEFAULT_SEPARATORS, Tokenizer, TokenizerKind};

/// Splits the input on every byte of a separator set. Runs of separators and
/// leading or trailing separators produce no empty terms.
#[derive(Clone)]
pub struct SeparatorTokenizer {
    separators: [bool; 256],
}

impl SeparatorTokenizer {
    pub fn new(separators: &[u8]) -> Self {
        let mut set = [false; 256];
        for &b in separators {
            set[b as usize] = true;
        }
        Self { separators: set }
    }

    #[inline]
    pub fn is_separator(&self, b: u8) -> bool {
        self.separators[b as usize]
    }
}

impl Default for SeparatorTokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATORS.as_bytes())
    }
}

impl std::fmt::Debug for SeparatorTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set: Vec<u8> = (0..=255u8).filter(|&b| self.is_separator(b)).collect();
        f.debug_struct("SeparatorTokenizer")
            .field("separators", &set.escape_ascii().to_string())
            .finish()
    }
}

pub struct SeparatorIter<'a> {
    tokenizer: &'a SeparatorTokenizer,
    rest: &'a [u8],
}

impl<'a> Iterator for SeparatorIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let start = self
            .rest
            .iter()
            .position(|&b| !self.tokenizer.is_separator(b))?;
        let rest = &self.rest[start..];
        let end = rest
            .iter()
            .position(|&b| self.tokenizer.is_separator(b))
            .unwrap_or(rest.len());
        self.rest = &rest[end..];
        Some(&rest[..end])
    }
}

impl Tokenizer for SeparatorTokenizer {
    type TokenIter<'a> = SeparatorIter<'a>;

    fn tokenize<'a>(&'a self, input: &'a [u8]) -> Self::TokenIter<'a> {
        SeparatorIter {
            tokenizer: self,
            rest: input,
        }
    }

    fn kind(&self) -> TokenizerKind {
        TokenizerKind::Separators
    }
}
