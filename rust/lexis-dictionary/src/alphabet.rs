/// Symbol set a [`Dictionary`](crate::Dictionary) is defined over.
///
/// Every symbol maps to a dense child slot in `0..size`. Keys containing a
/// byte the alphabet does not map are rejected by the dictionary.
#[derive(Clone, Copy)]
pub struct Alphabet {
    name: &'static str,
    size: usize,
    to_index: fn(u8) -> Option<usize>,
    to_symbol: fn(usize) -> u8,
}

impl Alphabet {
    /// Every byte value is a symbol.
    pub const BYTES: Alphabet = Alphabet {
        name: "bytes",
        size: 256,
        to_index: byte_index,
        to_symbol: byte_symbol,
    };

    /// ASCII decimal digits `0..=9`, used for integer-keyed dictionaries.
    pub const DIGITS: Alphabet = Alphabet {
        name: "digits",
        size: 10,
        to_index: digit_index,
        to_symbol: digit_symbol,
    };

    pub const fn new(
        name: &'static str,
        size: usize,
        to_index: fn(u8) -> Option<usize>,
        to_symbol: fn(usize) -> u8,
    ) -> Alphabet {
        Alphabet {
            name,
            size,
            to_index,
            to_symbol,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Child slot of `symbol`, or `None` when the symbol is not in the alphabet.
    #[inline]
    pub fn index(&self, symbol: u8) -> Option<usize> {
        (self.to_index)(symbol).filter(|&idx| idx < self.size)
    }

    /// Symbol stored in child slot `index`.
    #[inline]
    pub fn symbol(&self, index: usize) -> u8 {
        (self.to_symbol)(index)
    }

    /// Whether every byte of `key` belongs to the alphabet.
    pub fn accepts(&self, key: &[u8]) -> bool {
        key.iter().all(|&b| self.index(b).is_some())
    }
}

impl std::fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alphabet")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish()
    }
}

fn byte_index(symbol: u8) -> Option<usize> {
    Some(symbol as usize)
}

fn byte_symbol(index: usize) -> u8 {
    index as u8
}

fn digit_index(symbol: u8) -> Option<usize> {
    symbol.is_ascii_digit().then(|| (symbol - b'0') as usize)
}

fn digit_symbol(index: usize) -> u8 {
    b'0' + index as u8
}
