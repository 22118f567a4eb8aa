use std::fmt;

/// Identifier of a graph link node carrying string content.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId(pub u64);

impl LinkId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for LinkId {
    fn from(value: u64) -> Self {
        LinkId(value)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
