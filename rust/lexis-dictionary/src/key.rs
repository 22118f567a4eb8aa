use std::fmt;

const MAX_DIGITS: usize = 20;

/// Decimal ASCII rendition of a `u64`, for keying [`Alphabet::DIGITS`]
/// dictionaries without a heap allocation.
///
/// [`Alphabet::DIGITS`]: crate::Alphabet::DIGITS
#[derive(Clone, Copy)]
pub struct DecimalKey {
    buf: [u8; MAX_DIGITS],
    start: usize,
}

impl DecimalKey {
    pub fn new(mut value: u64) -> DecimalKey {
        let mut buf = [0u8; MAX_DIGITS];
        let mut start = MAX_DIGITS;
        loop {
            start -= 1;
            buf[start] = b'0' + (value % 10) as u8;
            value /= 10;
            if value == 0 {
                break;
            }
        }
        DecimalKey { buf, start }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.start..]
    }

    /// Parses a key produced by [`DecimalKey::new`]. Returns `None` for an
    /// empty key, a non-digit byte or a value overflowing `u64`.
    pub fn parse(key: &[u8]) -> Option<u64> {
        if key.is_empty() {
            return None;
        }
        key.iter().try_fold(0u64, |acc, &b| {
            if !b.is_ascii_digit() {
                return None;
            }
            acc.checked_mul(10)?.checked_add((b - b'0') as u64)
        })
    }
}

impl AsRef<[u8]> for DecimalKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for DecimalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for DecimalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only ASCII digits are ever written into the buffer.
        for &b in self.as_bytes() {
            fmt::Write::write_char(f, b as char)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(DecimalKey::new(0).as_bytes(), b"0");
        assert_eq!(DecimalKey::new(112).as_bytes(), b"112");
        assert_eq!(
            DecimalKey::new(u64::MAX).as_bytes(),
            u64::MAX.to_string().as_bytes()
        );
        assert_eq!(DecimalKey::new(518).to_string(), "518");
    }

    #[test]
    fn test_parse() {
        assert_eq!(DecimalKey::parse(b"0"), Some(0));
        assert_eq!(DecimalKey::parse(b"0042"), Some(42));
        assert_eq!(DecimalKey::parse(b""), None);
        assert_eq!(DecimalKey::parse(b"4a"), None);
        assert_eq!(DecimalKey::parse(b"18446744073709551616"), None);
        for _ in 0..1000 {
            let value = fastrand::u64(..);
            assert_eq!(DecimalKey::parse(DecimalKey::new(value).as_bytes()), Some(value));
        }
    }
}
