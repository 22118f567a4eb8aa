use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fails the enclosing function with an `InvalidArgument` error naming the
/// violated condition when it does not hold.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        if !$expr {
            return Err($crate::error::Error::invalid_arg(
                stringify!($name),
                stringify!($expr),
            ));
        }
    }};
}

/// Fails the enclosing function with an `InvalidFormat` error when a decoded
/// value does not satisfy the condition.
#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {{
        if !$expr {
            return Err($crate::result::corrupted(stringify!($name), stringify!($expr)));
        }
    }};
}

#[cold]
pub fn corrupted(element: &str, condition: &str) -> Error {
    Error::invalid_format(element, format!("condition violated: {condition}"))
}

#[cfg(test)]
mod tests {
    use crate::{Result, Status};

    fn check_len(len: u64, limit: u64) -> Result<u64> {
        verify_data!(len, len <= limit);
        Ok(len)
    }

    fn check_name(name: &str) -> Result<()> {
        verify_arg!(name, !name.is_empty());
        Ok(())
    }

    #[test]
    fn test_verify_macros() {
        assert_eq!(check_len(4, 8).unwrap(), 4);
        let err = check_len(16, 8).unwrap_err();
        assert_eq!(err.status(), Status::ReadError);
        assert!(err.to_string().contains("len <= limit"));

        assert!(check_name("terms").is_ok());
        assert_eq!(check_name("").unwrap_err().status(), Status::InvalidParams);
    }
}
