/// Outcome of a storage operation, as reported to callers that need a flat status
/// rather than a typed error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    /// The operation was attempted on an uninitialized or shut down storage.
    NoInstance,
    /// A lookup miss. A normal, empty result.
    NoSuchString,
    /// The repository path is missing and cannot be created.
    InvalidPath,
    /// Options or arguments the storage cannot work with.
    InvalidParams,
    /// A short write or a full storage. The handle may be inconsistent until reloaded.
    WriteError,
    /// A short read or a corrupted record. Isolated to the record being read.
    ReadError,
}

impl Status {
    pub fn of<T>(result: &crate::Result<Option<T>>) -> Status {
        match result {
            Ok(Some(_)) => Status::Ok,
            Ok(None) => Status::NoSuchString,
            Err(e) => e.status(),
        }
    }

    pub const fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}
