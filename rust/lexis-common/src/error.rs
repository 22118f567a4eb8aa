use std::path::PathBuf;

use thiserror::Error;

use crate::status::Status;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Maps the error onto the coarse status reported to storage callers.
    pub fn status(&self) -> Status {
        match self.kind() {
            ErrorKind::NoInstance => Status::NoInstance,
            ErrorKind::InvalidPath { .. } => Status::InvalidPath,
            ErrorKind::InvalidArgument { .. } => Status::InvalidParams,
            ErrorKind::Write { .. } | ErrorKind::StorageFull { .. } => Status::WriteError,
            ErrorKind::InvalidFormat { .. } | ErrorKind::Read { .. } | ErrorKind::Io { .. } => {
                Status::ReadError
            }
        }
    }

    pub fn invalid_format(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn no_instance() -> Error {
        Error(ErrorKind::NoInstance.into())
    }

    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidPath {
                path: path.into(),
                reason: reason.into(),
            }
            .into(),
        )
    }

    pub fn read(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Read {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    pub fn write(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Write {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    pub fn storage_full(offset: u64, max_channels: usize) -> Error {
        Error(
            ErrorKind::StorageFull {
                offset,
                max_channels,
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("storage instance is not initialized")]
    NoInstance,

    #[error("invalid storage path '{}': {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    #[error("read error for '{context}': {source}")]
    Read {
        context: String,
        source: std::io::Error,
    },

    #[error("write error for '{context}': {source}")]
    Write {
        context: String,
        source: std::io::Error,
    },

    #[error("storage is full: offset {offset} is beyond {max_channels} channels")]
    StorageFull { offset: u64, max_channels: usize },

    #[error("IO error for '{context}': {source}'")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
