//! Storage of raw string payloads: positional file I/O and the sharded,
//! append-only channel files records are written to.

pub mod channel;
pub mod file;

pub use channel::{ChannelStore, RECORD_HEADER_SIZE};
