//! Core definitions (errors, statuses and result helpers), relied upon by all lexis-* crates.

pub mod error;
pub mod result;
pub mod status;

pub use result::Result;
pub use status::Status;
