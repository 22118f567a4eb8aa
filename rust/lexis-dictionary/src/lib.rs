//! Compressed prefix tree ("dictionary") over byte keys, parameterized by an
//! alphabet, together with the helpers used to key it by integers.

pub mod alphabet;
pub mod dictionary;
pub mod key;

pub use alphabet::Alphabet;
pub use dictionary::{Dictionary, NodeId};
pub use key::DecimalKey;
