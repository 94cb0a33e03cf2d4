pub mod record;
pub mod store;
pub(crate) mod tree;

pub use record::Student;
pub use store::StudentStore;

use std::string::FromUtf8Error;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures reported by the store and its record codec.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The byte source ended in the middle of a record.
    #[error("record truncated; stream ended mid-record")]
    Truncated,
    /// The underlying sink or source failed.
    #[error("io failure; {0}")]
    Io(#[from] std::io::Error),
    /// A record with this id is already present.
    #[error("duplicate id {0}")]
    DuplicateId(i32),
    /// Decoded name bytes are not valid UTF-8.
    #[error("record name is not valid utf-8; {0}")]
    InvalidName(#[from] FromUtf8Error),
}
