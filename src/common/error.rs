//! Error types for the node layer and its page stores.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by nodes and page stores.
///
/// Node operations validate before they mutate, so any error returned by a
/// node method leaves that node byte-for-byte unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page has not been allocated in the store.
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// Insert attempted on a node already holding its capacity of entries.
    ///
    /// The caller is expected to split instead.
    #[error("Node is full")]
    NodeFull,

    /// The key is already present in the node.
    #[error("Duplicate key: {0}")]
    DuplicateKey(i32),

    /// Positional read outside `[0, count)`.
    #[error("No entry at index {index} (node holds {count})")]
    NoSuchEntry { index: usize, count: usize },

    /// Split requested on a node with no entries.
    #[error("Cannot split an empty node")]
    EmptyNode,

    /// The sibling handed to a split already holds entries.
    #[error("Split sibling must be empty")]
    SiblingNotEmpty,

    /// Page contents fail validation while decoding a node.
    #[error("Corrupted page {page_id}: {reason}")]
    Corrupted { page_id: u32, reason: String },

    /// A page of one node kind was decoded as the other.
    #[error("Page {page_id} holds a {found} node, expected {expected}")]
    InvalidNodeType {
        page_id: u32,
        expected: &'static str,
        found: &'static str,
    },
}
