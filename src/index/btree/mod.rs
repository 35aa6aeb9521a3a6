//! B+Tree node layer.
//!
//! Two node kinds, each backed by exactly one page:
//! - [`LeafNode`] - sorted `(key, RecordId)` entries and a next-leaf pointer
//! - [`NonLeafNode`] - sorted keys interleaved with child page ids
//!
//! There is no in-memory tree. Nodes are decoded from a
//! [`PageStore`](crate::storage::PageStore), mutated, and written back; the
//! tree exists only as page ids embedded in pages. Walking from the root,
//! deciding when to propagate a split and allocating new roots is the job of
//! whatever drives these nodes.

mod layout;
mod leaf;
mod non_leaf;
mod slots;

pub use layout::{
    NodeTrailer, LEAF_CAPACITY, LEAF_ENTRY_SIZE, NON_LEAF_CAPACITY, NON_LEAF_ENTRY_SIZE,
    TRAILER_OFFSET,
};
pub use leaf::LeafNode;
pub use non_leaf::NonLeafNode;

/// Outcome of searching a node for a key.
///
/// Both variants carry an index: the position of the key when found, or the
/// position it would be inserted at otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locate {
    Found(usize),
    NotFound(usize),
}

impl Locate {
    #[inline]
    pub fn is_found(self) -> bool {
        matches!(self, Locate::Found(_))
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Locate::Found(i) | Locate::NotFound(i) => i,
        }
    }
}
