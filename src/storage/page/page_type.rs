//! Page type discriminator.
//!
//! Node pages record their kind in the trailer so a leaf is never decoded as
//! a non-leaf node or the other way round.

/// Type of page stored on disk.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Uninitialized (never written) or corrupted page.
    #[default]
    Invalid = 0,
    /// B-tree internal (non-leaf) node.
    BTreeInternal = 2,
    /// B-tree leaf node.
    BTreeLeaf = 3,
}

impl PageType {
    /// Convert from u8, returning Invalid for unknown values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            2 => PageType::BTreeInternal,
            3 => PageType::BTreeLeaf,
            _ => PageType::Invalid,
        }
    }

    /// Short human-readable name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            PageType::Invalid => "invalid",
            PageType::BTreeInternal => "non-leaf",
            PageType::BTreeLeaf => "leaf",
        }
    }
}
