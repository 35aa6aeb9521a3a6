//! Page identifier type.

use std::fmt;

/// Identifies a page in a page store.
///
/// Child pointers in non-leaf nodes and the sibling pointer in leaf nodes are
/// stored as the little-endian bytes of the inner `u32`.
///
/// # Example
/// ```
/// use bplusnode::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.0, 42);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Invalid/sentinel page ID.
    ///
    /// Encodes "no sibling" in a leaf's next pointer.
    pub const INVALID: PageId = PageId(u32::MAX);

    /// Encoded size in bytes.
    pub const SIZE: usize = 4;

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Decode from the first four bytes of `bytes`.
    #[inline]
    pub fn from_le_slice(bytes: &[u8]) -> Self {
        PageId(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Encode into the first four bytes of `bytes`.
    #[inline]
    pub fn write_le(&self, bytes: &mut [u8]) {
        bytes[..Self::SIZE].copy_from_slice(&self.0.to_le_bytes());
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}
