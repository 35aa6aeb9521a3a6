//! On-page layout shared by leaf and non-leaf nodes.
//!
//! Entries are packed from the front of the page; a fixed 12-byte trailer
//! sits at the very end of every node page:
//!
//! ```text
//! Leaf:      ┌──────────────────────────────────────────┬─────┬─────────┐
//!            │ key0 rid0 │ key1 rid1 │ ...  (12B each)  │ pad │ trailer │
//!            └──────────────────────────────────────────┴─────┴─────────┘
//! Non-leaf:  ┌──────┬───────────────────────────────────┬─────────┐
//!            │ ptr0 │ key0 ptr1 │ key1 ptr2 │ ... (8B)  │ trailer │
//!            └──────┴───────────────────────────────────┴─────────┘
//!
//! Trailer (offset PAGE_SIZE - 12):
//! Offset  Size  Field
//! ------  ----  -----
//! 0       1     page_type (PageType as u8)
//! 1       1     reserved (zero)
//! 2       2     key_count (little-endian)
//! 4       4     checksum (CRC32, little-endian)
//! 8       4     next_leaf (PageId, little-endian; leaf only)
//! ```
//!
//! The occupied-entry count is stored, never inferred, so an entry whose
//! bytes are all zero (key 0 with a zero record id) is a legitimate entry.

use tracing::warn;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, RecordId, Result};
use crate::storage::page::{Page, PageType};

/// Byte offset of the trailer within a page.
pub const TRAILER_OFFSET: usize = PAGE_SIZE - NodeTrailer::SIZE;

/// Encoded size of one `(key, record id)` leaf entry.
pub const LEAF_ENTRY_SIZE: usize = 4 + RecordId::SIZE;

/// Maximum number of entries in a leaf node.
pub const LEAF_CAPACITY: usize = TRAILER_OFFSET / LEAF_ENTRY_SIZE;

/// Encoded size of one `(key, child pointer)` non-leaf pair.
pub const NON_LEAF_ENTRY_SIZE: usize = 4 + PageId::SIZE;

/// Maximum number of keys in a non-leaf node (it holds one more pointer).
///
/// This is 510, one below the 511 a bare 2-byte count would leave
/// (`(PAGE_SIZE - 4 - 2) / 8`). Non-leaf pages carry the full 12-byte
/// trailer too, type byte and CRC32 included.
pub const NON_LEAF_CAPACITY: usize = (TRAILER_OFFSET - PageId::SIZE) / NON_LEAF_ENTRY_SIZE;

/// Metadata stored at the end of every node page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeTrailer {
    pub page_type: PageType,
    pub key_count: u16,
    pub checksum: u32,
    pub next_leaf: PageId,
}

impl NodeTrailer {
    /// Size of the trailer in bytes.
    pub const SIZE: usize = 12;

    /// Offset of each field within the trailer.
    pub const OFFSET_PAGE_TYPE: usize = 0;
    pub const OFFSET_KEY_COUNT: usize = 2;
    pub const OFFSET_CHECKSUM: usize = 4;
    pub const OFFSET_NEXT_LEAF: usize = 8;

    /// Read the trailer from the end of a page.
    pub fn from_page(page: &Page) -> Self {
        let t = &page.as_slice()[TRAILER_OFFSET..];
        Self {
            page_type: PageType::from_u8(t[Self::OFFSET_PAGE_TYPE]),
            key_count: u16::from_le_bytes([t[Self::OFFSET_KEY_COUNT], t[Self::OFFSET_KEY_COUNT + 1]]),
            checksum: u32::from_le_bytes([
                t[Self::OFFSET_CHECKSUM],
                t[Self::OFFSET_CHECKSUM + 1],
                t[Self::OFFSET_CHECKSUM + 2],
                t[Self::OFFSET_CHECKSUM + 3],
            ]),
            next_leaf: PageId::from_le_slice(&t[Self::OFFSET_NEXT_LEAF..]),
        }
    }

    /// Write this trailer to the end of a page.
    pub fn write_to(&self, page: &mut Page) {
        let t = &mut page.as_mut_slice()[TRAILER_OFFSET..];
        t[Self::OFFSET_PAGE_TYPE] = self.page_type as u8;
        t[Self::OFFSET_PAGE_TYPE + 1] = 0;
        t[Self::OFFSET_KEY_COUNT..Self::OFFSET_KEY_COUNT + 2]
            .copy_from_slice(&self.key_count.to_le_bytes());
        t[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&self.checksum.to_le_bytes());
        self.next_leaf.write_le(&mut t[Self::OFFSET_NEXT_LEAF..]);
    }

    /// Compute the CRC32 of a page with the checksum field zeroed.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let start = TRAILER_OFFSET + Self::OFFSET_CHECKSUM;
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&page_data[..start]);
        hasher.update(&[0u8; 4]);
        hasher.update(&page_data[start + 4..]);
        hasher.finalize()
    }

    /// Verify that the stored checksum matches the page contents.
    pub fn verify_checksum(&self, page_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(page_data)
    }
}

/// Split a node page into its entry body and the two key-count bytes.
pub(crate) fn body_and_count_mut(page: &mut Page) -> (&mut [u8], &mut [u8]) {
    let (body, trailer) = page.as_mut_slice().split_at_mut(TRAILER_OFFSET);
    let count =
        &mut trailer[NodeTrailer::OFFSET_KEY_COUNT..NodeTrailer::OFFSET_KEY_COUNT + 2];
    (body, count)
}

pub(crate) fn body(page: &Page) -> &[u8] {
    &page.as_slice()[..TRAILER_OFFSET]
}

pub(crate) fn key_count(page: &Page) -> usize {
    NodeTrailer::from_page(page).key_count as usize
}

/// Reset `page` to an empty node of the given kind.
pub(crate) fn format(page: &mut Page, page_type: PageType, next_leaf: PageId) {
    page.reset();
    NodeTrailer {
        page_type,
        next_leaf,
        ..NodeTrailer::default()
    }
    .write_to(page);
}

pub(crate) fn set_next_leaf(page: &mut Page, next: PageId) {
    let at = TRAILER_OFFSET + NodeTrailer::OFFSET_NEXT_LEAF;
    next.write_le(&mut page.as_mut_slice()[at..]);
}

/// Stamp the checksum before the page leaves the node.
pub(crate) fn seal(page: &mut Page) {
    let checksum = NodeTrailer::compute_checksum(page.as_slice());
    let at = TRAILER_OFFSET + NodeTrailer::OFFSET_CHECKSUM;
    page.as_mut_slice()[at..at + 4].copy_from_slice(&checksum.to_le_bytes());
}

/// Result of validating a page image read from a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageState {
    /// Never written: all zero bytes.
    Fresh,
    /// A sealed node of the expected kind.
    Node,
}

/// Validate a page image before a node adopts it.
pub(crate) fn check(
    page_id: PageId,
    page: &Page,
    expected: PageType,
    capacity: usize,
) -> Result<PageState> {
    let trailer = NodeTrailer::from_page(page);

    if trailer.page_type == PageType::Invalid && page.is_zeroed() {
        return Ok(PageState::Fresh);
    }

    if trailer.page_type != expected {
        warn!(%page_id, found = trailer.page_type.name(), expected = expected.name(), "node type mismatch");
        return Err(Error::InvalidNodeType {
            page_id: page_id.0,
            expected: expected.name(),
            found: trailer.page_type.name(),
        });
    }

    if !trailer.verify_checksum(page.as_slice()) {
        warn!(%page_id, stored = trailer.checksum, "node checksum mismatch");
        return Err(Error::Corrupted {
            page_id: page_id.0,
            reason: format!("checksum mismatch (stored {:#010x})", trailer.checksum),
        });
    }

    if trailer.key_count as usize > capacity {
        warn!(%page_id, key_count = trailer.key_count, capacity, "node key count out of range");
        return Err(Error::Corrupted {
            page_id: page_id.0,
            reason: format!("key count {} exceeds capacity {}", trailer.key_count, capacity),
        });
    }

    let used = occupied_len(expected, trailer.key_count as usize);
    if body(page)[used..].iter().any(|&b| b != 0) {
        warn!(%page_id, key_count = trailer.key_count, "bytes past the last entry");
        return Err(Error::Corrupted {
            page_id: page_id.0,
            reason: format!("non-zero bytes after entry {}", trailer.key_count),
        });
    }

    Ok(PageState::Node)
}

/// Bytes of the body taken by `key_count` entries.
fn occupied_len(page_type: PageType, key_count: usize) -> usize {
    match page_type {
        PageType::BTreeInternal => PageId::SIZE + key_count * NON_LEAF_ENTRY_SIZE,
        _ => key_count * LEAF_ENTRY_SIZE,
    }
}
