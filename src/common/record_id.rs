//! Record locator stored in leaf entries.

use std::fmt;

use super::PageId;

/// Locates a stored record: the page holding it and a slot within that page.
///
/// The node layer never interprets a `RecordId`; it is copied in and out of
/// leaf entries as an 8-byte blob.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: u32,
}

impl RecordId {
    /// Encoded size in bytes.
    pub const SIZE: usize = PageId::SIZE + 4;

    #[inline]
    pub fn new(page_id: PageId, slot: u32) -> Self {
        Self { page_id, slot }
    }

    /// Decode from the first eight bytes of `bytes`.
    pub fn from_le_slice(bytes: &[u8]) -> Self {
        Self {
            page_id: PageId::from_le_slice(&bytes[..PageId::SIZE]),
            slot: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    /// Encode into the first eight bytes of `bytes`.
    pub fn write_le(&self, bytes: &mut [u8]) {
        self.page_id.write_le(&mut bytes[..PageId::SIZE]);
        bytes[PageId::SIZE..Self::SIZE].copy_from_slice(&self.slot.to_le_bytes());
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({}, {})", self.page_id.0, self.slot)
    }
}
