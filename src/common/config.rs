//! Configuration constants shared by the page stores and both node kinds.

/// Size of a page in bytes (4KB).
///
/// Every node occupies exactly one page, so node capacities in
/// [`crate::index::btree::layout`] are derived from this value.
pub const PAGE_SIZE: usize = 4096;

/// Maximum number of pages with u32 PageId.
///
/// One id (`u32::MAX`) is reserved as [`crate::PageId::INVALID`].
pub const MAX_PAGES: u64 = u32::MAX as u64;

/// Maximum theoretical database size in bytes.
pub const MAX_DB_SIZE_BYTES: u64 = MAX_PAGES * PAGE_SIZE as u64;
