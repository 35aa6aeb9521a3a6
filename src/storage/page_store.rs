//! The page store contract consumed by the node layer.

use crate::common::{PageId, Result};
use crate::storage::page::Page;

/// Persists and retrieves fixed-size pages by identifier.
///
/// Nodes only ever call [`read_page`](PageStore::read_page) and
/// [`write_page`](PageStore::write_page); allocation is used by whatever
/// drives the tree when a split needs a fresh sibling or root page.
///
/// A successful write must be visible to a subsequent read of the same id.
/// No multi-page atomicity is assumed.
pub trait PageStore {
    /// Read the full image of an allocated page.
    fn read_page(&self, page_id: PageId) -> Result<Page>;

    /// Overwrite an allocated page.
    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()>;

    /// Allocate a new zero-filled page and return its id.
    fn allocate_page(&mut self) -> Result<PageId>;

    /// Number of allocated pages.
    fn page_count(&self) -> u32;
}
