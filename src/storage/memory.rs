//! In-memory page store.

use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PageStore;

/// A [`PageStore`] that keeps every page in a `Vec`.
///
/// Same contract as [`DiskManager`](crate::storage::DiskManager) without
/// touching the filesystem; useful for tests and scratch trees.
#[derive(Default)]
pub struct MemoryPageStore {
    pages: Vec<Page>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, page_id: PageId) -> Result<&Page> {
        self.pages
            .get(page_id.0 as usize)
            .ok_or(Error::PageNotFound(page_id.0))
    }
}

impl PageStore for MemoryPageStore {
    fn read_page(&self, page_id: PageId) -> Result<Page> {
        Ok(Page::from_slice(self.slot(page_id)?.as_slice()))
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        let stored = self
            .pages
            .get_mut(page_id.0 as usize)
            .ok_or(Error::PageNotFound(page_id.0))?;
        stored.as_mut_slice().copy_from_slice(page.as_slice());
        Ok(())
    }

    fn allocate_page(&mut self) -> Result<PageId> {
        let page_id = PageId::new(self.pages.len() as u32);
        self.pages.push(Page::new());
        Ok(page_id)
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }
}
