//! Disk Manager - file-backed page store.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing node pages
//! - Allocating new pages
//! - Managing the index file

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use parking_lot::Mutex;
use tracing::debug;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PageStore;

/// Stores pages in a single file.
///
/// # File Layout
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Page N is located at file offset `N × PAGE_SIZE`.
///
/// # Thread Safety
/// Reads go through `&self`, so the file handle sits behind a `Mutex` to
/// serialize the seek+read pair. Writes and allocation take `&mut self` and
/// bypass the lock with `Mutex::get_mut`.
///
/// # Durability
/// All writes are followed by `fsync()`.
pub struct DiskManager {
    file: Mutex<File>,
    /// Number of pages in the file.
    page_count: u32,
}

impl DiskManager {
    /// Create a new index file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path.as_ref())?;

        debug!(path = %path.as_ref().display(), "created page file");
        Ok(Self {
            file: Mutex::new(file),
            page_count: 0,
        })
    }

    /// Open an existing index file.
    ///
    /// A trailing partial page (from an interrupted allocation) is ignored.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path.as_ref())?;

        let file_size = file.metadata()?.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        debug!(path = %path.as_ref().display(), page_count, "opened page file");
        Ok(Self {
            file: Mutex::new(file),
            page_count,
        })
    }

    /// Open an existing index file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Get the total size of the page file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }

    #[inline]
    fn offset_of(page_id: PageId) -> u64 {
        (page_id.0 as u64) * (PAGE_SIZE as u64)
    }

    fn check_allocated(&self, page_id: PageId) -> Result<()> {
        if page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }
        Ok(())
    }
}

impl PageStore for DiskManager {
    /// Read a page from disk.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page doesn't exist.
    fn read_page(&self, page_id: PageId) -> Result<Page> {
        self.check_allocated(page_id)?;

        let mut page = Page::new();
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        file.read_exact(page.as_mut_slice())?;

        Ok(page)
    }

    /// Write a page to disk and `fsync()`.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page hasn't been allocated.
    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        self.check_allocated(page_id)?;

        let file = self.file.get_mut();
        file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        file.write_all(page.as_slice())?;
        file.sync_all()?;

        Ok(())
    }

    /// Extend the file with a zeroed page.
    fn allocate_page(&mut self) -> Result<PageId> {
        let next = self
            .page_count
            .checked_add(1)
            .ok_or_else(|| io::Error::other("page id space exhausted"))?;
        let page_id = PageId::new(self.page_count);

        let file = self.file.get_mut();
        file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        file.write_all(&[0u8; PAGE_SIZE])?;
        file.sync_all()?;

        self.page_count = next;
        debug!(%page_id, "allocated page");
        Ok(page_id)
    }

    #[inline]
    fn page_count(&self) -> u32 {
        self.page_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.idx");

        let dm = DiskManager::create(&path).unwrap();
        assert_eq!(dm.page_count(), 0);
        assert_eq!(dm.file_size(), 0);
    }

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.idx");

        DiskManager::create(&path).unwrap();
        assert!(matches!(DiskManager::create(&path), Err(Error::Io(_))));
    }

    #[test]
    fn test_open_nonexistent_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent.idx");

        assert!(DiskManager::open(&path).is_err());
    }

    #[test]
    fn test_allocate_and_read_page() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.idx")).unwrap();

        let page_id = dm.allocate_page().unwrap();
        assert_eq!(page_id, PageId::new(0));
        assert_eq!(dm.page_count(), 1);

        let page = dm.read_page(page_id).unwrap();
        assert!(page.is_zeroed());
    }

    #[test]
    fn test_write_and_read_page() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.idx")).unwrap();
        let page_id = dm.allocate_page().unwrap();

        let mut page = Page::new();
        page.as_mut_slice()[0] = 0xAB;
        page.as_mut_slice()[PAGE_SIZE - 1] = 0xEF;
        dm.write_page(page_id, &page).unwrap();

        let read_back = dm.read_page(page_id).unwrap();
        assert_eq!(read_back.as_slice(), page.as_slice());
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.idx");

        {
            let mut dm = DiskManager::create(&path).unwrap();
            let page_id = dm.allocate_page().unwrap();
            let mut page = Page::new();
            page.as_mut_slice()[10] = 0x42;
            dm.write_page(page_id, &page).unwrap();
        }

        let dm = DiskManager::open(&path).unwrap();
        assert_eq!(dm.page_count(), 1);
        assert_eq!(dm.read_page(PageId::new(0)).unwrap().as_slice()[10], 0x42);
    }

    #[test]
    fn test_unallocated_page_access() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.idx")).unwrap();
        dm.allocate_page().unwrap();

        assert!(matches!(
            dm.read_page(PageId::new(1)),
            Err(Error::PageNotFound(1))
        ));
        assert!(matches!(
            dm.write_page(PageId::new(3), &Page::new()),
            Err(Error::PageNotFound(3))
        ));
    }

    #[test]
    fn test_open_or_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.idx");

        {
            let mut dm = DiskManager::open_or_create(&path).unwrap();
            assert_eq!(dm.page_count(), 0);
            dm.allocate_page().unwrap();
        }

        let dm = DiskManager::open_or_create(&path).unwrap();
        assert_eq!(dm.page_count(), 1);
        assert_eq!(dm.file_size(), PAGE_SIZE as u64);
    }

    #[test]
    fn test_allocate_past_last_page_id_fails() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.idx")).unwrap();
        dm.page_count = u32::MAX;

        match dm.allocate_page() {
            Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::Other),
            other => panic!("expected io error, got {:?}", other.map(|p| p.0)),
        }
        assert_eq!(dm.page_count(), u32::MAX);
    }
}
