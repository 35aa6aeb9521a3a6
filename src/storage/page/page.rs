//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a raw 4KB byte array that serves as the unit of I/O
//! between a [`PageStore`](crate::storage::PageStore) and a node.

use crate::common::config::PAGE_SIZE;

/// A page of data (4KB, 4KB-aligned).
///
/// Each B+Tree node owns exactly one `Page` as its backing buffer.
///
/// `Page` does not implement `Clone`; copy explicitly via [`Page::from_slice`].
///
/// # Example
/// ```
/// use bplusnode::storage::page::Page;
///
/// let mut page = Page::new();
/// page.as_mut_slice()[0] = 0xFF;
/// assert_eq!(page.as_slice()[0], 0xFF);
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Create a page holding a copy of `bytes`.
    ///
    /// # Panics
    /// Panics if `bytes.len() != PAGE_SIZE`.
    pub fn from_slice(bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), PAGE_SIZE, "page image must be PAGE_SIZE bytes");
        let mut page = Page::new();
        page.data.copy_from_slice(bytes);
        page
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// True if every byte is zero (a freshly allocated page).
    pub fn is_zeroed(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
