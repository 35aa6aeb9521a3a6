//! Leaf node: sorted `(key, record id)` entries plus a next-sibling pointer.

use std::fmt;

use tracing::debug;

use super::layout::{self, PageState, LEAF_CAPACITY, LEAF_ENTRY_SIZE};
use super::slots::{Slot, Slots, SlotsMut};
use super::Locate;
use crate::common::{Error, PageId, RecordId, Result};
use crate::storage::page::{Page, PageType};
use crate::storage::PageStore;

/// One leaf entry as stored on the page: 4-byte key, 8-byte record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LeafEntry {
    key: i32,
    rid: RecordId,
}

impl Slot for LeafEntry {
    const SIZE: usize = LEAF_ENTRY_SIZE;

    fn decode(bytes: &[u8]) -> Self {
        Self {
            key: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            rid: RecordId::from_le_slice(&bytes[4..]),
        }
    }

    fn encode(&self, bytes: &mut [u8]) {
        bytes[..4].copy_from_slice(&self.key.to_le_bytes());
        self.rid.write_le(&mut bytes[4..]);
    }

    #[inline]
    fn key(&self) -> i32 {
        self.key
    }
}

/// A B+Tree leaf node backed by one page.
///
/// Entries are kept in strictly increasing key order. The node holds no
/// reference to other nodes; its right neighbour is named only by the page id
/// in [`next_node_ptr`](LeafNode::next_node_ptr), which the tree driver keeps
/// up to date across splits.
///
/// # Example
/// ```
/// use bplusnode::index::btree::LeafNode;
/// use bplusnode::{PageId, RecordId};
///
/// let mut leaf = LeafNode::new();
/// leaf.insert(20, RecordId::new(PageId::new(1), 0)).unwrap();
/// leaf.insert(10, RecordId::new(PageId::new(1), 1)).unwrap();
///
/// assert_eq!(leaf.key_count(), 2);
/// assert_eq!(leaf.read_entry(0).unwrap().0, 10);
/// ```
pub struct LeafNode {
    page: Page,
}

impl LeafNode {
    /// Create an empty leaf with no next sibling.
    pub fn new() -> Self {
        let mut page = Page::new();
        layout::format(&mut page, PageType::BTreeLeaf, PageId::INVALID);
        Self { page }
    }

    /// Maximum number of entries a leaf can hold.
    #[inline]
    pub const fn capacity() -> usize {
        LEAF_CAPACITY
    }

    /// Load the node from page `page_id` of `store`.
    ///
    /// A never-written (all zero) page loads as an empty leaf. On error the
    /// node is left unchanged.
    pub fn read<S: PageStore + ?Sized>(&mut self, page_id: PageId, store: &S) -> Result<()> {
        let page = store.read_page(page_id)?;
        match layout::check(page_id, &page, PageType::BTreeLeaf, LEAF_CAPACITY)? {
            PageState::Fresh => *self = Self::new(),
            PageState::Node => self.page = page,
        }
        Ok(())
    }

    /// Persist the node to page `page_id` of `store`.
    pub fn write<S: PageStore + ?Sized>(&mut self, page_id: PageId, store: &mut S) -> Result<()> {
        layout::seal(&mut self.page);
        store.write_page(page_id, &self.page)
    }

    /// Number of entries stored.
    #[inline]
    pub fn key_count(&self) -> usize {
        layout::key_count(&self.page)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.key_count() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.key_count() == LEAF_CAPACITY
    }

    fn slots(&self) -> Slots<'_, LeafEntry> {
        Slots::new(layout::body(&self.page), self.key_count())
    }

    fn slots_mut(&mut self) -> SlotsMut<'_, LeafEntry> {
        let (body, count) = layout::body_and_count_mut(&mut self.page);
        SlotsMut::new(body, count)
    }

    /// Find `search_key`, or the position it would be inserted at.
    pub fn locate(&self, search_key: i32) -> Locate {
        self.slots().locate(search_key)
    }

    /// Insert `(key, rid)` in key order.
    ///
    /// # Errors
    /// - `Error::NodeFull` if the leaf already holds [`LeafNode::capacity`] entries
    /// - `Error::DuplicateKey` if `key` is present
    pub fn insert(&mut self, key: i32, rid: RecordId) -> Result<()> {
        if self.is_full() {
            return Err(Error::NodeFull);
        }
        let index = match self.locate(key) {
            Locate::Found(_) => return Err(Error::DuplicateKey(key)),
            Locate::NotFound(index) => index,
        };

        self.slots_mut().insert(index, LeafEntry { key, rid });
        Ok(())
    }

    /// Insert `(key, rid)` and split the entries half and half with `sibling`.
    ///
    /// The upper half moves into `sibling`, the new entry goes to whichever
    /// side it belongs to, and the two sides are then rebalanced until their
    /// counts differ by at most one. Returns the sibling's first key, which
    /// the caller inserts into the parent.
    ///
    /// Next-sibling pointers are left alone; the caller links
    /// `self -> sibling -> old next`.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if `key` is present
    /// - `Error::EmptyNode` if this leaf has no entries
    /// - `Error::SiblingNotEmpty` if `sibling` holds entries
    pub fn insert_and_split(
        &mut self,
        key: i32,
        rid: RecordId,
        sibling: &mut LeafNode,
    ) -> Result<i32> {
        let count = self.key_count();
        let pos = match self.locate(key) {
            Locate::Found(_) => return Err(Error::DuplicateKey(key)),
            Locate::NotFound(pos) => pos,
        };
        if count == 0 {
            return Err(Error::EmptyNode);
        }
        if !sibling.is_empty() {
            return Err(Error::SiblingNotEmpty);
        }

        let mid = count / 2;
        let entry = LeafEntry { key, rid };
        let mut source = self.slots_mut();
        let mut target = sibling.slots_mut();

        source.move_tail_to(mid, &mut target);
        if pos <= mid {
            source.insert(pos, entry);
        } else {
            target.insert(pos - mid, entry);
        }

        while source.len() > target.len() + 1 {
            let moved = source.pop();
            target.insert(0, moved);
        }
        while target.len() > source.len() {
            let moved = target.remove(0);
            source.push(moved);
        }

        let (left, right) = (source.len(), target.len());
        let sibling_key = target.get(0).map(|e| e.key).ok_or(Error::EmptyNode)?;
        debug!(key, left, right, sibling_key, "split leaf node");
        Ok(sibling_key)
    }

    /// Read the entry at `index`.
    ///
    /// # Errors
    /// Returns `Error::NoSuchEntry` if `index` is outside `[0, key_count)`.
    pub fn read_entry(&self, index: usize) -> Result<(i32, RecordId)> {
        let slots = self.slots();
        slots
            .get(index)
            .map(|e| (e.key, e.rid))
            .ok_or(Error::NoSuchEntry {
                index,
                count: slots.len(),
            })
    }

    /// All entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (i32, RecordId)> + '_ {
        self.slots().iter().map(|e| (e.key, e.rid))
    }

    /// Page id of the next leaf, or `None` at the end of the chain.
    pub fn next_node_ptr(&self) -> Option<PageId> {
        let next = layout::NodeTrailer::from_page(&self.page).next_leaf;
        next.is_valid().then_some(next)
    }

    /// Set (or clear) the next leaf pointer. Not validated.
    pub fn set_next_node_ptr(&mut self, next: Option<PageId>) {
        layout::set_next_leaf(&mut self.page, next.unwrap_or(PageId::INVALID));
    }

    /// The raw page image.
    pub fn as_bytes(&self) -> &[u8] {
        self.page.as_slice()
    }
}

impl Default for LeafNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LeafNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<i32> = self.entries().map(|(k, _)| k).collect();
        f.debug_struct("LeafNode")
            .field("capacity", &LEAF_CAPACITY)
            .field("key_count", &keys.len())
            .field("keys", &keys)
            .field("next", &self.next_node_ptr())
            .finish()
    }
}
