//! Non-leaf (internal) node: `ptr0, key0, ptr1, key1, ..., keyN-1, ptrN`.
//!
//! The leading pointer sits alone at offset 0; after it the page holds
//! `(key[i], ptr[i+1])` pairs in a slot array, so every key travels with the
//! child pointer to its right.

use std::fmt;

use tracing::debug;

use super::layout::{self, PageState, NON_LEAF_CAPACITY, NON_LEAF_ENTRY_SIZE};
use super::slots::{Slot, Slots, SlotsMut};
use super::Locate;
use crate::common::{Error, PageId, Result};
use crate::storage::page::{Page, PageType};
use crate::storage::PageStore;

/// A key and the child pointer to its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyPid {
    key: i32,
    child: PageId,
}

impl Slot for KeyPid {
    const SIZE: usize = NON_LEAF_ENTRY_SIZE;

    fn decode(bytes: &[u8]) -> Self {
        Self {
            key: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            child: PageId::from_le_slice(&bytes[4..]),
        }
    }

    fn encode(&self, bytes: &mut [u8]) {
        bytes[..4].copy_from_slice(&self.key.to_le_bytes());
        self.child.write_le(&mut bytes[4..]);
    }

    #[inline]
    fn key(&self) -> i32 {
        self.key
    }
}

/// A B+Tree internal node backed by one page.
///
/// Child `i` covers keys in `[key[i-1], key[i])`: child 0 takes everything
/// below `key[0]` and the last child everything at or above the last key.
/// A node with `k` keys always has `k + 1` child pointers.
pub struct NonLeafNode {
    page: Page,
}

impl NonLeafNode {
    /// Create an empty node. Its leading pointer is page 0 until set by
    /// [`initialize_root`](NonLeafNode::initialize_root) or a split.
    pub fn new() -> Self {
        let mut page = Page::new();
        layout::format(&mut page, PageType::BTreeInternal, PageId::default());
        Self { page }
    }

    /// Maximum number of keys a non-leaf node can hold.
    #[inline]
    pub const fn capacity() -> usize {
        NON_LEAF_CAPACITY
    }

    /// Load the node from page `page_id` of `store`.
    ///
    /// A never-written (all zero) page loads as an empty node. On error the
    /// node is left unchanged.
    pub fn read<S: PageStore + ?Sized>(&mut self, page_id: PageId, store: &S) -> Result<()> {
        let page = store.read_page(page_id)?;
        match layout::check(page_id, &page, PageType::BTreeInternal, NON_LEAF_CAPACITY)? {
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

    /// Number of keys stored.
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
        self.key_count() == NON_LEAF_CAPACITY
    }

    fn slots(&self) -> Slots<'_, KeyPid> {
        Slots::new(&layout::body(&self.page)[PageId::SIZE..], self.key_count())
    }

    fn slots_mut(&mut self) -> SlotsMut<'_, KeyPid> {
        let (body, count) = layout::body_and_count_mut(&mut self.page);
        SlotsMut::new(&mut body[PageId::SIZE..], count)
    }

    /// The leading (leftmost) child pointer.
    pub fn first_child(&self) -> PageId {
        PageId::from_le_slice(self.page.as_slice())
    }

    fn set_first_child(&mut self, child: PageId) {
        child.write_le(self.page.as_mut_slice());
    }

    /// Reset the node to `[left, key, right]`: one key, two children.
    ///
    /// Used when a split propagates past the current root.
    pub fn initialize_root(&mut self, left: PageId, key: i32, right: PageId) {
        layout::format(&mut self.page, PageType::BTreeInternal, PageId::default());
        self.set_first_child(left);
        self.slots_mut().push(KeyPid { key, child: right });
        debug!(%left, key, %right, "initialized root");
    }

    /// Find `search_key`, or the position it would be inserted at.
    pub fn locate(&self, search_key: i32) -> Locate {
        self.slots().locate(search_key)
    }

    /// Insert `key` with `child` as the pointer to its right.
    ///
    /// # Errors
    /// - `Error::NodeFull` if the node already holds [`NonLeafNode::capacity`] keys
    /// - `Error::DuplicateKey` if `key` is present
    pub fn insert(&mut self, key: i32, child: PageId) -> Result<()> {
        if self.is_full() {
            return Err(Error::NodeFull);
        }
        let index = match self.locate(key) {
            Locate::Found(_) => return Err(Error::DuplicateKey(key)),
            Locate::NotFound(index) => index,
        };

        self.slots_mut().insert(index, KeyPid { key, child });
        Ok(())
    }

    /// Insert `(key, child)` and split the node with the empty `sibling`.
    ///
    /// The returned mid key is promoted to the parent and kept in neither
    /// node; the sibling starts with a bare pointer. With `n` keys and the
    /// new key's insertion point `pos`:
    ///
    /// - `pos` at the median (`n / 2` or `(n + 1) / 2`): the new key itself is
    ///   promoted and `child` leads the sibling.
    /// - `pos` below the median: split at `n / 2`, insert into this node,
    ///   then promote this node's last key.
    /// - `pos` above the median: split at `(n + 1) / 2`, insert into the
    ///   sibling, then promote the sibling's first key.
    ///
    /// Afterwards every key here is below the mid key, every key in
    /// `sibling` above it, and the two key counts sum to `n`.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if `key` is present
    /// - `Error::EmptyNode` if this node has no keys
    /// - `Error::SiblingNotEmpty` if `sibling` holds keys
    pub fn insert_and_split(
        &mut self,
        key: i32,
        child: PageId,
        sibling: &mut NonLeafNode,
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

        let lower = count / 2;
        let upper = count.div_ceil(2);
        let entry = KeyPid { key, child };

        let promoted = {
            let mut source = self.slots_mut();
            let mut target = sibling.slots_mut();

            if pos == lower || pos == upper {
                source.move_tail_to(pos, &mut target);
                entry
            } else if pos < lower {
                source.move_tail_to(lower, &mut target);
                source.insert(pos, entry);
                source.pop()
            } else {
                source.move_tail_to(upper, &mut target);
                target.insert(pos - upper, entry);
                target.remove(0)
            }
        };
        sibling.set_first_child(promoted.child);

        debug!(
            key,
            mid_key = promoted.key,
            left = self.key_count(),
            right = sibling.key_count(),
            "split non-leaf node"
        );
        Ok(promoted.key)
    }

    /// Child pointer to follow for `search_key`.
    ///
    /// Returns the pointer just before the first key strictly greater than
    /// `search_key`, or the last pointer if there is none. A key equal to a
    /// separator routes to the right of it.
    pub fn locate_child_ptr(&self, search_key: i32) -> PageId {
        let mut child = self.first_child();
        for slot in self.slots().iter() {
            if slot.key > search_key {
                break;
            }
            child = slot.child;
        }
        child
    }

    /// Key `index` paired with the pointer to its right.
    ///
    /// # Errors
    /// Returns `Error::NoSuchEntry` if `index` is outside `[0, key_count)`.
    pub fn read_key_pid(&self, index: usize) -> Result<(i32, PageId)> {
        let slot = self.slot(index)?;
        Ok((slot.key, slot.child))
    }

    /// The pointer to the left of key `index`, paired with that key.
    ///
    /// # Errors
    /// Returns `Error::NoSuchEntry` if `index` is outside `[0, key_count)`.
    pub fn read_pid_key(&self, index: usize) -> Result<(PageId, i32)> {
        let key = self.slot(index)?.key;
        let left = match index {
            0 => self.first_child(),
            _ => self.slot(index - 1)?.child,
        };
        Ok((left, key))
    }

    fn slot(&self, index: usize) -> Result<KeyPid> {
        let slots = self.slots();
        slots.get(index).ok_or(Error::NoSuchEntry {
            index,
            count: slots.len(),
        })
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.slots().iter().map(|s| s.key)
    }

    /// All `key_count + 1` child pointers in order.
    pub fn children(&self) -> impl Iterator<Item = PageId> + '_ {
        std::iter::once(self.first_child()).chain(self.slots().iter().map(|s| s.child))
    }

    /// The raw page image.
    pub fn as_bytes(&self) -> &[u8] {
        self.page.as_slice()
    }
}

impl Default for NonLeafNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NonLeafNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<i32> = self.keys().collect();
        let children: Vec<u32> = self.children().map(|p| p.0).collect();
        f.debug_struct("NonLeafNode")
            .field("capacity", &NON_LEAF_CAPACITY)
            .field("key_count", &keys.len())
            .field("keys", &keys)
            .field("children", &children)
            .finish()
    }
}
