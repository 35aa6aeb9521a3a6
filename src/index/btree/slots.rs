//! Fixed-capacity ordered slot arrays over a node's byte region.
//!
//! Both node kinds store their entries as fixed-size records packed from the
//! start of a byte region, with the occupancy count kept in the node trailer.
//! [`Slots`] is a read-only view; [`SlotsMut`] adds the in-place shifting
//! operations (insert, remove, tail moves) and writes the count through on
//! every change, so the page image is always consistent.
//!
//! Bytes past the occupied prefix are kept zero.

use std::marker::PhantomData;

use super::Locate;

/// A fixed-size record that can live in a slot array.
pub(crate) trait Slot: Copy + 'static {
    /// Encoded size in bytes.
    const SIZE: usize;

    fn decode(bytes: &[u8]) -> Self;

    fn encode(&self, bytes: &mut [u8]);

    /// Sort key of this record.
    fn key(&self) -> i32;
}

#[inline]
fn decode_count(bytes: &[u8]) -> usize {
    u16::from_le_bytes([bytes[0], bytes[1]]) as usize
}

/// Read-only view over an occupied slot prefix.
pub(crate) struct Slots<'a, S> {
    region: &'a [u8],
    len: usize,
    _slot: PhantomData<S>,
}

impl<'a, S: Slot> Slots<'a, S> {
    pub fn new(region: &'a [u8], len: usize) -> Self {
        debug_assert!(len * S::SIZE <= region.len());
        Self {
            region,
            len,
            _slot: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn get(&self, index: usize) -> Option<S> {
        (index < self.len).then(|| S::decode(&self.region[index * S::SIZE..]))
    }

    pub fn iter(&self) -> impl Iterator<Item = S> + 'a {
        let region = self.region;
        (0..self.len).map(move |i| S::decode(&region[i * S::SIZE..]))
    }

    /// Linear scan in key order.
    ///
    /// `Found(i)` if slot `i` holds `key`, otherwise `NotFound(i)` where `i`
    /// is the first slot with a strictly greater key (or `len`).
    pub fn locate(&self, key: i32) -> Locate {
        for (i, slot) in self.iter().enumerate() {
            let k = slot.key();
            if k == key {
                return Locate::Found(i);
            }
            if k > key {
                return Locate::NotFound(i);
            }
        }
        Locate::NotFound(self.len)
    }
}

/// Mutable slot array; owns the occupancy count bytes for its lifetime.
pub(crate) struct SlotsMut<'a, S> {
    region: &'a mut [u8],
    count: &'a mut [u8],
    len: usize,
    _slot: PhantomData<S>,
}

impl<'a, S: Slot> SlotsMut<'a, S> {
    /// `count` is the two little-endian bytes holding the occupancy.
    pub fn new(region: &'a mut [u8], count: &'a mut [u8]) -> Self {
        let len = decode_count(count);
        debug_assert!(len * S::SIZE <= region.len());
        Self {
            region,
            count,
            len,
            _slot: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.region.len() / S::SIZE
    }

    pub fn as_slots(&self) -> Slots<'_, S> {
        Slots::new(&self.region[..], self.len)
    }

    pub fn get(&self, index: usize) -> Option<S> {
        self.as_slots().get(index)
    }

    fn set_len(&mut self, len: usize) {
        self.len = len;
        self.count.copy_from_slice(&(len as u16).to_le_bytes());
    }

    /// Insert at `index`, shifting `[index, len)` one slot right.
    ///
    /// # Panics
    /// Panics if the array is full or `index > len`.
    pub fn insert(&mut self, index: usize, slot: S) {
        assert!(self.len < self.capacity(), "slot array full");
        assert!(index <= self.len, "insert index out of range");

        let at = index * S::SIZE;
        let end = self.len * S::SIZE;
        self.region.copy_within(at..end, at + S::SIZE);
        slot.encode(&mut self.region[at..at + S::SIZE]);
        self.set_len(self.len + 1);
    }

    pub fn push(&mut self, slot: S) {
        self.insert(self.len, slot);
    }

    /// Remove the slot at `index`, shifting the remainder one slot left.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> S {
        assert!(index < self.len, "remove index out of range");

        let at = index * S::SIZE;
        let end = self.len * S::SIZE;
        let slot = S::decode(&self.region[at..]);
        self.region.copy_within(at + S::SIZE..end, at);
        self.region[end - S::SIZE..end].fill(0);
        self.set_len(self.len - 1);
        slot
    }

    /// Remove the last slot.
    ///
    /// # Panics
    /// Panics if empty.
    pub fn pop(&mut self) -> S {
        self.remove(self.len - 1)
    }

    /// Move slots `[at, len)` verbatim to the front of the empty `dst`,
    /// truncating `self` to `at`.
    ///
    /// # Panics
    /// Panics if `dst` is not empty, `at > len`, or `dst` is too small.
    pub fn move_tail_to(&mut self, at: usize, dst: &mut SlotsMut<'_, S>) {
        assert_eq!(dst.len, 0, "destination must be empty");
        assert!(at <= self.len, "split point out of range");
        let moved = self.len - at;
        assert!(moved <= dst.capacity(), "destination too small");

        let from = at * S::SIZE;
        let end = self.len * S::SIZE;
        dst.region[..end - from].copy_from_slice(&self.region[from..end]);
        self.region[from..end].fill(0);

        dst.set_len(moved);
        self.set_len(at);
    }
}
