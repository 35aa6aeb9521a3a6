//! Node layer integration tests.
//!
//! A minimal tree driver (descend, insert, propagate splits, grow the root)
//! is built here on top of the public node API to check that leaf and
//! non-leaf nodes compose into a working B+Tree over a real page store.

use bplusnode::index::btree::{LeafNode, NonLeafNode, LEAF_CAPACITY};
use bplusnode::storage::{DiskManager, MemoryPageStore, PageStore};
use bplusnode::{Error, Locate, PageId, RecordId, Result};
use tempfile::tempdir;

/// Reference driver. `height == 0` means the root is a leaf.
struct TestTree<S: PageStore> {
    store: S,
    root: PageId,
    height: usize,
}

impl<S: PageStore> TestTree<S> {
    fn new(mut store: S) -> Result<Self> {
        let root = store.allocate_page()?;
        LeafNode::new().write(root, &mut store)?;
        Ok(Self {
            store,
            root,
            height: 0,
        })
    }

    /// Walk from the root to the leaf covering `key`, returning the
    /// non-leaf path and the leaf page id.
    fn descend(&self, key: i32) -> Result<(Vec<PageId>, PageId)> {
        let mut path = Vec::with_capacity(self.height);
        let mut pid = self.root;
        let mut node = NonLeafNode::new();
        for _ in 0..self.height {
            node.read(pid, &self.store)?;
            path.push(pid);
            pid = node.locate_child_ptr(key);
        }
        Ok((path, pid))
    }

    fn insert(&mut self, key: i32, rid: RecordId) -> Result<()> {
        let (mut path, leaf_pid) = self.descend(key)?;

        let mut leaf = LeafNode::new();
        leaf.read(leaf_pid, &self.store)?;
        match leaf.insert(key, rid) {
            Ok(()) => return leaf.write(leaf_pid, &mut self.store),
            Err(Error::NodeFull) => {}
            Err(e) => return Err(e),
        }

        let sibling_pid = self.store.allocate_page()?;
        let mut sibling = LeafNode::new();
        let mut separator = leaf.insert_and_split(key, rid, &mut sibling)?;
        sibling.set_next_node_ptr(leaf.next_node_ptr());
        leaf.set_next_node_ptr(Some(sibling_pid));
        leaf.write(leaf_pid, &mut self.store)?;
        sibling.write(sibling_pid, &mut self.store)?;

        let mut right = sibling_pid;
        while let Some(parent_pid) = path.pop() {
            let mut parent = NonLeafNode::new();
            parent.read(parent_pid, &self.store)?;
            match parent.insert(separator, right) {
                Ok(()) => return parent.write(parent_pid, &mut self.store),
                Err(Error::NodeFull) => {}
                Err(e) => return Err(e),
            }

            let split_pid = self.store.allocate_page()?;
            let mut split = NonLeafNode::new();
            separator = parent.insert_and_split(separator, right, &mut split)?;
            parent.write(parent_pid, &mut self.store)?;
            split.write(split_pid, &mut self.store)?;
            right = split_pid;
        }

        let new_root = self.store.allocate_page()?;
        let mut root = NonLeafNode::new();
        root.initialize_root(self.root, separator, right);
        root.write(new_root, &mut self.store)?;
        self.root = new_root;
        self.height += 1;
        Ok(())
    }

    fn get(&self, key: i32) -> Result<Option<RecordId>> {
        let (_, leaf_pid) = self.descend(key)?;
        let mut leaf = LeafNode::new();
        leaf.read(leaf_pid, &self.store)?;
        match leaf.locate(key) {
            Locate::Found(i) => Ok(Some(leaf.read_entry(i)?.1)),
            Locate::NotFound(_) => Ok(None),
        }
    }

    /// Keys `>= from` in order, following the leaf sibling chain.
    fn scan_from(&self, from: i32) -> Result<Vec<i32>> {
        let (_, mut pid) = self.descend(from)?;
        let mut out = Vec::new();
        let mut leaf = LeafNode::new();
        loop {
            leaf.read(pid, &self.store)?;
            out.extend(leaf.entries().map(|(k, _)| k).filter(|&k| k >= from));
            match leaf.next_node_ptr() {
                Some(next) => pid = next,
                None => return Ok(out),
            }
        }
    }
}

fn rid_for(key: i32) -> RecordId {
    RecordId::new(PageId::new(key as u32 / 64), key as u32 % 64)
}

/// Deterministic permutation of `0..n` for prime `n`.
fn shuffled(n: i32) -> impl Iterator<Item = i32> {
    (0..n).map(move |i| ((i as i64 * 7919) % n as i64) as i32)
}

#[test]
fn test_leaf_root_until_first_split() {
    let mut tree = TestTree::new(MemoryPageStore::new()).unwrap();
    for k in 0..LEAF_CAPACITY as i32 {
        tree.insert(k, rid_for(k)).unwrap();
    }
    assert_eq!(tree.height, 0);

    tree.insert(LEAF_CAPACITY as i32, rid_for(0)).unwrap();
    assert_eq!(tree.height, 1);

    let mut root = NonLeafNode::new();
    root.read(tree.root, &tree.store).unwrap();
    assert_eq!(root.key_count(), 1);
    assert_eq!(tree.scan_from(i32::MIN).unwrap().len(), LEAF_CAPACITY + 1);
}

#[test]
fn test_random_inserts_and_lookups() {
    let n = 10_007;
    let mut tree = TestTree::new(MemoryPageStore::new()).unwrap();
    for k in shuffled(n) {
        tree.insert(k, rid_for(k)).unwrap();
    }

    assert!(tree.height >= 1);
    for k in (0..n).step_by(37) {
        assert_eq!(tree.get(k).unwrap(), Some(rid_for(k)));
    }
    assert_eq!(tree.get(n).unwrap(), None);
    assert_eq!(tree.get(-5).unwrap(), None);

    let all = tree.scan_from(i32::MIN).unwrap();
    assert_eq!(all, (0..n).collect::<Vec<_>>());

    let tail = tree.scan_from(n - 10).unwrap();
    assert_eq!(tail, (n - 10..n).collect::<Vec<_>>());
}

#[test]
fn test_duplicate_insert_is_rejected_through_tree() {
    let mut tree = TestTree::new(MemoryPageStore::new()).unwrap();
    for k in 0..1000 {
        tree.insert(k, rid_for(k)).unwrap();
    }
    assert!(matches!(
        tree.insert(500, rid_for(1)),
        Err(Error::DuplicateKey(500))
    ));
    assert_eq!(tree.get(500).unwrap(), Some(rid_for(500)));
}

#[test]
fn test_ascending_inserts_grow_root_twice() {
    let n = 100_000;
    let mut tree = TestTree::new(MemoryPageStore::new()).unwrap();
    for k in 0..n {
        tree.insert(k, rid_for(k)).unwrap();
    }

    assert_eq!(tree.height, 2);
    for k in [0, 1, 169, 170, 171, 50_000, 86_000, n - 1] {
        assert_eq!(tree.get(k).unwrap(), Some(rid_for(k)), "key {}", k);
    }
    assert_eq!(tree.scan_from(i32::MIN).unwrap().len(), n as usize);
}

#[test]
fn test_negative_and_zero_keys() {
    let mut tree = TestTree::new(MemoryPageStore::new()).unwrap();
    for k in -500..=500 {
        tree.insert(k, RecordId::default()).unwrap();
    }
    assert_eq!(tree.get(0).unwrap(), Some(RecordId::default()));
    assert_eq!(tree.scan_from(-2).unwrap()[..3], [-2, -1, 0]);
}

#[test]
fn test_tree_persists_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tree.idx");

    let (root, height) = {
        let mut tree = TestTree::new(DiskManager::create(&path).unwrap()).unwrap();
        for k in shuffled(997) {
            tree.insert(k * 3, rid_for(k)).unwrap();
        }
        (tree.root, tree.height)
    };

    let tree = TestTree {
        store: DiskManager::open(&path).unwrap(),
        root,
        height,
    };
    assert_eq!(tree.get(300).unwrap(), Some(rid_for(100)));
    assert_eq!(tree.get(301).unwrap(), None);
    let all = tree.scan_from(i32::MIN).unwrap();
    assert_eq!(all, (0..997).map(|k| k * 3).collect::<Vec<_>>());
}

#[test]
fn test_corrupted_node_page_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tree.idx");

    let mut store = DiskManager::create(&path).unwrap();
    let pid = store.allocate_page().unwrap();
    let mut leaf = LeafNode::new();
    leaf.insert(1, rid_for(1)).unwrap();
    leaf.write(pid, &mut store).unwrap();

    let mut page = store.read_page(pid).unwrap();
    page.as_mut_slice()[0] ^= 0xFF;
    store.write_page(pid, &page).unwrap();

    let mut reloaded = LeafNode::new();
    assert!(matches!(
        reloaded.read(pid, &store),
        Err(Error::Corrupted { .. })
    ));
}
