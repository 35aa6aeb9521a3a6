//! bplusnode - the node layer of a disk-backed B+Tree index.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Tree driver (not in this crate)                 │
//! │     descend · insert · propagate splits · create new roots      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Index Layer (index/btree)                    │
//! │      LeafNode (key, RecordId)*  ·  NonLeafNode ptr (key ptr)*    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Storage Layer (storage/)                    │
//! │         PageStore trait · DiskManager · MemoryPageStore         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, RecordId, Error, config)
//! - [`storage`] - Page stores and the raw page type
//! - [`index`] - B+Tree nodes
//!
//! # Quick Start
//! ```no_run
//! use bplusnode::index::btree::LeafNode;
//! use bplusnode::storage::{DiskManager, PageStore};
//! use bplusnode::{PageId, RecordId};
//!
//! let mut store = DiskManager::create("my_index.idx").unwrap();
//! let page_id = store.allocate_page().unwrap();
//!
//! let mut leaf = LeafNode::new();
//! leaf.insert(42, RecordId::new(PageId::new(7), 0)).unwrap();
//! leaf.write(page_id, &mut store).unwrap();
//! ```

pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, PageId, RecordId, Result};

pub use index::btree::{LeafNode, Locate, NonLeafNode};
pub use storage::page::{Page, PageType};
pub use storage::{DiskManager, MemoryPageStore, PageStore};
