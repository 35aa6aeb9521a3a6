//! Storage layer - page stores and page formats.
//!
//! This module handles persistent storage:
//! - [`PageStore`] - The read/write-by-page-id contract nodes are encoded through
//! - [`DiskManager`] - Single-file store
//! - [`MemoryPageStore`] - In-memory store
//! - [`page`] - Page types and layouts

mod disk_manager;
mod memory;
pub mod page;
mod page_store;

pub use disk_manager::DiskManager;
pub use memory::MemoryPageStore;
pub use page_store::PageStore;
