//! Index structures.
//!
//! - [`btree`] - B+Tree leaf and non-leaf nodes

pub mod btree;
