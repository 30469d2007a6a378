#![forbid(unsafe_code)]
//! A thread safe AVL tree of unique values with O(log(N)) insert,
//! remove, search, and rank access. See the tree module for details.

#[macro_use]
mod tracing_helpers;

pub(crate) mod avl;
pub mod tree;
