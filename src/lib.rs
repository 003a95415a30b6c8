//! An arena-backed red black tree.
//!
//! `OrderedTree<T>` keeps values of any totally ordered type sorted under insertion and removal,
//! supports membership tests, and can be traversed either with a plain borrowing iterator or with
//! a `Cursor` that removes values mid-traversal. Nodes are stored in a `TypedArena` and refer to
//! each other through index handles.
//!
//! # Examples
//!
//! ```
//! use ordered_tree::OrderedTree;
//!
//! let mut tree = OrderedTree::new();
//! tree.insert(20);
//! tree.insert(10);
//! tree.insert(30);
//!
//! assert!(tree.contains(&10));
//! assert_eq!(tree.min(), Some(&10));
//! assert_eq!(tree.iter().cloned().collect::<Vec<u32>>(), vec![10, 20, 30]);
//! ```

pub mod arena;
pub mod red_black_tree;

pub use crate::red_black_tree::OrderedTree;
