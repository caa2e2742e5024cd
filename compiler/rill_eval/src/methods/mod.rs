//! Shared building blocks for native classes and package functions.
//!
//! - [`helpers`]: Argument validation, receiver access and native method
//!   construction
//! - [`compare`]: Default value ordering, comparator coercion and the
//!   fallible stable sort

pub mod compare;
pub mod helpers;
