//! Sparse sequence containers.
//!
//! A sparse sequence is a logical array of length `L` in which every index is either
//! *present* (holding a value) or *deleted* (a hole). The containers here are built for
//! workloads typical of collaborative text and list editing: many adjacent insertions
//! and deletions, occasional random access, and frequent compact JSON serialization.
//!
//! Three variants share one generic engine ([`crate::engine::RunList`]):
//!
//! - [`SparseArray<T>`] — arbitrary values, one per index.
//! - [`SparseString<E>`] — UTF-16 code units packed into string runs, or whole *embed*
//!   objects of type `E` that each occupy exactly one index and never merge.
//! - [`SparseIndices`] — no payload at all, just the presence/absence pattern.
//!
//! Internally all three are a run-length list: an ordered sequence of `Present(item)` /
//! `Deleted(len)` nodes, kept maximally merged.
#![allow(dead_code)]

mod array;
mod engine;
mod error;
mod indices;
mod item;
mod logging;
mod node;
mod slicer;
mod string;
mod wire;

pub use array::SparseArray;
pub use error::{SparseError, SparseResult};
pub use indices::SparseIndices;
pub use slicer::Slicer;
pub use string::{SparseString, StringElement};
