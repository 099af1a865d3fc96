//! `SparseArray<T>`: a sparse sequence of arbitrary values, one per index. Present runs
//! are packed into small inline vectors (`smallvec`) so a run of a handful of adjacent
//! `set` calls doesn't force a heap allocation per element.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

use crate::engine::RunList;
use crate::error::{SparseError, SparseResult};
use crate::item::{HasLength, Mergeable, Sliceable, Splittable};
use crate::logging::log;
use crate::node::Node;
use crate::slicer::Slicer;
use crate::wire::{non_negative_integer, push_or_merge};

#[derive(Debug, Clone)]
pub(crate) struct ArrayRun<T>(SmallVec<[T; 8]>);

impl<T: Clone> ArrayRun<T> {
    fn get(&self, offset: usize) -> &T {
        &self.0[offset]
    }
}

impl<T: Clone + Debug> HasLength for ArrayRun<T> {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T: Clone + Debug> Splittable for ArrayRun<T> {
    fn split(&mut self, at: usize) -> Self {
        let right: SmallVec<[T; 8]> = self.0.drain(at..).collect();
        ArrayRun(right)
    }
}

impl<T: Clone + Debug> Mergeable for ArrayRun<T> {
    fn try_merge(&mut self, other: &Self) -> bool {
        // Arrays always merge with arrays.
        self.0.extend(other.0.iter().cloned());
        true
    }
}

impl<T: Clone + Debug> Sliceable for ArrayRun<T> {
    fn slice(&self, start: usize, end: usize) -> Self {
        ArrayRun(self.0[start..end].iter().cloned().collect())
    }
}

/// A sparse array of `T`: every index either holds a `T` or is a hole.
#[derive(Debug, Clone)]
pub struct SparseArray<T: Clone + Debug> {
    engine: RunList<ArrayRun<T>>,
}

impl<T: Clone + Debug> Default for SparseArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Debug> SparseArray<T> {
    pub fn new() -> Self {
        SparseArray {
            engine: RunList::new(),
        }
    }

    pub fn length(&self) -> usize {
        self.engine.length()
    }

    pub fn count(&self) -> usize {
        self.engine.count()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    pub fn has(&self, index: usize) -> bool {
        self.engine.has(index)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.engine
            .item_at(index)
            .map(|(run, offset)| run.get(offset))
    }

    pub fn count_at(&self, index: usize) -> usize {
        self.engine.count_at(index)
    }

    pub fn count_has(&self, index: usize) -> (usize, bool) {
        self.engine.count_has(index)
    }

    pub fn index_of_count(&self, count: usize, start: usize) -> Option<usize> {
        self.engine.index_of_count(count, start)
    }

    /// Overwrites `[index, index + values.len())` with `values`, returning the previous
    /// occupants as a fresh `SparseArray`. A no-op (returning an empty array) if
    /// `values` is empty.
    pub fn set(&mut self, index: usize, values: impl IntoIterator<Item = T>) -> SparseArray<T> {
        let run: SmallVec<[T; 8]> = values.into_iter().collect();
        if run.is_empty() {
            return SparseArray::new();
        }
        let displaced = self.engine.overwrite(index, Node::Present(ArrayRun(run)));
        SparseArray { engine: displaced }
    }

    /// Overwrites `[index, index + count)` with holes, returning the previous
    /// occupants. A no-op (returning an empty array) if `count == 0`.
    pub fn delete(&mut self, index: usize, count: usize) -> SparseArray<T> {
        if count == 0 {
            return SparseArray::new();
        }
        let displaced = self.engine.overwrite(index, Node::Deleted(count));
        SparseArray { engine: displaced }
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.engine
            .entries()
            .flat_map(|(start, run)| (0..run.len()).map(move |j| (start + j, run.get(j))))
    }

    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries().map(|(_, v)| v)
    }

    pub fn new_slicer(&self) -> Slicer<ArrayRun<T>> {
        self.engine.new_slicer()
    }
}

impl<T: Clone + Debug + Serialize> SparseArray<T> {
    /// Walks the node list, emitting one JSON array per present run and one JSON
    /// number per deletion run. The trailing untrimmed hole, if any, is omitted.
    pub fn serialize(&self) -> Vec<Value> {
        self.engine
            .significant_nodes()
            .iter()
            .filter_map(|n| match n {
                Node::Present(run) => {
                    let values: Vec<Value> = run
                        .0
                        .iter()
                        .map(|v| serde_json::to_value(v).expect("T must serialize to JSON"))
                        .collect();
                    Some(Value::Array(values))
                }
                Node::Deleted(0) => None,
                Node::Deleted(len) => Some(Value::from(*len as u64)),
            })
            .collect()
    }
}

impl<T: Clone + Debug + DeserializeOwned> SparseArray<T> {
    pub fn deserialize(elements: &[Value]) -> SparseResult<Self> {
        let mut nodes: Vec<Node<ArrayRun<T>>> = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            let node = match element {
                Value::Number(n) => {
                    let len = non_negative_integer(n, index)?;
                    if len == 0 {
                        continue;
                    }
                    Node::Deleted(len)
                }
                Value::Array(items) => {
                    if items.is_empty() {
                        continue;
                    }
                    let values: SmallVec<[T; 8]> = items
                        .iter()
                        .map(|v| {
                            serde_json::from_value(v.clone()).map_err(|e| {
                                log::warn!(index, reason = %e, "deserialize: array element rejected");
                                SparseError::InvalidSerialized {
                                    index,
                                    reason: format!("array element failed to deserialize: {e}"),
                                }
                            })
                        })
                        .collect::<SparseResult<_>>()?;
                    Node::Present(ArrayRun(values))
                }
                other => {
                    log::warn!(index, "deserialize: expected a number or an array element");
                    return Err(SparseError::InvalidSerialized {
                        index,
                        reason: format!("expected a number or an array, got {other}"),
                    });
                }
            };
            push_or_merge(&mut nodes, node);
        }
        Ok(SparseArray {
            engine: RunList::from_nodes(nodes),
        })
    }
}
