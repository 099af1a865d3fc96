//! `SparseIndices`: a sparse sequence carrying no payload at all, just the
//! presence/absence pattern. Memory- and JSON-optimal when only membership matters.

use serde_json::Value;

use crate::engine::RunList;
use crate::error::SparseResult;
use crate::item::{HasLength, Mergeable, Sliceable, Splittable};
use crate::logging::log;
use crate::node::Node;
use crate::slicer::Slicer;
use crate::wire::{non_negative_integer, push_or_merge};

/// A run of `n` present (valueless) positions. The item's only content is its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Count(pub(crate) usize);

impl HasLength for Count {
    fn len(&self) -> usize {
        self.0
    }
}

impl Splittable for Count {
    fn split(&mut self, at: usize) -> Self {
        let right = self.0 - at;
        self.0 = at;
        Count(right)
    }
}

impl Mergeable for Count {
    fn try_merge(&mut self, other: &Self) -> bool {
        // Index-count items always merge, by summation.
        self.0 += other.0;
        true
    }
}

impl Sliceable for Count {
    fn slice(&self, start: usize, end: usize) -> Self {
        Count(end - start)
    }
}

/// A sparse set of present indices: every index is either present or a hole, with no
/// associated value.
#[derive(Debug, Clone, Default)]
pub struct SparseIndices {
    engine: RunList<Count>,
}

impl SparseIndices {
    pub fn new() -> Self {
        SparseIndices {
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

    pub fn count_at(&self, index: usize) -> usize {
        self.engine.count_at(index)
    }

    pub fn count_has(&self, index: usize) -> (usize, bool) {
        self.engine.count_has(index)
    }

    pub fn index_of_count(&self, count: usize, start: usize) -> Option<usize> {
        self.engine.index_of_count(count, start)
    }

    /// Marks `[index, index + count)` present, returning the previous occupants (as a
    /// `SparseIndices` of the same window) for undo/transform composition. A no-op if
    /// `count == 0`.
    pub fn set(&mut self, index: usize, count: usize) -> SparseIndices {
        if count == 0 {
            return SparseIndices::new();
        }
        let displaced = self.engine.overwrite(index, Node::Present(Count(count)));
        SparseIndices { engine: displaced }
    }

    /// Marks `[index, index + count)` as holes, returning the previous occupants. A
    /// no-op if `count == 0`.
    pub fn delete(&mut self, index: usize, count: usize) -> SparseIndices {
        if count == 0 {
            return SparseIndices::new();
        }
        let displaced = self.engine.overwrite(index, Node::Deleted(count));
        SparseIndices { engine: displaced }
    }

    /// Present positions, in order. There is no `get`/`entries`/`items`: without a
    /// payload, presence is the only observation left to make.
    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.engine
            .entries()
            .flat_map(|(start, item)| (start..start + item.0))
    }

    pub fn new_slicer(&self) -> Slicer<Count> {
        self.engine.new_slicer()
    }

    /// Walks the node list, emitting one JSON number per run, with present-count and
    /// deleted-count runs distinguished by position parity (even = present, odd =
    /// deleted) rather than by type. A leading hole is encoded as a `0` at position 0
    /// to preserve the parity rule.
    pub fn serialize(&self) -> Vec<Value> {
        let nodes = self.engine.significant_nodes();
        let mut out = Vec::with_capacity(nodes.len() + 1);
        if matches!(nodes.first(), Some(Node::Deleted(_))) {
            out.push(Value::from(0u64));
        }
        for node in nodes {
            out.push(Value::from(node.len() as u64));
        }
        out
    }

    /// Parses `elements`: position parity (not element kind — every element is a JSON
    /// number here) decides present vs. deleted: even positions are present-run counts,
    /// odd positions are delete-run counts. A `0` is tolerated at any position
    /// (including position 0) and simply contributes no node.
    pub fn deserialize(elements: &[Value]) -> SparseResult<Self> {
        let mut nodes: Vec<Node<Count>> = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            let n = match element {
                Value::Number(n) => n,
                other => {
                    log::warn!(index, "deserialize: expected a non-negative integer element");
                    return Err(crate::error::SparseError::InvalidSerialized {
                        index,
                        reason: format!("expected a non-negative integer, got {other}"),
                    });
                }
            };
            let len = non_negative_integer(n, index)?;
            if len == 0 {
                continue;
            }
            let node = if index % 2 == 0 {
                Node::Present(Count(len))
            } else {
                Node::Deleted(len)
            };
            push_or_merge(&mut nodes, node);
        }
        Ok(SparseIndices {
            engine: RunList::from_nodes(nodes),
        })
    }
}
