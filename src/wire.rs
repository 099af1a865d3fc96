//! Shared helpers for the JSON wire format, used by all three facades.

use crate::error::{SparseError, SparseResult};
use crate::item::Item;
use crate::logging::log;
use crate::node::Node;

/// Validates that `n` is a non-negative safe integer and returns it as a `usize`.
pub(crate) fn non_negative_integer(n: &serde_json::Number, index: usize) -> SparseResult<usize> {
    n.as_u64().map(|v| v as usize).ok_or_else(|| {
        log::warn!(index, "deserialize: {n} is not a non-negative integer");
        SparseError::InvalidSerialized {
            index,
            reason: format!("{n} is not a non-negative integer"),
        }
    })
}

/// Deserialize-time tolerance: merge an incoming node into the previous one if
/// possible, matching the engine's own maximally-merged invariant, so a handwritten
/// (redundant) input round-trips into the same canonical shape a fresh `set` sequence
/// would have produced.
pub(crate) fn push_or_merge<I: Item>(nodes: &mut Vec<Node<I>>, node: Node<I>) {
    if let Some(last) = nodes.last_mut() {
        if last.try_merge(&node) {
            return;
        }
    }
    nodes.push(node);
}
