//! `SparseString<E>`: a sparse sequence whose present values are either single UTF-16
//! code units (packed into string runs) or whole *embed* objects of type `E`. Each embed
//! occupies exactly one index and never merges with a neighbor, not even another embed.
//!
//! Indexing is by UTF-16 code unit, not by Unicode scalar value: a Rust `String` is
//! UTF-8 and has no 1:1 correspondence with code-unit offsets, so the present-run
//! payload here is `SmallVec<[u16; 16]>`, not `String`; a `String` only appears at the
//! `set`/`serialize` boundary, where it is encoded/decoded via `encode_utf16`.

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

/// The payload of one Present node: either a run of UTF-16 code units, or a single
/// opaque embed value. These are kept in one enum (rather than two node kinds) because
/// the engine is generic over a single `Item` type per container.
#[derive(Debug, Clone)]
pub(crate) enum StringItem<E> {
    Str(SmallVec<[u16; 16]>),
    Embed(E),
}

impl<E: Clone + Debug> HasLength for StringItem<E> {
    fn len(&self) -> usize {
        match self {
            StringItem::Str(units) => units.len(),
            StringItem::Embed(_) => 1,
        }
    }
}

impl<E: Clone + Debug> Splittable for StringItem<E> {
    fn split(&mut self, at: usize) -> Self {
        match self {
            StringItem::Str(units) => StringItem::Str(units.drain(at..).collect()),
            // An embed has length 1, so `0 < at < 1` never holds; the engine never
            // calls `split` on it.
            StringItem::Embed(_) => unreachable!("embeds have length 1 and are never split"),
        }
    }
}

impl<E: Clone + Debug> Mergeable for StringItem<E> {
    fn try_merge(&mut self, other: &Self) -> bool {
        match (self, other) {
            // Strings merge with strings.
            (StringItem::Str(a), StringItem::Str(b)) => {
                a.extend_from_slice(b);
                true
            }
            // Embeds never merge, not even embed-with-embed.
            _ => false,
        }
    }
}

impl<E: Clone + Debug> Sliceable for StringItem<E> {
    fn slice(&self, start: usize, end: usize) -> Self {
        match self {
            StringItem::Str(units) => StringItem::Str(units[start..end].iter().copied().collect()),
            StringItem::Embed(e) => {
                debug_assert_eq!((start, end), (0, 1));
                StringItem::Embed(e.clone())
            }
        }
    }
}

/// One logical value of a `SparseString<E>`: a UTF-16 code unit, or a reference to an
/// embed object occupying that index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringElement<T> {
    CodeUnit(u16),
    Embed(T),
}

/// What to write with [`SparseString::set`]: either a run of text, or a single embed.
/// `String`/`&str` convert into `StringPatch::Str` automatically; embeds are written
/// explicitly with [`StringPatch::Embed`] since `E` has no reserved conversion.
pub enum StringPatch<E> {
    Str(String),
    Embed(E),
}

impl<E> From<String> for StringPatch<E> {
    fn from(value: String) -> Self {
        StringPatch::Str(value)
    }
}

impl<E> From<&str> for StringPatch<E> {
    fn from(value: &str) -> Self {
        StringPatch::Str(value.to_string())
    }
}

/// A sparse string: every index holds a UTF-16 code unit, an embed of type `E`, or is a
/// hole.
#[derive(Debug, Clone)]
pub struct SparseString<E: Clone + Debug> {
    engine: RunList<StringItem<E>>,
}

impl<E: Clone + Debug> Default for SparseString<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + Debug> SparseString<E> {
    pub fn new() -> Self {
        SparseString {
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

    pub fn get(&self, index: usize) -> Option<StringElement<&E>> {
        let (item, offset) = self.engine.item_at(index)?;
        Some(match item {
            StringItem::Str(units) => StringElement::CodeUnit(units[offset]),
            StringItem::Embed(e) => StringElement::Embed(e),
        })
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

    /// Overwrites `[index, index + len)` with a text run or a single embed, returning
    /// the previous occupants as a fresh `SparseString`. An empty string is a no-op
    /// (returning an empty string), matching `set(i, empty)` for the other variants.
    pub fn set(&mut self, index: usize, patch: impl Into<StringPatch<E>>) -> SparseString<E> {
        let node = match patch.into() {
            StringPatch::Str(s) => {
                let units: SmallVec<[u16; 16]> = s.encode_utf16().collect();
                if units.is_empty() {
                    return SparseString::new();
                }
                Node::Present(StringItem::Str(units))
            }
            StringPatch::Embed(e) => Node::Present(StringItem::Embed(e)),
        };
        let displaced = self.engine.overwrite(index, node);
        SparseString { engine: displaced }
    }

    /// Overwrites `[index, index + count)` with holes, returning the previous
    /// occupants. A no-op (returning an empty string) if `count == 0`.
    pub fn delete(&mut self, index: usize, count: usize) -> SparseString<E> {
        if count == 0 {
            return SparseString::new();
        }
        let displaced = self.engine.overwrite(index, Node::Deleted(count));
        SparseString { engine: displaced }
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, StringElement<&E>)> + '_ {
        self.engine.entries().flat_map(|(start, item)| {
            let left: Box<dyn Iterator<Item = (usize, StringElement<&E>)> + '_> = match item {
                StringItem::Str(units) => Box::new(
                    units
                        .iter()
                        .enumerate()
                        .map(move |(j, &cu)| (start + j, StringElement::CodeUnit(cu))),
                ),
                StringItem::Embed(e) => {
                    Box::new(std::iter::once((start, StringElement::Embed(e))))
                }
            };
            left
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries().map(|(k, _)| k)
    }

    pub fn new_slicer(&self) -> Slicer<StringItem<E>> {
        self.engine.new_slicer()
    }
}

impl<E: Clone + Debug + Serialize> SparseString<E> {
    /// Walks the node list, emitting one JSON string per string run, one JSON value per
    /// embed, and one JSON number per deletion run. The trailing untrimmed hole, if
    /// any, is omitted.
    ///
    /// A present string run is decoded with `String::from_utf16`; a run that holds a
    /// lone surrogate half (possible if a caller split an astral character's surrogate
    /// pair across a boundary, which a Rust `String` cannot itself represent) falls
    /// back to `from_utf16_lossy` rather than failing the whole serialization.
    pub fn serialize(&self) -> Vec<Value> {
        self.engine
            .significant_nodes()
            .iter()
            .filter_map(|n| match n {
                Node::Present(StringItem::Str(units)) => {
                    let s = String::from_utf16(units)
                        .unwrap_or_else(|_| String::from_utf16_lossy(units));
                    Some(Value::String(s))
                }
                Node::Present(StringItem::Embed(e)) => {
                    Some(serde_json::to_value(e).expect("E must serialize to JSON"))
                }
                Node::Deleted(0) => None,
                Node::Deleted(len) => Some(Value::from(*len as u64)),
            })
            .collect()
    }
}

impl<E: Clone + Debug + DeserializeOwned> SparseString<E> {
    /// Parses `elements`: numbers are deletion runs; JSON strings are text runs;
    /// any other non-null value (object or array) is an embed; `null` and JSON numbers
    /// that aren't valid deletion counts are rejected.
    pub fn deserialize(elements: &[Value]) -> SparseResult<Self> {
        let mut nodes: Vec<Node<StringItem<E>>> = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            let node = match element {
                Value::Number(n) => {
                    let len = non_negative_integer(n, index)?;
                    if len == 0 {
                        continue;
                    }
                    Node::Deleted(len)
                }
                Value::String(s) => {
                    if s.is_empty() {
                        continue;
                    }
                    let units: SmallVec<[u16; 16]> = s.encode_utf16().collect();
                    Node::Present(StringItem::Str(units))
                }
                Value::Null => {
                    log::warn!(index, "deserialize: null is not a valid embed");
                    return Err(SparseError::InvalidEmbed {
                        index,
                        found: "null".to_string(),
                    });
                }
                Value::Bool(_) => {
                    log::warn!(index, "deserialize: a bool is not a valid embed");
                    return Err(SparseError::InvalidEmbed {
                        index,
                        found: element.to_string(),
                    });
                }
                Value::Object(_) | Value::Array(_) => {
                    let embed: E = serde_json::from_value(element.clone()).map_err(|e| {
                        log::warn!(index, reason = %e, "deserialize: embed rejected");
                        SparseError::InvalidSerialized {
                            index,
                            reason: format!("embed failed to deserialize: {e}"),
                        }
                    })?;
                    Node::Present(StringItem::Embed(embed))
                }
            };
            push_or_merge(&mut nodes, node);
        }
        Ok(SparseString {
            engine: RunList::from_nodes(nodes),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Annotation {
        a: Option<String>,
        b: Option<String>,
    }

    fn ann(key: &str, value: &str) -> Annotation {
        let mut a = Annotation { a: None, b: None };
        match key {
            "a" => a.a = Some(value.to_string()),
            "b" => a.b = Some(value.to_string()),
            _ => unreachable!(),
        }
        a
    }

    // S4: string runs merge; embeds do not.
    #[test]
    fn string_runs_merge_embeds_do_not() {
        let mut s: SparseString<Annotation> = SparseString::new();
        s.set(0, "ab");
        s.set(5, "cd");
        assert_eq!(s.serialize(), vec![json!("ab"), json!(3), json!("cd")]);

        s.set(5, StringPatch::Embed(ann("a", "foo")));
        s.set(6, StringPatch::Embed(ann("b", "bar")));
        assert_eq!(
            s.serialize(),
            vec![
                json!("ab"),
                json!(3),
                serde_json::to_value(ann("a", "foo")).unwrap(),
                serde_json::to_value(ann("b", "bar")).unwrap(),
            ]
        );
        assert_eq!(s.get(5), Some(StringElement::Embed(&ann("a", "foo"))));
        assert_eq!(s.get(6), Some(StringElement::Embed(&ann("b", "bar"))));
    }

    #[test]
    fn adjacent_string_sets_merge_into_one_run() {
        let mut s: SparseString<Annotation> = SparseString::new();
        s.set(0, "he");
        s.set(2, "llo");
        assert_eq!(s.serialize(), vec![json!("hello")]);
    }

    #[test]
    fn get_returns_code_units() {
        let mut s: SparseString<Annotation> = SparseString::new();
        s.set(0, "hi");
        assert_eq!(s.get(0), Some(StringElement::CodeUnit('h' as u16)));
        assert_eq!(s.get(1), Some(StringElement::CodeUnit('i' as u16)));
        assert_eq!(s.get(2), None);
    }

    #[test]
    fn deserialize_rejects_null() {
        let elements = vec![json!(null)];
        let err = SparseString::<Annotation>::deserialize(&elements).unwrap_err();
        assert!(matches!(err, SparseError::InvalidEmbed { .. }));
    }

    #[test]
    fn deserialize_accepts_object_embed_and_plain_string() {
        let elements = vec![
            json!("hi"),
            serde_json::to_value(ann("a", "x")).unwrap(),
        ];
        let s: SparseString<Annotation> = SparseString::deserialize(&elements).unwrap();
        assert_eq!(s.get(0), Some(StringElement::CodeUnit('h' as u16)));
        assert_eq!(s.get(1), Some(StringElement::CodeUnit('i' as u16)));
        assert_eq!(s.get(2), Some(StringElement::Embed(&ann("a", "x"))));
    }

    #[test]
    fn empty_string_set_is_a_no_op() {
        let mut s: SparseString<Annotation> = SparseString::new();
        s.set(0, "ab");
        let before = s.serialize();
        let displaced = s.set(1, "");
        assert!(displaced.is_empty());
        assert_eq!(s.serialize(), before);
    }

    #[test]
    fn reapplying_the_displaced_window_undoes_a_set() {
        let mut s: SparseString<Annotation> = SparseString::new();
        s.set(0, "hello");
        let before = s.serialize();

        let displaced = s.delete(1, 3);
        assert_ne!(s.serialize(), before);

        let units: Vec<u16> = displaced
            .entries()
            .map(|(_, element)| match element {
                StringElement::CodeUnit(u) => u,
                StringElement::Embed(_) => panic!("expected only code units"),
            })
            .collect();
        let restored = String::from_utf16(&units).unwrap();
        s.set(1, restored.as_str());
        assert_eq!(s.serialize(), before);
    }
}
