//! Model-based fuzzing of `SparseIndices` against a plain `Vec<bool>` oracle, checking
//! the universal invariants after every random operation.

use rand::{rngs::StdRng, Rng, SeedableRng};
use sparse_rle::SparseIndices;

#[derive(Debug, Clone, Copy)]
enum Interaction {
    Set { at: usize, len: usize },
    Delete { at: usize, len: usize },
}

impl Interaction {
    fn apply(&self, oracle: &mut Vec<bool>, indices: &mut SparseIndices) {
        match *self {
            Interaction::Set { at, len } => {
                if oracle.len() < at + len {
                    oracle.resize(at + len, false);
                }
                for slot in &mut oracle[at..at + len] {
                    *slot = true;
                }
                indices.set(at, len);
            }
            Interaction::Delete { at, len } => {
                if at < oracle.len() {
                    let end = (at + len).min(oracle.len());
                    for slot in &mut oracle[at..end] {
                        *slot = false;
                    }
                }
                indices.delete(at, len);
            }
        }
    }
}

fn oracle_length(oracle: &[bool]) -> usize {
    oracle.iter().rposition(|&p| p).map_or(0, |i| i + 1)
}

fn assert_matches_oracle(oracle: &[bool], indices: &SparseIndices) {
    let len = oracle_length(oracle);
    assert_eq!(indices.length(), len, "length mismatch");
    let count = oracle.iter().filter(|&&p| p).count();
    assert_eq!(indices.count(), count, "count mismatch");
    assert_eq!(indices.is_empty(), count == 0);

    let mut running = 0usize;
    for i in 0..len {
        let present = oracle.get(i).copied().unwrap_or(false);
        assert_eq!(indices.has(i), present, "has({i}) mismatch");
        assert_eq!(indices.count_at(i), running, "count_at({i}) mismatch");
        if present {
            running += 1;
        }
    }
    assert_eq!(indices.count_at(len), count);
    assert_eq!(indices.count_at(len + 5), count);

    // Universal invariant 6/7: index_of_count round-trips against the oracle.
    let present_positions: Vec<usize> = (0..len).filter(|&i| oracle[i]).collect();
    for (c, &pos) in present_positions.iter().enumerate() {
        let found = indices.index_of_count(c, 0).unwrap();
        assert_eq!(found, pos);
        assert!(indices.has(found));
        assert_eq!(indices.count_at(found), c);
    }
    assert_eq!(indices.index_of_count(count, 0), None);
}

fn gen_interaction(rng: &mut StdRng, bound: usize) -> Interaction {
    let at = rng.gen_range(0..bound.max(1));
    let len = rng.gen_range(1..8);
    if rng.gen_bool(0.5) {
        Interaction::Set { at, len }
    } else {
        Interaction::Delete { at, len }
    }
}

#[test]
fn fuzz_against_vec_bool_oracle() {
    for seed in 0u64..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut oracle: Vec<bool> = Vec::new();
        let mut indices = SparseIndices::new();
        for _ in 0..200 {
            let interaction = gen_interaction(&mut rng, oracle_length(&oracle) + 20);
            interaction.apply(&mut oracle, &mut indices);
            assert_matches_oracle(&oracle, &indices);
        }

        // Round-trip law: deserialize(serialize(x)) observes the same as x.
        let bytes = indices.serialize();
        let restored = SparseIndices::deserialize(&bytes).unwrap();
        assert_eq!(restored.serialize(), bytes);
        assert_eq!(restored.length(), indices.length());
        assert_eq!(restored.count(), indices.count());

        // Clone law: equals under all public observations, independent afterwards.
        let mut cloned = indices.clone();
        assert_eq!(cloned.serialize(), indices.serialize());
        cloned.set(0, 3);
        assert_ne!(cloned.serialize(), indices.serialize());
    }
}

#[test]
fn delete_already_deleted_range_is_structurally_stable() {
    let mut indices = SparseIndices::new();
    indices.set(0, 5);
    indices.delete(1, 2);
    let before = indices.serialize();
    indices.delete(1, 2);
    assert_eq!(indices.serialize(), before);
}

#[test]
fn zero_length_ops_are_no_ops() {
    let mut indices = SparseIndices::new();
    indices.set(0, 5);
    let before = indices.serialize();
    let displaced = indices.set(2, 0);
    assert!(displaced.is_empty());
    assert_eq!(indices.serialize(), before);
    let displaced = indices.delete(2, 0);
    assert!(displaced.is_empty());
    assert_eq!(indices.serialize(), before);
}
