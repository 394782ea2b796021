//! Automaton states and the equivalence registry used during construction.
//!
//! A state keeps its outgoing transitions and per-transition outputs in
//! sorted small vectors; fan-out is almost always in the single digits, so
//! this stays inline and keeps iteration order deterministic. Every mutation
//! maintains a rolling hash of the state's shape so that structurally equal
//! states can be found in O(1) during construction.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::output::Output;

/// Index of a frozen state in the arena.
pub type StateId = u32;

/// Placeholder target for the edge that still points at the live frontier
/// state one level deeper. Replaced with the real id at freeze time; never
/// present in a frozen state.
pub(crate) const UNRESOLVED: StateId = StateId::MAX;

// Weights mixed into the rolling hash. One weight per component keeps the
// per-term updates independent, so removing a term is exact.
const TRANS_WEIGHT: u64 = 1001;
const OUTPUT_WEIGHT: u64 = 8191;
const TAIL_WEIGHT: u64 = 131_071;
const FINAL_SALT: u64 = 524_287;

#[inline]
fn trans_term(label: u8, to: StateId) -> u64 {
    (label as u64).wrapping_add(to as u64).wrapping_mul(TRANS_WEIGHT)
}

#[inline]
fn output_term<O: Output>(label: u8, value: &O) -> u64 {
    (label as u64)
        .wrapping_add(value.hash_code())
        .wrapping_mul(OUTPUT_WEIGHT)
}

#[inline]
fn tail_term<O: Output>(value: &O) -> u64 {
    value.hash_code().wrapping_mul(TAIL_WEIGHT)
}

/// One automaton state.
///
/// During construction a state is either *live* (a slot of the frontier
/// buffer, still mutable) or *frozen* (moved into the arena, immutable and
/// registered for equivalence lookups).
#[derive(Clone, Debug)]
pub struct State<O> {
    id: StateId,
    trans: SmallVec<[(u8, StateId); 4]>,
    outputs: SmallVec<[(u8, O); 2]>,
    tail: BTreeSet<O>,
    is_final: bool,
    hcode: u64,
}

impl<O> Default for State<O> {
    fn default() -> Self {
        Self {
            id: 0,
            trans: SmallVec::new(),
            outputs: SmallVec::new(),
            tail: BTreeSet::new(),
            is_final: false,
            hcode: 0,
        }
    }
}

impl<O: Output> State<O> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn id(&self) -> StateId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: StateId) {
        self.id = id;
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn set_final(&mut self) {
        if !self.is_final {
            self.is_final = true;
            self.hcode = self.hcode.wrapping_add(FINAL_SALT);
        }
    }

    /// Outgoing edges, sorted ascending by label.
    #[inline]
    pub fn transitions(&self) -> &[(u8, StateId)] {
        &self.trans
    }

    /// Target of the edge labelled `label`, if any.
    pub fn transition(&self, label: u8) -> Option<StateId> {
        self.trans
            .binary_search_by_key(&label, |&(b, _)| b)
            .ok()
            .map(|i| self.trans[i].1)
    }

    /// Add or retarget the edge labelled `label`.
    pub fn set_transition(&mut self, label: u8, to: StateId) {
        match self.trans.binary_search_by_key(&label, |&(b, _)| b) {
            Ok(i) => {
                let old = self.trans[i].1;
                self.hcode = self.hcode.wrapping_sub(trans_term(label, old));
                self.trans[i].1 = to;
            }
            Err(i) => self.trans.insert(i, (label, to)),
        }
        self.hcode = self.hcode.wrapping_add(trans_term(label, to));
    }

    /// Output attached to the edge labelled `label`, if any.
    pub fn output(&self, label: u8) -> Option<&O> {
        self.outputs
            .binary_search_by_key(&label, |(b, _)| *b)
            .ok()
            .map(|i| &self.outputs[i].1)
    }

    /// Attach `value` to the edge labelled `label`.
    ///
    /// The empty output (`0` for integers, `""` for strings) is never
    /// stored: setting it removes any existing entry, so an absent entry and
    /// the empty value stay indistinguishable everywhere downstream.
    pub fn set_output(&mut self, label: u8, value: O) {
        match self.outputs.binary_search_by_key(&label, |(b, _)| *b) {
            Ok(i) => {
                self.hcode = self
                    .hcode
                    .wrapping_sub(output_term(label, &self.outputs[i].1));
                if value.is_empty() {
                    self.outputs.remove(i);
                } else {
                    self.hcode = self.hcode.wrapping_add(output_term(label, &value));
                    self.outputs[i].1 = value;
                }
            }
            Err(i) => {
                if !value.is_empty() {
                    self.hcode = self.hcode.wrapping_add(output_term(label, &value));
                    self.outputs.insert(i, (label, value));
                }
            }
        }
    }

    /// Detach the output of the edge labelled `label`.
    pub fn remove_output(&mut self, label: u8) {
        if let Ok(i) = self.outputs.binary_search_by_key(&label, |(b, _)| *b) {
            self.hcode = self
                .hcode
                .wrapping_sub(output_term(label, &self.outputs[i].1));
            self.outputs.remove(i);
        }
    }

    #[inline]
    pub fn has_tail(&self) -> bool {
        !self.tail.is_empty()
    }

    /// Tail entries in ascending order.
    pub fn tails(&self) -> impl Iterator<Item = &O> {
        self.tail.iter()
    }

    /// Insert `value` into the tail set.
    pub fn add_tail(&mut self, value: O) {
        let term = tail_term(&value);
        if self.tail.insert(value) {
            self.hcode = self.hcode.wrapping_add(term);
        }
    }

    /// Swap in a rewritten tail set, keeping the hash exact.
    pub fn replace_tail(&mut self, tail: BTreeSet<O>) {
        for t in &self.tail {
            self.hcode = self.hcode.wrapping_sub(tail_term(t));
        }
        for t in &tail {
            self.hcode = self.hcode.wrapping_add(tail_term(t));
        }
        self.tail = tail;
    }

    /// Reset to the pristine empty state, keeping allocations.
    pub fn clear(&mut self) {
        self.id = 0;
        self.trans.clear();
        self.outputs.clear();
        self.tail.clear();
        self.is_final = false;
        self.hcode = 0;
    }

    /// Rolling hash of the state's shape. Equal states always share a hash;
    /// a shared hash is only a candidate that still needs the deep check.
    #[inline]
    pub fn hash_code(&self) -> u64 {
        self.hcode
    }
}

// Structural equality, ignoring `id`: the id records *when* a state was
// frozen, not what it looks like.
impl<O: Output> PartialEq for State<O> {
    fn eq(&self, other: &Self) -> bool {
        self.hcode == other.hcode
            && self.is_final == other.is_final
            && self.trans == other.trans
            && self.outputs == other.outputs
            && self.tail == other.tail
    }
}

impl<O: Output> Eq for State<O> {}

/// Hash-bucketed dictionary of frozen states, used to detect that the state
/// about to be frozen already exists in the arena.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    buckets: FxHashMap<u64, Vec<StateId>>,
}

impl Registry {
    /// Any already-frozen state structurally equal to `probe`.
    pub(crate) fn find<O: Output>(&self, arena: &[State<O>], probe: &State<O>) -> Option<StateId> {
        self.buckets
            .get(&probe.hash_code())?
            .iter()
            .copied()
            .find(|&id| arena[id as usize] == *probe)
    }

    pub(crate) fn insert(&mut self, hash: u64, id: StateId) {
        self.buckets.entry(hash).or_default().push(id);
    }
}
