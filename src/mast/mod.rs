//! Minimal acyclic subsequential transducer construction.
//!
//! The builder consumes pairs sorted by `(input, output)` in a single
//! left-to-right pass. A frontier buffer holds one live state per key
//! depth; whenever the next key diverges from the previous one, the
//! now-complete suffix states are frozen into the arena, deduplicated
//! through the equivalence registry, and the frontier slots are recycled.
//! Freezing deepest-first keeps every transition pointing from a live state
//! to an already-frozen one, which is what makes the result acyclic and
//! minimal.

pub mod state;

use crate::error::Error;
use crate::output::Output;
use crate::pair::{common_prefix_len, max_input_len, Pair};
use state::{Registry, State, StateId, UNRESOLVED};

use std::ops::ControlFlow;

/// A frozen transducer: the state arena in freeze order, with the start
/// state added last.
#[derive(Debug)]
pub struct Mast<O> {
    states: Vec<State<O>>,
    start: StateId,
}

impl<O: Output> Mast<O> {
    /// Build the minimal transducer for `pairs`.
    ///
    /// The list need not be pre-sorted; keys may repeat with distinct
    /// outputs. Empty keys are rejected. An empty list yields the
    /// single-state automaton that accepts nothing.
    pub fn build(mut pairs: Vec<Pair<O>>) -> Result<Self, Error> {
        pairs.sort_unstable();
        if pairs.iter().any(|p| p.input.is_empty()) {
            return Err(Error::EmptyKey);
        }

        let mut arena: Vec<State<O>> = Vec::with_capacity(1024);
        let mut registry = Registry::default();
        let mut buf: Vec<State<O>> = (0..=max_input_len(&pairs)).map(|_| State::new()).collect();

        for idx in 0..pairs.len() {
            let prev: &[u8] = if idx == 0 { &[] } else { &pairs[idx - 1].input };
            let input = &pairs[idx].input;
            let had_empty_output = pairs[idx].output.is_empty();
            let mut pending = pairs[idx].output.clone();
            let prefix_len = common_prefix_len(input, prev);

            // Freeze the suffix of the previous key that the new key no
            // longer shares; those depths have seen their final shape.
            for i in (prefix_len + 1..=prev.len()).rev() {
                let id = freeze(&mut arena, &mut registry, &mut buf[i]);
                buf[i - 1].set_transition(prev[i - 1], id);
            }
            // Extend the frontier along the new suffix. Each new edge
            // points at the next live slot; the placeholder target is
            // patched in when that slot freezes.
            for i in prefix_len + 1..=input.len() {
                buf[i - 1].set_transition(input[i - 1], UNRESOLVED);
            }
            if input.as_slice() != prev {
                buf[input.len()].set_final();
            }
            // Rebalance outputs along the shared prefix so that every
            // accepting path still composes to its original value.
            for j in 1..=prefix_len {
                let (head, tail) = buf.split_at_mut(j);
                match O::reconcile(&mut head[j - 1], input[j - 1], &mut tail[0], pending) {
                    ControlFlow::Break(rest) => {
                        pending = rest;
                        break;
                    }
                    ControlFlow::Continue(rest) => pending = rest,
                }
            }
            if input.as_slice() != prev {
                buf[prefix_len].set_output(input[prefix_len], pending);
            } else {
                O::tail_on_duplicate(&mut buf[input.len()], pending, had_empty_output);
            }
        }

        // Flush the frontier of the last key, then seat the start state.
        let last: &[u8] = pairs.last().map(|p| &p.input[..]).unwrap_or(&[]);
        for i in (1..=last.len()).rev() {
            let id = freeze(&mut arena, &mut registry, &mut buf[i]);
            buf[i - 1].set_transition(last[i - 1], id);
        }
        let mut start = std::mem::take(&mut buf[0]);
        let start_id = arena.len() as StateId;
        start.assign_id(start_id);
        arena.push(start);

        Ok(Mast {
            states: arena,
            start: start_id,
        })
    }

    /// States in freeze order (children precede their parents; the start
    /// state is last).
    pub fn states(&self) -> &[State<O>] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn start(&self) -> StateId {
        self.start
    }

    /// Whether `input` is an accepted key.
    pub fn accepts(&self, input: impl AsRef<[u8]>) -> bool {
        self.walk(input.as_ref()).is_some()
    }

    /// Outputs for `input`, or `None` if it is not an accepted key.
    ///
    /// This walks the frozen state graph directly with the same output
    /// semantics as the compiled VM; it exists for debugging and for
    /// cross-checking the compiler.
    pub fn run(&self, input: impl AsRef<[u8]>) -> Option<Vec<O>> {
        let (state, tape) = self.walk(input.as_ref())?;
        if state.has_tail() {
            Some(state.tails().map(|t| O::compose_tail(&tape, t)).collect())
        } else {
            Some(vec![tape])
        }
    }

    fn walk(&self, input: &[u8]) -> Option<(&State<O>, O)> {
        let mut state = &self.states[self.start as usize];
        let mut tape = O::empty();
        for &b in input {
            if let Some(v) = state.output(b) {
                O::record(&mut tape, v);
            }
            state = &self.states[state.transition(b)? as usize];
        }
        state.is_final().then_some((state, tape))
    }
}

/// Freeze one frontier slot: reuse a structurally equal arena state if the
/// registry knows one, otherwise move the slot's contents into the arena.
/// Either way the slot comes back empty and reusable.
fn freeze<O: Output>(
    arena: &mut Vec<State<O>>,
    registry: &mut Registry,
    slot: &mut State<O>,
) -> StateId {
    if let Some(id) = registry.find(arena, slot) {
        slot.clear();
        return id;
    }
    let mut state = std::mem::take(slot);
    let id = arena.len() as StateId;
    state.assign_id(id);
    registry.insert(state.hash_code(), id);
    arena.push(state);
    id
}
