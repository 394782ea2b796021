//! Output alphabets.
//!
//! The transducer machinery is generic over the output type; this module
//! defines the capability set it needs and provides the two shipped
//! instantiations, `i32` and `String`. The two differ in how an output is
//! factored across a shared key prefix during construction and in how the
//! VM's scratch register behaves: integers overwrite it, strings append.
//! Other monoids (byte strings, for instance) can implement the trait too.

use std::collections::BTreeSet;
use std::fmt;
use std::io::{BufRead, Write};
use std::ops::ControlFlow;

use crate::error::Error;
use crate::mast::state::State;

/// Capability set required of an output value.
///
/// `reconcile` is the heart of the construction algorithm: when a new pair
/// shares a key prefix with its predecessor, the outputs already placed
/// along that prefix have to be refactored so that every accepting path
/// still composes to its original value. Integers hoist a conflicting edge
/// value down to the children wholesale; strings factor out the longest
/// common prefix and push only the remainder down.
pub trait Output: Clone + Eq + Ord + fmt::Debug + fmt::Display {
    /// The neutral value: `0` for integers, `""` for strings.
    fn empty() -> Self;

    /// Whether this is the neutral value.
    fn is_empty(&self) -> bool;

    /// Stable hash mixed into state signatures. Must not depend on pointer
    /// identity or platform endianness.
    fn hash_code(&self) -> u64;

    /// Rebalance outputs at one depth of the shared prefix.
    ///
    /// `parent --label--> child` is the edge at this depth and `pending` is
    /// the part of the new pair's output not yet placed. Returns the value
    /// still pending afterwards; `Break` short-circuits the remaining
    /// depths.
    fn reconcile(
        parent: &mut State<Self>,
        label: u8,
        child: &mut State<Self>,
        pending: Self,
    ) -> ControlFlow<Self, Self>;

    /// Place the leftover output of a repeated key into the final state's
    /// tail. `had_empty_output` reports whether the pair's output was the
    /// neutral value to begin with, which for integers must still be
    /// recorded (a legitimate zero output lives in the tail, never on an
    /// edge).
    fn tail_on_duplicate(state: &mut State<Self>, pending: Self, had_empty_output: bool);

    /// Fold an edge output into the VM's scratch register.
    fn record(tape: &mut Self, value: &Self);

    /// Combine the scratch register with one tail entry at an accept.
    fn compose_tail(tape: &Self, tail: &Self) -> Self;

    /// Encode an edge output as the 32-bit operand word, appending to the
    /// data table if the encoding is indirect.
    fn emit(value: &Self, data: &mut Vec<Self>) -> u32;

    /// Decode an operand word. `None` means the word is out of range for
    /// the data table, i.e. the program is malformed.
    fn load(word: u32, data: &[Self]) -> Option<Self>;

    /// Human-readable rendering of an operand word for disassembly.
    fn operand_note(word: u32, data: &[Self]) -> String;

    /// Write one data-table entry in the on-disk encoding. Returns the
    /// number of bytes written.
    fn write_entry<W: Write>(&self, w: &mut W) -> Result<u64, Error>;

    /// Read one data-table entry in the on-disk encoding.
    fn read_entry<R: BufRead>(r: &mut R) -> Result<Self, Error>;
}

impl Output for i32 {
    fn empty() -> Self {
        0
    }

    fn is_empty(&self) -> bool {
        *self == 0
    }

    fn hash_code(&self) -> u64 {
        *self as i64 as u64
    }

    fn reconcile(
        parent: &mut State<Self>,
        label: u8,
        child: &mut State<Self>,
        pending: Self,
    ) -> ControlFlow<Self, Self> {
        let Some(&existing) = parent.output(label) else {
            return ControlFlow::Continue(pending);
        };
        if existing == pending {
            // Already represented on this edge; nothing left to place.
            return ControlFlow::Break(0);
        }
        // The edge value conflicts: hoist it one level down, onto every
        // outgoing edge of the child, and into the child's tail if the
        // child itself accepts.
        parent.remove_output(label);
        let labels: Vec<u8> = child.transitions().iter().map(|&(b, _)| b).collect();
        for b in labels {
            child.set_output(b, existing);
        }
        if child.is_final() && existing != 0 {
            child.add_tail(existing);
        }
        ControlFlow::Continue(pending)
    }

    fn tail_on_duplicate(state: &mut State<Self>, pending: Self, had_empty_output: bool) {
        if had_empty_output || pending != 0 {
            state.add_tail(pending);
        }
    }

    fn record(tape: &mut Self, value: &Self) {
        *tape = *value;
    }

    fn compose_tail(_tape: &Self, tail: &Self) -> Self {
        *tail
    }

    fn emit(value: &Self, _data: &mut Vec<Self>) -> u32 {
        *value as u32
    }

    fn load(word: u32, _data: &[Self]) -> Option<Self> {
        Some(word as i32)
    }

    fn operand_note(word: u32, _data: &[Self]) -> String {
        format!("[{}]", word as i32)
    }

    fn write_entry<W: Write>(&self, w: &mut W) -> Result<u64, Error> {
        w.write_all(&self.to_le_bytes())?;
        Ok(4)
    }

    fn read_entry<R: BufRead>(r: &mut R) -> Result<Self, Error> {
        let mut buf = [0u8; 4];
        r.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }
}

impl Output for String {
    fn empty() -> Self {
        String::new()
    }

    fn is_empty(&self) -> bool {
        String::is_empty(self)
    }

    fn hash_code(&self) -> u64 {
        fnv1a32(self.as_bytes()) as u64
    }

    fn reconcile(
        parent: &mut State<Self>,
        label: u8,
        child: &mut State<Self>,
        pending: Self,
    ) -> ControlFlow<Self, Self> {
        let existing = parent.output(label).cloned().unwrap_or_default();
        let split = common_prefix_boundary(&existing, &pending);
        let suffix = existing[split..].to_string();

        // Keep only the shared prefix on this edge; the remainder moves one
        // level down, in front of whatever the child's edges already carry.
        parent.set_output(label, existing[..split].to_string());
        if !suffix.is_empty() {
            let labels: Vec<u8> = child.transitions().iter().map(|&(b, _)| b).collect();
            for b in labels {
                let shifted = match child.output(b) {
                    Some(old) => format!("{}{}", suffix, old),
                    None => suffix.clone(),
                };
                child.set_output(b, shifted);
            }
        }
        if child.is_final() {
            if !child.has_tail() {
                child.add_tail(suffix.clone());
            } else if !suffix.is_empty() {
                let shifted: BTreeSet<String> =
                    child.tails().map(|t| format!("{}{}", suffix, t)).collect();
                child.replace_tail(shifted);
            }
        }
        ControlFlow::Continue(pending[split..].to_string())
    }

    fn tail_on_duplicate(state: &mut State<Self>, pending: Self, _had_empty_output: bool) {
        state.add_tail(pending);
    }

    fn record(tape: &mut Self, value: &Self) {
        tape.push_str(value);
    }

    fn compose_tail(tape: &Self, tail: &Self) -> Self {
        format!("{}{}", tape, tail)
    }

    fn emit(value: &Self, data: &mut Vec<Self>) -> u32 {
        let index = data.len() as u32;
        data.push(value.clone());
        index
    }

    fn load(word: u32, data: &[Self]) -> Option<Self> {
        data.get(word as usize).cloned()
    }

    fn operand_note(word: u32, data: &[Self]) -> String {
        match data.get(word as usize) {
            Some(s) => format!("[{}]", s),
            None => format!("[?{}]", word),
        }
    }

    fn write_entry<W: Write>(&self, w: &mut W) -> Result<u64, Error> {
        if self.as_bytes().contains(&0) {
            return Err(Error::Format(format!(
                "output contains an embedded NUL: {:?}",
                self
            )));
        }
        w.write_all(self.as_bytes())?;
        w.write_all(&[0])?;
        Ok(self.len() as u64 + 1)
    }

    fn read_entry<R: BufRead>(r: &mut R) -> Result<Self, Error> {
        let mut raw = Vec::new();
        r.read_until(0, &mut raw)?;
        if raw.pop() != Some(0) {
            return Err(Error::Format("unterminated string entry".to_string()));
        }
        String::from_utf8(raw).map_err(|_| Error::Format("invalid utf-8 in data".to_string()))
    }
}

/// 32-bit FNV-1a, the stable hash used for string outputs.
pub(crate) fn fnv1a32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811c_9dc5u32;
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Longest common byte prefix of two strings, pulled back to a char
/// boundary of both so the split pieces remain valid UTF-8.
fn common_prefix_boundary(a: &str, b: &str) -> usize {
    let mut n = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .take_while(|(x, y)| x == y)
        .count();
    while n > 0 && !(a.is_char_boundary(n) && b.is_char_boundary(n)) {
        n -= 1;
    }
    n
}
