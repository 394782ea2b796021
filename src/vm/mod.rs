//! The compiled transducer and its query surface.
//!
//! An [`Fst`] is just the instruction stream plus the output-data table.
//! It is immutable once built, so any number of threads can query it
//! concurrently; each query keeps its registers on its own stack.

mod compile;
pub mod program;
mod run;

use std::fmt;

use crate::error::Error;
use crate::mast::Mast;
use crate::output::Output;
use crate::pair::Pair;

pub use program::{Instruction, Op};
pub use run::Configuration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A compiled finite state transducer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fst<O> {
    /// The instruction stream; `pc = 0` is the start state.
    pub program: Vec<Instruction>,
    /// Outputs referenced by accept tails and, for indirect encodings,
    /// by output instructions.
    pub data: Vec<O>,
}

impl<O: Output> Fst<O> {
    /// Build and compile a transducer from `pairs`.
    pub fn new(pairs: Vec<Pair<O>>) -> Result<Self, Error> {
        let mast = Mast::build(pairs)?;
        compile::compile(&mast)
    }

    /// Exact lookup: the outputs of `input`, or `None` if it is not a key.
    pub fn search(&self, input: impl AsRef<[u8]>) -> Option<Vec<O>> {
        let input = input.as_ref();
        let mut hit = None;
        self.run(input, |c| {
            if c.head == input.len() {
                hit = Some(c.outputs);
            }
        });
        hit
    }

    /// Longest-prefix lookup: the byte length of the longest key that
    /// prefixes `input`, with its outputs.
    pub fn prefix_search(&self, input: impl AsRef<[u8]>) -> Option<(usize, Vec<O>)> {
        let mut last = None;
        self.run(input.as_ref(), |c| {
            last = Some((c.head, c.outputs));
        });
        last
    }

    /// Enumerate every key that prefixes `input`, shortest first, as
    /// `(byte length, outputs)` entries.
    pub fn common_prefix_search(&self, input: impl AsRef<[u8]>) -> Vec<(usize, Vec<O>)> {
        let mut hits = Vec::new();
        self.common_prefix_search_with(input, |len, outputs| hits.push((len, outputs)));
        hits
    }

    /// Like [`common_prefix_search`](Self::common_prefix_search), but hands
    /// each hit to `callback` as it is found, in the same order.
    pub fn common_prefix_search_with<F>(&self, input: impl AsRef<[u8]>, mut callback: F)
    where
        F: FnMut(usize, Vec<O>),
    {
        self.run(input.as_ref(), |c| callback(c.head, c.outputs));
    }
}

// ============================================================================
// Disassembly
// ============================================================================

impl<O: Output> fmt::Display for Fst<O> {
    /// Program listing, one line per decoded word.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prog = &self.program;
        let mut pc = 0usize;
        while pc < prog.len() {
            let inst = prog[pc];
            let code = inst.op_code();
            let ch = inst.label();
            let jump16 = inst.jump16();
            match Op::from_code(code) {
                Some(Op::Accept | Op::AcceptBreak) => {
                    writeln!(f, "{:3} {}\t{} {}", pc, Op::mnemonic(code), ch, jump16)?;
                    if ch != 0 {
                        if pc + 2 >= prog.len() {
                            break;
                        }
                        pc += 1;
                        let to = prog[pc].word() as usize;
                        writeln!(f, "{:3} [{}]", pc, to)?;
                        pc += 1;
                        let from = prog[pc].word() as usize;
                        let entries = self.data.get(from..to).unwrap_or(&[]);
                        writeln!(f, "{:3} [{}] {}", pc, from, fmt_entries(entries))?;
                    }
                }
                Some(Op::Match | Op::MatchBreak) => {
                    writeln!(
                        f,
                        "{:3} {}\t{:02X}({}) {}",
                        pc,
                        Op::mnemonic(code),
                        ch,
                        ch as char,
                        jump16
                    )?;
                    if jump16 == 0 {
                        if pc + 1 >= prog.len() {
                            break;
                        }
                        pc += 1;
                        writeln!(f, "{:3} jmp[{}]", pc, prog[pc].word() as i32)?;
                    }
                }
                Some(Op::Output | Op::OutputBreak) => {
                    writeln!(
                        f,
                        "{:3} {}\t{:02X}({}) {}",
                        pc,
                        Op::mnemonic(code),
                        ch,
                        ch as char,
                        jump16
                    )?;
                    if pc + 1 >= prog.len() {
                        break;
                    }
                    pc += 1;
                    writeln!(f, "{:3} {}", pc, O::operand_note(prog[pc].word(), &self.data))?;
                    if jump16 == 0 {
                        if pc + 1 >= prog.len() {
                            break;
                        }
                        pc += 1;
                        writeln!(f, "{:3} jmp[{}]", pc, prog[pc].word() as i32)?;
                    }
                }
                None => {
                    writeln!(f, "{:3} UNDEF {}", pc, inst.word())?;
                }
            }
            pc += 1;
        }
        Ok(())
    }
}

fn fmt_entries<O: fmt::Display>(entries: &[O]) -> String {
    let parts: Vec<String> = entries.iter().map(|e| e.to_string()).collect();
    format!("[{}]", parts.join(" "))
}
