//! The byte-code interpreter.
//!
//! A run owns three registers: the program counter, the input head and a
//! scratch output tape. It never reports errors; running a malformed
//! program simply ends the run, leaving whatever was already reported.

use crate::output::Output;
use crate::vm::program::Op;
use crate::vm::Fst;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Snapshot taken at every accept instruction the run passes through.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Configuration<O> {
    /// Address of the accept instruction.
    pub pc: usize,
    /// Number of input bytes consumed so far.
    pub head: usize,
    /// Outputs enumerated at this accept.
    pub outputs: Vec<O>,
}

impl<O: Output> Fst<O> {
    /// Execute the program against `input`, invoking `callback` at every
    /// accept. Callbacks arrive in increasing `head` order, shortest
    /// accepted prefix first.
    pub fn run<F>(&self, input: &[u8], mut callback: F)
    where
        F: FnMut(Configuration<O>),
    {
        let prog = &self.program;
        let mut pc = 0usize;
        let mut head = 0usize;
        let mut tape = O::empty();

        while pc < prog.len() && head <= input.len() {
            let inst = prog[pc];
            let code = inst.op_code();
            let ch = inst.label();
            let jump16 = inst.jump16();
            let Some(op) = Op::from_code(code) else {
                return;
            };
            match op {
                Op::Match | Op::MatchBreak => {
                    if head == input.len() {
                        return;
                    }
                    if ch != input[head] {
                        if op == Op::MatchBreak {
                            return;
                        }
                        if jump16 == 0 {
                            pc += 1; // skip the extended jump word
                        }
                        pc += 1;
                        continue;
                    }
                    if jump16 > 0 {
                        pc += jump16 as usize;
                    } else {
                        pc += 1;
                        if pc >= prog.len() {
                            return;
                        }
                        pc += prog[pc].word() as usize;
                    }
                    head += 1;
                }
                Op::Output | Op::OutputBreak => {
                    if head == input.len() {
                        return;
                    }
                    if ch != input[head] {
                        if op == Op::OutputBreak {
                            return;
                        }
                        if jump16 == 0 {
                            pc += 1;
                        }
                        pc += 2; // operand word + instruction
                        continue;
                    }
                    pc += 1;
                    if pc >= prog.len() {
                        return;
                    }
                    let Some(value) = O::load(prog[pc].word(), &self.data) else {
                        return;
                    };
                    O::record(&mut tape, &value);
                    if jump16 > 0 {
                        pc += jump16 as usize;
                    } else {
                        pc += 1;
                        if pc >= prog.len() {
                            return;
                        }
                        pc += prog[pc].word() as usize;
                    }
                    head += 1;
                }
                Op::Accept | Op::AcceptBreak => {
                    let accept_pc = pc;
                    pc += 1;
                    let outputs = if ch == 0 {
                        vec![tape.clone()]
                    } else {
                        if pc + 1 >= prog.len() {
                            return;
                        }
                        let to = prog[pc].word() as usize;
                        pc += 1;
                        let from = prog[pc].word() as usize;
                        pc += 1;
                        let Some(entries) = self.data.get(from..to) else {
                            return;
                        };
                        entries.iter().map(|t| O::compose_tail(&tape, t)).collect()
                    };
                    callback(Configuration {
                        pc: accept_pc,
                        head,
                        outputs,
                    });
                    if head == input.len() || op == Op::AcceptBreak {
                        return;
                    }
                }
            }
        }
    }
}
