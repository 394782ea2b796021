//! Lowering of a frozen transducer into the flat instruction stream.
//!
//! States are visited in freeze order, so every transition target has
//! already been emitted and has a known address. Edges are emitted in
//! descending label order and the whole program is reversed at the end:
//! that turns the child-before-parent layout into a forward-executing
//! stream where the *first* sibling tried at runtime is the smallest label
//! and the last one carries the break variant of its opcode.

use crate::error::Error;
use crate::mast::Mast;
use crate::output::Output;
use crate::vm::program::{Instruction, Op};
use crate::vm::Fst;

pub(crate) fn compile<O: Output>(mast: &Mast<O>) -> Result<Fst<O>, Error> {
    let mut prog: Vec<Instruction> = Vec::new();
    let mut data: Vec<O> = Vec::new();
    let mut addr: Vec<Option<usize>> = vec![None; mast.len()];

    for state in mast.states() {
        for (i, &(ch, next)) in state.transitions().iter().rev().enumerate() {
            let next_addr = match addr[next as usize] {
                Some(a) => a,
                None if mast.states()[next as usize].is_final() => 0,
                None => {
                    return Err(Error::UndefinedNext {
                        state: state.id(),
                        input: ch,
                    })
                }
            };

            let output = state.output(ch);
            let op = match (output.is_some(), i == 0) {
                (true, true) => Op::OutputBreak,
                (true, false) => Op::Output,
                (false, true) => Op::MatchBreak,
                (false, false) => Op::Match,
            };

            let mut jump = prog.len() - next_addr + 1;
            if jump > u32::MAX as usize {
                return Err(Error::JumpTooLarge(jump as u64));
            }
            if jump > u16::MAX as usize {
                prog.push(Instruction(jump as u32));
                jump = 0;
            }
            if let Some(value) = output {
                prog.push(Instruction(O::emit(value, &mut data)));
            }
            prog.push(Instruction::pack(op, ch, jump as u16));
        }

        if state.is_final() {
            let has_tail = state.has_tail();
            if has_tail {
                prog.push(Instruction(data.len() as u32)); // from
                data.extend(state.tails().cloned());
                prog.push(Instruction(data.len() as u32)); // to
            }
            let op = if state.transitions().is_empty() {
                Op::AcceptBreak
            } else {
                Op::Accept
            };
            prog.push(Instruction::pack(op, has_tail as u8, 0));
        }

        addr[state.id() as usize] = Some(prog.len());
    }

    prog.reverse();
    Ok(Fst {
        program: prog,
        data,
    })
}
