//! Binary persistence of compiled transducers.
//!
//! Layout, all little-endian:
//!
//! ```text
//! i64            data_len
//! O * data_len   data entries (i32: 4-byte; String: NUL-terminated UTF-8)
//! i64            prog_len
//! u32 * prog_len instruction words
//! ```
//!
//! Loading validates the instruction stream with a linear decode walk, so
//! truncated dumps and unknown opcodes surface as [`Error::Format`] instead
//! of silently producing a program that matches nothing.

use std::io::{BufReader, Read, Write};

use crate::error::Error;
use crate::output::Output;
use crate::vm::program::{Instruction, Op};
use crate::vm::Fst;

impl<O: Output> Fst<O> {
    /// Serialize into `w`. Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64, Error> {
        let mut written = 0u64;

        w.write_all(&(self.data.len() as i64).to_le_bytes())?;
        written += 8;
        for entry in &self.data {
            written += entry.write_entry(w)?;
        }

        w.write_all(&(self.program.len() as i64).to_le_bytes())?;
        written += 8;
        for inst in &self.program {
            w.write_all(&inst.word().to_le_bytes())?;
            written += 4;
        }
        Ok(written)
    }

    /// Deserialize a transducer previously written with
    /// [`write_to`](Self::write_to).
    pub fn read_from<R: Read>(r: R) -> Result<Self, Error> {
        let mut r = BufReader::new(r);

        let data_len = read_len(&mut r)?;
        let mut data = Vec::new();
        for _ in 0..data_len {
            data.push(O::read_entry(&mut r)?);
        }

        let prog_len = read_len(&mut r)?;
        let mut program = Vec::new();
        for _ in 0..prog_len {
            let mut word = [0u8; 4];
            r.read_exact(&mut word)?;
            program.push(Instruction(u32::from_le_bytes(word)));
        }

        check_program(&program)?;
        Ok(Fst { program, data })
    }
}

fn read_len<R: Read>(r: &mut R) -> Result<i64, Error> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    let len = i64::from_le_bytes(buf);
    if len < 0 {
        return Err(Error::Format(format!("negative section length: {}", len)));
    }
    Ok(len)
}

/// Walk the instruction stream the way the interpreter frames it and make
/// sure every opcode is known and every operand word is present.
fn check_program(prog: &[Instruction]) -> Result<(), Error> {
    let mut pc = 0usize;
    while pc < prog.len() {
        let inst = prog[pc];
        let operands = match Op::from_code(inst.op_code()) {
            Some(Op::Accept | Op::AcceptBreak) => {
                if inst.label() != 0 {
                    2
                } else {
                    0
                }
            }
            Some(Op::Match | Op::MatchBreak) => usize::from(inst.jump16() == 0),
            Some(Op::Output | Op::OutputBreak) => 1 + usize::from(inst.jump16() == 0),
            None => {
                return Err(Error::Format(format!(
                    "unknown opcode {} at pc {}",
                    inst.op_code(),
                    pc
                )))
            }
        };
        if operands > 0 && pc + operands >= prog.len() {
            return Err(Error::Format(format!(
                "truncated instruction at pc {}",
                pc
            )));
        }
        pc += 1 + operands;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::Pair;

    #[test]
    fn checks_accept_operands() {
        // ACCEPT with a tail flag but no from/to words following.
        let prog = vec![Instruction::pack(Op::Accept, 1, 0)];
        assert!(check_program(&prog).is_err());
    }

    #[test]
    fn checks_opcodes() {
        let prog = vec![Instruction(0xFF << 24)];
        assert!(check_program(&prog).is_err());
    }

    #[test]
    fn accepts_compiled_programs() {
        let fst = Fst::new(vec![
            Pair::new("feb", 28),
            Pair::new("feb", 29),
            Pair::new("dec", 31),
        ])
        .unwrap();
        check_program(&fst.program).unwrap();
    }
}
