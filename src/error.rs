//! Error type shared by the builder, the compiler and the persistence layer.
//!
//! The VM interpreter itself never reports errors: a malformed program
//! terminates the run early and yields "no match".

use std::fmt;
use std::io;

/// Error raised while building, compiling, or (de)serializing a transducer.
#[derive(Debug)]
pub enum Error {
    /// A transition target had no compiled address. This indicates a bug in
    /// the builder or a corrupted state arena, not bad user input.
    UndefinedNext {
        /// Id of the state holding the dangling transition.
        state: u32,
        /// Transition label.
        input: u8,
    },
    /// A jump distance exceeded 32 bits; the automaton is too large for
    /// this instruction encoding.
    JumpTooLarge(u64),
    /// An input key was empty. Empty keys are rejected at build time.
    EmptyKey,
    /// An underlying read or write failed.
    Io(io::Error),
    /// The byte stream is truncated or structurally invalid.
    Format(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UndefinedNext { state, input } => {
                write!(
                    f,
                    "next address is undefined: state({}), input({:02X})",
                    state, input
                )
            }
            Error::JumpTooLarge(jump) => write!(f, "jump distance too large: {}", jump),
            Error::EmptyKey => write!(f, "empty input keys are not supported"),
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Format(msg) => write!(f, "format error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // Hitting the end of the stream mid-record means the dump itself is
        // damaged, which callers should see as a format problem.
        if err.kind() == io::ErrorKind::UnexpectedEof {
            return Error::Format("unexpected end of stream".to_string());
        }
        Error::Io(err)
    }
}
