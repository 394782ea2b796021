//! # lexfst
//!
//! Minimal acyclic subsequential transducers compiled to a compact
//! byte-code VM.
//!
//! A transducer maps byte-sequence keys to sets of outputs. It is built in
//! a single pass over sorted `(key, output)` pairs, with structurally equal
//! states merged on the fly, then lowered to a flat 32-bit instruction
//! stream that answers exact, longest-prefix and common-prefix lookups.
//! The representation stays compact even for lexicons with hundreds of
//! thousands of entries, which is what it was made for.
//!
//! ## Module Organization
//!
//! - [`mast`] - incremental construction of the minimal transducer
//! - [`vm`] - the compiled program, interpreter and query layer
//! - [`output`] - the output alphabet trait and the `i32` / `String` instances
//! - [`pair`] - build-time input records
//!
//! ## Quick Start
//!
//! ```
//! use lexfst::{Fst, Pair};
//!
//! let fst = Fst::<i32>::new(vec![
//!     Pair::new("apr", 30),
//!     Pair::new("feb", 28),
//!     Pair::new("feb", 29),
//! ])?;
//!
//! // Exact lookup reports every output of the key.
//! assert_eq!(fst.search("feb"), Some(vec![28, 29]));
//! assert_eq!(fst.search("mar"), None);
//!
//! // Longest-prefix lookup reports the byte length of the matched key.
//! assert_eq!(fst.prefix_search("april"), Some((3, vec![30])));
//! # Ok::<(), lexfst::Error>(())
//! ```
//!
//! ## Features
//!
//! - `serde` - Serialize/Deserialize support for pairs and compiled
//!   programs. The compact binary format of [`Fst::write_to`] /
//!   [`Fst::read_from`] is independent of this and always available.
//!
//! ## Concurrency
//!
//! Construction is single-threaded. A compiled [`Fst`] is immutable and
//! can be shared across threads freely; queries carry all of their mutable
//! state on their own stack.

// =============================================================================
// Core modules
// =============================================================================

/// Error type for building, compiling and persistence.
pub mod error;

/// Minimal acyclic subsequential transducer construction.
pub mod mast;

/// Output alphabets (`i32`, `String`, or your own monoid).
pub mod output;

/// Build-time input records.
pub mod pair;

/// The compiled program: instruction set, compiler, interpreter, queries.
pub mod vm;

/// Binary persistence (lives as inherent methods on [`Fst`]).
mod binary;

// =============================================================================
// Public re-exports
// =============================================================================

pub use error::Error;
pub use mast::Mast;
pub use output::Output;
pub use pair::Pair;
pub use vm::{Configuration, Fst, Instruction, Op};

/// Transducer with 32-bit integer outputs.
pub type Int32Fst = Fst<i32>;

/// Transducer with string outputs.
pub type StringFst = Fst<String>;
