//! Input/output pairs, the build-time source representation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One dictionary entry: a byte-sequence key and its output value.
///
/// The derived ordering is lexicographic on `(input, output)`, which is
/// exactly the order the builder needs its entries in. A key may occur
/// several times with distinct outputs; all of them are reported on lookup.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pair<O> {
    /// The key, matched byte-by-byte. Multi-byte characters are handled at
    /// the byte level, so UTF-8 keys work without any special casing.
    pub input: Vec<u8>,
    /// The output reported when the key is accepted.
    pub output: O,
}

impl<O> Pair<O> {
    /// Create a pair from anything convertible to a byte vector.
    pub fn new(input: impl Into<Vec<u8>>, output: O) -> Self {
        Self {
            input: input.into(),
            output,
        }
    }
}

/// Longest byte length over all keys. Sizes the builder's frontier buffer.
pub(crate) fn max_input_len<O>(pairs: &[Pair<O>]) -> usize {
    pairs.iter().map(|p| p.input.len()).max().unwrap_or(0)
}

/// Length of the longest common byte prefix of `a` and `b`.
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
