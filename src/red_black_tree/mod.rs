//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions.

mod cursor;
mod node;
mod tree;

pub use self::cursor::Cursor;
pub use self::tree::{Iter, OrderedTree};

use std::error;
use std::fmt;
use std::result;

/// Errors reported by a `Cursor`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The cursor was advanced past the last value.
    IterationExhausted,
    /// The cursor was asked to remove a value it has not produced, or has already removed.
    InvalidIteratorState,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IterationExhausted => write!(f, "no values left to iterate over"),
            Error::InvalidIteratorState => {
                write!(f, "no current value to remove; advance the cursor first")
            },
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::IterationExhausted.to_string(),
            "no values left to iterate over",
        );
        assert_eq!(
            Error::InvalidIteratorState.to_string(),
            "no current value to remove; advance the cursor first",
        );
    }
}
