use core::fmt;

/// The two failure modes of [`Machine::compile`](crate::Machine::compile).
///
/// Everything past `compile` is infallible: a compiled [`Machine`](crate::Machine)
/// never faults on any input (no backtracking, bounded state, pure table
/// lookup), and [`Machine::new_match`](crate::Machine::new_match) can only
/// fail by allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The pattern text could not be parsed. Deterministic given the same
    /// input: the caller's fault, not a resource problem.
    InvalidPattern {
        message: &'static str,
        /// Byte offset into the pattern where the problem was detected.
        position: usize,
    },
    /// Allocation failed while building the segmented stack, the
    /// transitions array, the search-state array or the compiled code.
    /// Nondeterministic: the same pattern may succeed on a later attempt.
    Memory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPattern { message, position } => {
                write!(f, "invalid regex at byte {}: {}", position, message)
            }
            Error::Memory => write!(f, "allocation failed while compiling regex"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
