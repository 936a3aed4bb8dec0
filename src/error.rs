//! The error and result types of this crate.
//!
//! Operations which may grow a map come in two versions:
//!
//! -   A fallible `try_xxx` version, which returns a [`Result`] with [`Error`]
//!     as the error type and leaves the map untouched on failure.
//! -   A convenience `xxx` version, which invokes the `try_xxx` version and
//!     panics in case of error.

use core::fmt;

/// Errors reported by the maps and sets of this crate.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Error {
    /// The requested capacity is larger than [`MAX_CAPACITY`].
    ///
    /// [`MAX_CAPACITY`]: crate::MAX_CAPACITY
    CapacityExceeded {
        /// The number of entries that was asked for.
        requested: usize,
        /// The largest number of entries a map may hold.
        max: usize,
    },
    /// A linear map cannot be reinterpreted in place as a persistent one.
    IllegalConversion,
}

impl core::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CapacityExceeded { requested, max } => {
                write!(f, "capacity of {requested} entries exceeds the maximum of {max}")
            }
            Error::IllegalConversion => f.write_str(
                "a linear map cannot be efficiently transformed into a forked representation",
            ),
        }
    }
}

/// Result type of this crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cold]
#[track_caller]
pub(crate) fn fail(error: Error) -> ! {
    panic!("{error}")
}
