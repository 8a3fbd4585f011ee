//! Error types.
//!
//! There are exactly two failure kinds: a result whose integer part does not
//! fit in the declared `I` bits (`Overflow`), and a request that has no
//! answer in the real numbers this library can represent (`Domain`) — square
//! root of a negative value, reciprocal of zero, or an unparsable decimal
//! string. The library never retries, logs, or recovers from either; it
//! surfaces the failure to the caller.

use thiserror::Error;

/// The two ways a `Fixed` operation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FixedError {
    /// The integer part of a result does not fit in the declared bit width.
    #[error("fixed-point overflow")]
    Overflow,
    /// The operation has no answer for the given input (sqrt of a negative,
    /// reciprocal of zero, or a decimal string that failed to parse).
    #[error("fixed-point domain error: {0}")]
    Domain(&'static str),
}

pub type Result<T> = std::result::Result<T, FixedError>;
