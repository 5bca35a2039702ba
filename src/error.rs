//! Error type shared by every fallible operation in this crate.

use thiserror::Error;

use crate::tree::Phase;

/// The error type returned by the quadtree's public API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FmmError {
    /// `Tree::new` was called with a level outside `[1, 10]`.
    #[error("level {0} is out of range: must satisfy 1 <= level <= 10")]
    InvalidLevel(usize),

    /// A body's position fell outside `[0, 1)^2`.
    #[error("position ({0}, {1}) is outside the unit square [0, 1)^2")]
    OutOfDomain(f64, f64),

    /// A pass was invoked while the tree was in a state that does not permit it.
    #[error("operation requires phase {required:?}, but the tree is in phase {actual:?}")]
    WrongPhase { required: Phase, actual: Phase },

    /// Arena allocation failed; surfaced rather than recovered.
    #[error("failed to allocate arena of {0} nodes")]
    AllocationFailure(usize),
}
