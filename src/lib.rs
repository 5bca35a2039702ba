//! A 2D fast multipole method core over the logarithmic kernel
//! `K(p, q) = log|p - q|`.
//!
//! The crate builds a dense, level-major uniform quadtree over `[0, 1)^2`
//! and runs the four passes that approximate, for every inserted body, the
//! sum of its pairwise interactions with every other body in O(N) instead of
//! O(N^2): an upward center-of-mass accumulation, a multipole-to-local (M2L)
//! translation over per-node interaction lists, a downward local-expansion
//! push, and a near-field direct summation. See `Tree` for the public API
//! and pipeline order.

mod arena;
mod body;
mod error;
mod geometry;
mod interaction_list;
mod passes;
mod tree;

pub use body::{kernel, Body};
pub use error::FmmError;
pub use tree::{Phase, Tree};

// Re-exported so callers can construct `Body::pos` without depending on
// `num-complex` directly for the common case.
pub use num_complex::Complex64;
