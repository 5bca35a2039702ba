//! Particle records and the pairwise kernel the whole core exists to sum.

use num_complex::Complex64;

/// A particle carried by the tree.
///
/// Bodies are owned by the `Tree`'s body table once inserted (see
/// `Tree::insert`); leaves reference them by table index, never by value.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub uid: usize,
    pub pos: Complex64,
    pub mass: f64,
    pub u: Complex64,
}

impl Body {
    pub fn new(uid: usize, pos: Complex64, mass: f64) -> Self {
        Self {
            uid,
            pos,
            mass,
            u: Complex64::new(0.0, 0.0),
        }
    }

    pub fn x(&self) -> f64 {
        self.pos.re
    }

    pub fn y(&self) -> f64 {
        self.pos.im
    }
}

/// The logarithmic kernel `K(p, q) = log|p - q|`.
///
/// Returned as a complex value (zero imaginary part) for uniformity with
/// higher-order kernels this core does not implement. Not regularized: a
/// coincident pair produces `log(0) = -inf`, which is the caller's
/// responsibility to avoid (see `spec.md` §7).
pub fn kernel(i: Complex64, j: Complex64) -> Complex64 {
    Complex64::new((i - j).norm().ln(), 0.0)
}
