//! The public `Tree` type: arena + body table behind the pipeline state
//! machine of `spec.md` §4.9.

use num_complex::Complex64;

use crate::arena::Arena;
use crate::body::Body;
use crate::error::FmmError;
use crate::geometry::{global_index, level_width, neighbors_global, node_center};
use crate::interaction_list;
use crate::passes;

/// Pipeline state. Each pass transitions exactly one edge; calling a pass
/// from the wrong state is a usage error (`FmmError::WrongPhase`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Built,
    Populated,
    CoMReady,
    MultipolesReady,
    LocalsReady,
    Done,
}

/// The uniform quadtree over `[0, 1)^2` and the four analytical passes that
/// turn inserted bodies into accumulated potentials.
pub struct Tree {
    arena: Arena,
    bodies: Vec<Body>,
    phase: Phase,
}

impl Tree {
    /// Allocates the arena for `level` levels (`1 <= level <= 10`) and builds
    /// the (topology-only, body-independent) interaction lists.
    pub fn new(level: usize) -> Result<Self, FmmError> {
        if level == 0 || level > 10 {
            return Err(FmmError::InvalidLevel(level));
        }

        let mut arena = Arena::build(level);
        interaction_list::build(&mut arena);

        Ok(Self {
            arena,
            bodies: Vec::new(),
            phase: Phase::Built,
        })
    }

    fn require(&self, required: Phase) -> Result<(), FmmError> {
        if self.phase == required {
            Ok(())
        } else {
            Err(FmmError::WrongPhase {
                required,
                actual: self.phase,
            })
        }
    }

    /// Adds a body to the leaf that contains its position. Valid from
    /// `Built` or `Populated`; leaves the tree in `Populated`. Repeated
    /// insertion of the same body is permitted; the caller is responsible
    /// for any resulting duplicate contribution.
    pub fn insert(&mut self, body: Body) -> Result<(), FmmError> {
        if !(self.phase == Phase::Built || self.phase == Phase::Populated) {
            return Err(FmmError::WrongPhase {
                required: Phase::Populated,
                actual: self.phase,
            });
        }

        let (px, py) = (body.x(), body.y());
        if !(0.0..1.0).contains(&px) || !(0.0..1.0).contains(&py) {
            return Err(FmmError::OutOfDomain(px, py));
        }

        let leaf = self.arena.leaf_index_for(px, py);
        let body_idx = self.bodies.len();
        self.bodies.push(body);
        self.arena.nodes[leaf].contents.push(body_idx);
        self.phase = Phase::Populated;

        Ok(())
    }

    /// Upward pass (`spec.md` §4.5): `Populated -> CoMReady`.
    ///
    /// Also accepted from `Built` directly: a tree with zero inserted bodies
    /// never observes the `Built -> Populated` edge but is still a valid,
    /// empty population (`spec.md` §8 scenario 1).
    pub fn compute_com(&mut self) -> Result<(), FmmError> {
        if !(self.phase == Phase::Built || self.phase == Phase::Populated) {
            return Err(FmmError::WrongPhase {
                required: Phase::Populated,
                actual: self.phase,
            });
        }
        passes::compute_com(&mut self.arena, &self.bodies);
        self.phase = Phase::CoMReady;
        Ok(())
    }

    /// M2L pass (`spec.md` §4.6): `CoMReady -> MultipolesReady`.
    pub fn compute_u(&mut self) -> Result<(), FmmError> {
        self.require(Phase::CoMReady)?;
        passes::compute_u(&mut self.arena);
        self.phase = Phase::MultipolesReady;
        Ok(())
    }

    /// Downward pass (`spec.md` §4.7): `MultipolesReady -> LocalsReady`.
    pub fn downward_pass(&mut self) -> Result<(), FmmError> {
        self.require(Phase::MultipolesReady)?;
        passes::downward_pass(&mut self.arena, &mut self.bodies);
        self.phase = Phase::LocalsReady;
        Ok(())
    }

    /// Near-field direct summation (`spec.md` §4.8): `LocalsReady -> Done`.
    pub fn sum_direct_computation(&mut self) -> Result<(), FmmError> {
        self.require(Phase::LocalsReady)?;
        passes::sum_direct_computation(&self.arena, &mut self.bodies);
        self.phase = Phase::Done;
        Ok(())
    }

    /// Resets the arena's mutable state and forgets every body, returning to
    /// `Built`. Tree topology (children, centers, interaction lists) is
    /// unaffected.
    pub fn clear(&mut self) -> &mut Self {
        self.arena.reset();
        interaction_list::build(&mut self.arena);
        self.bodies.clear();
        self.phase = Phase::Built;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn levels(&self) -> usize {
        self.arena.levels
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Neighbors of the cell addressed by `local` at `level`, as global
    /// arena indices (`spec.md` §4.3).
    pub fn neighbors(&self, level: usize, local: usize) -> Vec<usize> {
        neighbors_global(level, local)
    }

    pub fn interaction_list(&self, global: usize) -> &[usize] {
        &self.arena.nodes[global].interaction_list
    }

    pub fn node_mass(&self, global: usize) -> f64 {
        self.arena.nodes[global].node_mass
    }

    pub fn node_center(&self, global: usize) -> Complex64 {
        self.arena.nodes[global].node_center
    }

    /// Global index of the leaf that contains `(level, x, y)` for the
    /// finest level; exposed mainly for tests that need to address a
    /// specific cell without going through `insert`.
    pub fn global_index(&self, level: usize, x: usize, y: usize) -> usize {
        global_index(level, x, y)
    }

    pub fn level_width(&self, level: usize) -> usize {
        level_width(level)
    }

    pub fn center_of(&self, level: usize, x: usize, y: usize) -> Complex64 {
        node_center(level, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_is_rejected() {
        assert_eq!(Tree::new(0), Err(FmmError::InvalidLevel(0)));
        assert_eq!(Tree::new(11), Err(FmmError::InvalidLevel(11)));
    }

    #[test]
    fn out_of_domain_insert_is_rejected() {
        let mut tree = Tree::new(3).unwrap();
        let result = tree.insert(Body::new(0, Complex64::new(1.0, 0.5), 1.0));
        assert_eq!(result, Err(FmmError::OutOfDomain(1.0, 0.5)));
    }

    #[test]
    fn calling_a_pass_out_of_order_is_a_wrong_phase_error() {
        let mut tree = Tree::new(3).unwrap();
        let err = tree.compute_u().unwrap_err();
        assert_eq!(
            err,
            FmmError::WrongPhase {
                required: Phase::CoMReady,
                actual: Phase::Built,
            }
        );
    }

    #[test]
    fn empty_tree_has_zero_mass_after_compute_com() {
        let mut tree = Tree::new(3).unwrap();
        tree.compute_com().unwrap();
        assert_eq!(tree.node_mass(0), 0.0);
        assert!(tree.bodies().is_empty());
    }

    #[test]
    fn clear_resets_to_built_and_preserves_topology() {
        let mut tree = Tree::new(3).unwrap();
        tree.insert(Body::new(0, Complex64::new(0.5, 0.5), 1.0))
            .unwrap();
        tree.compute_com().unwrap();
        let root_children_before = tree.global_index(0, 0, 0);
        tree.clear();
        assert_eq!(tree.phase(), Phase::Built);
        assert_eq!(tree.node_mass(0), 0.0);
        assert_eq!(tree.global_index(0, 0, 0), root_children_before);
    }

    #[test]
    fn single_body_has_zero_potential_after_the_full_pipeline() {
        let mut tree = Tree::new(3).unwrap();
        tree.insert(Body::new(0, Complex64::new(0.5, 0.5), 1.0))
            .unwrap();

        tree.compute_com().unwrap();
        assert_eq!(tree.node_mass(0), 1.0);

        tree.compute_u().unwrap();
        tree.downward_pass().unwrap();
        tree.sum_direct_computation().unwrap();

        assert_eq!(tree.bodies()[0].u, Complex64::new(0.0, 0.0));
    }
}
