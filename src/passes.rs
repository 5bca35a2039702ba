//! The four analytical passes: upward center-of-mass accumulation, the
//! multipole-to-local (M2L) translation, the downward local-expansion push,
//! and near-field direct summation (`spec.md` §4.5-§4.8).

use itertools::Itertools;
use num_complex::Complex64;

use crate::arena::Arena;
use crate::body::{kernel, Body};
use crate::geometry::{global_index, level_start, level_width, neighbors_global};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Upward pass: leaf masses from contents, then bottom-up aggregation of
/// internal node masses from their four children (`spec.md` §4.5).
pub fn compute_com(arena: &mut Arena, bodies: &[Body]) {
    let _span = tracing::debug_span!("compute_com").entered();
    let start_time = std::time::Instant::now();

    let leaf_start = arena.leaf_start();

    #[cfg(feature = "rayon")]
    arena.nodes[leaf_start..].par_iter_mut().for_each(|node| {
        node.node_mass = node.contents.iter().map(|&i| bodies[i].mass).sum();
    });
    #[cfg(not(feature = "rayon"))]
    for node in &mut arena.nodes[leaf_start..] {
        node.node_mass = node.contents.iter().map(|&i| bodies[i].mass).sum();
    }

    for level in (0..arena.leaf_level()).rev() {
        let start = level_start(level);
        let end = level_start(level + 1);

        let (head, rest) = arena.nodes.split_at_mut(end);
        let current = &mut head[start..end];

        #[cfg(feature = "rayon")]
        current.par_iter_mut().for_each(|node| {
            node.node_mass = node
                .children
                .iter()
                .map(|&c| rest[c - end].node_mass)
                .sum();
        });
        #[cfg(not(feature = "rayon"))]
        for node in current.iter_mut() {
            node.node_mass = node
                .children
                .iter()
                .map(|&c| rest[c - end].node_mass)
                .sum();
        }
    }

    tracing::debug!(elapsed = ?start_time.elapsed(), "compute_com finished");
}

/// M2L pass, implemented as the loop-inversion variant of `spec.md` §4.6:
/// for each target, gather contributions from its own interaction list
/// instead of scattering from each source. Valid because the
/// well-separatedness relation this core builds is symmetric (see
/// `interaction_list::tests::interaction_list_relation_is_symmetric`), and it
/// lets every target own its own write with no lock or reduction buffer.
pub fn compute_u(arena: &mut Arena) {
    let _span = tracing::debug_span!("compute_u").entered();
    let start_time = std::time::Instant::now();

    for level in 2..arena.levels {
        let start = level_start(level);
        let end = level_start(level + 1);

        let snapshot: Vec<(Complex64, f64)> = arena.nodes[start..end]
            .iter()
            .map(|n| (n.node_center, n.node_mass))
            .collect();

        let current = &mut arena.nodes[start..end];

        #[cfg(feature = "rayon")]
        current.par_iter_mut().enumerate().for_each(|(i, node)| {
            let (t_center, _) = snapshot[i];
            let contribution: Complex64 = node
                .interaction_list
                .iter()
                .map(|&s| {
                    let (s_center, s_mass) = snapshot[s - start];
                    kernel(t_center, s_center) * s_mass
                })
                .sum();
            node.u += contribution;
        });
        #[cfg(not(feature = "rayon"))]
        for (i, node) in current.iter_mut().enumerate() {
            let (t_center, _) = snapshot[i];
            let contribution: Complex64 = node
                .interaction_list
                .iter()
                .map(|&s| {
                    let (s_center, s_mass) = snapshot[s - start];
                    kernel(t_center, s_center) * s_mass
                })
                .sum();
            node.u += contribution;
        }
    }

    tracing::debug!(elapsed = ?start_time.elapsed(), "compute_u finished");
}

/// Global index of the parent of `(child_level, child_local)`.
fn parent_of(child_level: usize, child_local: usize) -> usize {
    let child_width = level_width(child_level);
    let (cx, cy) = (child_local % child_width, child_local / child_width);
    global_index(child_level - 1, cx / 2, cy / 2)
}

/// Downward pass: top-down push of local expansions from parent to child
/// for every non-leaf level that received an M2L contribution, followed by
/// distribution of each leaf's final `u` to its bodies (`spec.md` §4.7).
///
/// Levels 0 and 1 hold no M2L contribution and are skipped, per the spec.
pub fn downward_pass(arena: &mut Arena, bodies: &mut [Body]) {
    let _span = tracing::debug_span!("downward_pass").entered();
    let start_time = std::time::Instant::now();

    let leaf_level = arena.leaf_level();

    if leaf_level >= 3 {
        for child_level in 3..=leaf_level {
            let start = level_start(child_level);
            let end = level_start(child_level + 1);

            let (parents_and_before, current_and_after) = arena.nodes.split_at_mut(start);
            let current = &mut current_and_after[..end - start];

            #[cfg(feature = "rayon")]
            current.par_iter_mut().enumerate().for_each(|(i, node)| {
                let parent_global = parent_of(child_level, i);
                node.u += parents_and_before[parent_global].u;
            });
            #[cfg(not(feature = "rayon"))]
            for (i, node) in current.iter_mut().enumerate() {
                let parent_global = parent_of(child_level, i);
                node.u += parents_and_before[parent_global].u;
            }
        }
    }

    let leaf_start = arena.leaf_start();
    for leaf in &arena.nodes[leaf_start..] {
        for &body_idx in &leaf.contents {
            bodies[body_idx].u += leaf.u;
        }
    }

    tracing::debug!(elapsed = ?start_time.elapsed(), "downward_pass finished");
}

/// Near-field direct summation: each leaf's contents against themselves and
/// against the contents of same-level neighbor leaves (`spec.md` §4.8).
pub fn sum_direct_computation(arena: &Arena, bodies: &mut [Body]) {
    let _span = tracing::debug_span!("sum_direct_computation").entered();
    let start_time = std::time::Instant::now();

    let leaf_level = arena.leaf_level();
    let leaf_start = arena.leaf_start();

    let leaf_deltas: Vec<Vec<(usize, Complex64)>> = {
        let compute_leaf = |leaf_global: usize| -> Vec<(usize, Complex64)> {
            let leaf = &arena.nodes[leaf_global];
            if leaf.contents.is_empty() {
                return Vec::new();
            }

            let mut deltas = vec![Complex64::new(0.0, 0.0); leaf.contents.len()];

            for (a, b) in (0..leaf.contents.len()).tuple_combinations() {
                let (p, q) = (leaf.contents[a], leaf.contents[b]);
                if bodies[p].uid == bodies[q].uid {
                    continue;
                }
                let k = kernel(bodies[p].pos, bodies[q].pos);
                deltas[a] += k * bodies[q].mass;
                deltas[b] += k * bodies[p].mass;
            }

            let leaf_local = leaf_global - level_start(leaf_level);
            for neighbor_global in neighbors_global(leaf_level, leaf_local) {
                let neighbor = &arena.nodes[neighbor_global];
                for (a, &p) in leaf.contents.iter().enumerate() {
                    for &q in &neighbor.contents {
                        if bodies[p].uid == bodies[q].uid {
                            continue;
                        }
                        deltas[a] += kernel(bodies[p].pos, bodies[q].pos) * bodies[q].mass;
                    }
                }
            }

            leaf.contents
                .iter()
                .zip(deltas)
                .map(|(&body_idx, delta)| (body_idx, delta))
                .collect()
        };

        #[cfg(feature = "rayon")]
        {
            (leaf_start..arena.nodes.len())
                .into_par_iter()
                .map(compute_leaf)
                .collect()
        }
        #[cfg(not(feature = "rayon"))]
        {
            (leaf_start..arena.nodes.len()).map(compute_leaf).collect()
        }
    };

    for (body_idx, delta) in leaf_deltas.into_iter().flatten() {
        bodies[body_idx].u += delta;
    }

    tracing::debug!(elapsed = ?start_time.elapsed(), "sum_direct_computation finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::interaction_list;

    fn make_bodies(positions: &[(f64, f64, f64)]) -> Vec<Body> {
        positions
            .iter()
            .enumerate()
            .map(|(i, &(x, y, m))| Body::new(i, Complex64::new(x, y), m))
            .collect()
    }

    #[test]
    fn compute_com_conserves_total_mass() {
        let mut arena = Arena::build(4);
        let bodies = make_bodies(&[(0.1, 0.1, 1.0), (0.9, 0.9, 2.0), (0.4, 0.6, 0.5)]);

        for (i, b) in bodies.iter().enumerate() {
            let leaf = arena.leaf_index_for(b.x(), b.y());
            arena.nodes[leaf].contents.push(i);
        }

        compute_com(&mut arena, &bodies);
        let total: f64 = bodies.iter().map(|b| b.mass).sum();
        assert!((arena.nodes[0].node_mass - total).abs() < 1e-12);
    }

    #[test]
    fn two_distant_bodies_accumulate_via_m2l_within_monopole_tolerance() {
        let levels = 5;
        let mut arena = Arena::build(levels);
        let mut bodies = make_bodies(&[(0.1, 0.1, 1.0), (0.9, 0.9, 1.0)]);

        for i in 0..bodies.len() {
            let leaf = arena.leaf_index_for(bodies[i].x(), bodies[i].y());
            arena.nodes[leaf].contents.push(i);
        }

        compute_com(&mut arena, &bodies);
        interaction_list::build(&mut arena);
        compute_u(&mut arena);
        downward_pass(&mut arena, &mut bodies);
        sum_direct_computation(&arena, &mut bodies);

        let expected = (0.64f64 + 0.64f64).sqrt().ln();
        for b in &bodies {
            assert!((b.u.re - expected).abs() / expected.abs() < 1e-2);
        }
    }

    #[test]
    fn two_bodies_in_the_same_leaf_match_exact_log_distance() {
        let levels = 5;
        let mut arena = Arena::build(levels);
        let mut bodies = make_bodies(&[(0.50, 0.50, 1.0), (0.51, 0.50, 1.0)]);

        for i in 0..bodies.len() {
            let leaf = arena.leaf_index_for(bodies[i].x(), bodies[i].y());
            arena.nodes[leaf].contents.push(i);
        }

        compute_com(&mut arena, &bodies);
        interaction_list::build(&mut arena);
        compute_u(&mut arena);
        downward_pass(&mut arena, &mut bodies);
        sum_direct_computation(&arena, &mut bodies);

        let expected = 0.01f64.ln();
        for b in &bodies {
            assert!((b.u.re - expected).abs() < 1e-12);
        }
    }
}
