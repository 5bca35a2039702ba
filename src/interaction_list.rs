//! Builds each node's interaction list: same-level cells that are
//! well-separated at this level but were not yet separated at the parent's
//! level (`spec.md` §4.4).

use crate::arena::Arena;
use crate::geometry::{global_index, level_start, level_width, local_neighbors, local_to_xy, neighbors_global};

/// Populates `interaction_list` on every node at level `>= 2`. Levels 0 and
/// 1 never act as a child here and keep the empty list they were built with.
pub fn build(arena: &mut Arena) {
    let levels = arena.levels;
    if levels < 3 {
        // No parent level in [1, L-2] exists; every interaction list stays empty.
        return;
    }

    for parent_level in 1..=(levels - 2) {
        let width = level_width(parent_level);

        for local in 0..width * width {
            let (px, py) = local_to_xy(local, parent_level);
            let parent_global = global_index(parent_level, px, py);

            // PNC: children of P's neighbors (not P's own children), sorted.
            let mut pnc: Vec<usize> = local_neighbors(parent_level, px, py)
                .into_iter()
                .flat_map(|(nx, ny)| {
                    let neighbor_global = global_index(parent_level, nx, ny);
                    arena.nodes[neighbor_global].children
                })
                .collect();
            pnc.sort_unstable();

            let children = arena.nodes[parent_global].children;
            let child_level = parent_level + 1;
            let child_start = level_start(child_level);

            for &child_global in &children {
                let child_local = child_global - child_start;
                let mut cn = neighbors_global(child_level, child_local);
                cn.sort_unstable();

                arena.nodes[child_global].interaction_list = sorted_difference(&pnc, &cn);
            }
        }
    }
}

/// Set difference of two already-sorted, deduplicated slices.
fn sorted_difference(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len());
    let (mut i, mut j) = (0usize, 0usize);

    while i < a.len() {
        match b.get(j) {
            Some(&bj) if a[i] == bj => {
                i += 1;
                j += 1;
            }
            Some(&bj) if a[i] > bj => {
                j += 1;
            }
            _ => {
                out.push(a[i]);
                i += 1;
            }
        }
    }

    out
}
