//! Index arithmetic for the dense, level-major uniform quadtree arena.
//!
//! Nodes are laid out level by level, root first. Level `l` (0-based) holds
//! `4^l` nodes starting at global index `S(l) = (4^l - 1) / 3`; within a
//! level a node's local index is `x + y * 2^l` for cell coordinates
//! `(x, y)` with `0 <= x, y < 2^l`.

use num_complex::Complex64;

/// Width (cells per side) of level `l`: `2^l`.
pub fn level_width(level: usize) -> usize {
    1usize << level
}

/// Global index of the first node at level `l`: `(4^l - 1) / 3`.
pub fn level_start(level: usize) -> usize {
    ((1usize << (2 * level)) - 1) / 3
}

/// Total node count for a tree with `levels` levels (0-based levels
/// `0..levels`, i.e. `levels == L` in `spec.md`'s notation): `level_start(levels)`.
pub fn total_nodes(levels: usize) -> usize {
    level_start(levels)
}

/// Local index of cell `(x, y)` within its level.
pub fn local_index(x: usize, y: usize, level: usize) -> usize {
    x + y * level_width(level)
}

/// Inverse of `local_index`: recovers `(x, y)` from a local index and level.
pub fn local_to_xy(local: usize, level: usize) -> (usize, usize) {
    let width = level_width(level);
    (local % width, local / width)
}

/// Global arena index of cell `(x, y)` at `level`.
pub fn global_index(level: usize, x: usize, y: usize) -> usize {
    level_start(level) + local_index(x, y, level)
}

/// Decomposes a global arena index into `(level, x, y)`.
///
/// Linear in `levels` (at most 10 in this core), which is cheap relative to
/// the O(N) work the passes already perform per node.
pub fn decompose(global: usize, levels: usize) -> (usize, usize, usize) {
    for level in 0..levels {
        let start = level_start(level);
        let next_start = level_start(level + 1);
        if global < next_start {
            debug_assert!(global >= start);
            let local = global - start;
            let (x, y) = local_to_xy(local, level);
            return (level, x, y);
        }
    }
    unreachable!("global index {global} out of range for a tree of {levels} levels")
}

/// `node_center` for a cell of width `2^-level` at `(x, y)`: the cell's midpoint.
pub fn node_center(level: usize, x: usize, y: usize) -> Complex64 {
    let width = 1.0 / (level_width(level) as f64);
    Complex64::new(x as f64 * width + width / 2.0, y as f64 * width + width / 2.0)
}

/// The Moore neighborhood (up to 8 cells) of `(x, y)` at `level`, excluding
/// the cell itself, clipped against `[0, 2^level) x [0, 2^level)`.
///
/// Deterministic order: `dy` in `{-1, 0, 1}` then `dx` in `{-1, 0, 1}`,
/// skipping `(0, 0)` and any offset that falls outside the grid. The result
/// is not sorted by global index — callers that need sorted order (the
/// interaction-list builder) sort explicitly.
pub fn local_neighbors(level: usize, x: usize, y: usize) -> Vec<(usize, usize)> {
    let width = level_width(level) as isize;
    let (ix, iy) = (x as isize, y as isize);
    let mut out = Vec::with_capacity(8);

    for dy in -1..=1isize {
        for dx in -1..=1isize {
            if dx == 0 && dy == 0 {
                continue;
            }
            let (nx, ny) = (ix + dx, iy + dy);
            if nx >= 0 && nx < width && ny >= 0 && ny < width {
                out.push((nx as usize, ny as usize));
            }
        }
    }

    out
}

/// `Tree::neighbors(level, local)` from `spec.md` §4.3: neighbors of the cell
/// addressed by `local` at `level`, as global arena indices.
pub fn neighbors_global(level: usize, local: usize) -> Vec<usize> {
    let (x, y) = local_to_xy(local, level);
    local_neighbors(level, x, y)
        .into_iter()
        .map(|(nx, ny)| global_index(level, nx, ny))
        .collect()
}
