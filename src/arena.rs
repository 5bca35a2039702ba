//! The node arena: a contiguous, pointer-free array of tree nodes addressed
//! by global index (see `spec.md` §3).

use num_complex::Complex64;

use crate::geometry::{global_index, level_start, level_width, local_to_xy, node_center, total_nodes};

/// A single quadtree cell. Lives in `Arena::nodes`, addressed by its
/// position in that vector (its `uid`).
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub uid: usize,
    /// Global indices of the four children, in `(2x,2y) (2x+1,2y) (2x,2y+1) (2x+1,2y+1)`
    /// order. Unused (left as `0`) for leaves.
    pub children: [usize; 4],
    /// Body-table indices contained in this leaf. Empty for internal nodes.
    pub contents: Vec<usize>,
    /// Well-separated same-level targets (see `interaction_list` module).
    pub interaction_list: Vec<usize>,
    /// Accumulated local expansion.
    pub u: Complex64,
    pub node_mass: f64,
    pub node_center: Complex64,
}

impl TreeNode {
    fn leaf(uid: usize, center: Complex64) -> Self {
        Self {
            uid,
            children: [0; 4],
            contents: Vec::new(),
            interaction_list: Vec::new(),
            u: Complex64::new(0.0, 0.0),
            node_mass: 0.0,
            node_center: center,
        }
    }
}

/// The dense arena for a tree with `levels` levels (`L` in `spec.md`).
#[derive(Debug, Clone)]
pub struct Arena {
    pub levels: usize,
    pub nodes: Vec<TreeNode>,
}

impl Arena {
    /// Allocates and initializes every node's `uid`, `children`, and
    /// `node_center`. All mass/potential fields start at zero.
    pub fn build(levels: usize) -> Self {
        let n_total = total_nodes(levels);
        let mut nodes = Vec::with_capacity(n_total);

        for level in 0..levels {
            let width = level_width(level);
            let start = level_start(level);
            for local in 0..width * width {
                let (x, y) = local_to_xy(local, level);
                let uid = start + local;
                let center = node_center(level, x, y);
                let mut node = TreeNode::leaf(uid, center);

                if level < levels - 1 {
                    let child_start = level_start(level + 1);
                    let child_width = level_width(level + 1);
                    let cx = 2 * x;
                    let cy = 2 * y;
                    node.children = [
                        child_start + cx + cy * child_width,
                        child_start + (cx + 1) + cy * child_width,
                        child_start + cx + (cy + 1) * child_width,
                        child_start + (cx + 1) + (cy + 1) * child_width,
                    ];
                }

                nodes.push(node);
            }
        }

        debug_assert_eq!(nodes.len(), n_total);
        Self { levels, nodes }
    }

    pub fn leaf_level(&self) -> usize {
        self.levels - 1
    }

    pub fn leaf_start(&self) -> usize {
        level_start(self.leaf_level())
    }

    /// Clears all mutable per-node state (contents, interaction lists, mass,
    /// potential) while keeping the static shape (`children`, `node_center`).
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.contents.clear();
            node.interaction_list.clear();
            node.u = Complex64::new(0.0, 0.0);
            node.node_mass = 0.0;
        }
    }

    /// Global index of the leaf that owns position `(px, py)`.
    pub fn leaf_index_for(&self, px: f64, py: f64) -> usize {
        let leaf_level = self.leaf_level();
        let width = level_width(leaf_level) as f64;
        let x = (px * width).floor() as usize;
        let y = (py * width).floor() as usize;
        global_index(leaf_level, x, y)
    }
}
