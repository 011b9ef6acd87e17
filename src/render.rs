//! Turns a (possibly pruned) tree back into a row-major pixel buffer.

use crate::tree::{Node, Tree, QUADRANT_ORDER};

/// Render `tree` into a `side*side` row-major pixel buffer.
pub fn render(tree: &Tree) -> Vec<u8> {
    let side = tree.side as usize;
    let mut pixels = vec![0u8; side * side];
    let side32 = tree.side as u32;
    fill(&tree.root, &mut pixels, side32, 0, 0, side32);
    pixels
}

fn fill(node: &Node, pixels: &mut [u8], total_side: u32, row: u32, col: u32, side: u32) {
    if node.u || side == 1 {
        for i in row..row + side {
            for j in col..col + side {
                pixels[(i * total_side + j) as usize] = node.m;
            }
        }
        return;
    }

    let half = side / 2;
    let origins = [(row, col), (row, col + half), (row + half, col + half), (row + half, col)];
    for (i, &q) in QUADRANT_ORDER.iter().enumerate() {
        if let Some(child) = node.child(q) {
            let (r, c) = origins[i];
            fill(child, pixels, total_side, r, c, half);
        }
    }
}
