//! Builds a quadtree from a pixel buffer, bottom-up.
//!
//! The recursion is top-down in traversal (it descends from the full image
//! down to single pixels) but bottom-up in aggregation: a node's mean,
//! residual and uniformity are only known once all four children exist, so
//! they are computed on the way back up out of the recursion.

use crate::tree::{Node, Tree, QUADRANT_ORDER};
use crate::Error;

/// Build a tree from a row-major pixel buffer of length `side*side`. `side`
/// must be a positive power of two.
pub fn build(pixels: &[u8], side: u32) -> Result<Tree, Error> {
    if side == 0 || !side.is_power_of_two() {
        return Err(Error::InvalidParameter(format!(
            "side {side} is not a positive power of two"
        )));
    }
    if pixels.len() != (side as usize) * (side as usize) {
        return Err(Error::InvalidParameter(format!(
            "pixel buffer has {} entries, expected {}",
            pixels.len(),
            (side as usize) * (side as usize)
        )));
    }
    let levels = side.trailing_zeros();
    let total_nodes = calculate_total_nodes(levels);
    let node_bytes = total_nodes.saturating_mul(std::mem::size_of::<Node>() as u64);
    if node_bytes > isize::MAX as u64 {
        return Err(Error::OutOfMemory(format!(
            "tree of {total_nodes} nodes at {side}x{side} exceeds addressable memory"
        )));
    }
    log::debug!("building quadtree: side={side} levels={levels}, up to {total_nodes} nodes");
    let root = build_recursive(pixels, side, levels, 0, 0)?;
    log::info!("quadtree built: {side}x{side}, {levels} levels, root mean {}", root.m);
    Ok(Tree {
        root,
        levels,
        side: side as u64,
    })
}

/// Upper bound on node count for a tree of the given depth: `sum(4^k for k in 0..=levels)`.
fn calculate_total_nodes(levels: u32) -> u64 {
    (4u64.saturating_pow(levels + 1) - 1) / 3
}

fn build_recursive(pixels: &[u8], side: u32, level: u32, row: u32, col: u32) -> Result<Node, Error> {
    if level == 0 {
        let m = pixels[(row * side + col) as usize];
        return Ok(Node::leaf(m));
    }

    let step = 1u32 << (level - 1);
    // origins relative to (row, col) in TL, TR, BR, BL order
    let origins = [
        (row, col),
        (row, col + step),
        (row + step, col + step),
        (row + step, col),
    ];

    let mut children: [Option<Box<Node>>; 4] = [None, None, None, None];
    for (i, &q) in QUADRANT_ORDER.iter().enumerate() {
        let (r, c) = origins[i];
        children[q.index()] = Some(Box::new(build_recursive(pixels, side, level - 1, r, c)?));
    }

    let means: Vec<u32> = QUADRANT_ORDER
        .iter()
        .map(|&q| children[q.index()].as_ref().unwrap().m as u32)
        .collect();
    let sum = means[0] + means[1] + means[2] + means[3];
    let m = (sum / 4) as u8;
    let e = (sum % 4) as u8;

    let all_uniform = QUADRANT_ORDER
        .iter()
        .all(|&q| children[q.index()].as_ref().unwrap().u);
    let all_same = means[0] == means[1] && means[1] == means[2] && means[2] == means[3];
    let uniform = e == 0 && all_uniform && all_same;

    if uniform {
        log::trace!("level {level} ({row},{col}): collapsed to uniform mean {m}");
        Ok(Node::leaf(m))
    } else {
        Ok(Node {
            m,
            e,
            u: false,
            v: 0.0,
            children,
        })
    }
}
