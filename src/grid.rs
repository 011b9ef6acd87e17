//! Partition-visualization raster: draws the quadtree's split boundaries at
//! mid-gray over an otherwise blank image. Purely diagnostic; never read
//! back by the decoder.

use crate::pgm::Raster;
use crate::tree::{Node, Tree};
use crate::Error;

const GRID_COLOR: u8 = 128;

/// Render `tree`'s partition boundaries into a raster of the same side.
pub fn render_grid(tree: &Tree) -> Result<Raster, Error> {
    let side = tree.side as usize;
    let mut pixels = vec![0u8; side * side];
    let side32 = tree.side as u32;
    draw_node(&tree.root, &mut pixels, side32, 0, 0, side32);

    let last = side32 - 1;
    draw_horizontal(&mut pixels, side32, 0, 0, side32);
    draw_horizontal(&mut pixels, side32, 0, last, side32);
    draw_vertical(&mut pixels, side32, 0, 0, side32);
    draw_vertical(&mut pixels, side32, last, 0, side32);

    Raster::new(side32, pixels)
}

fn draw_node(node: &Node, pixels: &mut [u8], total_side: u32, x: u32, y: u32, node_side: u32) {
    if node_side <= 1 || node.is_leaf() {
        return;
    }

    let half = node_side / 2;
    draw_horizontal(pixels, total_side, x, y + half, node_side);
    draw_vertical(pixels, total_side, x + half, y, node_side);

    use crate::tree::Quadrant::*;
    if let Some(child) = node.child(TopLeft) {
        draw_node(child, pixels, total_side, x, y, half);
    }
    if let Some(child) = node.child(TopRight) {
        draw_node(child, pixels, total_side, x + half, y, half);
    }
    if let Some(child) = node.child(BottomLeft) {
        draw_node(child, pixels, total_side, x, y + half, half);
    }
    if let Some(child) = node.child(BottomRight) {
        draw_node(child, pixels, total_side, x + half, y + half, half);
    }
}

fn draw_horizontal(pixels: &mut [u8], total_side: u32, x: u32, y: u32, width: u32) {
    for i in 0..width {
        if y < total_side && x + i < total_side {
            pixels[(y * total_side + x + i) as usize] = GRID_COLOR;
        }
    }
}

fn draw_vertical(pixels: &mut [u8], total_side: u32, x: u32, y: u32, height: u32) {
    for i in 0..height {
        if x < total_side && y + i < total_side {
            pixels[((y + i) * total_side + x) as usize] = GRID_COLOR;
        }
    }
}
