//! Breadth-first, bit-packed serialization of a quadtree.
//!
//! The body is organized into `levels+1` passes, one per depth. Pass `k`
//! visits every node at depth `k` in quadrant-ordered preorder, skipping the
//! subtrees under any already-uniform ancestor. The fourth child (bottom-left
//! slot) of any non-root node never writes its mean: it is implied by the
//! parent-sum identity and the decoder recomputes it.

use crate::format;
use crate::tools::bitstream::BitWriter;
use crate::tree::{Node, Tree, QUADRANT_ORDER};
use crate::Error;

/// Statistics about a completed encode, used to fill in the header's
/// compression-rate comment.
#[derive(Debug, Clone, Copy)]
pub struct EncodeStats {
    pub total_bits: usize,
    pub compression_rate: f64,
}

/// Encode `tree` and write the header plus body to `out`.
pub fn encode<W: std::io::Write>(tree: &Tree, out: &mut W) -> Result<EncodeStats, Error> {
    let mut body = Vec::new();
    let total_bits = {
        let mut writer = BitWriter::new(&mut body);
        for level in 0..=tree.levels {
            encode_level(&mut writer, &tree.root, 0, level, false, tree.levels)?;
            log::trace!("encoded pass {level}/{}", tree.levels);
        }
        writer.flush()?;
        writer.total_bits()
    };

    let original_bits = tree.side * tree.side * 8;
    let compression_rate = total_bits as f64 / original_bits as f64 * 100.0;
    log::info!(
        "encoded {} bits ({:.2}% of original {} bits)",
        total_bits,
        compression_rate,
        original_bits
    );

    format::write_header(out, tree.levels, compression_rate)?;
    out.write_all(&body)?;

    Ok(EncodeStats {
        total_bits,
        compression_rate,
    })
}

fn encode_level<W: std::io::Write>(
    writer: &mut BitWriter<W>,
    node: &Node,
    current_level: u32,
    target_level: u32,
    is_interpolated: bool,
    max_level: u32,
) -> Result<(), Error> {
    if current_level == target_level {
        write_node(writer, node, current_level == max_level, is_interpolated)?;
        return Ok(());
    }
    // a uniform node's subtree was already pruned; nothing below it to visit
    if node.u {
        return Ok(());
    }
    for (i, &q) in QUADRANT_ORDER.iter().enumerate() {
        if let Some(child) = node.child(q) {
            encode_level(writer, child, current_level + 1, target_level, i == 3, max_level)?;
        }
    }
    Ok(())
}

fn write_node<W: std::io::Write>(
    writer: &mut BitWriter<W>,
    node: &Node,
    is_leaf: bool,
    is_interpolated: bool,
) -> Result<(), Error> {
    if !is_interpolated {
        writer.write_bits(node.m as u32, 8)?;
    }
    if is_leaf {
        return Ok(());
    }
    writer.write_bits(node.e as u32, 2)?;
    if node.e == 0 {
        writer.write_bit(node.u as u8)?;
    }
    Ok(())
}
