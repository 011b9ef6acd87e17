//! Inverse of `encoder`: reconstructs a tree from a header-prefixed bit
//! stream.
//!
//! Decoding happens in two phases. First, `decode_records` walks the body
//! pass-by-pass exactly as the encoder wrote it, producing one flat `Vec` of
//! `NodeRecord`s per depth (the fourth-child mean is recomputed here, as soon
//! as its three siblings are known). Second, `reconstruct` walks those flat
//! per-depth lists with a per-depth cursor to rebuild the nested `Node`
//! tree — the quadrant-ordered, uniform-subtree-skipping traversal is
//! deterministic, so the cursor always lands on the right record without
//! needing parent back-pointers.

use crate::format;
use crate::tools::bitstream::BitReader;
use crate::tree::{fourth_mean, Node, Tree};
use crate::Error;

#[derive(Clone, Copy)]
struct NodeRecord {
    m: u8,
    e: u8,
    u: bool,
}

/// Decode a header-prefixed bit stream into a tree.
pub fn decode<R: std::io::Read>(input: &mut R) -> Result<Tree, Error> {
    let levels = format::read_header(input)?;
    log::debug!("decoding quadtree: levels={levels}");
    let mut reader = BitReader::new(input);

    let root_rec = decode_node_record(&mut reader, 0, levels, None)?;
    let mut records: Vec<Vec<NodeRecord>> = vec![vec![root_rec]];

    for level in 1..=levels {
        let mut current = Vec::new();
        for parent in &records[(level - 1) as usize] {
            if parent.u {
                continue;
            }
            let mut three = [0u8; 3];
            for slot in 0..4u8 {
                let rec = if slot < 3 {
                    let rec = decode_node_record(&mut reader, level, levels, None)?;
                    three[slot as usize] = rec.m;
                    rec
                } else {
                    decode_node_record(&mut reader, level, levels, Some((parent.m, parent.e, three)))?
                };
                current.push(rec);
            }
        }
        log::trace!("decoded pass {level}/{levels}, {} nodes", current.len());
        records.push(current);
        if records.last().map(|v| v.is_empty()).unwrap_or(true) {
            log::trace!("worklist empty, remaining passes are vacuous");
        }
    }

    let mut cursors = vec![0usize; (levels + 1) as usize];
    let root = reconstruct(&records, 0, levels, &mut cursors)?;
    // widened to u64: levels can be up to 32, and `1u32 << 32` would
    // overflow a 32-bit shift.
    let side = 1u64
        .checked_shl(levels)
        .ok_or_else(|| Error::Format(format!("tree depth {levels} overflows side length")))?;
    log::info!("decoded {side}x{side} tree, {levels} levels");
    Ok(Tree { root, levels, side })
}

fn decode_node_record<R: std::io::Read>(
    reader: &mut BitReader<R>,
    level: u32,
    max_level: u32,
    interpolate: Option<(u8, u8, [u8; 3])>,
) -> Result<NodeRecord, Error> {
    let m = match interpolate {
        None => reader.read_bits(8)?,
        Some((pm, pe, three)) => fourth_mean(pm, pe, three[0], three[1], three[2]),
    };
    if level < max_level {
        let e = reader.read_bits(2)?;
        let u = if e == 0 { reader.read_bits(1)? != 0 } else { false };
        Ok(NodeRecord { m, e, u })
    } else {
        Ok(NodeRecord { m, e: 0, u: true })
    }
}

fn reconstruct(
    records: &[Vec<NodeRecord>],
    depth: u32,
    max_level: u32,
    cursors: &mut [usize],
) -> Result<Node, Error> {
    let level_records = records.get(depth as usize).ok_or_else(|| {
        Error::Format(format!("missing decoded records for depth {depth}"))
    })?;
    let idx = cursors[depth as usize];
    cursors[depth as usize] += 1;
    let rec = *level_records
        .get(idx)
        .ok_or_else(|| Error::Format(format!("missing sibling at depth {depth}, index {idx}")))?;

    if rec.u || depth == max_level {
        return Ok(Node::leaf(rec.m));
    }

    let mut children: [Option<Box<Node>>; 4] = [None, None, None, None];
    for slot in children.iter_mut() {
        *slot = Some(Box::new(reconstruct(records, depth + 1, max_level, cursors)?));
    }
    Ok(Node {
        m: rec.m,
        e: rec.e,
        u: false,
        v: 0.0,
        children,
    })
}
