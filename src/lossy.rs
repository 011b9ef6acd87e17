//! Variance-threshold lossy pruning pass.
//!
//! Promotes subtrees whose internal variation is small into uniform leaves,
//! trading image quality for a smaller encoded output. Runs once before
//! `encoder::encode`; never touches the serialized format directly.

use crate::tree::{Node, Tree};
use crate::Error;

/// Apply the lossy filter in place. `alpha` must be `> 1.0`; larger values
/// relax the threshold more aggressively as recursion deepens.
pub fn filter(tree: &mut Tree, alpha: f64) -> Result<(), Error> {
    if alpha <= 1.0 {
        return Err(Error::InvalidParameter(format!(
            "alpha must be > 1.0, got {alpha}"
        )));
    }

    let mut variances = Vec::new();
    collect_variances(&mut tree.root, &mut variances);

    if variances.is_empty() {
        log::debug!("lossy filter: tree already uniform, nothing to do");
        return Ok(());
    }

    variances.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let v_med = variances[variances.len() / 2];
    let v_max = variances[variances.len() - 1];
    let t0 = v_med / v_max;
    log::info!(
        "lossy filter: alpha={alpha}, median variance={v_med:.4}, max variance={v_max:.4}, initial threshold={t0:.4}"
    );

    filter_recursive(&mut tree.root, t0, alpha);
    Ok(())
}

/// Post-order variance computation; collects every strictly-positive
/// variance encountered (leaves contribute 0 and are excluded).
fn collect_variances(node: &mut Node, out: &mut Vec<f64>) {
    if node.is_leaf() {
        node.v = 0.0;
        return;
    }
    for child in node.children.iter_mut().flatten() {
        collect_variances(child, out);
    }
    node.v = compute_variance(node);
    if node.v > 0.0 {
        out.push(node.v);
    }
}

fn compute_variance(node: &Node) -> f64 {
    let mut mu = 0.0;
    for child in node.children.iter().flatten() {
        let diff = node.m as f64 - child.m as f64;
        mu += child.v * child.v + diff * diff;
    }
    (mu / 4.0).sqrt()
}

/// Recompute `v(N)`, recurse into children with a relaxed threshold, and
/// promote `N` to uniform if its variance and all its children qualify.
/// Returns whether `N` ends up uniform.
fn filter_recursive(node: &mut Node, threshold: f64, alpha: f64) -> bool {
    if node.is_leaf() {
        return true;
    }

    node.v = compute_variance(node);

    let mut all_uniform = true;
    for child in node.children.iter_mut().flatten() {
        if !filter_recursive(child, threshold * alpha, alpha) {
            all_uniform = false;
        }
    }

    if node.v <= threshold && all_uniform {
        node.u = true;
        node.e = 0;
        for slot in node.children.iter_mut() {
            *slot = None;
        }
        true
    } else {
        node.u = is_uniform_block(node);
        node.u
    }
}

fn is_uniform_block(node: &Node) -> bool {
    if node.e != 0 {
        return false;
    }
    let children: Vec<&Node> = node.children.iter().flatten().map(|b| b.as_ref()).collect();
    if children.iter().any(|c| !c.u) {
        return false;
    }
    if let Some(first) = children.first() {
        if children.iter().any(|c| c.m != first.m) {
            return false;
        }
    }
    true
}
