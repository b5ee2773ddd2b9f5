//! Removal of empty basic blocks.
//!
//! Deletes `Plain` blocks that contain nothing but φ-ops, splicing their
//! predecessors directly onto the successor and merging φ argument lists.
//! Such blocks are mostly left over from critical-edge splitting and from
//! branches SCCP decided.

use tracing::debug;

use crate::ir::{BlockId, BlockKind, Edge, Func, Op, ValueId};

pub fn trim(f: &mut Func) {
    // Removing one block can expose another candidate upstream, so iterate
    // to a fixed point.
    loop {
        let mut changed = false;
        for b in f.block_ids().to_vec() {
            if !trimmable(f, b) {
                continue;
            }
            splice(f, b);
            f.remove_block(b);
            changed = true;
            if f.pass.debug > 1 {
                debug!(func = %f.name, block = %b, "trim: removed block");
            }
        }
        if !changed {
            break;
        }
    }
}

/// A block emits no code if every value in it is a φ.
fn empty_block(f: &Func, b: BlockId) -> bool {
    f.block(b).values.iter().all(|&v| f.value(v).op == Op::Phi)
}

fn trimmable(f: &Func, b: BlockId) -> bool {
    if b == f.entry {
        return false;
    }
    let blk = f.block(b);
    if blk.kind != BlockKind::Plain || blk.preds.is_empty() {
        return false;
    }
    let s = blk.succs[0].block;
    s != b && empty_block(f, b)
}

/// Splices `b` out of the graph: rewires each predecessor of `b` to `b`'s
/// successor, extends the successor's φ-ops to cover the new predecessor
/// slots, and moves `b`'s values (all φ) ahead of the successor's own.
fn splice(f: &mut Func, b: BlockId) {
    let Edge { block: s, index: j } = f.block(b).succs[0];
    let ns = f.block(s).preds.len();

    // First predecessor takes over b's slot in s.
    let Edge {
        block: p0,
        index: i0,
    } = f.block(b).preds[0];
    f.block_mut(p0).succs[i0] = Edge { block: s, index: j };
    f.block_mut(s).preds[j] = Edge {
        block: p0,
        index: i0,
    };

    // Remaining predecessors are appended to s's predecessor list.
    let rest: Vec<Edge> = f.block(b).preds[1..].to_vec();
    for Edge { block: p, index: i } in rest {
        let slot = f.block(s).preds.len();
        f.block_mut(p).succs[i] = Edge {
            block: s,
            index: slot,
        };
        f.block_mut(s).preds.push(Edge { block: p, index: i });
    }

    let b_values: Vec<ValueId> = f.block(b).values.clone();

    if ns > 1 {
        // s keeps merging control flow, so its φ-ops grow to cover the
        // predecessor slots inherited from b. This must happen before b's
        // own φ args are touched below.
        for v in f.block(s).values.clone() {
            if f.value(v).op == Op::Phi {
                merge_phi(f, v, j, b);
            }
        }
        // b's φ-ops move into s; pad them to s's shape by replicating their
        // first argument. Not generally correct, but at this stage φ-ops
        // only carry liveness.
        for &u in &b_values {
            let args = f.value(u).args.clone();
            let first = args[0];
            let mut new_args = vec![first; ns];
            new_args.extend_from_slice(&args[1..]);
            f.value_mut(u).args = new_args;
        }
    }

    // Move b's values ahead of s's existing values, preserving definition
    // order.
    let mut merged = b_values.clone();
    merged.extend(f.block(s).values.iter().copied());
    f.block_mut(s).values = merged;
    for v in b_values {
        f.value_mut(v).block = s;
    }
    f.block_mut(b).values.clear();
}

/// Adjusts the φ `v` in the successor for the removal of `b`, which occupied
/// predecessor slot `i` of `v`'s block.
fn merge_phi(f: &mut Func, v: ValueId, i: usize, b: BlockId) {
    let nb = f.block(b).preds.len();
    let u = f.value(v).args[i];
    if f.value(u).block == b {
        if f.value(u).op != Op::Phi {
            f.fatal(format!("trim: value {} is not a phi operation", u));
        }
        // b contained u = φ(u0, ..., un-1): slot i becomes u0 and the rest
        // are appended, matching the predecessor slots spliced in above.
        let u_args = f.value(u).args.clone();
        f.set_arg(v, i, u_args[0]);
        for &a in &u_args[1..] {
            f.add_arg(v, a);
        }
    } else {
        // v does not depend on a value in b; replicate the argument for each
        // extra predecessor slot.
        let arg = f.value(v).args[i];
        for _ in 1..nb {
            f.add_arg(v, arg);
        }
    }
}

#[cfg(test)]
#[path = "../tests/opt/t_trim.rs"]
mod tests;
