//! Dead code elimination.
//!
//! Removes blocks unreachable from the entry (compacting the φ operands of
//! their reachable successors) and then sweeps values: liveness is seeded by
//! block control values and side-effecting operations and propagated through
//! argument edges. Dead values are reset to `Invalid` and dropped from their
//! block.

use crate::ir::{Edge, Func, Op, ValueId};

pub fn dce(f: &mut Func) {
    remove_unreachable_blocks(f);

    let mut live = vec![false; f.num_values()];
    let mut work: Vec<ValueId> = Vec::new();

    for &b in f.block_ids() {
        if let Some(c) = f.block(b).control {
            if !live[c.index()] {
                live[c.index()] = true;
                work.push(c);
            }
        }
        for &v in &f.block(b).values {
            if f.value(v).op.has_side_effects() && !live[v.index()] {
                live[v.index()] = true;
                work.push(v);
            }
        }
    }

    while let Some(v) = work.pop() {
        for &a in &f.value(v).args {
            if !live[a.index()] {
                live[a.index()] = true;
                work.push(a);
            }
        }
    }

    for b in f.block_ids().to_vec() {
        let values = f.block(b).values.clone();
        let mut kept = Vec::with_capacity(values.len());
        for v in values {
            if live[v.index()] {
                kept.push(v);
            } else {
                f.reset(v, Op::Invalid);
            }
        }
        f.block_mut(b).values = kept;
    }
}

fn remove_unreachable_blocks(f: &mut Func) {
    let mut reachable = vec![false; f.num_blocks()];
    let mut work = vec![f.entry];
    reachable[f.entry.index()] = true;
    while let Some(b) = work.pop() {
        for e in &f.block(b).succs {
            if !reachable[e.block.index()] {
                reachable[e.block.index()] = true;
                work.push(e.block);
            }
        }
    }

    if f.block_ids().iter().all(|b| reachable[b.index()]) {
        return;
    }

    // Disconnect reachable blocks from dead predecessors. Removing a
    // predecessor slot shifts the ones after it, so the paired successor
    // edges and the φ operands are rewritten to match.
    for b in f.block_ids().to_vec() {
        if !reachable[b.index()] {
            continue;
        }
        let preds = f.block(b).preds.clone();
        if preds.iter().all(|e| reachable[e.block.index()]) {
            continue;
        }
        let keep: Vec<usize> = (0..preds.len())
            .filter(|&i| reachable[preds[i].block.index()])
            .collect();
        let new_preds: Vec<Edge> = keep.iter().map(|&i| preds[i]).collect();
        for (new_i, e) in new_preds.iter().enumerate() {
            f.block_mut(e.block).succs[e.index].index = new_i;
        }
        f.block_mut(b).preds = new_preds;
        for v in f.block(b).values.clone() {
            if f.value(v).op == Op::Phi {
                let args = f.value(v).args.clone();
                f.value_mut(v).args = keep.iter().map(|&i| args[i]).collect();
            }
        }
    }

    for b in f.block_ids().to_vec() {
        if !reachable[b.index()] {
            for v in f.block(b).values.clone() {
                f.reset(v, Op::Invalid);
            }
            f.block_mut(b).values.clear();
            f.remove_block(b);
        }
    }
}

#[cfg(test)]
#[path = "../tests/opt/t_dce.rs"]
mod tests;
