//! Loop-invariant code motion.
//!
//! Moves values whose operands do not change across iterations out of the
//! loop into its pre-header. Outermost loops are processed after their
//! children, so an invariant migrates to the outermost pre-header it can
//! legally reach.

use std::collections::HashMap;

use tracing::debug;

use crate::analysis::{DomTree, LoopNest};
use crate::ir::{BlockKind, Func, Op, ValueId};

pub fn licm(f: &mut Func) {
    let dom = DomTree::compute(f);
    let ln = LoopNest::compute(f, &dom);

    let mut nmove: i64 = 0; // invariants moved
    let mut noprehdr: i64 = 0; // loops with no pre-header

    let outermost: Vec<usize> = (0..ln.loops.len())
        .filter(|&i| ln.loops[i].outer.is_none())
        .collect();
    for lp in outermost {
        let (n, h) = move_invariants(f, &dom, &ln, lp);
        nmove += n;
        noprehdr += h;
    }

    if f.pass.stats > 0 {
        f.log_stat("LICM MOVES", nmove);
        f.log_stat("LICM NOPREHDR", noprehdr);
    }
}

fn move_invariants(f: &mut Func, dom: &DomTree, ln: &LoopNest, lp: usize) -> (i64, i64) {
    let mut nmove = 0;
    let mut nohdr = 0;

    if !ln.loops[lp].is_inner {
        // Move invariants out of the inner loops first.
        for &c in &ln.loops[lp].children {
            let (n, h) = move_invariants(f, dom, ln, c);
            nmove += n;
            nohdr += h;
        }
    }

    // Hoisting out of a loop with calls just extends live ranges across the
    // calls; the spill cost outweighs the saved recomputation.
    if ln.loops[lp].contains_call {
        return (nmove, nohdr);
    }

    // The pre-header is the only predecessor of the header that the header
    // does not dominate, i.e. the only edge entering from outside the loop.
    let header = ln.loops[lp].header;
    let mut pre = None;
    for e in &f.block(header).preds {
        if dom.dominates_or_eq(header, e.block) {
            continue;
        }
        if pre.is_some() {
            pre = None;
            break;
        }
        pre = Some(e.block);
    }
    let Some(pre) = pre else {
        return (nmove, nohdr + 1);
    };

    // Determine the invariance of each definition in the loop.
    let mut inv: InvMap = HashMap::new();
    for b in f.block_ids().to_vec() {
        if ln.b2l[b.index()] != Some(lp) {
            continue;
        }
        for v in f.block(b).values.clone() {
            check_invariant(f, dom, ln, lp, v, &mut inv);
        }
    }

    if f.pass.debug > 1 {
        let moved: Vec<String> = inv
            .iter()
            .filter(|&(_, &is_inv)| is_inv)
            .map(|(v, _)| v.to_string())
            .collect();
        debug!(func = %f.name, header = %header, invariants = %moved.join(" "),
            "licm: loop invariants");
    }

    // Move the invariants to the pre-header, preserving their order.
    for b in f.block_ids().to_vec() {
        if ln.b2l[b.index()] != Some(lp) {
            continue;
        }
        let values = f.block(b).values.clone();
        let mut kept = Vec::with_capacity(values.len());
        for v in values {
            let is_inv = match inv.get(&v) {
                Some(&x) => x,
                None => f.fatal(format!("licm: unknown invariance status for {}", v)),
            };
            if !is_inv {
                kept.push(v);
                continue;
            }
            f.block_mut(pre).values.push(v);
            f.value_mut(v).block = pre;
            nmove += 1;
        }
        f.block_mut(b).values = kept;
    }

    (nmove, nohdr)
}

/// Memoized invariance per value: absent means not yet known.
type InvMap = HashMap<ValueId, bool>;

fn can_hoist_value(f: &Func, v: ValueId) -> bool {
    let val = f.value(v);
    // φ-ops are not invariant.
    if val.op == Op::Phi {
        return false;
    }
    // Values touching the memory chain stay put; a loop that writes memory
    // has a memory φ in its header tainting everything downstream anyway.
    if val.ty.is_memory() || val.args.iter().any(|&a| f.value(a).ty.is_memory()) {
        return false;
    }
    // Control values are always live; the original would just be
    // materialized again, growing code and execution time.
    if f.block(val.block).control == Some(v) {
        return false;
    }
    true
}

/// True when executing the op at the pre-header cannot introduce a fault
/// that the loop body would not have produced. Integer division and modulo
/// qualify only with a provably nonzero constant divisor.
fn speculatively_safe(f: &Func, v: ValueId) -> bool {
    let val = f.value(v);
    match val.op {
        Op::Div8
        | Op::Div16
        | Op::Div32
        | Op::Div64
        | Op::Div8u
        | Op::Div16u
        | Op::Div32u
        | Op::Div64u
        | Op::Mod8
        | Op::Mod16
        | Op::Mod32
        | Op::Mod64
        | Op::Mod8u
        | Op::Mod16u
        | Op::Mod32u
        | Op::Mod64u => {
            let d = f.value(val.args[1]);
            d.op.is_const() && d.aux_int != 0
        }
        Op::Load
        | Op::Store
        | Op::Zero
        | Op::InitMem
        | Op::StaticCall
        | Op::NilCheck
        | Op::IsNonNil
        | Op::IsInBounds
        | Op::KeepAlive
        | Op::Arg
        | Op::Phi
        | Op::Invalid => false,
        // Everything else is pure arithmetic, comparison, conversion,
        // boolean logic, constants, copies, or tuple-field selection.
        _ => true,
    }
}

fn check_invariant(
    f: &Func,
    dom: &DomTree,
    ln: &LoopNest,
    lp: usize,
    v: ValueId,
    inv: &mut InvMap,
) -> bool {
    if let Some(&known) = inv.get(&v) {
        return known;
    }

    // A value defined outside the loop is invariant iff its block strictly
    // dominates the loop header.
    let vb = f.value(v).block;
    if ln.b2l[vb.index()] != Some(lp) {
        return dom.dominates(vb, ln.loops[lp].header);
    }

    // Certain operations are never moved.
    if !can_hoist_value(f, v) {
        inv.insert(v, false);
        return false;
    }

    // Constants are invariants.
    if f.value(v).op.is_const() {
        inv.insert(v, true);
        return true;
    }

    for a in f.value(v).args.clone() {
        if !check_invariant(f, dom, ln, lp, a, inv) {
            inv.insert(v, false);
            return false;
        }
    }

    // With invariant arguments the value may move if executing it early is
    // harmless, or if it was going to execute on every iteration anyway:
    // it must then dominate every loop exit except the abnormal ones.
    if !speculatively_safe(f, v) {
        for &eb in &ln.loops[lp].exits {
            if f.block(eb).kind != BlockKind::Exit && !dom.dominates(vb, eb) {
                inv.insert(v, false);
                return false;
            }
        }
    }

    inv.insert(v, true);
    true
}

#[cfg(test)]
#[path = "../tests/opt/t_licm.rs"]
mod tests;
