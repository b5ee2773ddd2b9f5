//! Hoisting of surviving CSE classes to a common anticipated dominator.
//!
//! After substitution an equivalence class often still has members in
//! distinct, mutually non-dominating blocks (the arms of a diamond, say).
//! When a dominating block is found where the expression is anticipated on
//! exit and the operands are available, the expression is computed there once
//! and the members become copies of it.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::analysis::{postorder, DomTree};
use crate::ir::{BlockId, Func, Op, ValueId};
use crate::util::SparseSet;

use super::cse::{ClassMap, EqClass};

/// A chosen hoist destination: the block, the value created there, and the
/// class members it absorbs.
struct HoistDst {
    blk: BlockId,
    v: Option<ValueId>,
    vs: Vec<ValueId>,
}

struct HoistState<'f> {
    f: &'f mut Func,
    dom: &'f DomTree,
    partition: &'f mut Vec<EqClass>,
    value_eq_class: &'f mut ClassMap,
    ant_out: Vec<SparseSet>,
    done: HashSet<usize>,
}

/// Entry point, called from CSE. Returns the number of values hoisted.
pub(crate) fn hoist_values(
    f: &mut Func,
    dom: &DomTree,
    partition: &mut Vec<EqClass>,
    value_eq_class: &mut ClassMap,
    rewrite: &[Option<ValueId>],
) -> i64 {
    // Keep only members that were not substituted away and are hoistable at
    // all; a class needs at least two of them to be worth moving.
    let mut n = 0;
    for e in partition.iter_mut() {
        e.retain(|&v| rewrite[v.index()].is_none() && can_hoist_value(f, v));
        if e.len() >= 2 {
            n += e.len();
        }
    }
    if n == 0 {
        return 0;
    }

    let ant_out = anticipated_exprs(f, partition, value_eq_class);
    let mut state = HoistState {
        f,
        dom,
        partition,
        value_eq_class,
        ant_out,
        done: HashSet::new(),
    };

    let mut hoists = 0;
    for class_id in 0..state.partition.len() {
        hoists += state.hoist_class(class_id);
    }
    hoists
}

fn can_hoist_value(f: &Func, v: ValueId) -> bool {
    let val = f.value(v);
    // A φ cannot move: the new block has a different predecessor count.
    if val.op == Op::Phi {
        return false;
    }
    // Tuples would drag their selectors along; don't hoist them.
    if val.ty.is_tuple() {
        return false;
    }
    // Memory-modifying operations stay where they are.
    if val.ty.is_memory() {
        return false;
    }
    // Control values are always live; hoisting one tends to grow code when
    // the original is materialized again.
    if f.block(val.block).control == Some(v) {
        return false;
    }
    true
}

/// Computes, per block exit, the set of expressions (class ids) evaluated on
/// every path leaving the block. Unlike classical very-busy-expressions this
/// ignores operand availability, which our own transformations change.
fn anticipated_exprs(f: &Func, partition: &[EqClass], value_eq_class: &ClassMap) -> Vec<SparseSet> {
    let n_class = partition.len();
    let mut ant_in: Vec<SparseSet> = (0..f.num_blocks()).map(|_| SparseSet::new(n_class)).collect();
    let mut ant_out: Vec<SparseSet> =
        (0..f.num_blocks()).map(|_| SparseSet::new(n_class)).collect();

    // Backward dataflow, so traverse the blocks in postorder.
    let post = postorder(f);
    loop {
        let mut change = false;
        for &b in &post {
            let succs = f.block(b).succs.clone();
            if succs.is_empty() {
                ant_out[b.index()].clear();
            } else {
                let first = ant_in[succs[0].block.index()].clone();
                ant_out[b.index()].set(&first);
                for e in &succs[1..] {
                    let other = ant_in[e.block.index()].clone();
                    ant_out[b.index()].intersect(&other);
                }
            }

            // Propagate backwards through the block: everything computed
            // here joins the set, except classes with a single member, which
            // would never move anyway.
            let mut s = SparseSet::new(n_class);
            s.set(&ant_out[b.index()]);
            for &v in &f.block(b).values {
                let id = value_eq_class[v.index()];
                if id >= 0 && partition[id as usize].len() > 1 {
                    s.add(id as usize);
                }
            }

            if !s.equal(&ant_in[b.index()]) {
                ant_in[b.index()].set(&s);
                change = true;
            }
        }
        if !change {
            break;
        }
    }

    ant_out
}

/// Adds `b` to the destination set unless an existing destination dominates
/// it; destinations dominated by `b` are dropped.
fn add_hoist_candidate(dom: &DomTree, ds: &mut Vec<HoistDst>, b: BlockId) {
    for d in ds.iter() {
        if dom.dominates_or_eq(d.blk, b) {
            return;
        }
    }
    let mut i = 0;
    while i < ds.len() {
        if dom.dominates(b, ds[i].blk) {
            ds.swap_remove(i);
            continue;
        }
        i += 1;
    }
    ds.push(HoistDst {
        blk: b,
        v: None,
        vs: Vec::new(),
    });
}

impl<'f> HoistState<'f> {
    /// Chooses hoist destinations for a class and distributes its members to
    /// them. A destination is the single predecessor of a member's block,
    /// provided the class is anticipated at its exit.
    fn hoist_plan(&self, class_id: usize) -> Vec<HoistDst> {
        let mut ds: Vec<HoistDst> = Vec::new();
        for &v in &self.partition[class_id] {
            let vb = self.f.value(v).block;
            if self.f.block(vb).preds.len() != 1 {
                continue;
            }
            let d = self.f.block(vb).preds[0].block;
            if self.ant_out[d.index()].contains(class_id) {
                add_hoist_candidate(self.dom, &mut ds, d);
            }
        }
        if ds.is_empty() {
            return ds;
        }
        for &v in &self.partition[class_id] {
            let vb = self.f.value(v).block;
            for d in ds.iter_mut() {
                if self.dom.dominates(d.blk, vb) {
                    d.vs.push(v);
                    break;
                }
            }
        }
        ds
    }

    fn available_on_exit(&self, b: BlockId, v: ValueId) -> bool {
        self.dom.dominates_or_eq(self.f.value(v).block, b)
    }

    fn any_available_on_exit(&self, b: BlockId, e: &EqClass) -> Option<ValueId> {
        e.iter().copied().find(|&v| self.available_on_exit(b, v))
    }

    /// Replaces each argument with a member of its equivalence class that is
    /// available at the exit of `b`. False if some argument has none.
    fn available_args(&self, b: BlockId, args: &mut [ValueId]) -> bool {
        for a in args.iter_mut() {
            let mut u = *a;
            // Look through copies; the copy source is what the class tracks,
            // and using it directly unblocks whole dependency chains.
            if self.f.value(u).op == Op::Copy {
                u = self.f.value(u).args[0];
            }
            let id = self.value_eq_class[u.index()];
            if id < 0 {
                if !self.available_on_exit(b, u) {
                    return false;
                }
            } else {
                match self.any_available_on_exit(b, &self.partition[id as usize]) {
                    Some(w) => u = w,
                    None => return false,
                }
            }
            *a = u;
        }
        true
    }

    /// Hoists one class, dependencies first. Returns the number of values
    /// replaced by copies.
    fn hoist_class(&mut self, class_id: usize) -> i64 {
        if self.partition[class_id].len() < 2 {
            return 0;
        }
        if !self.done.insert(class_id) {
            return 0;
        }

        let mut hoists = 0;

        // Hoist the operands' classes before this one, so their new
        // representatives are in place for the availability search.
        for v in self.partition[class_id].clone() {
            for a in self.f.value(v).args.clone() {
                let id = self.value_eq_class[a.index()];
                if id >= 0 {
                    hoists += self.hoist_class(id as usize);
                }
            }
        }

        let mut dst = self.hoist_plan(class_id);
        for i in 0..dst.len() {
            // Fewer than two absorbed members is no code-size win.
            if dst[i].vs.len() < 2 {
                continue;
            }
            let b = dst[i].blk;
            let v = dst[i].vs[0];

            let mut args = self.f.value(v).args.clone();
            if !self.available_args(b, &mut args) {
                if self.f.pass.debug > 2 {
                    trace!(func = %self.f.name, value = %v, block = %b,
                        "hoist: operands not available");
                }
                continue;
            }

            // The new value joins the class it stands in for.
            let (op, ty, aux, aux_int, line) = {
                let val = self.f.value(v);
                (val.op, val.ty.clone(), val.aux.clone(), val.aux_int, val.line)
            };
            let c = self.f.new_value(b, op, ty, line);
            self.f.value_mut(c).aux = aux;
            self.f.value_mut(c).aux_int = aux_int;
            for a in args {
                self.f.add_arg(c, a);
            }
            self.value_eq_class.push(class_id as i64);
            dst[i].v = Some(c);

            if self.f.pass.debug > 1 {
                let absorbed: Vec<String> = dst[i].vs.iter().map(|v| v.to_string()).collect();
                debug!(func = %self.f.name, dest = %b, members = %absorbed.join(" "),
                    "cse: hoist");
            }

            // The absorbed members become copies of the hoisted value.
            for &u in &dst[i].vs {
                if self.f.value(u).ty.is_void() {
                    self.f.reset(u, Op::Invalid);
                } else {
                    self.f.reset(u, Op::Copy);
                    self.f.add_arg(u, c);
                }
            }
            hoists += dst[i].vs.len() as i64;
        }

        // Only the newly created values remain in the class.
        self.partition[class_id] = dst.iter().filter_map(|d| d.v).collect();
        hoists
    }
}

#[cfg(test)]
#[path = "../tests/opt/t_hoist.rs"]
mod tests;
