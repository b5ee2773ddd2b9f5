//! Sparse conditional constant propagation.
//!
//! After Wegman and Zadeck, "Constant propagation with conditional branches",
//! TOPLAS 13(2), 1991. Each value carries a three-point lattice element;
//! control edges become executable only when the controlling value allows it,
//! so constants propagate through branches that provably go one way.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::ir::{BlockId, Func, Op, Type, ValueId};
use crate::util::SparseSet;

use super::fold::{fold_fn, FoldFn};

/// Lattice element of a value: `Top` is not-yet-known, `Const` a single known
/// bit pattern, `Bottom` known non-constant. Values only ever move downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lattice {
    Top,
    Const(i64),
    Bottom,
}

impl Lattice {
    pub fn is_top(self) -> bool {
        matches!(self, Lattice::Top)
    }

    pub fn is_const(self) -> bool {
        matches!(self, Lattice::Const(_))
    }

    pub fn is_bottom(self) -> bool {
        matches!(self, Lattice::Bottom)
    }

    /// Constant bits; zero unless `is_const`.
    pub fn bits(self) -> i64 {
        match self {
            Lattice::Const(bits) => bits,
            _ => 0,
        }
    }

    fn same_kind(self, other: Lattice) -> bool {
        std::mem::discriminant(&self) == std::mem::discriminant(&other)
    }
}

#[derive(Default)]
struct LatticeCell {
    lv: Lattice,
    /// Values that use this one as an argument (SSA out-edges).
    uses: Vec<ValueId>,
    /// Blocks that use this value as their control.
    ctl: Vec<BlockId>,
}

impl Default for Lattice {
    fn default() -> Lattice {
        Lattice::Top
    }
}

/// A control edge, identified by its destination block and the predecessor
/// slot it occupies there.
type FlowEdge = (BlockId, usize);

struct Sccp<'f> {
    f: &'f mut Func,
    cells: Vec<LatticeCell>,
    exec: HashSet<FlowEdge>,
    flowlist: Vec<FlowEdge>,
    ssalist: SparseSet,
}

pub fn sccp(f: &mut Func) {
    let num_values = f.num_values();
    let mut s = Sccp {
        cells: (0..num_values).map(|_| LatticeCell::default()).collect(),
        exec: HashSet::new(),
        flowlist: Vec::new(),
        ssalist: SparseSet::new(num_values),
        f,
    };

    // Reverse indices: per value, its users and the blocks it controls.
    for &b in s.f.block_ids() {
        for &v in &s.f.block(b).values {
            for &a in &s.f.value(v).args {
                s.cells[a.index()].uses.push(v);
            }
        }
        if let Some(c) = s.f.block(b).control {
            s.cells[c.index()].ctl.push(b);
        }
    }

    // Seed with the entry block, then drain the two worklists.
    let entry = s.f.entry;
    s.visit_exprs(entry);
    loop {
        if let Some(e) = s.flowlist.pop() {
            // An edge already marked executable is not entered a second time.
            if !s.exec.insert(e) {
                continue;
            }
            let (b, _) = e;
            let (x, n) = s.exec_edges(b);

            // φ-ops change with each newly executable edge.
            s.visit_phis(b, &x);

            // Non-φ ops are visited as a whole only once, following the
            // first executable edge into the block.
            if n > 1 {
                continue;
            }
            s.visit_exprs(b);
        } else if let Some(id) = s.ssalist.pop() {
            let v = ValueId(id as u32);
            let b = s.f.value(v).block;
            let (x, n) = s.exec_edges(b);

            // φ-ops are always revisited; non-φ ops only when the block has
            // at least one executable incoming edge.
            if s.f.value(v).op == Op::Phi {
                s.visit_phi(v, &x);
            } else if n > 0 {
                s.visit_expr(v);
            }
        } else {
            break;
        }
    }

    s.finalize();
}

impl<'f> Sccp<'f> {
    /// Per-predecessor executable flags for `b`, plus the executable count.
    fn exec_edges(&self, b: BlockId) -> (Vec<bool>, usize) {
        let preds = &self.f.block(b).preds;
        let mut x = Vec::with_capacity(preds.len());
        let mut n = 0;
        for i in 0..preds.len() {
            let e = self.exec.contains(&(b, i));
            x.push(e);
            if e {
                n += 1;
            }
        }
        (x, n)
    }

    fn visit_phis(&mut self, b: BlockId, x: &[bool]) {
        for v in self.f.block(b).values.clone() {
            if self.f.value(v).op == Op::Phi {
                self.visit_phi(v, x);
            }
        }
    }

    /// Computes the meet of a φ's arguments over its executable predecessor
    /// slots; arguments on non-executable edges count as Top.
    fn visit_phi(&mut self, v: ValueId, x: &[bool]) {
        let mut new = Lattice::Top;
        let args = self.f.value(v).args.clone();
        for (i, &a) in args.iter().enumerate() {
            if new.is_bottom() {
                break;
            }
            if !x[i] {
                continue;
            }
            let av = self.cells[a.index()].lv;
            match av {
                Lattice::Top => {}
                Lattice::Bottom => new = Lattice::Bottom,
                Lattice::Const(bits) => {
                    if new.is_top() {
                        new = av;
                    } else if new.bits() != bits {
                        new = Lattice::Bottom;
                    }
                }
            }
        }

        let old = self.cells[v.index()].lv;
        self.cells[v.index()].lv = new;
        if self.f.pass.debug > 2 {
            trace!(func = %self.f.name, phi = %v, ?old, ?new, "sccp phi");
        }
        if !old.same_kind(new) {
            self.propagate(v);
        }
    }

    /// Visits every non-φ op in `b`, then schedules the unconditional
    /// successor edge if the block has one.
    fn visit_exprs(&mut self, b: BlockId) {
        for v in self.f.block(b).values.clone() {
            if self.f.value(v).op != Op::Phi {
                self.visit_expr(v);
            }
        }
        // An unconditional block transfers control to its one successor.
        let kind = self.f.block(b).kind;
        if matches!(kind, crate::ir::BlockKind::Plain | crate::ir::BlockKind::First) {
            let e = self.f.block(b).succs[0];
            self.flowlist.push((e.block, e.index));
        }
    }

    fn visit_expr(&mut self, v: ValueId) {
        let op = self.f.value(v).op;
        let new = if op.is_const() {
            // Const ops are trivially lattice constants.
            Lattice::Const(self.f.value(v).aux_int)
        } else if let Some(fold) = fold_fn(op) {
            let lats: Vec<Lattice> = self
                .f
                .value(v)
                .args
                .iter()
                .map(|a| self.cells[a.index()].lv)
                .collect();
            match fold {
                FoldFn::Simple(func) => {
                    // Any Bottom argument sinks the result; any Top (with no
                    // Bottom) leaves it unknown.
                    if lats.iter().any(|l| l.is_bottom()) {
                        Lattice::Bottom
                    } else if lats.iter().any(|l| l.is_top()) {
                        Lattice::Top
                    } else {
                        let bits: Vec<i64> = lats.iter().map(|l| l.bits()).collect();
                        Lattice::Const(func(&bits))
                    }
                }
                FoldFn::General(func) => func(&lats),
            }
        } else {
            // No fold function: never a constant.
            Lattice::Bottom
        };

        let old = self.cells[v.index()].lv;
        self.cells[v.index()].lv = new;
        if self.f.pass.debug > 2 {
            trace!(func = %self.f.name, value = %v, ?old, ?new, "sccp expr");
        }
        if !old.same_kind(new) {
            self.propagate(v);
        }
    }

    /// Schedules further work after `v`'s lattice value was lowered: its
    /// users on the SSA worklist, and for every block it controls the
    /// successor edges compatible with the new value.
    fn propagate(&mut self, v: ValueId) {
        for u in self.cells[v.index()].uses.clone() {
            self.ssalist.add(u.index());
        }
        let lv = self.cells[v.index()].lv;
        for b in self.cells[v.index()].ctl.clone() {
            let succs = self.f.block(b).succs.clone();
            if lv.is_bottom() || succs.len() < 2 {
                // Non-constant control: all successors are potentially taken.
                for e in succs {
                    self.flowlist.push((e.block, e.index));
                }
            } else if lv.bits() == 0 {
                let e = succs[1];
                self.flowlist.push((e.block, e.index));
            } else {
                let e = succs[0];
                self.flowlist.push((e.block, e.index));
            }
        }
    }

    /// Rewrites every value with a constant lattice element into the typed
    /// constant op carrying its bits.
    fn finalize(&mut self) {
        for i in 0..self.cells.len() {
            let v = ValueId(i as u32);
            let val = self.f.value(v);
            if val.op == Op::Invalid || val.op.is_const() {
                continue;
            }
            let lv = self.cells[i].lv;
            if !lv.is_const() {
                continue;
            }
            let op = match &val.ty {
                Type::Bool => Op::ConstBool,
                Type::Int { .. } => match val.ty.size() {
                    1 => Op::Const8,
                    2 => Op::Const16,
                    4 => Op::Const32,
                    8 => Op::Const64,
                    _ => self
                        .f
                        .fatal(format!("sccp: impossible integer width for {}", v)),
                },
                Type::Float { .. } => match val.ty.size() {
                    4 => Op::Const32F,
                    8 => Op::Const64F,
                    _ => self.f.fatal(format!("sccp: impossible float width for {}", v)),
                },
                _ => self.f.fatal(format!(
                    "sccp: constant lattice value for non-constant type of {}",
                    v
                )),
            };
            if self.f.pass.debug > 1 {
                debug!(
                    func = %self.f.name,
                    value = %self.f.value(v).long_string(),
                    bits = lv.bits(),
                    "sccp: rewrite to constant"
                );
            }
            self.f.reset(v, op);
            self.f.value_mut(v).aux_int = lv.bits();
        }
    }
}

#[cfg(test)]
#[path = "../tests/opt/t_sccp.rs"]
mod tests;
