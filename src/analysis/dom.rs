//! Dominator tree over the CFG.
//!
//! Immediate dominators are computed with the iterative reverse-postorder
//! intersection algorithm; ancestor queries are answered in O(1) from a
//! preorder/postorder interval numbering of the dominator tree. The preorder
//! number is also exposed as `domorder`, the sort key used by CSE.

use crate::ir::{BlockId, Func};

use super::reverse_postorder;

pub struct DomTree {
    idom: Vec<Option<BlockId>>,
    /// Dominator-tree preorder interval, 1-based; 0 marks unreachable blocks.
    pre: Vec<u32>,
    post: Vec<u32>,
}

impl DomTree {
    pub fn compute(f: &Func) -> DomTree {
        let rpo = reverse_postorder(f);
        let mut rpo_num = vec![u32::MAX; f.num_blocks()];
        for (i, &b) in rpo.iter().enumerate() {
            rpo_num[b.index()] = i as u32;
        }

        let mut idom: Vec<Option<BlockId>> = vec![None; f.num_blocks()];
        idom[f.entry.index()] = Some(f.entry);

        let mut changed = true;
        while changed {
            changed = false;
            for &b in rpo.iter().skip(1) {
                let mut new_idom: Option<BlockId> = None;
                for e in &f.block(b).preds {
                    let p = e.block;
                    if idom[p.index()].is_none() {
                        continue;
                    }
                    new_idom = Some(match new_idom {
                        None => p,
                        Some(cur) => intersect(&idom, &rpo_num, cur, p),
                    });
                }
                if new_idom.is_some() && idom[b.index()] != new_idom {
                    idom[b.index()] = new_idom;
                    changed = true;
                }
            }
        }

        // Number the dominator tree for O(1) ancestor queries.
        let mut children: Vec<Vec<BlockId>> = vec![Vec::new(); f.num_blocks()];
        for &b in &rpo {
            if b == f.entry {
                continue;
            }
            if let Some(d) = idom[b.index()] {
                children[d.index()].push(b);
            }
        }
        let mut pre = vec![0u32; f.num_blocks()];
        let mut post = vec![0u32; f.num_blocks()];
        let mut clock = 0u32;
        number(f.entry, &children, &mut pre, &mut post, &mut clock);

        // The entry is its own idom only internally.
        idom[f.entry.index()] = None;

        DomTree { idom, pre, post }
    }

    /// Immediate dominator, or `None` for the entry and unreachable blocks.
    pub fn idom(&self, b: BlockId) -> Option<BlockId> {
        self.idom[b.index()]
    }

    /// Does `a` strictly dominate `b`?
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        a != b && self.dominates_or_eq(a, b)
    }

    /// Does `a` dominate `b` (reflexively)?
    pub fn dominates_or_eq(&self, a: BlockId, b: BlockId) -> bool {
        let (pa, pb) = (self.pre[a.index()], self.pre[b.index()]);
        if pa == 0 || pb == 0 {
            return false;
        }
        pa <= pb && self.post[b.index()] <= self.post[a.index()]
    }

    /// Dominator-tree preorder number, used as a deterministic sort key:
    /// if `a` dominates `b` then `domorder(a) < domorder(b)`.
    pub fn domorder(&self, b: BlockId) -> u32 {
        self.pre[b.index()]
    }
}

fn intersect(
    idom: &[Option<BlockId>],
    rpo_num: &[u32],
    mut a: BlockId,
    mut b: BlockId,
) -> BlockId {
    while a != b {
        while rpo_num[a.index()] > rpo_num[b.index()] {
            a = idom[a.index()].expect("dominator intersection above entry");
        }
        while rpo_num[b.index()] > rpo_num[a.index()] {
            b = idom[b.index()].expect("dominator intersection above entry");
        }
    }
    a
}

fn number(
    b: BlockId,
    children: &[Vec<BlockId>],
    pre: &mut [u32],
    post: &mut [u32],
    clock: &mut u32,
) {
    *clock += 1;
    pre[b.index()] = *clock;
    for &c in &children[b.index()] {
        number(c, children, pre, post, clock);
    }
    *clock += 1;
    post[b.index()] = *clock;
}

#[cfg(test)]
#[path = "../tests/analysis/t_dom.rs"]
mod tests;
