//! Natural-loop discovery and the loop-nest hierarchy.
//!
//! A back edge is a CFG edge t→h where h dominates t (reflexively); its
//! natural loop is h plus everything that reaches t without passing through
//! h. Loops sharing a header are merged. Nesting is derived from body
//! containment; `b2l` maps each block to its innermost containing loop.

use std::collections::HashSet;

use crate::ir::{BlockId, Func};

use super::dom::DomTree;

pub struct Loop {
    pub header: BlockId,
    /// Immediately enclosing loop, if any.
    pub outer: Option<usize>,
    pub children: Vec<usize>,
    /// Blocks in the loop body, including the header.
    pub body: Vec<BlockId>,
    /// Blocks outside the loop that are jump targets from inside it.
    pub exits: Vec<BlockId>,
    pub contains_call: bool,
    pub is_inner: bool,
}

pub struct LoopNest {
    pub loops: Vec<Loop>,
    /// Innermost loop per block id, if the block is in any loop.
    pub b2l: Vec<Option<usize>>,
}

impl LoopNest {
    pub fn compute(f: &Func, dom: &DomTree) -> LoopNest {
        // Collect natural-loop bodies, one per header.
        let mut headers: Vec<BlockId> = Vec::new();
        let mut bodies: Vec<HashSet<BlockId>> = Vec::new();
        for &t in f.block_ids() {
            for e in &f.block(t).succs {
                let h = e.block;
                if !dom.dominates_or_eq(h, t) {
                    continue;
                }
                let idx = match headers.iter().position(|&x| x == h) {
                    Some(i) => i,
                    None => {
                        headers.push(h);
                        bodies.push(HashSet::from([h]));
                        headers.len() - 1
                    }
                };
                collect_body(f, h, t, &mut bodies[idx]);
            }
        }

        let mut loops: Vec<Loop> = headers
            .iter()
            .zip(&bodies)
            .map(|(&header, body)| {
                let mut body: Vec<BlockId> = body.iter().copied().collect();
                body.sort();
                let contains_call = body.iter().any(|&b| {
                    f.block(b)
                        .values
                        .iter()
                        .any(|&v| f.value(v).op.is_call())
                });
                Loop {
                    header,
                    outer: None,
                    children: Vec::new(),
                    body,
                    exits: Vec::new(),
                    contains_call,
                    is_inner: true,
                }
            })
            .collect();

        // b2l: the smallest containing body is the innermost loop.
        let mut b2l: Vec<Option<usize>> = vec![None; f.num_blocks()];
        for (i, lp) in loops.iter().enumerate() {
            for &b in &lp.body {
                match b2l[b.index()] {
                    Some(j) if loops[j].body.len() <= lp.body.len() => {}
                    _ => b2l[b.index()] = Some(i),
                }
            }
        }

        // Nesting: the outer of a loop is the innermost other loop whose body
        // contains its header.
        for i in 0..loops.len() {
            let header = loops[i].header;
            let mut outer: Option<usize> = None;
            for (j, other) in loops.iter().enumerate() {
                if j == i || !other.body.contains(&header) {
                    continue;
                }
                match outer {
                    Some(k) if loops[k].body.len() <= other.body.len() => {}
                    _ => outer = Some(j),
                }
            }
            loops[i].outer = outer;
        }
        for i in 0..loops.len() {
            if let Some(o) = loops[i].outer {
                loops[o].children.push(i);
                loops[o].is_inner = false;
            }
        }

        // Exit blocks: jump targets outside the body.
        for lp in loops.iter_mut() {
            let mut exits: Vec<BlockId> = Vec::new();
            for &b in &lp.body {
                for e in &f.block(b).succs {
                    if !lp.body.contains(&e.block) && !exits.contains(&e.block) {
                        exits.push(e.block);
                    }
                }
            }
            lp.exits = exits;
        }

        LoopNest { loops, b2l }
    }
}

fn collect_body(f: &Func, header: BlockId, tail: BlockId, body: &mut HashSet<BlockId>) {
    if body.contains(&tail) {
        return;
    }
    body.insert(tail);
    let mut work = vec![tail];
    while let Some(b) = work.pop() {
        for e in &f.block(b).preds {
            let p = e.block;
            if p != header && body.insert(p) {
                work.push(p);
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/analysis/t_loopnest.rs"]
mod tests;
