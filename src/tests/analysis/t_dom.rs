use super::DomTree;
use crate::ir::{BlockKind, FuncBuilder};

/// entry → (then | else) → merge
fn diamond() -> (crate::ir::Func, [crate::ir::BlockId; 4]) {
    let mut fb = FuncBuilder::new("diamond");
    let b1 = fb.block(BlockKind::If);
    let b2 = fb.block(BlockKind::Plain);
    let b3 = fb.block(BlockKind::Plain);
    let b4 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    fb.edge(b1, b3);
    fb.edge(b2, b4);
    fb.edge(b3, b4);
    let c = fb.const_bool(b1, true);
    fb.set_control(b1, c);
    (fb.finish(), [b1, b2, b3, b4])
}

#[test]
fn test_diamond_idoms() {
    let (f, [b1, b2, b3, b4]) = diamond();
    let dom = DomTree::compute(&f);

    assert_eq!(dom.idom(b1), None);
    assert_eq!(dom.idom(b2), Some(b1));
    assert_eq!(dom.idom(b3), Some(b1));
    assert_eq!(dom.idom(b4), Some(b1));
}

#[test]
fn test_diamond_queries() {
    let (f, [b1, b2, b3, b4]) = diamond();
    let dom = DomTree::compute(&f);

    assert!(dom.dominates(b1, b2));
    assert!(dom.dominates(b1, b4));
    assert!(!dom.dominates(b2, b4));
    assert!(!dom.dominates(b3, b4));
    assert!(!dom.dominates(b2, b3));

    // Strict dominance excludes the block itself; the reflexive form allows
    // it.
    assert!(!dom.dominates(b2, b2));
    assert!(dom.dominates_or_eq(b2, b2));
}

#[test]
fn test_domorder_respects_dominance() {
    let (f, [b1, b2, b3, b4]) = diamond();
    let dom = DomTree::compute(&f);

    for b in [b2, b3, b4] {
        assert!(dom.domorder(b1) < dom.domorder(b), "entry orders first");
    }
}

#[test]
fn test_loop_header_dominates_body() {
    // b1 → b2 ⇄ b3, b2 → b4
    let mut fb = FuncBuilder::new("loop");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::If);
    let b3 = fb.block(BlockKind::Plain);
    let b4 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    fb.edge(b2, b3);
    fb.edge(b2, b4);
    fb.edge(b3, b2);
    let c = fb.const_bool(b1, true);
    fb.set_control(b2, c);
    let f = fb.finish();

    let dom = DomTree::compute(&f);
    assert_eq!(dom.idom(b2), Some(b1));
    assert_eq!(dom.idom(b3), Some(b2));
    assert_eq!(dom.idom(b4), Some(b2));
    assert!(dom.dominates(b2, b3));
    // The back edge does not make the body dominate the header.
    assert!(!dom.dominates(b3, b2));
}

#[test]
fn test_unreachable_block_dominates_nothing() {
    let mut fb = FuncBuilder::new("unreachable");
    let b1 = fb.block(BlockKind::Ret);
    let dead = fb.block(BlockKind::Ret);
    let f = fb.finish();

    let dom = DomTree::compute(&f);
    assert_eq!(dom.idom(dead), None);
    assert!(!dom.dominates_or_eq(dead, dead));
    assert!(!dom.dominates_or_eq(dead, b1));
    assert!(!dom.dominates_or_eq(b1, dead));
}
