use super::trim;
use crate::ir::{BlockKind, FuncBuilder, Op, Type};
use crate::verify::verify_func;

#[test]
fn test_removes_empty_plain_block() {
    // b1 → b2(empty) → b3
    let mut fb = FuncBuilder::new("empty_block");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::Plain);
    let b3 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    fb.edge(b2, b3);
    let r = fb.const64(b1, 1);
    fb.set_control(b3, r);
    let mut f = fb.finish();

    trim(&mut f);

    assert!(!f.block_ids().contains(&b2));
    assert_eq!(f.block(b1).succs[0].block, b3);
    assert_eq!(f.block(b3).preds[0].block, b1);
    verify_func(&f).unwrap();
}

#[test]
fn test_removes_chain_of_empty_blocks() {
    let mut fb = FuncBuilder::new("empty_chain");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::Plain);
    let b3 = fb.block(BlockKind::Plain);
    let b4 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    fb.edge(b2, b3);
    fb.edge(b3, b4);
    let r = fb.const64(b1, 1);
    fb.set_control(b4, r);
    let mut f = fb.finish();

    trim(&mut f);

    assert_eq!(f.block_ids(), &[b1, b4]);
    assert_eq!(f.block(b1).succs[0].block, b4);
    verify_func(&f).unwrap();
}

#[test]
fn test_keeps_blocks_with_code() {
    let mut fb = FuncBuilder::new("has_code");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::Plain);
    let b3 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    fb.edge(b2, b3);
    let r = fb.const64(b2, 1);
    fb.set_control(b3, r);
    let mut f = fb.finish();

    trim(&mut f);

    assert!(f.block_ids().contains(&b2));
    verify_func(&f).unwrap();
}

#[test]
fn test_keeps_entry_and_branches() {
    // Neither the entry nor an If block is a candidate, even when empty.
    let mut fb = FuncBuilder::new("branches");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::If);
    let b3 = fb.block(BlockKind::Plain);
    let b4 = fb.block(BlockKind::Plain);
    let b5 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    fb.edge(b2, b3);
    fb.edge(b2, b4);
    fb.edge(b3, b5);
    fb.edge(b4, b5);
    let c = fb.const_bool(b1, true);
    fb.set_control(b2, c);
    let x = fb.const64(b3, 1);
    let y = fb.const64(b4, 2);
    let r = fb.phi(b5, Type::int64(), &[x, y]);
    fb.set_control(b5, r);
    let mut f = fb.finish();

    trim(&mut f);

    assert!(f.block_ids().contains(&b2));
    verify_func(&f).unwrap();
}

#[test]
fn test_phi_merge_on_remove() {
    // The merge scenario from a binary-search-tree lookup: b4 holds only
    // v68 = φ(v42, v36) and jumps to b2, whose φ must absorb b4's operands.
    //
    //   b1 → b2, b1 → b21
    //   b21 → b4, b21 → b19
    //   b19 → b4
    //   b4 → b2
    let mut fb = FuncBuilder::new("bst_lookup");
    let b1 = fb.block(BlockKind::If);
    let b2 = fb.block(BlockKind::Ret);
    let b21 = fb.block(BlockKind::If);
    let b19 = fb.block(BlockKind::Plain);
    let b4 = fb.block(BlockKind::Plain);
    fb.edge(b1, b2);
    fb.edge(b1, b21);
    fb.edge(b21, b4);
    fb.edge(b21, b19);
    fb.edge(b19, b4);
    fb.edge(b4, b2);

    let c1 = fb.const_bool(b1, true);
    fb.set_control(b1, c1);
    let c2 = fb.value(b21, Op::Arg, Type::Bool, &[]);
    fb.set_control(b21, c2);

    let v34 = fb.const64(b1, 34);
    let v42 = fb.const64(b21, 42);
    let v36 = fb.const64(b19, 36);
    let v68 = fb.phi(b4, Type::int64(), &[v42, v36]);
    let v8 = fb.phi(b2, Type::int64(), &[v34, v68]);
    fb.set_control(b2, v8);
    let mut f = fb.finish();

    trim(&mut f);

    // b4 is gone; the jump formerly at b21 → b4 goes directly to b2.
    assert!(!f.block_ids().contains(&b4));
    assert_eq!(f.block(b21).succs[0].block, b2);

    // b2's predecessor list grew from [b1, b4] to [b1, b21, b19], and its φ
    // was merged accordingly.
    let preds: Vec<_> = f.block(b2).preds.iter().map(|e| e.block).collect();
    assert_eq!(preds, vec![b1, b21, b19]);
    assert_eq!(f.value(v8).args, vec![v34, v42, v36]);

    // b4's φ moved into b2 ahead of v8.
    assert_eq!(f.value(v68).block, b2);
    assert_eq!(f.block(b2).values, vec![v68, v8]);
}

#[test]
fn test_skips_self_loop() {
    let mut fb = FuncBuilder::new("self_loop");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::Plain);
    fb.edge(b1, b2);
    fb.edge(b2, b2);
    let mut f = fb.finish();

    trim(&mut f);

    assert!(f.block_ids().contains(&b2));
}
