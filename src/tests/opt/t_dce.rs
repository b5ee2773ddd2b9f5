use super::dce;
use crate::ir::{BlockKind, FuncBuilder, Op, Type};
use crate::verify::verify_func;

#[test]
fn test_removes_unused_values() {
    let mut fb = FuncBuilder::new("unused");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    let a = fb.const64(b1, 1);
    let dead = fb.value(b1, Op::Mul64, Type::int64(), &[a, a]);
    fb.set_control(b2, a);
    let mut f = fb.finish();

    dce(&mut f);

    assert!(!f.block(b1).values.contains(&dead));
    assert_eq!(f.value(dead).op, Op::Invalid);
    assert!(f.block(b1).values.contains(&a));
    verify_func(&f).unwrap();
}

#[test]
fn test_keeps_transitive_uses_of_control() {
    let mut fb = FuncBuilder::new("transitive");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    let a = fb.const64(b1, 2);
    let b = fb.const64(b1, 3);
    let add = fb.value(b1, Op::Add64, Type::int64(), &[a, b]);
    fb.set_control(b2, add);
    let mut f = fb.finish();

    dce(&mut f);

    for v in [a, b, add] {
        assert!(f.block(b1).values.contains(&v));
    }
    verify_func(&f).unwrap();
}

#[test]
fn test_keeps_side_effects() {
    let mut fb = FuncBuilder::new("effects");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    let mem = fb.value(b1, Op::InitMem, Type::Memory, &[]);
    let p = fb.value_i(b1, Op::Arg, Type::int64(), 0, &[]);
    let x = fb.const64(b1, 1);
    let st = fb.value(b1, Op::Store, Type::Memory, &[p, x, mem]);
    let r = fb.const64(b1, 0);
    fb.set_control(b2, r);
    let mut f = fb.finish();

    dce(&mut f);

    // The store has no users but must stay, and it keeps its operands
    // (including the memory chain) alive.
    for v in [mem, p, x, st] {
        assert!(f.block(b1).values.contains(&v));
    }
    verify_func(&f).unwrap();
}

#[test]
fn test_removes_unreachable_blocks() {
    // b3 jumps into b2 but nothing reaches b3; the φ in b2 loses that slot.
    let mut fb = FuncBuilder::new("unreachable");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::Ret);
    let b3 = fb.block(BlockKind::Plain);
    fb.edge(b1, b2);
    fb.edge(b3, b2);
    let x1 = fb.const64(b1, 1);
    let x3 = fb.const64(b3, 3);
    let phi = fb.phi(b2, Type::int64(), &[x1, x3]);
    fb.set_control(b2, phi);
    let mut f = fb.finish();

    dce(&mut f);

    assert!(!f.block_ids().contains(&b3));
    assert_eq!(f.block(b2).preds.len(), 1);
    assert_eq!(f.block(b2).preds[0].block, b1);
    assert_eq!(f.value(phi).args, vec![x1]);
    assert_eq!(f.value(x3).op, Op::Invalid);
    verify_func(&f).unwrap();
}

#[test]
fn test_removes_dead_chains() {
    let mut fb = FuncBuilder::new("chain");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    let a = fb.const64(b1, 1);
    let dead1 = fb.value(b1, Op::Add64, Type::int64(), &[a, a]);
    let dead2 = fb.value(b1, Op::Mul64, Type::int64(), &[dead1, a]);
    fb.set_control(b2, a);
    let mut f = fb.finish();

    dce(&mut f);

    // dead2 uses dead1; both go. The shared operand stays (control use).
    assert!(!f.block(b1).values.contains(&dead1));
    assert!(!f.block(b1).values.contains(&dead2));
    assert!(f.block(b1).values.contains(&a));
    verify_func(&f).unwrap();
}
