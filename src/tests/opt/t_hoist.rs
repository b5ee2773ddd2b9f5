use crate::ir::{BlockKind, Func, FuncBuilder, Op, Type, ValueId};
use crate::opt::cse::cse;
use crate::verify::verify_func;

fn count_op(f: &Func, b: crate::ir::BlockId, op: Op) -> usize {
    f.block(b)
        .values
        .iter()
        .filter(|&&v| f.value(v).op == op)
        .count()
}

fn find_op(f: &Func, b: crate::ir::BlockId, op: Op) -> Option<ValueId> {
    f.block(b).values.iter().copied().find(|&v| f.value(v).op == op)
}

#[test]
fn test_diamond_hoists_to_common_predecessor() {
    // Both arms compute a + b; neither dominates the other, so CSE cannot
    // merge them, but the expression is anticipated at the diamond entry.
    let mut fb = FuncBuilder::new("diamond");
    let b1 = fb.block(BlockKind::If);
    let b2 = fb.block(BlockKind::Plain);
    let b3 = fb.block(BlockKind::Plain);
    let b4 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    fb.edge(b1, b3);
    fb.edge(b2, b4);
    fb.edge(b3, b4);
    let c = fb.value_i(b1, Op::Arg, Type::Bool, 0, &[]);
    fb.set_control(b1, c);
    let a = fb.value_i(b1, Op::Arg, Type::int64(), 8, &[]);
    let b = fb.value_i(b1, Op::Arg, Type::int64(), 16, &[]);
    let add_l = fb.value(b2, Op::Add64, Type::int64(), &[a, b]);
    let add_r = fb.value(b3, Op::Add64, Type::int64(), &[a, b]);
    let merge = fb.phi(b4, Type::int64(), &[add_l, add_r]);
    fb.set_control(b4, merge);
    let mut fc = fb.finish();
    fc.pass.stats = 1;

    cse(&mut fc);

    assert!(fc.stats().contains(&("CSE HOISTED", 2)));
    // The addition now happens once, at the diamond entry.
    assert_eq!(count_op(&fc, b1, Op::Add64), 1);
    assert_eq!(count_op(&fc, b2, Op::Add64), 0);
    assert_eq!(count_op(&fc, b3, Op::Add64), 0);
    // φ-elimination collapsed the merge onto the hoisted value.
    let hoisted = find_op(&fc, b1, Op::Add64).unwrap();
    assert_eq!(fc.value(hoisted).args, vec![a, b]);
    verify_func(&fc).unwrap();
}

#[test]
fn test_no_hoist_without_anticipation() {
    // The two copies sit on paths that never both execute the expression,
    // so no block anticipates it and nothing moves.
    //
    //   b1 → b2 | b3; b2, b3 → b4; b4 → b5 | b6; b5, b6 → b7
    let mut fb = FuncBuilder::new("not_anticipated");
    let b1 = fb.block(BlockKind::If);
    let b2 = fb.block(BlockKind::Plain);
    let b3 = fb.block(BlockKind::Plain);
    let b4 = fb.block(BlockKind::If);
    let b5 = fb.block(BlockKind::Plain);
    let b6 = fb.block(BlockKind::Plain);
    let b7 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    fb.edge(b1, b3);
    fb.edge(b2, b4);
    fb.edge(b3, b4);
    fb.edge(b4, b5);
    fb.edge(b4, b6);
    fb.edge(b5, b7);
    fb.edge(b6, b7);
    let c = fb.value_i(b1, Op::Arg, Type::Bool, 0, &[]);
    fb.set_control(b1, c);
    fb.set_control(b4, c);
    let a = fb.value_i(b1, Op::Arg, Type::int64(), 8, &[]);
    let b = fb.value_i(b1, Op::Arg, Type::int64(), 16, &[]);
    let add1 = fb.value(b2, Op::Add64, Type::int64(), &[a, b]);
    let add2 = fb.value(b6, Op::Add64, Type::int64(), &[a, b]);
    let pass1 = fb.phi(b4, Type::int64(), &[add1, a]);
    let pass2 = fb.phi(b7, Type::int64(), &[pass1, add2]);
    fb.set_control(b7, pass2);
    let mut fc = fb.finish();
    fc.pass.stats = 1;

    cse(&mut fc);

    assert!(fc.stats().contains(&("CSE HOISTED", 0)));
    assert_eq!(fc.value(add1).op, Op::Add64);
    assert_eq!(fc.value(add1).block, b2);
    assert_eq!(fc.value(add2).block, b6);
    verify_func(&fc).unwrap();
}

#[test]
fn test_hoists_dependency_chains() {
    // (a + b) * 2 in both arms: the multiply's class can only hoist because
    // its operand class a + b hoists first.
    let mut fb = FuncBuilder::new("chain");
    let b1 = fb.block(BlockKind::If);
    let b2 = fb.block(BlockKind::Plain);
    let b3 = fb.block(BlockKind::Plain);
    let b4 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    fb.edge(b1, b3);
    fb.edge(b2, b4);
    fb.edge(b3, b4);
    let c = fb.value_i(b1, Op::Arg, Type::Bool, 0, &[]);
    fb.set_control(b1, c);
    let a = fb.value_i(b1, Op::Arg, Type::int64(), 8, &[]);
    let b = fb.value_i(b1, Op::Arg, Type::int64(), 16, &[]);
    let two = fb.const64(b1, 2);
    let add_l = fb.value(b2, Op::Add64, Type::int64(), &[a, b]);
    let mul_l = fb.value(b2, Op::Mul64, Type::int64(), &[add_l, two]);
    let add_r = fb.value(b3, Op::Add64, Type::int64(), &[a, b]);
    let mul_r = fb.value(b3, Op::Mul64, Type::int64(), &[add_r, two]);
    let merge = fb.phi(b4, Type::int64(), &[mul_l, mul_r]);
    fb.set_control(b4, merge);
    let mut fc = fb.finish();
    fc.pass.stats = 1;

    cse(&mut fc);

    assert!(fc.stats().contains(&("CSE HOISTED", 4)));
    assert_eq!(count_op(&fc, b1, Op::Add64), 1);
    assert_eq!(count_op(&fc, b1, Op::Mul64), 1);
    let hoisted_add = find_op(&fc, b1, Op::Add64).unwrap();
    let hoisted_mul = find_op(&fc, b1, Op::Mul64).unwrap();
    // The hoisted multiply consumes the hoisted addition.
    assert_eq!(fc.value(hoisted_mul).args, vec![hoisted_add, two]);
    verify_func(&fc).unwrap();
}

#[test]
fn test_control_values_not_hoisted() {
    // Both arms compute the same comparison and branch on it; control
    // values stay where they are.
    let mut fb = FuncBuilder::new("control");
    let b1 = fb.block(BlockKind::If);
    let b2 = fb.block(BlockKind::If);
    let b3 = fb.block(BlockKind::If);
    let b4 = fb.block(BlockKind::Ret);
    let b5 = fb.block(BlockKind::Ret);
    let b6 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    fb.edge(b1, b3);
    fb.edge(b2, b4);
    fb.edge(b2, b5);
    fb.edge(b3, b5);

    // b3's second successor.
    fb.edge(b3, b6);
    let c = fb.value_i(b1, Op::Arg, Type::Bool, 0, &[]);
    fb.set_control(b1, c);
    let a = fb.value_i(b1, Op::Arg, Type::int64(), 8, &[]);
    let b = fb.value_i(b1, Op::Arg, Type::int64(), 16, &[]);
    let lt_l = fb.value(b2, Op::Less64, Type::Bool, &[a, b]);
    fb.set_control(b2, lt_l);
    let lt_r = fb.value(b3, Op::Less64, Type::Bool, &[a, b]);
    fb.set_control(b3, lt_r);
    let r = fb.const64(b1, 0);
    fb.set_control(b4, r);
    fb.set_control(b5, r);
    fb.set_control(b6, r);
    let mut fc = fb.finish();
    fc.pass.stats = 1;

    cse(&mut fc);

    assert!(fc.stats().contains(&("CSE HOISTED", 0)));
    assert_eq!(fc.value(lt_l).block, b2);
    assert_eq!(fc.value(lt_r).block, b3);
    verify_func(&fc).unwrap();
}
