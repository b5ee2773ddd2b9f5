use super::optimize;
use crate::ir::{BlockKind, FuncBuilder, Op, Type};
use crate::verify::verify_func;

#[test]
fn test_full_pipeline() {
    // A function exercising every pass: a foldable constant expression, the
    // same multiplication in both arms of a diamond, and an empty block on
    // one arm.
    //
    //   b1 → b2 → bp → b4
    //   b1 → b3 ──────→ b4
    let mut fb = FuncBuilder::new("pipeline");
    let b1 = fb.block(BlockKind::If);
    let b2 = fb.block(BlockKind::Plain);
    let bp = fb.block(BlockKind::Plain);
    let b3 = fb.block(BlockKind::Plain);
    let b4 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    fb.edge(b1, b3);
    fb.edge(b2, bp);
    fb.edge(bp, b4);
    fb.edge(b3, b4);

    let a = fb.value_i(b1, Op::Arg, Type::int64(), 0, &[]);
    let b = fb.value_i(b1, Op::Arg, Type::int64(), 8, &[]);
    let c10 = fb.const64(b1, 10);
    let c20 = fb.const64(b1, 20);
    let s = fb.value(b1, Op::Add64, Type::int64(), &[c10, c20]);
    let lt = fb.value(b1, Op::Less64, Type::Bool, &[a, b]);
    fb.set_control(b1, lt);

    let d1 = fb.value(b2, Op::Mul64, Type::int64(), &[a, b]);
    let d2 = fb.value(b3, Op::Mul64, Type::int64(), &[a, b]);
    let merge = fb.phi(b4, Type::int64(), &[d1, d2]);
    let r = fb.value(b4, Op::Add64, Type::int64(), &[merge, s]);
    fb.set_control(b4, r);
    let mut f = fb.finish();
    f.pass.stats = 1;

    optimize(&mut f);

    // SCCP folded the constant sum.
    assert_eq!(f.value(s).op, Op::Const64);
    assert_eq!(f.value(s).aux_int, 30);

    // CSE hoisted the multiplication to the diamond entry.
    let muls_in_entry = f
        .block(b1)
        .values
        .iter()
        .filter(|&&v| f.value(v).op == Op::Mul64)
        .count();
    assert_eq!(muls_in_entry, 1);
    assert!(f.stats().contains(&("CSE HOISTED", 2)));

    // Trim removed the empty pad block.
    assert!(!f.block_ids().contains(&bp));
    let preds: Vec<_> = f.block(b4).preds.iter().map(|e| e.block).collect();
    assert_eq!(preds, vec![b2, b3]);

    verify_func(&f).unwrap();
}

#[test]
fn test_pipeline_preserves_simple_function() {
    let mut fb = FuncBuilder::new("simple");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    let a = fb.value_i(b1, Op::Arg, Type::int64(), 0, &[]);
    let neg = fb.value(b1, Op::Neg64, Type::int64(), &[a]);
    fb.set_control(b2, neg);
    let mut f = fb.finish();

    optimize(&mut f);

    assert_eq!(f.value(neg).op, Op::Neg64);
    assert_eq!(f.value(neg).args, vec![a]);
    verify_func(&f).unwrap();
}
