use indoc::indoc;

use super::format_func;
use crate::ir::{BlockKind, FuncBuilder, Op, Type};

#[test]
fn test_format_function() {
    let mut fb = FuncBuilder::new("fmt");
    let b1 = fb.block(BlockKind::Plain);
    let b2 = fb.block(BlockKind::Ret);
    fb.edge(b1, b2);
    let x = fb.const64(b1, 7);
    let y = fb.value(b1, Op::Neg64, Type::int64(), &[x]);
    fb.set_control(b2, y);
    let f = fb.finish();

    let expected = indoc! {"
        fmt
          b1: Plain -> b2
            v1 = Const64 <i64> [7]
            v2 = Neg64 <i64> v1
          b2: Ret v2
    "};
    assert_eq!(format_func(&f), expected);
}

#[test]
fn test_long_string_payloads() {
    let mut fb = FuncBuilder::new("payloads");
    let b1 = fb.block(BlockKind::Ret);
    let mem = fb.value(b1, Op::InitMem, Type::Memory, &[]);
    let p = fb.value_i(b1, Op::Arg, Type::int64(), 16, &[]);
    let load = fb.value_sym(b1, Op::Load, Type::int64(), "g", &[p, mem]);
    let f = fb.finish();

    assert_eq!(f.value(mem).long_string(), "v1 = InitMem <mem>");
    assert_eq!(f.value(p).long_string(), "v2 = Arg <i64> [16]");
    assert_eq!(f.value(load).long_string(), "v3 = Load <i64> v2 v1 {g}");
}
