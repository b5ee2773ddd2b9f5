//! Constant fold functions, indexed by opcode.
//!
//! Two shapes: `Simple` folds require every argument to be a known constant;
//! `General` folds see the full lattice values and may produce a constant
//! even when an argument is unknown (boolean short-circuit) or refuse to
//! fold (division by a constant zero, which must trap at runtime).

use crate::ir::Op;

use super::sccp::Lattice;

#[derive(Clone, Copy)]
pub enum FoldFn {
    Simple(fn(&[i64]) -> i64),
    General(fn(&[Lattice]) -> Lattice),
}

fn i32f(x: i64) -> f32 {
    f32::from_bits(x as u32)
}

fn i64f(x: i64) -> f64 {
    f64::from_bits(x as u64)
}

fn f32i(x: f32) -> i64 {
    x.to_bits() as i64
}

fn f64i(x: f64) -> i64 {
    x.to_bits() as u64 as i64
}

fn b2i(b: bool) -> i64 {
    b as i64
}

fn fold_add8(a: &[i64]) -> i64 {
    a[0].wrapping_add(a[1]) as i8 as i64
}

fn fold_add16(a: &[i64]) -> i64 {
    a[0].wrapping_add(a[1]) as i16 as i64
}

fn fold_add32(a: &[i64]) -> i64 {
    a[0].wrapping_add(a[1]) as i32 as i64
}

fn fold_add64(a: &[i64]) -> i64 {
    a[0].wrapping_add(a[1])
}

fn fold_add32f(a: &[i64]) -> i64 {
    f32i(i32f(a[0]) + i32f(a[1]))
}

fn fold_add64f(a: &[i64]) -> i64 {
    f64i(i64f(a[0]) + i64f(a[1]))
}

fn fold_sub8(a: &[i64]) -> i64 {
    a[0].wrapping_sub(a[1]) as i8 as i64
}

fn fold_sub16(a: &[i64]) -> i64 {
    a[0].wrapping_sub(a[1]) as i16 as i64
}

fn fold_sub32(a: &[i64]) -> i64 {
    a[0].wrapping_sub(a[1]) as i32 as i64
}

fn fold_sub64(a: &[i64]) -> i64 {
    a[0].wrapping_sub(a[1])
}

fn fold_sub32f(a: &[i64]) -> i64 {
    f32i(i32f(a[0]) - i32f(a[1]))
}

fn fold_sub64f(a: &[i64]) -> i64 {
    f64i(i64f(a[0]) - i64f(a[1]))
}

fn fold_mul8(a: &[i64]) -> i64 {
    a[0].wrapping_mul(a[1]) as i8 as i64
}

fn fold_mul16(a: &[i64]) -> i64 {
    a[0].wrapping_mul(a[1]) as i16 as i64
}

fn fold_mul32(a: &[i64]) -> i64 {
    a[0].wrapping_mul(a[1]) as i32 as i64
}

fn fold_mul64(a: &[i64]) -> i64 {
    a[0].wrapping_mul(a[1])
}

fn fold_mul32f(a: &[i64]) -> i64 {
    f32i(i32f(a[0]) * i32f(a[1]))
}

fn fold_mul64f(a: &[i64]) -> i64 {
    f64i(i64f(a[0]) * i64f(a[1]))
}

fn fold_div32f(a: &[i64]) -> i64 {
    f32i(i32f(a[0]) / i32f(a[1]))
}

fn fold_div64f(a: &[i64]) -> i64 {
    f64i(i64f(a[0]) / i64f(a[1]))
}

/// Builds a general fold for signed/unsigned division and modulo at a given
/// width. A constant zero divisor makes the result non-constant: the runtime
/// trap must be preserved, so the operation is left in place.
macro_rules! fold_divmod {
    ($name:ident, $w:ty, $f:ident) => {
        fn $name(a: &[Lattice]) -> Lattice {
            if a[0].is_bottom() || a[1].is_bottom() {
                return Lattice::Bottom;
            }
            if a[0].is_top() || a[1].is_top() {
                return Lattice::Top;
            }
            let (x, y) = (a[0].bits() as $w, a[1].bits() as $w);
            if y == 0 {
                return Lattice::Bottom;
            }
            Lattice::Const(x.$f(y) as i64)
        }
    };
    ($name:ident, $w:ty as $s:ty, $f:ident) => {
        fn $name(a: &[Lattice]) -> Lattice {
            if a[0].is_bottom() || a[1].is_bottom() {
                return Lattice::Bottom;
            }
            if a[0].is_top() || a[1].is_top() {
                return Lattice::Top;
            }
            let (x, y) = (a[0].bits() as $w, a[1].bits() as $w);
            if y == 0 {
                return Lattice::Bottom;
            }
            Lattice::Const(x.$f(y) as $s as i64)
        }
    };
}

fold_divmod!(fold_div8, i8, wrapping_div);
fold_divmod!(fold_div16, i16, wrapping_div);
fold_divmod!(fold_div32, i32, wrapping_div);
fold_divmod!(fold_div64, i64, wrapping_div);
fold_divmod!(fold_div8u, u8 as i8, wrapping_div);
fold_divmod!(fold_div16u, u16 as i16, wrapping_div);
fold_divmod!(fold_div32u, u32 as i32, wrapping_div);
fold_divmod!(fold_div64u, u64, wrapping_div);
fold_divmod!(fold_mod8, i8, wrapping_rem);
fold_divmod!(fold_mod16, i16, wrapping_rem);
fold_divmod!(fold_mod32, i32, wrapping_rem);
fold_divmod!(fold_mod64, i64, wrapping_rem);
fold_divmod!(fold_mod8u, u8 as i8, wrapping_rem);
fold_divmod!(fold_mod16u, u16 as i16, wrapping_rem);
fold_divmod!(fold_mod32u, u32 as i32, wrapping_rem);
fold_divmod!(fold_mod64u, u64, wrapping_rem);

fn fold_and8(a: &[i64]) -> i64 {
    (a[0] & a[1]) as i8 as i64
}

fn fold_and16(a: &[i64]) -> i64 {
    (a[0] & a[1]) as i16 as i64
}

fn fold_and32(a: &[i64]) -> i64 {
    (a[0] & a[1]) as i32 as i64
}

fn fold_and64(a: &[i64]) -> i64 {
    a[0] & a[1]
}

fn fold_or8(a: &[i64]) -> i64 {
    (a[0] | a[1]) as i8 as i64
}

fn fold_or16(a: &[i64]) -> i64 {
    (a[0] | a[1]) as i16 as i64
}

fn fold_or32(a: &[i64]) -> i64 {
    (a[0] | a[1]) as i32 as i64
}

fn fold_or64(a: &[i64]) -> i64 {
    a[0] | a[1]
}

fn fold_xor8(a: &[i64]) -> i64 {
    (a[0] ^ a[1]) as i8 as i64
}

fn fold_xor16(a: &[i64]) -> i64 {
    (a[0] ^ a[1]) as i16 as i64
}

fn fold_xor32(a: &[i64]) -> i64 {
    (a[0] ^ a[1]) as i32 as i64
}

fn fold_xor64(a: &[i64]) -> i64 {
    a[0] ^ a[1]
}

fn fold_eq(a: &[i64]) -> i64 {
    b2i(a[0] == a[1])
}

fn fold_neq(a: &[i64]) -> i64 {
    b2i(a[0] != a[1])
}

fn fold_less(a: &[i64]) -> i64 {
    b2i(a[0] < a[1])
}

fn fold_less_u(a: &[i64]) -> i64 {
    b2i((a[0] as u64) < a[1] as u64)
}

fn fold_less32f(a: &[i64]) -> i64 {
    b2i(i32f(a[0]) < i32f(a[1]))
}

fn fold_less64f(a: &[i64]) -> i64 {
    b2i(i64f(a[0]) < i64f(a[1]))
}

fn fold_leq(a: &[i64]) -> i64 {
    b2i(a[0] <= a[1])
}

fn fold_leq_u(a: &[i64]) -> i64 {
    b2i(a[0] as u64 <= a[1] as u64)
}

fn fold_leq32f(a: &[i64]) -> i64 {
    b2i(i32f(a[0]) <= i32f(a[1]))
}

fn fold_leq64f(a: &[i64]) -> i64 {
    b2i(i64f(a[0]) <= i64f(a[1]))
}

fn fold_greater(a: &[i64]) -> i64 {
    b2i(a[0] > a[1])
}

fn fold_greater_u(a: &[i64]) -> i64 {
    b2i(a[0] as u64 > a[1] as u64)
}

fn fold_greater32f(a: &[i64]) -> i64 {
    b2i(i32f(a[0]) > i32f(a[1]))
}

fn fold_greater64f(a: &[i64]) -> i64 {
    b2i(i64f(a[0]) > i64f(a[1]))
}

fn fold_geq(a: &[i64]) -> i64 {
    b2i(a[0] >= a[1])
}

fn fold_geq_u(a: &[i64]) -> i64 {
    b2i(a[0] as u64 >= a[1] as u64)
}

fn fold_geq32f(a: &[i64]) -> i64 {
    b2i(i32f(a[0]) >= i32f(a[1]))
}

fn fold_geq64f(a: &[i64]) -> i64 {
    b2i(i64f(a[0]) >= i64f(a[1]))
}

/// false && <any> == false, <any> && false == false.
fn fold_and_b(a: &[Lattice]) -> Lattice {
    if a[0] == Lattice::Const(0) || a[1] == Lattice::Const(0) {
        return Lattice::Const(0);
    }
    if a[0].is_bottom() || a[1].is_bottom() {
        return Lattice::Bottom;
    }
    if a[0].is_top() || a[1].is_top() {
        return Lattice::Top;
    }
    Lattice::Const(b2i(a[0].bits() != 0 && a[1].bits() != 0))
}

/// true || <any> == true, <any> || true == true.
fn fold_or_b(a: &[Lattice]) -> Lattice {
    if a[0] == Lattice::Const(1) || a[1] == Lattice::Const(1) {
        return Lattice::Const(1);
    }
    if a[0].is_bottom() || a[1].is_bottom() {
        return Lattice::Bottom;
    }
    if a[0].is_top() || a[1].is_top() {
        return Lattice::Top;
    }
    Lattice::Const(b2i(a[0].bits() != 0 || a[1].bits() != 0))
}

fn fold_not(a: &[i64]) -> i64 {
    b2i(a[0] == 0)
}

fn fold_neg(a: &[i64]) -> i64 {
    a[0].wrapping_neg()
}

fn fold_neg32f(a: &[i64]) -> i64 {
    f32i(-i32f(a[0]))
}

fn fold_neg64f(a: &[i64]) -> i64 {
    f64i(-i64f(a[0]))
}

fn fold_com(a: &[i64]) -> i64 {
    !a[0]
}

fn fold_copy(a: &[i64]) -> i64 {
    a[0]
}

fn fold_sign_ext8(a: &[i64]) -> i64 {
    a[0] as i8 as i64
}

fn fold_sign_ext16(a: &[i64]) -> i64 {
    a[0] as i16 as i64
}

fn fold_sign_ext32(a: &[i64]) -> i64 {
    a[0] as i32 as i64
}

fn fold_zero_ext8(a: &[i64]) -> i64 {
    a[0] as u8 as i64
}

fn fold_zero_ext16(a: &[i64]) -> i64 {
    a[0] as u16 as i64
}

fn fold_zero_ext32(a: &[i64]) -> i64 {
    a[0] as u32 as i64
}

fn fold_trunc_to8(a: &[i64]) -> i64 {
    a[0] as i8 as i64
}

fn fold_trunc_to16(a: &[i64]) -> i64 {
    a[0] as i16 as i64
}

fn fold_trunc_to32(a: &[i64]) -> i64 {
    a[0] as i32 as i64
}

fn fold_cvt32to32f(a: &[i64]) -> i64 {
    f32i(a[0] as i32 as f32)
}

fn fold_cvt32to64f(a: &[i64]) -> i64 {
    f64i(a[0] as i32 as f64)
}

fn fold_cvt64to32f(a: &[i64]) -> i64 {
    f32i(a[0] as f32)
}

fn fold_cvt64to64f(a: &[i64]) -> i64 {
    f64i(a[0] as f64)
}

fn fold_cvt32fto32(a: &[i64]) -> i64 {
    i32f(a[0]) as i32 as i64
}

fn fold_cvt32fto64(a: &[i64]) -> i64 {
    i32f(a[0]) as i64
}

fn fold_cvt64fto32(a: &[i64]) -> i64 {
    i64f(a[0]) as i32 as i64
}

fn fold_cvt64fto64(a: &[i64]) -> i64 {
    i64f(a[0]) as i64
}

fn fold_cvt32fto64f(a: &[i64]) -> i64 {
    f64i(i32f(a[0]) as f64)
}

fn fold_cvt64fto32f(a: &[i64]) -> i64 {
    f32i(i64f(a[0]) as f32)
}

fn fold_cvt32uto32f(a: &[i64]) -> i64 {
    f32i(a[0] as u32 as f32)
}

fn fold_cvt32uto64f(a: &[i64]) -> i64 {
    f64i(a[0] as u32 as f64)
}

fn fold_cvt32fto32u(a: &[i64]) -> i64 {
    i32f(a[0]) as u32 as i32 as i64
}

fn fold_cvt64fto32u(a: &[i64]) -> i64 {
    i64f(a[0]) as u32 as i32 as i64
}

fn fold_cvt64uto32f(a: &[i64]) -> i64 {
    f32i(a[0] as u64 as f32)
}

fn fold_cvt64uto64f(a: &[i64]) -> i64 {
    f64i(a[0] as u64 as f64)
}

fn fold_cvt32fto64u(a: &[i64]) -> i64 {
    i32f(a[0]) as u64 as i64
}

fn fold_cvt64fto64u(a: &[i64]) -> i64 {
    i64f(a[0]) as u64 as i64
}

/// Fold function for an opcode, or `None` if the op never folds (memory,
/// calls, markers), in which case its lattice value is Bottom.
pub fn fold_fn(op: Op) -> Option<FoldFn> {
    use FoldFn::{General, Simple};
    Some(match op {
        Op::Add8 => Simple(fold_add8),
        Op::Add16 => Simple(fold_add16),
        Op::Add32 => Simple(fold_add32),
        Op::Add64 => Simple(fold_add64),
        Op::Add32F => Simple(fold_add32f),
        Op::Add64F => Simple(fold_add64f),

        Op::Sub8 => Simple(fold_sub8),
        Op::Sub16 => Simple(fold_sub16),
        Op::Sub32 => Simple(fold_sub32),
        Op::Sub64 => Simple(fold_sub64),
        Op::Sub32F => Simple(fold_sub32f),
        Op::Sub64F => Simple(fold_sub64f),

        Op::Mul8 => Simple(fold_mul8),
        Op::Mul16 => Simple(fold_mul16),
        Op::Mul32 => Simple(fold_mul32),
        Op::Mul64 => Simple(fold_mul64),
        Op::Mul32F => Simple(fold_mul32f),
        Op::Mul64F => Simple(fold_mul64f),
        Op::Div32F => Simple(fold_div32f),
        Op::Div64F => Simple(fold_div64f),

        Op::Div8 => General(fold_div8),
        Op::Div16 => General(fold_div16),
        Op::Div32 => General(fold_div32),
        Op::Div64 => General(fold_div64),
        Op::Div8u => General(fold_div8u),
        Op::Div16u => General(fold_div16u),
        Op::Div32u => General(fold_div32u),
        Op::Div64u => General(fold_div64u),
        Op::Mod8 => General(fold_mod8),
        Op::Mod16 => General(fold_mod16),
        Op::Mod32 => General(fold_mod32),
        Op::Mod64 => General(fold_mod64),
        Op::Mod8u => General(fold_mod8u),
        Op::Mod16u => General(fold_mod16u),
        Op::Mod32u => General(fold_mod32u),
        Op::Mod64u => General(fold_mod64u),

        Op::And8 => Simple(fold_and8),
        Op::And16 => Simple(fold_and16),
        Op::And32 => Simple(fold_and32),
        Op::And64 => Simple(fold_and64),
        Op::Or8 => Simple(fold_or8),
        Op::Or16 => Simple(fold_or16),
        Op::Or32 => Simple(fold_or32),
        Op::Or64 => Simple(fold_or64),
        Op::Xor8 => Simple(fold_xor8),
        Op::Xor16 => Simple(fold_xor16),
        Op::Xor32 => Simple(fold_xor32),
        Op::Xor64 => Simple(fold_xor64),

        Op::Eq8 | Op::Eq16 | Op::Eq32 | Op::Eq64 | Op::Eq32F | Op::Eq64F | Op::EqB => {
            Simple(fold_eq)
        }
        Op::Neq8 | Op::Neq16 | Op::Neq32 | Op::Neq64 | Op::Neq32F | Op::Neq64F | Op::NeqB => {
            Simple(fold_neq)
        }
        Op::Less8 | Op::Less16 | Op::Less32 | Op::Less64 => Simple(fold_less),
        Op::Less8U | Op::Less16U | Op::Less32U | Op::Less64U => Simple(fold_less_u),
        Op::Less32F => Simple(fold_less32f),
        Op::Less64F => Simple(fold_less64f),
        Op::Leq8 | Op::Leq16 | Op::Leq32 | Op::Leq64 => Simple(fold_leq),
        Op::Leq8U | Op::Leq16U | Op::Leq32U | Op::Leq64U => Simple(fold_leq_u),
        Op::Leq32F => Simple(fold_leq32f),
        Op::Leq64F => Simple(fold_leq64f),
        Op::Greater8 | Op::Greater16 | Op::Greater32 | Op::Greater64 => Simple(fold_greater),
        Op::Greater8U | Op::Greater16U | Op::Greater32U | Op::Greater64U => {
            Simple(fold_greater_u)
        }
        Op::Greater32F => Simple(fold_greater32f),
        Op::Greater64F => Simple(fold_greater64f),
        Op::Geq8 | Op::Geq16 | Op::Geq32 | Op::Geq64 => Simple(fold_geq),
        Op::Geq8U | Op::Geq16U | Op::Geq32U | Op::Geq64U => Simple(fold_geq_u),
        Op::Geq32F => Simple(fold_geq32f),
        Op::Geq64F => Simple(fold_geq64f),

        Op::AndB => General(fold_and_b),
        Op::OrB => General(fold_or_b),
        Op::Not => Simple(fold_not),

        Op::Neg8 | Op::Neg16 | Op::Neg32 | Op::Neg64 => Simple(fold_neg),
        Op::Neg32F => Simple(fold_neg32f),
        Op::Neg64F => Simple(fold_neg64f),
        Op::Com8 | Op::Com16 | Op::Com32 | Op::Com64 => Simple(fold_com),

        Op::Copy => Simple(fold_copy),

        Op::SignExt8to16 | Op::SignExt8to32 | Op::SignExt8to64 => Simple(fold_sign_ext8),
        Op::SignExt16to32 | Op::SignExt16to64 => Simple(fold_sign_ext16),
        Op::SignExt32to64 => Simple(fold_sign_ext32),
        Op::ZeroExt8to16 | Op::ZeroExt8to32 | Op::ZeroExt8to64 => Simple(fold_zero_ext8),
        Op::ZeroExt16to32 | Op::ZeroExt16to64 => Simple(fold_zero_ext16),
        Op::ZeroExt32to64 => Simple(fold_zero_ext32),

        Op::Trunc16to8 | Op::Trunc32to8 | Op::Trunc64to8 => Simple(fold_trunc_to8),
        Op::Trunc32to16 | Op::Trunc64to16 => Simple(fold_trunc_to16),
        Op::Trunc64to32 => Simple(fold_trunc_to32),

        Op::Cvt32to32F => Simple(fold_cvt32to32f),
        Op::Cvt32to64F => Simple(fold_cvt32to64f),
        Op::Cvt64to32F => Simple(fold_cvt64to32f),
        Op::Cvt64to64F => Simple(fold_cvt64to64f),
        Op::Cvt32Fto32 => Simple(fold_cvt32fto32),
        Op::Cvt32Fto64 => Simple(fold_cvt32fto64),
        Op::Cvt64Fto32 => Simple(fold_cvt64fto32),
        Op::Cvt64Fto64 => Simple(fold_cvt64fto64),
        Op::Cvt32Fto64F => Simple(fold_cvt32fto64f),
        Op::Cvt64Fto32F => Simple(fold_cvt64fto32f),
        Op::Cvt32Uto32F => Simple(fold_cvt32uto32f),
        Op::Cvt32Uto64F => Simple(fold_cvt32uto64f),
        Op::Cvt32Fto32U => Simple(fold_cvt32fto32u),
        Op::Cvt64Fto32U => Simple(fold_cvt64fto32u),
        Op::Cvt64Uto32F => Simple(fold_cvt64uto32f),
        Op::Cvt64Uto64F => Simple(fold_cvt64uto64f),
        Op::Cvt32Fto64U => Simple(fold_cvt32fto64u),
        Op::Cvt64Fto64U => Simple(fold_cvt64fto64u),

        _ => return None,
    })
}
