//! SSA operation codes and their static properties.

/// Operation performed by a [`Value`](super::Value).
///
/// Width and signedness are part of the opcode, not the type: `Div8u` divides
/// the low 8 bits of its operands as unsigned integers regardless of how the
/// result type spells itself. The derived `Ord` provides the deterministic
/// opcode ordering the CSE partitioning sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Op {
    // Markers.
    Invalid,
    Copy,
    Phi,
    Arg,
    KeepAlive,

    // Constants.
    ConstBool,
    Const8,
    Const16,
    Const32,
    Const64,
    Const32F,
    Const64F,

    // Integer and float arithmetic.
    Add8,
    Add16,
    Add32,
    Add64,
    Add32F,
    Add64F,
    Sub8,
    Sub16,
    Sub32,
    Sub64,
    Sub32F,
    Sub64F,
    Mul8,
    Mul16,
    Mul32,
    Mul64,
    Mul32F,
    Mul64F,
    Div8,
    Div16,
    Div32,
    Div64,
    Div8u,
    Div16u,
    Div32u,
    Div64u,
    Div32F,
    Div64F,
    Mod8,
    Mod16,
    Mod32,
    Mod64,
    Mod8u,
    Mod16u,
    Mod32u,
    Mod64u,

    // Bitwise.
    And8,
    And16,
    And32,
    And64,
    Or8,
    Or16,
    Or32,
    Or64,
    Xor8,
    Xor16,
    Xor32,
    Xor64,
    Lsh64x64,
    Rsh64x64,
    Rsh64Ux64,

    // Comparisons.
    Eq8,
    Eq16,
    Eq32,
    Eq64,
    Eq32F,
    Eq64F,
    EqB,
    Neq8,
    Neq16,
    Neq32,
    Neq64,
    Neq32F,
    Neq64F,
    NeqB,
    Less8,
    Less16,
    Less32,
    Less64,
    Less8U,
    Less16U,
    Less32U,
    Less64U,
    Less32F,
    Less64F,
    Leq8,
    Leq16,
    Leq32,
    Leq64,
    Leq8U,
    Leq16U,
    Leq32U,
    Leq64U,
    Leq32F,
    Leq64F,
    Greater8,
    Greater16,
    Greater32,
    Greater64,
    Greater8U,
    Greater16U,
    Greater32U,
    Greater64U,
    Greater32F,
    Greater64F,
    Geq8,
    Geq16,
    Geq32,
    Geq64,
    Geq8U,
    Geq16U,
    Geq32U,
    Geq64U,
    Geq32F,
    Geq64F,

    // Boolean logic.
    AndB,
    OrB,
    Not,

    // Unary arithmetic.
    Neg8,
    Neg16,
    Neg32,
    Neg64,
    Neg32F,
    Neg64F,
    Com8,
    Com16,
    Com32,
    Com64,

    // Sign/zero extensions.
    SignExt8to16,
    SignExt8to32,
    SignExt8to64,
    SignExt16to32,
    SignExt16to64,
    SignExt32to64,
    ZeroExt8to16,
    ZeroExt8to32,
    ZeroExt8to64,
    ZeroExt16to32,
    ZeroExt16to64,
    ZeroExt32to64,

    // Truncations.
    Trunc16to8,
    Trunc32to8,
    Trunc64to8,
    Trunc32to16,
    Trunc64to16,
    Trunc64to32,

    // Int <-> float conversions.
    Cvt32to32F,
    Cvt32to64F,
    Cvt64to32F,
    Cvt64to64F,
    Cvt32Fto32,
    Cvt32Fto64,
    Cvt64Fto32,
    Cvt64Fto64,
    Cvt32Fto64F,
    Cvt64Fto32F,
    Cvt32Uto32F,
    Cvt32Uto64F,
    Cvt32Fto32U,
    Cvt64Fto32U,
    Cvt64Uto32F,
    Cvt64Uto64F,
    Cvt32Fto64U,
    Cvt64Fto64U,

    // Memory.
    InitMem,
    Load,
    Store,
    Zero,

    // Calls.
    StaticCall,

    // Pointer checks.
    NilCheck,
    IsNonNil,
    IsInBounds,

    // Tuples.
    Mul64uhilo,
    Select0,
    Select1,
}

impl Op {
    /// True for the constant-producing opcodes whose AuxInt is the value.
    pub fn is_const(self) -> bool {
        matches!(
            self,
            Op::ConstBool
                | Op::Const8
                | Op::Const16
                | Op::Const32
                | Op::Const64
                | Op::Const32F
                | Op::Const64F
        )
    }

    /// True when the operation is insensitive to argument order.
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            Op::Add8
                | Op::Add16
                | Op::Add32
                | Op::Add64
                | Op::Add32F
                | Op::Add64F
                | Op::Mul8
                | Op::Mul16
                | Op::Mul32
                | Op::Mul64
                | Op::Mul32F
                | Op::Mul64F
                | Op::Mul64uhilo
                | Op::And8
                | Op::And16
                | Op::And32
                | Op::And64
                | Op::Or8
                | Op::Or16
                | Op::Or32
                | Op::Or64
                | Op::Xor8
                | Op::Xor16
                | Op::Xor32
                | Op::Xor64
                | Op::Eq8
                | Op::Eq16
                | Op::Eq32
                | Op::Eq64
                | Op::Eq32F
                | Op::Eq64F
                | Op::EqB
                | Op::Neq8
                | Op::Neq16
                | Op::Neq32
                | Op::Neq64
                | Op::Neq32F
                | Op::Neq64F
                | Op::NeqB
                | Op::AndB
                | Op::OrB
        )
    }

    pub fn is_call(self) -> bool {
        matches!(self, Op::StaticCall)
    }

    /// Operations that must be kept even when their result is unused.
    pub fn has_side_effects(self) -> bool {
        matches!(
            self,
            Op::Store | Op::Zero | Op::StaticCall | Op::NilCheck | Op::KeepAlive
        )
    }

    /// Fixed argument count, or `None` for the variadic ops (φ, calls).
    pub fn arity(self) -> Option<usize> {
        Some(match self {
            Op::Phi | Op::StaticCall => return None,
            Op::Invalid | Op::Arg | Op::InitMem => 0,
            op if op.is_const() => 0,
            Op::Copy
            | Op::Not
            | Op::Neg8
            | Op::Neg16
            | Op::Neg32
            | Op::Neg64
            | Op::Neg32F
            | Op::Neg64F
            | Op::Com8
            | Op::Com16
            | Op::Com32
            | Op::Com64
            | Op::SignExt8to16
            | Op::SignExt8to32
            | Op::SignExt8to64
            | Op::SignExt16to32
            | Op::SignExt16to64
            | Op::SignExt32to64
            | Op::ZeroExt8to16
            | Op::ZeroExt8to32
            | Op::ZeroExt8to64
            | Op::ZeroExt16to32
            | Op::ZeroExt16to64
            | Op::ZeroExt32to64
            | Op::Trunc16to8
            | Op::Trunc32to8
            | Op::Trunc64to8
            | Op::Trunc32to16
            | Op::Trunc64to16
            | Op::Trunc64to32
            | Op::Cvt32to32F
            | Op::Cvt32to64F
            | Op::Cvt64to32F
            | Op::Cvt64to64F
            | Op::Cvt32Fto32
            | Op::Cvt32Fto64
            | Op::Cvt64Fto32
            | Op::Cvt64Fto64
            | Op::Cvt32Fto64F
            | Op::Cvt64Fto32F
            | Op::Cvt32Uto32F
            | Op::Cvt32Uto64F
            | Op::Cvt32Fto32U
            | Op::Cvt64Fto32U
            | Op::Cvt64Uto32F
            | Op::Cvt64Uto64F
            | Op::Cvt32Fto64U
            | Op::Cvt64Fto64U
            | Op::IsNonNil
            | Op::Select0
            | Op::Select1 => 1,
            Op::Load | Op::Zero | Op::NilCheck | Op::KeepAlive | Op::IsInBounds => 2,
            Op::Store => 3,
            // Remaining binary arithmetic, bitwise, and comparison ops.
            _ => 2,
        })
    }
}
