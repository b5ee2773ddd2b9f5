//! Textual rendering of the IR, for debug traces and tests.

use std::fmt;

use super::block::BlockId;
use super::func::Func;
use super::types::Type;
use super::value::{Aux, Value, ValueId};

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "bool"),
            Type::Int { bits, signed } => {
                write!(f, "{}{}", if *signed { "i" } else { "u" }, bits)
            }
            Type::Float { bits } => write!(f, "f{}", bits),
            Type::Tuple(fields) => write!(f, "({}, {})", fields[0], fields[1]),
            Type::Memory => write!(f, "mem"),
        }
    }
}

impl Value {
    /// One-line rendering: `v7 = Add64 <i64> v3 v4 [2] {sym}`.
    pub fn long_string(&self) -> String {
        let mut s = format!("{} = {:?} <{}>", self.id, self.op, self.ty);
        for arg in &self.args {
            s.push_str(&format!(" {}", arg));
        }
        if self.aux_int != 0 || self.op.is_const() {
            s.push_str(&format!(" [{}]", self.aux_int));
        }
        if let Aux::Sym(sym) = &self.aux {
            s.push_str(&format!(" {{{}}}", sym));
        }
        s
    }
}

#[cfg(test)]
#[path = "../tests/ir/t_format.rs"]
mod tests;

/// Renders a whole function, one block per paragraph.
pub fn format_func(f: &Func) -> String {
    let mut out = format!("{}\n", f.name);
    for &b in f.block_ids() {
        let blk = f.block(b);
        out.push_str(&format!("  {}: {:?}", b, blk.kind));
        if let Some(c) = blk.control {
            out.push_str(&format!(" {}", c));
        }
        if !blk.succs.is_empty() {
            out.push_str(" ->");
            for e in &blk.succs {
                out.push_str(&format!(" {}", e.block));
            }
        }
        out.push('\n');
        for &v in &blk.values {
            out.push_str(&format!("    {}\n", f.value(v).long_string()));
        }
    }
    out
}
