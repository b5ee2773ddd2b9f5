//! Minimal SSA function builder.
//!
//! Provides a small API for assembling SSA functions for tests and front-end
//! handover without exposing raw edge bookkeeping: `edge` keeps the paired
//! predecessor/successor indices consistent by construction.

use super::block::{BlockId, BlockKind, Edge};
use super::func::Func;
use super::op::Op;
use super::types::Type;
use super::value::{Aux, ValueId};

pub struct FuncBuilder {
    func: Func,
}

impl FuncBuilder {
    pub fn new(name: impl Into<String>) -> FuncBuilder {
        FuncBuilder {
            func: Func::new(name),
        }
    }

    /// Appends a new block. The first block created is the entry.
    pub fn block(&mut self, kind: BlockKind) -> BlockId {
        self.func.new_block(kind)
    }

    /// Adds the control-flow edge `from` → `to`, pairing the new successor
    /// slot of `from` with the new predecessor slot of `to`.
    pub fn edge(&mut self, from: BlockId, to: BlockId) {
        let succ_idx = self.func.block(from).succs.len();
        let pred_idx = self.func.block(to).preds.len();
        self.func.block_mut(from).succs.push(Edge {
            block: to,
            index: pred_idx,
        });
        self.func.block_mut(to).preds.push(Edge {
            block: from,
            index: succ_idx,
        });
    }

    /// Emits a value with the given arguments at the end of `block`.
    pub fn value(&mut self, block: BlockId, op: Op, ty: Type, args: &[ValueId]) -> ValueId {
        let v = self.func.new_value(block, op, ty, 0);
        for &a in args {
            self.func.add_arg(v, a);
        }
        v
    }

    /// Emits a value carrying an AuxInt payload.
    pub fn value_i(
        &mut self,
        block: BlockId,
        op: Op,
        ty: Type,
        aux_int: i64,
        args: &[ValueId],
    ) -> ValueId {
        let v = self.value(block, op, ty, args);
        self.func.value_mut(v).aux_int = aux_int;
        v
    }

    /// Emits a value carrying a symbol aux payload.
    pub fn value_sym(
        &mut self,
        block: BlockId,
        op: Op,
        ty: Type,
        sym: &str,
        args: &[ValueId],
    ) -> ValueId {
        let v = self.value(block, op, ty, args);
        self.func.value_mut(v).aux = Aux::Sym(sym.to_string());
        v
    }

    pub fn const_bool(&mut self, block: BlockId, value: bool) -> ValueId {
        self.value_i(block, Op::ConstBool, Type::Bool, value as i64, &[])
    }

    pub fn const64(&mut self, block: BlockId, value: i64) -> ValueId {
        self.value_i(block, Op::Const64, Type::int64(), value, &[])
    }

    pub fn const32(&mut self, block: BlockId, value: i32) -> ValueId {
        self.value_i(block, Op::Const32, Type::int32(), value as i64, &[])
    }

    /// Emits a φ whose arguments are positionally aligned with the block's
    /// predecessors.
    pub fn phi(&mut self, block: BlockId, ty: Type, args: &[ValueId]) -> ValueId {
        self.value(block, Op::Phi, ty, args)
    }

    pub fn set_control(&mut self, block: BlockId, v: ValueId) {
        self.func.set_control(block, Some(v));
    }

    pub fn func(&mut self) -> &mut Func {
        &mut self.func
    }

    pub fn finish(self) -> Func {
        self.func
    }
}
