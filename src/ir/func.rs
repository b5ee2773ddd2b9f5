//! The SSA function container.

use tracing::info;

use super::block::{Block, BlockId, BlockKind};
use super::op::Op;
use super::types::Type;
use super::value::{Aux, Value, ValueId};

/// Per-pass driver knobs, shared by all passes operating on a function.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassOptions {
    /// Verbosity: 0 silent, >1 per-pass summaries, >2 detailed traces.
    pub debug: u8,
    /// When positive, passes emit counters through [`Func::log_stat`].
    pub stats: u8,
}

/// A function in SSA form: arenas of values and blocks addressed by id, an
/// ordered list of live blocks, and the entry block.
///
/// Ids are stable for the lifetime of the function; deleting a block or
/// resetting a value never invalidates other ids. Ids start at 1, so dense
/// side arrays indexed by id have an unused slot 0.
#[derive(Debug)]
pub struct Func {
    pub name: String,
    pub entry: BlockId,
    pub pass: PassOptions,
    pub(crate) values: Vec<Value>,
    pub(crate) blocks: Vec<Block>,
    pub(crate) order: Vec<BlockId>,
    stats: Vec<(&'static str, i64)>,
}

impl Func {
    pub fn new(name: impl Into<String>) -> Func {
        // Slot 0 of each arena is a reserved tombstone so ids are 1-based.
        Func {
            name: name.into(),
            entry: BlockId(0),
            pass: PassOptions::default(),
            values: vec![Value {
                id: ValueId(0),
                op: Op::Invalid,
                ty: Type::Void,
                aux_int: 0,
                aux: Aux::None,
                args: Vec::new(),
                block: BlockId(0),
                line: 0,
            }],
            blocks: vec![Block {
                id: BlockId(0),
                kind: BlockKind::Exit,
                preds: Vec::new(),
                succs: Vec::new(),
                values: Vec::new(),
                control: None,
            }],
            order: Vec::new(),
            stats: Vec::new(),
        }
    }

    /// Upper bound (exclusive) on value ids; sizes dense side arrays.
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Upper bound (exclusive) on block ids; sizes dense side arrays.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn value(&self, v: ValueId) -> &Value {
        &self.values[v.index()]
    }

    pub fn value_mut(&mut self, v: ValueId) -> &mut Value {
        &mut self.values[v.index()]
    }

    pub fn block(&self, b: BlockId) -> &Block {
        &self.blocks[b.index()]
    }

    pub fn block_mut(&mut self, b: BlockId) -> &mut Block {
        &mut self.blocks[b.index()]
    }

    /// Live blocks in function order. The first allocated block is the entry.
    pub fn block_ids(&self) -> &[BlockId] {
        &self.order
    }

    /// Allocates a new block. The first block becomes the entry.
    pub fn new_block(&mut self, kind: BlockKind) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block {
            id,
            kind,
            preds: Vec::new(),
            succs: Vec::new(),
            values: Vec::new(),
            control: None,
        });
        if self.order.is_empty() {
            self.entry = id;
        }
        self.order.push(id);
        id
    }

    /// Removes a block from the live order. Its arena slot (and id) remain
    /// valid but the block no longer participates in any traversal.
    pub fn remove_block(&mut self, b: BlockId) {
        self.order.retain(|&x| x != b);
    }

    /// Allocates a new value at the end of `block`. Aux payloads and
    /// arguments are filled in by the caller.
    pub fn new_value(&mut self, block: BlockId, op: Op, ty: Type, line: u32) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(Value {
            id,
            op,
            ty,
            aux_int: 0,
            aux: Aux::None,
            args: Vec::new(),
            block,
            line,
        });
        self.blocks[block.index()].values.push(id);
        id
    }

    /// Rewrites a value in place to a new opcode, clearing its arguments and
    /// aux payloads. The id (and thus every use) remains valid.
    pub fn reset(&mut self, v: ValueId, op: Op) {
        let val = &mut self.values[v.index()];
        val.op = op;
        val.aux_int = 0;
        val.aux = Aux::None;
        val.args.clear();
    }

    pub fn set_arg(&mut self, v: ValueId, i: usize, arg: ValueId) {
        self.values[v.index()].args[i] = arg;
    }

    pub fn add_arg(&mut self, v: ValueId, arg: ValueId) {
        self.values[v.index()].args.push(arg);
    }

    pub fn set_control(&mut self, b: BlockId, v: Option<ValueId>) {
        self.blocks[b.index()].control = v;
    }

    /// Clones `v` into `block`, returning the new value's id.
    pub fn copy_into(&mut self, v: ValueId, block: BlockId) -> ValueId {
        let src = self.values[v.index()].clone();
        let id = self.new_value(block, src.op, src.ty, src.line);
        let val = &mut self.values[id.index()];
        val.aux_int = src.aux_int;
        val.aux = src.aux;
        val.args = src.args;
        id
    }

    /// Records a named pass counter and mirrors it to the log.
    pub fn log_stat(&mut self, name: &'static str, count: i64) {
        info!(func = %self.name, stat = name, count, "pass stat");
        self.stats.push((name, count));
    }

    /// Counters recorded so far, in emission order.
    pub fn stats(&self) -> &[(&'static str, i64)] {
        &self.stats
    }

    /// Aborts compilation on an invariant violation, identifying the
    /// function. Never returns.
    pub fn fatal(&self, msg: impl AsRef<str>) -> ! {
        panic!("ssa: function {}: {}", self.name, msg.as_ref());
    }
}
