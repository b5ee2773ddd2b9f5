//! SSA intermediate representation.
//!
//! Defines the core SSA entities (functions, blocks, values, opcodes, types)
//! and the mutation primitives the optimization passes are written against.

pub mod block;
pub mod builder;
pub mod format;
pub mod func;
pub mod op;
pub mod types;
pub mod value;

pub use block::{Block, BlockId, BlockKind, Edge};
pub use builder::FuncBuilder;
pub use format::format_func;
pub use func::{Func, PassOptions};
pub use op::Op;
pub use types::Type;
pub use value::{Aux, Value, ValueId};
