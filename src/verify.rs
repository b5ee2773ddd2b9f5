//! SSA function verifier.
//!
//! Checks the invariants every pass must preserve: paired CFG edges, block
//! kind constraints, φ arity, value/block ownership, and SSA dominance of
//! uses by definitions. Tests run it on the output of every pass.

use std::collections::HashMap;

use thiserror::Error;

use crate::analysis::DomTree;
use crate::ir::{BlockId, BlockKind, Func, Op, ValueId};

#[derive(Debug, Clone, Error)]
#[error("{func}: {msg}")]
pub struct VerifyError {
    func: String,
    msg: String,
}

fn err(f: &Func, msg: impl Into<String>) -> VerifyError {
    VerifyError {
        func: f.name.clone(),
        msg: msg.into(),
    }
}

pub fn verify_func(f: &Func) -> Result<(), VerifyError> {
    verify_cfg(f)?;
    verify_ownership(f)?;
    verify_values(f)?;
    verify_dominance(f)?;
    Ok(())
}

/// Predecessor and successor edge lists must agree pairwise, and block kinds
/// constrain successor counts and control values.
fn verify_cfg(f: &Func) -> Result<(), VerifyError> {
    for &b in f.block_ids() {
        let blk = f.block(b);

        for (i, e) in blk.preds.iter().enumerate() {
            let back = f
                .block(e.block)
                .succs
                .get(e.index)
                .ok_or_else(|| err(f, format!("{}: pred edge {} points past {}", b, i, e.block)))?;
            if back.block != b || back.index != i {
                return Err(err(
                    f,
                    format!("{}: pred edge {} not mirrored in {}", b, i, e.block),
                ));
            }
        }
        for (i, e) in blk.succs.iter().enumerate() {
            let back = f
                .block(e.block)
                .preds
                .get(e.index)
                .ok_or_else(|| err(f, format!("{}: succ edge {} points past {}", b, i, e.block)))?;
            if back.block != b || back.index != i {
                return Err(err(
                    f,
                    format!("{}: succ edge {} not mirrored in {}", b, i, e.block),
                ));
            }
        }

        let nsucc = blk.succs.len();
        let ok = match blk.kind {
            BlockKind::Plain | BlockKind::First => nsucc == 1,
            BlockKind::If => nsucc == 2,
            BlockKind::Ret | BlockKind::Exit => nsucc == 0,
        };
        if !ok {
            return Err(err(
                f,
                format!("{}: kind {:?} with {} successors", b, blk.kind, nsucc),
            ));
        }

        match blk.kind {
            BlockKind::If => {
                let c = blk
                    .control
                    .ok_or_else(|| err(f, format!("{}: If block without control", b)))?;
                if !f.value(c).ty.is_boolean() {
                    return Err(err(f, format!("{}: If control {} is not boolean", b, c)));
                }
            }
            BlockKind::Plain | BlockKind::First => {
                if blk.control.is_some() {
                    return Err(err(f, format!("{}: {:?} block with control", b, blk.kind)));
                }
            }
            BlockKind::Ret | BlockKind::Exit => {}
        }
    }
    Ok(())
}

/// Every live value is owned by exactly one live block and knows it.
fn verify_ownership(f: &Func) -> Result<(), VerifyError> {
    let mut owner: HashMap<ValueId, BlockId> = HashMap::new();
    for &b in f.block_ids() {
        for &v in &f.block(b).values {
            if f.value(v).block != b {
                return Err(err(
                    f,
                    format!("{} listed in {} but owned by {}", v, b, f.value(v).block),
                ));
            }
            if let Some(prev) = owner.insert(v, b) {
                return Err(err(f, format!("{} owned by both {} and {}", v, prev, b)));
            }
        }
    }
    Ok(())
}

/// Arities match opcodes, φ arities match predecessor counts, and arguments
/// reference live values.
fn verify_values(f: &Func) -> Result<(), VerifyError> {
    let mut live = vec![false; f.num_values()];
    for &b in f.block_ids() {
        for &v in &f.block(b).values {
            live[v.index()] = true;
        }
    }

    for &b in f.block_ids() {
        for &v in &f.block(b).values {
            let val = f.value(v);
            if val.op == Op::Phi {
                if val.args.len() != f.block(b).preds.len() {
                    return Err(err(
                        f,
                        format!(
                            "{}: φ {} has {} args for {} predecessors",
                            b,
                            v,
                            val.args.len(),
                            f.block(b).preds.len()
                        ),
                    ));
                }
            } else if let Some(arity) = val.op.arity() {
                if val.args.len() != arity {
                    return Err(err(
                        f,
                        format!("{}: {:?} {} has {} args", b, val.op, v, val.args.len()),
                    ));
                }
            }
            for &a in &val.args {
                if a.index() >= f.num_values() || !live[a.index()] {
                    return Err(err(f, format!("{} uses dead value {}", v, a)));
                }
                if f.value(a).op == Op::Invalid {
                    return Err(err(f, format!("{} uses invalid value {}", v, a)));
                }
            }
        }
        if let Some(c) = f.block(b).control {
            if !live[c.index()] {
                return Err(err(f, format!("{}: control {} is dead", b, c)));
            }
        }
    }
    Ok(())
}

/// Every use is dominated by its definition: the def's block strictly
/// dominates the use's block, or they share a block with the def scheduled
/// first, or the use is a φ and the def dominates the corresponding
/// predecessor.
fn verify_dominance(f: &Func) -> Result<(), VerifyError> {
    let dom = DomTree::compute(f);

    let mut position: HashMap<ValueId, usize> = HashMap::new();
    for &b in f.block_ids() {
        for (i, &v) in f.block(b).values.iter().enumerate() {
            position.insert(v, i);
        }
    }

    for &b in f.block_ids() {
        if dom.domorder(b) == 0 {
            continue; // unreachable; dominance is undefined there
        }
        for &u in &f.block(b).values {
            let uval = f.value(u);
            for (i, &v) in uval.args.iter().enumerate() {
                let vb = f.value(v).block;
                let ok = if uval.op == Op::Phi {
                    let pred = f.block(b).preds[i].block;
                    dom.dominates_or_eq(vb, pred)
                } else if vb == b {
                    position[&v] < position[&u]
                } else {
                    dom.dominates(vb, b)
                };
                if !ok {
                    return Err(err(
                        f,
                        format!("{} in {} uses {} in {} without dominance", u, b, v, vb),
                    ));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/t_verify.rs"]
mod tests;
