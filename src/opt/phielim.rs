//! Copy and redundant-φ elimination.
//!
//! Shortens argument chains through `Copy` ops and rewrites any φ whose
//! arguments all agree (up to self-references) into a `Copy`, repeating
//! until nothing changes. Runs after hoisting, which leaves copies behind.

use crate::ir::{Func, Op, ValueId};

pub fn phielim(f: &mut Func) {
    loop {
        let mut change = false;
        for b in f.block_ids().to_vec() {
            for v in f.block(b).values.clone() {
                change |= copy_elim_value(f, v);
                change |= phi_elim_value(f, v);
            }
        }
        if !change {
            break;
        }
    }
}

/// Redirects each argument of `v` that is a copy to the copy's ultimate
/// source.
fn copy_elim_value(f: &mut Func, v: ValueId) -> bool {
    let mut changed = false;
    for i in 0..f.value(v).args.len() {
        let arg = f.value(v).args[i];
        let mut a = arg;
        let mut steps = 0;
        while f.value(a).op == Op::Copy {
            a = f.value(a).args[0];
            steps += 1;
            if steps > f.num_values() {
                f.fatal(format!("phielim: copy cycle reachable from {}", v));
            }
        }
        if a != arg {
            f.set_arg(v, i, a);
            changed = true;
        }
    }
    changed
}

/// If `v` is a φ with a single distinct argument (ignoring references to
/// itself), it computes that argument; rewrite it into a copy.
fn phi_elim_value(f: &mut Func, v: ValueId) -> bool {
    if f.value(v).op != Op::Phi {
        return false;
    }
    let mut w: Option<ValueId> = None;
    for &a in &f.value(v).args {
        if a == v || Some(a) == w {
            continue;
        }
        if w.is_some() {
            return false;
        }
        w = Some(a);
    }
    let Some(w) = w else {
        return false;
    };
    f.reset(v, Op::Copy);
    f.add_arg(v, w);
    true
}

#[cfg(test)]
#[path = "../tests/opt/t_phielim.rs"]
mod tests;
