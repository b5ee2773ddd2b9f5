//! Common-subexpression elimination.
//!
//! Partitions the function's values into structural equivalence classes by
//! iterative refinement, then replaces every class member with a dominating
//! representative. Values are only relinked; dead-code elimination reclaims
//! the duplicates. Members left in distinct, mutually non-dominating blocks
//! are handed to the hoister.

use std::cmp::Ordering;
use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::analysis::DomTree;
use crate::ir::{Aux, Func, Op, ValueId};

use super::dce::dce;
use super::hoist::hoist_values;
use super::phielim::phielim;

/// An equivalence class: a set of values the partitioning has proved
/// structurally equivalent. During refinement a class may still represent
/// the union of several final classes.
pub(crate) type EqClass = Vec<ValueId>;

/// Class id per value: non-negative ids index the partition; singletons and
/// memory values get the unique negative pseudo-class `-id`.
pub(crate) type ClassMap = Vec<i64>;

pub fn cse(f: &mut Func) {
    // Two values are equivalent iff they agree on opcode, type, aux, auxint,
    // and argument count, their arguments are positionally equivalent, and,
    // for φ-ops, they live in the same block.

    // Intern aux payloads so comparison is by small integer.
    let mut aux_ids: IndexMap<Aux, i32> = IndexMap::new();
    let mut a: Vec<ValueId> = Vec::with_capacity(f.num_values());
    for b in f.block_ids().to_vec() {
        for v in f.block(b).values.clone() {
            let aux = f.value(v).aux.clone();
            let next = aux_ids.len() as i32 + 1;
            aux_ids.entry(aux).or_insert(next);
            if f.value(v).ty.is_memory() {
                continue; // memory values can never cse
            }
            // Order the arguments of commutative operations canonically.
            let val = f.value(v);
            if val.op.is_commutative() && val.args.len() == 2 && val.args[1] < val.args[0] {
                f.value_mut(v).args.swap(0, 1);
            }
            a.push(v);
        }
    }

    let mut partition = partition_values(f, a, &aux_ids);

    let mut value_eq_class: ClassMap = (0..f.num_values()).map(|i| -(i as i64)).collect();
    let mut class_num: i64 = 0;
    for e in &partition {
        for &v in e {
            value_eq_class[v.index()] = class_num;
        }
        class_num += 1;
    }

    // Split classes at points where members have non-equivalent arguments,
    // until a fixed point.
    let mut split_points: Vec<usize> = Vec::new();
    loop {
        let mut changed = false;

        // The partition grows inside the loop; indexing instead of iterating
        // processes new classes as they arrive.
        let mut i = 0;
        while i < partition.len() {
            let mut e = std::mem::take(&mut partition[i]);

            // Sort by the classes of the arguments, tie-broken by id for
            // deterministic class numbering.
            e.sort_by(|&v, &w| {
                cmp_arg_classes(f, &value_eq_class, v, w).then_with(|| v.cmp(&w))
            });

            split_points.clear();
            split_points.push(0);
            for j in 1..e.len() {
                if cmp_arg_classes(f, &value_eq_class, e[j - 1], e[j]) != Ordering::Equal {
                    split_points.push(j);
                }
            }
            if split_points.len() == 1 {
                partition[i] = e;
                i += 1;
                continue; // no splits, leave the class alone
            }

            changed = true;
            split_points.push(e.len());

            // The first fragment stays in place and is reprocessed; the
            // others become new classes at the end of the partition.
            let first: EqClass = e[split_points[0]..split_points[1]].to_vec();
            if first.len() == 1 {
                value_eq_class[first[0].index()] = -(first[0].index() as i64);
            }
            for j in 1..split_points.len() - 1 {
                let frag: EqClass = e[split_points[j]..split_points[j + 1]].to_vec();
                if frag.len() == 1 {
                    value_eq_class[frag[0].index()] = -(frag[0].index() as i64);
                    continue;
                }
                for &v in &frag {
                    value_eq_class[v.index()] = class_num;
                }
                class_num += 1;
                partition.push(frag);
            }
            partition[i] = first;
        }

        if !changed {
            break;
        }
    }

    if f.pass.debug > 2 {
        dump_partition(f, &partition);
    }

    let dom = DomTree::compute(f);

    // Substitutions: replace w with v when they share a class and v's block
    // dominates w's. Members of the same block are ordered by schedule
    // position so the surviving member is the one defined first.
    let mut position: Vec<usize> = vec![0; f.num_values()];
    for &b in f.block_ids() {
        for (i, &v) in f.block(b).values.iter().enumerate() {
            position[v.index()] = i;
        }
    }
    let mut rewrite: Vec<Option<ValueId>> = vec![None; f.num_values()];
    for e in partition.iter_mut() {
        e.sort_by_key(|&v| (dom.domorder(f.value(v).block), position[v.index()]));
        for i in 0..e.len() {
            let v = e[i];
            if rewrite[v.index()].is_some() {
                continue;
            }
            for j in i + 1..e.len() {
                let w = e[j];
                if rewrite[w.index()].is_some() {
                    continue;
                }
                if dom.dominates_or_eq(f.value(v).block, f.value(w).block) {
                    rewrite[w.index()] = Some(v);
                } else {
                    // Sorted by domorder: v dominates no later member either.
                    break;
                }
            }
        }
    }

    // A tuple generator rewritten into another block strands its selectors:
    // copy each selector next to the new generator, at most once per opcode.
    let mut copied_selects: HashMap<u32, Vec<ValueId>> = HashMap::new();
    for b in f.block_ids().to_vec() {
        'values: for v in f.block(b).values.clone() {
            if rewrite[v.index()].is_some() {
                continue;
            }
            let op = f.value(v).op;
            if op != Op::Select0 && op != Op::Select1 {
                continue;
            }
            let gen = f.value(v).args[0];
            if !f.value(gen).ty.is_tuple() {
                f.fatal(format!(
                    "cse: argument of tuple selector {} is not a tuple: {}",
                    v,
                    f.value(gen).long_string()
                ));
            }
            let Some(t) = rewrite[gen.index()] else {
                continue;
            };
            if f.value(t).block == b {
                continue;
            }
            if let Some(copies) = copied_selects.get(&t.0) {
                for &c in copies {
                    if f.value(c).op == op {
                        // An equivalent selector was already copied.
                        rewrite[v.index()] = Some(c);
                        continue 'values;
                    }
                }
            }
            let c = f.copy_into(v, f.value(t).block);
            rewrite.push(None);
            value_eq_class.push(-(c.index() as i64));
            rewrite[v.index()] = Some(c);
            copied_selects.entry(t.0).or_default().push(c);
        }
    }

    // Apply the substitutions.
    let mut rewrites: i64 = 0;
    for b in f.block_ids().to_vec() {
        for v in f.block(b).values.clone() {
            for i in 0..f.value(v).args.len() {
                let w = f.value(v).args[i];
                if let Some(x) = rewrite[w.index()] {
                    f.set_arg(v, i, x);
                    rewrites += 1;
                }
            }
        }
        if let Some(c) = f.block(b).control {
            if let Some(x) = rewrite[c.index()] {
                if f.value(c).op == Op::NilCheck {
                    // The nil-check pass removes and logs these itself.
                    continue;
                }
                f.set_control(b, Some(x));
            }
        }
    }

    if f.pass.debug > 1 {
        debug!(func = %f.name, rewrites, "cse: applied substitutions");
    }

    // Hoist what survives in multiple blocks.
    let hoists = hoist_values(f, &dom, &mut partition, &mut value_eq_class, &rewrite);
    if hoists > 0 {
        dce(f);
        phielim(f);
    }

    if f.pass.stats > 0 {
        f.log_stat("CSE HOISTED", hoists);
    }
    if f.pass.stats > 0 {
        f.log_stat("CSE REWRITES", rewrites);
    }
}

/// Coarse initial partition: sort all candidate values by the cheap
/// structural features and group adjacent equals. Classes of size 1 are
/// dropped.
fn partition_values(f: &Func, mut a: Vec<ValueId>, aux_ids: &IndexMap<Aux, i32>) -> Vec<EqClass> {
    a.sort_by(|&v, &w| cmp_val(f, v, w, aux_ids).then_with(|| v.cmp(&w)));

    let mut partition = Vec::new();
    let mut i = 0;
    while i < a.len() {
        let mut j = i + 1;
        while j < a.len() && cmp_val(f, a[i], a[j], aux_ids) == Ordering::Equal {
            j += 1;
        }
        if j - i > 1 {
            partition.push(a[i..j].to_vec());
        }
        i = j;
    }
    partition
}

/// Structural comparison of two values, cheapest features first. Argument
/// *identity* is not consulted; refinement handles arguments by class.
fn cmp_val(f: &Func, v: ValueId, w: ValueId, aux_ids: &IndexMap<Aux, i32>) -> Ordering {
    let (vv, wv) = (f.value(v), f.value(w));
    vv.op
        .cmp(&wv.op)
        .then_with(|| vv.aux_int.cmp(&wv.aux_int))
        .then_with(|| vv.args.len().cmp(&wv.args.len()))
        .then_with(|| {
            if vv.op == Op::Phi {
                vv.block.cmp(&wv.block)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| vv.ty.cmp(&wv.ty))
        .then_with(|| {
            if vv.aux == wv.aux {
                Ordering::Equal
            } else if vv.aux == Aux::None {
                Ordering::Less
            } else if wv.aux == Aux::None {
                Ordering::Greater
            } else {
                aux_ids[&vv.aux].cmp(&aux_ids[&wv.aux])
            }
        })
}

/// Lexicographic comparison of the argument class tuples of two values.
fn cmp_arg_classes(f: &Func, classes: &ClassMap, v: ValueId, w: ValueId) -> Ordering {
    let (va, wa) = (&f.value(v).args, &f.value(w).args);
    for (x, y) in va.iter().zip(wa.iter()) {
        match classes[x.index()].cmp(&classes[y.index()]) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

fn dump_partition(f: &Func, partition: &[EqClass]) {
    for (i, e) in partition.iter().enumerate() {
        if e.len() > 1 {
            let members: Vec<String> = e.iter().map(|v| v.to_string()).collect();
            trace!(func = %f.name, class = i, members = %members.join(" "), "cse partition");
        }
    }
}

#[cfg(test)]
#[path = "../tests/opt/t_cse.rs"]
mod tests;
