//! SSA optimization passes.
//!
//! The middle-end pipeline, in its fixed order: sparse conditional constant
//! propagation, dead code elimination, common-subexpression elimination with
//! hoisting (which reruns dce and φ-elimination when it moves anything),
//! loop-invariant code motion, and block trimming.

pub mod cse;
pub mod dce;
pub mod fold;
pub mod hoist;
pub mod licm;
pub mod phielim;
pub mod sccp;
pub mod trim;

pub use cse::cse;
pub use dce::dce;
pub use licm::licm;
pub use phielim::phielim;
pub use sccp::sccp;
pub use trim::trim;

use crate::ir::Func;

/// Runs the full middle-end pipeline on one function. Each pass preserves
/// SSA form and the CFG invariants.
pub fn optimize(f: &mut Func) {
    sccp::sccp(f);
    dce::dce(f);
    cse::cse(f);
    licm::licm(f);
    trim::trim(f);
}

#[cfg(test)]
#[path = "../tests/opt/t_pipeline.rs"]
mod tests;
