//! SSA middle-end optimization passes.
//!
//! This crate implements the value-graph optimizations that sit between a
//! front end's SSA construction and the back end: sparse conditional constant
//! propagation, common-subexpression elimination with value hoisting,
//! loop-invariant code motion, and basic-block trimming, together with the
//! dominator/loop-nest analyses and IR model they operate on.

pub mod analysis;
pub mod ir;
pub mod opt;
pub mod util;
pub mod verify;
