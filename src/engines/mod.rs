//! Computational engines
//!
//! `compute` holds the pure sequence kernels (string operations,
//! thermodynamics, dimer and hairpin scanning); `core` holds execution
//! support such as the optional thread pool.

pub mod core;
pub mod compute;
