//! PCR primer and assembly-overhang design
//!
//! `engines` holds the pure kernels (string operations, nearest-neighbor
//! thermodynamics, dimer and hairpin scanners, ordered fan-out). `modules`
//! builds the design API on top of them: normalized sequences, FASTA text,
//! primer picking and QC, and the assembly design run.

pub mod engines;
pub mod modules;

pub use modules::assembly::{
    design, AssemblyJunction, AssemblyMethod, CorePolicy, DesignError, DesignReport, DesignRequest,
    DesignResult, FragmentInput, JunctionLinker, PrimerPair,
};
pub use modules::primer::{
    DesignConfig, PrimerCandidate, PrimerPicker, QcFinding, QcKind, ThermoParams,
};
pub use modules::seq::Sequence;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
