//! Primer module
//!
//! Reaction parameters, primer-core picking, oligo QC and preflight checks.

pub mod params;
pub mod picker;
pub mod qc;
pub mod preflight;

/// Convenience re-exports
pub use params::{DesignConfig, ThermoParams};
pub use picker::{pick_forward, pick_reverse, PrimerCandidate, PrimerPicker};
pub use qc::{QcFinding, QcKind};
pub use preflight::PreflightWarning;
