//! Assembly module
//!
//! Turns an ordered list of fragments (and optionally a vector) into junction
//! overlaps and a tailed primer set. One engine serves every assembly method;
//! [`AssemblyMethod`] selects the junction policy.

pub mod codon;
pub mod vector;
pub mod junction;
pub mod gibson;
pub mod user;
pub mod fixed;
pub mod design;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::primer::{DesignConfig, PreflightWarning, QcFinding};
use crate::modules::seq::SequenceError;

pub use codon::Organism;
pub use design::design;
pub use vector::{EnzymeSpec, Linearization, LinearizedVector, VectorInput};

/// Error type for design runs
#[derive(Error, Debug)]
pub enum DesignError {
    #[error("No usable {what} sequence after normalization")]
    InputEmpty { what: String },

    #[error("Could not locate {landmark} on {target}")]
    LocateFailure { landmark: String, target: String },

    #[error("Unknown enzyme: {0}")]
    UnknownEnzyme(String),

    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),
}

/// Result type for design runs
pub type DesignResult<T> = Result<T, DesignError>;

/// Where a primer core comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "length", rename_all = "snake_case")]
pub enum CorePolicy {
    /// Fixed number of terminal bases, no Tm search
    Fixed(usize),
    /// Full length/Tm/clamp search
    Picker,
}

/// Amino-acid linker placed at one junction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JunctionLinker {
    /// Junction index, left to right
    pub junction: usize,
    /// Peptide in one-letter code or a preset name such as `GGGGSx2`
    pub peptide: String,
}

/// Assembly method and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AssemblyMethod {
    Gibson {
        overlap_min_len: usize,
        overlap_max_len: usize,
        /// Spacer bases between overlap and core
        clamp_bases: usize,
        core: CorePolicy,
    },
    User {
        overhang_len: usize,
        min_overhang_tm_c: f64,
    },
    FixedOverhang {
        overhang_len: usize,
        min_overlap_tm_c: f64,
        #[serde(default)]
        linkers: Vec<JunctionLinker>,
        #[serde(default)]
        organism: Organism,
    },
}

impl AssemblyMethod {
    pub fn gibson() -> Self {
        AssemblyMethod::Gibson {
            overlap_min_len: 20,
            overlap_max_len: 30,
            clamp_bases: 0,
            core: CorePolicy::Picker,
        }
    }

    pub fn user() -> Self {
        AssemblyMethod::User {
            overhang_len: 9,
            min_overhang_tm_c: 20.0,
        }
    }

    pub fn fixed_overhang() -> Self {
        AssemblyMethod::FixedOverhang {
            overhang_len: 20,
            min_overlap_tm_c: 40.0,
            linkers: Vec::new(),
            organism: Organism::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AssemblyMethod::Gibson { .. } => "Gibson",
            AssemblyMethod::User { .. } => "USER",
            AssemblyMethod::FixedOverhang { .. } => "fixed-overhang",
        }
    }
}

/// One fragment as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentInput {
    pub name: String,
    /// Raw text, FASTA or plain
    pub sequence: String,
}

impl FragmentInput {
    pub fn new(name: &str, sequence: &str) -> Self {
        Self {
            name: name.to_string(),
            sequence: sequence.to_string(),
        }
    }
}

/// Everything a design run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRequest {
    pub fragments: Vec<FragmentInput>,
    #[serde(default)]
    pub vector: Option<VectorInput>,
    pub method: AssemblyMethod,
    #[serde(default)]
    pub config: DesignConfig,
}

/// Overlap between two adjacent parts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyJunction {
    pub label: String,
    pub overlap_sequence: String,
    pub melting_temp_c: f64,
    pub status_ok: bool,
}

/// Primer pair for one part
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimerPair {
    pub name: String,
    pub forward_sequence: String,
    pub reverse_sequence: String,
    /// Core Tm of the forward primer
    pub forward_tm: f64,
    /// Core Tm of the reverse primer
    pub reverse_tm: f64,
    pub forward_core: String,
    pub reverse_core: String,
    /// Expected PCR product length, tails included
    pub product_length: usize,
}

/// Full output of a design run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignReport {
    pub method: &'static str,
    /// One entry per fragment, input order
    pub primer_set: Vec<PrimerPair>,
    /// Vector primers with tails, when the vector was opened by PCR
    pub vector_primers: Option<PrimerPair>,
    /// Left to right
    pub junctions: Vec<AssemblyJunction>,
    pub qc: Vec<QcFinding>,
    pub warnings: Vec<PreflightWarning>,
    pub linearized_vector_length: Option<usize>,
    pub assembled_length: usize,
}

impl DesignReport {
    pub fn all_junctions_ok(&self) -> bool {
        self.junctions.iter().all(|junction| junction.status_ok)
    }
}
