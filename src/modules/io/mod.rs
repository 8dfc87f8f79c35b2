//! I/O module
//!
//! This module provides FASTA parsing and formatting for in-memory text.

pub mod fasta;

/// Convenience re-exports
pub use fasta::{clean_fasta, parse_fasta, write_fasta_string, FastaRecord};
