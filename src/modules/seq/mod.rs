//! Sequence module
//!
//! This module provides the normalized sequence type, DNA alphabets and
//! raw-input analysis.

pub mod sequence;
pub mod alphabet;

/// Convenience re-exports
pub use sequence::{Sequence, SequenceError, SequenceResult};
pub use alphabet::{
    analyze_input, Alphabet, InputAnalysis, IupacDnaAlphabet, UnambiguousDnaAlphabet,
};
