//! Core sequence type
//!
//! A [`Sequence`] holds normalized DNA: upper-case IUPAC codes, FASTA headers
//! and foreign characters already stripped. Values are immutable; every
//! derived form (reverse complement, slices, concatenations) is a new value.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engines::compute::{string_ops, ComputeError};
use super::alphabet::{Alphabet, IupacDnaAlphabet, UnambiguousDnaAlphabet};

/// Error type for sequence operations
#[derive(Error, Debug)]
pub enum SequenceError {
    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(String),

    #[error("Engine error: {0}")]
    Compute(#[from] ComputeError),
}

/// Result type for sequence operations
pub type SequenceResult<T> = Result<T, SequenceError>;

/// Normalized DNA sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    /// Normalized bases
    data: Vec<u8>,
    /// Identifier for the sequence (optional)
    id: Option<String>,
}

impl Sequence {
    /// Normalize raw text into a sequence; never fails
    pub fn normalize(raw: &str) -> Self {
        Self {
            data: string_ops::normalize(raw.as_bytes()),
            id: None,
        }
    }

    /// Create a sequence from bytes that must already be normalized
    pub fn new(data: &[u8]) -> SequenceResult<Self> {
        let alphabet = IupacDnaAlphabet;
        if let Some(pos) = data.iter().position(|&b| !alphabet.is_valid_byte(b)) {
            return Err(SequenceError::InvalidSequence(format!(
                "Byte {:?} at position {} is not an upper-case {} code",
                char::from(data[pos]),
                pos,
                alphabet.name()
            )));
        }

        Ok(Self {
            data: data.to_vec(),
            id: None,
        })
    }

    /// Set the sequence identifier
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Get the sequence length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the sequence as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the sequence as a string
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// True when only A, C, G and T are present
    pub fn is_unambiguous(&self) -> bool {
        UnambiguousDnaAlphabet.is_valid_sequence(&self.data)
    }

    /// Extract `start..end` as a new sequence
    pub fn subsequence(&self, start: usize, end: usize) -> SequenceResult<Self> {
        if start > end || end > self.len() {
            return Err(SequenceError::IndexOutOfBounds(format!(
                "Invalid range {}..{} for sequence of length {}",
                start,
                end,
                self.len()
            )));
        }

        Ok(Self {
            data: self.data[start..end].to_vec(),
            id: self.id.clone(),
        })
    }

    /// First `n` bases, or the whole sequence when shorter
    pub fn prefix(&self, n: usize) -> Self {
        Self {
            data: self.data[..n.min(self.len())].to_vec(),
            id: self.id.clone(),
        }
    }

    /// Last `n` bases, or the whole sequence when shorter
    pub fn suffix(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            data: self.data[start..].to_vec(),
            id: self.id.clone(),
        }
    }

    /// Reverse complement; ambiguity codes become 'N'
    pub fn reverse_complement(&self) -> Self {
        Self {
            data: string_ops::reverse_complement_dna(&self.data),
            id: self.id.clone(),
        }
    }

    /// GC percentage, 0 for an empty sequence
    pub fn gc_percent(&self) -> f64 {
        string_ops::gc_percent(&self.data)
    }

    /// Find all occurrences of a subsequence
    pub fn find_all(&self, pattern: &[u8]) -> SequenceResult<Vec<usize>> {
        Ok(string_ops::kmp_search(&self.data, pattern)?)
    }

    /// Find all occurrences treating the sequence as circular
    pub fn find_all_circular(&self, pattern: &[u8]) -> SequenceResult<Vec<usize>> {
        Ok(string_ops::circular_search(&self.data, pattern)?)
    }

    /// Concatenate with another sequence
    pub fn concatenate(&self, other: &Self) -> Self {
        let mut combined = Vec::with_capacity(self.len() + other.len());
        combined.extend_from_slice(&self.data);
        combined.extend_from_slice(&other.data);

        Self {
            data: combined,
            id: self.id.clone().or_else(|| other.id.clone()),
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<&str> for Sequence {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl AsRef<[u8]> for Sequence {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
