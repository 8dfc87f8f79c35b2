//! Junction policy seam
//!
//! A junction joins the 3' end of an upstream part to the 5' end of a
//! downstream part. Each assembly method implements [`JunctionPolicy`] and
//! returns the overlap plus the 5' tails the two neighbouring primers carry.

use crate::modules::primer::ThermoParams;
use super::AssemblyJunction;

/// One part of the assembly as seen by a junction
#[derive(Debug, Clone, Copy)]
pub struct Part<'a> {
    pub name: &'a str,
    /// Whole part; only its terminal bases are used
    pub sequence: &'a [u8],
    pub is_vector: bool,
}

impl<'a> Part<'a> {
    pub fn fragment(name: &'a str, sequence: &'a [u8]) -> Self {
        Self { name, sequence, is_vector: false }
    }

    pub fn vector(sequence: &'a [u8]) -> Self {
        Self { name: "Vector", sequence, is_vector: true }
    }

    /// Last `n` bases, or the whole part when shorter
    pub fn suffix(&self, n: usize) -> &'a [u8] {
        &self.sequence[self.sequence.len().saturating_sub(n)..]
    }

    /// First `n` bases, or the whole part when shorter
    pub fn prefix(&self, n: usize) -> &'a [u8] {
        &self.sequence[..n.min(self.sequence.len())]
    }
}

/// Junction row plus the primer tails it implies
#[derive(Debug, Clone, PartialEq)]
pub struct JunctionPlan {
    pub junction: AssemblyJunction,
    /// 5' tail of the downstream part's forward primer
    pub downstream_forward_tail: Vec<u8>,
    /// 5' tail of the upstream part's reverse primer
    pub upstream_reverse_tail: Vec<u8>,
    /// Bases the junction adds to the assembly (spacers, linkers)
    pub inserted_len: usize,
}

/// Per-method junction design
pub trait JunctionPolicy: Sync {
    fn plan(
        &self,
        index: usize,
        upstream: &Part,
        downstream: &Part,
        params: &ThermoParams,
    ) -> JunctionPlan;
}

pub fn junction_label(upstream: &Part, downstream: &Part) -> String {
    format!("{} → {}", upstream.name, downstream.name)
}

pub(crate) fn to_text(seq: &[u8]) -> String {
    String::from_utf8_lossy(seq).into_owned()
}
