//! USER overhangs
//!
//! Overhangs are short terminal stretches of the neighbouring part whose
//! last base is replaced by the uracil marker; USER enzyme excises it and
//! leaves a single-stranded end. For thermodynamics the marker pairs as T.

use crate::engines::compute::string_ops::reverse_complement_dna;
use crate::modules::primer::ThermoParams;
use super::junction::{junction_label, to_text, JunctionPlan, JunctionPolicy, Part};
use super::AssemblyJunction;

/// Marks the nicking position in an overhang
pub const URACIL: u8 = b'U';

/// Build a uracil-marked overhang from terminal bases
///
/// Keeps the first `len` bases, upper-cases them, replaces anything outside
/// A/C/G/T with A and turns the final base into the marker.
pub fn user_overhang(bases: &[u8], len: usize) -> Vec<u8> {
    let mut overhang: Vec<u8> = bases
        .iter()
        .take(len)
        .map(|b| match b.to_ascii_uppercase() {
            base @ (b'A' | b'C' | b'G' | b'T') => base,
            _ => b'A',
        })
        .collect();

    if let Some(last) = overhang.last_mut() {
        *last = URACIL;
    }
    overhang
}

/// Overlap Tm of an overhang with the marker read as T
pub fn overhang_tm(overhang: &[u8], params: &ThermoParams) -> f64 {
    let as_dna: Vec<u8> = overhang
        .iter()
        .map(|&b| if b == URACIL { b'T' } else { b })
        .collect();
    params.overlap_tm(&as_dna)
}

/// Uracil-tailed overhang policy
#[derive(Debug, Clone, PartialEq)]
pub struct UserPolicy {
    pub overhang_len: usize,
    pub min_overhang_tm_c: f64,
}

impl JunctionPolicy for UserPolicy {
    fn plan(
        &self,
        index: usize,
        upstream: &Part,
        downstream: &Part,
        params: &ThermoParams,
    ) -> JunctionPlan {
        let len = self.overhang_len;

        // Downstream forward primer carries the upstream end, upstream
        // reverse primer carries the (reverse-complemented) downstream start.
        let forward_tail = user_overhang(upstream.suffix(len), len);
        let reverse_tail = user_overhang(&reverse_complement_dna(downstream.prefix(len)), len);

        let tm = overhang_tm(&forward_tail, params);
        let status_ok = tm.is_finite() && tm >= self.min_overhang_tm_c;
        log::debug!(
            "Junction {} ({}): overhang {} at {:.1} °C",
            index,
            junction_label(upstream, downstream),
            to_text(&forward_tail),
            tm
        );

        JunctionPlan {
            junction: AssemblyJunction {
                label: junction_label(upstream, downstream),
                overlap_sequence: to_text(&forward_tail),
                melting_temp_c: tm,
                status_ok,
            },
            downstream_forward_tail: forward_tail,
            upstream_reverse_tail: reverse_tail,
            inserted_len: 0,
        }
    }
}
