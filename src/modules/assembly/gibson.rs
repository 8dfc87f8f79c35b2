//! Gibson overlaps
//!
//! Overlap length is searched from the longest allowed down to the shortest
//! and the first length clearing the target overlap Tm is kept. Nothing
//! clearing it means the shortest overlap is used and the junction is
//! flagged. A source part shorter than the minimum overlap is used whole and
//! never meets the target.

use crate::engines::compute::string_ops::reverse_complement_dna;
use crate::modules::primer::ThermoParams;
use super::junction::{junction_label, to_text, JunctionPlan, JunctionPolicy, Part};
use super::AssemblyJunction;

/// Chosen overlap with its Tm and whether it met the target
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapChoice {
    pub sequence: Vec<u8>,
    pub melting_temp_c: f64,
    pub target_met: bool,
}

/// Search overlap lengths `max_len` down to `min_len`
///
/// `candidate` returns the overlap of a given length taken from the source
/// part, or all of it when the part is shorter. Only overlaps of at least
/// `min_len` bases can meet the target.
pub fn choose_overlap<'a, F>(
    candidate: F,
    min_len: usize,
    max_len: usize,
    target_tm_c: f64,
    params: &ThermoParams,
) -> OverlapChoice
where
    F: Fn(usize) -> &'a [u8],
{
    let min_len = min_len.min(max_len);

    for len in (min_len..=max_len).rev() {
        let seq = candidate(len);
        if seq.len() < len {
            continue;
        }
        let tm = params.overlap_tm(seq);
        if tm >= target_tm_c {
            return OverlapChoice {
                sequence: seq.to_vec(),
                melting_temp_c: tm,
                target_met: true,
            };
        }
    }

    let seq = candidate(min_len);
    let tm = params.overlap_tm(seq);
    if seq.len() < min_len {
        log::warn!(
            "Overlap source is {} bp, below the {} bp minimum; using it whole at {:.1} °C",
            seq.len(),
            min_len,
            tm
        );
    } else {
        log::warn!(
            "No overlap in {}..={} bp reached {:.1} °C; using {} bp at {:.1} °C",
            min_len,
            max_len,
            target_tm_c,
            seq.len(),
            tm
        );
    }
    OverlapChoice {
        sequence: seq.to_vec(),
        melting_temp_c: tm,
        target_met: false,
    }
}

/// Uniform-Tm overlap policy
#[derive(Debug, Clone, PartialEq)]
pub struct GibsonPolicy {
    pub overlap_min_len: usize,
    pub overlap_max_len: usize,
    pub clamp_bases: usize,
    pub target_tm_c: f64,
}

impl JunctionPolicy for GibsonPolicy {
    fn plan(
        &self,
        index: usize,
        upstream: &Part,
        downstream: &Part,
        params: &ThermoParams,
    ) -> JunctionPlan {
        // The junction into the vector's right arm takes its overlap from
        // the vector; every other junction takes it from the upstream part.
        let from_downstream = downstream.is_vector;
        let (min_len, max_len) = (self.overlap_min_len, self.overlap_max_len);
        let target = self.target_tm_c;
        let choice = if from_downstream {
            choose_overlap(|len| downstream.prefix(len), min_len, max_len, target, params)
        } else {
            choose_overlap(|len| upstream.suffix(len), min_len, max_len, target, params)
        };

        let clamp = vec![b'N'; self.clamp_bases];
        let (downstream_forward_tail, upstream_reverse_tail) = if from_downstream {
            let mut tail = reverse_complement_dna(&choice.sequence);
            tail.extend_from_slice(&clamp);
            (Vec::new(), tail)
        } else {
            let mut tail = choice.sequence.clone();
            tail.extend_from_slice(&clamp);
            (tail, Vec::new())
        };

        let status_ok = choice.target_met && choice.melting_temp_c.is_finite();
        log::debug!(
            "Junction {} ({}): {} bp overlap at {:.1} °C",
            index,
            junction_label(upstream, downstream),
            choice.sequence.len(),
            choice.melting_temp_c
        );

        JunctionPlan {
            junction: AssemblyJunction {
                label: junction_label(upstream, downstream),
                overlap_sequence: to_text(&choice.sequence),
                melting_temp_c: choice.melting_temp_c,
                status_ok,
            },
            downstream_forward_tail,
            upstream_reverse_tail,
            inserted_len: self.clamp_bases,
        }
    }
}
