//! Fixed-length overhangs and coding linkers
//!
//! Used for overlap-extension PCR and linker insertion. No Tm search: each
//! side of a junction borrows a fixed number of terminal bases from its
//! neighbour, so the two products share `2 × overhang_len` bases. A junction
//! with a linker shares the back-translated linker instead.

use std::collections::HashMap;

use crate::engines::compute::string_ops::reverse_complement_dna;
use crate::modules::primer::ThermoParams;
use super::codon::{linker_preset, optimize_linker, Organism};
use super::junction::{junction_label, to_text, JunctionPlan, JunctionPolicy, Part};
use super::{AssemblyJunction, JunctionLinker};

/// Peptide for a linker request; preset names expand, anything else is literal
pub fn resolve_linker(linker: &str) -> &str {
    linker_preset(linker.trim()).unwrap_or(linker)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedOverhangPolicy {
    pub overhang_len: usize,
    pub min_overlap_tm_c: f64,
    /// Linker DNA keyed by junction index
    pub linkers: HashMap<usize, Vec<u8>>,
}

impl FixedOverhangPolicy {
    pub fn new(overhang_len: usize, min_overlap_tm_c: f64) -> Self {
        Self {
            overhang_len,
            min_overlap_tm_c,
            linkers: HashMap::new(),
        }
    }

    /// Back-translate each requested linker for `organism`
    pub fn with_linkers(mut self, linkers: &[JunctionLinker], organism: Organism) -> Self {
        for linker in linkers {
            let peptide = resolve_linker(&linker.peptide);
            let dna = optimize_linker(peptide, organism);
            log::debug!(
                "Linker {} at junction {} back-translated to {} bp",
                peptide,
                linker.junction,
                dna.len()
            );
            self.linkers.insert(linker.junction, dna);
        }
        self
    }
}

impl JunctionPolicy for FixedOverhangPolicy {
    fn plan(
        &self,
        index: usize,
        upstream: &Part,
        downstream: &Part,
        params: &ThermoParams,
    ) -> JunctionPlan {
        let (overlap, forward_tail, reverse_tail) = match self.linkers.get(&index) {
            Some(linker) => (linker.clone(), linker.clone(), reverse_complement_dna(linker)),
            None => {
                let upstream_end = upstream.suffix(self.overhang_len);
                let downstream_start = downstream.prefix(self.overhang_len);
                let mut overlap = upstream_end.to_vec();
                overlap.extend_from_slice(downstream_start);
                (overlap, upstream_end.to_vec(), reverse_complement_dna(downstream_start))
            }
        };

        let tm = params.overlap_tm(&overlap);
        let status_ok = tm.is_finite() && tm >= self.min_overlap_tm_c;
        log::debug!(
            "Junction {} ({}): {} bp shared at {:.1} °C",
            index,
            junction_label(upstream, downstream),
            overlap.len(),
            tm
        );

        JunctionPlan {
            junction: AssemblyJunction {
                label: junction_label(upstream, downstream),
                overlap_sequence: to_text(&overlap),
                melting_temp_c: tm,
                status_ok,
            },
            downstream_forward_tail: forward_tail,
            upstream_reverse_tail: reverse_tail,
            inserted_len: self.linkers.get(&index).map_or(0, Vec::len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_linker() {
        assert_eq!(resolve_linker("GGGGSx2"), "GGGGSGGGGS");
        assert_eq!(resolve_linker("EAAAK"), "EAAAK");
    }

    #[test]
    fn test_natural_junction_shares_both_ends() {
        let upstream = Part::fragment("a", b"TTTTTGCGTACGATC");
        let downstream = Part::fragment("b", b"GGATCCATGCAAAAA");
        let policy = FixedOverhangPolicy::new(5, 10.0);
        let plan = policy.plan(0, &upstream, &downstream, &ThermoParams::default());

        assert_eq!(plan.junction.overlap_sequence, "CGATCGGATC");
        assert_eq!(plan.downstream_forward_tail, b"CGATC");
        // rc(GGATC)
        assert_eq!(plan.upstream_reverse_tail, b"GATCC");
        assert!(plan.junction.status_ok);
    }

    #[test]
    fn test_linker_replaces_natural_overlap() {
        let upstream = Part::fragment("a", b"ATGAAAAAAAAAAAA");
        let downstream = Part::fragment("b", b"ATGCCCCCCCCCCCC");
        let policy = FixedOverhangPolicy::new(20, 40.0).with_linkers(
            &[JunctionLinker {
                junction: 0,
                peptide: "GGGGSx3".to_string(),
            }],
            Organism::EColi,
        );
        let plan = policy.plan(0, &upstream, &downstream, &ThermoParams::default());

        assert_eq!(plan.junction.overlap_sequence.len(), 45);
        assert_eq!(plan.inserted_len, 45);
        assert_eq!(plan.downstream_forward_tail, plan.junction.overlap_sequence.as_bytes());
        assert_eq!(
            plan.upstream_reverse_tail,
            reverse_complement_dna(plan.junction.overlap_sequence.as_bytes())
        );

        // other junctions keep their natural overlap
        let other = policy.plan(1, &upstream, &downstream, &ThermoParams::default());
        assert_eq!(other.junction.overlap_sequence.len(), 30);
        assert_eq!(other.inserted_len, 0);
    }

    #[test]
    fn test_at_rich_junction_is_flagged() {
        let upstream = Part::fragment("a", b"AAAAAAAAAAAAAAAAAAAA");
        let downstream = Part::fragment("b", b"TTTTTTTTTTTTTTTTTTTT");
        let policy = FixedOverhangPolicy::new(5, 40.0);
        let plan = policy.plan(0, &upstream, &downstream, &ThermoParams::default());
        assert!(!plan.junction.status_ok);
    }
}
