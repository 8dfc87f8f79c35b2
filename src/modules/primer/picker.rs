//! Primer-core selection
//!
//! Candidates grow one base at a time from the chosen template end. The first
//! one that reaches the target Tm (within the tolerance band) and ends on a
//! G/C clamp wins; otherwise the longest candidate is returned and marked as
//! not meeting the constraint.

use serde::{Deserialize, Serialize};

use crate::engines::compute::string_ops::reverse_complement_dna;
use super::params::ThermoParams;

/// Chosen template-matching portion of a primer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimerCandidate {
    pub core_sequence: String,
    pub length: usize,
    /// NaN when the core is empty, too short or ambiguous
    pub melting_temp_c: f64,
    pub gc_clamp_ok: bool,
    /// False for the fallback candidate
    pub constraint_met: bool,
}

impl PrimerCandidate {
    fn from_core(core: &[u8], params: &ThermoParams) -> Self {
        Self {
            core_sequence: String::from_utf8_lossy(core).into_owned(),
            length: core.len(),
            melting_temp_c: params.core_tm(core),
            gc_clamp_ok: has_gc_clamp(core),
            constraint_met: false,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.core_sequence.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// 3' terminal base is G or C
pub fn has_gc_clamp(core: &[u8]) -> bool {
    matches!(core.last(), Some(b'G') | Some(b'C'))
}

/// Constrained primer-core search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimerPicker {
    pub params: ThermoParams,
    pub min_len: usize,
    pub max_len: usize,
    /// Accept candidates this far below the target Tm
    pub tolerance_c: f64,
}

impl Default for PrimerPicker {
    fn default() -> Self {
        Self {
            params: ThermoParams::default(),
            min_len: 18,
            max_len: 28,
            tolerance_c: 0.5,
        }
    }
}

impl PrimerPicker {
    pub fn new(params: ThermoParams, min_len: usize, max_len: usize) -> Self {
        Self {
            params,
            min_len: min_len.min(max_len),
            max_len: max_len.max(min_len),
            ..Self::default()
        }
    }

    /// Pick a forward core from the 5' end of `template`
    pub fn pick_forward(&self, template: &[u8], target_tm_c: f64) -> PrimerCandidate {
        self.pick(template.len(), target_tm_c, |len| template[..len].to_vec())
    }

    /// Pick a reverse core: reverse complement of the 3' end of `template`
    pub fn pick_reverse(&self, template: &[u8], target_tm_c: f64) -> PrimerCandidate {
        let n = template.len();
        self.pick(n, target_tm_c, |len| reverse_complement_dna(&template[n - len..]))
    }

    fn pick<F>(&self, template_len: usize, target_tm_c: f64, core_of_len: F) -> PrimerCandidate
    where
        F: Fn(usize) -> Vec<u8>,
    {
        if template_len == 0 {
            log::warn!("Primer pick on an empty template");
            return PrimerCandidate::from_core(&[], &self.params);
        }

        // Short templates cap the search at their own length
        let max_len = self.max_len.min(template_len);
        let min_len = self.min_len.min(max_len);
        let threshold = target_tm_c - self.tolerance_c;

        for len in min_len..=max_len {
            let core = core_of_len(len);
            let mut candidate = PrimerCandidate::from_core(&core, &self.params);
            if candidate.gc_clamp_ok && candidate.melting_temp_c >= threshold {
                candidate.constraint_met = true;
                log::debug!(
                    "Picked {} nt core at {:.1} °C (target {:.1} °C)",
                    len,
                    candidate.melting_temp_c,
                    target_tm_c
                );
                return candidate;
            }
        }

        let fallback = PrimerCandidate::from_core(&core_of_len(max_len), &self.params);
        log::warn!(
            "No core in {}..={} nt reached {:.1} °C with a GC clamp; using {} nt at {:.1} °C",
            min_len,
            max_len,
            target_tm_c,
            max_len,
            fallback.melting_temp_c
        );
        fallback
    }
}

/// Pick a forward primer core with explicit parameters
pub fn pick_forward(
    template: &[u8],
    target_tm_c: f64,
    salt_mm: f64,
    primer_conc_nm: f64,
    min_len: usize,
    max_len: usize,
) -> PrimerCandidate {
    PrimerPicker::new(ThermoParams::new(salt_mm, primer_conc_nm), min_len, max_len)
        .pick_forward(template, target_tm_c)
}

/// Pick a reverse primer core with explicit parameters
pub fn pick_reverse(
    template: &[u8],
    target_tm_c: f64,
    salt_mm: f64,
    primer_conc_nm: f64,
    min_len: usize,
    max_len: usize,
) -> PrimerCandidate {
    PrimerPicker::new(ThermoParams::new(salt_mm, primer_conc_nm), min_len, max_len)
        .pick_reverse(template, target_tm_c)
}
