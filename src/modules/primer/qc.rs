//! Oligo quality screening
//!
//! Runs the dimer and hairpin scanners over finished primers and turns their
//! raw results into report findings. The policy thresholds live here, not in
//! the scanners.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::engines::compute::{dimer, hairpin, string_ops::reverse_complement_dna};

/// Shortest contiguous run reported as a dimer
pub const DIMER_MIN_RUN: usize = dimer::DEFAULT_MIN_OVERLAP;

/// Length of the 3' tail checked for palindromes
pub const PALINDROMIC_TAIL_LEN: usize = 6;

/// Stem length that counts as a hairpin risk
pub const HAIRPIN_MIN_STEM: usize = hairpin::DEFAULT_MIN_STEM;

/// A stem ending this close to the 3' terminus is a risk
pub const HAIRPIN_THREE_PRIME_WINDOW: usize = 5;

/// Category of a QC finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QcKind {
    SelfDimer,
    CrossDimer,
    PalindromicTail,
    HairpinRisk,
    ConstraintNotMet,
}

impl fmt::Display for QcKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            QcKind::SelfDimer => "self-dimer",
            QcKind::CrossDimer => "cross-dimer",
            QcKind::PalindromicTail => "palindromic-tail",
            QcKind::HairpinRisk => "hairpin-risk",
            QcKind::ConstraintNotMet => "constraint-not-met",
        };
        f.write_str(name)
    }
}

/// One QC observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QcFinding {
    pub subject_label: String,
    pub kind: QcKind,
    pub detail: String,
    /// Three-line picture of a dimer, A 5'->3' over B 3'->5'
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
}

impl QcFinding {
    pub fn new(subject_label: impl Into<String>, kind: QcKind, detail: impl Into<String>) -> Self {
        Self {
            subject_label: subject_label.into(),
            kind,
            detail: detail.into(),
            alignment: None,
        }
    }

    fn from_dimer(
        subject_label: impl Into<String>,
        kind: QcKind,
        a: &[u8],
        b: &[u8],
        result: &dimer::DimerResult,
    ) -> Self {
        Self {
            alignment: Some(dimer::render_alignment(a, b, result.offset)),
            ..Self::new(subject_label, kind, dimer_detail(result))
        }
    }
}

impl fmt::Display for QcFinding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [{}] {}", self.subject_label, self.kind, self.detail)
    }
}

/// Last six bases equal their own reverse complement
pub fn has_palindromic_tail(oligo: &[u8]) -> bool {
    if oligo.len() < PALINDROMIC_TAIL_LEN {
        return false;
    }
    let tail = &oligo[oligo.len() - PALINDROMIC_TAIL_LEN..];
    reverse_complement_dna(tail) == tail
}

/// Stem of at least five pairs ending near the 3' terminus
pub fn hairpin_risk(oligo: &[u8]) -> Option<hairpin::HairpinResult> {
    hairpin::scan(oligo, hairpin::DEFAULT_MIN_LOOP, HAIRPIN_MIN_STEM)
        .filter(|hp| hp.is_three_prime_proximal(oligo.len(), HAIRPIN_THREE_PRIME_WINDOW))
}

fn dimer_detail(result: &dimer::DimerResult) -> String {
    let end = match (result.touches_a_three_prime, result.touches_b_three_prime) {
        (true, true) => "both 3' ends",
        (true, false) => "3' end of first oligo",
        (false, true) => "3' end of second oligo",
        (false, false) => "internal",
    };
    format!(
        "{} contiguous matches at offset {} ({})",
        result.overlap_length, result.offset, end
    )
}

/// Self-dimer, palindromic tail and hairpin checks for a single oligo
pub fn screen_oligo(label: &str, oligo: &[u8]) -> Vec<QcFinding> {
    let mut findings = Vec::new();

    if let Some(result) = dimer::scan_self(oligo, DIMER_MIN_RUN) {
        findings.push(QcFinding::from_dimer(label, QcKind::SelfDimer, oligo, oligo, &result));
    }

    if has_palindromic_tail(oligo) {
        findings.push(QcFinding::new(
            label,
            QcKind::PalindromicTail,
            format!("{}-bp palindromic 3' tail", PALINDROMIC_TAIL_LEN),
        ));
    }

    if let Some(hp) = hairpin_risk(oligo) {
        findings.push(QcFinding::new(
            label,
            QcKind::HairpinRisk,
            format!(
                "{}-bp stem, loop {}..{}, ends {} nt from 3' end",
                hp.stem_length,
                hp.loop_start,
                hp.loop_end,
                oligo.len() - 1 - hp.stem_end()
            ),
        ));
    }

    findings
}

/// Screen a forward/reverse pair, including their cross-dimer
pub fn screen_pair(name: &str, forward: &[u8], reverse: &[u8]) -> Vec<QcFinding> {
    let mut findings = screen_oligo(&format!("{} F", name), forward);
    findings.extend(screen_oligo(&format!("{} R", name), reverse));

    if let Some(result) = dimer::scan(forward, reverse, DIMER_MIN_RUN) {
        findings.push(QcFinding::from_dimer(
            format!("{} F×R", name),
            QcKind::CrossDimer,
            forward,
            reverse,
            &result,
        ));
    }

    findings
}

/// All-vs-all cross-dimer screen for a multiplex pool
pub fn screen_pool(oligos: &[(String, Vec<u8>)]) -> Vec<QcFinding> {
    oligos
        .iter()
        .tuple_combinations()
        .filter_map(|((label_a, a), (label_b, b))| {
            dimer::scan(a, b, DIMER_MIN_RUN).map(|result| {
                let label = format!("{} × {}", label_a, label_b);
                QcFinding::from_dimer(label, QcKind::CrossDimer, a, b, &result)
            })
        })
        .collect()
}

/// Split oligos into pools with no 3'-involved cross-dimer inside a pool
///
/// Greedy graph colouring: oligos are visited in order of decreasing
/// conflict count and placed in the first compatible pool. Returns pool
/// indices parallel to `oligos`.
pub fn assign_pools(oligos: &[(String, Vec<u8>)]) -> Vec<usize> {
    let n = oligos.len();
    let mut conflicts = vec![Vec::new(); n];

    for (i, j) in (0..n).tuple_combinations() {
        let clash = dimer::scan(&oligos[i].1, &oligos[j].1, DIMER_MIN_RUN)
            .map_or(false, |result| result.touches_three_prime());
        if clash {
            conflicts[i].push(j);
            conflicts[j].push(i);
        }
    }

    let order = (0..n).sorted_by_key(|&i| (std::cmp::Reverse(conflicts[i].len()), i));

    let mut pool_of: Vec<Option<usize>> = vec![None; n];
    for i in order {
        let taken: Vec<usize> = conflicts[i].iter().filter_map(|&j| pool_of[j]).collect();
        let pool = (0..).find(|p| !taken.contains(p)).unwrap_or(0);
        pool_of[i] = Some(pool);
    }

    let pools: Vec<usize> = pool_of.into_iter().map(|p| p.unwrap_or(0)).collect();
    log::debug!(
        "Assigned {} oligos to {} pools",
        n,
        pools.iter().max().map_or(0, |max| max + 1)
    );
    pools
}
