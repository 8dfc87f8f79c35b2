//! Non-blocking input checks
//!
//! Warnings collected before a design run. None of them stop the run; they
//! are attached to the report for the caller to show.

use serde::Serialize;

use crate::engines::compute::string_ops::{kmp_search, reverse_complement_dna};
use crate::modules::seq::alphabet::DEGENERATE_FRACTION_LIMIT;
use crate::modules::seq::InputAnalysis;
use super::params::ThermoParams;

pub const SALT_RANGE_MM: (f64, f64) = (10.0, 200.0);
pub const MG_RANGE_MM: (f64, f64) = (0.5, 5.0);
pub const PRIMER_CONC_RANGE_NM: (f64, f64) = (25.0, 1000.0);
pub const TARGET_TM_RANGE_C: (f64, f64) = (45.0, 75.0);
pub const OVERLAP_RANGE_BP: (usize, usize) = (15, 40);

/// Combined sequence length above which a run gets slow
pub const LARGE_TOTAL_BP: usize = 20_000;

/// Vectors above this are hard to amplify in one piece
pub const LARGE_VECTOR_BP: usize = 15_000;

/// Gibson efficiency drops beyond this many inserts
pub const GIBSON_MAX_FRAGMENTS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreflightWarning {
    pub id: &'static str,
    pub message: String,
}

impl PreflightWarning {
    pub(crate) fn new(id: &'static str, message: String) -> Self {
        log::debug!("Preflight {}: {}", id, message);
        Self { id, message }
    }
}

fn outside(value: f64, (min, max): (f64, f64)) -> bool {
    !value.is_finite() || value < min || value > max
}

/// Buffer and target checks
pub fn check_parameters(params: &ThermoParams, target_tm_c: f64) -> Vec<PreflightWarning> {
    let mut warnings = Vec::new();
    let na = params.salt_mm;
    let conc = params.primer_conc_nm;

    if outside(na, SALT_RANGE_MM) {
        warnings.push(PreflightWarning::new(
            "salt-range",
            format!(
                "Na+ {} mM is outside the recommended {}-{} mM",
                na, SALT_RANGE_MM.0, SALT_RANGE_MM.1
            ),
        ));
    }

    if let Some(mg) = params.mg_mm {
        if outside(mg, MG_RANGE_MM) {
            warnings.push(PreflightWarning::new(
                "magnesium-range",
                format!(
                    "Mg2+ {} mM is outside the recommended {}-{} mM",
                    mg, MG_RANGE_MM.0, MG_RANGE_MM.1
                ),
            ));
        }
    }

    if outside(conc, PRIMER_CONC_RANGE_NM) {
        warnings.push(PreflightWarning::new(
            "primer-concentration-range",
            format!(
                "Primer concentration {} nM is outside the recommended {}-{} nM",
                conc, PRIMER_CONC_RANGE_NM.0, PRIMER_CONC_RANGE_NM.1
            ),
        ));
    }

    if outside(target_tm_c, TARGET_TM_RANGE_C) {
        warnings.push(PreflightWarning::new(
            "target-tm-range",
            format!(
                "Target Tm {} °C is outside the recommended {}-{} °C",
                target_tm_c, TARGET_TM_RANGE_C.0, TARGET_TM_RANGE_C.1
            ),
        ));
    }

    let mg = params.mg_mm.unwrap_or(0.0);
    if mg >= 4.0 && na >= 150.0 {
        warnings.push(PreflightWarning::new(
            "high-mg-and-na",
            "High Mg2+ and Na+ together; duplex stability may be overestimated".to_string(),
        ));
    }

    if na < 5.0 || mg > 10.0 || conc > 5000.0 {
        warnings.push(PreflightWarning::new(
            "outside-model-range",
            "Parameters fall outside the validated range of the nearest-neighbor model".to_string(),
        ));
    }

    warnings
}

/// Normalization and degenerate-base checks over labelled inputs
pub fn check_inputs(kind: &str, inputs: &[(String, InputAnalysis)]) -> Vec<PreflightWarning> {
    let mut warnings = Vec::new();
    if inputs.is_empty() {
        return warnings;
    }

    if inputs.iter().all(|(_, analysis)| !analysis.is_usable()) {
        warnings.push(PreflightWarning::new(
            "no-valid-sequence",
            format!("No valid {} sequence remains after normalization", kind),
        ));
        return warnings;
    }

    let removed: Vec<&str> = inputs
        .iter()
        .filter(|(_, analysis)| analysis.removed_count > 0)
        .map(|(label, _)| label.as_str())
        .collect();
    if !removed.is_empty() {
        let near_three_prime = inputs
            .iter()
            .any(|(_, analysis)| analysis.removed_near_three_prime);
        let mut message = format!(
            "Non-IUPAC characters were removed from {} {} sequence(s): {}",
            removed.len(),
            kind,
            removed.iter().take(4).copied().collect::<Vec<_>>().join(", ")
        );
        if near_three_prime {
            message.push_str("; at least one sits near a 3' end");
        }
        warnings.push(PreflightWarning::new("characters-removed", message));
    }

    let degenerate: Vec<&str> = inputs
        .iter()
        .filter(|(_, analysis)| analysis.has_degenerate_bases())
        .map(|(label, _)| label.as_str())
        .collect();
    if !degenerate.is_empty() {
        let mut message = format!(
            "Degenerate bases in {} {} sequence(s): {}; Tm is undefined until resolved",
            degenerate.len(),
            kind,
            degenerate.iter().take(4).copied().collect::<Vec<_>>().join(", ")
        );
        let heavy: Vec<&str> = inputs
            .iter()
            .filter(|(_, analysis)| analysis.is_heavily_degenerate())
            .map(|(label, _)| label.as_str())
            .collect();
        if !heavy.is_empty() {
            message.push_str(&format!(
                "; more than {:.0}% degenerate: {}",
                DEGENERATE_FRACTION_LIMIT * 100.0,
                heavy.join(", ")
            ));
        }
        warnings.push(PreflightWarning::new("degenerate-bases", message));
    }

    warnings
}

/// Overlap length against the recommended window
pub fn check_overlap_length(overlap_len: usize) -> Option<PreflightWarning> {
    let (min, max) = OVERLAP_RANGE_BP;
    if overlap_len < min {
        Some(PreflightWarning::new(
            "overlap-length",
            format!(
                "{} bp overlap is short (recommended {}-{} bp); assembly efficiency may drop",
                overlap_len, min, max
            ),
        ))
    } else if overlap_len > max {
        Some(PreflightWarning::new(
            "overlap-length",
            format!(
                "{} bp overlap is long (recommended {}-{} bp); off-target assembly may increase",
                overlap_len, min, max
            ),
        ))
    } else {
        None
    }
}

/// Fragment count against a method's limits
pub fn check_fragment_count(
    count: usize,
    min: usize,
    max: Option<usize>,
    method: &str,
) -> Option<PreflightWarning> {
    if count < min {
        return Some(PreflightWarning::new(
            "too-few-fragments",
            format!("{} needs at least {} fragment(s), got {}", method, min, count),
        ));
    }
    match max {
        Some(max) if count > max => Some(PreflightWarning::new(
            "too-many-fragments",
            format!(
                "{} with more than {} fragments has reduced efficiency ({} given)",
                method, max, count
            ),
        )),
        _ => None,
    }
}

/// Total and vector size checks
pub fn check_sizes(total_bp: usize, vector_bp: Option<usize>) -> Vec<PreflightWarning> {
    let mut warnings = Vec::new();

    if total_bp > LARGE_TOTAL_BP {
        warnings.push(PreflightWarning::new(
            "large-input",
            format!("{} bp in total; scanning may be slow", total_bp),
        ));
    }

    if let Some(vector_bp) = vector_bp.filter(|&bp| bp > LARGE_VECTOR_BP) {
        warnings.push(PreflightWarning::new(
            "large-vector",
            format!("{} bp vector; long-range PCR may be needed", vector_bp),
        ));
    }

    warnings
}

fn contains_site(sequence: &[u8], site: &[u8]) -> bool {
    let found = |pattern: &[u8]| {
        kmp_search(sequence, pattern).map_or(false, |hits| !hits.is_empty())
    };
    found(site) || found(&reverse_complement_dna(site))
}

/// Fragments carrying a digest enzyme's site on either strand
///
/// Such a fragment is cut along with the vector and its product falls apart.
pub fn check_internal_sites(
    enzymes: &[(&str, &[u8])],
    fragments: &[(&str, &[u8])],
) -> Option<PreflightWarning> {
    let hits: Vec<String> = enzymes
        .iter()
        .filter(|(_, site)| !site.is_empty())
        .flat_map(|&(enzyme, site)| {
            fragments
                .iter()
                .filter(move |(_, sequence)| contains_site(sequence, site))
                .map(move |(fragment, _)| format!("{} in {}", enzyme, fragment))
        })
        .collect();

    if hits.is_empty() {
        return None;
    }
    Some(PreflightWarning::new(
        "internal-sites",
        format!(
            "Digest site(s) found inside fragments: {}; those fragments will be cut too",
            hits.join(", ")
        ),
    ))
}

/// Junctions whose overhangs are identical or reverse complements of each other
///
/// Two such ends anneal to the wrong partner and scramble the assembly order.
pub fn check_duplicate_overhangs(overhangs: &[(&str, &[u8])]) -> Option<PreflightWarning> {
    let clashes: Vec<String> = overhangs
        .iter()
        .enumerate()
        .flat_map(|(i, (label_a, a))| {
            overhangs[i + 1..]
                .iter()
                .filter(move |(_, b)| !a.is_empty() && (a == b || reverse_complement_dna(a) == *b))
                .map(move |(label_b, _)| format!("{} / {}", label_a, label_b))
        })
        .collect();

    if clashes.is_empty() {
        return None;
    }
    Some(PreflightWarning::new(
        "duplicate-overhangs",
        format!("Junctions share the same overhang: {}", clashes.join(", ")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::seq::analyze_input;

    fn ids(warnings: &[PreflightWarning]) -> Vec<&'static str> {
        warnings.iter().map(|w| w.id).collect()
    }

    #[test]
    fn test_default_parameters_are_quiet() {
        assert!(check_parameters(&ThermoParams::default(), 60.0).is_empty());
        assert!(check_parameters(&ThermoParams::default().with_magnesium(2.0), 60.0).is_empty());
    }

    #[test]
    fn test_parameter_ranges() {
        let params = ThermoParams::new(2.0, 6000.0).with_magnesium(12.0);
        let found = ids(&check_parameters(&params, 80.0));
        assert!(found.contains(&"salt-range"));
        assert!(found.contains(&"magnesium-range"));
        assert!(found.contains(&"primer-concentration-range"));
        assert!(found.contains(&"target-tm-range"));
        assert!(found.contains(&"outside-model-range"));
        assert!(!found.contains(&"high-mg-and-na"));

        let params = ThermoParams::new(160.0, 500.0).with_magnesium(4.5);
        assert_eq!(ids(&check_parameters(&params, 60.0)), vec!["high-mg-and-na"]);

        let params = ThermoParams::new(f64::NAN, 500.0);
        assert!(ids(&check_parameters(&params, 60.0)).contains(&"salt-range"));
    }

    #[test]
    fn test_input_checks() {
        let inputs = vec![
            ("frag1".to_string(), analyze_input("ACGTACGT")),
            ("frag2".to_string(), analyze_input("ACGTACG*T")),
            ("frag3".to_string(), analyze_input("ACGNNACGT")),
        ];
        let warnings = check_inputs("fragment", &inputs);
        assert_eq!(ids(&warnings), vec!["characters-removed", "degenerate-bases"]);
        assert!(warnings[0].message.contains("frag2"));
        assert!(warnings[0].message.contains("3' end"));
        assert!(warnings[1].message.contains("frag3"));
        // 2 of 9 bases degenerate
        assert!(warnings[1].message.contains("more than 10% degenerate: frag3"));

        let light = vec![("frag4".to_string(), analyze_input("ACGTNACGTACGT"))];
        let warnings = check_inputs("fragment", &light);
        assert_eq!(ids(&warnings), vec!["degenerate-bases"]);
        assert!(!warnings[0].message.contains("more than"));

        let empty = vec![("v".to_string(), analyze_input("12345"))];
        assert_eq!(ids(&check_inputs("vector", &empty)), vec!["no-valid-sequence"]);
        assert!(check_inputs("vector", &[]).is_empty());
    }

    #[test]
    fn test_overlap_fragment_and_size_checks() {
        assert!(check_overlap_length(20).is_none());
        assert!(check_overlap_length(10).is_some());
        assert!(check_overlap_length(45).is_some());

        assert!(check_fragment_count(0, 1, None, "Gibson").is_some());
        assert!(check_fragment_count(3, 1, Some(6), "Gibson").is_none());
        assert_eq!(
            check_fragment_count(7, 1, Some(6), "Gibson").map(|w| w.id),
            Some("too-many-fragments")
        );

        assert!(check_sizes(1000, Some(3000)).is_empty());
        assert_eq!(ids(&check_sizes(25_000, Some(16_000))), vec!["large-input", "large-vector"]);
    }

    #[test]
    fn test_internal_sites_on_either_strand() {
        let ecori: (&str, &[u8]) = ("EcoRI", &b"GAATTC"[..]);
        let bsai: (&str, &[u8]) = ("BsaI", &b"GGTCTC"[..]);
        let fragments: Vec<(&str, &[u8])> = vec![
            ("clean", &b"ATGCATGCATGCATGC"[..]),
            ("ecori", &b"ATGCGAATTCATGC"[..]),
            // GAGACC is BsaI's site on the bottom strand
            ("bsai-rc", &b"ATGCGAGACCATGC"[..]),
        ];

        let warning = check_internal_sites(&[ecori, bsai], &fragments).unwrap();
        assert_eq!(warning.id, "internal-sites");
        assert!(warning.message.contains("EcoRI in ecori"));
        assert!(warning.message.contains("BsaI in bsai-rc"));
        assert!(!warning.message.contains("clean"));

        assert!(check_internal_sites(&[ecori], &fragments[..1]).is_none());
        assert!(check_internal_sites(&[], &fragments).is_none());
    }

    #[test]
    fn test_duplicate_overhangs() {
        let overhangs: Vec<(&str, &[u8])> = vec![
            ("a → b", &b"GGCGCGCCU"[..]),
            ("b → c", &b"ATGCATGCU"[..]),
            ("c → d", &b"GGCGCGCCU"[..]),
        ];
        let warning = check_duplicate_overhangs(&overhangs).unwrap();
        assert_eq!(warning.id, "duplicate-overhangs");
        assert!(warning.message.contains("a → b / c → d"));
        assert!(!warning.message.contains("b → c /"));

        // reverse complements anneal just the same
        let mirrored: Vec<(&str, &[u8])> = vec![
            ("a → b", &b"AACCGGTTGC"[..]),
            ("b → c", &b"GCAACCGGTT"[..]),
        ];
        assert!(check_duplicate_overhangs(&mirrored).is_some());

        assert!(check_duplicate_overhangs(&overhangs[..2]).is_none());
    }
}
