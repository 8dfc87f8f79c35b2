//! Sequence alphabets and raw-input analysis

use serde::Serialize;

use crate::engines::compute::string_ops::{self, is_unambiguous_base};

/// Characters this close to the 3' end are reported separately when removed
pub const THREE_PRIME_WINDOW: usize = 5;

/// Degenerate-base fraction above which a sequence is called heavily
/// degenerate
pub const DEGENERATE_FRACTION_LIMIT: f64 = 0.10;

/// Sequence alphabet
pub trait Alphabet {
    /// Human-readable alphabet name
    fn name(&self) -> &'static str;

    /// Accepted (upper-case) letters
    fn letters(&self) -> &'static [u8];

    fn is_valid_byte(&self, byte: u8) -> bool {
        self.letters().contains(&byte)
    }

    fn is_valid_sequence(&self, data: &[u8]) -> bool {
        data.iter().all(|&b| self.is_valid_byte(b))
    }
}

/// A, C, G, T only
#[derive(Debug, Clone, Copy, Default)]
pub struct UnambiguousDnaAlphabet;

impl Alphabet for UnambiguousDnaAlphabet {
    fn name(&self) -> &'static str {
        "DNA"
    }

    fn letters(&self) -> &'static [u8] {
        b"ACGT"
    }
}

/// DNA with IUPAC degenerate codes
#[derive(Debug, Clone, Copy, Default)]
pub struct IupacDnaAlphabet;

impl Alphabet for IupacDnaAlphabet {
    fn name(&self) -> &'static str {
        "IUPAC DNA"
    }

    fn letters(&self) -> &'static [u8] {
        string_ops::IUPAC_DNA
    }
}

/// Bases an IUPAC code stands for
pub fn expand_code(code: u8) -> &'static [u8] {
    match code.to_ascii_uppercase() {
        b'A' => b"A",
        b'C' => b"C",
        b'G' => b"G",
        b'T' => b"T",
        b'R' => b"AG",
        b'Y' => b"CT",
        b'S' => b"CG",
        b'W' => b"AT",
        b'K' => b"GT",
        b'M' => b"AC",
        b'B' => b"CGT",
        b'D' => b"AGT",
        b'H' => b"ACT",
        b'V' => b"ACG",
        b'N' => b"ACGT",
        _ => b"",
    }
}

/// Resolve every degenerate code to its most stable option (G/C before A/T)
///
/// Gives the worst-case (highest Tm) variant of a degenerate primer. Callers
/// use this before thermodynamics, which only accept A/C/G/T.
pub fn most_stable_variant(data: &[u8]) -> Vec<u8> {
    data.iter()
        .map(|&code| {
            let options = expand_code(code);
            options
                .iter()
                .copied()
                .find(|&b| b == b'G' || b == b'C')
                .or_else(|| options.first().copied())
                .unwrap_or(b'N')
        })
        .collect()
}

/// What normalization did to one raw input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputAnalysis {
    /// Normalized sequence
    pub normalized: Vec<u8>,
    /// Characters dropped (whitespace and header lines excluded)
    pub removed_count: usize,
    /// A dropped character sat within [`THREE_PRIME_WINDOW`] of the 3' end
    pub removed_near_three_prime: bool,
    /// IUPAC codes other than A/C/G/T kept in the sequence
    pub degenerate_count: usize,
}

impl InputAnalysis {
    pub fn degenerate_fraction(&self) -> f64 {
        if self.normalized.is_empty() {
            0.0
        } else {
            self.degenerate_count as f64 / self.normalized.len() as f64
        }
    }

    /// Worth a degenerate-base warning
    pub fn has_degenerate_bases(&self) -> bool {
        self.degenerate_count >= 1
    }

    /// Too degenerate for a most-stable-variant Tm to mean much
    pub fn is_heavily_degenerate(&self) -> bool {
        self.degenerate_fraction() > DEGENERATE_FRACTION_LIMIT
    }

    pub fn is_usable(&self) -> bool {
        !self.normalized.is_empty()
    }
}

/// Compare raw text against its normalized form
pub fn analyze_input(raw: &str) -> InputAnalysis {
    let alphabet = IupacDnaAlphabet;

    // Body characters only: header lines and whitespace are not "removed"
    let cleaned: Vec<u8> = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with('>'))
        .flat_map(|line| line.bytes())
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| b.to_ascii_uppercase())
        .collect();

    let removed_count = cleaned.iter().filter(|&&b| !alphabet.is_valid_byte(b)).count();
    let tail_start = cleaned.len().saturating_sub(THREE_PRIME_WINDOW);
    let removed_near_three_prime = cleaned[tail_start..]
        .iter()
        .any(|&b| !alphabet.is_valid_byte(b));

    let normalized = string_ops::normalize(raw.as_bytes());
    let degenerate_count = normalized.iter().filter(|&&b| !is_unambiguous_base(b)).count();

    InputAnalysis {
        normalized,
        removed_count,
        removed_near_three_prime,
        degenerate_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabets() {
        assert!(UnambiguousDnaAlphabet.is_valid_sequence(b"ACGT"));
        assert!(!UnambiguousDnaAlphabet.is_valid_sequence(b"ACGN"));
        assert!(IupacDnaAlphabet.is_valid_sequence(b"ACGTRYSWKMBDHVN"));
        assert!(!IupacDnaAlphabet.is_valid_sequence(b"ACGU"));
    }

    #[test]
    fn test_expand_code() {
        assert_eq!(expand_code(b'R'), b"AG");
        assert_eq!(expand_code(b'n'), b"ACGT");
        assert!(expand_code(b'X').is_empty());
    }

    #[test]
    fn test_most_stable_variant() {
        assert_eq!(most_stable_variant(b"ACGT"), b"ACGT");
        assert_eq!(most_stable_variant(b"RYWN"), b"GCAC");
    }

    #[test]
    fn test_analyze_clean_input() {
        let analysis = analyze_input(">primer\nACGT ACGT\n");
        assert_eq!(analysis.normalized, b"ACGTACGT");
        assert_eq!(analysis.removed_count, 0);
        assert!(!analysis.removed_near_three_prime);
        assert!(!analysis.has_degenerate_bases());
        assert!(analysis.is_usable());
    }

    #[test]
    fn test_analyze_removed_characters() {
        let analysis = analyze_input("ACG-TACGTACGTAC*G");
        assert_eq!(analysis.removed_count, 2);
        assert!(analysis.removed_near_three_prime);

        let analysis = analyze_input("AC?GTACGTACGTACG");
        assert_eq!(analysis.removed_count, 1);
        assert!(!analysis.removed_near_three_prime);
    }

    #[test]
    fn test_analyze_degenerate_and_empty() {
        let analysis = analyze_input("ACGTNACGTACGT");
        assert_eq!(analysis.degenerate_count, 1);
        assert!(analysis.has_degenerate_bases());
        assert!(!analysis.is_heavily_degenerate());

        let analysis = analyze_input("ACGTNNACGT");
        assert!(analysis.is_heavily_degenerate());

        let analysis = analyze_input("1234");
        assert!(!analysis.is_usable());
        assert_eq!(analysis.degenerate_fraction(), 0.0);
    }
}
