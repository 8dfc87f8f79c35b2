//! Byte-level string operations for DNA sequences
//!
//! This module provides the primitives every other layer builds on:
//! normalization, complementing, GC content and exact substring search.

use super::{ComputeError, ComputeResult};

/// Bases accepted as raw input (unambiguous plus IUPAC degenerate codes)
pub const IUPAC_DNA: &[u8] = b"ACGTRYSWKMBDHVN";

/// Check whether a byte belongs to the accepted input alphabet
#[inline]
pub fn is_accepted_base(base: u8) -> bool {
    IUPAC_DNA.contains(&base)
}

/// Check whether a byte is one of A, C, G, T
#[inline]
pub fn is_unambiguous_base(base: u8) -> bool {
    matches!(base, b'A' | b'C' | b'G' | b'T')
}

/// Normalize raw sequence text
///
/// Lines starting with '>' are FASTA headers and are skipped entirely. The
/// remaining text is upper-cased and every character outside [`IUPAC_DNA`]
/// is dropped. Total: never fails, and empty input yields an empty vector.
pub fn normalize(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());

    for line in raw.split(|&b| b == b'\n') {
        let first = line.iter().find(|b| !b.is_ascii_whitespace());
        if first == Some(&b'>') {
            continue;
        }

        out.extend(
            line.iter()
                .map(|b| b.to_ascii_uppercase())
                .filter(|&b| is_accepted_base(b)),
        );
    }

    out
}

/// Strict Watson-Crick complement of a single base; anything else maps to 'N'
#[inline]
pub fn complement_base(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        _ => b'N',
    }
}

/// Check whether two bases form a Watson-Crick pair
#[inline]
pub fn is_complementary(a: u8, b: u8) -> bool {
    is_unambiguous_base(a) && complement_base(a) == b
}

/// Reverse a sequence in-place
pub fn reverse_in_place(sequence: &mut [u8]) {
    sequence.reverse();
}

/// Complement a DNA sequence in-place
pub fn complement_dna_in_place(sequence: &mut [u8]) {
    for base in sequence.iter_mut() {
        *base = complement_base(*base);
    }
}

/// Reverse-complement a DNA sequence, returning a new vector
pub fn reverse_complement_dna(sequence: &[u8]) -> Vec<u8> {
    let mut result = sequence.to_vec();
    complement_dna_in_place(&mut result);
    reverse_in_place(&mut result);
    result
}

/// Count occurrences of each base in a DNA sequence
pub fn count_bases(sequence: &[u8]) -> [usize; 5] {
    let mut counts = [0, 0, 0, 0, 0]; // A, C, G, T, other

    for &base in sequence {
        match base {
            b'A' | b'a' => counts[0] += 1,
            b'C' | b'c' => counts[1] += 1,
            b'G' | b'g' => counts[2] += 1,
            b'T' | b't' => counts[3] += 1,
            _ => counts[4] += 1,
        }
    }

    counts
}

/// GC percentage over the full length of the sequence
///
/// Returns 0 for an empty sequence rather than NaN.
pub fn gc_percent(sequence: &[u8]) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }

    let counts = count_bases(sequence);
    let gc_count = counts[1] + counts[2];

    (gc_count as f64) / (sequence.len() as f64) * 100.0
}

/// GC fraction in [0, 1]; 0 for an empty sequence
pub fn gc_fraction(sequence: &[u8]) -> f64 {
    gc_percent(sequence) / 100.0
}

/// Length of the longest single-base run
pub fn longest_homopolymer(sequence: &[u8]) -> usize {
    let mut best = 0;
    let mut run = 0;
    let mut prev = None;

    for &base in sequence {
        if Some(base) == prev {
            run += 1;
        } else {
            run = 1;
            prev = Some(base);
        }
        best = best.max(run);
    }

    best
}

/// Perform a substring search with the Knuth-Morris-Pratt algorithm
///
/// Returns every start position, overlapping hits included, in ascending order.
pub fn kmp_search(text: &[u8], pattern: &[u8]) -> ComputeResult<Vec<usize>> {
    if pattern.is_empty() {
        return Err(ComputeError::InvalidInput("Pattern cannot be empty".to_string()));
    }

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let failure_table = compute_kmp_failure_table(pattern);

    let mut matches = Vec::new();
    let mut j = 0; // position in pattern

    for (i, &c) in text.iter().enumerate() {
        while j > 0 && pattern[j] != c {
            j = failure_table[j - 1];
        }

        if pattern[j] == c {
            j += 1;
        }

        if j == pattern.len() {
            matches.push(i + 1 - j);
            j = failure_table[j - 1];
        }
    }

    Ok(matches)
}

/// Compute the failure function table for KMP algorithm
fn compute_kmp_failure_table(pattern: &[u8]) -> Vec<usize> {
    let m = pattern.len();
    let mut failure = vec![0; m];
    let mut j = 0;

    for i in 1..m {
        while j > 0 && pattern[j] != pattern[i] {
            j = failure[j - 1];
        }

        if pattern[j] == pattern[i] {
            j += 1;
        }

        failure[i] = j;
    }

    failure
}

/// Search a circular sequence, reporting hits that wrap across the origin
///
/// Positions are start offsets in `0..text.len()`.
pub fn circular_search(text: &[u8], pattern: &[u8]) -> ComputeResult<Vec<usize>> {
    if pattern.is_empty() {
        return Err(ComputeError::InvalidInput("Pattern cannot be empty".to_string()));
    }
    if text.is_empty() || pattern.len() > text.len() {
        return Ok(Vec::new());
    }

    let mut doubled = Vec::with_capacity(text.len() + pattern.len() - 1);
    doubled.extend_from_slice(text);
    doubled.extend_from_slice(&text[..pattern.len() - 1]);

    Ok(kmp_search(&doubled, pattern)?
        .into_iter()
        .filter(|&pos| pos < text.len())
        .collect())
}

/// Extract `len` bases from a circular sequence starting at `start`
pub fn circular_slice(text: &[u8], start: usize, len: usize) -> Vec<u8> {
    if text.is_empty() {
        return Vec::new();
    }
    text.iter().cycle().skip(start % text.len()).take(len).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(b">seq1 header\nacgt\nNN-xx ry\n"), b"ACGTNNRY");
        assert_eq!(normalize(b""), b"");
        assert_eq!(normalize(b"  >indented header\nGATC"), b"GATC");
        // 'U' is not part of the accepted alphabet
        assert_eq!(normalize(b"ACGU"), b"ACG");
    }

    #[test]
    fn test_reverse_complement_dna() {
        assert_eq!(reverse_complement_dna(b"ACGT"), b"ACGT");
        assert_eq!(reverse_complement_dna(b"AACG"), b"CGTT");
        assert_eq!(reverse_complement_dna(b"ARG"), b"CNT");
        assert_eq!(reverse_complement_dna(b""), b"");
    }

    #[test]
    fn test_count_bases() {
        let counts = count_bases(b"ACGTACGTNNACGT");
        assert_eq!(counts, [3, 3, 3, 3, 2]);
    }

    #[test]
    fn test_gc_percent() {
        assert_eq!(gc_percent(b""), 0.0);
        assert_eq!(gc_percent(b"GC"), 100.0);
        assert_eq!(gc_percent(b"ATAT"), 0.0);
        assert_eq!(gc_percent(b"ACGT"), 50.0);
        // degenerate bases count toward the length
        assert_eq!(gc_percent(b"GCNN"), 50.0);
    }

    #[test]
    fn test_longest_homopolymer() {
        assert_eq!(longest_homopolymer(b""), 0);
        assert_eq!(longest_homopolymer(b"ACGT"), 1);
        assert_eq!(longest_homopolymer(b"AAGGGGGT"), 5);
    }

    #[test]
    fn test_kmp_search() {
        let matches = kmp_search(b"ACGTACGTACGTACGT", b"ACGT").unwrap();
        assert_eq!(matches, vec![0, 4, 8, 12]);

        let matches = kmp_search(b"AAAA", b"AA").unwrap();
        assert_eq!(matches, vec![0, 1, 2]);

        assert!(kmp_search(b"ACGT", b"TTTT").unwrap().is_empty());
        assert!(kmp_search(b"", b"A").unwrap().is_empty());
        assert!(kmp_search(b"ACGT", b"").is_err());
    }

    #[test]
    fn test_circular_search() {
        // "TTAA" wraps from the end back to the origin
        let hits = circular_search(b"AACCGGTT", b"TTAA").unwrap();
        assert_eq!(hits, vec![6]);
        assert_eq!(circular_slice(b"AACCGGTT", 6, 4), b"TTAA");
        assert!(circular_search(b"ACG", b"ACGT").unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn reverse_complement_is_an_involution(s in "[ACGT]{0,64}") {
            let once = reverse_complement_dna(s.as_bytes());
            let twice = reverse_complement_dna(&once);
            prop_assert_eq!(twice, s.as_bytes().to_vec());
        }

        #[test]
        fn normalize_is_idempotent(s in "\\PC{0,80}") {
            let once = normalize(s.as_bytes());
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
