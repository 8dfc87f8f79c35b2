//! Intramolecular stem-loop detection

use serde::Serialize;

use super::string_ops::is_complementary;

/// Default minimum unpaired loop length
pub const DEFAULT_MIN_LOOP: usize = 3;

/// Default minimum stem length reported
pub const DEFAULT_MIN_STEM: usize = 5;

/// Longest stem-loop found in a single oligo
///
/// The stem pairs `stem_start..loop_start` with `loop_end..=stem_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HairpinResult {
    pub stem_length: usize,
    /// First unpaired loop base
    pub loop_start: usize,
    /// One past the last unpaired loop base
    pub loop_end: usize,
}

impl HairpinResult {
    /// 5'-most base of the 5' stem arm
    pub fn stem_start(&self) -> usize {
        self.loop_start - self.stem_length
    }

    /// 3'-most base of the 3' stem arm (inclusive)
    pub fn stem_end(&self) -> usize {
        self.loop_end + self.stem_length - 1
    }

    pub fn loop_length(&self) -> usize {
        self.loop_end - self.loop_start
    }

    /// The 3' stem arm ends within `window` bases of the oligo's 3' terminus
    pub fn is_three_prime_proximal(&self, oligo_len: usize, window: usize) -> bool {
        oligo_len > 0 && self.stem_end() + window >= oligo_len
    }
}

/// Scan an oligo for its longest hairpin stem
///
/// Every loop span `[i, j)` with `j - i >= min_loop` is tried; the bases
/// flanking the loop are paired outward while they stay complementary. The
/// longest stem wins, ties go to the stem ending nearest the 3' end.
pub fn scan(seq: &[u8], min_loop: usize, min_stem: usize) -> Option<HairpinResult> {
    let n = seq.len();
    let min_loop = min_loop.max(1);
    if n < min_loop + 2 {
        return None;
    }

    let mut best: Option<HairpinResult> = None;

    for loop_start in 1..n {
        for loop_end in (loop_start + min_loop)..n {
            let mut stem = 0;
            while stem < loop_start
                && loop_end + stem < n
                && is_complementary(seq[loop_start - 1 - stem], seq[loop_end + stem])
            {
                stem += 1;
            }

            if stem == 0 {
                continue;
            }

            let candidate = HairpinResult {
                stem_length: stem,
                loop_start,
                loop_end,
            };

            let better = match &best {
                None => true,
                Some(current) => {
                    (candidate.stem_length, candidate.stem_end())
                        > (current.stem_length, current.stem_end())
                }
            };
            if better {
                best = Some(candidate);
            }
        }
    }

    best.filter(|hairpin| hairpin.stem_length >= min_stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_stem_loop() {
        let seq = b"GGGGGAAATCCCCC";
        let hairpin = scan(seq, DEFAULT_MIN_LOOP, DEFAULT_MIN_STEM).unwrap();
        assert!(hairpin.stem_length >= 5);
        assert_eq!(hairpin.stem_start(), 0);
        assert_eq!(hairpin.stem_end(), seq.len() - 1);
        assert_eq!(hairpin.loop_start, 5);
        assert_eq!(hairpin.loop_end, 9);
        assert!(hairpin.is_three_prime_proximal(seq.len(), 5));
    }

    #[test]
    fn test_no_hairpin() {
        assert!(scan(b"AAAAAAAAAAAAAAAA", 3, 5).is_none());
        assert!(scan(b"", 3, 5).is_none());
        assert!(scan(b"GC", 3, 1).is_none());
    }

    #[test]
    fn test_loop_too_short() {
        // GGGGG/CCCCC separated by a two-base loop only
        assert!(scan(b"GGGGGAACCCCC", 3, 5).is_none());
        assert!(scan(b"GGGGGAACCCCC", 2, 5).is_some());
    }

    #[test]
    fn test_internal_hairpin_is_not_three_prime_proximal() {
        let seq = b"GGGGGAAATCCCCCTTTTTTTTTTTT";
        let hairpin = scan(seq, 3, 5).unwrap();
        assert_eq!(hairpin.stem_length, 5);
        assert!(!hairpin.is_three_prime_proximal(seq.len(), 5));
    }

    #[test]
    fn test_tie_prefers_three_prime_stem() {
        // two independent 5-bp stems; the second sits at the 3' end
        let seq = b"GACTGTTTTCAGTCAAAAACTGACTTTTGTCAG";
        let hairpin = scan(seq, 3, 5).unwrap();
        assert_eq!(hairpin.stem_length, 5);
        assert_eq!(hairpin.stem_end(), seq.len() - 1);
    }
}
