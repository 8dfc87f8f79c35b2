//! Codon choice for linkers and silent-site removal
//!
//! Each organism lists its codons per amino acid in order of preference.
//! Linker back-translation walks that list greedily, skipping codons that
//! would create a homopolymer run of five or repeat the previous codon.

use serde::{Deserialize, Serialize};

use crate::engines::compute::string_ops::{kmp_search, longest_homopolymer, reverse_complement_dna};

/// Longest homopolymer run tolerated inside a back-translated linker
pub const MAX_LINKER_HOMOPOLYMER: usize = 4;

type CodonTable = [(u8, &'static [&'static str]); 21];

const E_COLI: CodonTable = [
    (b'A', &["GCT", "GCC", "GCA", "GCG"]),
    (b'C', &["TGT", "TGC"]),
    (b'D', &["GAT", "GAC"]),
    (b'E', &["GAA", "GAG"]),
    (b'F', &["TTT", "TTC"]),
    (b'G', &["GGT", "GGC", "GGA", "GGG"]),
    (b'H', &["CAT", "CAC"]),
    (b'I', &["ATT", "ATC", "ATA"]),
    (b'K', &["AAA", "AAG"]),
    (b'L', &["CTG", "TTG", "CTT", "CTA", "CTC", "TTA"]),
    (b'M', &["ATG"]),
    (b'N', &["AAT", "AAC"]),
    (b'P', &["CCT", "CCC", "CCA", "CCG"]),
    (b'Q', &["CAA", "CAG"]),
    (b'R', &["CGT", "CGC", "CGA", "AGA", "AGG", "CGG"]),
    (b'S', &["TCT", "TCC", "TCA", "TCG", "AGC", "AGT"]),
    (b'T', &["ACT", "ACC", "ACA", "ACG"]),
    (b'V', &["GTT", "GTC", "GTA", "GTG"]),
    (b'W', &["TGG"]),
    (b'Y', &["TAT", "TAC"]),
    (b'*', &["TAA", "TGA", "TAG"]),
];

const S_CEREVISIAE: CodonTable = [
    (b'A', &["GCT", "GCC", "GCA", "GCG"]),
    (b'C', &["TGT", "TGC"]),
    (b'D', &["GAT", "GAC"]),
    (b'E', &["GAA", "GAG"]),
    (b'F', &["TTT", "TTC"]),
    (b'G', &["GGT", "GGA", "GGC", "GGG"]),
    (b'H', &["CAT", "CAC"]),
    (b'I', &["ATT", "ATC", "ATA"]),
    (b'K', &["AAA", "AAG"]),
    (b'L', &["TTG", "TTA", "CTT", "CTA", "CTG", "CTC"]),
    (b'M', &["ATG"]),
    (b'N', &["AAT", "AAC"]),
    (b'P', &["CCT", "CCA", "CCC", "CCG"]),
    (b'Q', &["CAA", "CAG"]),
    (b'R', &["AGA", "AGG", "CGA", "CGT", "CGC", "CGG"]),
    (b'S', &["TCT", "TCC", "TCA", "TCG", "AGC", "AGT"]),
    (b'T', &["ACT", "ACA", "ACC", "ACG"]),
    (b'V', &["GTT", "GTA", "GTC", "GTG"]),
    (b'W', &["TGG"]),
    (b'Y', &["TAT", "TAC"]),
    (b'*', &["TAA", "TGA", "TAG"]),
];

const H_SAPIENS: CodonTable = [
    (b'A', &["GCC", "GCT", "GCA", "GCG"]),
    (b'C', &["TGC", "TGT"]),
    (b'D', &["GAT", "GAC"]),
    (b'E', &["GAG", "GAA"]),
    (b'F', &["TTC", "TTT"]),
    (b'G', &["GGC", "GGT", "GGA", "GGG"]),
    (b'H', &["CAC", "CAT"]),
    (b'I', &["ATC", "ATT", "ATA"]),
    (b'K', &["AAG", "AAA"]),
    (b'L', &["CTG", "CTC", "CTA", "CTT", "TTG", "TTA"]),
    (b'M', &["ATG"]),
    (b'N', &["AAC", "AAT"]),
    (b'P', &["CCC", "CCT", "CCA", "CCG"]),
    (b'Q', &["CAG", "CAA"]),
    (b'R', &["CGC", "CGG", "AGA", "AGG", "CGA", "CGT"]),
    (b'S', &["AGC", "TCC", "TCT", "TCA", "TCG", "AGT"]),
    (b'T', &["ACC", "ACT", "ACA", "ACG"]),
    (b'V', &["GTG", "GTC", "GTA", "GTT"]),
    (b'W', &["TGG"]),
    (b'Y', &["TAC", "TAT"]),
    (b'*', &["TAA", "TGA", "TAG"]),
];

/// Expression host whose codon preferences are used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Organism {
    EColi,
    #[default]
    SCerevisiae,
    HSapiens,
}

impl Organism {
    fn table(&self) -> &'static CodonTable {
        match self {
            Organism::EColi => &E_COLI,
            Organism::SCerevisiae => &S_CEREVISIAE,
            Organism::HSapiens => &H_SAPIENS,
        }
    }

    /// Codons for an amino acid, most preferred first
    pub fn codons(&self, amino_acid: u8) -> Option<&'static [&'static str]> {
        let aa = amino_acid.to_ascii_uppercase();
        self.table()
            .iter()
            .find(|(code, _)| *code == aa)
            .map(|(_, codons)| *codons)
    }

    /// Amino acid encoded by a codon ('*' for stop)
    pub fn translate(&self, codon: &[u8]) -> Option<u8> {
        self.table()
            .iter()
            .find(|(_, codons)| codons.iter().any(|c| c.as_bytes() == codon))
            .map(|(aa, _)| *aa)
    }
}

/// Named linker presets
pub fn linker_preset(name: &str) -> Option<&'static str> {
    match name {
        "GGGGS" => Some("GGGGS"),
        "GGGGSx2" => Some("GGGGSGGGGS"),
        "GGGGSx3" => Some("GGGGSGGGGSGGGGS"),
        "GSG" => Some("GSG"),
        "GSx3" => Some("GSGSGS"),
        _ => None,
    }
}

fn codon_fits(dna: &[u8], candidate: &[u8]) -> bool {
    let tail_start = dna.len().saturating_sub(6);
    let mut window = dna[tail_start..].to_vec();
    window.extend_from_slice(candidate);

    let repeats_previous = dna.len() >= 3 && &dna[dna.len() - 3..] == candidate;
    longest_homopolymer(&window) <= MAX_LINKER_HOMOPOLYMER && !repeats_previous
}

/// Back-translate a peptide linker with greedy codon choice
///
/// Residues missing from the table are dropped with a warning. When no codon
/// avoids both a long homopolymer and a repeat, the preferred one is used.
pub fn optimize_linker(peptide: &str, organism: Organism) -> Vec<u8> {
    let mut dna = Vec::with_capacity(peptide.len() * 3);

    for residue in peptide.bytes().filter(|b| !b.is_ascii_whitespace()) {
        let codons = match organism.codons(residue) {
            Some(codons) => codons,
            None => {
                log::warn!("Skipping unknown linker residue {:?}", char::from(residue));
                continue;
            }
        };

        let chosen = codons
            .iter()
            .find(|codon| codon_fits(&dna, codon.as_bytes()))
            .unwrap_or(&codons[0]);
        dna.extend_from_slice(chosen.as_bytes());
    }

    dna
}

/// A silent codon substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodonChange {
    /// Offset of the codon in the coding sequence
    pub position: usize,
    pub from: String,
    pub to: String,
}

/// Result of removing a recognition site from a coding sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Domestication {
    pub sequence: Vec<u8>,
    pub changes: Vec<CodonChange>,
    /// Site occurrences no silent change could remove
    pub unresolved: Vec<usize>,
}

fn site_hits(seq: &[u8], site: &[u8], site_rc: &[u8]) -> Vec<usize> {
    let mut hits = kmp_search(seq, site).unwrap_or_default();
    if site_rc != site {
        hits.extend(kmp_search(seq, site_rc).unwrap_or_default());
    }
    hits.sort_unstable();
    hits.dedup();
    hits
}

/// Remove every occurrence of `site` (either strand) by synonymous changes
///
/// Reading frame starts at offset 0. Codons overlapping a hit are tried in
/// order; a substitution is kept only if it lowers the total hit count.
pub fn domesticate(cds: &[u8], site: &[u8], organism: Organism) -> Domestication {
    let mut sequence = cds.to_vec();
    let mut changes = Vec::new();
    let mut unresolved = Vec::new();

    if site.is_empty() {
        return Domestication { sequence, changes, unresolved };
    }

    let site_rc = reverse_complement_dna(site);
    let mut hits = site_hits(&sequence, site, &site_rc);

    while let Some(&hit) = hits.iter().find(|h| !unresolved.contains(*h)) {
        let first_codon = hit / 3 * 3;
        let last_codon = ((hit + site.len() - 1) / 3 * 3).min(sequence.len().saturating_sub(3));

        let mut fixed = false;
        'codons: for start in (first_codon..=last_codon).step_by(3) {
            if start + 3 > sequence.len() {
                break;
            }
            let current = sequence[start..start + 3].to_vec();
            let Some(aa) = organism.translate(&current) else {
                continue;
            };
            let Some(synonyms) = organism.codons(aa) else {
                continue;
            };

            for synonym in synonyms.iter().map(|c| c.as_bytes()) {
                if synonym == current.as_slice() {
                    continue;
                }
                let mut trial = sequence.clone();
                trial[start..start + 3].copy_from_slice(synonym);
                let trial_hits = site_hits(&trial, site, &site_rc);
                if trial_hits.len() < hits.len() {
                    log::debug!(
                        "Silent change at {}: {} -> {}",
                        start,
                        String::from_utf8_lossy(&current),
                        String::from_utf8_lossy(synonym)
                    );
                    changes.push(CodonChange {
                        position: start,
                        from: String::from_utf8_lossy(&current).into_owned(),
                        to: String::from_utf8_lossy(synonym).into_owned(),
                    });
                    sequence = trial;
                    hits = trial_hits;
                    fixed = true;
                    break 'codons;
                }
            }
        }

        if !fixed {
            log::warn!("No silent change removes the site at {}", hit);
            unresolved.push(hit);
        }
    }

    Domestication { sequence, changes, unresolved }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate_all(organism: Organism, dna: &[u8]) -> Vec<u8> {
        dna.chunks(3).filter_map(|codon| organism.translate(codon)).collect()
    }

    #[test]
    fn test_tables_cover_all_codons() {
        for organism in [Organism::EColi, Organism::SCerevisiae, Organism::HSapiens] {
            let total: usize = organism.table().iter().map(|(_, codons)| codons.len()).sum();
            assert_eq!(total, 64);
            assert_eq!(organism.translate(b"ATG"), Some(b'M'));
            assert_eq!(organism.translate(b"TAA"), Some(b'*'));
            assert_eq!(organism.translate(b"NNN"), None);
        }
    }

    #[test]
    fn test_optimize_linker_preserves_peptide() {
        for organism in [Organism::EColi, Organism::SCerevisiae, Organism::HSapiens] {
            let dna = optimize_linker("GGGGSGGGGS", organism);
            assert_eq!(dna.len(), 30);
            assert_eq!(translate_all(organism, &dna), b"GGGGSGGGGS");
            assert!(longest_homopolymer(&dna) <= MAX_LINKER_HOMOPOLYMER);
            for pair in dna.chunks(3).collect::<Vec<_>>().windows(2) {
                assert_ne!(pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn test_optimize_linker_skips_unknown_residues() {
        let dna = optimize_linker("G-S x", Organism::EColi);
        assert_eq!(translate_all(Organism::EColi, &dna), b"GS");
        assert!(optimize_linker("", Organism::EColi).is_empty());
    }

    #[test]
    fn test_linker_presets() {
        assert_eq!(linker_preset("GGGGSx2"), Some("GGGGSGGGGS"));
        assert_eq!(linker_preset("GSx3"), Some("GSGSGS"));
        assert!(linker_preset("unknown").is_none());
    }

    #[test]
    fn test_domesticate_removes_internal_site() {
        // ATG GAA TTC AAA: EcoRI spans codons 1-2 (E, F)
        let cds = b"ATGGAATTCAAA";
        let result = domesticate(cds, b"GAATTC", Organism::EColi);

        assert!(result.unresolved.is_empty());
        assert_eq!(result.changes.len(), 1);
        assert!(kmp_search(&result.sequence, b"GAATTC").unwrap().is_empty());
        assert_eq!(
            translate_all(Organism::EColi, &result.sequence),
            translate_all(Organism::EColi, cds)
        );
    }

    #[test]
    fn test_domesticate_handles_reverse_strand() {
        // GAGACC is the reverse complement of the BsaI site
        let cds = b"ATGGAGACCAAA";
        let result = domesticate(cds, b"GGTCTC", Organism::HSapiens);

        assert!(result.unresolved.is_empty());
        assert!(kmp_search(&result.sequence, b"GAGACC").unwrap().is_empty());
        assert_eq!(
            translate_all(Organism::HSapiens, &result.sequence),
            translate_all(Organism::HSapiens, cds)
        );
    }

    #[test]
    fn test_domesticate_reports_unfixable_site() {
        // ATG TGG: Met-Trp has no synonymous codons
        let result = domesticate(b"ATGTGG", b"ATGTGG", Organism::EColi);
        assert_eq!(result.unresolved, vec![0]);
        assert_eq!(result.sequence, b"ATGTGG");
    }
}
