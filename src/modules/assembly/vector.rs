//! Vector linearization
//!
//! A circular vector is opened either by restriction digest or by inverse
//! PCR with a user-supplied primer pair. Either way the result is the linear
//! backbone product: its 3' end is the left arm that precedes the insert and
//! its 5' start is the right arm that follows it.

use serde::{Deserialize, Serialize};

use crate::engines::compute::string_ops::{circular_slice, normalize, reverse_complement_dna};
use crate::modules::seq::Sequence;
use super::{DesignError, DesignResult};

/// How a restriction enzyme cuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnzymeKind {
    /// Cuts inside a palindromic site
    Palindromic,
    /// Cuts outside an asymmetric site
    TypeIIS,
}

/// Restriction enzyme with its recognition site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enzyme {
    pub name: String,
    pub site: Vec<u8>,
    pub kind: EnzymeKind,
}

const ENZYMES: &[(&str, &str, EnzymeKind)] = &[
    ("EcoRI", "GAATTC", EnzymeKind::Palindromic),
    ("XhoI", "CTCGAG", EnzymeKind::Palindromic),
    ("BamHI", "GGATCC", EnzymeKind::Palindromic),
    ("HindIII", "AAGCTT", EnzymeKind::Palindromic),
    ("NotI", "GCGGCCGC", EnzymeKind::Palindromic),
    ("BsaI", "GGTCTC", EnzymeKind::TypeIIS),
    ("BsmBI", "CGTCTC", EnzymeKind::TypeIIS),
    ("Esp3I", "CGTCTC", EnzymeKind::TypeIIS),
    ("BbsI", "GAAGAC", EnzymeKind::TypeIIS),
];

impl Enzyme {
    /// Look up a known enzyme by name (case-insensitive)
    pub fn lookup(name: &str) -> DesignResult<Self> {
        ENZYMES
            .iter()
            .find(|(known, _, _)| known.eq_ignore_ascii_case(name.trim()))
            .map(|(known, site, kind)| Self {
                name: known.to_string(),
                site: site.as_bytes().to_vec(),
                kind: *kind,
            })
            .ok_or_else(|| DesignError::UnknownEnzyme(name.to_string()))
    }

    /// A user-supplied recognition site; palindromic sites cut inside
    pub fn custom(site: &str) -> DesignResult<Self> {
        let site = normalize(site.as_bytes());
        if site.is_empty() {
            return Err(DesignError::InputEmpty {
                what: "custom recognition site".to_string(),
            });
        }
        let kind = if reverse_complement_dna(&site) == site {
            EnzymeKind::Palindromic
        } else {
            EnzymeKind::TypeIIS
        };
        Ok(Self {
            name: format!("site {}", String::from_utf8_lossy(&site)),
            site,
            kind,
        })
    }

    /// Names of the built-in enzymes
    pub fn known_names() -> impl Iterator<Item = &'static str> {
        ENZYMES.iter().map(|(name, _, _)| *name)
    }
}

/// Enzyme selector as given by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EnzymeSpec {
    Named(String),
    Site(String),
}

impl EnzymeSpec {
    pub fn resolve(&self) -> DesignResult<Enzyme> {
        match self {
            EnzymeSpec::Named(name) => Enzyme::lookup(name),
            EnzymeSpec::Site(site) => Enzyme::custom(site),
        }
    }
}

/// How the vector is opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Linearization {
    /// Sequence is already the linear backbone
    Linear,
    /// Single enzyme; Type IIS enzymes drop the cassette between a site pair
    Digest { enzyme: EnzymeSpec },
    /// Left arm ends at the first enzyme, right arm starts after the second
    DoubleDigest { first: EnzymeSpec, second: EnzymeSpec },
    /// Outward-facing primer pair
    Pcr { forward_primer: String, reverse_primer: String },
}

impl Linearization {
    /// Enzymes used to open the vector; empty for linear and PCR inputs
    pub fn enzymes(&self) -> DesignResult<Vec<Enzyme>> {
        match self {
            Linearization::Linear | Linearization::Pcr { .. } => Ok(Vec::new()),
            Linearization::Digest { enzyme } => Ok(vec![enzyme.resolve()?]),
            Linearization::DoubleDigest { first, second } => {
                Ok(vec![first.resolve()?, second.resolve()?])
            }
        }
    }
}

/// Vector sequence plus how to open it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorInput {
    /// Raw text, FASTA or plain
    pub sequence: String,
    pub linearization: Linearization,
}

/// Opened vector backbone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinearizedVector {
    /// Backbone from the right arm's first base round to the left arm's last
    pub product: Vec<u8>,
    /// Full circular length before opening
    pub circular_length: usize,
    /// Vector primers when opened by PCR (forward, reverse)
    pub primers: Option<(Vec<u8>, Vec<u8>)>,
    pub description: String,
}

impl LinearizedVector {
    pub fn len(&self) -> usize {
        self.product.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product.is_empty()
    }

    /// Last `n` bases of the left arm
    pub fn left_flank(&self, n: usize) -> &[u8] {
        &self.product[self.product.len().saturating_sub(n)..]
    }

    /// First `n` bases of the right arm
    pub fn right_flank(&self, n: usize) -> &[u8] {
        &self.product[..n.min(self.product.len())]
    }
}

fn circular_distance(from: usize, to: usize, n: usize) -> usize {
    (to + n - from % n) % n
}

fn find_sites(vector: &Sequence, site: &[u8]) -> DesignResult<Vec<usize>> {
    Ok(vector.find_all_circular(site)?)
}

fn locate_failure(landmark: String, vector: &Sequence) -> DesignError {
    DesignError::LocateFailure {
        landmark,
        target: format!("vector ({} bp)", vector.len()),
    }
}

/// Cut span `(left_end, right_start)` for a single enzyme
fn enzyme_cut(vector: &Sequence, enzyme: &Enzyme) -> DesignResult<(usize, usize)> {
    let n = vector.len();
    let site_len = enzyme.site.len();
    let forward = find_sites(vector, &enzyme.site)?;

    match enzyme.kind {
        EnzymeKind::Palindromic => forward
            .first()
            .map(|&pos| (pos, (pos + site_len) % n))
            .ok_or_else(|| locate_failure(format!("{} site", enzyme.name), vector)),
        EnzymeKind::TypeIIS => {
            let reverse = find_sites(vector, &reverse_complement_dna(&enzyme.site))?;
            let mut best: Option<(usize, usize, usize)> = None;
            for &i in &forward {
                for &j in &reverse {
                    let dist = circular_distance(i, j, n);
                    if dist > site_len && best.map_or(true, |(_, _, d)| dist < d) {
                        best = Some((i, j, dist));
                    }
                }
            }
            best.map(|(i, j, _)| (i, (j + site_len) % n))
                .ok_or_else(|| locate_failure(format!("{} site pair", enzyme.name), vector))
        }
    }
}

/// Locate the vector primers and pick the pairing with the smallest gap
///
/// The forward primer must match the vector and the reverse primer must
/// match its reverse complement. The gap runs from the end of the reverse
/// primer's site to the start of the forward primer's site; ties go to the
/// first pair in scan order.
pub fn locate_primer_flanks(
    vector: &Sequence,
    forward_primer: &[u8],
    reverse_primer: &[u8],
) -> DesignResult<(usize, usize)> {
    if forward_primer.is_empty() {
        return Err(DesignError::InputEmpty {
            what: "vector forward primer".to_string(),
        });
    }
    if reverse_primer.is_empty() {
        return Err(DesignError::InputEmpty {
            what: "vector reverse primer".to_string(),
        });
    }

    let n = vector.len();
    let reverse_site = reverse_complement_dna(reverse_primer);
    let forward_hits = find_sites(vector, forward_primer)?;
    let reverse_hits = find_sites(vector, &reverse_site)?;

    if forward_hits.is_empty() {
        return Err(locate_failure(
            format!("forward primer {}", String::from_utf8_lossy(forward_primer)),
            vector,
        ));
    }
    if reverse_hits.is_empty() {
        return Err(locate_failure(
            format!("reverse primer {}", String::from_utf8_lossy(reverse_primer)),
            vector,
        ));
    }

    let mut best: Option<(usize, usize, usize)> = None;
    let mut tied = false;
    for &f in &forward_hits {
        for &r in &reverse_hits {
            let r_end = (r + reverse_site.len()) % n;
            let gap = circular_distance(r_end, f, n);
            match best {
                Some((_, _, g)) if gap == g => tied = true,
                Some((_, _, g)) if gap > g => {}
                _ => {
                    best = Some((f, r_end, gap));
                    tied = false;
                }
            }
        }
    }

    let (f, r_end, gap) =
        best.ok_or_else(|| locate_failure("vector primer pair".to_string(), vector))?;
    if tied {
        log::debug!("Several primer pairings share the minimal {} bp gap; using the first", gap);
    }
    Ok((f, r_end))
}

/// Open the vector as requested
pub fn linearize(input: &VectorInput) -> DesignResult<LinearizedVector> {
    let vector = crate::modules::io::clean_fasta(&input.sequence);
    if vector.is_empty() {
        return Err(DesignError::InputEmpty {
            what: "vector".to_string(),
        });
    }
    let n = vector.len();

    // `product` runs from `right_start` round to `left_end`
    let (right_start, left_end, primers, description) = match &input.linearization {
        Linearization::Linear => {
            return Ok(LinearizedVector {
                product: vector.as_bytes().to_vec(),
                circular_length: n,
                primers: None,
                description: "linear vector".to_string(),
            });
        }
        Linearization::Digest { enzyme } => {
            let enzyme = enzyme.resolve()?;
            let (left_end, right_start) = enzyme_cut(&vector, &enzyme)?;
            (right_start, left_end, None, format!("digest: {}", enzyme.name))
        }
        Linearization::DoubleDigest { first, second } => {
            let first = first.resolve()?;
            let second = second.resolve()?;
            let (left_end, _) = enzyme_cut(&vector, &first)?;
            let (_, right_start) = enzyme_cut(&vector, &second)?;
            (
                right_start,
                left_end,
                None,
                format!("double digest: {} (left) / {} (right)", first.name, second.name),
            )
        }
        Linearization::Pcr { forward_primer, reverse_primer } => {
            let forward = normalize(forward_primer.as_bytes());
            let reverse = normalize(reverse_primer.as_bytes());
            let (f, r_end) = locate_primer_flanks(&vector, &forward, &reverse)?;
            (f, r_end, Some((forward, reverse)), "inverse PCR".to_string())
        }
    };

    let mut length = circular_distance(right_start, left_end, n);
    if length == 0 && primers.is_some() {
        // Primers abut: the whole circle is amplified
        length = n;
    }
    let product = circular_slice(vector.as_bytes(), right_start, length);

    log::debug!(
        "Linearized {} bp vector to {} bp ({})",
        n,
        product.len(),
        description
    );

    Ok(LinearizedVector {
        product,
        circular_length: n,
        primers,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(sequence: &str, name: &str) -> DesignResult<LinearizedVector> {
        linearize(&VectorInput {
            sequence: sequence.to_string(),
            linearization: Linearization::Digest {
                enzyme: EnzymeSpec::Named(name.to_string()),
            },
        })
    }

    #[test]
    fn test_enzyme_lookup() {
        assert_eq!(Enzyme::lookup("ecori").unwrap().site, b"GAATTC");
        assert_eq!(Enzyme::lookup("BsaI").unwrap().kind, EnzymeKind::TypeIIS);
        assert!(matches!(Enzyme::lookup("FooI"), Err(DesignError::UnknownEnzyme(_))));
        assert_eq!(Enzyme::custom("gaattc").unwrap().kind, EnzymeKind::Palindromic);
        assert!(Enzyme::custom("--").is_err());
        assert!(Enzyme::known_names().any(|name| name == "NotI"));
    }

    #[test]
    fn test_linearization_enzymes() {
        let double = Linearization::DoubleDigest {
            first: EnzymeSpec::Named("EcoRI".to_string()),
            second: EnzymeSpec::Site("ggatcc".to_string()),
        };
        let sites: Vec<Vec<u8>> = double.enzymes().unwrap().into_iter().map(|e| e.site).collect();
        assert_eq!(sites, vec![b"GAATTC".to_vec(), b"GGATCC".to_vec()]);

        assert!(Linearization::Linear.enzymes().unwrap().is_empty());
        let unknown = Linearization::Digest {
            enzyme: EnzymeSpec::Named("FooI".to_string()),
        };
        assert!(unknown.enzymes().is_err());
    }

    #[test]
    fn test_single_digest_arms() {
        let seq = format!("{}GAATTC{}", "A".repeat(50), "C".repeat(50));
        let lin = digest(&seq, "EcoRI").unwrap();

        assert_eq!(lin.len(), 100);
        assert_eq!(lin.circular_length, 106);
        assert_eq!(lin.left_flank(20), "A".repeat(20).as_bytes());
        assert_eq!(lin.right_flank(20), "C".repeat(20).as_bytes());
        assert!(lin.primers.is_none());
    }

    #[test]
    fn test_missing_site_is_locate_failure() {
        let err = digest(&"ACGT".repeat(20), "NotI").unwrap_err();
        assert!(matches!(err, DesignError::LocateFailure { .. }));
    }

    #[test]
    fn test_type_iis_drops_cassette() {
        let seq = format!("{}GGTCTC{}GAGACC{}", "A".repeat(40), "C".repeat(8), "T".repeat(40));
        let lin = digest(&seq, "BsaI").unwrap();

        assert_eq!(lin.len(), 80);
        assert_eq!(lin.left_flank(10), b"AAAAAAAAAA");
        assert_eq!(lin.right_flank(10), b"TTTTTTTTTT");
    }

    #[test]
    fn test_double_digest() {
        let seq = format!("{}GAATTC{}CTCGAG{}", "A".repeat(30), "G".repeat(10), "T".repeat(30));
        let lin = linearize(&VectorInput {
            sequence: seq,
            linearization: Linearization::DoubleDigest {
                first: EnzymeSpec::Named("EcoRI".to_string()),
                second: EnzymeSpec::Named("XhoI".to_string()),
            },
        })
        .unwrap();

        assert_eq!(lin.len(), 60);
        assert_eq!(lin.left_flank(5), b"AAAAA");
        assert_eq!(lin.right_flank(5), b"TTTTT");
    }

    #[test]
    fn test_pcr_linearization_wraps_origin() {
        // forward site sits at the origin, reverse site at the end
        let left = "GATCGATCCAGTTGACAGTC";
        let right = "TTGCAGGCATCAGTACCATG";
        let seq = format!("{}{}{}", right, "A".repeat(12), left);
        let reverse_primer = String::from_utf8(reverse_complement_dna(left.as_bytes())).unwrap();

        let lin = linearize(&VectorInput {
            sequence: seq,
            linearization: Linearization::Pcr {
                forward_primer: right.to_string(),
                reverse_primer,
            },
        })
        .unwrap();

        assert_eq!(lin.circular_length, 52);
        assert_eq!(lin.len(), 52);
        assert_eq!(lin.right_flank(20), right.as_bytes());
        assert_eq!(lin.left_flank(20), left.as_bytes());
        assert!(lin.primers.is_some());
    }

    #[test]
    fn test_pcr_flank_positions() {
        // gap of 12 A's between reverse site end and forward site start
        let left = "GATCGATCCAGTTGACAGTC";
        let right = "TTGCAGGCATCAGTACCATG";
        let seq = format!("{}{}{}{}", "C".repeat(15), left, "A".repeat(12), right);
        let vector = Sequence::normalize(&seq);
        let reverse_primer = reverse_complement_dna(left.as_bytes());

        let (f, r_end) = locate_primer_flanks(&vector, right.as_bytes(), &reverse_primer).unwrap();
        assert_eq!(r_end, 35);
        assert_eq!(f, 47);
    }

    #[test]
    fn test_pcr_primer_not_found() {
        let err = linearize(&VectorInput {
            sequence: "ACGT".repeat(30),
            linearization: Linearization::Pcr {
                forward_primer: "GGGGGGGGGGGGGGGGGG".to_string(),
                reverse_primer: "CCCCCCCCCCCCCCCCCC".to_string(),
            },
        })
        .unwrap_err();
        match err {
            DesignError::LocateFailure { landmark, target } => {
                assert!(landmark.contains("forward primer"));
                assert!(target.contains("120 bp"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_vector() {
        let err = digest(">only a header\n", "EcoRI").unwrap_err();
        assert!(matches!(err, DesignError::InputEmpty { .. }));
    }
}
