//! Nearest-neighbor melting temperature
//!
//! Unified nearest-neighbor model: ΔH/ΔS are summed over every overlapping
//! dinucleotide, initiation terms are added, and a monovalent salt correction
//! is applied to the 1 M Na+ melting temperature.
//!
//! Parameters: SantaLucia & Hicks (2004), Annu. Rev. Biophys. Biomol. Struct.
//! 33:415-440. Salt correction: Owczarzy et al. (2004), Biochemistry 43:3537.

use super::string_ops::{gc_fraction, reverse_complement_dna};

/// Gas constant in cal/(mol·K)
pub const GAS_CONSTANT: f64 = 1.987;

/// Initiation enthalpy in kcal/mol
pub const INIT_DELTA_H: f64 = 0.2;

/// Initiation entropy in cal/(mol·K)
pub const INIT_DELTA_S: f64 = -5.7;

/// Reference strand concentration for fragment:fragment overlaps (1 µM)
pub const OVERLAP_REFERENCE_CONC_NM: f64 = 1000.0;

const KELVIN: f64 = 273.15;

/// ΔH (kcal/mol), ΔS (cal/mol·K) for the 16 dinucleotide stacks.
///
/// Indexed by `4 * first + second` with A=0, C=1, G=2, T=3.
const NN_TABLE: [(f64, f64); 16] = [
    (-7.6, -21.3),  // AA
    (-8.4, -22.4),  // AC
    (-7.8, -21.0),  // AG
    (-7.2, -20.4),  // AT
    (-8.5, -22.7),  // CA
    (-8.0, -19.9),  // CC
    (-10.6, -27.2), // CG
    (-7.8, -21.0),  // CT
    (-8.2, -22.2),  // GA
    (-9.8, -24.4),  // GC
    (-8.0, -19.9),  // GG
    (-8.4, -22.4),  // GT
    (-7.2, -21.3),  // TA
    (-8.2, -22.2),  // TC
    (-8.5, -22.7),  // TG
    (-7.6, -21.3),  // TT
];

#[inline]
fn base_index(base: u8) -> Option<usize> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// Look up the stack parameters for one dinucleotide
pub fn stack_energy(first: u8, second: u8) -> Option<(f64, f64)> {
    Some(NN_TABLE[base_index(first)? * 4 + base_index(second)?])
}

/// Summed duplex ΔH (kcal/mol) and ΔS (cal/mol·K), initiation included
///
/// `None` when the sequence is shorter than 2 bases or contains anything
/// outside A/C/G/T.
pub fn duplex_energies(seq: &[u8]) -> Option<(f64, f64)> {
    if seq.len() < 2 {
        return None;
    }

    let mut delta_h = INIT_DELTA_H;
    let mut delta_s = INIT_DELTA_S;

    for pair in seq.windows(2) {
        let (h, s) = stack_energy(pair[0], pair[1])?;
        delta_h += h;
        delta_s += s;
    }

    Some((delta_h, delta_s))
}

/// Sodium-equivalent concentration in mM (von Ahsen et al., 2001)
pub fn sodium_equivalent_mm(na_mm: f64, mg_mm: Option<f64>) -> f64 {
    match mg_mm {
        Some(mg) if mg > 0.0 => na_mm + 120.0 * mg.sqrt(),
        _ => na_mm,
    }
}

/// Melting temperature in °C for a strand at `strand_conc_nm` in `salt_mm` monovalent salt
///
/// Non-self-complementary duplexes use C/4 as the effective concentration,
/// self-complementary ones use C. Returns NaN instead of failing.
pub fn melting_temp(seq: &[u8], salt_mm: f64, strand_conc_nm: f64) -> f64 {
    let (delta_h, delta_s) = match duplex_energies(seq) {
        Some(energies) => energies,
        None => return f64::NAN,
    };

    if salt_mm <= 0.0 || strand_conc_nm <= 0.0 {
        return f64::NAN;
    }

    let self_complementary = reverse_complement_dna(seq) == seq;
    let conc_molar = strand_conc_nm * 1e-9;
    let effective_conc = if self_complementary { conc_molar } else { conc_molar / 4.0 };

    let tm_one_molar = 1000.0 * delta_h / (delta_s + GAS_CONSTANT * effective_conc.ln());

    let salt_molar = salt_mm / 1000.0;
    let ln_salt = salt_molar.ln();
    let f_gc = gc_fraction(seq);
    let salt_term = ((4.29 * f_gc - 3.95) * ln_salt + 0.94 * ln_salt * ln_salt) * 1e-5;

    1.0 / (1.0 / tm_one_molar + salt_term) - KELVIN
}

/// Tm of a primer core annealing to template at the user's primer concentration
pub fn core_melting_temp(seq: &[u8], salt_mm: f64, primer_conc_nm: f64) -> f64 {
    melting_temp(seq, salt_mm, primer_conc_nm)
}

/// Tm of an overlap/homology region annealing fragment-to-fragment
///
/// Uses the fixed 1 µM reference concentration regardless of primer concentration.
pub fn overlap_melting_temp(seq: &[u8], salt_mm: f64) -> f64 {
    melting_temp(seq, salt_mm, OVERLAP_REFERENCE_CONC_NM)
}
