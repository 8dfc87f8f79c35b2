//! Reaction parameters and design configuration

use serde::{Deserialize, Serialize};

use crate::engines::compute::thermo;

/// Buffer conditions consumed by every Tm computation
///
/// Passed explicitly to each call; nothing in the crate keeps a global copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermoParams {
    /// Monovalent cation (Na+) concentration in mM
    pub salt_mm: f64,
    /// Primer strand concentration in nM
    pub primer_conc_nm: f64,
    /// Free Mg2+ in mM, folded into a sodium equivalent when set
    pub mg_mm: Option<f64>,
}

impl Default for ThermoParams {
    fn default() -> Self {
        Self {
            salt_mm: 50.0,
            primer_conc_nm: 500.0,
            mg_mm: None,
        }
    }
}

impl ThermoParams {
    pub fn new(salt_mm: f64, primer_conc_nm: f64) -> Self {
        Self {
            salt_mm,
            primer_conc_nm,
            mg_mm: None,
        }
    }

    pub fn with_magnesium(mut self, mg_mm: f64) -> Self {
        self.mg_mm = Some(mg_mm);
        self
    }

    /// Salt concentration actually fed to the correction term
    pub fn effective_salt_mm(&self) -> f64 {
        thermo::sodium_equivalent_mm(self.salt_mm, self.mg_mm)
    }

    /// Primer-core Tm at the configured primer concentration
    pub fn core_tm(&self, seq: &[u8]) -> f64 {
        thermo::core_melting_temp(seq, self.effective_salt_mm(), self.primer_conc_nm)
    }

    /// Fragment-to-fragment overlap Tm at the fixed reference concentration
    pub fn overlap_tm(&self, seq: &[u8]) -> f64 {
        thermo::overlap_melting_temp(seq, self.effective_salt_mm())
    }
}

/// Settings shared by every design run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    pub thermo: ThermoParams,
    /// Target Tm for primer cores and overlaps, °C
    pub target_tm_c: f64,
    pub primer_min_len: usize,
    pub primer_max_len: usize,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            thermo: ThermoParams::default(),
            target_tm_c: 60.0,
            primer_min_len: 18,
            primer_max_len: 28,
        }
    }
}
