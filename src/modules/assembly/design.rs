//! Design run
//!
//! One call takes a [`DesignRequest`] through five stages:
//! `CollectInputs → LocateVectorFlanks → ComputeJunctions → ComposePrimers →
//! ProduceReport`. Only input collection and vector location can fail; every
//! later stage degrades gracefully and records what it could not satisfy in
//! the QC list.

use std::fmt;

use crate::engines::compute::string_ops::reverse_complement_dna;
use crate::engines::core::parallel::map_ordered;
use crate::modules::primer::picker::has_gc_clamp;
use crate::modules::primer::preflight::{self, GIBSON_MAX_FRAGMENTS};
use crate::modules::primer::qc::screen_pair;
use crate::modules::primer::{
    DesignConfig, PreflightWarning, PrimerCandidate, PrimerPicker, QcFinding, QcKind, ThermoParams,
};
use crate::modules::seq::{analyze_input, InputAnalysis};
use super::fixed::FixedOverhangPolicy;
use super::gibson::GibsonPolicy;
use super::junction::{to_text, JunctionPlan, JunctionPolicy, Part};
use super::user::{UserPolicy, URACIL};
use super::vector::{linearize, Linearization, LinearizedVector};
use super::{
    AssemblyMethod, CorePolicy, DesignError, DesignReport, DesignRequest, DesignResult, PrimerPair,
};

/// Stage of a design run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignStage {
    CollectInputs,
    LocateVectorFlanks,
    ComputeJunctions,
    ComposePrimers,
    ProduceReport,
}

impl fmt::Display for DesignStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DesignStage::CollectInputs => "collect inputs",
            DesignStage::LocateVectorFlanks => "locate vector flanks",
            DesignStage::ComputeJunctions => "compute junctions",
            DesignStage::ComposePrimers => "compose primers",
            DesignStage::ProduceReport => "produce report",
        };
        f.write_str(name)
    }
}

/// Normalized fragment that survived input collection
#[derive(Debug, Clone)]
struct Fragment {
    name: String,
    sequence: Vec<u8>,
}

/// Work item for primer composition
struct FragmentJob<'a> {
    name: &'a str,
    sequence: &'a [u8],
    forward_tail: &'a [u8],
    reverse_tail: &'a [u8],
}

/// Finished primer pair plus the cores behind it
struct ComposedPair {
    pair: PrimerPair,
    forward: PrimerCandidate,
    reverse: PrimerCandidate,
}

struct DesignRun<'a> {
    request: &'a DesignRequest,
    stage: DesignStage,
    warnings: Vec<PreflightWarning>,
}

/// Run a full design
pub fn design(request: &DesignRequest) -> DesignResult<DesignReport> {
    log::info!(
        "Starting {} design with {} fragment(s){}",
        request.method.name(),
        request.fragments.len(),
        if request.vector.is_some() { " and a vector" } else { "" }
    );

    let mut run = DesignRun::new(request);
    let report = run.execute();
    match &report {
        Ok(report) => log::info!(
            "{} design finished: {} primer pair(s), {} junction(s), {} QC finding(s)",
            report.method,
            report.primer_set.len(),
            report.junctions.len(),
            report.qc.len()
        ),
        Err(err) => log::error!("Design run stopped during {}: {}", run.stage, err),
    }
    report
}

impl<'a> DesignRun<'a> {
    fn new(request: &'a DesignRequest) -> Self {
        Self {
            request,
            stage: DesignStage::CollectInputs,
            warnings: Vec::new(),
        }
    }

    fn enter(&mut self, stage: DesignStage) {
        log::debug!("Design stage: {}", stage);
        self.stage = stage;
    }

    fn config(&self) -> &'a DesignConfig {
        &self.request.config
    }

    fn params(&self) -> &'a ThermoParams {
        &self.request.config.thermo
    }

    fn execute(&mut self) -> DesignResult<DesignReport> {
        self.enter(DesignStage::CollectInputs);
        let fragments = self.collect_inputs()?;

        self.enter(DesignStage::LocateVectorFlanks);
        let vector = self.locate_vector_flanks(&fragments)?;

        self.enter(DesignStage::ComputeJunctions);
        let plans = self.compute_junctions(&fragments, vector.as_ref());
        self.check_overhangs(&plans);

        self.enter(DesignStage::ComposePrimers);
        let composed = self.compose_primers(&fragments, vector.as_ref(), &plans);

        self.enter(DesignStage::ProduceReport);
        Ok(self.produce_report(&fragments, vector.as_ref(), plans, composed))
    }

    fn collect_inputs(&mut self) -> DesignResult<Vec<Fragment>> {
        let request = self.request;
        let config = self.config();

        self.warnings
            .extend(preflight::check_parameters(&config.thermo, config.target_tm_c));

        let analyses: Vec<(String, InputAnalysis)> = request
            .fragments
            .iter()
            .map(|fragment| (fragment.name.clone(), analyze_input(&fragment.sequence)))
            .collect();
        self.warnings.extend(preflight::check_inputs("fragment", &analyses));

        if let Some(vector) = &request.vector {
            let analysis = analyze_input(&vector.sequence);
            self.warnings
                .extend(preflight::check_inputs("vector", &[("Vector".to_string(), analysis)]));
        }

        let fragments: Vec<Fragment> = analyses
            .into_iter()
            .filter_map(|(name, analysis)| {
                if analysis.is_usable() {
                    Some(Fragment {
                        name,
                        sequence: analysis.normalized,
                    })
                } else {
                    log::warn!("Dropping fragment {} with no usable sequence", name);
                    None
                }
            })
            .collect();

        if fragments.is_empty() {
            return Err(DesignError::InputEmpty {
                what: "fragment".to_string(),
            });
        }

        let method = &request.method;
        let min_fragments = if request.vector.is_some() { 1 } else { 2 };
        let max_fragments = match method {
            AssemblyMethod::Gibson { .. } => Some(GIBSON_MAX_FRAGMENTS),
            _ => None,
        };
        self.warnings.extend(preflight::check_fragment_count(
            fragments.len(),
            min_fragments,
            max_fragments,
            method.name(),
        ));

        match method {
            AssemblyMethod::Gibson { overlap_min_len, overlap_max_len, .. } => {
                self.warnings.extend(preflight::check_overlap_length(*overlap_min_len));
                if overlap_max_len != overlap_min_len {
                    self.warnings.extend(preflight::check_overlap_length(*overlap_max_len));
                }
            }
            AssemblyMethod::FixedOverhang { overhang_len, .. } => {
                self.warnings.extend(preflight::check_overlap_length(2 * overhang_len));
            }
            AssemblyMethod::User { .. } => {}
        }

        Ok(fragments)
    }

    fn locate_vector_flanks(
        &mut self,
        fragments: &[Fragment],
    ) -> DesignResult<Option<LinearizedVector>> {
        let vector = match &self.request.vector {
            Some(input) => {
                let vector = linearize(input)?;
                self.check_internal_sites(&input.linearization, fragments)?;
                log::debug!(
                    "Vector opened by {} ({} bp backbone)",
                    vector.description,
                    vector.len()
                );
                Some(vector)
            }
            None => None,
        };

        let vector_bp = vector.as_ref().map(|v| v.circular_length);
        let total_bp =
            fragments.iter().map(|f| f.sequence.len()).sum::<usize>() + vector_bp.unwrap_or(0);
        self.warnings.extend(preflight::check_sizes(total_bp, vector_bp));

        Ok(vector)
    }

    /// Fragments the digest would also cut
    fn check_internal_sites(
        &mut self,
        linearization: &Linearization,
        fragments: &[Fragment],
    ) -> DesignResult<()> {
        let enzymes = linearization.enzymes()?;
        let sites: Vec<(&str, &[u8])> = enzymes
            .iter()
            .map(|enzyme| (enzyme.name.as_str(), enzyme.site.as_slice()))
            .collect();
        let named: Vec<(&str, &[u8])> = fragments
            .iter()
            .map(|f| (f.name.as_str(), f.sequence.as_slice()))
            .collect();
        self.warnings.extend(preflight::check_internal_sites(&sites, &named));
        Ok(())
    }

    fn junction_policy(&self, junction_count: usize) -> Box<dyn JunctionPolicy> {
        match &self.request.method {
            AssemblyMethod::Gibson {
                overlap_min_len,
                overlap_max_len,
                clamp_bases,
                ..
            } => Box::new(GibsonPolicy {
                overlap_min_len: *overlap_min_len,
                overlap_max_len: *overlap_max_len,
                clamp_bases: *clamp_bases,
                target_tm_c: self.config().target_tm_c,
            }),
            AssemblyMethod::User { overhang_len, min_overhang_tm_c } => Box::new(UserPolicy {
                overhang_len: *overhang_len,
                min_overhang_tm_c: *min_overhang_tm_c,
            }),
            AssemblyMethod::FixedOverhang { overhang_len, min_overlap_tm_c, linkers, organism } => {
                for linker in linkers.iter().filter(|l| l.junction >= junction_count) {
                    log::warn!(
                        "Ignoring linker {} at junction {}; the assembly has {} junction(s)",
                        linker.peptide,
                        linker.junction,
                        junction_count
                    );
                }
                Box::new(
                    FixedOverhangPolicy::new(*overhang_len, *min_overlap_tm_c)
                        .with_linkers(linkers, *organism),
                )
            }
        }
    }

    /// Junctions strictly left to right over `[vector,] fragments.. [, vector]`
    fn compute_junctions(
        &self,
        fragments: &[Fragment],
        vector: Option<&LinearizedVector>,
    ) -> Vec<JunctionPlan> {
        let mut parts: Vec<Part> = Vec::with_capacity(fragments.len() + 2);
        if let Some(vector) = vector {
            parts.push(Part::vector(&vector.product));
        }
        parts.extend(fragments.iter().map(|f| Part::fragment(&f.name, &f.sequence)));
        if let Some(vector) = vector {
            parts.push(Part::vector(&vector.product));
        }

        let junction_count = parts.len().saturating_sub(1);
        let policy = self.junction_policy(junction_count);
        let params = self.params();

        parts
            .windows(2)
            .enumerate()
            .map(|(index, pair)| policy.plan(index, &pair[0], &pair[1], params))
            .collect()
    }

    /// Repeated overhangs let ends anneal to the wrong partner. Gibson
    /// overlaps are long and Tm-searched, so only the short-overhang
    /// methods are checked.
    fn check_overhangs(&mut self, plans: &[JunctionPlan]) {
        if matches!(self.request.method, AssemblyMethod::Gibson { .. }) {
            return;
        }
        // the uracil marker pairs as T
        let overhangs: Vec<Vec<u8>> = plans
            .iter()
            .map(|plan| {
                plan.junction
                    .overlap_sequence
                    .bytes()
                    .map(|b| if b == URACIL { b'T' } else { b })
                    .collect()
            })
            .collect();
        let labelled: Vec<(&str, &[u8])> = plans
            .iter()
            .zip(&overhangs)
            .map(|(plan, overhang)| (plan.junction.label.as_str(), overhang.as_slice()))
            .collect();
        self.warnings.extend(preflight::check_duplicate_overhangs(&labelled));
    }

    fn core_pair(&self, template: &[u8]) -> (PrimerCandidate, PrimerCandidate) {
        let config = self.config();
        let core = match &self.request.method {
            AssemblyMethod::Gibson { core, .. } => *core,
            _ => CorePolicy::Picker,
        };

        match core {
            CorePolicy::Fixed(len) => {
                let n = template.len();
                let len_used = len.min(n);
                (
                    fixed_core(&template[..len_used], len, &config.thermo),
                    fixed_core(
                        &reverse_complement_dna(&template[n - len_used..]),
                        len,
                        &config.thermo,
                    ),
                )
            }
            CorePolicy::Picker => {
                let picker =
                    PrimerPicker::new(config.thermo, config.primer_min_len, config.primer_max_len);
                (
                    picker.pick_forward(template, config.target_tm_c),
                    picker.pick_reverse(template, config.target_tm_c),
                )
            }
        }
    }

    fn compose_primers(
        &mut self,
        fragments: &[Fragment],
        vector: Option<&LinearizedVector>,
        plans: &[JunctionPlan],
    ) -> (Vec<ComposedPair>, Option<PrimerPair>) {
        // Fragment k sits at part index k + offset
        let offset = usize::from(vector.is_some());
        let jobs: Vec<FragmentJob> = fragments
            .iter()
            .enumerate()
            .map(|(k, fragment)| {
                let part = k + offset;
                FragmentJob {
                    name: &fragment.name,
                    sequence: &fragment.sequence,
                    forward_tail: part
                        .checked_sub(1)
                        .and_then(|j| plans.get(j))
                        .map_or(&[][..], |plan| plan.downstream_forward_tail.as_slice()),
                    reverse_tail: plans
                        .get(part)
                        .map_or(&[][..], |plan| plan.upstream_reverse_tail.as_slice()),
                }
            })
            .collect();

        let composed = {
            let this = &*self;
            map_ordered(&jobs, |job| {
                let (forward, reverse) = this.core_pair(job.sequence);
                let pair = PrimerPair {
                    name: job.name.to_string(),
                    forward_sequence: tailed(job.forward_tail, forward.as_bytes()),
                    reverse_sequence: tailed(job.reverse_tail, reverse.as_bytes()),
                    forward_tm: forward.melting_temp_c,
                    reverse_tm: reverse.melting_temp_c,
                    forward_core: forward.core_sequence.clone(),
                    reverse_core: reverse.core_sequence.clone(),
                    product_length: job.forward_tail.len()
                        + job.sequence.len()
                        + job.reverse_tail.len(),
                };
                ComposedPair { pair, forward, reverse }
            })
        };

        let vector_primers = vector.and_then(|vector| self.vector_primers(vector, plans));
        (composed, vector_primers)
    }

    /// Tailed vector primers; the right arm's tail comes from the last
    /// junction and the left arm's from the first
    fn vector_primers(
        &mut self,
        vector: &LinearizedVector,
        plans: &[JunctionPlan],
    ) -> Option<PrimerPair> {
        let forward_tail = plans
            .last()
            .map_or(&[][..], |plan| plan.downstream_forward_tail.as_slice());
        let reverse_tail = plans
            .first()
            .map_or(&[][..], |plan| plan.upstream_reverse_tail.as_slice());

        let (forward_core, reverse_core) = match &vector.primers {
            Some(primers) => primers,
            None => {
                if !forward_tail.is_empty() || !reverse_tail.is_empty() {
                    self.warnings.push(PreflightWarning::new(
                        "vector-tails-unplaced",
                        format!(
                            "Vector opened by {}; its junction tails can only be added by PCR",
                            vector.description
                        ),
                    ));
                }
                return None;
            }
        };

        let params = self.params();
        Some(PrimerPair {
            name: "Vector".to_string(),
            forward_sequence: tailed(forward_tail, forward_core),
            reverse_sequence: tailed(reverse_tail, reverse_core),
            forward_tm: params.core_tm(forward_core),
            reverse_tm: params.core_tm(reverse_core),
            forward_core: to_text(forward_core),
            reverse_core: to_text(reverse_core),
            product_length: forward_tail.len() + vector.len() + reverse_tail.len(),
        })
    }

    fn produce_report(
        &mut self,
        fragments: &[Fragment],
        vector: Option<&LinearizedVector>,
        plans: Vec<JunctionPlan>,
        (composed, vector_primers): (Vec<ComposedPair>, Option<PrimerPair>),
    ) -> DesignReport {
        let target = self.config().target_tm_c;

        let mut qc: Vec<QcFinding> = map_ordered(&composed, |c| {
            let pair = &c.pair;
            let mut findings = screen_pair(
                &pair.name,
                pair.forward_sequence.as_bytes(),
                pair.reverse_sequence.as_bytes(),
            );
            findings.extend(core_findings(&format!("{} F", pair.name), &c.forward, target));
            findings.extend(core_findings(&format!("{} R", pair.name), &c.reverse, target));
            findings
        })
        .into_iter()
        .flatten()
        .collect();

        if let Some(pair) = &vector_primers {
            qc.extend(screen_pair(
                &pair.name,
                pair.forward_sequence.as_bytes(),
                pair.reverse_sequence.as_bytes(),
            ));
        }

        for plan in plans.iter().filter(|plan| !plan.junction.status_ok) {
            qc.push(QcFinding::new(
                plan.junction.label.clone(),
                QcKind::ConstraintNotMet,
                format!(
                    "{} bp overlap at {:.1} °C does not meet the junction threshold",
                    plan.junction.overlap_sequence.len(),
                    plan.junction.melting_temp_c
                ),
            ));
        }

        let assembled_length = fragments.iter().map(|f| f.sequence.len()).sum::<usize>()
            + vector.map_or(0, LinearizedVector::len)
            + plans.iter().map(|plan| plan.inserted_len).sum::<usize>();

        DesignReport {
            method: self.request.method.name(),
            primer_set: composed.into_iter().map(|c| c.pair).collect(),
            vector_primers,
            junctions: plans.into_iter().map(|plan| plan.junction).collect(),
            qc,
            warnings: std::mem::take(&mut self.warnings),
            linearized_vector_length: vector.map(LinearizedVector::len),
            assembled_length,
        }
    }
}

/// Core of a requested fixed length; short templates give a short core
fn fixed_core(core: &[u8], requested_len: usize, params: &ThermoParams) -> PrimerCandidate {
    PrimerCandidate {
        core_sequence: to_text(core),
        length: core.len(),
        melting_temp_c: params.core_tm(core),
        gc_clamp_ok: has_gc_clamp(core),
        constraint_met: core.len() == requested_len,
    }
}

fn tailed(tail: &[u8], core: &[u8]) -> String {
    let mut primer = String::with_capacity(tail.len() + core.len());
    primer.push_str(&String::from_utf8_lossy(tail));
    primer.push_str(&String::from_utf8_lossy(core));
    primer
}

fn core_findings(label: &str, candidate: &PrimerCandidate, target_tm_c: f64) -> Option<QcFinding> {
    if candidate.constraint_met {
        return None;
    }
    Some(QcFinding::new(
        label,
        QcKind::ConstraintNotMet,
        format!(
            "{} nt core at {:.1} °C (target {:.1} °C, GC clamp {})",
            candidate.length,
            candidate.melting_temp_c,
            target_tm_c,
            if candidate.gc_clamp_ok { "ok" } else { "missing" }
        ),
    ))
}
