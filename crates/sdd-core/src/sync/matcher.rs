use crate::sync::types::{
    sync_rate, CodeLocation, CodeReference, ExtractedRequirement, ParsedSpec, ReferenceKind,
    RequirementStatus, SpecSummary, SyncResult, SyncStatus,
};
use std::collections::{HashMap, HashSet};

/// Joins requirements against code and test references.
///
/// Status policy:
/// - `implemented`: at least one code reference.
/// - `partial`: test references only. Not counted in `total_implemented`
///   or the sync rate, and not listed as missing.
/// - `missing`: no references.
#[derive(Debug, Default, Clone)]
pub struct SyncMatcher {
    spec_titles: HashMap<String, String>,
}

impl SyncMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carry spec titles into the per-spec summaries.
    pub fn with_specs(mut self, specs: &[ParsedSpec]) -> Self {
        for spec in specs {
            if let Some(title) = &spec.title {
                self.spec_titles.insert(spec.id.clone(), title.clone());
            }
        }
        self
    }

    pub fn match_requirements(
        &self,
        requirements: &[ExtractedRequirement],
        code_refs: &[CodeReference],
        test_refs: &[CodeReference],
    ) -> SyncResult {
        let known: HashSet<&str> = requirements.iter().map(|r| r.id.as_str()).collect();

        let mut by_id: HashMap<&str, Vec<&CodeReference>> = HashMap::new();
        let mut orphans: Vec<CodeLocation> = Vec::new();
        for r in code_refs.iter().chain(test_refs) {
            if known.contains(r.req_id.as_str()) {
                by_id.entry(r.req_id.as_str()).or_default().push(r);
            } else {
                orphans.push(r.clone());
            }
        }

        let mut statuses = Vec::with_capacity(requirements.len());
        let mut implemented = Vec::new();
        let mut partial = Vec::new();
        let mut missing = Vec::new();

        for req in requirements {
            let locations: Vec<CodeLocation> = by_id
                .get(req.id.as_str())
                .map(|refs| refs.iter().map(|r| (*r).clone()).collect())
                .unwrap_or_default();
            let status = classify(&locations);
            match status {
                SyncStatus::Implemented => implemented.push(req.id.clone()),
                SyncStatus::Partial => partial.push(req.id.clone()),
                SyncStatus::Missing => missing.push(req.id.clone()),
            }
            statuses.push(RequirementStatus {
                id: req.id.clone(),
                spec_id: req.spec_id.clone(),
                title: req.title.clone(),
                keyword: req.keyword,
                status,
                locations,
            });
        }

        let specs = self.summarize(&statuses);
        let total_requirements = statuses.len();
        let total_implemented = implemented.len();

        tracing::info!(
            total = total_requirements,
            implemented = total_implemented,
            partial = partial.len(),
            missing = missing.len(),
            orphans = orphans.len(),
            "matched requirements"
        );

        SyncResult {
            specs,
            requirements: statuses,
            sync_rate: sync_rate(total_implemented, total_requirements),
            implemented,
            partial,
            missing,
            orphans,
            total_requirements,
            total_implemented,
        }
    }

    /// One summary per spec, in order of first appearance.
    fn summarize(&self, statuses: &[RequirementStatus]) -> Vec<SpecSummary> {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, (usize, usize, usize)> = HashMap::new();
        for s in statuses {
            let entry = counts.entry(s.spec_id.as_str()).or_insert_with(|| {
                order.push(s.spec_id.as_str());
                (0, 0, 0)
            });
            entry.0 += 1;
            match s.status {
                SyncStatus::Implemented => entry.1 += 1,
                SyncStatus::Missing => entry.2 += 1,
                SyncStatus::Partial => {}
            }
        }

        order
            .into_iter()
            .map(|id| {
                let (total, done, missing) = counts[id];
                SpecSummary {
                    id: id.to_string(),
                    title: self.spec_titles.get(id).cloned(),
                    requirement_count: total,
                    implemented_count: done,
                    missing_count: missing,
                    sync_rate: sync_rate(done, total),
                }
            })
            .collect()
    }
}

fn classify(locations: &[CodeLocation]) -> SyncStatus {
    if locations.iter().any(|l| l.kind == ReferenceKind::Code) {
        SyncStatus::Implemented
    } else if locations.is_empty() {
        SyncStatus::Missing
    } else {
        SyncStatus::Partial
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
