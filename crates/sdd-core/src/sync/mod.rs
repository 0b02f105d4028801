//! Spec/code synchronization: which spec requirements are referenced by
//! source and test annotations, and which annotations point nowhere.
//!
//! Stages run in sequence: parse specs, scan code, scan tests, match, render.

pub mod annotation;
pub mod code_scanner;
pub mod matcher;
pub mod reporter;
pub mod spec_parser;
pub mod test_scanner;
pub mod types;
pub mod walk;

pub use code_scanner::CodeScanner;
pub use matcher::SyncMatcher;
pub use reporter::{ReportFormat, SyncReporter};
pub use spec_parser::SpecParser;
pub use test_scanner::TestScanner;
pub use types::{
    CodeLocation, CodeReference, ExtractedRequirement, ParsedSpec, ReferenceKind,
    RequirementStatus, Rfc2119Keyword, SpecSummary, SyncResult, SyncStatus,
};

use crate::config::{Config, SyncConfig};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Options / outcome
// ---------------------------------------------------------------------------

/// Per-invocation overrides. `None` / empty fields fall back to
/// `.sdd/config.yaml`, then to built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Restrict the run to one spec.
    pub spec_id: Option<String>,
    pub src_dir: Option<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub test_dirs: Vec<String>,
    /// Minimum sync rate in CI mode (default 100).
    pub threshold: Option<u32>,
    pub ci: bool,
    pub json: bool,
    pub markdown: bool,
    pub colors: bool,
}

impl SyncOptions {
    pub fn format(&self) -> ReportFormat {
        if self.json {
            ReportFormat::Json
        } else if self.markdown {
            ReportFormat::Markdown
        } else {
            ReportFormat::Terminal
        }
    }

    /// Merge these overrides onto the project's configured defaults.
    pub fn resolve(&self, base: &SyncConfig) -> SyncConfig {
        let mut cfg = base.clone();
        if let Some(src) = &self.src_dir {
            cfg.src_dir = src.clone();
        }
        if !self.include.is_empty() {
            cfg.include = self.include.clone();
        }
        if !self.exclude.is_empty() {
            cfg.exclude = self.exclude.clone();
        }
        if !self.test_dirs.is_empty() {
            cfg.test_dirs = self.test_dirs.clone();
        }
        if let Some(threshold) = self.threshold {
            cfg.threshold = threshold;
        }
        cfg
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncData {
    pub result: SyncResult,
    /// The rendered report in the requested format.
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SyncData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the failure is a CI threshold violation rather than an error.
    #[serde(default)]
    pub threshold_failed: bool,
}

// ---------------------------------------------------------------------------
// execute_sync
// ---------------------------------------------------------------------------

/// Run a full sync over `root`. Never panics or returns `Err`: failures are
/// reported through `SyncOutcome::error`.
pub fn execute_sync(root: &Path, options: &SyncOptions) -> SyncOutcome {
    let (data, threshold) = match run_sync(root, options) {
        Ok(done) => done,
        Err(e) => {
            tracing::debug!(error = %e, "sync failed");
            return SyncOutcome {
                success: false,
                data: None,
                error: Some(e.to_string()),
                threshold_failed: false,
            };
        }
    };

    if options.ci && data.result.sync_rate < threshold {
        let message = format!(
            "sync rate {}% is below the required threshold of {}%",
            data.result.sync_rate, threshold
        );
        return SyncOutcome {
            success: false,
            data: Some(data),
            error: Some(message),
            threshold_failed: true,
        };
    }

    SyncOutcome {
        success: true,
        data: Some(data),
        error: None,
        threshold_failed: false,
    }
}

/// Returns the rendered data and the effective CI threshold.
fn run_sync(root: &Path, options: &SyncOptions) -> Result<(SyncData, u32)> {
    let config = Config::load(root)?;
    let cfg = options.resolve(&config.sync);
    let reporter = SyncReporter::new(options.colors);
    let format = options.format();

    let parser = SpecParser::new(root);
    let specs = match &options.spec_id {
        Some(id) => vec![parser.parse_spec(id)?],
        None => parser.parse_all_specs(),
    };
    let requirements = SpecParser::requirements(&specs);
    tracing::info!(
        specs = specs.len(),
        requirements = requirements.len(),
        "parsed specs"
    );

    if requirements.is_empty() {
        let result = SyncResult::empty();
        let output = match format {
            ReportFormat::Json => reporter.format_json(&result)?,
            _ => "No requirements found in specs; nothing to sync.".to_string(),
        };
        return Ok((SyncData { result, output }, cfg.threshold));
    }

    let code_refs = CodeScanner::from_config(root, &cfg)?.scan();
    let test_refs = TestScanner::from_config(root, &cfg)?.scan();

    let result = SyncMatcher::new()
        .with_specs(&specs)
        .match_requirements(&requirements, &code_refs, &test_refs);
    let output = reporter.format(&result, format)?;

    Ok((SyncData { result, output }, cfg.threshold))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
