use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Rfc2119Keyword
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rfc2119Keyword {
    #[serde(rename = "SHALL")]
    Shall,
    #[serde(rename = "SHALL NOT")]
    ShallNot,
    #[serde(rename = "MUST")]
    Must,
    #[serde(rename = "MUST NOT")]
    MustNot,
    #[serde(rename = "SHOULD")]
    Should,
    #[serde(rename = "MAY")]
    May,
}

impl Rfc2119Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Rfc2119Keyword::Shall => "SHALL",
            Rfc2119Keyword::ShallNot => "SHALL NOT",
            Rfc2119Keyword::Must => "MUST",
            Rfc2119Keyword::MustNot => "MUST NOT",
            Rfc2119Keyword::Should => "SHOULD",
            Rfc2119Keyword::May => "MAY",
        }
    }

    /// Parse a keyword; whitespace between the two words is collapsed.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.as_str() {
            "SHALL" => Some(Rfc2119Keyword::Shall),
            "SHALL NOT" => Some(Rfc2119Keyword::ShallNot),
            "MUST" => Some(Rfc2119Keyword::Must),
            "MUST NOT" => Some(Rfc2119Keyword::MustNot),
            "SHOULD" => Some(Rfc2119Keyword::Should),
            "MAY" => Some(Rfc2119Keyword::May),
            _ => None,
        }
    }
}

impl fmt::Display for Rfc2119Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExtractedRequirement
// ---------------------------------------------------------------------------

/// A single `REQ-NNN` statement pulled out of a spec file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRequirement {
    pub id: String,
    pub spec_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<Rfc2119Keyword>,
    /// 1-based line of the declaration in the spec file.
    pub line: usize,
}

/// All requirements of one spec, plus the metadata the summaries need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub requirements: Vec<ExtractedRequirement>,
}

// ---------------------------------------------------------------------------
// CodeReference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Code,
    Test,
}

impl ReferenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceKind::Code => "code",
            ReferenceKind::Test => "test",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One annotation occurrence. A line naming several ids yields one per id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeReference {
    pub req_id: String,
    /// Path relative to the project root, `/`-separated.
    pub file: String,
    /// 1-based.
    pub line: usize,
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

pub type CodeLocation = CodeReference;

// ---------------------------------------------------------------------------
// RequirementStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Implemented,
    Partial,
    Missing,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Implemented => "implemented",
            SyncStatus::Partial => "partial",
            SyncStatus::Missing => "missing",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementStatus {
    pub id: String,
    pub spec_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<Rfc2119Keyword>,
    pub status: SyncStatus,
    #[serde(default)]
    pub locations: Vec<CodeLocation>,
}

// ---------------------------------------------------------------------------
// SpecSummary / SyncResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub requirement_count: usize,
    pub implemented_count: usize,
    pub missing_count: usize,
    /// 0-100.
    pub sync_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub specs: Vec<SpecSummary>,
    pub requirements: Vec<RequirementStatus>,
    pub sync_rate: u32,
    pub implemented: Vec<String>,
    /// Test-only requirements: neither implemented nor missing.
    #[serde(default)]
    pub partial: Vec<String>,
    pub missing: Vec<String>,
    pub orphans: Vec<CodeLocation>,
    pub total_requirements: usize,
    pub total_implemented: usize,
}

impl SyncResult {
    /// The result of a run over zero requirements.
    pub fn empty() -> Self {
        Self {
            specs: Vec::new(),
            requirements: Vec::new(),
            sync_rate: 100,
            implemented: Vec::new(),
            partial: Vec::new(),
            missing: Vec::new(),
            orphans: Vec::new(),
            total_requirements: 0,
            total_implemented: 0,
        }
    }

    pub fn is_fully_synced(&self) -> bool {
        self.missing.is_empty() && self.partial.is_empty()
    }
}

/// `round(100 * implemented / total)`, half rounding up; 100 when `total == 0`.
pub fn sync_rate(implemented: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    let implemented = implemented.min(total);
    ((200 * implemented + total) / (2 * total)) as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
