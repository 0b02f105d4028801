//! Requirement extraction from `.sdd/specs/<id>/spec.md`.

use crate::error::{Result, SddError};
use crate::paths;
use crate::sync::annotation::{find_keyword, normalize_req_id};
use crate::sync::types::{ExtractedRequirement, ParsedSpec};
use ignore::WalkBuilder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Frontmatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecFrontmatter {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Split `content` into (frontmatter yaml, body, body start line offset).
fn split_frontmatter(content: &str) -> (Option<&str>, &str, usize) {
    let Some(rest) = content.strip_prefix("---") else {
        return (None, content, 0);
    };
    let rest = if let Some(r) = rest.strip_prefix('\n') {
        r
    } else if let Some(r) = rest.strip_prefix("\r\n") {
        r
    } else {
        return (None, content, 0);
    };
    let Some(end) = rest.find("\n---") else {
        return (None, content, 0);
    };
    let yaml = &rest[..end];
    let after = &rest[end + "\n---".len()..];
    let body = match after.find('\n') {
        Some(nl) => &after[nl + 1..],
        None => "",
    };
    // opening delimiter + yaml lines + closing delimiter
    let offset = content.len() - body.len();
    let consumed_lines = content[..offset].matches('\n').count();
    (Some(yaml), body, consumed_lines)
}

// ---------------------------------------------------------------------------
// Line patterns
// ---------------------------------------------------------------------------

static HEADING_RE: OnceLock<Regex> = OnceLock::new();
static REQ_HEADING_RE: OnceLock<Regex> = OnceLock::new();
static REQ_INLINE_RE: OnceLock<Regex> = OnceLock::new();

fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.*?)\s*#*\s*$").unwrap())
}

/// Heading text starting with a requirement id: `REQ-001: Title`,
/// `REQ-001 - Title`, `[REQ-001] Title`, `**REQ-001** Title`.
fn req_heading_re() -> &'static Regex {
    REQ_HEADING_RE.get_or_init(|| {
        Regex::new(r"(?i)^[\[*_`]*(REQ-\d+)\b[\]*_`]*\s*[:.\-–—]?\s*(.*)$").unwrap()
    })
}

/// List item or paragraph line opening with a requirement id.
fn req_inline_re() -> &'static Regex {
    REQ_INLINE_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:[-*+]\s+|\d+[.)]\s+)?[\[*_`]*(REQ-\d+)\b[\]*_`]*\s*[:.\-–—]?\s*(.*)$")
            .unwrap()
    })
}

fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Requirement being assembled from a heading and the text beneath it.
struct Pending {
    req: ExtractedRequirement,
    body: Vec<String>,
}

impl Pending {
    fn finish(mut self) -> ExtractedRequirement {
        let description = non_empty(&self.body.join("\n"));
        if self.req.keyword.is_none() {
            self.req.keyword = description.as_deref().and_then(find_keyword);
        }
        self.req.description = description;
        self.req
    }
}

/// Extract the spec title and its requirements from raw `spec.md` content.
pub fn extract_requirements(spec_id: &str, content: &str) -> (Option<String>, Vec<ExtractedRequirement>) {
    let (frontmatter, body, line_offset) = split_frontmatter(content);
    let meta: SpecFrontmatter = match frontmatter {
        Some(yaml) => serde_yaml::from_str(yaml).unwrap_or_else(|e| {
            tracing::warn!(spec = spec_id, error = %e, "ignoring unparseable spec frontmatter");
            SpecFrontmatter::default()
        }),
        None => SpecFrontmatter::default(),
    };

    let mut title = meta.title.and_then(|t| non_empty(&t));
    let mut out: Vec<ExtractedRequirement> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut pending: Option<Pending> = None;
    let mut in_fence = false;

    let mut push = |req: ExtractedRequirement, out: &mut Vec<ExtractedRequirement>| {
        if seen.insert(req.id.clone()) {
            out.push(req);
        } else {
            tracing::debug!(spec = spec_id, id = %req.id, "duplicate requirement id ignored");
        }
    };

    for (idx, line) in body.lines().enumerate() {
        let line_no = line_offset + idx + 1;

        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some(caps) = heading_re().captures(line) {
            if let Some(p) = pending.take() {
                push(p.finish(), &mut out);
            }
            let level = caps[1].len();
            let text = caps[2].to_string();
            if level == 1 && title.is_none() {
                title = non_empty(&text);
            }
            if let Some(req_caps) = req_heading_re().captures(&text) {
                let heading_title = non_empty(&req_caps[2]);
                pending = Some(Pending {
                    req: ExtractedRequirement {
                        id: normalize_req_id(&req_caps[1]),
                        spec_id: spec_id.to_string(),
                        keyword: heading_title.as_deref().and_then(find_keyword),
                        title: heading_title,
                        description: None,
                        line: line_no,
                    },
                    body: Vec::new(),
                });
            }
            continue;
        }

        if let Some(caps) = req_inline_re().captures(line) {
            let text = caps[2].to_string();
            if let Some(keyword) = find_keyword(&text) {
                if let Some(p) = pending.take() {
                    push(p.finish(), &mut out);
                }
                push(
                    ExtractedRequirement {
                        id: normalize_req_id(&caps[1]),
                        spec_id: spec_id.to_string(),
                        title: None,
                        description: non_empty(&text),
                        keyword: Some(keyword),
                        line: line_no,
                    },
                    &mut out,
                );
                continue;
            }
        }

        if let Some(p) = pending.as_mut() {
            p.body.push(line.trim().to_string());
        }
    }

    if let Some(p) = pending.take() {
        push(p.finish(), &mut out);
    }

    (title, out)
}

// ---------------------------------------------------------------------------
// SpecParser
// ---------------------------------------------------------------------------

pub struct SpecParser {
    root: PathBuf,
}

impl SpecParser {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn specs_dir(&self) -> PathBuf {
        paths::specs_dir(&self.root)
    }

    /// Parse one spec. A missing spec is `SpecNotFound`; an unreadable one is
    /// an empty spec.
    pub fn parse_spec(&self, spec_id: &str) -> Result<ParsedSpec> {
        paths::validate_spec_id(spec_id)?;
        let path = paths::spec_path(&self.root, spec_id);
        if !path.is_file() {
            return Err(SddError::SpecNotFound(spec_id.to_string()));
        }
        Ok(self.parse_file(spec_id, &path))
    }

    /// Parse every spec under `.sdd/specs`, sorted by spec id.
    pub fn parse_all_specs(&self) -> Vec<ParsedSpec> {
        self.spec_ids()
            .into_iter()
            .map(|id| {
                let path = paths::spec_path(&self.root, &id);
                self.parse_file(&id, &path)
            })
            .collect()
    }

    /// Requirements across `specs`, in spec order.
    pub fn requirements(specs: &[ParsedSpec]) -> Vec<ExtractedRequirement> {
        specs
            .iter()
            .flat_map(|s| s.requirements.iter().cloned())
            .collect()
    }

    /// Ids of every directory under `.sdd/specs` holding a `spec.md`.
    pub fn spec_ids(&self) -> Vec<String> {
        let specs_dir = self.specs_dir();
        if !specs_dir.is_dir() {
            return Vec::new();
        }
        let walker = WalkBuilder::new(&specs_dir)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut ids: Vec<String> = walker
            .flatten()
            .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
            .filter(|e| e.file_name() == paths::SPEC_FILE)
            .filter_map(|e| {
                let dir = e.path().parent()?;
                let id = paths::display_relative(&specs_dir, dir);
                if id.is_empty() {
                    None
                } else {
                    Some(id)
                }
            })
            .collect();
        ids.sort();
        ids
    }

    fn parse_file(&self, spec_id: &str, path: &Path) -> ParsedSpec {
        let Some(content) = crate::io::read_text_lossy(path) else {
            return ParsedSpec {
                id: spec_id.to_string(),
                title: None,
                requirements: Vec::new(),
            };
        };
        let (title, requirements) = extract_requirements(spec_id, &content);
        tracing::debug!(spec = spec_id, count = requirements.len(), "parsed spec");
        ParsedSpec {
            id: spec_id.to_string(),
            title,
            requirements,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
