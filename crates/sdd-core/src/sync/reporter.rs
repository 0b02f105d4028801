//! Rendering of a [`SyncResult`] as terminal text, markdown, or JSON.

use crate::error::Result;
use crate::sync::types::{RequirementStatus, SyncResult, SyncStatus};
use owo_colors::OwoColorize;

/// Output format selected by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Markdown,
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct SyncReporter {
    colors: bool,
}

impl Default for SyncReporter {
    fn default() -> Self {
        Self { colors: true }
    }
}

enum Tone {
    Good,
    Warn,
    Bad,
    Dim,
    Bold,
}

impl SyncReporter {
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }

    pub fn format(&self, result: &SyncResult, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Terminal => Ok(self.format_terminal(result)),
            ReportFormat::Markdown => Ok(self.format_markdown(result)),
            ReportFormat::Json => self.format_json(result),
        }
    }

    fn paint(&self, text: impl std::fmt::Display, tone: Tone) -> String {
        if !self.colors {
            return text.to_string();
        }
        match tone {
            Tone::Good => text.green().to_string(),
            Tone::Warn => text.yellow().to_string(),
            Tone::Bad => text.red().to_string(),
            Tone::Dim => text.dimmed().to_string(),
            Tone::Bold => text.bold().to_string(),
        }
    }

    fn rate_tone(rate: u32) -> Tone {
        if rate >= 80 {
            Tone::Good
        } else if rate >= 50 {
            Tone::Warn
        } else {
            Tone::Bad
        }
    }

    // -----------------------------------------------------------------------
    // Terminal
    // -----------------------------------------------------------------------

    pub fn format_terminal(&self, result: &SyncResult) -> String {
        let mut out = String::new();

        out.push_str(&self.paint("Spec Sync Report", Tone::Bold));
        out.push('\n');
        out.push('\n');

        let rate = self.paint(format!("{}%", result.sync_rate), Self::rate_tone(result.sync_rate));
        out.push_str(&format!("Sync rate: {rate}\n"));
        out.push_str(&format!(
            "Requirements: {} total, {} implemented, {} partial, {} missing\n",
            result.total_requirements,
            result.total_implemented,
            result.partial.len(),
            result.missing.len()
        ));

        if !result.specs.is_empty() {
            out.push('\n');
            let headers = ["SPEC", "TOTAL", "IMPLEMENTED", "MISSING", "SYNC"];
            let rows: Vec<Vec<String>> = result
                .specs
                .iter()
                .map(|s| {
                    vec![
                        s.id.clone(),
                        s.requirement_count.to_string(),
                        s.implemented_count.to_string(),
                        s.missing_count.to_string(),
                        format!("{}%", s.sync_rate),
                    ]
                })
                .collect();
            out.push_str(&render_table(&headers, &rows));
        }

        let missing: Vec<&RequirementStatus> = by_status(result, SyncStatus::Missing);
        if !missing.is_empty() {
            out.push('\n');
            out.push_str(&format!(
                "{} Missing ({}):\n",
                self.paint("x", Tone::Bad),
                missing.len()
            ));
            for r in missing {
                out.push_str(&format!(
                    "  {}{}{}\n",
                    self.paint(&r.id, Tone::Bad),
                    requirement_label(r),
                    self.paint(format!(" [{}]", r.spec_id), Tone::Dim)
                ));
            }
        }

        let partial = by_status(result, SyncStatus::Partial);
        if !partial.is_empty() {
            out.push('\n');
            out.push_str(&format!(
                "{} Tested but not implemented ({}):\n",
                self.paint("~", Tone::Warn),
                partial.len()
            ));
            for r in partial {
                out.push_str(&format!(
                    "  {}{}{}\n",
                    self.paint(&r.id, Tone::Warn),
                    requirement_label(r),
                    self.paint(format!(" [{}]", r.spec_id), Tone::Dim)
                ));
            }
        }

        if !result.orphans.is_empty() {
            out.push('\n');
            out.push_str(&format!(
                "{} Orphan references ({}):\n",
                self.paint("!", Tone::Warn),
                result.orphans.len()
            ));
            for o in &result.orphans {
                out.push_str(&format!(
                    "  {}:{} {} {}\n",
                    o.file,
                    o.line,
                    self.paint(&o.req_id, Tone::Warn),
                    self.paint(format!("({})", o.kind), Tone::Dim)
                ));
            }
        }

        if result.total_requirements > 0 && result.is_fully_synced() {
            out.push('\n');
            out.push_str(&self.paint("All requirements are implemented.", Tone::Good));
            out.push('\n');
        }

        out
    }

    // -----------------------------------------------------------------------
    // Markdown
    // -----------------------------------------------------------------------

    pub fn format_markdown(&self, result: &SyncResult) -> String {
        let mut out = String::new();
        out.push_str("# Spec Sync Report\n\n");
        out.push_str(&format!("**Sync rate:** {}%\n\n", result.sync_rate));
        out.push_str("| Metric | Count |\n|---|---|\n");
        out.push_str(&format!("| Total requirements | {} |\n", result.total_requirements));
        out.push_str(&format!("| Implemented | {} |\n", result.total_implemented));
        out.push_str(&format!("| Partial (tests only) | {} |\n", result.partial.len()));
        out.push_str(&format!("| Missing | {} |\n", result.missing.len()));
        out.push_str(&format!("| Orphan references | {} |\n", result.orphans.len()));

        if !result.specs.is_empty() {
            out.push_str("\n## Specs\n\n");
            out.push_str("| Spec | Title | Requirements | Implemented | Missing | Sync |\n");
            out.push_str("|---|---|---|---|---|---|\n");
            for s in &result.specs {
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {}% |\n",
                    s.id,
                    s.title.as_deref().map(escape_cell).unwrap_or_default(),
                    s.requirement_count,
                    s.implemented_count,
                    s.missing_count,
                    s.sync_rate
                ));
            }
        }

        let missing = by_status(result, SyncStatus::Missing);
        if !missing.is_empty() {
            out.push_str("\n## Missing Requirements\n\n");
            for r in missing {
                out.push_str(&format!("- **{}**{} ({})\n", r.id, requirement_label(r), r.spec_id));
            }
        }

        let partial = by_status(result, SyncStatus::Partial);
        if !partial.is_empty() {
            out.push_str("\n## Tested but Not Implemented\n\n");
            for r in partial {
                out.push_str(&format!("- **{}**{} ({})\n", r.id, requirement_label(r), r.spec_id));
            }
        }

        if !result.orphans.is_empty() {
            out.push_str("\n## Orphan References\n\n");
            out.push_str("| Requirement | Location | Type |\n|---|---|---|\n");
            for o in &result.orphans {
                out.push_str(&format!(
                    "| {} | `{}:{}` | {} |\n",
                    o.req_id, o.file, o.line, o.kind
                ));
            }
        }

        out
    }

    // -----------------------------------------------------------------------
    // JSON
    // -----------------------------------------------------------------------

    pub fn format_json(&self, result: &SyncResult) -> Result<String> {
        Ok(serde_json::to_string_pretty(result)?)
    }
}

fn by_status(result: &SyncResult, status: SyncStatus) -> Vec<&RequirementStatus> {
    result
        .requirements
        .iter()
        .filter(|r| r.status == status)
        .collect()
}

fn requirement_label(r: &RequirementStatus) -> String {
    match (&r.title, r.keyword) {
        (Some(t), Some(k)) => format!(": {t} ({k})"),
        (Some(t), None) => format!(": {t}"),
        (None, Some(k)) => format!(" ({k})"),
        (None, None) => String::new(),
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Column-aligned plain table, two spaces between columns.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let line = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(headers.iter().map(|h| h.to_string()).collect());
    out.push_str(&line(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        out.push_str(&line(row.clone()));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
