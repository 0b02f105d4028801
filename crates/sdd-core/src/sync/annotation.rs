//! Line-level patterns shared by the spec parser and both scanners.
//!
//! Extraction is deliberately pattern scanning over single lines, not parsing:
//! the same expressions work for every source language.

use crate::sync::types::Rfc2119Keyword;
use regex::Regex;
use std::sync::OnceLock;

static REQ_ID_RE: OnceLock<Regex> = OnceLock::new();
static SPEC_ANNOTATION_RE: OnceLock<Regex> = OnceLock::new();
static TEST_DECL_RE: OnceLock<Regex> = OnceLock::new();
static KEYWORD_RE: OnceLock<Regex> = OnceLock::new();

fn req_id_re() -> &'static Regex {
    REQ_ID_RE.get_or_init(|| Regex::new(r"(?i)\bREQ-\d+\b").unwrap())
}

/// `@spec REQ-001`, `@spec: REQ-001`, `@spec REQ-001, REQ-002`.
fn spec_annotation_re() -> &'static Regex {
    SPEC_ANNOTATION_RE.get_or_init(|| {
        Regex::new(r"(?i)@spec\b:?\s*(REQ-\d+(?:\s*,\s*REQ-\d+)*)").unwrap()
    })
}

/// `it('...')`, `test("...")`, `describe(`...`)`, also `it.only(...)` and friends.
/// Captures the string literal body for each quote style.
fn test_decl_re() -> &'static Regex {
    TEST_DECL_RE.get_or_init(|| {
        Regex::new(
            r#"\b(?:it|test|describe)(?:\.\w+)*\s*\(\s*(?:'([^']*)'|"([^"]*)"|`([^`]*)`)"#,
        )
        .unwrap()
    })
}

fn keyword_re() -> &'static Regex {
    KEYWORD_RE.get_or_init(|| {
        Regex::new(r"\b(SHALL\s+NOT|MUST\s+NOT|SHALL|MUST|SHOULD|MAY)\b").unwrap()
    })
}

/// Upper-case a `req-001` style token.
pub fn normalize_req_id(id: &str) -> String {
    id.to_ascii_uppercase()
}

/// Every `REQ-NNN` token in `text`, normalized, in order of appearance.
pub fn find_req_ids(text: &str) -> Vec<String> {
    req_id_re()
        .find_iter(text)
        .map(|m| normalize_req_id(m.as_str()))
        .collect()
}

/// Ids named by `@spec` annotations on this line, in order of appearance.
pub fn spec_annotation_ids(line: &str) -> Vec<String> {
    spec_annotation_re()
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .flat_map(|list| find_req_ids(list.as_str()))
        .collect()
}

/// Ids mentioned inside test-description string literals on this line.
pub fn test_description_ids(line: &str) -> Vec<String> {
    test_decl_re()
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .flat_map(|body| find_req_ids(body.as_str()))
        .collect()
}

/// The first RFC 2119 keyword in `text`. Upper case only; lower-case "must"
/// in prose is not normative.
pub fn find_keyword(text: &str) -> Option<Rfc2119Keyword> {
    keyword_re()
        .find(text)
        .and_then(|m| Rfc2119Keyword::parse(m.as_str()))
}

/// Drop repeated ids while keeping first-seen order.
pub fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_grammar() {
        assert_eq!(spec_annotation_ids("// @spec REQ-001"), vec!["REQ-001"]);
        assert_eq!(spec_annotation_ids("// @spec: REQ-001"), vec!["REQ-001"]);
        assert_eq!(
            spec_annotation_ids("// @spec REQ-001, REQ-002"),
            vec!["REQ-001", "REQ-002"]
        );
        assert_eq!(spec_annotation_ids("# @SPEC req-7"), vec!["REQ-7"]);
    }

    #[test]
    fn annotation_requires_the_marker() {
        assert!(spec_annotation_ids("// see REQ-001").is_empty());
        assert!(spec_annotation_ids("// @specification REQ-001").is_empty());
        assert!(spec_annotation_ids("// @spec TODO").is_empty());
    }

    #[test]
    fn multiple_annotations_on_one_line() {
        assert_eq!(
            spec_annotation_ids("/* @spec REQ-1 */ x(); /* @spec REQ-2,REQ-3 */"),
            vec!["REQ-1", "REQ-2", "REQ-3"]
        );
    }

    #[test]
    fn test_description_forms() {
        assert_eq!(
            test_description_ids("it('REQ-001: description', () => {"),
            vec!["REQ-001"]
        );
        assert_eq!(
            test_description_ids("describe(\"REQ-001: group\", () => {"),
            vec!["REQ-001"]
        );
        assert_eq!(
            test_description_ids("  it('rejects bad input (REQ-001)', async () => {"),
            vec!["REQ-001"]
        );
        assert_eq!(
            test_description_ids("test.skip(`REQ-004 and REQ-005`, () => {})"),
            vec!["REQ-004", "REQ-005"]
        );
    }

    #[test]
    fn test_description_ignores_other_calls() {
        assert!(test_description_ids("expect('REQ-001').toBe(x)").is_empty());
        assert!(test_description_ids("split('REQ-001')").is_empty());
    }

    #[test]
    fn keyword_prefers_negated_form() {
        assert_eq!(
            find_keyword("The system MUST NOT store passwords"),
            Some(Rfc2119Keyword::MustNot)
        );
        assert_eq!(
            find_keyword("Users SHALL be able to log in"),
            Some(Rfc2119Keyword::Shall)
        );
        assert_eq!(find_keyword("you must do this"), None);
        assert_eq!(find_keyword("MAYBE later"), None);
    }

    #[test]
    fn dedup_keeps_first_order() {
        let ids = vec!["REQ-2".to_string(), "REQ-1".to_string(), "REQ-2".to_string()];
        assert_eq!(dedup_ids(ids), vec!["REQ-2", "REQ-1"]);
    }
}
