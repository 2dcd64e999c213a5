//! Branch Expansion Driver
//!
//! Finds the first unprocessed branch construct in a text, forces both of
//! its outcomes through the external evaluator, and reassembles the two
//! resulting full texts. Exactly one construct is processed per call;
//! constructs after it, and constructs nested inside it that survive the
//! evaluator's resolution, are left for later recursive passes.

use branchsight_core::{Error, Result};
use regex::Regex;
use tracing::debug;

use crate::neutralize::BRANCH_MARK;
use crate::ConditionEvaluator;

/// Fixed stand-in for a branch's real condition expression. The evaluator
/// is asked to resolve the construct twice, once with this symbol defined
/// and once with it undefined, so the original condition never needs to be
/// understood.
pub const SYNTHETIC_SYMBOL: &str = "__BRANCHSIGHT_PROBE__";

/// Outcome of expanding one branch construct
#[derive(Debug, Clone)]
pub struct BranchExpansion {
    /// Full text with the construct resolved as "condition true"
    pub true_text: String,
    /// Full text with the construct resolved as "condition false"
    pub false_text: String,
    /// The opening directive line, pairing marker stripped
    pub branch_text: String,
}

/// Single-construct expansion driver
pub struct BranchExpander {
    /// Matches a branch-opening directive with its condition
    branch_start: Regex,
    /// Matches the keyword-plus-whitespace span preceding the condition
    condition_start: Regex,
}

impl BranchExpander {
    pub fn new() -> Self {
        Self {
            branch_start: Regex::new(r"^\s*#\s*(?:ifdef|ifndef|if)\s+\S+").unwrap(),
            condition_start: Regex::new(r"^#\s*(?:ifdef|ifndef|if)\s+").unwrap(),
        }
    }

    /// Expand the leftmost branch construct of `text`, if any.
    ///
    /// Returns `Ok(None)` when the text contains no branch construct; this
    /// is the expected terminal condition of the recursive build, not an
    /// error.
    pub fn expand_first(
        &self,
        text: &str,
        evaluator: &dyn ConditionEvaluator,
    ) -> Result<Option<BranchExpansion>> {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();

        for (idx, line) in lines.iter().enumerate() {
            if !self.branch_start.is_match(line) {
                continue;
            }
            let sline = line.trim();

            // Neutralization tagged every branch opening; a missing marker
            // means the pairing invariant is broken.
            let markidx = sline.find(BRANCH_MARK).ok_or_else(|| {
                Error::MissingMarker(format!("branch at line {} carries no marker", idx))
            })?;
            let marker = sline[markidx..].to_string();
            let branch_text = sline.replace(&format!("// {}", marker), "").trim_end().to_string();
            let opening = self.synthesize_condition(sline)?;

            // Pair the opening with its own #endif, then cut the construct
            // out of the surrounding text.
            let mut marked = lines[..idx].to_vec();
            marked.push(opening);
            marked.extend(mark_endif(&lines[idx + 1..], &marker, &branch_text)?);
            let end_offset = find_marker_offset(&marked[idx..], &marker)?;

            let fragment = marked[idx..idx + end_offset].join("\n");
            debug!("expanding branch at line {}: {}", idx, branch_text);
            let true_out = evaluator.resolve(&fragment, true)?;
            let false_out = evaluator.resolve(&fragment, false)?;

            let prefix = &marked[..idx];
            let suffix = &marked[idx + end_offset + 1..];

            return Ok(Some(BranchExpansion {
                true_text: reassemble(prefix, &true_out, suffix),
                false_text: reassemble(prefix, &false_out, suffix),
                branch_text,
            }));
        }

        Ok(None)
    }

    /// Replace the branch's real condition with the synthetic probe symbol.
    ///
    /// The span covering the directive keyword and the following whitespace
    /// is kept; everything after it (condition and marker comment) is
    /// replaced. Fails when the line does not match the directive grammar.
    pub fn synthesize_condition(&self, line: &str) -> Result<String> {
        let m = self
            .condition_start
            .find(line)
            .ok_or_else(|| Error::MalformedDirective(line.to_string()))?;

        Ok(format!("{}{}", &line[..m.end()], SYNTHETIC_SYMBOL))
    }

    /// Line numbers (1-based) and text of branch-opening directives in `text`
    pub fn branch_lines(&self, text: &str) -> Vec<(usize, String)> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| self.branch_start.is_match(line))
            .map(|(idx, line)| (idx + 1, line.trim().to_string()))
            .collect()
    }
}

impl Default for BranchExpander {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert `marker` on its own line immediately after the first `#endif`.
///
/// `lines` starts just after the branch-opening directive. Nested
/// constructs are not matched structurally: the first `#endif` wins, and
/// the unique marker keeps the pairing unambiguous across later passes.
fn mark_endif(lines: &[String], marker: &str, branch_text: &str) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(lines.len() + 1);

    for (idx, line) in lines.iter().enumerate() {
        let sline = line.trim();

        if sline.starts_with("#endif") {
            out.push(sline.to_string());
            out.push(marker.to_string());
            out.extend(lines[idx + 1..].iter().cloned());
            return Ok(out);
        }
        out.push(line.clone());
    }

    Err(Error::UnterminatedBranch(branch_text.to_string()))
}

/// Offset of the line containing `marker`
fn find_marker_offset(lines: &[String], marker: &str) -> Result<usize> {
    lines
        .iter()
        .position(|line| line.contains(marker))
        .ok_or_else(|| Error::MissingMarker(marker.to_string()))
}

/// Splice evaluator output between the untouched prefix and suffix lines
fn reassemble(prefix: &[String], resolved: &str, suffix: &[String]) -> String {
    let mut out: Vec<&str> = prefix.iter().map(String::as_str).collect();
    out.extend(resolved.lines());
    out.extend(suffix.iter().map(String::as_str));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn to_lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_mark_endif_inserts_after_first_endif() {
        let lines = to_lines("int a;\n#endif\nint b;");
        let out = mark_endif(&lines, "__branch__:0:x", "#ifdef FOO").unwrap();

        assert_eq!(out, to_lines("int a;\n#endif\n__branch__:0:x\nint b;"));
    }

    #[test]
    fn test_mark_endif_unterminated() {
        let lines = to_lines("int a;\nint b;");
        let err = mark_endif(&lines, "__branch__:0:x", "#ifdef FOO").unwrap_err();

        assert!(matches!(err, Error::UnterminatedBranch(_)));
    }

    #[test]
    fn test_find_marker_offset() {
        let lines = to_lines("#ifdef X\nint a;\n#endif\n__branch__:0:x\nint b;");
        assert_eq!(find_marker_offset(&lines, "__branch__:0:x").unwrap(), 3);

        let err = find_marker_offset(&lines, "__branch__:9:y").unwrap_err();
        assert!(matches!(err, Error::MissingMarker(_)));
    }

    #[test]
    fn test_synthesize_condition() {
        let expander = BranchExpander::new();

        assert_eq!(
            expander
                .synthesize_condition("#ifdef FOO // __branch__:0:x")
                .unwrap(),
            format!("#ifdef {}", SYNTHETIC_SYMBOL)
        );
        assert_eq!(
            expander
                .synthesize_condition("#if defined(A) && B")
                .unwrap(),
            format!("#if {}", SYNTHETIC_SYMBOL)
        );
    }

    #[test]
    fn test_synthesize_condition_malformed() {
        let expander = BranchExpander::new();
        let err = expander.synthesize_condition("#pragma once").unwrap_err();

        assert!(matches!(err, Error::MalformedDirective(_)));
    }

    #[test]
    fn test_branch_lines() {
        let expander = BranchExpander::new();
        let text = "int x;\n#ifdef FOO\n#define Y 1\n#endif\n  #if BAR > 2\n#endif";
        let branches = expander.branch_lines(text);

        assert_eq!(
            branches,
            vec![
                (2, "#ifdef FOO".to_string()),
                (5, "#if BAR > 2".to_string()),
            ]
        );
    }

    #[test]
    fn test_reassemble_with_empty_output() {
        let prefix = to_lines("int a;");
        let suffix = to_lines("int b;");

        assert_eq!(reassemble(&prefix, "", &suffix), "int a;\nint b;");
        assert_eq!(reassemble(&prefix, "int m;", &suffix), "int a;\nint m;\nint b;");
    }
}
