//! Directive Neutralization
//!
//! Rewrites every non-branching preprocessor directive so the external
//! preprocessor leaves it alone while branch constructs are isolated, and
//! tags every branch-opening directive with a unique pairing marker.

use uuid::Uuid;

/// Branch-opening directive keywords
pub const BRANCHING_START: [&str; 3] = ["#if", "#ifdef", "#ifndef"];

/// All branch-construct keywords, left untouched by neutralization
pub const BRANCHING: [&str; 6] = ["#if", "#ifdef", "#ifndef", "#elseif", "#else", "#endif"];

/// Inert stand-in for the `#` of a neutralized directive
pub const INERT_PREFIX: &str = "__#__";

/// Prefix of the pairing marker injected behind branch-opening directives
pub const BRANCH_MARK: &str = "__branch__:";

/// Neutralize every non-branching directive and tag branch openings.
///
/// Output is line-for-line with the input. `#define`, `#include`, `#undef`
/// and friends get their `#` replaced by [`INERT_PREFIX`] so the external
/// preprocessor treats them as ordinary text; `#if`/`#ifdef`/`#ifndef`
/// lines gain a trailing `// __branch__:<line>:<uuid>` comment used later
/// to pair the opening with its own `#endif`. Markers are unique across
/// the whole run so unresolved sibling constructs can coexist in one text.
pub fn neutralize_directives(text: &str) -> String {
    let mut out = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let sline = line.trim();

        if sline.starts_with('#') {
            let mut tokens = sline.split_whitespace();
            let first = tokens.next().unwrap_or_default();

            if !BRANCHING.contains(&first) {
                let mut newline = format!("{}{}", INERT_PREFIX, &first[1..]);
                for token in tokens {
                    newline.push(' ');
                    newline.push_str(token);
                }
                out.push(newline);
            } else {
                let mut newline = sline.to_string();
                if BRANCHING_START.contains(&first) {
                    newline.push_str(&format!(" // {}{}:{}", BRANCH_MARK, idx, Uuid::new_v4()));
                }
                out.push(newline);
            }
        } else {
            out.push(line.to_string());
        }
    }

    out.join("\n")
}

/// Restore neutralized directives back to real ones
pub fn restore_directives(text: &str) -> String {
    text.replace(INERT_PREFIX, "#")
}

/// Squeeze runs of consecutive newlines to a single newline
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_newline = false;

    for ch in text.chars() {
        if ch == '\n' {
            if last_was_newline {
                continue;
            }
            last_was_newline = true;
        } else {
            last_was_newline = false;
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_neutralize_non_branching() {
        let text = "#include <stdio.h>\n#define X 1\nint x;";
        let out = neutralize_directives(text);

        assert_eq!(out, "__#__include <stdio.h>\n__#__define X 1\nint x;");
    }

    #[test]
    fn test_branch_openings_get_markers() {
        let text = "#ifdef FOO\nint a;\n#endif";
        let out = neutralize_directives(text);
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("#ifdef FOO // __branch__:0:"));
        assert_eq!(lines[1], "int a;");
        assert_eq!(lines[2], "#endif");
    }

    #[test]
    fn test_markers_are_unique() {
        let text = "#ifdef FOO\n#endif\n#ifdef BAR\n#endif";
        let out = neutralize_directives(text);
        let markers: Vec<&str> = out
            .lines()
            .filter_map(|line| line.find(BRANCH_MARK).map(|idx| &line[idx..]))
            .collect();

        assert_eq!(markers.len(), 2);
        assert_ne!(markers[0], markers[1]);
    }

    #[test]
    fn test_else_and_endif_untouched() {
        let text = "#else\n#endif";
        assert_eq!(neutralize_directives(text), "#else\n#endif");
    }

    #[test]
    fn test_idempotent_without_branch_constructs() {
        let text = "#include <stdio.h>\n#define X 1\nint x;";
        let once = neutralize_directives(text);
        let twice = neutralize_directives(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_restore_round_trip() {
        let text = "#include <stdio.h>\n#define X 1\n#undef Y\nint x;";
        let restored = restore_directives(&neutralize_directives(text));

        assert_eq!(restored, text);
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\nb\n\nc"), "a\nb\nc");
        assert_eq!(collapse_blank_lines("a\nb"), "a\nb");
        assert_eq!(collapse_blank_lines(""), "");
    }
}
