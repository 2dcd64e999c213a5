//! Extended tests for the expansion engine
//!
//! These drive the full neutralize → isolate → dual-evaluate → rebuild
//! pipeline through a scripted evaluator, so the decision-tree semantics
//! are pinned without needing a system preprocessor.

use std::path::Path;

use branchsight_core::{Error, ExpansionConfig, Result, VariantNode};
use pretty_assertions::assert_eq;

use crate::{expand_file, expand_source, ConditionEvaluator, ExpandResult};

/// Scripted stand-in for the external preprocessor.
///
/// Resolves the one synthesized construct a fragment carries: keeps the
/// section the forced probe selects and drops the rest, the way `-D`/`-U`
/// on the synthesized opening would.
struct FakeCpp;

impl ConditionEvaluator for FakeCpp {
    fn resolve(&self, fragment: &str, defined: bool) -> Result<String> {
        let lines: Vec<&str> = fragment.lines().collect();
        let opening = lines.first().copied().unwrap_or_default().trim();
        let negated = opening.starts_with("#ifndef");
        let take_first = defined != negated;

        let mut first = Vec::new();
        let mut second = Vec::new();
        let mut in_else = false;
        for line in &lines[1..] {
            let sline = line.trim();
            if sline.starts_with("#endif") {
                break;
            }
            if sline.starts_with("#else") {
                in_else = true;
                continue;
            }
            if in_else {
                second.push(*line);
            } else {
                first.push(*line);
            }
        }

        let chosen = if take_first { first } else { second };
        Ok(chosen.join("\n"))
    }

    fn name(&self) -> &str {
        "fake-cpp"
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn expand(source: &str) -> Result<ExpandResult> {
    expand_source(source, Box::new(FakeCpp), ExpansionConfig::default())
}

fn leaf<'a>(node: &'a Option<Box<VariantNode>>) -> &'a VariantNode {
    node.as_deref().expect("expected a child on this side")
}

#[test]
fn test_no_branch_constructs_single_leaf() {
    let source = "#define X 1\nint x = X;\nint y;";
    let result = expand(source).unwrap();

    assert!(result.tree.is_leaf());
    assert_eq!(result.tree.code, source);
    assert_eq!(result.tree.path, vec!["ROOT".to_string()]);
    assert_eq!(result.branches_expanded, 0);
    assert_eq!(result.leaves, 1);
}

#[test]
fn test_single_ifdef_with_else() {
    let source = "#ifdef FOO\nint a = 1;\n#else\nint a = 2;\n#endif";
    let result = expand(source).unwrap();

    assert_eq!(result.branches_expanded, 1);
    assert_eq!(result.leaves, 2);
    assert_eq!(result.tree.branch_text.as_deref(), Some("#ifdef FOO"));

    let left = leaf(&result.tree.left);
    assert_eq!(left.code, "int a = 1;");
    assert_eq!(left.taken, Some(true));
    assert_eq!(
        left.path,
        vec!["ROOT".to_string(), "#ifdef FOO(True)".to_string()]
    );

    let right = leaf(&result.tree.right);
    assert_eq!(right.code, "int a = 2;");
    assert_eq!(right.taken, Some(false));
    assert_eq!(
        right.path,
        vec!["ROOT".to_string(), "#ifdef FOO(False)".to_string()]
    );
}

#[test]
fn test_ifdef_without_else_drops_false_side() {
    let source = "#ifdef FOO\nint a = 1;\n#endif";
    let result = expand(source).unwrap();

    // The false outcome is empty, so no child exists on that side.
    assert!(result.tree.right.is_none());
    assert_eq!(result.leaves, 1);

    let left = leaf(&result.tree.left);
    assert_eq!(left.code, "int a = 1;");
}

#[test]
fn test_ifdef_without_else_keeps_outside_content() {
    let source = "int before;\n#ifdef FOO\nint guarded;\n#endif\nint after;";
    let result = expand(source).unwrap();

    let left = leaf(&result.tree.left);
    assert_eq!(left.code, "int before;\nint guarded;\nint after;");

    let right = leaf(&result.tree.right);
    assert_eq!(right.code, "int before;\nint after;");
}

#[test]
fn test_ifndef_inverts_sides() {
    let source = "#ifndef GUARD\nint g;\n#endif";
    let result = expand(source).unwrap();

    // Defining the probe symbol makes an #ifndef construct drop its body,
    // so the guarded code lives on the "condition false" side.
    assert!(result.tree.left.is_none());

    let right = leaf(&result.tree.right);
    assert_eq!(right.code, "int g;");
    assert_eq!(
        right.path,
        vec!["ROOT".to_string(), "#ifndef GUARD(False)".to_string()]
    );
}

#[test]
fn test_sequential_constructs_expand_to_all_variants() {
    let source = "#ifdef FOO\nint a = 1;\n#else\nint a = 2;\n#endif\n#ifdef BAR\nint b = 1;\n#endif";
    let result = expand(source).unwrap();

    // FOO once, then BAR once per FOO outcome.
    assert_eq!(result.branches_expanded, 3);
    assert_eq!(result.leaves, 4);

    let foo_true = leaf(&result.tree.left);
    assert_eq!(foo_true.branch_text.as_deref(), Some("#ifdef BAR"));

    let both = leaf(&foo_true.left);
    assert_eq!(both.code, "int a = 1;\nint b = 1;");
    assert_eq!(
        both.path,
        vec![
            "ROOT".to_string(),
            "#ifdef FOO(True)".to_string(),
            "#ifdef BAR(True)".to_string(),
        ]
    );

    let foo_only = leaf(&foo_true.right);
    assert_eq!(foo_only.code, "int a = 1;");

    let foo_false = leaf(&result.tree.right);
    let neither = leaf(&foo_false.right);
    assert_eq!(neither.code, "int a = 2;");
    assert_eq!(
        neither.path,
        vec![
            "ROOT".to_string(),
            "#ifdef FOO(False)".to_string(),
            "#ifdef BAR(False)".to_string(),
        ]
    );
}

#[test]
fn test_leaves_restore_neutralized_directives() {
    let source = "#include <stdio.h>\n#ifdef FOO\nint a;\n#endif\nint b;";
    let result = expand(source).unwrap();

    let left = leaf(&result.tree.left);
    assert_eq!(left.code, "#include <stdio.h>\nint a;\nint b;");

    let right = leaf(&result.tree.right);
    assert_eq!(right.code, "#include <stdio.h>\nint b;");
}

#[test]
fn test_unterminated_branch_fails() {
    let source = "#ifdef FOO\nint a = 1;";
    let err = expand(source).unwrap_err();

    assert!(matches!(err, Error::UnterminatedBranch(_)));
}

#[test]
fn test_depth_limit_aborts_expansion() {
    let source = "#ifdef FOO\nint a = 1;\n#else\nint a = 2;\n#endif";
    let config = ExpansionConfig {
        max_depth: 0,
        ..ExpansionConfig::default()
    };
    let err = expand_source(source, Box::new(FakeCpp), config).unwrap_err();

    assert!(matches!(err, Error::DepthExceeded(0)));
}

#[test]
fn test_get_evaluator_reports_availability() {
    // A machine without gcc/clang legitimately yields an error here; the
    // seam only promises a working evaluator when one is installed.
    if let Ok(evaluator) = crate::get_evaluator() {
        assert!(!evaluator.name().is_empty());
        assert!(evaluator.is_available());
    }
}

#[test]
fn test_expand_file_missing_input() {
    let err = expand_file(
        Path::new("/nonexistent/input.c"),
        Box::new(FakeCpp),
        ExpansionConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::FileNotFound(_)));
}
