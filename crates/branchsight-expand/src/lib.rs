//! BranchSight Expansion Engine
//!
//! Isolates one branch construct (`#if`/`#ifdef`/`#ifndef` ... `#endif`) at a
//! time, forces both of its outcomes through an external C preprocessor, and
//! recursively builds the binary decision tree whose leaves are the concrete
//! source variants.
//!
//! ## Modules
//!
//! - `neutralize` - directive neutralization, marker tagging and restoration
//! - `expand` - single-construct isolation and dual evaluation
//! - `preprocessor` - gcc/clang `-E` integration
//! - `tree` - recursive variant tree construction
//! - `config` - macro definitions forwarded to the preprocessor

pub mod config;
pub mod expand;
pub mod neutralize;
pub mod preprocessor;
pub mod tree;

use std::path::Path;

use branchsight_core::{Error, ExpansionConfig, Result, VariantNode};
use serde::Serialize;

pub use expand::{BranchExpander, BranchExpansion, SYNTHETIC_SYMBOL};
pub use preprocessor::{CPreprocessor, EvaluatorOptions};
pub use tree::TreeBuilder;

/// Contract of the external conditional-evaluation service.
///
/// Given a self-contained source fragment, resolve every preprocessor
/// directive in it as if the synthetic probe symbol is defined
/// (`defined = true`) or undefined (`defined = false`). The engine calls
/// this exactly twice per branch construct, with the same fragment,
/// differing only in the flag.
pub trait ConditionEvaluator: Send + Sync {
    /// Resolve one outcome of the fragment
    fn resolve(&self, fragment: &str, defined: bool) -> Result<String>;

    /// Get evaluator name
    fn name(&self) -> &str;

    /// Check if the evaluator is available
    fn is_available(&self) -> bool;
}

/// Get the best available evaluator
pub fn get_evaluator() -> Result<Box<dyn ConditionEvaluator>> {
    let preprocessor = CPreprocessor::new().map_err(|e| Error::Preprocess(e.to_string()))?;
    Ok(Box::new(preprocessor))
}

/// Result of a full expansion run
#[derive(Debug, Serialize)]
pub struct ExpandResult {
    /// The variant decision tree
    pub tree: VariantNode,
    /// Branch constructs expanded during the run
    pub branches_expanded: usize,
    /// Number of concrete variants (leaves)
    pub leaves: usize,
}

/// Expand every conditional-compilation variant of a source text
pub fn expand_source(
    source: &str,
    evaluator: Box<dyn ConditionEvaluator>,
    config: ExpansionConfig,
) -> Result<ExpandResult> {
    let mut root = VariantNode::root(neutralize::neutralize_directives(source));
    let mut builder = TreeBuilder::new(evaluator).with_config(config);
    builder.build(&mut root)?;

    Ok(ExpandResult {
        branches_expanded: builder.branches_expanded(),
        leaves: root.leaf_count(),
        tree: root,
    })
}

/// Expand every conditional-compilation variant of a source file
pub fn expand_file(
    path: &Path,
    evaluator: Box<dyn ConditionEvaluator>,
    config: ExpansionConfig,
) -> Result<ExpandResult> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let source = std::fs::read_to_string(path)?;
    expand_source(&source, evaluator, config)
}

#[cfg(test)]
mod tests;
