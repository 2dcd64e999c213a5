//! Variant Tree Construction
//!
//! Recursively drives the expansion driver over a neutralized source text,
//! building the binary decision tree whose leaves are the concrete source
//! variants.

use branchsight_core::{Error, ExpansionConfig, Result, VariantNode};
use tracing::debug;

use crate::expand::BranchExpander;
use crate::neutralize::{collapse_blank_lines, restore_directives};
use crate::ConditionEvaluator;

/// Recursive variant tree builder.
///
/// Owns the evaluator for the whole run and counts expanded branch
/// constructs explicitly, so callers can read the total after the build
/// without any shared state.
pub struct TreeBuilder {
    expander: BranchExpander,
    evaluator: Box<dyn ConditionEvaluator>,
    config: ExpansionConfig,
    branches_expanded: usize,
}

impl TreeBuilder {
    pub fn new(evaluator: Box<dyn ConditionEvaluator>) -> Self {
        Self {
            expander: BranchExpander::new(),
            evaluator,
            config: ExpansionConfig::default(),
            branches_expanded: 0,
        }
    }

    pub fn with_config(mut self, config: ExpansionConfig) -> Self {
        self.config = config;
        self
    }

    /// Total branch constructs expanded by this builder
    pub fn branches_expanded(&self) -> usize {
        self.branches_expanded
    }

    /// Expand `node` and all of its descendants
    pub fn build(&mut self, node: &mut VariantNode) -> Result<()> {
        self.build_at(node, 0)
    }

    fn build_at(&mut self, node: &mut VariantNode, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(Error::DepthExceeded(self.config.max_depth));
        }

        let expansion = self.expander.expand_first(&node.code, self.evaluator.as_ref())?;

        // Annotate the inherited trace with the side of the parent's branch
        // this node represents, before the node's own children copy it.
        if let Some(taken) = node.taken {
            if let Some(last) = node.path.last_mut() {
                last.push_str(if taken { "(True)" } else { "(False)" });
            }
        }

        let expansion = match expansion {
            Some(expansion) => expansion,
            None => {
                // Leaf: bring the neutralized directives back and tidy up.
                node.code = restore_directives(&node.code);
                if self.config.collapse_blank_lines {
                    node.code = collapse_blank_lines(&node.code);
                }
                return Ok(());
            }
        };

        self.branches_expanded += 1;
        debug!(
            "expanded branch construct {} at depth {}: {}",
            self.branches_expanded, depth, expansion.branch_text
        );
        node.branch_text = Some(expansion.branch_text.clone());

        if !expansion.true_text.is_empty() {
            let mut child = child_node(node, &expansion.branch_text, &expansion.true_text, true);
            self.build_at(&mut child, depth + 1)?;
            node.left = Some(Box::new(child));
        }

        if !expansion.false_text.is_empty() {
            let mut child = child_node(node, &expansion.branch_text, &expansion.false_text, false);
            self.build_at(&mut child, depth + 1)?;
            node.right = Some(Box::new(child));
        }

        Ok(())
    }
}

/// Create a child holding one outcome of the parent's branch construct
fn child_node(parent: &VariantNode, branch_text: &str, code: &str, taken: bool) -> VariantNode {
    let mut path = parent.path.clone();
    path.push(branch_text.to_string());

    VariantNode {
        code: collapse_blank_lines(code),
        branch_text: None,
        taken: Some(taken),
        path,
        left: None,
        right: None,
    }
}
