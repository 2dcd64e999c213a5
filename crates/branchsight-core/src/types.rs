//! Core type definitions

use serde::{Deserialize, Serialize};

/// A node in the variant decision tree.
///
/// Every branch construct splits a source text into a "condition true" text
/// and a "condition false" text. A node owns one such text and, once
/// expanded, up to two children holding the texts of the two outcomes. A
/// node without `branch_text` is a leaf: its code contains no remaining
/// branch constructs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantNode {
    /// Source text owned by this node. For a leaf this is the final
    /// resolved code; for an expanded node it is superseded by the
    /// children's code.
    pub code: String,
    /// Condition text of the branch construct that split this node.
    /// `None` marks a leaf.
    pub branch_text: Option<String>,
    /// Which side of the parent's branch this node represents.
    /// `None` for the root.
    pub taken: Option<bool>,
    /// Root-to-node decision trace, starting with "ROOT". Each ancestor
    /// branch's condition text is annotated with the side taken,
    /// e.g. `#ifdef FOO(True)`.
    pub path: Vec<String>,
    /// "Condition true" subtree
    pub left: Option<Box<VariantNode>>,
    /// "Condition false" subtree
    pub right: Option<Box<VariantNode>>,
}

impl VariantNode {
    /// Create the root node for an expansion run
    pub fn root(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            path: vec!["ROOT".to_string()],
            ..Self::default()
        }
    }

    /// Whether this node is a leaf (no further branch constructs)
    pub fn is_leaf(&self) -> bool {
        self.branch_text.is_none()
    }

    /// Number of concrete variants (leaves) in this subtree
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.left.as_ref().map(|n| n.leaf_count()).unwrap_or(0)
                + self.right.as_ref().map(|n| n.leaf_count()).unwrap_or(0)
        }
    }

    /// Depth of the deepest node in this subtree
    pub fn depth(&self) -> usize {
        let left = self.left.as_ref().map(|n| n.depth() + 1).unwrap_or(0);
        let right = self.right.as_ref().map(|n| n.depth() + 1).unwrap_or(0);
        left.max(right)
    }
}
