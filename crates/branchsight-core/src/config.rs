//! Configuration types

use serde::{Deserialize, Serialize};

/// Expansion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Maximum decision-tree depth before the run is aborted. Every branch
    /// construct doubles the number of subtrees, so this bounds the
    /// worst-case cost of pathological inputs.
    pub max_depth: usize,

    /// Squeeze runs of blank lines in leaf code
    pub collapse_blank_lines: bool,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            collapse_blank_lines: true,
        }
    }
}
