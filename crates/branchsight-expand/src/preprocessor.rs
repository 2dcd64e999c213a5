//! External Preprocessor Integration
//!
//! Wraps a system C preprocessor (gcc or clang `-E`) as the conditional-
//! evaluation service. Each call writes the fragment to a temporary file,
//! resolves it with the synthetic probe symbol defined or undefined, and
//! reads the resolved text back from an output artifact. Temporary files
//! are owned by a single call and never reused.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{Builder as TempBuilder, NamedTempFile};
use thiserror::Error;
use tracing::debug;

use crate::config::MacroDefinition;
use crate::expand::SYNTHETIC_SYMBOL;
use crate::ConditionEvaluator;

/// Errors that can occur while driving the external preprocessor
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("No C preprocessor found. Please install gcc or clang.")]
    PreprocessorNotFound,

    #[error("Preprocessing failed: {0}")]
    PreprocessFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Options forwarded to every preprocessor invocation
#[derive(Debug, Clone, Default)]
pub struct EvaluatorOptions {
    /// Macro definitions (-D/-U flags). These only affect real macros that
    /// survive neutralization inertly, never the branch decision forcing.
    pub defines: Vec<MacroDefinition>,
    /// Include paths (-I flags)
    pub includes: Vec<PathBuf>,
    /// Additional preprocessor arguments
    pub extra_args: Vec<String>,
}

/// System C preprocessor wrapper
pub struct CPreprocessor {
    /// Path to the preprocessor executable
    tool_path: PathBuf,
    /// Pass-through options
    options: EvaluatorOptions,
}

impl CPreprocessor {
    /// Create a new wrapper, auto-detecting the preprocessor location
    pub fn new() -> Result<Self, PreprocessError> {
        let tool_path = Self::find_preprocessor()?;
        debug!("Found C preprocessor at: {:?}", tool_path);
        Ok(Self {
            tool_path,
            options: EvaluatorOptions::default(),
        })
    }

    /// Create a wrapper with a specific executable path
    pub fn with_path(tool_path: PathBuf) -> Self {
        Self {
            tool_path,
            options: EvaluatorOptions::default(),
        }
    }

    /// Set the pass-through options for every invocation
    pub fn with_options(mut self, options: EvaluatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Find a preprocessor executable
    fn find_preprocessor() -> Result<PathBuf, PreprocessError> {
        // Try common locations
        let candidates = [
            "gcc",
            "cc",
            "clang",
            "/usr/bin/gcc",
            "/usr/bin/cc",
            "/usr/bin/clang",
            "/opt/homebrew/bin/clang", // macOS ARM
        ];

        for candidate in candidates {
            if let Ok(output) = Command::new(candidate).arg("--version").output() {
                if output.status.success() {
                    return Ok(PathBuf::from(candidate));
                }
            }
        }

        Err(PreprocessError::PreprocessorNotFound)
    }

    /// Get preprocessor version
    pub fn version(&self) -> Option<String> {
        Command::new(&self.tool_path)
            .arg("--version")
            .output()
            .ok()
            .and_then(|o| {
                String::from_utf8(o.stdout)
                    .ok()
                    .and_then(|s| s.lines().next().map(|l| l.to_string()))
            })
    }

    /// Resolve one outcome of a fragment.
    ///
    /// The fragment is shuttled through a fresh pair of temporary files:
    /// one holding the input, one receiving the `-E` output.
    pub fn resolve_fragment(
        &self,
        fragment: &str,
        defined: bool,
    ) -> Result<String, PreprocessError> {
        let mut input = TempBuilder::new()
            .prefix("branchsight")
            .suffix(".c")
            .tempfile()?;
        input.write_all(fragment.as_bytes())?;
        input.flush()?;

        let output_file = NamedTempFile::new()?;

        let probe = if defined {
            MacroDefinition::defined(SYNTHETIC_SYMBOL)
        } else {
            MacroDefinition::undefined(SYNTHETIC_SYMBOL)
        };
        let args = self.build_args(&probe, output_file.path(), input.path());
        debug!("Resolving fragment with args: {:?}", args);

        let output = Command::new(&self.tool_path).args(&args).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PreprocessError::PreprocessFailed(stderr.to_string()));
        }

        let code = std::fs::read_to_string(output_file.path())?;
        Ok(strip_line_markers(&code))
    }

    /// Build preprocessor command line arguments
    fn build_args(&self, probe: &MacroDefinition, out: &Path, input: &Path) -> Vec<String> {
        let mut args = vec!["-E".to_string(), probe.to_arg()];

        // Add pass-through macro definitions
        for def in &self.options.defines {
            args.push(def.to_arg());
        }

        // Add include paths
        for include in &self.options.includes {
            args.push(format!("-I{}", include.display()));
        }

        // Add extra args
        args.extend(self.options.extra_args.clone());

        args.push(format!("-o{}", out.display()));
        args.push(input.display().to_string());

        args
    }
}

impl ConditionEvaluator for CPreprocessor {
    fn resolve(&self, fragment: &str, defined: bool) -> branchsight_core::Result<String> {
        self.resolve_fragment(fragment, defined)
            .map_err(|e| branchsight_core::Error::Preprocess(e.to_string()))
    }

    fn name(&self) -> &str {
        self.tool_path.to_str().unwrap_or("cpp")
    }

    fn is_available(&self) -> bool {
        Command::new(&self.tool_path)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Strip linemarker annotations (`# 1 "file.c"`) from preprocessed output
pub fn strip_line_markers(code: &str) -> String {
    code.lines()
        .filter(|line| !is_line_marker(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_line_marker(line: &str) -> bool {
    match line.strip_prefix("# ") {
        Some(rest) => rest
            .chars()
            .next()
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false),
        None => false,
    }
}
