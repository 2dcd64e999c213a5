//! BranchSight CLI
//!
//! Command-line interface for enumerating the variants of
//! conditionally-compiled C source.

use anyhow::{Context, Result};
use branchsight_core::{ExpansionConfig, VariantNode};
use branchsight_expand::config::MacroDefinition;
use branchsight_expand::{
    expand_file, BranchExpander, CPreprocessor, ConditionEvaluator, EvaluatorOptions,
};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "branchsight")]
#[command(author, version, about = "Conditional-compilation variant explorer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand every conditional-compilation variant of a source file
    Expand {
        /// Source file to expand
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Macro definitions forwarded to the preprocessor
        #[arg(short = 'D', value_name = "NAME[=VALUE]")]
        defines: Vec<String>,

        /// Macros undefined in the preprocessor
        #[arg(short = 'U', value_name = "NAME")]
        undefines: Vec<String>,

        /// Include search paths forwarded to the preprocessor
        #[arg(short = 'I', value_name = "DIR")]
        includes: Vec<PathBuf>,

        /// Preprocessor executable (default: auto-detect gcc/clang)
        #[arg(long, value_name = "PATH")]
        preprocessor: Option<PathBuf>,

        /// Maximum decision-tree depth
        #[arg(long, default_value_t = 64)]
        max_depth: usize,
    },

    /// List the branch constructs found in a file or directory
    Branches {
        /// Source file or directory
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Expand {
            file,
            output,
            format,
            defines,
            undefines,
            includes,
            preprocessor,
            max_depth,
        } => {
            cmd_expand(
                &file,
                output.as_deref(),
                &format,
                defines,
                undefines,
                includes,
                preprocessor,
                max_depth,
            )?;
        }
        Commands::Branches { path } => {
            cmd_branches(&path)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_expand(
    file: &Path,
    output: Option<&Path>,
    format: &str,
    defines: Vec<String>,
    undefines: Vec<String>,
    includes: Vec<PathBuf>,
    preprocessor: Option<PathBuf>,
    max_depth: usize,
) -> Result<()> {
    println!("📂 Expanding: {}", file.display());

    let mut options = EvaluatorOptions::default();
    for spec in &defines {
        options.defines.push(MacroDefinition::parse(spec));
    }
    for name in &undefines {
        options.defines.push(MacroDefinition::undefined(name));
    }
    options.includes = includes;

    let evaluator = match preprocessor {
        Some(path) => CPreprocessor::with_path(path),
        None => CPreprocessor::new().context("no usable C preprocessor found")?,
    }
    .with_options(options);
    debug!(
        "using preprocessor: {} ({})",
        evaluator.name(),
        evaluator.version().unwrap_or_else(|| "unknown".to_string())
    );

    let config = ExpansionConfig {
        max_depth,
        ..ExpansionConfig::default()
    };
    let result = expand_file(file, Box::new(evaluator), config)?;

    println!(
        "   Expanded {} branch constructs into {} variants",
        result.branches_expanded, result.leaves
    );

    let report = if format == "json" {
        serde_json::to_string_pretty(&result)?
    } else {
        let mut report = String::new();
        render_tree(&result.tree, &mut report);
        report
    };

    if let Some(out_path) = output {
        std::fs::write(out_path, &report)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        println!("   Output written to: {}", out_path.display());
    } else {
        print!("{}", report);
    }

    Ok(())
}

/// Render the tree depth-first, left (condition true) before right
fn render_tree(node: &VariantNode, out: &mut String) {
    let name = if node.is_leaf() { "LeafNode" } else { "Node" };
    let _ = writeln!(out, "====> {}: {}", name, node.path.join(" -> "));
    let _ = writeln!(out, "{}", node.code);
    let _ = writeln!(out, "-----------");

    if let Some(left) = &node.left {
        render_tree(left, out);
    }
    if let Some(right) = &node.right {
        render_tree(right, out);
    }
}

fn cmd_branches(path: &Path) -> Result<()> {
    let expander = BranchExpander::new();

    if path.is_dir() {
        for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && is_c_source(entry.path()) {
                // Skip silent files so directory sweeps stay readable.
                report_branches(entry.path(), &expander, false)?;
            }
        }
    } else {
        report_branches(path, &expander, true)?;
    }

    Ok(())
}

fn is_c_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("c" | "h")
    )
}

fn report_branches(file: &Path, expander: &BranchExpander, report_empty: bool) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let branches = expander.branch_lines(&source);

    if branches.is_empty() {
        if report_empty {
            println!("📄 {}", file.display());
            println!("   (no branch constructs found)");
        }
        return Ok(());
    }

    println!("📄 {}", file.display());
    for (line, text) in branches {
        println!("   L{:<5} {}", line, text);
    }
    println!();

    Ok(())
}
