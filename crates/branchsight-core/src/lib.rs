//! BranchSight Core
//!
//! Core types and interfaces for the BranchSight variant-expansion engine.

pub mod config;
pub mod error;
pub mod types;

pub use config::ExpansionConfig;
pub use error::{Error, Result};
pub use types::*;
