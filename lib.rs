//! `rangecheck`: static value-range analysis of C programs by abstract
//! interpretation.
//!
//! Given a translation unit's already-built AST + CFG, this crate parses each function's intra-
//! procedural control-flow graph and computes a sound over-approximation of
//! the numeric values every variable may hold at every program point, using
//! a pluggable numerical abstract domain (intervals or octagons).
//!
//! The entry point is [`analyze_function`] in [`fixpoint`], driven by a
//! chosen [`domain::NumericDomain`] implementation.

pub mod ast;
pub mod block_store;
pub mod cfg;
pub mod config;
pub mod demos;
pub mod diagnostics;
pub mod domain;
pub mod env;
pub mod error;
pub mod expr;
pub mod fixpoint;
pub mod stmt;

pub use config::{AnalyzerConfig, DomainKind};
pub use error::{AnalysisError, Result};
pub use fixpoint::{analyze_function, AnalysisResult};
