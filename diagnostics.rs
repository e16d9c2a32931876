//! Non-fatal diagnostics accumulated during analysis.
//!
//! Unsupported constructs, `%` applied to a real operand, and empty-stack
//! pops are all sound-but-imprecise situations that must not abort the run.
//! They are collected here instead, the same way the front end's
//! `ValidationError` accumulates independent check failures without
//! short-circuiting.

use std::fmt;
use std::ops::AddAssign;

use crate::ast::BbId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// An AST node this engine intentionally does not model (array
    /// subscript, address-of, dereference, call, casts other than
    /// lvalue-to-rvalue/numeric, a string/char literal in numeric position).
    UnsupportedConstruct { block: BbId, what: &'static str },
    /// `%` was applied with a real operand; the expression was not pushed.
    ModuloOnReal { block: BbId },
    /// A bitwise operator (`&`, `|`, `~`) was evaluated for its side effects
    /// only; it never mutates the abstract value.
    BitwiseIgnored { block: BbId },
    /// The expression stack was popped while empty.
    EmptyStackPop { block: BbId },
    /// A block is neither reachable from entry nor a back-edge endpoint.
    UnreachableBlockSkipped { block: BbId },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedConstruct { block, what } => {
                write!(f, "{block}: unsupported construct ignored: {what}")
            }
            Diagnostic::ModuloOnReal { block } => {
                write!(f, "{block}: `%` rejected, operand has real kind")
            }
            Diagnostic::BitwiseIgnored { block } => {
                write!(f, "{block}: bitwise operator evaluated with no abstract effect")
            }
            Diagnostic::EmptyStackPop { block } => {
                write!(f, "{block}: popped an empty expression stack")
            }
            Diagnostic::UnreachableBlockSkipped { block } => {
                write!(f, "{block}: skipped, unreachable from entry")
            }
        }
    }
}

/// An accumulator of [`Diagnostic`]s for one function's analysis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics(Vec::new())
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.0.push(diag);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

impl AddAssign for Diagnostics {
    fn add_assign(&mut self, mut rhs: Self) {
        self.0.append(&mut rhs.0);
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diag in &self.0 {
            writeln!(f, "{diag}")?;
        }
        Ok(())
    }
}
