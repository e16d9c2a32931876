//! The front-end contract: the shape of the AST + CFG this engine
//! consumes. A real C front end (lexer, parser, semantic analysis) is out of
//! scope; this module is the data shape such a front end would
//! hand over, plus a small builder (`ast::build`) used by tests and the CLI
//! demo programs to construct one directly, the way a lowering pass hands
//! an analysis pass a pre-validated function.

use std::fmt;
use std::rc::Rc;

use derive_more::Display;

use crate::error::{AnalysisError, Result};

pub mod build;

/// A variable's numeric kind: `int` covers every integer C type,
/// `real` covers `float`/`double`/`long double`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Int,
    Real,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Int => write!(f, "int"),
            Kind::Real => write!(f, "real"),
        }
    }
}

/// Classifies a C type string into [`Kind`]. Recognizes all
/// integer widths (`char` through `long long`, signed or unsigned) and all
/// real types, ignoring a leading/trailing `const`. Anything else is
/// unrecognized and is a fatal error at the call site.
pub fn classify_c_type(c_type: &str) -> Option<Kind> {
    let normalized: Vec<&str> = c_type
        .split_whitespace()
        .filter(|tok| *tok != "const")
        .collect();
    let normalized = normalized.join(" ");

    const INT_TYPES: &[&str] = &[
        "char",
        "signed char",
        "unsigned char",
        "short",
        "short int",
        "unsigned short",
        "unsigned short int",
        "int",
        "unsigned",
        "unsigned int",
        "long",
        "long int",
        "unsigned long",
        "unsigned long int",
        "long long",
        "long long int",
        "unsigned long long",
        "unsigned long long int",
    ];
    const REAL_TYPES: &[&str] = &["float", "double", "long double"];

    if INT_TYPES.contains(&normalized.as_str()) {
        Some(Kind::Int)
    } else if REAL_TYPES.contains(&normalized.as_str()) {
        Some(Kind::Real)
    } else {
        None
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct VarData {
    name: String,
    kind: Kind,
}

/// A variable identifier, carrying its classified [`Kind`] so callers never
/// need to re-derive it from a C type string after declaration.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(Rc<VarData>);

impl VarId {
    pub fn new(name: impl Into<String>, c_type: &str) -> Result<Self> {
        let kind = classify_c_type(c_type)
            .ok_or_else(|| AnalysisError::UnknownCType(c_type.to_string()))?;
        Ok(VarId(Rc::new(VarData { name: name.into(), kind })))
    }

    /// Builds a variable with an already-known kind, used internally for
    /// compiler-introduced temporaries which are never spelled
    /// as C source and so never go through `classify_c_type`.
    pub fn with_kind(name: impl Into<String>, kind: Kind) -> Self {
        VarId(Rc::new(VarData { name: name.into(), kind }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> Kind {
        self.0.kind
    }

    /// Whether this is a compiler-introduced temporary.
    pub fn is_temporary(&self) -> bool {
        self.0.name.starts_with("__tmp_")
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

/// A basic-block identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub struct BbId(Rc<str>);

pub fn bb_id(name: &str) -> BbId {
    BbId(Rc::from(name))
}

impl BbId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A `goto` label is a loop-exit label iff it begins with the literal
    /// prefix `while_break`.
    pub fn is_loop_break_label(&self) -> bool {
        self.0.starts_with("while_break")
    }
}

/// Arithmetic operators, shared between the symbolic-expression tree and
/// the expression builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum ArithOp {
    #[display(fmt = "+")]
    Add,
    #[display(fmt = "-")]
    Sub,
    #[display(fmt = "*")]
    Mul,
    #[display(fmt = "/")]
    Div,
    #[display(fmt = "%")]
    Mod,
}

/// Relational operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum RelOp {
    #[display(fmt = ">")]
    Gt,
    #[display(fmt = ">=")]
    Ge,
    #[display(fmt = "<")]
    Lt,
    #[display(fmt = "<=")]
    Le,
    #[display(fmt = "==")]
    Eq,
    #[display(fmt = "!=")]
    Ne,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum ShiftOp {
    #[display(fmt = "<<")]
    Shl,
    #[display(fmt = ">>")]
    Shr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum BitOp {
    #[display(fmt = "&")]
    And,
    #[display(fmt = "|")]
    Or,
}

/// An AST expression node, as the (absent) front end would hand it over.
/// This is richer than the internal symbolic expression `SymExpr`,
/// which the expression builder constructs *from* these nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    IntLit(i64),
    RealLit(f64),
    Var(VarId),
    /// Unary `+`/`-` on an arbitrary sub-expression.
    Unary(UnaryOp, Box<Expr>),
    Binary(ArithOp, Box<Expr>, Box<Expr>),
    Rel(RelOp, Box<Expr>, Box<Expr>),
    /// Logical `!`.
    Not(Box<Expr>),
    PreIncr(VarId),
    PreDecr(VarId),
    PostIncr(VarId),
    PostDecr(VarId),
    /// `x = e` used as a sub-expression (cascaded assignment).
    Assign(VarId, Box<Expr>),
    CompoundAssign(VarId, ArithOp, Box<Expr>),
    Shift(ShiftOp, Box<Expr>, Box<Expr>),
    Bitwise(BitOp, Box<Expr>, Box<Expr>),
    BitwiseNot(Box<Expr>),
    /// Array subscript, address-of, dereference, call, a string/char literal
    /// used in a numeric position, or a cast other than lvalue-to-rvalue or
    /// numeric.
    Unsupported(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum UnaryOp {
    #[display(fmt = "-")]
    Neg,
    #[display(fmt = "+")]
    Pos,
}

/// A statement inside a basic block, excluding the block's terminator.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Decl { var: VarId, init: Option<Expr> },
    Assign { lhs: VarId, rhs: Expr },
    CompoundAssign { lhs: VarId, op: ArithOp, rhs: Expr },
    /// `x++;`/`--x;` etc. used as a standalone statement.
    ExprStmt(Expr),
    Return(Option<Expr>),
    /// An lvalue the engine does not model is assigned to (e.g. `a[i] = e`):
    /// sound only because arrays/pointers are a non-goal here.
    UnsupportedAssign(&'static str),
}

/// The terminator statement classes the engine recognizes; a
/// block with none of these is a plain fall-through (`None`).
#[derive(Clone, Debug, PartialEq)]
pub enum Terminator {
    None,
    If(Expr),
    While(Expr),
    Do(Expr),
    For(Expr),
    Goto(String),
}

impl Terminator {
    pub fn condition(&self) -> Option<&Expr> {
        match self {
            Terminator::If(e) | Terminator::While(e) | Terminator::Do(e) | Terminator::For(e) => Some(e),
            Terminator::None | Terminator::Goto(_) => None,
        }
    }

    pub fn is_branching(&self) -> bool {
        self.condition().is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: BbId,
    pub stmts: Vec<Stmt>,
    pub term: Terminator,
    /// Successors in front-end order: for a branching terminator, the
    /// then-successor is first (matching source
    /// order); for `goto`/fall-through, the single successor; empty for
    /// the exit block.
    pub succs: Vec<BbId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<(String, String)>,
    pub entry: BbId,
    pub exit: BbId,
    pub blocks: std::collections::BTreeMap<BbId, Block>,
}

impl Function {
    pub fn block(&self, id: &BbId) -> &Block {
        self.blocks.get(id).unwrap_or_else(|| panic!("no such block: {id}"))
    }

    /// The set of blocks reachable from `entry` (the reachability
    /// oracle), computed once per function rather than re-walked per query.
    pub fn reachable_from_entry(&self) -> std::collections::BTreeSet<BbId> {
        let mut seen = std::collections::BTreeSet::new();
        let mut worklist = vec![self.entry.clone()];
        while let Some(bb) = worklist.pop() {
            if !seen.insert(bb.clone()) {
                continue;
            }
            if let Some(block) = self.blocks.get(&bb) {
                for succ in &block.succs {
                    if !seen.contains(succ) {
                        worklist.push(succ.clone());
                    }
                }
            }
        }
        seen
    }

    pub fn is_reachable(&self, from: &BbId, to: &BbId) -> bool {
        if from == to {
            return true;
        }
        let mut seen = std::collections::BTreeSet::new();
        let mut worklist = vec![from.clone()];
        while let Some(bb) = worklist.pop() {
            if !seen.insert(bb.clone()) {
                continue;
            }
            if let Some(block) = self.blocks.get(&bb) {
                for succ in &block.succs {
                    if succ == to {
                        return true;
                    }
                    if !seen.contains(succ) {
                        worklist.push(succ.clone());
                    }
                }
            }
        }
        false
    }
}
