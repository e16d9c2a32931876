//! Ergonomic constructors for [`super::Expr`]/[`super::Stmt`]/[`super::Function`],
//! used by tests and the CLI's embedded demo programs in place of a real C
//! parser.

use std::collections::BTreeMap;

use super::{ArithOp, BbId, Block, Expr, Function, Kind, RelOp, Stmt, Terminator, VarId, bb_id};

pub fn int_lit(n: i64) -> Expr {
    Expr::IntLit(n)
}

pub fn real_lit(x: f64) -> Expr {
    Expr::RealLit(x)
}

pub fn var(v: &VarId) -> Expr {
    Expr::Var(v.clone())
}

pub fn add(l: Expr, r: Expr) -> Expr {
    Expr::Binary(ArithOp::Add, Box::new(l), Box::new(r))
}

pub fn sub(l: Expr, r: Expr) -> Expr {
    Expr::Binary(ArithOp::Sub, Box::new(l), Box::new(r))
}

pub fn mul(l: Expr, r: Expr) -> Expr {
    Expr::Binary(ArithOp::Mul, Box::new(l), Box::new(r))
}

pub fn div(l: Expr, r: Expr) -> Expr {
    Expr::Binary(ArithOp::Div, Box::new(l), Box::new(r))
}

pub fn rel(op: RelOp, l: Expr, r: Expr) -> Expr {
    Expr::Rel(op, Box::new(l), Box::new(r))
}

/// A function builder that hands back plain [`Function`] values; it exists
/// purely to make constructing small CFGs in tests/demos readable, mirroring
/// how `front_end::lower::Lowering` accumulates a function's blocks before
/// handing back a `lir::Function`.
pub struct FunctionBuilder {
    name: String,
    params: Vec<(String, String, VarId)>,
    blocks: BTreeMap<BbId, Block>,
    exit: BbId,
}

impl FunctionBuilder {
    pub fn new(name: &str) -> Self {
        FunctionBuilder {
            name: name.to_string(),
            params: Vec::new(),
            blocks: BTreeMap::new(),
            exit: bb_id("exit"),
        }
    }

    pub fn param(mut self, var: &VarId, c_type: &str) -> Self {
        self.params.push((var.name().to_string(), c_type.to_string(), var.clone()));
        self
    }

    pub fn block(mut self, id: BbId, stmts: Vec<Stmt>, term: Terminator, succs: Vec<BbId>) -> Self {
        self.blocks.insert(id.clone(), Block { id, stmts, term, succs });
        self
    }

    /// Marks `id` as the function's exit block (defaults to `bb_id("exit")`
    /// if never called).
    pub fn exit(mut self, id: BbId) -> Self {
        self.exit = id;
        self
    }

    pub fn build(self) -> Function {
        let params = self.params.into_iter().map(|(n, t, _)| (n, t)).collect();
        Function {
            name: self.name,
            params,
            entry: bb_id("entry"),
            exit: self.exit,
            blocks: self.blocks,
        }
    }
}

pub fn int_var(name: &str) -> VarId {
    VarId::with_kind(name, Kind::Int)
}

pub fn real_var(name: &str) -> VarId {
    VarId::with_kind(name, Kind::Real)
}
