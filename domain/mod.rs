//! The domain adapter: a thin façade over whichever
//! numerical backend a session picked. This crate ships two concrete
//! backends (see `intervals` and `octagon`) behind the [`NumericDomain`]
//! trait; a real deployment would instead bind this trait to an external
//! library such as Apron, whose abstract-value operation set this trait's
//! shape is lifted from almost one-to-one.

use std::collections::BTreeSet;
use std::fmt;

use crate::ast::{ArithOp, Kind, VarId};

pub mod intervals;
pub mod octagon;

/// The environment: the ordered partition of currently-tracked
/// variables into integer and real dimensions. Every [`NumericDomain`]
/// value is always paired with the environment it lives in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    int_vars: BTreeSet<VarId>,
    real_vars: BTreeSet<VarId>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn extend(&mut self, var: &VarId) {
        match var.kind() {
            Kind::Int => self.int_vars.insert(var.clone()),
            Kind::Real => self.real_vars.insert(var.clone()),
        };
    }

    /// Removes a dimension. Only ever done for `__tmp_` temporaries.
    pub fn remove(&mut self, var: &VarId) {
        self.int_vars.remove(var);
        self.real_vars.remove(var);
    }

    pub fn contains(&self, var: &VarId) -> bool {
        self.int_vars.contains(var) || self.real_vars.contains(var)
    }

    pub fn int_vars(&self) -> impl Iterator<Item = &VarId> {
        self.int_vars.iter()
    }

    pub fn real_vars(&self) -> impl Iterator<Item = &VarId> {
        self.real_vars.iter()
    }

    pub fn all_vars(&self) -> impl Iterator<Item = &VarId> {
        self.int_vars.iter().chain(self.real_vars.iter())
    }

    pub fn len(&self) -> usize {
        self.int_vars.len() + self.real_vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A numeric-kind-tagged symbolic expression: the tree the
/// expression builder constructs from AST fragments and that
/// [`NumericDomain::assign`] ultimately consumes. Distinct from
/// `ast::Expr`, which is the richer AST node handed over by the front end.
#[derive(Clone, Debug, PartialEq)]
pub enum SymExpr {
    ConstInt(i64),
    ConstReal(f64),
    Var(VarId),
    Neg(Box<SymExpr>),
    /// Unary `+`, kept as its own node (rather than folded away) so that
    /// repeated `push_unary(+)` calls are genuinely idempotent.
    Pos(Box<SymExpr>),
    Add(Box<SymExpr>, Box<SymExpr>),
    Sub(Box<SymExpr>, Box<SymExpr>),
    Mul(Box<SymExpr>, Box<SymExpr>),
    Div(Box<SymExpr>, Box<SymExpr>),
    Mod(Box<SymExpr>, Box<SymExpr>),
}

impl SymExpr {
    /// Numeric kind: real if any operand is real, else int.
    pub fn kind(&self) -> Kind {
        match self {
            SymExpr::ConstInt(_) => Kind::Int,
            SymExpr::ConstReal(_) => Kind::Real,
            SymExpr::Var(v) => v.kind(),
            SymExpr::Neg(e) | SymExpr::Pos(e) => e.kind(),
            SymExpr::Add(l, r)
            | SymExpr::Sub(l, r)
            | SymExpr::Mul(l, r)
            | SymExpr::Div(l, r)
            | SymExpr::Mod(l, r) => {
                if l.kind() == Kind::Real || r.kind() == Kind::Real {
                    Kind::Real
                } else {
                    Kind::Int
                }
            }
        }
    }

    pub fn binary(op: ArithOp, l: SymExpr, r: SymExpr) -> SymExpr {
        match op {
            ArithOp::Add => SymExpr::Add(Box::new(l), Box::new(r)),
            ArithOp::Sub => SymExpr::Sub(Box::new(l), Box::new(r)),
            ArithOp::Mul => SymExpr::Mul(Box::new(l), Box::new(r)),
            ArithOp::Div => SymExpr::Div(Box::new(l), Box::new(r)),
            ArithOp::Mod => SymExpr::Mod(Box::new(l), Box::new(r)),
        }
    }
}

impl fmt::Display for SymExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymExpr::ConstInt(n) => write!(f, "{n}"),
            SymExpr::ConstReal(x) => write!(f, "{x}"),
            SymExpr::Var(v) => write!(f, "{v}"),
            SymExpr::Neg(e) => write!(f, "-({e})"),
            SymExpr::Pos(e) => write!(f, "+({e})"),
            SymExpr::Add(l, r) => write!(f, "({l} + {r})"),
            SymExpr::Sub(l, r) => write!(f, "({l} - {r})"),
            SymExpr::Mul(l, r) => write!(f, "({l} * {r})"),
            SymExpr::Div(l, r) => write!(f, "({l} / {r})"),
            SymExpr::Mod(l, r) => write!(f, "({l} % {r})"),
        }
    }
}

/// The comparator of a constraint `e ⊳ 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparator {
    Gt,
    Ge,
    Eq,
    Ne,
}

/// A constraint `e ⊳ 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub expr: SymExpr,
    pub cmp: Comparator,
}

impl Constraint {
    pub fn new(expr: SymExpr, cmp: Comparator) -> Self {
        Constraint { expr, cmp }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = match self.cmp {
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
        };
        write!(f, "{} {sym} 0", self.expr)
    }
}

/// The 3-valued result of [`NumericDomain::satisfies`]: the
/// engine only ever special-cases `Always`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Satisfaction {
    Always,
    Maybe,
    Never,
}

/// Flattens a [`SymExpr`] into an affine form `bias + Σ coeff·var`, if it is
/// one (i.e. contains no multiplication/division/modulo between two
/// non-constant sub-expressions). Both concrete backends use this to turn a
/// constraint's expression into something their (limited) relational power
/// can represent exactly; an expression that isn't affine falls back to an
/// unrefined `top` at the call site, which stays sound.
pub fn affine_terms(expr: &SymExpr) -> Option<(Vec<(VarId, f64)>, f64)> {
    fn merge(mut terms: Vec<(VarId, f64)>, var: VarId, coeff: f64) -> Vec<(VarId, f64)> {
        if let Some(entry) = terms.iter_mut().find(|(v, _)| *v == var) {
            entry.1 += coeff;
        } else {
            terms.push((var, coeff));
        }
        terms
    }

    fn scale(terms: Vec<(VarId, f64)>, bias: f64, factor: f64) -> (Vec<(VarId, f64)>, f64) {
        (
            terms.into_iter().map(|(v, c)| (v, c * factor)).collect(),
            bias * factor,
        )
    }

    match expr {
        SymExpr::ConstInt(n) => Some((vec![], *n as f64)),
        SymExpr::ConstReal(x) => Some((vec![], *x)),
        SymExpr::Var(v) => Some((vec![(v.clone(), 1.0)], 0.0)),
        SymExpr::Neg(e) => {
            let (terms, bias) = affine_terms(e)?;
            Some(scale(terms, bias, -1.0))
        }
        SymExpr::Pos(e) => affine_terms(e),
        SymExpr::Add(l, r) => {
            let (lt, lb) = affine_terms(l)?;
            let (rt, rb) = affine_terms(r)?;
            let mut terms = lt;
            for (v, c) in rt {
                terms = merge(terms, v, c);
            }
            Some((terms, lb + rb))
        }
        SymExpr::Sub(l, r) => {
            let (lt, lb) = affine_terms(l)?;
            let (rt, rb) = affine_terms(r)?;
            let mut terms = lt;
            for (v, c) in rt {
                terms = merge(terms, v, -c);
            }
            Some((terms, lb - rb))
        }
        SymExpr::Mul(l, r) => {
            let (lt, lb) = affine_terms(l)?;
            let (rt, rb) = affine_terms(r)?;
            if lt.is_empty() {
                Some(scale(rt, rb, lb))
            } else if rt.is_empty() {
                Some(scale(lt, lb, rb))
            } else {
                None
            }
        }
        SymExpr::Div(l, r) => {
            let (lt, lb) = affine_terms(l)?;
            let (rt, rb) = affine_terms(r)?;
            if rt.is_empty() && rb != 0.0 {
                Some(scale(lt, lb, 1.0 / rb))
            } else {
                None
            }
        }
        SymExpr::Mod(_, _) => None,
    }
}

/// The domain-adapter contract. All operations are total; a backend that
/// cannot complete one is a fatal error, surfaced by the
/// concrete implementation via `crate::error::AnalysisError::BackendFailure`
/// at call sites that can actually fail (an in-process Rust domain like
/// the ones here never does; an FFI-backed one would).
pub trait NumericDomain: Clone + fmt::Debug {
    fn top(env: &Environment) -> Self;
    fn bottom(env: &Environment) -> Self;
    fn is_bottom(&self) -> bool;
    fn equals(&self, other: &Self) -> bool;
    fn join(&self, other: &Self) -> Self;
    fn meet(&self, other: &Self) -> Self;
    /// `old.widen(new)`: widening is NOT commutative.
    fn widen(&self, new: &Self) -> Self;
    fn assign(&self, var: &VarId, expr: &SymExpr) -> Self;
    fn satisfies(&self, constraint: &Constraint) -> Satisfaction;
    fn of_constraints(env: &Environment, constraints: &[Constraint]) -> Self;
    /// Extends or shrinks the environment. New dimensions are unconstrained;
    /// removed dimensions are projected away.
    fn change_env(&self, new_env: &Environment) -> Self;
    fn print(&self, env: &Environment) -> String;
}
