//! The interval domain: the primary, non-relational numerical backend.
//!
//! Grounded on `middle_end/analysis/integer_interval.rs`
//! (`Value::R`/`Value::Bot`, `widen`, interval `+ - * /`), generalized from
//! an `i32`-only, pointer-agnostic domain into a full int/real split with
//! `meet`, `satisfies`, `of_constraints`, and `change_env`.

use std::cmp::{max, min};
use std::collections::BTreeMap;
use std::fmt;

use std::ops::Bound;
use std::ops::Bound::{Excluded, Included, Unbounded};

use crate::ast::{Kind, VarId};

use super::{affine_terms, Comparator, Constraint, Environment, NumericDomain, Satisfaction, SymExpr};

pub type IntBound = Bound<i64>;

#[derive(Clone, Copy, Debug, PartialEq)]
struct RealInterval {
    low: f64,
    high: f64,
}

impl RealInterval {
    fn top() -> Self {
        RealInterval { low: f64::NEG_INFINITY, high: f64::INFINITY }
    }

    fn point(x: f64) -> Self {
        RealInterval { low: x, high: x }
    }

    fn join(&self, other: &Self) -> Self {
        RealInterval { low: self.low.min(other.low), high: self.high.max(other.high) }
    }

    fn meet(&self, other: &Self) -> Option<Self> {
        let low = self.low.max(other.low);
        let high = self.high.min(other.high);
        if low > high { None } else { Some(RealInterval { low, high }) }
    }

    fn widen(&self, new: &Self) -> Self {
        RealInterval {
            low: if new.low < self.low { f64::NEG_INFINITY } else { self.low },
            high: if new.high > self.high { f64::INFINITY } else { self.high },
        }
    }
}

impl fmt::Display for RealInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

fn int_bound_value(b: IntBound) -> Option<i64> {
    match b {
        Included(n) => Some(n),
        Unbounded => None,
        Excluded(_) => unreachable!("interval bounds are always Included/Unbounded in this domain"),
    }
}

fn int_min(a: IntBound, b: IntBound) -> IntBound {
    match (a, b) {
        (Unbounded, _) | (_, Unbounded) => Unbounded,
        (Included(x), Included(y)) => Included(min(x, y)),
        _ => unreachable!(),
    }
}

fn int_max(a: IntBound, b: IntBound) -> IntBound {
    match (a, b) {
        (Unbounded, _) | (_, Unbounded) => Unbounded,
        (Included(x), Included(y)) => Included(max(x, y)),
        _ => unreachable!(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct IntInterval {
    low: IntBound,
    high: IntBound,
}

impl IntInterval {
    fn top() -> Self {
        IntInterval { low: Unbounded, high: Unbounded }
    }

    fn point(n: i64) -> Self {
        IntInterval { low: Included(n), high: Included(n) }
    }

    fn join(&self, other: &Self) -> Self {
        IntInterval { low: int_min(self.low, other.low), high: int_max(self.high, other.high) }
    }

    fn meet(&self, other: &Self) -> Option<Self> {
        let low = match (self.low, other.low) {
            (Unbounded, x) | (x, Unbounded) => x,
            (Included(a), Included(b)) => Included(max(a, b)),
            _ => unreachable!(),
        };
        let high = match (self.high, other.high) {
            (Unbounded, x) | (x, Unbounded) => x,
            (Included(a), Included(b)) => Included(min(a, b)),
            _ => unreachable!(),
        };
        match (low, high) {
            (Included(l), Included(h)) if l > h => None,
            _ => Some(IntInterval { low, high }),
        }
    }

    fn widen(&self, new: &Self) -> Self {
        let low = match (self.low, new.low) {
            (Included(x), Included(y)) if x <= y => self.low,
            _ if self.low == Unbounded => Unbounded,
            _ => Unbounded,
        };
        let high = match (self.high, new.high) {
            (Included(x), Included(y)) if x >= y => self.high,
            _ if self.high == Unbounded => Unbounded,
            _ => Unbounded,
        };
        // `self.low`/`self.high` unbounded must stay unbounded; the match
        // arms above already collapse to that since Unbounded never equals
        // Included in the first arm.
        IntInterval { low, high }
    }

    fn add(&self, other: &Self) -> Self {
        let low = match (self.low, other.low) {
            (Unbounded, _) | (_, Unbounded) => Unbounded,
            (Included(a), Included(b)) => Included(a.saturating_add(b)),
            _ => unreachable!(),
        };
        let high = match (self.high, other.high) {
            (Unbounded, _) | (_, Unbounded) => Unbounded,
            (Included(a), Included(b)) => Included(a.saturating_add(b)),
            _ => unreachable!(),
        };
        IntInterval { low, high }
    }

    fn neg(&self) -> Self {
        let low = match self.high {
            Unbounded => Unbounded,
            Included(h) => Included(-h),
            Excluded(_) => unreachable!("interval bounds are always Included/Unbounded in this domain"),
        };
        let high = match self.low {
            Unbounded => Unbounded,
            Included(l) => Included(-l),
            Excluded(_) => unreachable!("interval bounds are always Included/Unbounded in this domain"),
        };
        IntInterval { low, high }
    }

    fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    fn mul(&self, other: &Self) -> Self {
        if *self == IntInterval::point(0) || *other == IntInterval::point(0) {
            return IntInterval::point(0);
        }

        // bound-sign multiplication: classify each corner by its sign so an
        // Unbounded corner can still contribute a signed Unbounded result.
        fn corner(b: IntBound, sign_if_unbounded: i64) -> (Option<i64>, i64) {
            match b {
                Included(n) => (Some(n), 0),
                Unbounded => (None, sign_if_unbounded),
                Excluded(_) => unreachable!("interval bounds are always Included/Unbounded in this domain"),
            }
        }

        let corners = [(self.low, -1), (self.high, 1)];
        let other_corners = [(other.low, -1), (other.high, 1)];

        let mut finite = Vec::new();
        let mut neg_inf = false;
        let mut pos_inf = false;

        for (a, a_sign) in corners {
            for (b, b_sign) in other_corners {
                match (corner(a, a_sign), corner(b, b_sign)) {
                    ((Some(x), _), (Some(y), _)) => finite.push(x * y),
                    ((None, sa), (Some(y), _)) => {
                        let s = sa * y.signum();
                        if s > 0 { pos_inf = true } else if s < 0 { neg_inf = true } else { finite.push(0) }
                    }
                    ((Some(x), _), (None, sb)) => {
                        let s = sb * x.signum();
                        if s > 0 { pos_inf = true } else if s < 0 { neg_inf = true } else { finite.push(0) }
                    }
                    ((None, sa), (None, sb)) => {
                        let s = sa * sb;
                        if s > 0 { pos_inf = true } else if s < 0 { neg_inf = true }
                    }
                }
            }
        }

        let low = if neg_inf { Unbounded } else { Included(finite.iter().copied().min().unwrap_or(0)) };
        let high = if pos_inf { Unbounded } else { Included(finite.iter().copied().max().unwrap_or(0)) };
        IntInterval { low, high }
    }

    fn div(&self, other: &Self) -> Option<Self> {
        let mut other = *other;
        match (other.low, other.high) {
            (Included(0), Included(0)) => return None, // definitely div-by-zero: unreachable state
            (Included(0), _) => other.low = Included(1),
            (_, Included(0)) => other.high = Included(-1),
            (Included(l), Included(h)) if l < 0 && h > 0 => {
                other.low = Included(-1);
                other.high = Included(1);
            }
            (Unbounded, Unbounded) => {
                other.low = Included(-1);
                other.high = Included(1);
            }
            _ => {}
        }

        if *self == IntInterval::point(0) {
            return Some(IntInterval::point(0));
        }

        // same corner trick as multiplication, but with truncated-toward-zero division.
        fn corner(b: IntBound, sign_if_unbounded: i64) -> (Option<i64>, i64) {
            match b {
                Included(n) => (Some(n), 0),
                Unbounded => (None, sign_if_unbounded),
                Excluded(_) => unreachable!("interval bounds are always Included/Unbounded in this domain"),
            }
        }

        let corners = [(self.low, -1), (self.high, 1)];
        let other_corners = [(other.low, -1), (other.high, 1)];

        let mut finite = Vec::new();
        let mut neg_inf = false;
        let mut pos_inf = false;

        for (a, a_sign) in corners {
            for (b, b_sign) in other_corners {
                match (corner(a, a_sign), corner(b, b_sign)) {
                    ((Some(x), _), (Some(y), _)) => finite.push(x / y),
                    ((None, sa), (Some(y), _)) => {
                        let s = sa * y.signum();
                        if s > 0 { pos_inf = true } else if s < 0 { neg_inf = true } else { finite.push(0) }
                    }
                    ((Some(_), _), (None, _)) => finite.push(0),
                    ((None, sa), (None, sb)) => {
                        let s = sa * sb;
                        if s > 0 { pos_inf = true } else if s < 0 { neg_inf = true }
                    }
                }
            }
        }

        let low = if neg_inf { Unbounded } else { Included(finite.iter().copied().min().unwrap_or(0)) };
        let high = if pos_inf { Unbounded } else { Included(finite.iter().copied().max().unwrap_or(0)) };
        Some(IntInterval { low, high })
    }

    /// Truncated (toward zero) `%`; sound but coarse: `[-(|other|-1), |other|-1]`
    /// when `other` has a known finite bound, else top.
    fn rem(&self, other: &Self) -> Self {
        let bound = match (int_bound_value(other.low), int_bound_value(other.high)) {
            (Some(l), Some(h)) => l.unsigned_abs().max(h.unsigned_abs()),
            _ => return IntInterval::top(),
        };
        if bound == 0 {
            return IntInterval::top();
        }
        IntInterval { low: Included(-(bound as i64 - 1)), high: Included(bound as i64 - 1) }
    }
}

impl fmt::Display for IntInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = match self.low {
            Included(n) => n.to_string(),
            Unbounded => "-inf".to_string(),
            Excluded(_) => unreachable!(),
        };
        let hi = match self.high {
            Included(n) => n.to_string(),
            Unbounded => "+inf".to_string(),
            Excluded(_) => unreachable!(),
        };
        write!(f, "[{lo}, {hi}]")
    }
}

/// The interval abstract value. `bottom = true` means "no reachable
/// concrete state"; otherwise every variable in the paired [`Environment`]
/// has an entry.
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalDomain {
    bottom: bool,
    ints: BTreeMap<VarId, IntInterval>,
    reals: BTreeMap<VarId, RealInterval>,
}

impl IntervalDomain {
    fn var_interval_int(&self, v: &VarId) -> IntInterval {
        self.ints.get(v).copied().unwrap_or_else(IntInterval::top)
    }

    fn var_interval_real(&self, v: &VarId) -> RealInterval {
        self.reals.get(v).copied().unwrap_or_else(RealInterval::top)
    }

    fn eval(&self, expr: &SymExpr) -> Eval {
        match expr {
            SymExpr::ConstInt(n) => Eval::Int(IntInterval::point(*n)),
            SymExpr::ConstReal(x) => Eval::Real(RealInterval::point(*x)),
            SymExpr::Var(v) => match v.kind() {
                Kind::Int => Eval::Int(self.var_interval_int(v)),
                Kind::Real => Eval::Real(self.var_interval_real(v)),
            },
            SymExpr::Neg(e) => match self.eval(e) {
                Eval::Int(i) => Eval::Int(i.neg()),
                Eval::Real(r) => Eval::Real(RealInterval { low: -r.high, high: -r.low }),
            },
            SymExpr::Pos(e) => self.eval(e),
            SymExpr::Add(l, r) => self.eval_binop(l, r, IntInterval::add, |a, b| RealInterval {
                low: a.low + b.low,
                high: a.high + b.high,
            }),
            SymExpr::Sub(l, r) => self.eval_binop(l, r, IntInterval::sub, |a, b| RealInterval {
                low: a.low - b.high,
                high: a.high - b.low,
            }),
            SymExpr::Mul(l, r) => self.eval_binop(l, r, IntInterval::mul, |a, b| {
                let candidates = [a.low * b.low, a.low * b.high, a.high * b.low, a.high * b.high];
                RealInterval {
                    low: candidates.iter().cloned().fold(f64::INFINITY, f64::min),
                    high: candidates.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                }
            }),
            SymExpr::Div(l, r) => {
                let lv = self.eval(l);
                let rv = self.eval(r);
                match (lv, rv) {
                    (Eval::Int(a), Eval::Int(b)) => match a.div(&b) {
                        Some(v) => Eval::Int(v),
                        None => Eval::Int(IntInterval { low: Included(1), high: Included(0) }), // empty: unreachable
                    },
                    (a, b) => {
                        let a = a.as_real();
                        let b = b.as_real();
                        if b.low <= 0.0 && b.high >= 0.0 {
                            Eval::Real(RealInterval::top())
                        } else {
                            let candidates = [a.low / b.low, a.low / b.high, a.high / b.low, a.high / b.high];
                            Eval::Real(RealInterval {
                                low: candidates.iter().cloned().fold(f64::INFINITY, f64::min),
                                high: candidates.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                            })
                        }
                    }
                }
            }
            SymExpr::Mod(l, r) => match (self.eval(l), self.eval(r)) {
                (Eval::Int(a), Eval::Int(b)) => Eval::Int(a.rem(&b)),
                _ => Eval::Int(IntInterval::top()), // `%` on reals is rejected upstream
            },
        }
    }

    fn eval_binop(
        &self,
        l: &SymExpr,
        r: &SymExpr,
        int_op: impl Fn(&IntInterval, &IntInterval) -> IntInterval,
        real_op: impl Fn(RealInterval, RealInterval) -> RealInterval,
    ) -> Eval {
        match (self.eval(l), self.eval(r)) {
            (Eval::Int(a), Eval::Int(b)) => Eval::Int(int_op(&a, &b)),
            (a, b) => Eval::Real(real_op(a.as_real(), b.as_real())),
        }
    }

    /// Best-effort constraint refinement for a single affine expression,
    /// used by `of_constraints`. Exact when `expr` is affine in exactly one
    /// variable; falls back to an unrefined entry (sound, imprecise)
    /// otherwise, since a non-relational domain cannot represent a
    /// multi-variable constraint exactly.
    fn refine(&mut self, env: &Environment, constraint: &Constraint) {
        let Some((terms, bias)) = affine_terms(&constraint.expr) else { return };
        let [(var, coeff)] = terms.as_slice() else { return };
        if *coeff == 0.0 {
            return;
        }
        // constraint is `coeff*var + bias ⊳ 0` i.e. `var ⊳' -bias/coeff`, where
        // `⊳'` is `⊳` unchanged if `coeff>0`, or its direction reversed (the
        // bound becomes an upper bound instead of a lower one) if `coeff<0`;
        // `Eq`/`Ne` are unaffected by the sign of `coeff`.
        let threshold = -bias / coeff;
        let lower_bound = *coeff > 0.0;

        match var.kind() {
            Kind::Int => {
                if threshold.fract() != 0.0 && matches!(constraint.cmp, Comparator::Eq | Comparator::Ne) {
                    return; // an integer variable can never equal a non-integer threshold exactly via this path
                }
                let refined = match (constraint.cmp, lower_bound) {
                    (Comparator::Gt, true) => IntInterval { low: Included(threshold.floor() as i64 + 1), high: Unbounded },
                    (Comparator::Gt, false) => IntInterval { low: Unbounded, high: Included(threshold.ceil() as i64 - 1) },
                    (Comparator::Ge, true) => IntInterval { low: Included(threshold.ceil() as i64), high: Unbounded },
                    (Comparator::Ge, false) => IntInterval { low: Unbounded, high: Included(threshold.floor() as i64) },
                    (Comparator::Eq, _) => IntInterval::point(threshold.round() as i64),
                    (Comparator::Ne, _) => return, // `x != t` isn't an interval; leave unrefined
                };
                let current = self.var_interval_int(var);
                match current.meet(&refined) {
                    Some(v) => { self.ints.insert(var.clone(), v); }
                    None => self.bottom = true,
                }
            }
            Kind::Real => {
                let refined = match (constraint.cmp, lower_bound) {
                    (Comparator::Gt, true) => RealInterval { low: threshold, high: f64::INFINITY },
                    (Comparator::Gt, false) => RealInterval { low: f64::NEG_INFINITY, high: threshold },
                    (Comparator::Ge, true) => RealInterval { low: threshold, high: f64::INFINITY },
                    (Comparator::Ge, false) => RealInterval { low: f64::NEG_INFINITY, high: threshold },
                    (Comparator::Eq, _) => RealInterval::point(threshold),
                    (Comparator::Ne, _) => return,
                };
                let current = self.var_interval_real(var);
                match current.meet(&refined) {
                    Some(v) => { self.reals.insert(var.clone(), v); }
                    None => self.bottom = true,
                }
            }
        }
        let _ = env;
    }
}

#[derive(Clone, Copy)]
enum Eval {
    Int(IntInterval),
    Real(RealInterval),
}

impl Eval {
    fn as_real(self) -> RealInterval {
        match self {
            Eval::Int(i) => RealInterval {
                low: int_bound_value(i.low).map(|n| n as f64).unwrap_or(f64::NEG_INFINITY),
                high: int_bound_value(i.high).map(|n| n as f64).unwrap_or(f64::INFINITY),
            },
            Eval::Real(r) => r,
        }
    }
}

impl NumericDomain for IntervalDomain {
    fn top(env: &Environment) -> Self {
        IntervalDomain {
            bottom: false,
            ints: env.int_vars().map(|v| (v.clone(), IntInterval::top())).collect(),
            reals: env.real_vars().map(|v| (v.clone(), RealInterval::top())).collect(),
        }
    }

    fn bottom(_env: &Environment) -> Self {
        IntervalDomain { bottom: true, ints: BTreeMap::new(), reals: BTreeMap::new() }
    }

    fn is_bottom(&self) -> bool {
        self.bottom
    }

    fn equals(&self, other: &Self) -> bool {
        if self.bottom || other.bottom {
            return self.bottom == other.bottom;
        }
        self.ints == other.ints && self.reals == other.reals
    }

    fn join(&self, other: &Self) -> Self {
        if self.bottom {
            return other.clone();
        }
        if other.bottom {
            return self.clone();
        }
        let mut ints = BTreeMap::new();
        for (v, a) in &self.ints {
            let b = other.ints.get(v).copied().unwrap_or_else(IntInterval::top);
            ints.insert(v.clone(), a.join(&b));
        }
        let mut reals = BTreeMap::new();
        for (v, a) in &self.reals {
            let b = other.reals.get(v).copied().unwrap_or_else(RealInterval::top);
            reals.insert(v.clone(), a.join(&b));
        }
        IntervalDomain { bottom: false, ints, reals }
    }

    fn meet(&self, other: &Self) -> Self {
        if self.bottom || other.bottom {
            return IntervalDomain { bottom: true, ints: BTreeMap::new(), reals: BTreeMap::new() };
        }
        let mut ints = BTreeMap::new();
        let mut is_bottom = false;
        for (v, a) in &self.ints {
            let b = other.ints.get(v).copied().unwrap_or_else(IntInterval::top);
            match a.meet(&b) {
                Some(m) => { ints.insert(v.clone(), m); }
                None => is_bottom = true,
            }
        }
        let mut reals = BTreeMap::new();
        for (v, a) in &self.reals {
            let b = other.reals.get(v).copied().unwrap_or_else(RealInterval::top);
            match a.meet(&b) {
                Some(m) => { reals.insert(v.clone(), m); }
                None => is_bottom = true,
            }
        }
        if is_bottom {
            IntervalDomain { bottom: true, ints: BTreeMap::new(), reals: BTreeMap::new() }
        } else {
            IntervalDomain { bottom: false, ints, reals }
        }
    }

    fn widen(&self, new: &Self) -> Self {
        if self.bottom {
            return new.clone();
        }
        if new.bottom {
            return self.clone();
        }
        let mut ints = BTreeMap::new();
        for (v, a) in &self.ints {
            let b = new.ints.get(v).copied().unwrap_or_else(IntInterval::top);
            ints.insert(v.clone(), a.widen(&b));
        }
        let mut reals = BTreeMap::new();
        for (v, a) in &self.reals {
            let b = new.reals.get(v).copied().unwrap_or_else(RealInterval::top);
            reals.insert(v.clone(), a.widen(&b));
        }
        IntervalDomain { bottom: false, ints, reals }
    }

    fn assign(&self, var: &VarId, expr: &SymExpr) -> Self {
        if self.bottom {
            return self.clone();
        }
        let mut next = self.clone();
        match self.eval(expr) {
            Eval::Int(i) => {
                if matches!((i.low, i.high), (Included(l), Included(h)) if l > h) {
                    next.bottom = true;
                } else {
                    next.ints.insert(var.clone(), i);
                }
            }
            Eval::Real(r) => { next.reals.insert(var.clone(), r); }
        }
        next
    }

    fn satisfies(&self, constraint: &Constraint) -> Satisfaction {
        if self.bottom {
            return Satisfaction::Always; // vacuously true: no reachable state violates it
        }
        match self.eval(&constraint.expr) {
            Eval::Int(i) => classify_int(i, constraint.cmp),
            Eval::Real(r) => classify_real(r, constraint.cmp),
        }
    }

    fn of_constraints(env: &Environment, constraints: &[Constraint]) -> Self {
        let mut result = IntervalDomain::top(env);
        for c in constraints {
            if result.bottom {
                break;
            }
            result.refine(env, c);
        }
        result
    }

    fn change_env(&self, new_env: &Environment) -> Self {
        if self.bottom {
            return IntervalDomain::bottom(new_env);
        }
        let mut ints = BTreeMap::new();
        for v in new_env.int_vars() {
            ints.insert(v.clone(), self.ints.get(v).copied().unwrap_or_else(IntInterval::top));
        }
        let mut reals = BTreeMap::new();
        for v in new_env.real_vars() {
            reals.insert(v.clone(), self.reals.get(v).copied().unwrap_or_else(RealInterval::top));
        }
        IntervalDomain { bottom: false, ints, reals }
    }

    fn print(&self, env: &Environment) -> String {
        if self.bottom {
            return "bottom".to_string();
        }
        let mut out = String::new();
        for v in env.all_vars() {
            match v.kind() {
                Kind::Int => {
                    let iv = self.var_interval_int(v);
                    if iv != IntInterval::top() {
                        out.push_str(&format!("{v} -> {iv}\n"));
                    }
                }
                Kind::Real => {
                    let rv = self.var_interval_real(v);
                    if rv != RealInterval::top() {
                        out.push_str(&format!("{v} -> {rv}\n"));
                    }
                }
            }
        }
        out
    }
}

fn classify_int(i: IntInterval, cmp: Comparator) -> Satisfaction {
    let low = int_bound_value(i.low);
    let high = int_bound_value(i.high);
    match cmp {
        Comparator::Gt => {
            if low.is_some_and(|l| l > 0) {
                Satisfaction::Always
            } else if high.is_some_and(|h| h <= 0) {
                Satisfaction::Never
            } else {
                Satisfaction::Maybe
            }
        }
        Comparator::Ge => {
            if low.is_some_and(|l| l >= 0) {
                Satisfaction::Always
            } else if high.is_some_and(|h| h < 0) {
                Satisfaction::Never
            } else {
                Satisfaction::Maybe
            }
        }
        Comparator::Eq => {
            if low == Some(0) && high == Some(0) {
                Satisfaction::Always
            } else if low.is_some_and(|l| l > 0) || high.is_some_and(|h| h < 0) {
                Satisfaction::Never
            } else {
                Satisfaction::Maybe
            }
        }
        Comparator::Ne => match classify_int(i, Comparator::Eq) {
            Satisfaction::Always => Satisfaction::Never,
            Satisfaction::Never => Satisfaction::Always,
            Satisfaction::Maybe => Satisfaction::Maybe,
        },
    }
}

fn classify_real(r: RealInterval, cmp: Comparator) -> Satisfaction {
    match cmp {
        Comparator::Gt => {
            if r.low > 0.0 {
                Satisfaction::Always
            } else if r.high <= 0.0 {
                Satisfaction::Never
            } else {
                Satisfaction::Maybe
            }
        }
        Comparator::Ge => {
            if r.low >= 0.0 {
                Satisfaction::Always
            } else if r.high < 0.0 {
                Satisfaction::Never
            } else {
                Satisfaction::Maybe
            }
        }
        Comparator::Eq => {
            if r.low == 0.0 && r.high == 0.0 {
                Satisfaction::Always
            } else if r.low > 0.0 || r.high < 0.0 {
                Satisfaction::Never
            } else {
                Satisfaction::Maybe
            }
        }
        Comparator::Ne => match classify_real(r, Comparator::Eq) {
            Satisfaction::Always => Satisfaction::Never,
            Satisfaction::Never => Satisfaction::Always,
            Satisfaction::Maybe => Satisfaction::Maybe,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::int_var;
    use pretty_assertions::assert_eq;

    fn env_with(vars: &[VarId]) -> Environment {
        let mut env = Environment::new();
        for v in vars {
            env.extend(v);
        }
        env
    }

    #[test]
    fn assign_constant_is_a_point_interval() {
        let x = int_var("x");
        let env = env_with(&[x.clone()]);
        let top = IntervalDomain::top(&env);
        let after = top.assign(&x, &SymExpr::ConstInt(5));
        assert_eq!(after.var_interval_int(&x), IntInterval::point(5));
    }

    #[test]
    fn addition_widens_bounds_additively() {
        let x = int_var("x");
        let env = env_with(&[x.clone()]);
        let a = IntervalDomain::top(&env).assign(&x, &SymExpr::ConstInt(5));
        let sum = SymExpr::Add(Box::new(SymExpr::Var(x.clone())), Box::new(SymExpr::ConstInt(3)));
        let after = a.assign(&x, &sum);
        assert_eq!(after.var_interval_int(&x), IntInterval::point(8));
    }

    #[test]
    fn widen_drops_to_unbounded_when_growing() {
        let x = int_var("x");
        let env = env_with(&[x.clone()]);
        let old = IntervalDomain::top(&env).assign(&x, &SymExpr::ConstInt(0));
        let grown = old.assign(&x, &SymExpr::ConstInt(1)).join(&old);
        let widened = old.widen(&grown);
        assert_eq!(widened.var_interval_int(&x).low, Included(0));
        assert_eq!(widened.var_interval_int(&x).high, Unbounded);
    }

    #[test]
    fn of_constraints_refines_a_single_variable() {
        let x = int_var("x");
        let env = env_with(&[x.clone()]);
        let c = Constraint::new(
            SymExpr::Sub(Box::new(SymExpr::Var(x.clone())), Box::new(SymExpr::ConstInt(0))),
            Comparator::Gt,
        );
        let refined = IntervalDomain::of_constraints(&env, &[c]);
        assert_eq!(refined.var_interval_int(&x).low, Included(1));
        assert_eq!(refined.var_interval_int(&x).high, Unbounded);
    }

    #[test]
    fn meet_of_disjoint_intervals_is_bottom() {
        let x = int_var("x");
        let env = env_with(&[x.clone()]);
        let a = IntervalDomain::of_constraints(
            &env,
            &[Constraint::new(SymExpr::Sub(Box::new(SymExpr::Var(x.clone())), Box::new(SymExpr::ConstInt(0))), Comparator::Gt)],
        );
        let b = IntervalDomain::top(&env).assign(&x, &SymExpr::ConstInt(-5));
        assert!(a.meet(&b).is_bottom());
    }
}
