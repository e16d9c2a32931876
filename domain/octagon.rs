//! The octagon domain: a weakly relational backend capable of tracking
//! constraints of the shape `±v ± w <= c` in addition to per-variable bounds
//! (Miné, "The Octagon Abstract Domain"). `polyhedra` sessions are mapped
//! onto this backend (see DESIGN.md) since full convex polyhedra are out of
//! scope here.
//!
//! Each tracked variable `v` gets two DBM nodes, `pos(v) = +v` and
//! `neg(v) = -v`; a `2n x 2n` matrix `m` represents `node_j - node_i <=
//! m[i][j]`. A plain bound `v <= c` is the degenerate case `2v <= 2c`, i.e.
//! `m[neg(v)][pos(v)] <= 2c`.

use std::fmt;

use crate::ast::{Kind, VarId};

use super::{affine_terms, Comparator, Constraint, Environment, NumericDomain, Satisfaction, SymExpr};

const INF: f64 = f64::INFINITY;

#[derive(Clone, Debug, PartialEq)]
pub struct OctagonDomain {
    bottom: bool,
    vars: Vec<VarId>,
    /// `2n x 2n`, row-major; empty iff `bottom`.
    matrix: Vec<f64>,
}

fn pos(i: usize) -> usize {
    2 * i
}

fn neg(i: usize) -> usize {
    2 * i + 1
}

fn bar(node: usize) -> usize {
    node ^ 1
}

impl OctagonDomain {
    fn size(&self) -> usize {
        2 * self.vars.len()
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        self.matrix[i * self.size() + j]
    }

    fn set(&mut self, i: usize, j: usize, v: f64) {
        let size = self.size();
        self.matrix[i * size + j] = v;
    }

    fn tighten(&mut self, i: usize, j: usize, bound: f64) {
        let current = self.at(i, j);
        if bound < current {
            self.set(i, j, bound);
        }
    }

    fn idx(&self, v: &VarId) -> Option<usize> {
        self.vars.iter().position(|w| w == v)
    }

    fn fresh_matrix(n: usize) -> Vec<f64> {
        let size = 2 * n;
        let mut m = vec![INF; size * size];
        for i in 0..size {
            m[i * size + i] = 0.0;
        }
        m
    }

    fn top_with(vars: Vec<VarId>) -> Self {
        let matrix = Self::fresh_matrix(vars.len());
        OctagonDomain { bottom: false, vars, matrix }
    }

    fn bottom_with(vars: Vec<VarId>) -> Self {
        OctagonDomain { bottom: true, vars, matrix: Vec::new() }
    }

    fn add_var(&mut self, v: &VarId) -> usize {
        if let Some(i) = self.idx(v) {
            return i;
        }
        let old_n = self.vars.len();
        let old_size = 2 * old_n;
        self.vars.push(v.clone());
        let new_size = 2 * self.vars.len();
        let mut matrix = vec![INF; new_size * new_size];
        for i in 0..new_size {
            matrix[i * new_size + i] = 0.0;
        }
        for i in 0..old_size {
            for j in 0..old_size {
                matrix[i * new_size + j] = self.matrix[i * old_size + j];
            }
        }
        self.matrix = matrix;
        old_n
    }

    /// Rebuilds `self` over `target_vars`, dropping dimensions not present
    /// there and leaving newly introduced ones unconstrained.
    fn realign(&self, target_vars: &[VarId]) -> Self {
        if self.bottom {
            return OctagonDomain::bottom_with(target_vars.to_vec());
        }
        let mut out = OctagonDomain::top_with(target_vars.to_vec());
        for (ti, v) in target_vars.iter().enumerate() {
            let Some(si) = self.idx(v) else { continue };
            for (tj, w) in target_vars.iter().enumerate() {
                let Some(sj) = self.idx(w) else { continue };
                for (dpi, dpj) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                    let value = self.at(2 * si + dpi, 2 * sj + dpj);
                    out.set(2 * ti + dpi, 2 * tj + dpj, value);
                }
            }
        }
        out
    }

    fn union_vars(a: &[VarId], b: &[VarId]) -> Vec<VarId> {
        let mut out: Vec<VarId> = a.to_vec();
        for v in b {
            if !out.contains(v) {
                out.push(v.clone());
            }
        }
        out.sort();
        out
    }

    /// Strong closure (Miné §3): all-pairs shortest paths, then
    /// strengthening with the unary (self-pair) bounds, then a second
    /// shortest-paths pass to propagate the strengthened edges. Detects
    /// infeasibility as a negative self-loop.
    fn close(&mut self) {
        if self.bottom {
            return;
        }
        let size = self.size();
        self.floyd_warshall();

        let mut strengthened = self.matrix.clone();
        for i in 0..size {
            let ib = bar(i);
            let m_i_ib = self.at(i, ib);
            if m_i_ib == INF {
                continue;
            }
            for j in 0..size {
                let jb = bar(j);
                let m_jb_j = self.at(jb, j);
                if m_jb_j == INF {
                    continue;
                }
                let via = (m_i_ib + m_jb_j) / 2.0;
                let slot = i * size + j;
                if via < strengthened[slot] {
                    strengthened[slot] = via;
                }
            }
        }
        self.matrix = strengthened;
        self.floyd_warshall();

        for i in 0..size {
            if self.at(i, i) < 0.0 {
                self.bottom = true;
                self.matrix = Vec::new();
                return;
            }
        }
    }

    fn floyd_warshall(&mut self) {
        let size = self.size();
        for k in 0..size {
            for i in 0..size {
                let m_ik = self.at(i, k);
                if m_ik == INF {
                    continue;
                }
                for j in 0..size {
                    let m_kj = self.at(k, j);
                    if m_kj == INF {
                        continue;
                    }
                    let via = m_ik + m_kj;
                    if via < self.at(i, j) {
                        self.set(i, j, via);
                    }
                }
            }
        }
    }

    fn var_bound(&self, idx: usize) -> (f64, f64) {
        let hi = self.at(neg(idx), pos(idx)) / 2.0;
        let lo = -self.at(pos(idx), neg(idx)) / 2.0;
        (lo, hi)
    }

    fn forget(&mut self, idx: usize) {
        let size = self.size();
        for node in [pos(idx), neg(idx)] {
            for j in 0..size {
                if j == node {
                    continue;
                }
                self.set(node, j, INF);
                self.set(j, node, INF);
            }
        }
    }

    /// Exact shift of a tracked variable by a constant, used for `v := v +
    /// c` (in particular, flushed pending increments): every edge incident
    /// to `v`'s nodes shifts by `c` without any loss of relational
    /// information, so no `forget` is needed.
    fn shift(&mut self, idx: usize, c: f64) {
        let size = self.size();
        for j in 0..size {
            if j == pos(idx) || j == neg(idx) {
                continue;
            }
            let v = self.at(pos(idx), j);
            if v != INF {
                self.set(pos(idx), j, v - c);
            }
            let v = self.at(j, pos(idx));
            if v != INF {
                self.set(j, pos(idx), v + c);
            }
            let v = self.at(neg(idx), j);
            if v != INF {
                self.set(neg(idx), j, v + c);
            }
            let v = self.at(j, neg(idx));
            if v != INF {
                self.set(j, neg(idx), v - c);
            }
        }
        let v = self.at(neg(idx), pos(idx));
        if v != INF {
            self.set(neg(idx), pos(idx), v + 2.0 * c);
        }
        let v = self.at(pos(idx), neg(idx));
        if v != INF {
            self.set(pos(idx), neg(idx), v - 2.0 * c);
        }
    }

    /// Generic, non-relational fallback: evaluates `expr`'s possible range
    /// from each variable's current unary bound. Sound for any expression,
    /// including ones `affine_terms` rejects as nonlinear.
    fn eval_bounds(&self, expr: &SymExpr) -> (f64, f64) {
        match expr {
            SymExpr::ConstInt(n) => (*n as f64, *n as f64),
            SymExpr::ConstReal(x) => (*x, *x),
            SymExpr::Var(v) => match self.idx(v) {
                Some(i) => self.var_bound(i),
                None => (f64::NEG_INFINITY, INF),
            },
            SymExpr::Neg(e) => {
                let (lo, hi) = self.eval_bounds(e);
                (-hi, -lo)
            }
            SymExpr::Pos(e) => self.eval_bounds(e),
            SymExpr::Add(l, r) => {
                let (al, ah) = self.eval_bounds(l);
                let (bl, bh) = self.eval_bounds(r);
                (al + bl, ah + bh)
            }
            SymExpr::Sub(l, r) => {
                let (al, ah) = self.eval_bounds(l);
                let (bl, bh) = self.eval_bounds(r);
                (al - bh, ah - bl)
            }
            SymExpr::Mul(l, r) => {
                let (al, ah) = self.eval_bounds(l);
                let (bl, bh) = self.eval_bounds(r);
                let candidates = [al * bl, al * bh, ah * bl, ah * bh];
                (
                    candidates.iter().cloned().fold(INF, f64::min),
                    candidates.iter().cloned().fold(-INF, f64::max),
                )
            }
            SymExpr::Div(l, r) => {
                let (al, ah) = self.eval_bounds(l);
                let (bl, bh) = self.eval_bounds(r);
                if bl <= 0.0 && bh >= 0.0 {
                    (-INF, INF)
                } else {
                    let candidates = [al / bl, al / bh, ah / bl, ah / bh];
                    (
                        candidates.iter().cloned().fold(INF, f64::min),
                        candidates.iter().cloned().fold(-INF, f64::max),
                    )
                }
            }
            SymExpr::Mod(_, _) => (-INF, INF),
        }
    }

    /// The shape a constraint's (or assignment's) affine form takes once
    /// flattened, for the purposes a DBM can represent exactly.
    fn classify_affine(&self, terms: &[(VarId, f64)]) -> Option<(Target, bool)> {
        match terms {
            [(v, c)] => {
                let i = self.idx(v)?;
                Some((Target::Unary(i), *c > 0.0))
            }
            [(v, c1), (w, c2)] if c1.abs() == 1.0 && c2.abs() == 1.0 => {
                let vi = self.idx(v)?;
                let wi = self.idx(w)?;
                let target = if *c2 / *c1 > 0.0 { Target::Sum(vi, wi) } else { Target::Diff(vi, wi) };
                Some((target, *c1 > 0.0))
            }
            _ => None,
        }
    }

    /// Tightens the matrix so that `target ⊳ threshold` holds, where
    /// `lower_bound` says whether the original affine coefficient on the
    /// target's leading variable was positive (so `Gt`/`Ge` become lower
    /// bounds) or negative (so they become upper bounds).
    fn apply_bound(&mut self, target: Target, threshold: f64, lower_bound: bool, cmp: Comparator) {
        let is_int = target.is_int(self);
        match target {
            Target::Unary(i) => {
                match (cmp, lower_bound) {
                    (Comparator::Eq, _) => {
                        self.tighten(neg(i), pos(i), 2.0 * threshold);
                        self.tighten(pos(i), neg(i), -2.0 * threshold);
                    }
                    (Comparator::Ne, _) => {}
                    (Comparator::Gt, true) => {
                        let k = if is_int { threshold.floor() + 1.0 } else { threshold };
                        self.tighten(pos(i), neg(i), -2.0 * k);
                    }
                    (Comparator::Gt, false) => {
                        let k = if is_int { threshold.ceil() - 1.0 } else { threshold };
                        self.tighten(neg(i), pos(i), 2.0 * k);
                    }
                    (Comparator::Ge, true) => {
                        let k = if is_int { threshold.ceil() } else { threshold };
                        self.tighten(pos(i), neg(i), -2.0 * k);
                    }
                    (Comparator::Ge, false) => {
                        let k = if is_int { threshold.floor() } else { threshold };
                        self.tighten(neg(i), pos(i), 2.0 * k);
                    }
                }
            }
            Target::Sum(vi, wi) => self.apply_relational(pos(vi), neg(wi), threshold, lower_bound, cmp, is_int),
            Target::Diff(vi, wi) => self.apply_relational(pos(vi), pos(wi), threshold, lower_bound, cmp, is_int),
        }
    }

    /// Shared tightening for the `Sum`/`Diff` cases: `node_a` is `+v`;
    /// `node_b` is `neg(w)` for a sum target or `pos(w)` for a difference
    /// target, chosen so that `node_a - node_b` equals the target quantity.
    fn apply_relational(
        &mut self,
        node_a: usize,
        node_b: usize,
        threshold: f64,
        lower_bound: bool,
        cmp: Comparator,
        is_int: bool,
    ) {
        match (cmp, lower_bound) {
            (Comparator::Eq, _) => {
                self.tighten(node_b, node_a, threshold);
                self.tighten(node_a, node_b, -threshold);
            }
            (Comparator::Ne, _) => {}
            (Comparator::Gt, true) => {
                let k = if is_int { threshold.floor() + 1.0 } else { threshold };
                self.tighten(node_a, node_b, -k);
            }
            (Comparator::Gt, false) => {
                let k = if is_int { threshold.ceil() - 1.0 } else { threshold };
                self.tighten(node_b, node_a, k);
            }
            (Comparator::Ge, true) => {
                let k = if is_int { threshold.ceil() } else { threshold };
                self.tighten(node_a, node_b, -k);
            }
            (Comparator::Ge, false) => {
                let k = if is_int { threshold.floor() } else { threshold };
                self.tighten(node_b, node_a, k);
            }
        }
    }

    fn target_range(&self, target: Target) -> (f64, f64) {
        match target {
            Target::Unary(i) => self.var_bound(i),
            Target::Sum(vi, wi) => {
                let hi = self.at(neg(wi), pos(vi));
                let lo = -self.at(pos(wi), neg(vi));
                (lo, hi)
            }
            Target::Diff(vi, wi) => {
                let hi = self.at(pos(wi), pos(vi));
                let lo = -self.at(pos(vi), pos(wi));
                (lo, hi)
            }
        }
    }

    fn constrain(&mut self, constraint: &Constraint) {
        let Some((terms, bias)) = affine_terms(&constraint.expr) else { return };
        let Some((target, lower_bound)) = self.classify_affine(&terms) else { return };
        let leading = match target {
            Target::Unary(_) => terms[0].1,
            Target::Sum(..) | Target::Diff(..) => terms[0].1,
        };
        if leading == 0.0 {
            return;
        }
        let threshold = -bias / leading;
        self.apply_bound(target, threshold, lower_bound, constraint.cmp);
    }
}

#[derive(Clone, Copy)]
enum Target {
    Unary(usize),
    Sum(usize, usize),
    Diff(usize, usize),
}

impl Target {
    fn is_int(&self, domain: &OctagonDomain) -> bool {
        match *self {
            Target::Unary(i) => domain.vars[i].kind() == Kind::Int,
            Target::Sum(vi, wi) | Target::Diff(vi, wi) => {
                domain.vars[vi].kind() == Kind::Int && domain.vars[wi].kind() == Kind::Int
            }
        }
    }
}

fn classify(lo: f64, hi: f64, cmp: Comparator) -> Satisfaction {
    match cmp {
        Comparator::Gt => {
            if lo > 0.0 {
                Satisfaction::Always
            } else if hi <= 0.0 {
                Satisfaction::Never
            } else {
                Satisfaction::Maybe
            }
        }
        Comparator::Ge => {
            if lo >= 0.0 {
                Satisfaction::Always
            } else if hi < 0.0 {
                Satisfaction::Never
            } else {
                Satisfaction::Maybe
            }
        }
        Comparator::Eq => {
            if lo == 0.0 && hi == 0.0 {
                Satisfaction::Always
            } else if lo > 0.0 || hi < 0.0 {
                Satisfaction::Never
            } else {
                Satisfaction::Maybe
            }
        }
        Comparator::Ne => match classify(lo, hi, Comparator::Eq) {
            Satisfaction::Always => Satisfaction::Never,
            Satisfaction::Never => Satisfaction::Always,
            Satisfaction::Maybe => Satisfaction::Maybe,
        },
    }
}

impl NumericDomain for OctagonDomain {
    fn top(env: &Environment) -> Self {
        OctagonDomain::top_with(env.all_vars().cloned().collect())
    }

    fn bottom(env: &Environment) -> Self {
        OctagonDomain::bottom_with(env.all_vars().cloned().collect())
    }

    fn is_bottom(&self) -> bool {
        self.bottom
    }

    fn equals(&self, other: &Self) -> bool {
        if self.bottom || other.bottom {
            return self.bottom == other.bottom;
        }
        let vars = Self::union_vars(&self.vars, &other.vars);
        self.realign(&vars).matrix == other.realign(&vars).matrix
    }

    fn join(&self, other: &Self) -> Self {
        if self.bottom {
            return other.clone();
        }
        if other.bottom {
            return self.clone();
        }
        let vars = Self::union_vars(&self.vars, &other.vars);
        let a = self.realign(&vars);
        let b = other.realign(&vars);
        let matrix = a.matrix.iter().zip(&b.matrix).map(|(x, y)| x.max(*y)).collect();
        let mut out = OctagonDomain { bottom: false, vars, matrix };
        out.close();
        out
    }

    fn meet(&self, other: &Self) -> Self {
        if self.bottom || other.bottom {
            return OctagonDomain::bottom_with(Self::union_vars(&self.vars, &other.vars));
        }
        let vars = Self::union_vars(&self.vars, &other.vars);
        let a = self.realign(&vars);
        let b = other.realign(&vars);
        let matrix = a.matrix.iter().zip(&b.matrix).map(|(x, y)| x.min(*y)).collect();
        let mut out = OctagonDomain { bottom: false, vars, matrix };
        out.close();
        out
    }

    fn widen(&self, new: &Self) -> Self {
        if self.bottom {
            return new.clone();
        }
        if new.bottom {
            return self.clone();
        }
        let vars = Self::union_vars(&self.vars, &new.vars);
        let a = self.realign(&vars);
        let b = new.realign(&vars);
        let matrix = a
            .matrix
            .iter()
            .zip(&b.matrix)
            .map(|(old, fresh)| if *fresh > *old { INF } else { *old })
            .collect();
        OctagonDomain { bottom: false, vars, matrix }
    }

    fn assign(&self, var: &VarId, expr: &SymExpr) -> Self {
        if self.bottom {
            return self.clone();
        }
        let terms_and_bias = affine_terms(expr);

        // exact shift: `v := v + c`, the common pending-increment case.
        if let Some((terms, bias)) = &terms_and_bias {
            if let [(w, c)] = terms.as_slice() {
                if w == var && *c == 1.0 {
                    let mut next = self.clone();
                    let vi = next.add_var(var);
                    next.shift(vi, *bias);
                    next.close();
                    return next;
                }
            }
        }

        let fallback_range = self.eval_bounds(expr);
        let mut next = self.clone();
        let vi = next.add_var(var);
        next.forget(vi);

        match terms_and_bias {
            Some((terms, bias)) if terms.is_empty() => {
                next.set(neg(vi), pos(vi), 2.0 * bias);
                next.set(pos(vi), neg(vi), -2.0 * bias);
            }
            Some((terms, bias)) => {
                if let [(w, c)] = terms.as_slice() {
                    if let Some(wi) = next.idx(w).filter(|wi| *wi != vi) {
                        if *c == 1.0 {
                            next.set(pos(wi), pos(vi), bias);
                            next.set(pos(vi), pos(wi), -bias);
                        } else if *c == -1.0 {
                            next.set(neg(wi), pos(vi), bias);
                            next.set(pos(wi), neg(vi), -bias);
                        }
                    }
                }
                let (lo, hi) = fallback_range;
                if hi < INF {
                    next.tighten(neg(vi), pos(vi), 2.0 * hi);
                }
                if lo > -INF {
                    next.tighten(pos(vi), neg(vi), -2.0 * lo);
                }
            }
            None => {
                let (lo, hi) = fallback_range;
                if hi < INF {
                    next.set(neg(vi), pos(vi), 2.0 * hi);
                }
                if lo > -INF {
                    next.set(pos(vi), neg(vi), -2.0 * lo);
                }
            }
        }

        next.close();
        next
    }

    fn satisfies(&self, constraint: &Constraint) -> Satisfaction {
        if self.bottom {
            return Satisfaction::Always;
        }
        if let Some((terms, bias)) = affine_terms(&constraint.expr) {
            if let Some((target, _)) = self.classify_affine(&terms) {
                let leading = terms[0].1;
                if leading != 0.0 {
                    let (tlo, thi) = self.target_range(target);
                    let (elo, ehi) = if leading > 0.0 {
                        (leading * tlo + bias, leading * thi + bias)
                    } else {
                        (leading * thi + bias, leading * tlo + bias)
                    };
                    return classify(elo, ehi, constraint.cmp);
                }
            }
        }
        let (lo, hi) = self.eval_bounds(&constraint.expr);
        classify(lo, hi, constraint.cmp)
    }

    fn of_constraints(env: &Environment, constraints: &[Constraint]) -> Self {
        let mut result = OctagonDomain::top(env);
        for c in constraints {
            if result.bottom {
                break;
            }
            result.constrain(c);
            result.close();
        }
        result
    }

    fn change_env(&self, new_env: &Environment) -> Self {
        let target: Vec<VarId> = new_env.all_vars().cloned().collect();
        self.realign(&target)
    }

    fn print(&self, env: &Environment) -> String {
        if self.bottom {
            return "bottom".to_string();
        }
        let mut out = String::new();
        for v in env.all_vars() {
            if let Some(i) = self.idx(v) {
                let (lo, hi) = self.var_bound(i);
                if lo > f64::NEG_INFINITY || hi < INF {
                    out.push_str(&format!("{v} -> [{lo}, {hi}]\n"));
                }
            }
        }
        out
    }
}

impl fmt::Display for OctagonDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bottom {
            return write!(f, "bottom");
        }
        for (i, v) in self.vars.iter().enumerate() {
            let (lo, hi) = self.var_bound(i);
            writeln!(f, "{v} -> [{lo}, {hi}]")?;
        }
        Ok(())
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
    fn assign_constant_then_query_is_always() {
        let x = int_var("x");
        let env = env_with(&[x.clone()]);
        let d = OctagonDomain::top(&env).assign(&x, &SymExpr::ConstInt(5));
        let c = Constraint::new(
            SymExpr::Sub(Box::new(SymExpr::Var(x.clone())), Box::new(SymExpr::ConstInt(0))),
            Comparator::Gt,
        );
        assert_eq!(d.satisfies(&c), Satisfaction::Always);
    }

    #[test]
    fn relational_constraint_between_two_vars_is_tracked() {
        let x = int_var("x");
        let y = int_var("y");
        let env = env_with(&[x.clone(), y.clone()]);
        // x - y > 0
        let c = Constraint::new(
            SymExpr::Sub(Box::new(SymExpr::Var(x.clone())), Box::new(SymExpr::Var(y.clone()))),
            Comparator::Gt,
        );
        let d = OctagonDomain::of_constraints(&env, &[c]);
        // x - y >= 1 should now hold.
        let q = Constraint::new(
            SymExpr::Sub(
                Box::new(SymExpr::Sub(Box::new(SymExpr::Var(x)), Box::new(SymExpr::Var(y)))),
                Box::new(SymExpr::ConstInt(1)),
            ),
            Comparator::Ge,
        );
        assert_eq!(d.satisfies(&q), Satisfaction::Always);
    }

    #[test]
    fn shift_preserves_relation_after_increment() {
        let x = int_var("x");
        let y = int_var("y");
        let env = env_with(&[x.clone(), y.clone()]);
        let c = Constraint::new(
            SymExpr::Sub(Box::new(SymExpr::Var(x.clone())), Box::new(SymExpr::Var(y.clone()))),
            Comparator::Eq,
        );
        let d = OctagonDomain::of_constraints(&env, &[c]);
        let incremented = d.assign(&x, &SymExpr::Add(Box::new(SymExpr::Var(x.clone())), Box::new(SymExpr::ConstInt(1))));
        // now x - y == 1
        let q = Constraint::new(
            SymExpr::Sub(
                Box::new(SymExpr::Sub(Box::new(SymExpr::Var(x)), Box::new(SymExpr::Var(y)))),
                Box::new(SymExpr::ConstInt(1)),
            ),
            Comparator::Eq,
        );
        assert_eq!(incremented.satisfies(&q), Satisfaction::Always);
    }

    #[test]
    fn meet_of_contradictory_bounds_is_bottom() {
        let x = int_var("x");
        let env = env_with(&[x.clone()]);
        let a = OctagonDomain::top(&env).assign(&x, &SymExpr::ConstInt(1));
        let b = OctagonDomain::top(&env).assign(&x, &SymExpr::ConstInt(2));
        assert!(a.meet(&b).is_bottom());
    }
}
