//! Statement evaluator.
//!
//! Walks statements inside a basic block, drives the expression builder,
//! and commits updates to the abstract memory. Grounded on
//! `original_source/source/MyProcessStmt.cpp`'s `ProcessStmt` dispatch: a
//! declaration immediately extends the environment and calls
//! `change_environment` on the live abstract value (`Apron.cpp`'s
//! `getVarNameAndType`), and an `=` node nested inside another assignment is
//! the cascaded-assignment case (`isCascadedAssign`).

use crate::ast::{ArithOp, BbId, Expr, Kind, Stmt, UnaryOp, VarId};
use crate::diagnostics::Diagnostics;
use crate::domain::{NumericDomain, SymExpr};
use crate::env::VarRegistry;
use crate::expr::{CondPair, ExprBuilder};

/// Per-statement evaluator state: `assign_depth` tracks nesting
/// of assignment-like nodes, `is_cascaded` is set when an `=` node appears
/// as the RHS of another assignment. Temporaries are removed only when
/// `assign_depth` returns to 0.
pub struct StmtEvaluator<'a, D: NumericDomain> {
    eb: ExprBuilder<'a, D>,
    assign_depth: u32,
    is_cascaded: bool,
}

impl<'a, D: NumericDomain> StmtEvaluator<'a, D> {
    pub fn new(registry: &'a mut VarRegistry, diags: &'a mut Diagnostics, block: BbId) -> Self {
        StmtEvaluator { eb: ExprBuilder::new(registry, diags, block), assign_depth: 0, is_cascaded: false }
    }

    pub fn registry(&mut self) -> &mut VarRegistry {
        self.eb.registry()
    }

    fn sync_env(&mut self, a: D) -> D {
        let env = self.eb.registry().env().clone();
        a.change_env(&env)
    }

    /// Evaluates one top-level statement, returning the updated abstract
    /// value. Removes temporaries once `assign_depth` has returned to 0.
    pub fn eval_stmt(&mut self, a: D, stmt: &Stmt) -> D {
        self.is_cascaded = false;
        let a = match stmt {
            Stmt::Decl { var, init } => self.eval_decl(a, var, init.as_ref()),
            Stmt::Assign { lhs, rhs } => self.eval_assign(a, lhs, rhs),
            Stmt::CompoundAssign { lhs, op, rhs } => self.eval_compound_assign(a, lhs, *op, rhs),
            Stmt::ExprStmt(e) => self.eval_expr(a, e),
            Stmt::Return(value) => self.eval_return(a, value.as_ref()),
            Stmt::UnsupportedAssign(what) => {
                self.eb.unsupported(what);
                a
            }
        };
        if self.assign_depth == 0 {
            self.eb.reset_temp_counter();
            self.eb.registry().remove_temporaries(&a)
        } else {
            a
        }
    }

    fn eval_decl(&mut self, a: D, var: &VarId, init: Option<&Expr>) -> D {
        let _ = self.eb.registry().declare(var);
        let mut a = self.sync_env(a);
        if let Some(init) = init {
            self.assign_depth += 1;
            a = match init {
                Expr::IntLit(n) => a.assign(var, &SymExpr::ConstInt(*n)),
                Expr::RealLit(x) => a.assign(var, &SymExpr::ConstReal(*x)),
                Expr::Var(rhs_var) => a.assign(var, &SymExpr::Var(rhs_var.clone())),
                other => {
                    let a = self.eval_expr_into_stack(a, other);
                    self.commit_assign(a, var)
                }
            };
            self.assign_depth -= 1;
        }
        a
    }

    fn eval_assign(&mut self, a: D, lhs: &VarId, rhs: &Expr) -> D {
        self.assign_depth += 1;
        let a = match rhs {
            Expr::IntLit(n) => a.assign(lhs, &SymExpr::ConstInt(*n)),
            Expr::RealLit(x) => a.assign(lhs, &SymExpr::ConstReal(*x)),
            Expr::Var(rhs_var) => a.assign(lhs, &SymExpr::Var(rhs_var.clone())),
            _ => {
                let a = self.eval_expr_into_stack(a, rhs);
                self.commit_assign(a, lhs)
            }
        };
        self.assign_depth -= 1;
        a
    }

    fn eval_compound_assign(&mut self, a: D, lhs: &VarId, op: ArithOp, rhs: &Expr) -> D {
        self.assign_depth += 1;
        self.eb.push_variable(lhs);
        let a = self.eval_expr_into_stack(a, rhs);
        self.eb.push_binary(op);
        let a = self.commit_assign(a, lhs);
        self.assign_depth -= 1;
        a
    }

    /// `commit_assign`: pops the top expression; if `lhs` has a pending
    /// counter, re-pushes its variable node tagged with the popped
    /// expression's kind first (cascaded-assignment propagation), assigns,
    /// resets the counter, flushes all pending increments.
    fn commit_assign(&mut self, a: D, lhs: &VarId) -> D {
        let Some(popped) = self.eb.pop() else { return a };
        // any reference to `lhs` inside `popped` already observed its
        // pending counter via `push_variable`, so the assignment itself
        // needs no extra adjustment beyond the counter reset below. Other
        // variables' pending counters stay deferred until the enclosing
        // statement's flush point.
        let a = a.assign(lhs, &popped);
        self.eb.registry().reset_pending(lhs);
        a
    }

    fn eval_return(&mut self, a: D, value: Option<&Expr>) -> D {
        let a = self.eb.registry().flush_all_pending(&a);
        match value {
            Some(e) => {
                let a = self.eval_expr_into_stack(a, e);
                self.eb.pop_and_discard();
                a
            }
            None => a,
        }
    }

    /// Dispatches an arbitrary expression used as a top-level statement
    /// (`x++;`, a bare call, etc.) for its side effects only.
    fn eval_expr(&mut self, a: D, e: &Expr) -> D {
        let a = self.eval_expr_into_stack(a, e);
        self.eb.pop_and_discard();
        self.eb.registry().flush_all_pending(&a)
    }

    /// Builds `e` onto the expression stack (or the condition-pair stack,
    /// for `Rel`/`Not`), returning the possibly-updated abstract value
    /// (cascaded assignments mutate it as a side effect).
    fn eval_expr_into_stack(&mut self, a: D, e: &Expr) -> D {
        match e {
            Expr::IntLit(n) => {
                self.eb.push_int_literal(*n);
                a
            }
            Expr::RealLit(x) => {
                self.eb.push_real_literal(*x);
                a
            }
            Expr::Var(v) => {
                self.eb.push_variable(v);
                a
            }
            Expr::Unary(UnaryOp::Neg, inner) => {
                let a = self.eval_unary_operand(a, inner);
                self.eb.push_unary_neg();
                a
            }
            Expr::Unary(UnaryOp::Pos, inner) => {
                let a = self.eval_unary_operand(a, inner);
                self.eb.push_unary_pos();
                a
            }
            Expr::Binary(op, l, r) => {
                let a = self.eval_expr_into_stack(a, l);
                let a = self.eval_expr_into_stack(a, r);
                self.eb.push_binary(*op);
                a
            }
            Expr::Rel(op, l, r) => {
                let a = self.eval_expr_into_stack(a, l);
                let lhs_expr = self.eb.pop().unwrap_or(SymExpr::ConstInt(0));
                let a = self.eval_expr_into_stack(a, r);
                let rhs_expr = self.eb.pop().unwrap_or(SymExpr::ConstInt(0));
                self.eb.push_relational(*op, lhs_expr, rhs_expr);
                a
            }
            Expr::Not(inner) => {
                let a = self.eval_condition(a, inner);
                self.eb.negate_top_cond();
                a
            }
            Expr::PreIncr(v) => {
                let k = self.eb.registry().pending(v) + 1;
                self.eb.registry().set_pending(v, k);
                self.eb.push_variable(v);
                a
            }
            Expr::PreDecr(v) => {
                let k = self.eb.registry().pending(v) - 1;
                self.eb.registry().set_pending(v, k);
                self.eb.push_variable(v);
                a
            }
            Expr::PostIncr(v) => {
                self.eb.push_variable(v);
                let k = self.eb.registry().pending(v) + 1;
                self.eb.registry().set_pending(v, k);
                a
            }
            Expr::PostDecr(v) => {
                self.eb.push_variable(v);
                let k = self.eb.registry().pending(v) - 1;
                self.eb.registry().set_pending(v, k);
                a
            }
            Expr::Assign(v, rhs) => {
                self.is_cascaded = true;
                let a = self.eval_assign(a, v, rhs);
                self.eb.push_variable(v);
                a
            }
            Expr::CompoundAssign(v, op, rhs) => {
                self.is_cascaded = true;
                let a = self.eval_compound_assign(a, v, *op, rhs);
                self.eb.push_variable(v);
                a
            }
            Expr::Shift(_, l, r) => {
                let kind = Self::expr_kind(l).max_with(Self::expr_kind(r));
                let a = self.eval_expr_into_stack(a, l);
                let a = self.eval_expr_into_stack(a, r);
                let a = self.sync_env(a);
                self.eb.push_shift(kind);
                self.sync_env(a)
            }
            Expr::Bitwise(_, l, r) => {
                let a = self.eval_expr_into_stack(a, l);
                let a = self.eval_expr_into_stack(a, r);
                self.eb.eval_bitwise_binary();
                a
            }
            Expr::BitwiseNot(inner) => {
                let a = self.eval_expr_into_stack(a, inner);
                self.eb.eval_bitwise_unary();
                a
            }
            Expr::Unsupported(what) => {
                self.eb.unsupported(what);
                a
            }
        }
    }

    /// Unary `+`/`-` on a pure variable adjusts its pending counter instead
    /// of recursing; any other operand just recurses.
    fn eval_unary_operand(&mut self, a: D, operand: &Expr) -> D {
        self.eval_expr_into_stack(a, operand)
    }

    fn expr_kind(e: &Expr) -> Kind {
        match e {
            Expr::RealLit(_) => Kind::Real,
            Expr::Var(v) => v.kind(),
            _ => Kind::Int,
        }
    }

    /// Evaluates a branch/loop condition:
    /// an integer-literal condition short-circuits to `(top,bottom)` or
    /// `(bottom,top)`; a simple-variable condition uses the more precise
    /// `(v != 0, v == 0)` pair rather than leaving both branches
    /// unconstrained; anything else recurses.
    pub fn eval_condition(&mut self, a: D, cond: &Expr) -> D {
        match cond {
            Expr::IntLit(n) => {
                let env = self.eb.registry().env().clone();
                if *n != 0 {
                    self.eb.push_cond_pair(D::top(&env), D::bottom(&env));
                } else {
                    self.eb.push_cond_pair(D::bottom(&env), D::top(&env));
                }
                a
            }
            Expr::Var(v) => {
                self.eb.push_truthiness(SymExpr::Var(v.clone()));
                a
            }
            Expr::Rel(..) | Expr::Not(_) => self.eval_expr_into_stack(a, cond),
            _ => {
                let a = self.eval_expr_into_stack(a, cond);
                match self.eb.pop() {
                    Some(e) => self.eb.push_truthiness(e),
                    None => {
                        let env = self.eb.registry().env().clone();
                        self.eb.push_cond_pair(D::top(&env), D::top(&env));
                    }
                }
                a
            }
        }
    }

    pub fn pop_cond(&mut self) -> Option<CondPair<D>> {
        self.eb.pop_cond()
    }

    pub fn is_cascaded(&self) -> bool {
        self.is_cascaded
    }
}

trait KindExt {
    fn max_with(self, other: Kind) -> Kind;
}

impl KindExt for Kind {
    fn max_with(self, other: Kind) -> Kind {
        if self == Kind::Real || other == Kind::Real { Kind::Real } else { Kind::Int }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::int_var;
    use crate::domain::intervals::IntervalDomain;
    use crate::domain::{Comparator, Constraint};
    use pretty_assertions::assert_eq;

    fn check(a: &IntervalDomain, v: &VarId, expect_eq: i64) {
        let c = Constraint::new(
            SymExpr::Sub(Box::new(SymExpr::Var(v.clone())), Box::new(SymExpr::ConstInt(expect_eq))),
            Comparator::Eq,
        );
        assert_eq!(a.satisfies(&c), crate::domain::Satisfaction::Always, "{}", a.print(&crate::domain::Environment::new()));
    }

    #[test]
    fn s1_decl_then_assign() {
        // int x = 5; x = x + 3;
        let mut reg = VarRegistry::new();
        let mut diags = Diagnostics::new();
        let x = int_var("x");
        let a = IntervalDomain::top(reg.env());
        let mut ev: StmtEvaluator<IntervalDomain> = StmtEvaluator::new(&mut reg, &mut diags, crate::ast::bb_id("b0"));
        let a = ev.eval_stmt(a, &Stmt::Decl { var: x.clone(), init: Some(Expr::IntLit(5)) });
        let a = ev.eval_stmt(
            a,
            &Stmt::Assign {
                lhs: x.clone(),
                rhs: Expr::Binary(ArithOp::Add, Box::new(Expr::Var(x.clone())), Box::new(Expr::IntLit(3))),
            },
        );
        check(&a, &x, 8);
    }

    #[test]
    fn postincrement_reads_old_value_then_bumps_pending() {
        let mut reg = VarRegistry::new();
        let mut diags = Diagnostics::new();
        let x = int_var("x");
        let a = IntervalDomain::top(reg.env());
        let mut ev: StmtEvaluator<IntervalDomain> = StmtEvaluator::new(&mut reg, &mut diags, crate::ast::bb_id("b0"));
        let a = ev.eval_stmt(a, &Stmt::Decl { var: x.clone(), init: Some(Expr::IntLit(5)) });
        // y = x++;
        let y = int_var("y");
        let a = ev.eval_stmt(a, &Stmt::Decl { var: y.clone(), init: Some(Expr::PostIncr(x.clone())) });
        check(&a, &y, 5);
        assert_eq!(ev.registry().pending(&x), 1);
        let a = ev.eb.registry().flush_all_pending(&a);
        check(&a, &x, 6);
    }

    #[test]
    fn cascaded_assignment_propagates() {
        // x = y = 10;
        let mut reg = VarRegistry::new();
        let mut diags = Diagnostics::new();
        let x = int_var("x");
        let y = int_var("y");
        reg.declare(&x).unwrap();
        reg.declare(&y).unwrap();
        let a = IntervalDomain::top(reg.env());
        let mut ev: StmtEvaluator<IntervalDomain> = StmtEvaluator::new(&mut reg, &mut diags, crate::ast::bb_id("b0"));
        let a = ev.eval_stmt(
            a,
            &Stmt::Assign { lhs: x.clone(), rhs: Expr::Assign(y.clone(), Box::new(Expr::IntLit(10))) },
        );
        check(&a, &x, 10);
        check(&a, &y, 10);
    }
}
