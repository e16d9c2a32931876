//! Expression builder.
//!
//! Constructs [`SymExpr`]s and [`Constraint`]s from AST fragments. Maintains
//! a per-statement LIFO expression stack and a per-statement LIFO
//! condition-pair stack, mirroring the stack-of-operands style of
//! `middle_end/analysis_constraints/constraints_gen.rs`, generalized from
//! its flat int32 world to a full int/real split.

use crate::ast::{ArithOp, Kind, VarId};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::domain::{Comparator, Constraint, NumericDomain, SymExpr};
use crate::env::VarRegistry;

/// A pair of abstractions of the positive/negative branch of one condition,
/// carried on the condition-pair stack until a branching terminator
/// consumes it.
#[derive(Clone, Debug)]
pub struct CondPair<D> {
    pub pos: D,
    pub neg: D,
}

impl<D: Clone> CondPair<D> {
    /// Logical `!`: swaps the pair. Applying this twice is the identity.
    pub fn swap(self) -> Self {
        CondPair { pos: self.neg, neg: self.pos }
    }
}

/// The expression builder's working state for one statement: the LIFO
/// expression stack and the LIFO condition-pair stack.
pub struct ExprBuilder<'a, D: NumericDomain> {
    stack: Vec<SymExpr>,
    conds: Vec<CondPair<D>>,
    registry: &'a mut VarRegistry,
    diags: &'a mut Diagnostics,
    block: crate::ast::BbId,
    temp_counter: u64,
}

impl<'a, D: NumericDomain> ExprBuilder<'a, D> {
    pub fn new(registry: &'a mut VarRegistry, diags: &'a mut Diagnostics, block: crate::ast::BbId) -> Self {
        ExprBuilder { stack: Vec::new(), conds: Vec::new(), registry, diags, block, temp_counter: 0 }
    }

    pub fn registry(&mut self) -> &mut VarRegistry {
        self.registry
    }

    // -- expression stack ---------------------------------------------

    pub fn push_int_literal(&mut self, n: i64) {
        self.stack.push(SymExpr::ConstInt(n));
    }

    pub fn push_real_literal(&mut self, x: f64) {
        self.stack.push(SymExpr::ConstReal(x));
    }

    /// `push_variable`: if the variable has a nonzero pending-increment
    /// counter, push `name + k` tagged with `name`'s kind; else push a bare
    /// variable node.
    pub fn push_variable(&mut self, var: &VarId) {
        let k = self.registry.pending(var);
        if k != 0 {
            self.stack.push(SymExpr::Add(Box::new(SymExpr::Var(var.clone())), Box::new(SymExpr::ConstInt(k))));
        } else {
            self.stack.push(SymExpr::Var(var.clone()));
        }
    }

    /// Pops one operand; returns `None` (and pushes a diagnostic) on
    /// underflow rather than the source's null-sentinel path.
    pub fn pop(&mut self) -> Option<SymExpr> {
        match self.stack.pop() {
            Some(e) => Some(e),
            None => {
                self.diags.push(Diagnostic::EmptyStackPop { block: self.block.clone() });
                None
            }
        }
    }

    pub fn top_kind(&self) -> Option<Kind> {
        self.stack.last().map(SymExpr::kind)
    }

    /// `push_unary`: pops one, pushes `op(e)`. `+` is an identity push.
    pub fn push_unary_neg(&mut self) {
        if let Some(e) = self.pop() {
            self.stack.push(SymExpr::Neg(Box::new(e)));
        }
    }

    pub fn push_unary_pos(&mut self) {
        if let Some(e) = self.pop() {
            self.stack.push(SymExpr::Pos(Box::new(e)));
        }
    }

    /// `push_binary`: pops `rhs` then `lhs` (LIFO order matters), aligns
    /// environments, computes the result kind, rejects `%` on a real
    /// operand as a non-fatal diagnostic, and pushes `op(lhs, rhs)`.
    pub fn push_binary(&mut self, op: ArithOp) {
        let Some(rhs) = self.pop() else { return };
        let Some(lhs) = self.pop() else {
            // lhs missing: nothing sound to push, but rhs is already gone too.
            return;
        };
        if op == ArithOp::Mod && (lhs.kind() == Kind::Real || rhs.kind() == Kind::Real) {
            self.diags.push(Diagnostic::ModuloOnReal { block: self.block.clone() });
            return;
        }
        self.stack.push(SymExpr::binary(op, lhs, rhs));
    }

    /// Shifts are not modeled precisely: pop both operands,
    /// synthesize a fresh temporary, extend the environment, and push a
    /// bare variable node for the temporary — a sound, unconstrained value.
    pub fn push_shift(&mut self, kind: Kind) {
        let _rhs = self.pop();
        let _lhs = self.pop();
        let temp = self.new_temp(kind);
        self.stack.push(SymExpr::Var(temp));
    }

    /// Bitwise `&`/`|`/`~`: evaluated for side effects only — no stack push,
    /// no abstract-value update.
    pub fn eval_bitwise_binary(&mut self) {
        let _rhs = self.pop();
        let _lhs = self.pop();
        self.diags.push(Diagnostic::BitwiseIgnored { block: self.block.clone() });
    }

    pub fn eval_bitwise_unary(&mut self) {
        let _e = self.pop();
        self.diags.push(Diagnostic::BitwiseIgnored { block: self.block.clone() });
    }

    /// `new_temp`: names `__tmp_<n>` with `n` monotonically incrementing per
    /// function.
    pub fn new_temp(&mut self, kind: Kind) -> VarId {
        let name = format!("__tmp_{}", self.temp_counter);
        self.temp_counter += 1;
        let var = VarId::with_kind(name, kind);
        self.registry.declare_temporary(&var);
        var
    }

    pub fn reset_temp_counter(&mut self) {
        self.temp_counter = 0;
    }

    pub fn unsupported(&mut self, what: &'static str) {
        self.diags.push(Diagnostic::UnsupportedConstruct { block: self.block.clone(), what });
    }

    pub fn top_expr(&self) -> Option<&SymExpr> {
        self.stack.last()
    }

    /// Pops and discards the top expression.
    pub fn pop_and_discard(&mut self) {
        let _ = self.pop();
    }

    // -- condition-pair stack -------------------------------------------

    /// Builds `(K⁺, K⁻)` for `lhs R rhs`, reifies both via `of_constraints`,
    /// and pushes the pair.
    ///
    /// `==`'s negation uses the uniform `K⁻ = (e ≠ 0)` rather than the
    /// source's asymmetric `-e ≠ 0`.
    pub fn push_relational(&mut self, op: crate::ast::RelOp, lhs: SymExpr, rhs: SymExpr) {
        let e = SymExpr::Sub(Box::new(lhs), Box::new(rhs));
        let neg_e = SymExpr::Neg(Box::new(e.clone()));
        use crate::ast::RelOp::*;
        let (pos_k, neg_k) = match op {
            Gt => (Constraint::new(e, Comparator::Gt), Constraint::new(neg_e, Comparator::Ge)),
            Ge => (Constraint::new(e, Comparator::Ge), Constraint::new(neg_e, Comparator::Gt)),
            Lt => (Constraint::new(neg_e, Comparator::Gt), Constraint::new(e, Comparator::Ge)),
            Le => (Constraint::new(neg_e, Comparator::Ge), Constraint::new(e, Comparator::Gt)),
            Eq => (Constraint::new(e.clone(), Comparator::Eq), Constraint::new(e, Comparator::Ne)),
            Ne => (Constraint::new(e.clone(), Comparator::Ne), Constraint::new(e, Comparator::Eq)),
        };
        let env = self.registry.env();
        let pos = D::of_constraints(env, &[pos_k]);
        let neg = D::of_constraints(env, &[neg_k]);
        self.conds.push(CondPair { pos, neg });
    }

    /// A non-relational condition reduces directly to a constraint on the
    /// expression itself (`e != 0` true-branch, `e == 0` false-branch); used
    /// for e.g. `if (x)`, giving a more precise pair than leaving both
    /// branches unconstrained.
    pub fn push_truthiness(&mut self, e: SymExpr) {
        let env = self.registry.env();
        let pos = D::of_constraints(env, &[Constraint::new(e.clone(), Comparator::Ne)]);
        let neg = D::of_constraints(env, &[Constraint::new(e, Comparator::Eq)]);
        self.conds.push(CondPair { pos, neg });
    }

    pub fn push_cond_pair(&mut self, pos: D, neg: D) {
        self.conds.push(CondPair { pos, neg });
    }

    /// Logical `!`: swaps the top of the condition-pair stack.
    pub fn negate_top_cond(&mut self) {
        if let Some(top) = self.conds.pop() {
            self.conds.push(top.swap());
        }
    }

    pub fn pop_cond(&mut self) -> Option<CondPair<D>> {
        self.conds.pop()
    }

    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        self.diags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::int_var;
    use crate::domain::intervals::IntervalDomain;
    use pretty_assertions::assert_eq;

    fn fixture() -> (VarRegistry, Diagnostics) {
        (VarRegistry::new(), Diagnostics::new())
    }

    #[test]
    fn push_variable_folds_pending_increment() {
        let (mut reg, mut diags) = fixture();
        let x = int_var("x");
        reg.declare(&x).unwrap();
        reg.set_pending(&x, 1);
        let mut eb: ExprBuilder<IntervalDomain> = ExprBuilder::new(&mut reg, &mut diags, crate::ast::bb_id("b0"));
        eb.push_variable(&x);
        assert_eq!(eb.top_expr().unwrap().kind(), Kind::Int);
        match eb.top_expr().unwrap() {
            SymExpr::Add(l, r) => {
                assert_eq!(**l, SymExpr::Var(x));
                assert_eq!(**r, SymExpr::ConstInt(1));
            }
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn push_unary_pos_twice_is_identity_up_to_kind() {
        let (mut reg, mut diags) = fixture();
        let mut eb: ExprBuilder<IntervalDomain> = ExprBuilder::new(&mut reg, &mut diags, crate::ast::bb_id("b0"));
        eb.push_int_literal(5);
        eb.push_unary_pos();
        eb.push_unary_pos();
        assert_eq!(eb.top_expr().unwrap().kind(), Kind::Int);
        // unwrap the double Pos and check the payload is unchanged.
        if let SymExpr::Pos(outer) = eb.top_expr().unwrap() {
            if let SymExpr::Pos(inner) = outer.as_ref() {
                assert_eq!(**inner, SymExpr::ConstInt(5));
            } else {
                panic!("expected nested Pos");
            }
        } else {
            panic!("expected Pos at top");
        }
    }

    #[test]
    fn modulo_on_real_operand_is_rejected_not_fatal() {
        let (mut reg, mut diags) = fixture();
        let mut eb: ExprBuilder<IntervalDomain> = ExprBuilder::new(&mut reg, &mut diags, crate::ast::bb_id("b0"));
        eb.push_real_literal(1.5);
        eb.push_int_literal(2);
        eb.push_binary(ArithOp::Mod);
        assert!(eb.top_expr().is_none());
        assert!(eb.diagnostics().iter().any(|d| matches!(d, Diagnostic::ModuloOnReal { .. })));
    }

    #[test]
    fn swap_twice_is_identity() {
        let (mut reg, mut diags) = fixture();
        let x = int_var("x");
        reg.declare(&x).unwrap();
        let mut eb: ExprBuilder<IntervalDomain> = ExprBuilder::new(&mut reg, &mut diags, crate::ast::bb_id("b0"));
        eb.push_variable(&x);
        eb.push_int_literal(0);
        eb.push_relational(crate::ast::RelOp::Gt, SymExpr::Var(x), SymExpr::ConstInt(0));
        let original = eb.pop_cond().unwrap();
        eb.push_cond_pair(original.clone().pos, original.clone().neg);
        eb.negate_top_cond();
        eb.negate_top_cond();
        let round_tripped = eb.pop_cond().unwrap();
        assert!(round_tripped.pos.equals(&original.pos));
        assert!(round_tripped.neg.equals(&original.neg));
    }
}
