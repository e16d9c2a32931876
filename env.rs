//! Environment & variable registry.
//!
//! Tracks declared variables, their classified [`Kind`], and a per-variable
//! pending-increment counter used to model `++`/`--` lazily, the way
//! `original_source/source/MyProcessStmt.cpp` defers an increment until the
//! variable's true value must be observed (a relational condition, a
//! `return`, or the next statement boundary).

use std::collections::BTreeMap;

use crate::ast::{Kind, VarId};
use crate::domain::{Environment, NumericDomain, SymExpr};
use crate::error::{AnalysisError, Result};

/// The per-function variable registry. Distinct from [`Environment`]: this
/// carries kind + pending-increment bookkeeping that the numeric domain
/// itself has no need to know about.
#[derive(Clone, Debug, Default)]
pub struct VarRegistry {
    env: Environment,
    kinds: BTreeMap<VarId, Kind>,
    pending: BTreeMap<VarId, i64>,
}

impl VarRegistry {
    pub fn new() -> Self {
        VarRegistry::default()
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Declares `name` with the kind implied by `c_type`. Idempotent on repeat declaration of the same
    /// variable. Fatal on an unrecognized C type.
    pub fn declare(&mut self, var: &VarId) -> Result<()> {
        if self.kinds.contains_key(var) {
            return Ok(());
        }
        self.kinds.insert(var.clone(), var.kind());
        self.pending.insert(var.clone(), 0);
        self.env.extend(var);
        Ok(())
    }

    /// Declares a variable from a raw name + C-type string, used when the
    /// caller doesn't already hold a classified [`VarId`].
    pub fn declare_from_type(&mut self, name: &str, c_type: &str) -> Result<VarId> {
        let var = VarId::new(name, c_type).map_err(|_| AnalysisError::UnknownCType(c_type.to_string()))?;
        self.declare(&var)?;
        Ok(var)
    }

    /// Registers a compiler-introduced temporary; never goes
    /// through C-type classification since it's never spelled in source.
    pub fn declare_temporary(&mut self, var: &VarId) {
        self.kinds.insert(var.clone(), var.kind());
        self.pending.insert(var.clone(), 0);
        self.env.extend(var);
    }

    pub fn kind(&self, var: &VarId) -> Kind {
        self.kinds.get(var).copied().unwrap_or_else(|| var.kind())
    }

    pub fn pending(&self, var: &VarId) -> i64 {
        self.pending.get(var).copied().unwrap_or(0)
    }

    pub fn set_pending(&mut self, var: &VarId, n: i64) {
        self.pending.insert(var.clone(), n);
    }

    pub fn reset_pending(&mut self, var: &VarId) {
        self.pending.insert(var.clone(), 0);
    }

    /// `flush_all_pending`: for every variable with a nonzero counter, apply
    /// `A := A.assign(name, name + counter)` then zero the counter. Ordering
    /// across names doesn't matter: each assignment only touches
    /// its own dimension.
    pub fn flush_all_pending<D: NumericDomain>(&mut self, a: &D) -> D {
        let mut result = a.clone();
        for (var, counter) in self.pending.iter_mut() {
            if *counter == 0 {
                continue;
            }
            let expr = SymExpr::Add(Box::new(SymExpr::Var(var.clone())), Box::new(SymExpr::ConstInt(*counter)));
            result = result.assign(var, &expr);
            *counter = 0;
        }
        result
    }

    /// Removes every dimension whose name begins with `__tmp_`, projecting
    /// `a` accordingly.
    pub fn remove_temporaries<D: NumericDomain>(&mut self, a: &D) -> D {
        let temp_names: Vec<VarId> = self.kinds.keys().filter(|v| v.is_temporary()).cloned().collect();
        if temp_names.is_empty() {
            return a.clone();
        }
        for var in &temp_names {
            self.kinds.remove(var);
            self.pending.remove(var);
            self.env.remove(var);
        }
        a.change_env(&self.env)
    }

    /// Whether every tracked variable currently has a zero pending counter.
    pub fn all_pending_flushed(&self) -> bool {
        self.pending.values().all(|&c| c == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::int_var;
    use crate::domain::intervals::IntervalDomain;
    use pretty_assertions::assert_eq;

    #[test]
    fn declare_is_idempotent() {
        let mut reg = VarRegistry::new();
        let x = int_var("x");
        reg.declare(&x).unwrap();
        reg.set_pending(&x, 3);
        reg.declare(&x).unwrap();
        assert_eq!(reg.pending(&x), 3, "repeat declare must not reset an existing counter");
    }

    #[test]
    fn flush_all_pending_folds_counter_into_value_and_zeroes_it() {
        let mut reg = VarRegistry::new();
        let x = int_var("x");
        reg.declare(&x).unwrap();
        let a = IntervalDomain::top(reg.env()).assign(&x, &SymExpr::ConstInt(5));
        reg.set_pending(&x, 2);
        let flushed = reg.flush_all_pending(&a);
        assert_eq!(reg.pending(&x), 0);
        let c = crate::domain::Constraint::new(
            SymExpr::Sub(Box::new(SymExpr::Var(x.clone())), Box::new(SymExpr::ConstInt(7))),
            crate::domain::Comparator::Eq,
        );
        assert_eq!(flushed.satisfies(&c), crate::domain::Satisfaction::Always);
    }

    #[test]
    fn remove_temporaries_is_noop_when_none_exist() {
        let mut reg = VarRegistry::new();
        let x = int_var("x");
        reg.declare(&x).unwrap();
        let a = IntervalDomain::top(reg.env());
        let before = reg.env().clone();
        let after = reg.remove_temporaries(&a);
        assert_eq!(reg.env(), &before);
        assert!(after.equals(&a));
    }

    #[test]
    fn remove_temporaries_projects_away_tmp_dimensions() {
        let mut reg = VarRegistry::new();
        let x = int_var("x");
        reg.declare(&x).unwrap();
        let tmp = VarId::with_kind("__tmp_0", Kind::Int);
        reg.declare_temporary(&tmp);
        assert!(reg.env().contains(&tmp));
        let a = IntervalDomain::top(reg.env());
        let after = reg.remove_temporaries(&a);
        assert!(!reg.env().contains(&tmp));
        assert!(reg.env().contains(&x));
        let _ = after;
    }
}
