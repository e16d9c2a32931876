//! Fixpoint driver: the CFG traversal scheduler that ties the variable
//! registry, expression builder, statement evaluator, CFG preprocessor, and
//! block store together. Iterates the traversal order produced by the CFG
//! preprocessor, allowing the cursor to move backward when a back edge
//! fires, applying delayed widening until the loop's post-state stabilizes.

use tracing::{debug, trace};

use crate::ast::{BbId, Function};
use crate::block_store::BlockStore;
use crate::cfg::CfgInfo;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::domain::NumericDomain;
use crate::env::VarRegistry;
use crate::stmt::StmtEvaluator;

/// One completed analysis of a function.
pub struct AnalysisResult<D> {
    pub store: BlockStore<D>,
    pub cfg: CfgInfo,
    pub diagnostics: Diagnostics,
}

/// Runs the fixpoint driver for one function, given its parameters already
/// declared in `registry` (environment constructed, `A_cur := top(env)`,
/// parameters declared).
pub fn analyze_function<D: NumericDomain>(
    func: &Function,
    registry: &mut VarRegistry,
    unrolling_delay: u32,
) -> AnalysisResult<D> {
    let mut cfg = CfgInfo::build(func);
    let mut diagnostics = Diagnostics::new();
    let mut store: BlockStore<D> = BlockStore::new();
    let reachable = func.reachable_from_entry();
    let order = cfg.order.clone();

    debug!(function = %func.name, blocks = order.len(), unrolling_delay, "starting fixpoint traversal");

    let mut i: usize = 0;
    while i < order.len() {
        let b = order[i].clone();

        if !reachable.contains(&b) {
            diagnostics.push(Diagnostic::UnreachableBlockSkipped { block: b.clone() });
            i += 1;
            continue;
        }

        trace!(block = %b, "visiting block");
        let block = func.block(&b);
        let pre = compute_pre_state::<D>(&b, &cfg, &store, registry, func, &reachable);
        store.set_pre(b.clone(), pre.clone());
        let mut a_cur = pre;

        for stmt in &block.stmts {
            let mut ev: StmtEvaluator<D> = StmtEvaluator::new(registry, &mut diagnostics, b.clone());
            a_cur = ev.eval_stmt(a_cur, stmt);
            a_cur = registry.flush_all_pending(&a_cur);
        }

        let mut cond_pair = None;
        if let Some(cond) = block.term.condition() {
            let mut ev: StmtEvaluator<D> = StmtEvaluator::new(registry, &mut diagnostics, b.clone());
            a_cur = ev.eval_condition(a_cur, cond);
            cond_pair = ev.pop_cond();
            a_cur = registry.flush_all_pending(&a_cur);
        }

        store.set_post(b.clone(), a_cur.clone());
        if let Some(pair) = cond_pair {
            store.set_cond(b.clone(), pair.pos, pair.neg);
        }

        let mut next_i = i + 1;
        if let Some(loop_idx) = cfg.loops.iter().position(|l| l.tail == b) {
            let head = cfg.loops[loop_idx].head.clone();
            if let Some(edge) = cfg.edge_mut(&b, &head) {
                edge.visit_count += 1;
            }
            let visit_count = cfg.edge(&b, &head).map(|e| e.visit_count).unwrap_or(1);

            let old = store.loop_exit_prev(&b).cloned().unwrap_or_else(|| D::bottom(registry.env()));
            let cur = a_cur.clone();
            let widened = visit_count.is_multiple_of(unrolling_delay.max(1));
            let new = if widened { old.widen(&cur) } else { cur.clone() };

            if new.equals(&old) {
                debug!(tail = %b, head = %head, visit_count, "loop reached fixpoint");
                if let Some(edge) = cfg.edge_mut(&b, &head) {
                    edge.visit_count = 0;
                }
            } else {
                if widened {
                    trace!(tail = %b, visit_count, "widening back-edge post-state");
                }
                store.set_loop_exit_prev(b.clone(), new.clone());
                store.set_post(b.clone(), new);
                if let Some(head_pos) = order.iter().position(|x| *x == head) {
                    next_i = head_pos;
                }
            }
        }

        i = next_i;
    }

    AnalysisResult { store, cfg, diagnostics }
}

/// `pre`-state computation.
fn compute_pre_state<D: NumericDomain>(
    b: &BbId,
    cfg: &CfgInfo,
    store: &BlockStore<D>,
    registry: &VarRegistry,
    func: &Function,
    reachable: &std::collections::BTreeSet<BbId>,
) -> D {
    let preds = cfg.predecessors(b);

    if preds.is_empty() {
        return D::top(registry.env());
    }

    if preds.len() > 1 {
        let mut acc: Option<D> = None;
        for p in preds {
            let is_back = cfg.edge(p, b).map(|e| e.is_back).unwrap_or(false);
            let visited_once = store.post(p).is_some();
            let eligible = (!is_back || visited_once) && reachable.contains(p);
            if !eligible {
                continue;
            }
            if let Some(edge_state) = post_narrowed_for_edge(p, b, store, func) {
                acc = Some(match acc {
                    None => edge_state,
                    Some(a) => a.join(&edge_state),
                });
            }
        }
        return acc.unwrap_or_else(|| D::bottom(registry.env()));
    }

    let p = &preds[0];
    post_narrowed_for_edge(p, b, store, func).unwrap_or_else(|| D::bottom(registry.env()))
}

/// The post-state of `p` as seen across the edge `p -> b`: narrowed by
/// `p`'s branch condition when `p`'s terminator branches, unchanged
/// otherwise. `None` when `p` has no recorded post-state yet.
fn post_narrowed_for_edge<D: NumericDomain>(p: &BbId, b: &BbId, store: &BlockStore<D>, func: &Function) -> Option<D> {
    let pre0 = store.post(p)?.clone();
    let p_block = func.block(p);
    if !p_block.term.is_branching() || p_block.succs.len() == 1 {
        return Some(pre0);
    }
    let is_then = p_block.succs.first().map(|s| s == b).unwrap_or(false);
    Some(if is_then {
        match store.cond_pos(p) {
            Some(k) => pre0.meet(k),
            None => pre0,
        }
    } else {
        match store.cond_neg(p) {
            Some(k) => pre0.meet(k),
            None => pre0,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::{int_var, rel, var, FunctionBuilder};
    use crate::ast::{bb_id, Expr, RelOp, Stmt, Terminator};
    use crate::config::DEFAULT_UNROLLING_DELAY;
    use crate::domain::intervals::IntervalDomain;
    use crate::domain::{Comparator, Constraint, Satisfaction, SymExpr};

    fn assert_point(a: &IntervalDomain, v: &crate::ast::VarId, n: i64) {
        let c = Constraint::new(SymExpr::Sub(Box::new(SymExpr::Var(v.clone())), Box::new(SymExpr::ConstInt(n))), Comparator::Eq);
        assert_eq!(a.satisfies(&c), Satisfaction::Always, "expected {v} == {n}");
    }

    #[test]
    fn s1_sequential_assignment() {
        let x = int_var("x");
        let mut registry = VarRegistry::new();
        registry.declare(&x).unwrap();
        let func = FunctionBuilder::new("f")
            .block(
                bb_id("entry"),
                vec![
                    Stmt::Decl { var: x.clone(), init: Some(Expr::IntLit(5)) },
                    Stmt::Assign { lhs: x.clone(), rhs: crate::ast::build::add(var(&x), crate::ast::build::int_lit(3)) },
                ],
                Terminator::None,
                vec![bb_id("exit")],
            )
            .block(bb_id("exit"), vec![], Terminator::None, vec![])
            .build();
        let result: AnalysisResult<IntervalDomain> = analyze_function(&func, &mut registry, DEFAULT_UNROLLING_DELAY);
        let post = result.store.post(&bb_id("entry")).unwrap();
        assert_point(post, &x, 8);
    }

    #[test]
    fn s3_while_loop_reaches_bounded_fixpoint() {
        // int x = 0; while (x < 10) { x = x + 1; }
        let x = int_var("x");
        let mut registry = VarRegistry::new();
        registry.declare(&x).unwrap();
        let func = FunctionBuilder::new("f")
            .block(bb_id("entry"), vec![Stmt::Decl { var: x.clone(), init: Some(Expr::IntLit(0)) }], Terminator::None, vec![bb_id("head")])
            .block(bb_id("head"), vec![], Terminator::While(rel(RelOp::Lt, var(&x), crate::ast::build::int_lit(10))), vec![bb_id("body"), bb_id("exit")])
            .block(
                bb_id("body"),
                vec![Stmt::Assign { lhs: x.clone(), rhs: crate::ast::build::add(var(&x), crate::ast::build::int_lit(1)) }],
                Terminator::None,
                vec![bb_id("head")],
            )
            .block(bb_id("exit"), vec![], Terminator::None, vec![])
            .build();
        let result: AnalysisResult<IntervalDomain> = analyze_function(&func, &mut registry, 5);
        let exit_post = result.store.post(&bb_id("exit")).unwrap();
        assert_point(exit_post, &x, 10);
    }

    #[test]
    fn s5_do_while_loop() {
        // int x = 10; do { x = x - 1; } while (x > 0); branch-condition
        // narrowing on the loop body's own back edge keeps each widened
        // iterate tight enough that the post-widening join still closes on
        // the exact exit value.
        let x = int_var("x");
        let mut registry = VarRegistry::new();
        registry.declare(&x).unwrap();
        let func = FunctionBuilder::new("f")
            .block(bb_id("entry"), vec![Stmt::Decl { var: x.clone(), init: Some(Expr::IntLit(10)) }], Terminator::None, vec![bb_id("body")])
            .block(
                bb_id("body"),
                vec![Stmt::Assign { lhs: x.clone(), rhs: crate::ast::build::sub(var(&x), crate::ast::build::int_lit(1)) }],
                Terminator::Do(rel(RelOp::Gt, var(&x), crate::ast::build::int_lit(0))),
                vec![bb_id("body"), bb_id("exit")],
            )
            .block(bb_id("exit"), vec![], Terminator::None, vec![])
            .build();
        let result: AnalysisResult<IntervalDomain> = analyze_function(&func, &mut registry, 5);
        let exit_post = result.store.post(&bb_id("exit")).unwrap();
        assert_point(exit_post, &x, 0);
    }

    #[test]
    fn empty_function_body_is_top_at_entry_and_exit() {
        let mut registry = VarRegistry::new();
        let func = FunctionBuilder::new("f")
            .block(bb_id("entry"), vec![], Terminator::None, vec![bb_id("exit")])
            .block(bb_id("exit"), vec![], Terminator::None, vec![])
            .build();
        let result: AnalysisResult<IntervalDomain> = analyze_function(&func, &mut registry, 5);
        let entry_post = result.store.post(&bb_id("entry")).unwrap();
        let exit_post = result.store.post(&bb_id("exit")).unwrap();
        assert!(entry_post.equals(&IntervalDomain::top(registry.env())));
        assert!(exit_post.equals(&IntervalDomain::top(registry.env())));
    }

    #[test]
    fn while_zero_body_is_bottom_exit_keeps_pre_loop_state() {
        // int x = 0; while (0) { x = 99; }
        let x = int_var("x");
        let mut registry = VarRegistry::new();
        registry.declare(&x).unwrap();
        let func = FunctionBuilder::new("f")
            .block(bb_id("entry"), vec![Stmt::Decl { var: x.clone(), init: Some(Expr::IntLit(0)) }], Terminator::None, vec![bb_id("head")])
            .block(bb_id("head"), vec![], Terminator::While(Expr::IntLit(0)), vec![bb_id("body"), bb_id("exit")])
            .block(bb_id("body"), vec![Stmt::Assign { lhs: x.clone(), rhs: Expr::IntLit(99) }], Terminator::None, vec![bb_id("head")])
            .block(bb_id("exit"), vec![], Terminator::None, vec![])
            .build();
        let result: AnalysisResult<IntervalDomain> = analyze_function(&func, &mut registry, 5);
        assert!(result.store.pre(&bb_id("body")).unwrap().is_bottom());
        let exit_post = result.store.post(&bb_id("exit")).unwrap();
        assert_point(exit_post, &x, 0);
    }

    #[test]
    fn s2_if_else_join() {
        let x = int_var("x");
        let mut registry = VarRegistry::new();
        registry.declare(&x).unwrap();
        let func = FunctionBuilder::new("f")
            .block(bb_id("entry"), vec![Stmt::Decl { var: x.clone(), init: None }], Terminator::If(rel(RelOp::Gt, var(&x), crate::ast::build::int_lit(0))), vec![bb_id("then"), bb_id("els")])
            .block(bb_id("then"), vec![Stmt::Assign { lhs: x.clone(), rhs: Expr::IntLit(1) }], Terminator::None, vec![bb_id("join")])
            .block(bb_id("els"), vec![Stmt::Assign { lhs: x.clone(), rhs: Expr::IntLit(-1) }], Terminator::None, vec![bb_id("join")])
            .block(bb_id("join"), vec![], Terminator::None, vec![])
            .build();
        let result: AnalysisResult<IntervalDomain> = analyze_function(&func, &mut registry, 5);
        let join_post = result.store.post(&bb_id("join")).unwrap();
        let lower = Constraint::new(SymExpr::Sub(Box::new(SymExpr::Var(x.clone())), Box::new(SymExpr::ConstInt(-1))), Comparator::Ge);
        let upper = Constraint::new(SymExpr::Sub(Box::new(SymExpr::ConstInt(1)), Box::new(SymExpr::Var(x))), Comparator::Ge);
        assert_eq!(join_post.satisfies(&lower), Satisfaction::Always);
        assert_eq!(join_post.satisfies(&upper), Satisfaction::Always);
    }
}
