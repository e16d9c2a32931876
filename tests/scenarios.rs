//! End-to-end coverage running the fixpoint driver over the embedded demo
//! programs and checking externally observable facts about the resulting
//! abstract states, the way `front_end/tests/lower_tests` checks a lowering
//! pass's output against the shape it claims to produce.

use rangecheck::config::DEFAULT_UNROLLING_DELAY;
use rangecheck::demos;
use rangecheck::domain::intervals::IntervalDomain;
use rangecheck::domain::octagon::OctagonDomain;
use rangecheck::domain::{Comparator, Constraint, NumericDomain, Satisfaction, SymExpr};
use rangecheck::env::VarRegistry;
use rangecheck::{analyze_function, AnalysisResult};

fn var(name: &str) -> rangecheck::ast::VarId {
    rangecheck::ast::build::int_var(name)
}

fn eq(a: &impl NumericDomain, name: &str, n: i64) -> bool {
    let c = Constraint::new(
        SymExpr::Sub(Box::new(SymExpr::Var(var(name))), Box::new(SymExpr::ConstInt(n))),
        Comparator::Eq,
    );
    a.satisfies(&c) == Satisfaction::Always
}

fn run_intervals(func: rangecheck::ast::Function) -> AnalysisResult<IntervalDomain> {
    let mut registry = VarRegistry::new();
    analyze_function(&func, &mut registry, DEFAULT_UNROLLING_DELAY)
}

#[test]
fn s1_sequential_exit_is_exact() {
    let result = run_intervals(demos::s1_sequential());
    let post = result.store.post(&rangecheck::ast::bb_id("exit")).unwrap();
    assert!(eq(post, "x", 8));
}

#[test]
fn s2_if_else_join_covers_both_arms() {
    let result = run_intervals(demos::s2_if_else());
    let then_post = result.store.post(&rangecheck::ast::bb_id("then")).unwrap();
    let els_post = result.store.post(&rangecheck::ast::bb_id("els")).unwrap();
    let join_post = result.store.post(&rangecheck::ast::bb_id("join")).unwrap();
    assert!(eq(then_post, "x", 1));
    assert!(eq(els_post, "x", -1));
    assert!(!eq(join_post, "x", 1) && !eq(join_post, "x", -1), "join must widen past either single arm");
    let lower = Constraint::new(
        SymExpr::Sub(Box::new(SymExpr::Var(var("x"))), Box::new(SymExpr::ConstInt(-1))),
        Comparator::Ge,
    );
    let upper = Constraint::new(
        SymExpr::Sub(Box::new(SymExpr::ConstInt(1)), Box::new(SymExpr::Var(var("x")))),
        Comparator::Ge,
    );
    assert_eq!(join_post.satisfies(&lower), Satisfaction::Always);
    assert_eq!(join_post.satisfies(&upper), Satisfaction::Always);
}

#[test]
fn s3_while_loop_bound_is_exact_at_exit() {
    let result = run_intervals(demos::s3_while());
    let post = result.store.post(&rangecheck::ast::bb_id("exit")).unwrap();
    assert!(eq(post, "x", 10));
}

#[test]
fn s4_for_loop_counter_is_exact_at_exit() {
    let result = run_intervals(demos::s4_for());
    let post = result.store.post(&rangecheck::ast::bb_id("exit")).unwrap();
    assert!(eq(post, "i", 3));
}

#[test]
fn s5_do_while_reaches_exact_zero() {
    let result = run_intervals(demos::s5_do_while());
    let post = result.store.post(&rangecheck::ast::bb_id("exit")).unwrap();
    assert!(eq(post, "x", 0));
}

#[test]
fn s5_do_while_matches_across_domains() {
    let mut registry = VarRegistry::new();
    let result: AnalysisResult<OctagonDomain> = analyze_function(&demos::s5_do_while(), &mut registry, DEFAULT_UNROLLING_DELAY);
    let post = result.store.post(&rangecheck::ast::bb_id("exit")).unwrap();
    assert!(eq(post, "x", 0));
}

#[test]
fn s6_uninitialized_read_leaves_result_unconstrained() {
    let result = run_intervals(demos::s6_uninitialized_plus_relation());
    let post = result.store.post(&rangecheck::ast::bb_id("exit")).unwrap();
    assert!(!post.is_bottom());
    assert!(!eq(post, "y", 2), "an uninitialized read must not collapse to a single value");
}

#[test]
fn empty_function_body_has_no_state_at_all_to_constrain() {
    let result = run_intervals(demos::empty_body());
    let entry_post = result.store.post(&rangecheck::ast::bb_id("entry")).unwrap();
    let exit_post = result.store.post(&rangecheck::ast::bb_id("exit")).unwrap();
    assert!(!entry_post.is_bottom());
    assert!(!exit_post.is_bottom());
}

#[test]
fn while_false_body_is_unreachable() {
    let result = run_intervals(demos::while_false());
    let body_post = result.store.post(&rangecheck::ast::bb_id("body")).unwrap();
    assert!(body_post.is_bottom(), "a loop body gated by a literal-false condition must be bottom");
    let exit_post = result.store.post(&rangecheck::ast::bb_id("exit")).unwrap();
    assert!(eq(exit_post, "x", 0), "x must keep its pre-loop value when the body never runs");
}

#[test]
fn while_true_no_break_makes_the_successor_unreachable() {
    let result = run_intervals(demos::while_true_no_break());
    let exit_post = result.store.post(&rangecheck::ast::bb_id("exit")).unwrap();
    assert!(exit_post.is_bottom(), "no concrete path reaches past an unconditional loop");
}

#[test]
fn division_by_a_provably_nonzero_constant_is_exact() {
    let result = run_intervals(demos::division_demo());
    let post = result.store.post(&rangecheck::ast::bb_id("exit")).unwrap();
    assert!(eq(post, "y", 5));
}

#[test]
fn every_named_demo_resolves_and_analyzes_without_panicking() {
    for name in demos::NAMES {
        let func = demos::by_name(name).unwrap_or_else(|| panic!("{name} not found"));
        let _ = run_intervals(func);
    }
    assert!(demos::by_name("does-not-exist").is_none());
}
