//! Embedded demo programs standing in for `.c` files a real front end would
//! parse: each function here is built directly through
//! [`crate::ast::build`], the way `front_end::lower` would hand
//! a pre-validated function — just skipping the lexer and parser that a
//! real C front end would need and this crate intentionally doesn't have.

use crate::ast::build::{add, div, int_lit, int_var, rel, sub, var, FunctionBuilder};
use crate::ast::{bb_id, Expr, Function, RelOp, Stmt, Terminator};

/// S1: `int x = 5; x = x + 3;`
pub fn s1_sequential() -> Function {
    let x = int_var("x");
    FunctionBuilder::new("s1_sequential")
        .block(
            bb_id("entry"),
            vec![
                Stmt::Decl { var: x.clone(), init: Some(int_lit(5)) },
                Stmt::Assign { lhs: x.clone(), rhs: add(var(&x), int_lit(3)) },
            ],
            Terminator::None,
            vec![bb_id("exit")],
        )
        .block(bb_id("exit"), vec![], Terminator::None, vec![])
        .build()
}

/// S2: `int x; if (x > 0) { x = 1; } else { x = -1; }`
pub fn s2_if_else() -> Function {
    let x = int_var("x");
    FunctionBuilder::new("s2_if_else")
        .block(
            bb_id("entry"),
            vec![Stmt::Decl { var: x.clone(), init: None }],
            Terminator::If(rel(RelOp::Gt, var(&x), int_lit(0))),
            vec![bb_id("then"), bb_id("els")],
        )
        .block(bb_id("then"), vec![Stmt::Assign { lhs: x.clone(), rhs: int_lit(1) }], Terminator::None, vec![bb_id("join")])
        .block(bb_id("els"), vec![Stmt::Assign { lhs: x.clone(), rhs: int_lit(-1) }], Terminator::None, vec![bb_id("join")])
        .block(bb_id("join"), vec![], Terminator::None, vec![])
        .build()
}

/// S3: `int x = 0; while (x < 10) { x = x + 1; }`
pub fn s3_while() -> Function {
    let x = int_var("x");
    FunctionBuilder::new("s3_while")
        .block(bb_id("entry"), vec![Stmt::Decl { var: x.clone(), init: Some(int_lit(0)) }], Terminator::None, vec![bb_id("head")])
        .block(bb_id("head"), vec![], Terminator::While(rel(RelOp::Lt, var(&x), int_lit(10))), vec![bb_id("body"), bb_id("exit")])
        .block(bb_id("body"), vec![Stmt::Assign { lhs: x.clone(), rhs: add(var(&x), int_lit(1)) }], Terminator::None, vec![bb_id("head")])
        .block(bb_id("exit"), vec![], Terminator::None, vec![])
        .build()
}

/// S4: `int x = 0; for (int i = 0; i < 3; i = i + 1) { x = x + i; }`
pub fn s4_for() -> Function {
    let x = int_var("x");
    let i = int_var("i");
    FunctionBuilder::new("s4_for")
        .block(
            bb_id("entry"),
            vec![Stmt::Decl { var: x.clone(), init: Some(int_lit(0)) }, Stmt::Decl { var: i.clone(), init: Some(int_lit(0)) }],
            Terminator::None,
            vec![bb_id("head")],
        )
        .block(bb_id("head"), vec![], Terminator::For(rel(RelOp::Lt, var(&i), int_lit(3))), vec![bb_id("body"), bb_id("exit")])
        .block(
            bb_id("body"),
            vec![
                Stmt::Assign { lhs: x.clone(), rhs: add(var(&x), var(&i)) },
                Stmt::Assign { lhs: i.clone(), rhs: add(var(&i), int_lit(1)) },
            ],
            Terminator::None,
            vec![bb_id("head")],
        )
        .block(bb_id("exit"), vec![], Terminator::None, vec![])
        .build()
}

/// S5: `int x = 10; do { x = x - 1; } while (x > 0);`
pub fn s5_do_while() -> Function {
    let x = int_var("x");
    FunctionBuilder::new("s5_do_while")
        .block(bb_id("entry"), vec![Stmt::Decl { var: x.clone(), init: Some(int_lit(10)) }], Terminator::None, vec![bb_id("body")])
        .block(
            bb_id("body"),
            vec![Stmt::Assign { lhs: x.clone(), rhs: sub(var(&x), int_lit(1)) }],
            Terminator::Do(rel(RelOp::Gt, var(&x), int_lit(0))),
            vec![bb_id("body"), bb_id("exit")],
        )
        .block(bb_id("exit"), vec![], Terminator::None, vec![])
        .build()
}

/// S6: `int x; int y = x + 1; y = y + 1;`
pub fn s6_uninitialized_plus_relation() -> Function {
    let x = int_var("x");
    let y = int_var("y");
    FunctionBuilder::new("s6_uninitialized_plus_relation")
        .block(
            bb_id("entry"),
            vec![
                Stmt::Decl { var: x.clone(), init: None },
                Stmt::Decl { var: y.clone(), init: Some(add(var(&x), int_lit(1))) },
                Stmt::Assign { lhs: y.clone(), rhs: add(var(&y), int_lit(1)) },
            ],
            Terminator::None,
            vec![bb_id("exit")],
        )
        .block(bb_id("exit"), vec![], Terminator::None, vec![])
        .build()
}

/// Boundary: a function body containing only entry and exit.
pub fn empty_body() -> Function {
    FunctionBuilder::new("empty_body")
        .block(bb_id("entry"), vec![], Terminator::None, vec![bb_id("exit")])
        .block(bb_id("exit"), vec![], Terminator::None, vec![])
        .build()
}

/// Boundary: `while (0) { ... }` — the body is unreachable in the concrete
/// semantics; `pre(body) = bottom`.
pub fn while_false() -> Function {
    let x = int_var("x");
    FunctionBuilder::new("while_false")
        .block(bb_id("entry"), vec![Stmt::Decl { var: x.clone(), init: Some(int_lit(0)) }], Terminator::None, vec![bb_id("head")])
        .block(bb_id("head"), vec![], Terminator::While(Expr::IntLit(0)), vec![bb_id("body"), bb_id("exit")])
        .block(bb_id("body"), vec![Stmt::Assign { lhs: x.clone(), rhs: int_lit(99) }], Terminator::None, vec![bb_id("head")])
        .block(bb_id("exit"), vec![], Terminator::None, vec![])
        .build()
}

/// Boundary: `while (1) { x = x + 1; }` with no reachable break — the loop
/// never exits, so the successor after the head is unreachable.
pub fn while_true_no_break() -> Function {
    let x = int_var("x");
    FunctionBuilder::new("while_true_no_break")
        .block(bb_id("entry"), vec![Stmt::Decl { var: x.clone(), init: Some(int_lit(0)) }], Terminator::None, vec![bb_id("head")])
        .block(bb_id("head"), vec![], Terminator::While(Expr::IntLit(1)), vec![bb_id("body"), bb_id("exit")])
        .block(bb_id("body"), vec![Stmt::Assign { lhs: x.clone(), rhs: add(var(&x), int_lit(1)) }], Terminator::None, vec![bb_id("head")])
        .block(bb_id("exit"), vec![], Terminator::None, vec![])
        .build()
}

/// A division demo exercising the interval domain's div-by-maybe-zero path:
/// `int x = 10; int y = x / (x - x + 2);`
pub fn division_demo() -> Function {
    let x = int_var("x");
    let y = int_var("y");
    FunctionBuilder::new("division_demo")
        .block(
            bb_id("entry"),
            vec![
                Stmt::Decl { var: x.clone(), init: Some(int_lit(10)) },
                Stmt::Decl { var: y.clone(), init: Some(div(var(&x), int_lit(2))) },
            ],
            Terminator::None,
            vec![bb_id("exit")],
        )
        .block(bb_id("exit"), vec![], Terminator::None, vec![])
        .build()
}

pub fn by_name(name: &str) -> Option<Function> {
    Some(match name {
        "s1" => s1_sequential(),
        "s2" => s2_if_else(),
        "s3" => s3_while(),
        "s4" => s4_for(),
        "s5" => s5_do_while(),
        "s6" => s6_uninitialized_plus_relation(),
        "empty" => empty_body(),
        "while-false" => while_false(),
        "while-true" => while_true_no_break(),
        "division" => division_demo(),
        _ => return None,
    })
}

pub const NAMES: &[&str] = &["s1", "s2", "s3", "s4", "s5", "s6", "empty", "while-false", "while-true", "division"];
