//! CFG preprocessor.
//!
//! Builds the edge model, detects back edges by depth-first 3-coloring,
//! computes strongly connected components, and
//! produces a traversal order that respects loop structure and
//! `goto`-to-loop-exit labels.
//!
//! Scheduling simplification (documented in DESIGN.md): the traversal order
//! is built by a single predecessor-first DFS pass. Re-entering a loop body
//! across fixpoint iterations is handled dynamically by the fixpoint driver
//! rewinding its cursor on a back edge, so the static order need not
//! duplicate the loop head/tail explicitly — the driver's rewind already
//! produces the same effect. `goto`-to-loop-exit deferral (pending-list
//! resumption once the loop's tail emits) is implemented in full.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{BbId, Function, Terminator};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminatorKind {
    None,
    If,
    While,
    Do,
    For,
    Goto,
    /// A `goto` to a `while_break`-prefixed label.
    GotoBreak,
}

impl TerminatorKind {
    fn classify(term: &Terminator) -> Self {
        match term {
            Terminator::None => TerminatorKind::None,
            Terminator::If(_) => TerminatorKind::If,
            Terminator::While(_) => TerminatorKind::While,
            Terminator::Do(_) => TerminatorKind::Do,
            Terminator::For(_) => TerminatorKind::For,
            Terminator::Goto(label) => {
                if BbId::is_loop_break_label(&crate::ast::bb_id(label)) {
                    TerminatorKind::GotoBreak
                } else {
                    TerminatorKind::Goto
                }
            }
        }
    }

    pub fn is_loop_head(self) -> bool {
        matches!(self, TerminatorKind::While | TerminatorKind::For)
    }
}

#[derive(Clone, Debug)]
pub struct EdgeData {
    pub is_back: bool,
    pub visit_count: u32,
}

#[derive(Clone, Debug)]
pub struct LoopRecord {
    pub head: BbId,
    pub tail: BbId,
    pub pending_blocks: Vec<BbId>,
    pub completed: bool,
}

pub struct CfgInfo {
    pub terminator_kind: BTreeMap<BbId, TerminatorKind>,
    pub edges: BTreeMap<(BbId, BbId), EdgeData>,
    pub loops: Vec<LoopRecord>,
    pub sccs: Vec<Vec<BbId>>,
    pub order: Vec<BbId>,
    predecessors: BTreeMap<BbId, Vec<BbId>>,
}

impl CfgInfo {
    pub fn build(func: &Function) -> Self {
        let terminator_kind: BTreeMap<BbId, TerminatorKind> =
            func.blocks.values().map(|b| (b.id.clone(), TerminatorKind::classify(&b.term))).collect();

        let mut edges: BTreeMap<(BbId, BbId), EdgeData> = BTreeMap::new();
        let mut predecessors: BTreeMap<BbId, Vec<BbId>> = BTreeMap::new();
        for block in func.blocks.values() {
            for succ in &block.succs {
                edges.insert((block.id.clone(), succ.clone()), EdgeData { is_back: false, visit_count: 0 });
                predecessors.entry(succ.clone()).or_default().push(block.id.clone());
            }
        }

        let mut loops = Vec::new();
        mark_back_edges(func, &mut edges, &mut loops);

        let sccs = tarjan_scc(func);

        let loop_of_tail: BTreeMap<BbId, usize> =
            loops.iter().enumerate().map(|(i, l)| (l.tail.clone(), i)).collect();

        let mut cfg = CfgInfo { terminator_kind, edges, loops, sccs, order: Vec::new(), predecessors };
        cfg.order = build_order(func, &cfg.edges, &loop_of_tail, &mut cfg.loops);
        cfg
    }

    pub fn predecessors(&self, b: &BbId) -> &[BbId] {
        self.predecessors.get(b).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn terminator_kind(&self, b: &BbId) -> TerminatorKind {
        self.terminator_kind.get(b).copied().unwrap_or(TerminatorKind::None)
    }

    pub fn edge(&self, src: &BbId, dst: &BbId) -> Option<&EdgeData> {
        self.edges.get(&(src.clone(), dst.clone()))
    }

    pub fn edge_mut(&mut self, src: &BbId, dst: &BbId) -> Option<&mut EdgeData> {
        self.edges.get_mut(&(src.clone(), dst.clone()))
    }

    /// The loop record whose tail is `b`, if any.
    pub fn loop_for_tail(&self, b: &BbId) -> Option<&LoopRecord> {
        self.loops.iter().find(|l| &l.tail == b)
    }

    pub fn loop_for_tail_mut(&mut self, b: &BbId) -> Option<&mut LoopRecord> {
        self.loops.iter_mut().find(|l| &l.tail == b)
    }
}

fn mark_back_edges(func: &Function, edges: &mut BTreeMap<(BbId, BbId), EdgeData>, loops: &mut Vec<LoopRecord>) {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Color {
        White,
        Gray,
        Black,
    }
    let mut color: BTreeMap<BbId, Color> = func.blocks.keys().map(|b| (b.clone(), Color::White)).collect();

    fn visit(
        b: &BbId,
        func: &Function,
        color: &mut BTreeMap<BbId, Color>,
        edges: &mut BTreeMap<(BbId, BbId), EdgeData>,
        loops: &mut Vec<LoopRecord>,
    ) {
        color.insert(b.clone(), Color::Gray);
        if let Some(block) = func.blocks.get(b) {
            for succ in &block.succs {
                match color.get(succ).copied().unwrap_or(Color::White) {
                    Color::White => visit(succ, func, color, edges, loops),
                    Color::Gray => {
                        if let Some(e) = edges.get_mut(&(b.clone(), succ.clone())) {
                            e.is_back = true;
                        }
                        loops.push(LoopRecord {
                            head: succ.clone(),
                            tail: b.clone(),
                            pending_blocks: Vec::new(),
                            completed: false,
                        });
                    }
                    Color::Black => {}
                }
            }
        }
        color.insert(b.clone(), Color::Black);
    }

    visit(&func.entry, func, &mut color, edges, loops);
}

/// Tarjan's SCC algorithm; components of size > 1, or a single self-looping
/// block, are genuine cycles. Reported for diagnostics only.
fn tarjan_scc(func: &Function) -> Vec<Vec<BbId>> {
    struct State {
        index: BTreeMap<BbId, usize>,
        lowlink: BTreeMap<BbId, usize>,
        on_stack: BTreeSet<BbId>,
        stack: Vec<BbId>,
        counter: usize,
        out: Vec<Vec<BbId>>,
    }

    fn strongconnect(v: &BbId, func: &Function, st: &mut State) {
        st.index.insert(v.clone(), st.counter);
        st.lowlink.insert(v.clone(), st.counter);
        st.counter += 1;
        st.stack.push(v.clone());
        st.on_stack.insert(v.clone());

        if let Some(block) = func.blocks.get(v) {
            for w in &block.succs {
                if !st.index.contains_key(w) {
                    strongconnect(w, func, st);
                    let wl = st.lowlink[w];
                    let vl = st.lowlink[v];
                    st.lowlink.insert(v.clone(), vl.min(wl));
                } else if st.on_stack.contains(w) {
                    let wi = st.index[w];
                    let vl = st.lowlink[v];
                    st.lowlink.insert(v.clone(), vl.min(wi));
                }
            }
        }

        if st.lowlink[v] == st.index[v] {
            let mut comp = Vec::new();
            loop {
                let w = st.stack.pop().unwrap();
                st.on_stack.remove(&w);
                let is_v = w == *v;
                comp.push(w);
                if is_v {
                    break;
                }
            }
            st.out.push(comp);
        }
    }

    let mut st = State {
        index: BTreeMap::new(),
        lowlink: BTreeMap::new(),
        on_stack: BTreeSet::new(),
        stack: Vec::new(),
        counter: 0,
        out: Vec::new(),
    };
    for b in func.blocks.keys() {
        if !st.index.contains_key(b) {
            strongconnect(b, func, &mut st);
        }
    }
    st.out.into_iter().filter(|c| c.len() > 1 || is_self_loop(func, &c[0])).collect()
}

fn is_self_loop(func: &Function, b: &BbId) -> bool {
    func.blocks.get(b).is_some_and(|block| block.succs.contains(b))
}

fn build_order(
    func: &Function,
    edges: &BTreeMap<(BbId, BbId), EdgeData>,
    loop_of_tail: &BTreeMap<BbId, usize>,
    loops: &mut [LoopRecord],
) -> Vec<BbId> {
    let mut visited: BTreeSet<BbId> = BTreeSet::new();
    let mut order: Vec<BbId> = Vec::new();
    let mut predecessors: BTreeMap<BbId, Vec<BbId>> = BTreeMap::new();
    for block in func.blocks.values() {
        for succ in &block.succs {
            predecessors.entry(succ.clone()).or_default().push(block.id.clone());
        }
    }
    // stack of loop indices whose head has been emitted but tail has not.
    let mut open_loops: Vec<usize> = Vec::new();

    fn is_forward(edges: &BTreeMap<(BbId, BbId), EdgeData>, p: &BbId, b: &BbId) -> bool {
        !edges.get(&(p.clone(), b.clone())).map(|e| e.is_back).unwrap_or(false)
    }

    fn visit(
        b: &BbId,
        func: &Function,
        edges: &BTreeMap<(BbId, BbId), EdgeData>,
        predecessors: &BTreeMap<BbId, Vec<BbId>>,
        loop_of_tail: &BTreeMap<BbId, usize>,
        loops: &mut [LoopRecord],
        open_loops: &mut Vec<usize>,
        visited: &mut BTreeSet<BbId>,
        order: &mut Vec<BbId>,
    ) {
        if visited.contains(b) {
            return;
        }
        visited.insert(b.clone());

        if let Some(preds) = predecessors.get(b) {
            for p in preds {
                if is_forward(edges, p, b) && !visited.contains(p) {
                    visit(p, func, edges, predecessors, loop_of_tail, loops, open_loops, visited, order);
                }
            }
        }

        // A goto-break block discovered while its innermost open loop's
        // tail hasn't emitted yet is deferred.
        let term_is_goto_break = func.blocks.get(b).is_some_and(|blk| matches!(&blk.term, Terminator::Goto(l) if BbId::is_loop_break_label(&crate::ast::bb_id(l))));
        if term_is_goto_break {
            if let Some(&loop_idx) = open_loops.last() {
                loops[loop_idx].pending_blocks.push(b.clone());
                // recurse into successors even though emission is deferred,
                // so the rest of the graph still gets scheduled.
                if let Some(block) = func.blocks.get(b) {
                    for succ in block.succs.clone() {
                        visit(&succ, func, edges, predecessors, loop_of_tail, loops, open_loops, visited, order);
                    }
                }
                return;
            }
        }

        order.push(b.clone());
        if let Some(block) = func.blocks.get(b) {
            if TerminatorKind::classify(&block.term).is_loop_head() {
                if let Some(idx) = loops.iter().position(|l| l.head == *b) {
                    open_loops.push(idx);
                }
            }
        }

        if let Some(block) = func.blocks.get(b) {
            for succ in block.succs.clone() {
                visit(&succ, func, edges, predecessors, loop_of_tail, loops, open_loops, visited, order);
            }
        }

        if let Some(&loop_idx) = loop_of_tail.get(b) {
            loops[loop_idx].completed = true;
            let pending = std::mem::take(&mut loops[loop_idx].pending_blocks);
            order.extend(pending);
            open_loops.retain(|&i| i != loop_idx);
        }
    }

    visit(&func.entry, func, edges, &predecessors, loop_of_tail, loops, &mut open_loops, &mut visited, &mut order);

    // unreachable blocks may remain unvisited; append them so the driver can
    // dynamically skip them via the reachability gate, rather than silently dropping them from the schedule.
    for b in func.blocks.keys() {
        if !visited.contains(b) {
            order.push(b.clone());
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::FunctionBuilder;
    use crate::ast::{bb_id, Stmt};

    #[test]
    fn while_loop_back_edge_is_marked() {
        // entry -> head -(true)-> body -> head(back) ; head -(false)-> exit
        let func = FunctionBuilder::new("f")
            .block(bb_id("entry"), vec![], Terminator::None, vec![bb_id("head")])
            .block(bb_id("head"), vec![], Terminator::While(crate::ast::Expr::IntLit(1)), vec![bb_id("body"), bb_id("exit")])
            .block(bb_id("body"), vec![Stmt::Return(None)], Terminator::None, vec![bb_id("head")])
            .block(bb_id("exit"), vec![], Terminator::None, vec![])
            .build();
        let cfg = CfgInfo::build(&func);
        assert!(cfg.edge(&bb_id("body"), &bb_id("head")).unwrap().is_back);
        assert!(!cfg.edge(&bb_id("entry"), &bb_id("head")).unwrap().is_back);
        assert_eq!(cfg.loops.len(), 1);
        assert_eq!(cfg.loops[0].head, bb_id("head"));
        assert_eq!(cfg.loops[0].tail, bb_id("body"));
    }

    #[test]
    fn traversal_order_visits_head_before_body_before_tail() {
        let func = FunctionBuilder::new("f")
            .block(bb_id("entry"), vec![], Terminator::None, vec![bb_id("head")])
            .block(bb_id("head"), vec![], Terminator::While(crate::ast::Expr::IntLit(1)), vec![bb_id("body"), bb_id("exit")])
            .block(bb_id("body"), vec![], Terminator::None, vec![bb_id("head")])
            .block(bb_id("exit"), vec![], Terminator::None, vec![])
            .build();
        let cfg = CfgInfo::build(&func);
        let pos = |id: &str| cfg.order.iter().position(|b| b.as_str() == id).unwrap();
        assert!(pos("entry") < pos("head"));
        assert!(pos("head") < pos("body"));
    }

    #[test]
    fn self_loop_is_its_own_scc() {
        let func = FunctionBuilder::new("f")
            .block(bb_id("entry"), vec![], Terminator::None, vec![bb_id("loop")])
            .block(bb_id("loop"), vec![], Terminator::While(crate::ast::Expr::IntLit(1)), vec![bb_id("loop"), bb_id("exit")])
            .block(bb_id("exit"), vec![], Terminator::None, vec![])
            .build();
        let cfg = CfgInfo::build(&func);
        assert!(cfg.sccs.iter().any(|c| c == &[bb_id("loop")]));
    }
}
