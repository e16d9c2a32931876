//! Per-block result store.
//!
//! For each block: pre-state, post-state, and — for branching blocks — the
//! abstractions of the positive and negative branch condition; for
//! loop-tail blocks, the previous widened post-state (`loopExitPrev`).

use std::collections::BTreeMap;

use crate::ast::BbId;

#[derive(Clone, Debug)]
struct BlockResult<D> {
    pre: Option<D>,
    post: Option<D>,
    cond_pos: Option<D>,
    cond_neg: Option<D>,
}

impl<D> Default for BlockResult<D> {
    fn default() -> Self {
        BlockResult { pre: None, post: None, cond_pos: None, cond_neg: None }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BlockStore<D> {
    results: BTreeMap<BbId, BlockResult<D>>,
    /// Keyed by the back-edge tail block id.
    loop_exit_prev: BTreeMap<BbId, D>,
}

impl<D: Clone> BlockStore<D> {
    pub fn new() -> Self {
        BlockStore { results: BTreeMap::new(), loop_exit_prev: BTreeMap::new() }
    }

    pub fn set_pre(&mut self, b: BbId, a: D) {
        self.results.entry(b).or_default().pre = Some(a);
    }

    pub fn pre(&self, b: &BbId) -> Option<&D> {
        self.results.get(b).and_then(|r| r.pre.as_ref())
    }

    pub fn set_post(&mut self, b: BbId, a: D) {
        self.results.entry(b).or_default().post = Some(a);
    }

    pub fn post(&self, b: &BbId) -> Option<&D> {
        self.results.get(b).and_then(|r| r.post.as_ref())
    }

    pub fn set_cond(&mut self, b: BbId, pos: D, neg: D) {
        let entry = self.results.entry(b).or_default();
        entry.cond_pos = Some(pos);
        entry.cond_neg = Some(neg);
    }

    pub fn cond_pos(&self, b: &BbId) -> Option<&D> {
        self.results.get(b).and_then(|r| r.cond_pos.as_ref())
    }

    pub fn cond_neg(&self, b: &BbId) -> Option<&D> {
        self.results.get(b).and_then(|r| r.cond_neg.as_ref())
    }

    pub fn loop_exit_prev(&self, tail: &BbId) -> Option<&D> {
        self.loop_exit_prev.get(tail)
    }

    pub fn set_loop_exit_prev(&mut self, tail: BbId, a: D) {
        self.loop_exit_prev.insert(tail, a);
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BbId> {
        self.results.keys()
    }
}
