/*
 * Jump function table.
 *
 * A jump function summarizes the composed value transformation of a
 * realizable path from (method start, source fact) to (node, target fact).
 * The propagation phase needs three access patterns over the same data:
 *
 *   forward:   (source fact, target node)  -> target fact -> function
 *   reverse:   (target node, target fact)  -> source fact -> function
 *   by target:  target node                -> (source fact, target fact) -> function
 *
 * All three views are kept in sync by `add_function`. Entries that are
 * all-top are not materialized; an absent entry means all-top (line [2]
 * of Fig. 7 in SRH'96).
 */

use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::edge_function::EdgeFunction;
use crate::lattice::JoinLattice;
use crate::table::Table;

#[derive(Debug)]
pub struct JumpFunctions<N, D, V: JoinLattice> {
    forward: FxHashMap<(D, N), FxHashMap<D, EdgeFunction<V>>>,
    reverse: FxHashMap<(N, D), FxHashMap<D, EdgeFunction<V>>>,
    by_target: FxHashMap<N, Table<D, D, EdgeFunction<V>>>,
}

impl<N, D, V> JumpFunctions<N, D, V>
where
    N: Clone + Eq + Hash + Debug,
    D: Clone + Eq + Hash + Debug,
    V: JoinLattice,
{
    pub fn new() -> Self {
        Self {
            forward: FxHashMap::default(),
            reverse: FxHashMap::default(),
            by_target: FxHashMap::default(),
        }
    }

    /// Record the jump function for `(source_fact, target, target_fact)`.
    /// Replaces any previous entry; callers are responsible for joining
    /// beforehand (the `propagate` primitive does).
    pub fn add_function(&mut self, source_fact: D, target: N, target_fact: D, f: EdgeFunction<V>) {
        // All-top is the implicit default of every cell.
        if f.is_all_top() {
            return;
        }
        self.forward
            .entry((source_fact.clone(), target.clone()))
            .or_default()
            .insert(target_fact.clone(), f.clone());
        self.reverse
            .entry((target.clone(), target_fact.clone()))
            .or_default()
            .insert(source_fact.clone(), f.clone());
        self.by_target
            .entry(target)
            .or_default()
            .insert(source_fact, target_fact, f);
    }

    /// All `(target fact, function)` pairs for a source fact at a node.
    pub fn forward_lookup(
        &self,
        source_fact: &D,
        target: &N,
    ) -> Option<&FxHashMap<D, EdgeFunction<V>>> {
        self.forward.get(&(source_fact.clone(), target.clone()))
    }

    /// All `(source fact, function)` pairs reaching a target fact at a node.
    pub fn reverse_lookup(
        &self,
        target: &N,
        target_fact: &D,
    ) -> Option<&FxHashMap<D, EdgeFunction<V>>> {
        self.reverse.get(&(target.clone(), target_fact.clone()))
    }

    /// Every jump function ending at `target`, keyed by (source fact,
    /// target fact).
    pub fn lookup_by_target(&self, target: &N) -> Option<&Table<D, D, EdgeFunction<V>>> {
        self.by_target.get(target)
    }
}

impl<N, D, V> Default for JumpFunctions<N, D, V>
where
    N: Clone + Eq + Hash + Debug,
    D: Clone + Eq + Hash + Debug,
    V: JoinLattice,
{
    fn default() -> Self {
        Self::new()
    }
}
