/*
 * Flow and edge function cache.
 *
 * Problem factories are pure but not free: clients build closures, consult
 * alias information, or allocate. The solver asks for the same function at
 * many path edges, so every factory query is memoized by its argument
 * tuple. The cache never stores a borrow of the problem; the problem is
 * handed in per query, which keeps the solver's ownership graph acyclic.
 *
 * Auto-zero is implemented here: when configured, client flow functions
 * are wrapped in `ZeroedFlowFunction` on first construction so the zero
 * fact keeps itself alive without client involvement.
 */

use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::edge_function::EdgeFunction;
use crate::flow_function::{SharedFlowFunction, ZeroedFlowFunction};
use crate::lattice::JoinLattice;
use crate::problem::IdeTabulationProblem;

pub struct FlowEdgeFunctionCache<N, D, M, V: JoinLattice> {
    zero_value: D,
    auto_add_zero: bool,

    normal_flow: FxHashMap<(N, N), SharedFlowFunction<D>>,
    call_flow: FxHashMap<(N, M), SharedFlowFunction<D>>,
    return_flow: FxHashMap<(Option<N>, M, N, Option<N>), SharedFlowFunction<D>>,
    call_to_return_flow: FxHashMap<(N, N), SharedFlowFunction<D>>,
    summary_flow: FxHashMap<(N, M), Option<SharedFlowFunction<D>>>,

    normal_edge: FxHashMap<(N, D, N, D), EdgeFunction<V>>,
    call_edge: FxHashMap<(N, D, M, D), EdgeFunction<V>>,
    return_edge: FxHashMap<(N, M, N, D, N, D), EdgeFunction<V>>,
    call_to_return_edge: FxHashMap<(N, D, N, D), EdgeFunction<V>>,
    summary_edge: FxHashMap<(N, D, N, D), EdgeFunction<V>>,

    pub hits: u64,
    pub misses: u64,
}

impl<N, D, M, V> FlowEdgeFunctionCache<N, D, M, V>
where
    N: Clone + Eq + Hash + Debug + 'static,
    D: Clone + Eq + Hash + Debug + 'static,
    M: Clone + Eq + Hash + Debug + 'static,
    V: JoinLattice,
{
    pub fn new(zero_value: D, auto_add_zero: bool) -> Self {
        Self {
            zero_value,
            auto_add_zero,
            normal_flow: FxHashMap::default(),
            call_flow: FxHashMap::default(),
            return_flow: FxHashMap::default(),
            call_to_return_flow: FxHashMap::default(),
            summary_flow: FxHashMap::default(),
            normal_edge: FxHashMap::default(),
            call_edge: FxHashMap::default(),
            return_edge: FxHashMap::default(),
            call_to_return_edge: FxHashMap::default(),
            summary_edge: FxHashMap::default(),
            hits: 0,
            misses: 0,
        }
    }

    fn zeroed(&self, f: SharedFlowFunction<D>) -> SharedFlowFunction<D> {
        if self.auto_add_zero {
            Arc::new(ZeroedFlowFunction::new(f, self.zero_value.clone()))
        } else {
            f
        }
    }

    pub fn normal_flow_function<P>(&mut self, problem: &P, curr: &N, succ: &N) -> SharedFlowFunction<D>
    where
        P: IdeTabulationProblem<N, D, M, V>,
    {
        let key = (curr.clone(), succ.clone());
        if let Some(f) = self.normal_flow.get(&key) {
            self.hits += 1;
            return f.clone();
        }
        self.misses += 1;
        let f = self.zeroed(problem.normal_flow_function(curr, succ));
        self.normal_flow.insert(key, f.clone());
        f
    }

    pub fn call_flow_function<P>(&mut self, problem: &P, call_site: &N, callee: &M) -> SharedFlowFunction<D>
    where
        P: IdeTabulationProblem<N, D, M, V>,
    {
        let key = (call_site.clone(), callee.clone());
        if let Some(f) = self.call_flow.get(&key) {
            self.hits += 1;
            return f.clone();
        }
        self.misses += 1;
        let f = self.zeroed(problem.call_flow_function(call_site, callee));
        self.call_flow.insert(key, f.clone());
        f
    }

    pub fn return_flow_function<P>(
        &mut self,
        problem: &P,
        call_site: Option<&N>,
        callee: &M,
        exit_stmt: &N,
        return_site: Option<&N>,
    ) -> SharedFlowFunction<D>
    where
        P: IdeTabulationProblem<N, D, M, V>,
    {
        let key = (
            call_site.cloned(),
            callee.clone(),
            exit_stmt.clone(),
            return_site.cloned(),
        );
        if let Some(f) = self.return_flow.get(&key) {
            self.hits += 1;
            return f.clone();
        }
        self.misses += 1;
        let f = self.zeroed(problem.return_flow_function(call_site, callee, exit_stmt, return_site));
        self.return_flow.insert(key, f.clone());
        f
    }

    pub fn call_to_return_flow_function<P>(
        &mut self,
        problem: &P,
        call_site: &N,
        return_site: &N,
    ) -> SharedFlowFunction<D>
    where
        P: IdeTabulationProblem<N, D, M, V>,
    {
        let key = (call_site.clone(), return_site.clone());
        if let Some(f) = self.call_to_return_flow.get(&key) {
            self.hits += 1;
            return f.clone();
        }
        self.misses += 1;
        let f = self.zeroed(problem.call_to_return_flow_function(call_site, return_site));
        self.call_to_return_flow.insert(key, f.clone());
        f
    }

    pub fn summary_flow_function<P>(
        &mut self,
        problem: &P,
        call_site: &N,
        callee: &M,
    ) -> Option<SharedFlowFunction<D>>
    where
        P: IdeTabulationProblem<N, D, M, V>,
    {
        let key = (call_site.clone(), callee.clone());
        if let Some(f) = self.summary_flow.get(&key) {
            self.hits += 1;
            return f.clone();
        }
        self.misses += 1;
        let f = problem.summary_flow_function(call_site, callee);
        self.summary_flow.insert(key, f.clone());
        f
    }

    pub fn normal_edge_function<P>(
        &mut self,
        problem: &P,
        curr: &N,
        curr_fact: &D,
        succ: &N,
        succ_fact: &D,
    ) -> EdgeFunction<V>
    where
        P: IdeTabulationProblem<N, D, M, V>,
    {
        let key = (curr.clone(), curr_fact.clone(), succ.clone(), succ_fact.clone());
        if let Some(f) = self.normal_edge.get(&key) {
            self.hits += 1;
            return f.clone();
        }
        self.misses += 1;
        let f = problem.normal_edge_function(curr, curr_fact, succ, succ_fact);
        self.normal_edge.insert(key, f.clone());
        f
    }

    pub fn call_edge_function<P>(
        &mut self,
        problem: &P,
        call_site: &N,
        src_fact: &D,
        callee: &M,
        dest_fact: &D,
    ) -> EdgeFunction<V>
    where
        P: IdeTabulationProblem<N, D, M, V>,
    {
        let key = (
            call_site.clone(),
            src_fact.clone(),
            callee.clone(),
            dest_fact.clone(),
        );
        if let Some(f) = self.call_edge.get(&key) {
            self.hits += 1;
            return f.clone();
        }
        self.misses += 1;
        let f = problem.call_edge_function(call_site, src_fact, callee, dest_fact);
        self.call_edge.insert(key, f.clone());
        f
    }

    #[allow(clippy::too_many_arguments)]
    pub fn return_edge_function<P>(
        &mut self,
        problem: &P,
        call_site: &N,
        callee: &M,
        exit_stmt: &N,
        exit_fact: &D,
        return_site: &N,
        ret_fact: &D,
    ) -> EdgeFunction<V>
    where
        P: IdeTabulationProblem<N, D, M, V>,
    {
        let key = (
            call_site.clone(),
            callee.clone(),
            exit_stmt.clone(),
            exit_fact.clone(),
            return_site.clone(),
            ret_fact.clone(),
        );
        if let Some(f) = self.return_edge.get(&key) {
            self.hits += 1;
            return f.clone();
        }
        self.misses += 1;
        let f = problem.return_edge_function(
            call_site, callee, exit_stmt, exit_fact, return_site, ret_fact,
        );
        self.return_edge.insert(key, f.clone());
        f
    }

    pub fn call_to_return_edge_function<P>(
        &mut self,
        problem: &P,
        call_site: &N,
        call_fact: &D,
        return_site: &N,
        ret_fact: &D,
    ) -> EdgeFunction<V>
    where
        P: IdeTabulationProblem<N, D, M, V>,
    {
        let key = (
            call_site.clone(),
            call_fact.clone(),
            return_site.clone(),
            ret_fact.clone(),
        );
        if let Some(f) = self.call_to_return_edge.get(&key) {
            self.hits += 1;
            return f.clone();
        }
        self.misses += 1;
        let f = problem.call_to_return_edge_function(call_site, call_fact, return_site, ret_fact);
        self.call_to_return_edge.insert(key, f.clone());
        f
    }

    pub fn summary_edge_function<P>(
        &mut self,
        problem: &P,
        call_site: &N,
        call_fact: &D,
        return_site: &N,
        ret_fact: &D,
    ) -> EdgeFunction<V>
    where
        P: IdeTabulationProblem<N, D, M, V>,
    {
        let key = (
            call_site.clone(),
            call_fact.clone(),
            return_site.clone(),
            ret_fact.clone(),
        );
        if let Some(f) = self.summary_edge.get(&key) {
            self.hits += 1;
            return f.clone();
        }
        self.misses += 1;
        let f = problem.summary_edge_function(call_site, call_fact, return_site, ret_fact);
        self.summary_edge.insert(key, f.clone());
        f
    }
}
