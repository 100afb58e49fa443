/*
 * IDE tabulation problem interface.
 *
 * A client analysis supplies flow functions over facts, edge functions
 * over the value lattice, the zero fact, the initial seeds and the ICFG
 * handle. The solver drives everything else. Lattice extremes and the
 * join live on the value type itself (`JoinLattice`), so the problem only
 * answers questions that genuinely depend on the analysis.
 */

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

use crate::edge_function::EdgeFunction;
use crate::flow_function::SharedFlowFunction;
use crate::icfg::InterproceduralCfg;
use crate::lattice::JoinLattice;

/// Switches controlling a solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Record every propagated intra- and inter-procedural edge. The
    /// tables are large; leave this off unless a client reads them.
    pub record_edges: bool,
    /// Run the value-computation phase after supergraph construction.
    pub compute_values: bool,
    /// Wrap client flow functions so the zero fact survives on its own.
    pub auto_add_zero: bool,
    /// Propagate returns out of methods whose entry was never called from
    /// an analyzed context (library/partial analyses).
    pub follow_returns_past_seeds: bool,
    /// Reserved: emit reusable procedure summaries.
    pub compute_persisted_summaries: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            record_edges: false,
            compute_values: true,
            auto_add_zero: true,
            follow_returns_past_seeds: false,
            compute_persisted_summaries: false,
        }
    }
}

/// An IDE problem as consumed by the solver.
///
/// `N` identifies ICFG nodes, `D` dataflow facts, `M` methods and `V` the
/// lattice values flowing along edges. All key types need value semantics:
/// the solver hashes, compares and clones them constantly.
pub trait IdeTabulationProblem<N, D, M, V>
where
    N: Clone + Eq + Hash + Debug + 'static,
    D: Clone + Eq + Hash + Debug + 'static,
    M: Clone + Eq + Hash + Debug + 'static,
    V: JoinLattice,
{
    /// Handle under which the solver holds the ICFG for the whole run.
    type Icfg: InterproceduralCfg<N, M> + Clone;

    /// The distinguished fact that is unconditionally reachable.
    fn zero_value(&self) -> D;

    fn is_zero_value(&self, fact: &D) -> bool {
        *fact == self.zero_value()
    }

    fn interprocedural_cfg(&self) -> Self::Icfg;

    /// Start points and the facts holding there; drives both phases.
    fn initial_seeds(&self) -> FxHashMap<N, FxHashSet<D>>;

    fn solver_config(&self) -> SolverConfig {
        SolverConfig::default()
    }

    /// The function every jump-function entry starts from. Clients with a
    /// custom all-top representation can substitute it here.
    fn all_top_function(&self) -> EdgeFunction<V> {
        EdgeFunction::AllTop
    }

    // ---- flow functions (fact level) ----

    fn normal_flow_function(&self, curr: &N, succ: &N) -> SharedFlowFunction<D>;

    fn call_flow_function(&self, call_site: &N, callee: &M) -> SharedFlowFunction<D>;

    /// Return flow from `exit_stmt` of `callee` back to `return_site` of
    /// `call_site`. Both sites are `None` exactly when an unbalanced exit
    /// is replayed without any caller; clients relying on side effects of
    /// this query must tolerate the sentinel.
    fn return_flow_function(
        &self,
        call_site: Option<&N>,
        callee: &M,
        exit_stmt: &N,
        return_site: Option<&N>,
    ) -> SharedFlowFunction<D>;

    fn call_to_return_flow_function(&self, call_site: &N, return_site: &N)
        -> SharedFlowFunction<D>;

    /// Non-`None` short-circuits the callee entirely: the call behaves
    /// like a normal flow described by the returned function.
    fn summary_flow_function(&self, call_site: &N, callee: &M) -> Option<SharedFlowFunction<D>> {
        let _ = (call_site, callee);
        None
    }

    // ---- edge functions (value level) ----

    fn normal_edge_function(
        &self,
        curr: &N,
        curr_fact: &D,
        succ: &N,
        succ_fact: &D,
    ) -> EdgeFunction<V>;

    fn call_edge_function(
        &self,
        call_site: &N,
        src_fact: &D,
        callee: &M,
        dest_fact: &D,
    ) -> EdgeFunction<V>;

    fn return_edge_function(
        &self,
        call_site: &N,
        callee: &M,
        exit_stmt: &N,
        exit_fact: &D,
        return_site: &N,
        ret_fact: &D,
    ) -> EdgeFunction<V>;

    fn call_to_return_edge_function(
        &self,
        call_site: &N,
        call_fact: &D,
        return_site: &N,
        ret_fact: &D,
    ) -> EdgeFunction<V>;

    fn summary_edge_function(
        &self,
        call_site: &N,
        call_fact: &D,
        return_site: &N,
        ret_fact: &D,
    ) -> EdgeFunction<V> {
        let _ = (call_site, call_fact, return_site, ret_fact);
        EdgeFunction::Identity
    }

    /// Called for every fact returned to a caller; lets a client re-attach
    /// caller context to the returned fact without touching the callee's
    /// summaries. The default keeps the fact as-is.
    fn restore_context_on_returned_fact(
        &self,
        call_site: &N,
        caller_fact: &D,
        returned_fact: D,
    ) -> D {
        let _ = (call_site, caller_fact);
        returned_fact
    }
}

impl<N, D, M, V, T> IdeTabulationProblem<N, D, M, V> for &T
where
    N: Clone + Eq + Hash + Debug + 'static,
    D: Clone + Eq + Hash + Debug + 'static,
    M: Clone + Eq + Hash + Debug + 'static,
    V: JoinLattice,
    T: IdeTabulationProblem<N, D, M, V>,
{
    type Icfg = T::Icfg;

    fn zero_value(&self) -> D {
        (**self).zero_value()
    }

    fn is_zero_value(&self, fact: &D) -> bool {
        (**self).is_zero_value(fact)
    }

    fn interprocedural_cfg(&self) -> Self::Icfg {
        (**self).interprocedural_cfg()
    }

    fn initial_seeds(&self) -> FxHashMap<N, FxHashSet<D>> {
        (**self).initial_seeds()
    }

    fn solver_config(&self) -> SolverConfig {
        (**self).solver_config()
    }

    fn all_top_function(&self) -> EdgeFunction<V> {
        (**self).all_top_function()
    }

    fn normal_flow_function(&self, curr: &N, succ: &N) -> SharedFlowFunction<D> {
        (**self).normal_flow_function(curr, succ)
    }

    fn call_flow_function(&self, call_site: &N, callee: &M) -> SharedFlowFunction<D> {
        (**self).call_flow_function(call_site, callee)
    }

    fn return_flow_function(
        &self,
        call_site: Option<&N>,
        callee: &M,
        exit_stmt: &N,
        return_site: Option<&N>,
    ) -> SharedFlowFunction<D> {
        (**self).return_flow_function(call_site, callee, exit_stmt, return_site)
    }

    fn call_to_return_flow_function(
        &self,
        call_site: &N,
        return_site: &N,
    ) -> SharedFlowFunction<D> {
        (**self).call_to_return_flow_function(call_site, return_site)
    }

    fn summary_flow_function(&self, call_site: &N, callee: &M) -> Option<SharedFlowFunction<D>> {
        (**self).summary_flow_function(call_site, callee)
    }

    fn normal_edge_function(
        &self,
        curr: &N,
        curr_fact: &D,
        succ: &N,
        succ_fact: &D,
    ) -> EdgeFunction<V> {
        (**self).normal_edge_function(curr, curr_fact, succ, succ_fact)
    }

    fn call_edge_function(
        &self,
        call_site: &N,
        src_fact: &D,
        callee: &M,
        dest_fact: &D,
    ) -> EdgeFunction<V> {
        (**self).call_edge_function(call_site, src_fact, callee, dest_fact)
    }

    fn return_edge_function(
        &self,
        call_site: &N,
        callee: &M,
        exit_stmt: &N,
        exit_fact: &D,
        return_site: &N,
        ret_fact: &D,
    ) -> EdgeFunction<V> {
        (**self).return_edge_function(call_site, callee, exit_stmt, exit_fact, return_site, ret_fact)
    }

    fn call_to_return_edge_function(
        &self,
        call_site: &N,
        call_fact: &D,
        return_site: &N,
        ret_fact: &D,
    ) -> EdgeFunction<V> {
        (**self).call_to_return_edge_function(call_site, call_fact, return_site, ret_fact)
    }

    fn summary_edge_function(
        &self,
        call_site: &N,
        call_fact: &D,
        return_site: &N,
        ret_fact: &D,
    ) -> EdgeFunction<V> {
        (**self).summary_edge_function(call_site, call_fact, return_site, ret_fact)
    }

    fn restore_context_on_returned_fact(
        &self,
        call_site: &N,
        caller_fact: &D,
        returned_fact: D,
    ) -> D {
        (**self).restore_context_on_returned_fact(call_site, caller_fact, returned_fact)
    }
}
