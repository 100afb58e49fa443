/*
 * IFDS problems and their lifting into IDE.
 *
 * IFDS is the special case of IDE where the only question is whether a
 * fact is reachable. The lifting runs an IFDS problem through the IDE
 * machinery over the two-point `BinaryDomain`: flow functions are
 * forwarded unchanged, and every exploded edge carries the identity
 * function except edges leaving the zero fact, which become constant
 * bottom ("reachable"). A fact then holds at a node exactly when its
 * computed value is bottom.
 *
 * The adapter owns the wrapped problem by value; the solver in turn owns
 * the adapter, so the lifted problem lives exactly as long as the solver
 * that references it.
 */

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::edge_function::EdgeFunction;
use crate::flow_function::SharedFlowFunction;
use crate::icfg::InterproceduralCfg;
use crate::lattice::BinaryDomain;
use crate::problem::{IdeTabulationProblem, SolverConfig};

/// An IFDS problem: flow functions over facts, no value lattice.
pub trait IfdsTabulationProblem<N, D, M>
where
    N: Clone + Eq + Hash + Debug + 'static,
    D: Clone + Eq + Hash + Debug + 'static,
    M: Clone + Eq + Hash + Debug + 'static,
{
    type Icfg: InterproceduralCfg<N, M> + Clone;

    fn zero_value(&self) -> D;

    fn is_zero_value(&self, fact: &D) -> bool {
        *fact == self.zero_value()
    }

    fn interprocedural_cfg(&self) -> Self::Icfg;

    fn initial_seeds(&self) -> FxHashMap<N, FxHashSet<D>>;

    fn solver_config(&self) -> SolverConfig {
        SolverConfig::default()
    }

    fn normal_flow_function(&self, curr: &N, succ: &N) -> SharedFlowFunction<D>;

    fn call_flow_function(&self, call_site: &N, callee: &M) -> SharedFlowFunction<D>;

    fn return_flow_function(
        &self,
        call_site: Option<&N>,
        callee: &M,
        exit_stmt: &N,
        return_site: Option<&N>,
    ) -> SharedFlowFunction<D>;

    fn call_to_return_flow_function(&self, call_site: &N, return_site: &N)
        -> SharedFlowFunction<D>;

    fn summary_flow_function(&self, call_site: &N, callee: &M) -> Option<SharedFlowFunction<D>> {
        let _ = (call_site, callee);
        None
    }
}

impl<N, D, M, T> IfdsTabulationProblem<N, D, M> for &T
where
    N: Clone + Eq + Hash + Debug + 'static,
    D: Clone + Eq + Hash + Debug + 'static,
    M: Clone + Eq + Hash + Debug + 'static,
    T: IfdsTabulationProblem<N, D, M>,
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
}

/// The lifted problem: an IFDS problem presented as an IDE problem over
/// [`BinaryDomain`].
pub struct IfdsToIdeTabulationProblem<P> {
    problem: P,
}

impl<P> IfdsToIdeTabulationProblem<P> {
    pub fn new(problem: P) -> Self {
        Self { problem }
    }

    pub fn inner(&self) -> &P {
        &self.problem
    }
}

impl<N, D, M, P> IdeTabulationProblem<N, D, M, BinaryDomain> for IfdsToIdeTabulationProblem<P>
where
    N: Clone + Eq + Hash + Debug + 'static,
    D: Clone + Eq + Hash + Debug + 'static,
    M: Clone + Eq + Hash + Debug + 'static,
    P: IfdsTabulationProblem<N, D, M>,
{
    type Icfg = P::Icfg;

    fn zero_value(&self) -> D {
        self.problem.zero_value()
    }

    fn is_zero_value(&self, fact: &D) -> bool {
        self.problem.is_zero_value(fact)
    }

    fn interprocedural_cfg(&self) -> Self::Icfg {
        self.problem.interprocedural_cfg()
    }

    fn initial_seeds(&self) -> FxHashMap<N, FxHashSet<D>> {
        self.problem.initial_seeds()
    }

    fn solver_config(&self) -> SolverConfig {
        self.problem.solver_config()
    }

    fn normal_flow_function(&self, curr: &N, succ: &N) -> SharedFlowFunction<D> {
        self.problem.normal_flow_function(curr, succ)
    }

    fn call_flow_function(&self, call_site: &N, callee: &M) -> SharedFlowFunction<D> {
        self.problem.call_flow_function(call_site, callee)
    }

    fn return_flow_function(
        &self,
        call_site: Option<&N>,
        callee: &M,
        exit_stmt: &N,
        return_site: Option<&N>,
    ) -> SharedFlowFunction<D> {
        self.problem
            .return_flow_function(call_site, callee, exit_stmt, return_site)
    }

    fn call_to_return_flow_function(
        &self,
        call_site: &N,
        return_site: &N,
    ) -> SharedFlowFunction<D> {
        self.problem.call_to_return_flow_function(call_site, return_site)
    }

    fn summary_flow_function(&self, call_site: &N, callee: &M) -> Option<SharedFlowFunction<D>> {
        self.problem.summary_flow_function(call_site, callee)
    }

    fn normal_edge_function(
        &self,
        _curr: &N,
        curr_fact: &D,
        _succ: &N,
        _succ_fact: &D,
    ) -> EdgeFunction<BinaryDomain> {
        // Edges leaving the zero fact make their target reachable
        // unconditionally; everything else passes reachability along.
        if self.problem.is_zero_value(curr_fact) {
            EdgeFunction::AllBottom
        } else {
            EdgeFunction::Identity
        }
    }

    fn call_edge_function(
        &self,
        _call_site: &N,
        src_fact: &D,
        _callee: &M,
        _dest_fact: &D,
    ) -> EdgeFunction<BinaryDomain> {
        if self.problem.is_zero_value(src_fact) {
            EdgeFunction::AllBottom
        } else {
            EdgeFunction::Identity
        }
    }

    fn return_edge_function(
        &self,
        _call_site: &N,
        _callee: &M,
        _exit_stmt: &N,
        exit_fact: &D,
        _return_site: &N,
        _ret_fact: &D,
    ) -> EdgeFunction<BinaryDomain> {
        if self.problem.is_zero_value(exit_fact) {
            EdgeFunction::AllBottom
        } else {
            EdgeFunction::Identity
        }
    }

    fn call_to_return_edge_function(
        &self,
        _call_site: &N,
        call_fact: &D,
        _return_site: &N,
        _ret_fact: &D,
    ) -> EdgeFunction<BinaryDomain> {
        if self.problem.is_zero_value(call_fact) {
            EdgeFunction::AllBottom
        } else {
            EdgeFunction::Identity
        }
    }

    fn summary_edge_function(
        &self,
        _call_site: &N,
        call_fact: &D,
        _return_site: &N,
        _ret_fact: &D,
    ) -> EdgeFunction<BinaryDomain> {
        if self.problem.is_zero_value(call_fact) {
            EdgeFunction::AllBottom
        } else {
            EdgeFunction::Identity
        }
    }
}
