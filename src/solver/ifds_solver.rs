/*
 * IFDS solver: the IDE engine run over the two-point lattice.
 *
 * Owns the lifted problem and answers reachability queries. A fact is
 * reachable at a statement exactly when the value phase computed bottom
 * for it, which (with top never being stored) is the same as the value
 * being present at all.
 */

use rustc_hash::FxHashSet;
use std::fmt::Debug;
use std::hash::Hash;

use crate::lattice::BinaryDomain;
use crate::stats::SolverStatistics;

use super::ide_solver::IdeSolver;
use super::ifds_to_ide::{IfdsTabulationProblem, IfdsToIdeTabulationProblem};

pub struct IfdsSolver<N, D, M, P>
where
    N: Clone + Eq + Hash + Debug + 'static,
    D: Clone + Eq + Hash + Debug + 'static,
    M: Clone + Eq + Hash + Debug + 'static,
    P: IfdsTabulationProblem<N, D, M>,
{
    inner: IdeSolver<N, D, M, BinaryDomain, IfdsToIdeTabulationProblem<P>>,
}

impl<N, D, M, P> IfdsSolver<N, D, M, P>
where
    N: Clone + Eq + Hash + Debug + 'static,
    D: Clone + Eq + Hash + Debug + 'static,
    M: Clone + Eq + Hash + Debug + 'static,
    P: IfdsTabulationProblem<N, D, M>,
{
    pub fn new(problem: P) -> Self {
        Self {
            inner: IdeSolver::new(IfdsToIdeTabulationProblem::new(problem)),
        }
    }

    pub fn solve(&mut self) {
        self.inner.solve();
    }

    pub fn is_fact_reachable(&self, stmt: &N, fact: &D) -> bool {
        self.inner.result_at(stmt, fact) == Some(&BinaryDomain::Bottom)
    }

    /// All facts reachable at `stmt`, without the zero fact.
    pub fn ifds_results_at(&self, stmt: &N) -> FxHashSet<D> {
        self.inner.results_at(stmt, true).into_keys().collect()
    }

    pub fn statistics(&self) -> &SolverStatistics {
        self.inner.statistics()
    }

    /// The underlying IDE solver, e.g. for recorded-edge access.
    pub fn as_ide_solver(&self) -> &IdeSolver<N, D, M, BinaryDomain, IfdsToIdeTabulationProblem<P>> {
        &self.inner
    }

    pub fn problem(&self) -> &P {
        self.inner.problem().inner()
    }
}
