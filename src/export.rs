/*
 * Result graph export.
 *
 * Serializable snapshot of a solved supergraph: the methods discovered
 * from the seeds, every visited statement with its successors, and the
 * fact/value environment computed per statement. Identifiers are the
 * `Debug` renderings of the client's node, fact, method and value types.
 */

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

use crate::icfg::InterproceduralCfg;
use crate::lattice::JoinLattice;
use crate::problem::IdeTabulationProblem;
use crate::solver::IdeSolver;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("result graph serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactEntry {
    pub fact: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementEntry {
    pub id: String,
    pub method: String,
    pub successors: Vec<String>,
    pub facts: Vec<FactEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultGraph {
    pub id: String,
    pub methods: Vec<String>,
    pub statements: Vec<StatementEntry>,
}

impl ResultGraph {
    /// Walk the ICFG from every seed, following calls into their callees,
    /// and snapshot the computed environments.
    pub fn from_solver<N, D, M, V, P>(graph_id: &str, solver: &IdeSolver<N, D, M, V, P>) -> Self
    where
        N: Clone + Eq + Hash + Debug + 'static,
        D: Clone + Eq + Hash + Debug + 'static,
        M: Clone + Eq + Hash + Debug + 'static,
        V: JoinLattice,
        P: IdeTabulationProblem<N, D, M, V>,
    {
        let icfg = solver.icfg();
        let mut methods: BTreeSet<String> = BTreeSet::new();
        let mut visited: BTreeSet<String> = BTreeSet::new();
        let mut statements: Vec<StatementEntry> = Vec::new();
        let mut queue: VecDeque<N> = VecDeque::new();

        for start_point in solver.initial_seeds().keys() {
            queue.push_back(start_point.clone());
        }

        while let Some(node) = queue.pop_front() {
            let id = format!("{:?}", node);
            if !visited.insert(id.clone()) {
                continue;
            }
            methods.insert(format!("{:?}", icfg.get_method_of(&node)));

            let succs = icfg.get_succs_of(&node);
            let mut successors: Vec<String> = succs.iter().map(|s| format!("{:?}", s)).collect();
            successors.sort();

            let mut facts: Vec<FactEntry> = solver
                .results_at(&node, false)
                .into_iter()
                .map(|(d, v)| FactEntry {
                    fact: format!("{:?}", d),
                    value: format!("{:?}", v),
                })
                .collect();
            facts.sort_by(|a, b| a.fact.cmp(&b.fact));

            statements.push(StatementEntry {
                id,
                method: format!("{:?}", icfg.get_method_of(&node)),
                successors,
                facts,
            });

            for succ in succs {
                queue.push_back(succ);
            }
            if icfg.is_call_stmt(&node) {
                for callee in icfg.get_callees_of_call_at(&node) {
                    for start_point in icfg.get_start_points_of(&callee) {
                        queue.push_back(start_point);
                    }
                }
                for return_site in icfg.get_return_sites_of_call_at(&node) {
                    queue.push_back(return_site);
                }
            }
        }

        statements.sort_by(|a, b| a.id.cmp(&b.id));
        ResultGraph {
            id: graph_id.to_string(),
            methods: methods.into_iter().collect(),
            statements,
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
