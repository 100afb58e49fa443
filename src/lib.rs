//! IDE/IFDS tabulation solver.
//!
//! Implements the two-phase interprocedural dataflow algorithm of Sagiv,
//! Horwitz and Reps with the on-demand procedure summaries of Naeem,
//! Lhotak and Rodriguez. A client analysis describes itself as an
//! [`IdeTabulationProblem`] (flow functions over facts, edge functions
//! over a join semilattice of values) against an [`InterproceduralCfg`];
//! the solver computes, for every program point, the environment mapping
//! facts to lattice values.
//!
//! ```text
//! let mut solver = IdeSolver::new(problem);
//! solver.solve();
//! let value = solver.result_at(&stmt, &fact);
//! ```
//!
//! IFDS problems (pure reachability) implement
//! [`IfdsTabulationProblem`] instead and run through [`IfdsSolver`],
//! which lifts them onto the two-point [`BinaryDomain`] lattice.
//!
//! References:
//! - Sagiv, Reps, Horwitz (1996): "Precise Interprocedural Dataflow
//!   Analysis with Applications to Constant Propagation"
//! - Reps, Horwitz, Sagiv (1995): "Precise Interprocedural Dataflow
//!   Analysis via Graph Reachability"
//! - Naeem, Lhotak, Rodriguez (2010): "Practical Extensions to the IFDS
//!   Algorithm"

pub mod cache;
pub mod edge_function;
pub mod export;
pub mod flow_function;
pub mod icfg;
pub mod lattice;
pub mod problem;
pub mod solver;
pub mod stats;
pub mod table;

pub use cache::FlowEdgeFunctionCache;
pub use edge_function::{ConstantEdge, EdgeFunction, EdgeTransform};
pub use export::{ExportError, FactEntry, ResultGraph, StatementEntry};
pub use flow_function::{
    FlowFunction, GenFlowFunction, IdentityFlowFunction, KillAllFlowFunction, LambdaFlow,
    SharedFlowFunction, TransferFlowFunction, ZeroedFlowFunction,
};
pub use icfg::{InterproceduralCfg, SimpleIcfg};
pub use lattice::{BinaryDomain, JoinLattice};
pub use problem::{IdeTabulationProblem, SolverConfig};
pub use solver::{
    IdeSolver, IfdsSolver, IfdsTabulationProblem, IfdsToIdeTabulationProblem, JumpFunctions,
    PathEdge, RecordedEdges,
};
pub use stats::SolverStatistics;
pub use table::Table;
