//! Path edges, the unit of work of the propagation phase.

/// `(d_source, n_target, d_target)`: there is a realizable path in the
/// exploded supergraph from the enclosing method's start under `source_fact`
/// to `target_node` under `target_fact`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathEdge<N, D> {
    pub source_fact: D,
    pub target_node: N,
    pub target_fact: D,
}

impl<N, D> PathEdge<N, D> {
    pub fn new(source_fact: D, target_node: N, target_fact: D) -> Self {
        Self {
            source_fact,
            target_node,
            target_fact,
        }
    }
}
