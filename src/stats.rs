//! Solver instrumentation counters.

/// Counters and timings collected across one `solve()` run.
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    /// Path-edge processing steps (phase I worklist pops).
    pub propagations: u64,

    /// Dispatches into the call-site handler.
    pub process_call_count: u64,

    /// Dispatches into the normal-flow handler.
    pub process_normal_count: u64,

    /// Dispatches into the exit handler.
    pub process_exit_count: u64,

    /// Flow function applications (`compute_targets` calls).
    pub flow_function_applications: u64,

    /// Call sites handled through a special summary instead of callee
    /// expansion.
    pub special_summary_applications: u64,

    /// Phase II value updates taken (join strictly grew the value).
    pub value_propagations: u64,

    /// Edge function evaluations during phase II.
    pub value_computations: u64,

    /// Memoized factory lookups answered from the cache.
    pub cache_hits: u64,

    /// Factory lookups that had to query the problem.
    pub cache_misses: u64,

    /// Wall-clock of supergraph construction (phase I).
    pub supergraph_time_ms: u64,

    /// Wall-clock of value computation (phase II).
    pub value_time_ms: u64,
}
