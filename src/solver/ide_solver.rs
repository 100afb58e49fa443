/*
 * IDE tabulation solver.
 *
 * Solves an IDE problem in the two phases of SRH'96 with the on-demand
 * procedure summaries of Naeem, Lhotak and Rodriguez:
 *
 * Phase I builds the exploded supergraph. Path edges are popped off a
 * FIFO worklist and dispatched by the kind of their target node; normal,
 * call, call-to-return and return flows compose edge functions into jump
 * functions. A path edge is (re)enqueued exactly when its jump function
 * strictly grows under the join, which is the single convergence hinge of
 * the phase. Exits record end summaries and retroactively patch every
 * caller that registered an incoming edge before the exit was discovered.
 *
 * Phase II seeds lattice values at analysis entry points (and at
 * unbalanced return sites), pushes them along jump functions through
 * calls and method entries, then joins the contribution of every jump
 * function into the value table at all remaining nodes.
 *
 * Call `solve()` once; query with `result_at`/`results_at` afterwards.
 *
 * References:
 * - Sagiv, Reps, Horwitz (1996): "Precise Interprocedural Dataflow
 *   Analysis with Applications to Constant Propagation" (lines 13-37
 *   referenced below)
 * - Naeem, Lhotak, Rodriguez (2010): "Practical Extensions to the IFDS
 *   Algorithm"
 */

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::cache::FlowEdgeFunctionCache;
use crate::edge_function::EdgeFunction;
use crate::icfg::InterproceduralCfg;
use crate::lattice::JoinLattice;
use crate::problem::{IdeTabulationProblem, SolverConfig};
use crate::stats::SolverStatistics;
use crate::table::Table;

use super::jump_functions::JumpFunctions;
use super::path_edge::PathEdge;

/// Recorded exploded-supergraph edges: `(source node, sink node)` to a map
/// from source fact to the facts it produced.
pub type RecordedEdges<N, D> = Table<N, N, FxHashMap<D, FxHashSet<D>>>;

pub struct IdeSolver<N, D, M, V, P>
where
    N: Clone + Eq + Hash + Debug + 'static,
    D: Clone + Eq + Hash + Debug + 'static,
    M: Clone + Eq + Hash + Debug + 'static,
    V: JoinLattice,
    P: IdeTabulationProblem<N, D, M, V>,
{
    problem: P,
    icfg: P::Icfg,
    cache: FlowEdgeFunctionCache<N, D, M, V>,
    config: SolverConfig,
    zero_value: D,
    all_top: EdgeFunction<V>,

    jump_fn: JumpFunctions<N, D, V>,
    // Summaries that were queried before they were fully computed; rows are
    // (callee start, entry fact), cells (exit, exit fact) -> function.
    end_summary: Table<N, D, Table<N, D, EdgeFunction<V>>>,
    // Per (callee start, entry fact): which call sites brought which caller
    // facts into that entry.
    incoming: Table<N, D, FxHashMap<N, FxHashSet<D>>>,
    // Return sites reached by unbalanced returns, for phase II seeding.
    unbalanced_return_sites: FxHashSet<N>,

    initial_seeds: FxHashMap<N, FxHashSet<D>>,
    val_tab: Table<N, D, V>,

    computed_intra_edges: RecordedEdges<N, D>,
    computed_inter_edges: RecordedEdges<N, D>,

    worklist: VecDeque<PathEdge<N, D>>,
    value_worklist: VecDeque<(N, D)>,
    stats: SolverStatistics,
}

impl<N, D, M, V, P> IdeSolver<N, D, M, V, P>
where
    N: Clone + Eq + Hash + Debug + 'static,
    D: Clone + Eq + Hash + Debug + 'static,
    M: Clone + Eq + Hash + Debug + 'static,
    V: JoinLattice,
    P: IdeTabulationProblem<N, D, M, V>,
{
    pub fn new(problem: P) -> Self {
        let config = problem.solver_config();
        let zero_value = problem.zero_value();
        let icfg = problem.interprocedural_cfg();
        let all_top = problem.all_top_function();
        let initial_seeds = problem.initial_seeds();
        let cache = FlowEdgeFunctionCache::new(zero_value.clone(), config.auto_add_zero);
        Self {
            problem,
            icfg,
            cache,
            config,
            zero_value,
            all_top,
            jump_fn: JumpFunctions::new(),
            end_summary: Table::new(),
            incoming: Table::new(),
            unbalanced_return_sites: FxHashSet::default(),
            initial_seeds,
            val_tab: Table::new(),
            computed_intra_edges: Table::new(),
            computed_inter_edges: Table::new(),
            worklist: VecDeque::new(),
            value_worklist: VecDeque::new(),
            stats: SolverStatistics::default(),
        }
    }

    /// Run both phases. Results can be queried afterwards with
    /// [`result_at`](Self::result_at) and [`results_at`](Self::results_at).
    pub fn solve(&mut self) {
        info!("IDE solver: submitting initial seeds, constructing exploded supergraph");
        let phase1 = Instant::now();
        self.submit_initial_seeds();
        while let Some(edge) = self.worklist.pop_front() {
            self.path_edge_processing_task(edge);
        }
        self.stats.supergraph_time_ms = phase1.elapsed().as_millis() as u64;

        if self.config.compute_values {
            info!("IDE solver: computing values along edge functions");
            let phase2 = Instant::now();
            self.compute_values();
            self.stats.value_time_ms = phase2.elapsed().as_millis() as u64;
        }
        self.stats.cache_hits = self.cache.hits;
        self.stats.cache_misses = self.cache.misses;
        info!(
            propagations = self.stats.propagations,
            value_propagations = self.stats.value_propagations,
            "IDE solver: problem solved"
        );
    }

    // ---- result surface ----

    /// Value computed for `fact` at `stmt`. Top values are never stored, so
    /// top shows up as `None`.
    pub fn result_at(&self, stmt: &N, fact: &D) -> Option<&V> {
        self.val_tab.get(stmt, fact)
    }

    /// The full environment at `stmt`, optionally without the zero fact.
    pub fn results_at(&self, stmt: &N, strip_zero: bool) -> FxHashMap<D, V> {
        let mut result: FxHashMap<D, V> = self
            .val_tab
            .row(stmt)
            .map(|r| r.iter().map(|(d, v)| (d.clone(), v.clone())).collect())
            .unwrap_or_default();
        if strip_zero {
            result.retain(|d, _| !self.problem.is_zero_value(d));
        }
        result
    }

    /// Intra-procedural edges recorded during phase I. Populated only when
    /// `record_edges` is configured.
    pub fn computed_intra_path_edges(&self) -> &RecordedEdges<N, D> {
        &self.computed_intra_edges
    }

    /// Inter-procedural (call, return, unbalanced-return) edges recorded
    /// during phase I. Populated only when `record_edges` is configured.
    pub fn computed_inter_path_edges(&self) -> &RecordedEdges<N, D> {
        &self.computed_inter_edges
    }

    /// Return sites reached past the analyzed seeds; non-empty only with
    /// `follow_returns_past_seeds`.
    pub fn unbalanced_return_sites(&self) -> &FxHashSet<N> {
        &self.unbalanced_return_sites
    }

    pub fn statistics(&self) -> &SolverStatistics {
        &self.stats
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn icfg(&self) -> &P::Icfg {
        &self.icfg
    }

    pub fn initial_seeds(&self) -> &FxHashMap<N, FxHashSet<D>> {
        &self.initial_seeds
    }

    // ---- phase I ----

    /// Seed the worklist: every seed fact gets a path edge from the zero
    /// fact with the identity function, and every seed start point gets the
    /// zero self-loop.
    fn submit_initial_seeds(&mut self) {
        let seeds = self.initial_seeds.clone();
        for (start_point, facts) in seeds {
            for fact in facts {
                self.propagate(
                    self.zero_value.clone(),
                    start_point.clone(),
                    fact,
                    EdgeFunction::Identity,
                    None,
                    false,
                );
            }
            self.jump_fn.add_function(
                self.zero_value.clone(),
                start_point,
                self.zero_value.clone(),
                EdgeFunction::Identity,
            );
        }
    }

    fn path_edge_processing_task(&mut self, edge: PathEdge<N, D>) {
        self.stats.propagations += 1;
        trace!(edge = ?edge, "processing path edge");
        let target = edge.target_node.clone();
        if self.icfg.is_call_stmt(&target) {
            self.process_call(edge);
        } else {
            // Exit nodes with fall-through successors take the normal path
            // as well.
            if self.icfg.is_exit_stmt(&target) {
                self.process_exit(edge.clone());
            }
            if !self.icfg.get_succs_of(&target).is_empty() {
                self.process_normal_flow(edge);
            }
        }
    }

    /// Current jump function of a path edge; absent entries are all-top.
    fn jump_function(&self, edge: &PathEdge<N, D>) -> EdgeFunction<V> {
        self.jump_fn
            .forward_lookup(&edge.source_fact, &edge.target_node)
            .and_then(|row| row.get(&edge.target_fact))
            .cloned()
            .unwrap_or_else(|| self.all_top.clone())
    }

    /// Lines 33-37: intra-procedural flow to every successor.
    fn process_normal_flow(&mut self, edge: PathEdge<N, D>) {
        self.stats.process_normal_count += 1;
        let f = self.jump_function(&edge);
        let PathEdge {
            source_fact: d1,
            target_node: n,
            target_fact: d2,
        } = edge;
        for m in self.icfg.get_succs_of(&n) {
            let flow = self.cache.normal_flow_function(&self.problem, &n, &m);
            self.stats.flow_function_applications += 1;
            let res = flow.compute_targets(&d2);
            self.save_edges(n.clone(), m.clone(), d2.clone(), &res, false);
            for d3 in res {
                let g = self
                    .cache
                    .normal_edge_function(&self.problem, &n, &d2, &m, &d3);
                self.propagate(d1.clone(), m.clone(), d3, f.compose_with(&g), None, false);
            }
        }
    }

    /// Lines 13-20: a call site in the caller's context.
    ///
    /// Per callee, either a special summary short-circuits the call or the
    /// callee is expanded: its entry gets a self-loop, the incoming edge is
    /// registered, and any end summaries already computed for that entry
    /// are applied at the return sites. Call-to-return flow runs once per
    /// call site, independent of callee resolution.
    fn process_call(&mut self, edge: PathEdge<N, D>) {
        self.stats.process_call_count += 1;
        let f = self.jump_function(&edge);
        let PathEdge {
            source_fact: d1,
            target_node: n,
            target_fact: d2,
        } = edge;
        let return_sites = self.icfg.get_return_sites_of_call_at(&n);
        let callees = self.icfg.get_callees_of_call_at(&n);
        debug!(call_site = ?n, callees = ?callees, "process call");

        for callee in callees {
            if let Some(special) = self.cache.summary_flow_function(&self.problem, &n, &callee) {
                // A special summary stands in for the whole callee; treat
                // the call like a normal flow over summary functions.
                debug!(callee = ?callee, "applying special summary");
                for return_site in &return_sites {
                    self.stats.special_summary_applications += 1;
                    self.stats.flow_function_applications += 1;
                    let res = special.compute_targets(&d2);
                    self.save_edges(n.clone(), return_site.clone(), d2.clone(), &res, false);
                    for d3 in res {
                        let summary_edge = self.cache.summary_edge_function(
                            &self.problem,
                            &n,
                            &d2,
                            return_site,
                            &d3,
                        );
                        self.propagate(
                            d1.clone(),
                            return_site.clone(),
                            d3,
                            f.compose_with(&summary_edge),
                            Some(&n),
                            false,
                        );
                    }
                }
            } else {
                let call_flow = self.cache.call_flow_function(&self.problem, &n, &callee);
                self.stats.flow_function_applications += 1;
                let res = call_flow.compute_targets(&d2);
                let start_points = self.icfg.get_start_points_of(&callee);
                // An empty start-point set means the callee is only a
                // declaration; nothing to expand.
                if start_points.is_empty() {
                    debug!(callee = ?callee, "start points not available");
                }
                for sp in start_points {
                    self.save_edges(n.clone(), sp.clone(), d2.clone(), &res, true);
                    for d3 in &res {
                        // Line 15: self-loop at the callee entry.
                        self.propagate(
                            d3.clone(),
                            sp.clone(),
                            d3.clone(),
                            EdgeFunction::Identity,
                            Some(&n),
                            false,
                        );
                        // Line 15.1 (NLR): <sp, d3> now has an incoming edge
                        // from <n, d2>.
                        self.add_incoming(sp.clone(), d3.clone(), n.clone(), d2.clone());
                        // Line 15.2 (NLR): apply every end summary already
                        // recorded for <sp, d3> at the return sites. The
                        // snapshot is mandatory: nested propagation can
                        // insert into the very row being iterated.
                        let end_summ = self.end_summary_snapshot(&sp, d3);
                        for (ep, d4, f_callee_summary) in end_summ {
                            for return_site in &return_sites {
                                let ret_flow = self.cache.return_flow_function(
                                    &self.problem,
                                    Some(&n),
                                    &callee,
                                    &ep,
                                    Some(return_site),
                                );
                                self.stats.flow_function_applications += 1;
                                // Scoped by the caller-side fact set {d2}.
                                let returned = ret_flow.compute_targets(&d4);
                                self.save_edges(
                                    ep.clone(),
                                    return_site.clone(),
                                    d4.clone(),
                                    &returned,
                                    true,
                                );
                                for d5 in returned {
                                    let f4 = self.cache.call_edge_function(
                                        &self.problem,
                                        &n,
                                        &d2,
                                        &callee,
                                        d3,
                                    );
                                    let f5 = self.cache.return_edge_function(
                                        &self.problem,
                                        &n,
                                        &callee,
                                        &ep,
                                        &d4,
                                        return_site,
                                        &d5,
                                    );
                                    let f_prime =
                                        f4.compose_with(&f_callee_summary).compose_with(&f5);
                                    let d5_restored = self
                                        .problem
                                        .restore_context_on_returned_fact(&n, &d2, d5);
                                    self.propagate(
                                        d1.clone(),
                                        return_site.clone(),
                                        d5_restored,
                                        f.compose_with(&f_prime),
                                        Some(&n),
                                        false,
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }

        // Lines 17-19: intra-procedural flow past the call.
        for return_site in &return_sites {
            let ctr_flow =
                self.cache
                    .call_to_return_flow_function(&self.problem, &n, return_site);
            self.stats.flow_function_applications += 1;
            let res = ctr_flow.compute_targets(&d2);
            self.save_edges(n.clone(), return_site.clone(), d2.clone(), &res, false);
            for d3 in res {
                let g = self.cache.call_to_return_edge_function(
                    &self.problem,
                    &n,
                    &d2,
                    return_site,
                    &d3,
                );
                self.propagate(
                    d1.clone(),
                    return_site.clone(),
                    d3,
                    f.compose_with(&g),
                    Some(&n),
                    false,
                );
            }
        }
    }

    /// Lines 21-32: a method exit.
    ///
    /// Records the end summary, then replays it at every call site that
    /// already registered an incoming edge for this entry. With
    /// `follow_returns_past_seeds`, exits whose entry fact is the zero
    /// fact and whose incoming set is empty are propagated into all
    /// callers known to the ICFG.
    fn process_exit(&mut self, edge: PathEdge<N, D>) {
        self.stats.process_exit_count += 1;
        let f = self.jump_function(&edge);
        let PathEdge {
            source_fact: d1,
            target_node: n,
            target_fact: d2,
        } = edge;
        let method = self.icfg.get_method_of(&n);
        let start_points = self.icfg.get_start_points_of(&method);

        // Line 21.1 (NLR): register the summary, then snapshot the incoming
        // edges of every start point before any nested propagation.
        let mut inc: FxHashMap<N, FxHashSet<D>> = FxHashMap::default();
        for sp in &start_points {
            self.add_end_summary(sp.clone(), d1.clone(), n.clone(), d2.clone(), f.clone());
            if let Some(row) = self.incoming.get(sp, &d1) {
                for (call_site, facts) in row {
                    inc.entry(call_site.clone())
                        .or_default()
                        .extend(facts.iter().cloned());
                }
            }
        }

        // Line 22: replay the new summary at each registered caller.
        for (call_site, caller_facts) in &inc {
            for return_site in self.icfg.get_return_sites_of_call_at(call_site) {
                let ret_flow = self.cache.return_flow_function(
                    &self.problem,
                    Some(call_site),
                    &method,
                    &n,
                    Some(&return_site),
                );
                for d4 in caller_facts {
                    self.stats.flow_function_applications += 1;
                    // Scoped by the caller-side fact set `caller_facts`.
                    let targets = ret_flow.compute_targets(&d2);
                    self.save_edges(n.clone(), return_site.clone(), d2.clone(), &targets, true);
                    // Line 23.
                    for d5 in targets {
                        let f4 = self.cache.call_edge_function(
                            &self.problem,
                            call_site,
                            d4,
                            &method,
                            &d1,
                        );
                        let f5 = self.cache.return_edge_function(
                            &self.problem,
                            call_site,
                            &method,
                            &n,
                            &d2,
                            &return_site,
                            &d5,
                        );
                        let f_prime = f4.compose_with(&f).compose_with(&f5);
                        // Every jump function into the call composes with
                        // the summary toward the return site.
                        let incoming_jumps: Vec<(D, EdgeFunction<V>)> = self
                            .jump_fn
                            .reverse_lookup(call_site, d4)
                            .map(|row| {
                                row.iter()
                                    .map(|(d3, f3)| (d3.clone(), f3.clone()))
                                    .collect()
                            })
                            .unwrap_or_default();
                        for (d3, f3) in incoming_jumps {
                            if f3 == self.all_top {
                                continue;
                            }
                            let d5_restored = self.problem.restore_context_on_returned_fact(
                                call_site,
                                d4,
                                d5.clone(),
                            );
                            self.propagate(
                                d3,
                                return_site.clone(),
                                d5_restored,
                                f3.compose_with(&f_prime),
                                Some(call_site),
                                false,
                            );
                        }
                    }
                }
            }
        }

        // Unbalanced problems: returning out of a method with a fact for
        // which there is no incoming flow. Only zero-sourced values may
        // leave this way; conditionally generated values must stay within
        // callers that registered the condition.
        if self.config.follow_returns_past_seeds
            && inc.is_empty()
            && self.problem.is_zero_value(&d1)
        {
            let callers = self.icfg.get_callers_of(&method);
            for call_site in &callers {
                for return_site in self.icfg.get_return_sites_of_call_at(call_site) {
                    let ret_flow = self.cache.return_flow_function(
                        &self.problem,
                        Some(call_site),
                        &method,
                        &n,
                        Some(&return_site),
                    );
                    self.stats.flow_function_applications += 1;
                    // Scoped by the caller-side fact set {zero}.
                    let targets = ret_flow.compute_targets(&d2);
                    self.save_edges(n.clone(), return_site.clone(), d2.clone(), &targets, true);
                    for d5 in targets {
                        let f5 = self.cache.return_edge_function(
                            &self.problem,
                            call_site,
                            &method,
                            &n,
                            &d2,
                            &return_site,
                            &d5,
                        );
                        self.propagate_unbalanced_return_flow(
                            return_site.clone(),
                            d5,
                            f.compose_with(&f5),
                            call_site,
                        );
                        self.unbalanced_return_sites.insert(return_site.clone());
                    }
                }
            }
            // With no callers at all the return statement would never be
            // visited; invoke the return flow function once anyway so side
            // effects (e.g. registering a taint) still fire.
            if callers.is_empty() {
                let ret_flow =
                    self.cache
                        .return_flow_function(&self.problem, None, &method, &n, None);
                self.stats.flow_function_applications += 1;
                ret_flow.compute_targets(&d2);
            }
        }
    }

    fn propagate_unbalanced_return_flow(
        &mut self,
        return_site: N,
        target_fact: D,
        edge_function: EdgeFunction<V>,
        related_call_site: &N,
    ) {
        self.propagate(
            self.zero_value.clone(),
            return_site,
            target_fact,
            edge_function,
            Some(related_call_site),
            true,
        );
    }

    /// The monotone update primitive: join `f` into the stored jump
    /// function and reprocess the path edge iff the join strictly grew it.
    fn propagate(
        &mut self,
        source_fact: D,
        target: N,
        target_fact: D,
        f: EdgeFunction<V>,
        related_call_site: Option<&N>,
        is_unbalanced_return: bool,
    ) {
        debug_assert!(
            !is_unbalanced_return || self.problem.is_zero_value(&source_fact),
            "unbalanced returns may only carry the zero source fact"
        );
        let jump_fn_e = self
            .jump_fn
            .reverse_lookup(&target, &target_fact)
            .and_then(|row| row.get(&source_fact))
            .cloned()
            .unwrap_or_else(|| self.all_top.clone());
        let f_prime = jump_fn_e.join_with(&f);
        if f_prime != jump_fn_e {
            trace!(
                source_fact = ?source_fact,
                target = ?target,
                target_fact = ?target_fact,
                related_call_site = ?related_call_site,
                "jump function grew, enqueueing path edge"
            );
            self.jump_fn.add_function(
                source_fact.clone(),
                target.clone(),
                target_fact.clone(),
                f_prime,
            );
            self.worklist
                .push_back(PathEdge::new(source_fact, target, target_fact));
        }
    }

    fn add_end_summary(&mut self, sp: N, d1: D, ep: N, d2: D, f: EdgeFunction<V>) {
        // No join with a previous entry here: f is a jump function and was
        // already joined inside propagate().
        self.end_summary.cell_mut(sp, d1).insert(ep, d2, f);
    }

    fn end_summary_snapshot(&self, sp: &N, d3: &D) -> Vec<(N, D, EdgeFunction<V>)> {
        self.end_summary
            .get(sp, d3)
            .map(|summaries| {
                summaries
                    .cells()
                    .map(|(ep, d4, f)| (ep.clone(), d4.clone(), f.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn add_incoming(&mut self, sp: N, d3: D, call_site: N, d2: D) {
        self.incoming
            .cell_mut(sp, d3)
            .entry(call_site)
            .or_default()
            .insert(d2);
    }

    fn save_edges(&mut self, source: N, sink: N, source_fact: D, dest_facts: &[D], inter: bool) {
        if !self.config.record_edges {
            return;
        }
        let table = if inter {
            &mut self.computed_inter_edges
        } else {
            &mut self.computed_intra_edges
        };
        table
            .cell_mut(source, sink)
            .entry(source_fact)
            .or_default()
            .extend(dest_facts.iter().cloned());
    }

    // ---- phase II ----

    fn compute_values(&mut self) {
        debug!("phase II(i): seeding values");
        let mut all_seeds = self.initial_seeds.clone();
        for return_site in &self.unbalanced_return_sites {
            if !all_seeds.contains_key(return_site) {
                let mut facts = FxHashSet::default();
                facts.insert(self.zero_value.clone());
                all_seeds.insert(return_site.clone(), facts);
            }
        }
        for (start_point, facts) in all_seeds {
            for fact in facts {
                self.set_val(&start_point, &fact, V::bottom());
                self.value_worklist.push_back((start_point.clone(), fact));
            }
        }
        while let Some((n, d)) = self.value_worklist.pop_front() {
            self.value_propagation_task(n, d);
        }

        debug!("phase II(ii): joining jump functions at non-call-start nodes");
        let nodes = self.icfg.all_non_call_start_nodes();
        self.value_computation_task(&nodes);
    }

    fn value_propagation_task(&mut self, n: N, d: D) {
        // Initial seeds are not necessarily method start points, but they
        // are treated as such here; likewise unbalanced return sites.
        if self.icfg.is_start_point(&n)
            || self.initial_seeds.contains_key(&n)
            || self.unbalanced_return_sites.contains(&n)
        {
            self.propagate_value_at_start(&n, &d);
        }
        if self.icfg.is_call_stmt(&n) {
            self.propagate_value_at_call(&n, &d);
        }
    }

    fn propagate_value_at_start(&mut self, n: &N, d: &D) {
        let method = self.icfg.get_method_of(n);
        for call_site in self.icfg.get_calls_from_within(&method) {
            let entries: Vec<(D, EdgeFunction<V>)> = self
                .jump_fn
                .forward_lookup(d, &call_site)
                .map(|row| row.iter().map(|(dp, fp)| (dp.clone(), fp.clone())).collect())
                .unwrap_or_default();
            for (d_prime, f_prime) in entries {
                let value = self.val(n, d);
                self.stats.value_computations += 1;
                self.propagate_value(call_site.clone(), d_prime, f_prime.compute_target(&value));
            }
        }
    }

    fn propagate_value_at_call(&mut self, n: &N, d: &D) {
        for callee in self.icfg.get_callees_of_call_at(n) {
            let call_flow = self.cache.call_flow_function(&self.problem, n, &callee);
            self.stats.flow_function_applications += 1;
            for d_prime in call_flow.compute_targets(d) {
                let edge_fn =
                    self.cache
                        .call_edge_function(&self.problem, n, d, &callee, &d_prime);
                for start_point in self.icfg.get_start_points_of(&callee) {
                    let value = self.val(n, d);
                    self.stats.value_computations += 1;
                    self.propagate_value(start_point, d_prime.clone(), edge_fn.compute_target(&value));
                }
            }
        }
    }

    fn propagate_value(&mut self, n: N, d: D, v: V) {
        let current = self.val(&n, &d);
        let joined = current.join(&v);
        if joined != current {
            self.stats.value_propagations += 1;
            self.set_val(&n, &d, joined);
            self.value_worklist.push_back((n, d));
        }
    }

    fn value_computation_task(&mut self, nodes: &[N]) {
        for n in nodes {
            let method = self.icfg.get_method_of(n);
            for sp in self.icfg.get_start_points_of(&method) {
                let cells: Vec<(D, D, EdgeFunction<V>)> = self
                    .jump_fn
                    .lookup_by_target(n)
                    .map(|table| {
                        table
                            .cells()
                            .map(|(d_prime, d, f_prime)| {
                                (d_prime.clone(), d.clone(), f_prime.clone())
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                for (d_prime, d, f_prime) in cells {
                    let entry_value = self.val(&sp, &d_prime);
                    self.stats.value_computations += 1;
                    let joined = self
                        .val(n, &d)
                        .join(&f_prime.compute_target(&entry_value));
                    self.set_val(n, &d, joined);
                }
            }
        }
    }

    /// Value at `(n, d)`; implicitly top when absent (line [1] of Fig. 7
    /// in SRH'96).
    fn val(&self, n: &N, d: &D) -> V {
        self.val_tab
            .get(n, d)
            .cloned()
            .unwrap_or_else(V::top)
    }

    fn set_val(&mut self, n: &N, d: &D, value: V) {
        // Top is the implicit default and is never stored.
        if value.is_top() {
            self.val_tab.remove(n, d);
        } else {
            trace!(node = ?n, fact = ?d, value = ?value, "value update");
            self.val_tab.insert(n.clone(), d.clone(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge_function::{ConstantEdge, EdgeTransform};
    use crate::flow_function::{IdentityFlowFunction, LambdaFlow, SharedFlowFunction};
    use crate::icfg::SimpleIcfg;
    use std::any::Any;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Fact {
        Zero,
        Var(&'static str),
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Val {
        Top,
        Const(i64),
        NonConst,
    }

    impl JoinLattice for Val {
        fn top() -> Self {
            Val::Top
        }

        fn bottom() -> Self {
            Val::NonConst
        }

        fn join(&self, other: &Self) -> Self {
            match (self, other) {
                (Val::Top, v) | (v, Val::Top) => v.clone(),
                (Val::NonConst, _) | (_, Val::NonConst) => Val::NonConst,
                (Val::Const(a), Val::Const(b)) => {
                    if a == b {
                        Val::Const(*a)
                    } else {
                        Val::NonConst
                    }
                }
            }
        }
    }

    fn identity_flow() -> SharedFlowFunction<Fact> {
        Arc::new(IdentityFlowFunction)
    }

    fn constant(c: i64) -> EdgeFunction<Val> {
        EdgeFunction::client(ConstantEdge::new(Val::Const(c)))
    }

    fn seed_at(node: &str) -> FxHashMap<String, FxHashSet<Fact>> {
        let mut seeds = FxHashMap::default();
        let mut facts = FxHashSet::default();
        facts.insert(Fact::Zero);
        seeds.insert(node.to_string(), facts);
        seeds
    }

    /// Caller invoking `id` from two call sites with different constants.
    ///
    ///   main: m0 -> c1 [call id] -> r1 -> c2 [call id] -> r2 -> m_exit
    ///   id:   id0 -> id_exit
    struct IdCalleeProblem {
        icfg: Arc<SimpleIcfg>,
    }

    impl IdCalleeProblem {
        fn new() -> Self {
            let mut g = SimpleIcfg::new();
            g.add_method("main", &["m0"]);
            for n in ["c1", "r1", "c2", "r2", "m_exit"] {
                g.add_node("main", n);
            }
            g.add_edge("m0", "c1");
            g.add_edge("r1", "c2");
            g.add_edge("r2", "m_exit");
            g.add_exit("m_exit");

            g.add_method("id", &["id0"]);
            g.add_node("id", "id_exit");
            g.add_edge("id0", "id_exit");
            g.add_exit("id_exit");

            g.add_call("c1", &["id"], &["r1"]);
            g.add_call("c2", &["id"], &["r2"]);
            Self { icfg: Arc::new(g) }
        }
    }

    impl IdeTabulationProblem<String, Fact, String, Val> for IdCalleeProblem {
        type Icfg = Arc<SimpleIcfg>;

        fn zero_value(&self) -> Fact {
            Fact::Zero
        }

        fn interprocedural_cfg(&self) -> Arc<SimpleIcfg> {
            self.icfg.clone()
        }

        fn initial_seeds(&self) -> FxHashMap<String, FxHashSet<Fact>> {
            seed_at("m0")
        }

        fn normal_flow_function(&self, _: &String, _: &String) -> SharedFlowFunction<Fact> {
            identity_flow()
        }

        fn call_flow_function(&self, _: &String, _: &String) -> SharedFlowFunction<Fact> {
            // The argument fact enters the callee; locals stay behind.
            Arc::new(LambdaFlow(|d: &Fact| match d {
                Fact::Zero => vec![Fact::Var("a")],
                _ => vec![],
            }))
        }

        fn return_flow_function(
            &self,
            call_site: Option<&String>,
            _: &String,
            _: &String,
            _: Option<&String>,
        ) -> SharedFlowFunction<Fact> {
            let result = match call_site.map(String::as_str) {
                Some("c1") => "x",
                Some("c2") => "y",
                _ => return Arc::new(LambdaFlow(|_: &Fact| vec![])),
            };
            Arc::new(LambdaFlow(move |d: &Fact| match d {
                Fact::Var("a") => vec![Fact::Var(result)],
                _ => vec![],
            }))
        }

        fn call_to_return_flow_function(
            &self,
            _: &String,
            _: &String,
        ) -> SharedFlowFunction<Fact> {
            identity_flow()
        }

        fn normal_edge_function(
            &self,
            _: &String,
            _: &Fact,
            _: &String,
            _: &Fact,
        ) -> EdgeFunction<Val> {
            EdgeFunction::Identity
        }

        fn call_edge_function(
            &self,
            call_site: &String,
            src_fact: &Fact,
            _: &String,
            dest_fact: &Fact,
        ) -> EdgeFunction<Val> {
            match (src_fact, dest_fact, call_site.as_str()) {
                (Fact::Zero, Fact::Var("a"), "c1") => constant(1),
                (Fact::Zero, Fact::Var("a"), "c2") => constant(2),
                _ => EdgeFunction::Identity,
            }
        }

        fn return_edge_function(
            &self,
            _: &String,
            _: &String,
            _: &String,
            _: &Fact,
            _: &String,
            _: &Fact,
        ) -> EdgeFunction<Val> {
            EdgeFunction::Identity
        }

        fn call_to_return_edge_function(
            &self,
            _: &String,
            _: &Fact,
            _: &String,
            _: &Fact,
        ) -> EdgeFunction<Val> {
            EdgeFunction::Identity
        }
    }

    #[test]
    fn test_zero_self_loop_registered_for_seeds() {
        let mut solver = IdeSolver::new(IdCalleeProblem::new());
        solver.solve();
        let row = solver
            .jump_fn
            .forward_lookup(&Fact::Zero, &"m0".to_string())
            .expect("seed start must have a zero row");
        assert_eq!(row.get(&Fact::Zero), Some(&EdgeFunction::Identity));
    }

    #[test]
    fn test_end_summary_reused_across_call_sites() {
        let mut solver = IdeSolver::new(IdCalleeProblem::new());
        solver.solve();

        // Both call sites funnel into a single summary of the callee.
        let summaries = solver
            .end_summary
            .get(&"id0".to_string(), &Fact::Var("a"))
            .expect("summary for the entry fact must exist");
        let entries: Vec<_> = summaries
            .cells()
            .filter(|(ep, _, _)| ep.as_str() == "id_exit")
            .collect();
        assert_eq!(entries.len(), 1);

        // Per-call-site values stay distinct despite the shared summary.
        assert_eq!(
            solver.result_at(&"r1".to_string(), &Fact::Var("x")),
            Some(&Val::Const(1))
        );
        assert_eq!(
            solver.result_at(&"r2".to_string(), &Fact::Var("y")),
            Some(&Val::Const(2))
        );
    }

    #[test]
    fn test_jump_functions_grow_monotonically() {
        let mut solver = IdeSolver::new(IdCalleeProblem::new());
        solver.solve();

        // Re-propagating an already-joined function must not enqueue again.
        let f = solver.jump_function(&PathEdge::new(
            Fact::Zero,
            "r1".to_string(),
            Fact::Var("x"),
        ));
        assert!(!f.is_all_top());
        solver.propagate(
            Fact::Zero,
            "r1".to_string(),
            Fact::Var("x"),
            f,
            None,
            false,
        );
        assert!(solver.worklist.is_empty());
    }

    #[test]
    fn test_top_values_are_never_stored() {
        let mut solver = IdeSolver::new(IdCalleeProblem::new());
        solver.solve();
        for (_, _, v) in solver.val_tab.cells() {
            assert!(!v.is_top());
        }
        // And explicitly storing top removes the cell.
        let n = "m0".to_string();
        solver.set_val(&n, &Fact::Zero, Val::Top);
        assert_eq!(solver.result_at(&n, &Fact::Zero), None);
    }

    #[test]
    fn test_seed_round_trip() {
        let mut solver = IdeSolver::new(IdCalleeProblem::new());
        solver.solve();
        assert_eq!(
            solver.result_at(&"m0".to_string(), &Fact::Zero),
            Some(&Val::bottom())
        );
    }

    #[test]
    fn test_results_at_strips_zero() {
        let mut solver = IdeSolver::new(IdCalleeProblem::new());
        solver.solve();
        let with_zero = solver.results_at(&"r1".to_string(), false);
        assert!(with_zero.contains_key(&Fact::Zero));
        let without = solver.results_at(&"r1".to_string(), true);
        assert!(!without.contains_key(&Fact::Zero));
        assert!(without.contains_key(&Fact::Var("x")));
    }

    /// Exit node with a fall-through successor: both the exit handler and
    /// the normal-flow handler must run.
    struct ExitFallthroughProblem {
        icfg: Arc<SimpleIcfg>,
    }

    impl ExitFallthroughProblem {
        fn new() -> Self {
            let mut g = SimpleIcfg::new();
            g.add_method("main", &["s0"]);
            g.add_node("main", "s1");
            g.add_node("main", "s2");
            g.add_edge("s0", "s1");
            g.add_edge("s1", "s2");
            // s1 is an exit with a successor.
            g.add_exit("s1");
            g.add_exit("s2");
            Self { icfg: Arc::new(g) }
        }
    }

    impl IdeTabulationProblem<String, Fact, String, Val> for ExitFallthroughProblem {
        type Icfg = Arc<SimpleIcfg>;

        fn zero_value(&self) -> Fact {
            Fact::Zero
        }

        fn interprocedural_cfg(&self) -> Arc<SimpleIcfg> {
            self.icfg.clone()
        }

        fn initial_seeds(&self) -> FxHashMap<String, FxHashSet<Fact>> {
            seed_at("s0")
        }

        fn normal_flow_function(&self, curr: &String, _: &String) -> SharedFlowFunction<Fact> {
            if curr == "s0" {
                Arc::new(LambdaFlow(|d: &Fact| match d {
                    Fact::Zero => vec![Fact::Var("x")],
                    other => vec![other.clone()],
                }))
            } else {
                identity_flow()
            }
        }

        fn call_flow_function(&self, _: &String, _: &String) -> SharedFlowFunction<Fact> {
            identity_flow()
        }

        fn return_flow_function(
            &self,
            _: Option<&String>,
            _: &String,
            _: &String,
            _: Option<&String>,
        ) -> SharedFlowFunction<Fact> {
            identity_flow()
        }

        fn call_to_return_flow_function(
            &self,
            _: &String,
            _: &String,
        ) -> SharedFlowFunction<Fact> {
            identity_flow()
        }

        fn normal_edge_function(
            &self,
            curr: &String,
            curr_fact: &Fact,
            _: &String,
            succ_fact: &Fact,
        ) -> EdgeFunction<Val> {
            if curr == "s0" && *curr_fact == Fact::Zero && *succ_fact == Fact::Var("x") {
                constant(5)
            } else {
                EdgeFunction::Identity
            }
        }

        fn call_edge_function(
            &self,
            _: &String,
            _: &Fact,
            _: &String,
            _: &Fact,
        ) -> EdgeFunction<Val> {
            EdgeFunction::Identity
        }

        fn return_edge_function(
            &self,
            _: &String,
            _: &String,
            _: &String,
            _: &Fact,
            _: &String,
            _: &Fact,
        ) -> EdgeFunction<Val> {
            EdgeFunction::Identity
        }

        fn call_to_return_edge_function(
            &self,
            _: &String,
            _: &Fact,
            _: &String,
            _: &Fact,
        ) -> EdgeFunction<Val> {
            EdgeFunction::Identity
        }
    }

    #[test]
    fn test_exit_with_successor_also_flows_normally() {
        let mut solver = IdeSolver::new(ExitFallthroughProblem::new());
        solver.solve();
        // The fact must flow past the exit node s1 into s2.
        assert_eq!(
            solver.result_at(&"s2".to_string(), &Fact::Var("x")),
            Some(&Val::Const(5))
        );
        assert!(solver.stats.process_exit_count > 0);
        assert!(solver.stats.process_normal_count > 0);
    }

    /// Unbalanced exits: `lib` is seeded but called from nowhere analyzed;
    /// `orphan` has no callers at all.
    struct UnbalancedProblem {
        icfg: Arc<SimpleIcfg>,
        follow: bool,
    }

    impl UnbalancedProblem {
        fn new(follow: bool) -> Self {
            let mut g = SimpleIcfg::new();
            g.add_method("outer", &["o0"]);
            g.add_node("outer", "o_call");
            g.add_node("outer", "o_ret");
            g.add_edge("o0", "o_call");
            g.add_exit("o_ret");

            g.add_method("lib", &["l0"]);
            g.add_node("lib", "l_exit");
            g.add_edge("l0", "l_exit");
            g.add_exit("l_exit");

            g.add_call("o_call", &["lib"], &["o_ret"]);
            Self { icfg: Arc::new(g), follow }
        }
    }

    impl IdeTabulationProblem<String, Fact, String, Val> for UnbalancedProblem {
        type Icfg = Arc<SimpleIcfg>;

        fn zero_value(&self) -> Fact {
            Fact::Zero
        }

        fn interprocedural_cfg(&self) -> Arc<SimpleIcfg> {
            self.icfg.clone()
        }

        fn initial_seeds(&self) -> FxHashMap<String, FxHashSet<Fact>> {
            let mut seeds = seed_at("l0");
            // A non-zero seed fact to check the gating on unbalanced exits.
            seeds
                .get_mut(&"l0".to_string())
                .unwrap()
                .insert(Fact::Var("seeded"));
            seeds
        }

        fn solver_config(&self) -> SolverConfig {
            SolverConfig {
                follow_returns_past_seeds: self.follow,
                ..SolverConfig::default()
            }
        }

        fn normal_flow_function(&self, curr: &String, _: &String) -> SharedFlowFunction<Fact> {
            if curr == "l0" {
                Arc::new(LambdaFlow(|d: &Fact| match d {
                    Fact::Zero => vec![Fact::Var("d")],
                    other => vec![other.clone()],
                }))
            } else {
                identity_flow()
            }
        }

        fn call_flow_function(&self, _: &String, _: &String) -> SharedFlowFunction<Fact> {
            identity_flow()
        }

        fn return_flow_function(
            &self,
            _: Option<&String>,
            _: &String,
            _: &String,
            _: Option<&String>,
        ) -> SharedFlowFunction<Fact> {
            identity_flow()
        }

        fn call_to_return_flow_function(
            &self,
            _: &String,
            _: &String,
        ) -> SharedFlowFunction<Fact> {
            identity_flow()
        }

        fn normal_edge_function(
            &self,
            _: &String,
            _: &Fact,
            _: &String,
            _: &Fact,
        ) -> EdgeFunction<Val> {
            EdgeFunction::Identity
        }

        fn call_edge_function(
            &self,
            _: &String,
            _: &Fact,
            _: &String,
            _: &Fact,
        ) -> EdgeFunction<Val> {
            EdgeFunction::Identity
        }

        fn return_edge_function(
            &self,
            _: &String,
            _: &String,
            _: &String,
            _: &Fact,
            _: &String,
            _: &Fact,
        ) -> EdgeFunction<Val> {
            EdgeFunction::Identity
        }

        fn call_to_return_edge_function(
            &self,
            _: &String,
            _: &Fact,
            _: &String,
            _: &Fact,
        ) -> EdgeFunction<Val> {
            EdgeFunction::Identity
        }
    }

    #[test]
    fn test_unbalanced_returns_carry_only_zero_sourced_facts() {
        let mut solver = IdeSolver::new(UnbalancedProblem::new(true));
        solver.solve();

        assert!(solver
            .unbalanced_return_sites()
            .contains(&"o_ret".to_string()));
        // Every jump function at the unbalanced return site originates
        // from the zero fact: unbalanced propagation rewrites the source
        // to zero no matter which fact leaves the callee.
        for fact in [Fact::Var("d"), Fact::Var("seeded"), Fact::Zero] {
            if let Some(row) = solver.jump_fn.reverse_lookup(&"o_ret".to_string(), &fact) {
                for source in row.keys() {
                    assert_eq!(*source, Fact::Zero);
                }
            }
        }
        // Facts reachable from the seeds did escape into the caller.
        assert!(solver
            .jump_fn
            .reverse_lookup(&"o_ret".to_string(), &Fact::Var("d"))
            .is_some());
    }

    #[test]
    fn test_unbalanced_returns_disabled_by_default() {
        let mut solver = IdeSolver::new(UnbalancedProblem::new(false));
        solver.solve();
        assert!(solver.unbalanced_return_sites().is_empty());
        assert!(solver
            .jump_fn
            .reverse_lookup(&"o_ret".to_string(), &Fact::Var("d"))
            .is_none());
    }

    #[test]
    fn test_phase_one_independent_of_value_phase() {
        // Same problem, values on and off: phase I artifacts must agree.
        struct NoValues(UnbalancedProblem);
        impl IdeTabulationProblem<String, Fact, String, Val> for NoValues {
            type Icfg = Arc<SimpleIcfg>;
            fn zero_value(&self) -> Fact {
                self.0.zero_value()
            }
            fn interprocedural_cfg(&self) -> Arc<SimpleIcfg> {
                self.0.interprocedural_cfg()
            }
            fn initial_seeds(&self) -> FxHashMap<String, FxHashSet<Fact>> {
                self.0.initial_seeds()
            }
            fn solver_config(&self) -> SolverConfig {
                SolverConfig {
                    compute_values: false,
                    record_edges: true,
                    follow_returns_past_seeds: true,
                    ..SolverConfig::default()
                }
            }
            fn normal_flow_function(&self, c: &String, s: &String) -> SharedFlowFunction<Fact> {
                self.0.normal_flow_function(c, s)
            }
            fn call_flow_function(&self, c: &String, m: &String) -> SharedFlowFunction<Fact> {
                self.0.call_flow_function(c, m)
            }
            fn return_flow_function(
                &self,
                c: Option<&String>,
                m: &String,
                e: &String,
                r: Option<&String>,
            ) -> SharedFlowFunction<Fact> {
                self.0.return_flow_function(c, m, e, r)
            }
            fn call_to_return_flow_function(
                &self,
                c: &String,
                r: &String,
            ) -> SharedFlowFunction<Fact> {
                self.0.call_to_return_flow_function(c, r)
            }
            fn normal_edge_function(
                &self,
                c: &String,
                cf: &Fact,
                s: &String,
                sf: &Fact,
            ) -> EdgeFunction<Val> {
                self.0.normal_edge_function(c, cf, s, sf)
            }
            fn call_edge_function(
                &self,
                c: &String,
                cf: &Fact,
                m: &String,
                df: &Fact,
            ) -> EdgeFunction<Val> {
                self.0.call_edge_function(c, cf, m, df)
            }
            fn return_edge_function(
                &self,
                c: &String,
                m: &String,
                e: &String,
                ef: &Fact,
                r: &String,
                rf: &Fact,
            ) -> EdgeFunction<Val> {
                self.0.return_edge_function(c, m, e, ef, r, rf)
            }
            fn call_to_return_edge_function(
                &self,
                c: &String,
                cf: &Fact,
                r: &String,
                rf: &Fact,
            ) -> EdgeFunction<Val> {
                self.0.call_to_return_edge_function(c, cf, r, rf)
            }
        }

        struct WithValues(UnbalancedProblem);
        impl IdeTabulationProblem<String, Fact, String, Val> for WithValues {
            type Icfg = Arc<SimpleIcfg>;
            fn zero_value(&self) -> Fact {
                self.0.zero_value()
            }
            fn interprocedural_cfg(&self) -> Arc<SimpleIcfg> {
                self.0.interprocedural_cfg()
            }
            fn initial_seeds(&self) -> FxHashMap<String, FxHashSet<Fact>> {
                self.0.initial_seeds()
            }
            fn solver_config(&self) -> SolverConfig {
                SolverConfig {
                    compute_values: true,
                    record_edges: true,
                    follow_returns_past_seeds: true,
                    ..SolverConfig::default()
                }
            }
            fn normal_flow_function(&self, c: &String, s: &String) -> SharedFlowFunction<Fact> {
                self.0.normal_flow_function(c, s)
            }
            fn call_flow_function(&self, c: &String, m: &String) -> SharedFlowFunction<Fact> {
                self.0.call_flow_function(c, m)
            }
            fn return_flow_function(
                &self,
                c: Option<&String>,
                m: &String,
                e: &String,
                r: Option<&String>,
            ) -> SharedFlowFunction<Fact> {
                self.0.return_flow_function(c, m, e, r)
            }
            fn call_to_return_flow_function(
                &self,
                c: &String,
                r: &String,
            ) -> SharedFlowFunction<Fact> {
                self.0.call_to_return_flow_function(c, r)
            }
            fn normal_edge_function(
                &self,
                c: &String,
                cf: &Fact,
                s: &String,
                sf: &Fact,
            ) -> EdgeFunction<Val> {
                self.0.normal_edge_function(c, cf, s, sf)
            }
            fn call_edge_function(
                &self,
                c: &String,
                cf: &Fact,
                m: &String,
                df: &Fact,
            ) -> EdgeFunction<Val> {
                self.0.call_edge_function(c, cf, m, df)
            }
            fn return_edge_function(
                &self,
                c: &String,
                m: &String,
                e: &String,
                ef: &Fact,
                r: &String,
                rf: &Fact,
            ) -> EdgeFunction<Val> {
                self.0.return_edge_function(c, m, e, ef, r, rf)
            }
            fn call_to_return_edge_function(
                &self,
                c: &String,
                cf: &Fact,
                r: &String,
                rf: &Fact,
            ) -> EdgeFunction<Val> {
                self.0.call_to_return_edge_function(c, cf, r, rf)
            }
        }

        let mut without = IdeSolver::new(NoValues(UnbalancedProblem::new(true)));
        without.solve();
        let mut with = IdeSolver::new(WithValues(UnbalancedProblem::new(true)));
        with.solve();

        let intra_without: Vec<_> = {
            let mut v: Vec<String> = without
                .computed_intra_path_edges()
                .cells()
                .map(|(a, b, _)| format!("{a}->{b}"))
                .collect();
            v.sort();
            v
        };
        let intra_with: Vec<_> = {
            let mut v: Vec<String> = with
                .computed_intra_path_edges()
                .cells()
                .map(|(a, b, _)| format!("{a}->{b}"))
                .collect();
            v.sort();
            v
        };
        assert_eq!(intra_without, intra_with);
        assert_eq!(
            without.unbalanced_return_sites(),
            with.unbalanced_return_sites()
        );
        // Phase I ran identically; only phase II differs.
        assert_eq!(without.stats.value_propagations, 0);
        assert!(without.results_at(&"l0".to_string(), false).is_empty());
    }

    #[test]
    fn test_related_call_site_and_transform_hooks_compose() {
        // Compose a constant through an opaque transform to make sure the
        // Composed fallback is exercised end to end.
        #[derive(Debug)]
        struct AddOne;
        impl EdgeTransform<Val> for AddOne {
            fn compute_target(&self, source: &Val) -> Val {
                match source {
                    Val::Const(c) => Val::Const(c + 1),
                    other => other.clone(),
                }
            }
            fn equal_to(&self, other: &dyn EdgeTransform<Val>) -> bool {
                other.as_any().downcast_ref::<AddOne>().is_some()
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let f = EdgeFunction::client(AddOne);
        let composed = f.compose_with(&EdgeFunction::client(AddOne));
        assert_eq!(composed.compute_target(&Val::Const(1)), Val::Const(3));
    }
}
