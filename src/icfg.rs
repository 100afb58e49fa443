/*
 * Interprocedural control-flow graph interface.
 *
 * The solver only ever asks capability questions of the graph: successors,
 * start and exit points, call wiring, containment. `SimpleIcfg` is a
 * string-keyed builder-style implementation used by tests and benchmarks;
 * production clients adapt their own IR behind the same trait.
 */

use rustc_hash::{FxHashMap, FxHashSet};

/// Capability set the solver requires from an ICFG.
///
/// Methods return owned vectors: the solver interleaves graph queries with
/// table mutation, and snapshots of the neighbor lists keep those loops
/// free of aliasing.
pub trait InterproceduralCfg<N, M> {
    fn get_succs_of(&self, node: &N) -> Vec<N>;

    fn get_start_points_of(&self, method: &M) -> Vec<N>;

    fn get_method_of(&self, node: &N) -> M;

    fn get_callees_of_call_at(&self, node: &N) -> Vec<M>;

    fn get_return_sites_of_call_at(&self, node: &N) -> Vec<N>;

    fn get_calls_from_within(&self, method: &M) -> Vec<N>;

    fn get_callers_of(&self, method: &M) -> Vec<N>;

    fn is_call_stmt(&self, node: &N) -> bool;

    fn is_exit_stmt(&self, node: &N) -> bool;

    fn is_start_point(&self, node: &N) -> bool;

    /// Every node that is neither a call site nor a method start point.
    fn all_non_call_start_nodes(&self) -> Vec<N>;
}

macro_rules! delegate_icfg_handle {
    ($handle:ty) => {
        impl<N, M, G> InterproceduralCfg<N, M> for $handle
        where
            G: InterproceduralCfg<N, M>,
        {
            fn get_succs_of(&self, node: &N) -> Vec<N> {
                (**self).get_succs_of(node)
            }

            fn get_start_points_of(&self, method: &M) -> Vec<N> {
                (**self).get_start_points_of(method)
            }

            fn get_method_of(&self, node: &N) -> M {
                (**self).get_method_of(node)
            }

            fn get_callees_of_call_at(&self, node: &N) -> Vec<M> {
                (**self).get_callees_of_call_at(node)
            }

            fn get_return_sites_of_call_at(&self, node: &N) -> Vec<N> {
                (**self).get_return_sites_of_call_at(node)
            }

            fn get_calls_from_within(&self, method: &M) -> Vec<N> {
                (**self).get_calls_from_within(method)
            }

            fn get_callers_of(&self, method: &M) -> Vec<N> {
                (**self).get_callers_of(method)
            }

            fn is_call_stmt(&self, node: &N) -> bool {
                (**self).is_call_stmt(node)
            }

            fn is_exit_stmt(&self, node: &N) -> bool {
                (**self).is_exit_stmt(node)
            }

            fn is_start_point(&self, node: &N) -> bool {
                (**self).is_start_point(node)
            }

            fn all_non_call_start_nodes(&self) -> Vec<N> {
                (**self).all_non_call_start_nodes()
            }
        }
    };
}

delegate_icfg_handle!(std::rc::Rc<G>);
delegate_icfg_handle!(std::sync::Arc<G>);

delegate_icfg_handle!(&G);

/// String-keyed ICFG built edge by edge.
///
/// Nodes must be registered (through `add_method` or `add_node`) before
/// they are wired into edges or calls, so every node has a known enclosing
/// method.
#[derive(Debug, Clone, Default)]
pub struct SimpleIcfg {
    nodes: Vec<String>,
    node_set: FxHashSet<String>,
    method_of: FxHashMap<String, String>,
    succs: FxHashMap<String, Vec<String>>,
    start_points: FxHashMap<String, Vec<String>>,
    start_set: FxHashSet<String>,
    exits: FxHashSet<String>,
    callees: FxHashMap<String, Vec<String>>,
    return_sites: FxHashMap<String, Vec<String>>,
    callers: FxHashMap<String, Vec<String>>,
    calls_within: FxHashMap<String, Vec<String>>,
}

impl SimpleIcfg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method with its start points.
    pub fn add_method(&mut self, method: &str, start_points: &[&str]) {
        for sp in start_points {
            self.register_node(method, sp);
            self.start_set.insert((*sp).to_string());
            self.start_points
                .entry(method.to_string())
                .or_default()
                .push((*sp).to_string());
        }
        self.start_points.entry(method.to_string()).or_default();
    }

    /// Register a node inside a method.
    pub fn add_node(&mut self, method: &str, node: &str) {
        self.register_node(method, node);
    }

    /// Intra-procedural edge.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.succs
            .entry(from.to_string())
            .or_default()
            .push(to.to_string());
    }

    /// Mark a node as a method exit.
    pub fn add_exit(&mut self, node: &str) {
        self.exits.insert(node.to_string());
    }

    /// Wire a call site to its callees and return sites. The call site must
    /// already be registered in its enclosing method.
    pub fn add_call(&mut self, call_site: &str, callees: &[&str], return_sites: &[&str]) {
        let caller_method = self
            .method_of
            .get(call_site)
            .cloned()
            .expect("call site must be registered before add_call");
        for callee in callees {
            self.callees
                .entry(call_site.to_string())
                .or_default()
                .push((*callee).to_string());
            self.callers
                .entry((*callee).to_string())
                .or_default()
                .push(call_site.to_string());
        }
        self.callees.entry(call_site.to_string()).or_default();
        for rs in return_sites {
            self.return_sites
                .entry(call_site.to_string())
                .or_default()
                .push((*rs).to_string());
        }
        self.return_sites.entry(call_site.to_string()).or_default();
        self.calls_within
            .entry(caller_method)
            .or_default()
            .push(call_site.to_string());
    }

    fn register_node(&mut self, method: &str, node: &str) {
        if self.node_set.insert(node.to_string()) {
            self.nodes.push(node.to_string());
        }
        self.method_of
            .insert(node.to_string(), method.to_string());
    }
}

impl InterproceduralCfg<String, String> for SimpleIcfg {
    fn get_succs_of(&self, node: &String) -> Vec<String> {
        self.succs.get(node).cloned().unwrap_or_default()
    }

    fn get_start_points_of(&self, method: &String) -> Vec<String> {
        self.start_points.get(method).cloned().unwrap_or_default()
    }

    fn get_method_of(&self, node: &String) -> String {
        self.method_of
            .get(node)
            .cloned()
            .expect("node must be registered in a method")
    }

    fn get_callees_of_call_at(&self, node: &String) -> Vec<String> {
        self.callees.get(node).cloned().unwrap_or_default()
    }

    fn get_return_sites_of_call_at(&self, node: &String) -> Vec<String> {
        self.return_sites.get(node).cloned().unwrap_or_default()
    }

    fn get_calls_from_within(&self, method: &String) -> Vec<String> {
        self.calls_within.get(method).cloned().unwrap_or_default()
    }

    fn get_callers_of(&self, method: &String) -> Vec<String> {
        self.callers.get(method).cloned().unwrap_or_default()
    }

    fn is_call_stmt(&self, node: &String) -> bool {
        self.callees.contains_key(node)
    }

    fn is_exit_stmt(&self, node: &String) -> bool {
        self.exits.contains(node)
    }

    fn is_start_point(&self, node: &String) -> bool {
        self.start_set.contains(node)
    }

    fn all_non_call_start_nodes(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| !self.is_call_stmt(n) && !self.is_start_point(n))
            .cloned()
            .collect()
    }
}
