/*
 * Flow functions: D -> 2^D.
 *
 * Flow functions describe which facts survive, appear, or die along an
 * edge of the interprocedural CFG. They are queried through the
 * flow/edge-function cache and shared behind `Arc` because the same
 * function is typically applied at many (source fact, path edge) pairs.
 */

use std::sync::Arc;

/// Effect of a statement on dataflow facts.
///
/// Example (taint propagation for `y = x`):
///   input `Tainted(x)`, output `{Tainted(x), Tainted(y)}`.
pub trait FlowFunction<D> {
    /// Compute the facts holding after the edge, given one fact holding
    /// before it.
    fn compute_targets(&self, source: &D) -> Vec<D>;

    fn is_identity(&self) -> bool {
        false
    }
}

/// Shared handle under which flow functions circulate.
pub type SharedFlowFunction<D> = Arc<dyn FlowFunction<D>>;

/// `f(d) = {d}`
pub struct IdentityFlowFunction;

impl<D: Clone> FlowFunction<D> for IdentityFlowFunction {
    fn compute_targets(&self, source: &D) -> Vec<D> {
        vec![source.clone()]
    }

    fn is_identity(&self) -> bool {
        true
    }
}

/// `f(d) = {}`
pub struct KillAllFlowFunction;

impl<D> FlowFunction<D> for KillAllFlowFunction {
    fn compute_targets(&self, _source: &D) -> Vec<D> {
        Vec::new()
    }
}

/// `f(d) = {d, gen_fact}`
pub struct GenFlowFunction<D> {
    pub gen_fact: D,
}

impl<D: Clone + PartialEq> FlowFunction<D> for GenFlowFunction<D> {
    fn compute_targets(&self, source: &D) -> Vec<D> {
        if *source == self.gen_fact {
            vec![source.clone()]
        } else {
            vec![source.clone(), self.gen_fact.clone()]
        }
    }
}

/// `f(from) = {from, to}`, identity on everything else.
pub struct TransferFlowFunction<D> {
    pub from: D,
    pub to: D,
}

impl<D: Clone + PartialEq> FlowFunction<D> for TransferFlowFunction<D> {
    fn compute_targets(&self, source: &D) -> Vec<D> {
        if *source == self.from {
            vec![self.from.clone(), self.to.clone()]
        } else {
            vec![source.clone()]
        }
    }
}

/// Flow function defined by a closure; convenient for small analyses and
/// tests.
pub struct LambdaFlow<F>(pub F);

impl<D, F> FlowFunction<D> for LambdaFlow<F>
where
    F: Fn(&D) -> Vec<D>,
{
    fn compute_targets(&self, source: &D) -> Vec<D> {
        (self.0)(source)
    }
}

/// Wrapper that keeps the zero fact alive.
///
/// With auto-zero configured, client flow functions never have to mention
/// the zero fact; the cache wraps them so that zero always survives its
/// own propagation.
pub struct ZeroedFlowFunction<D> {
    delegate: SharedFlowFunction<D>,
    zero_value: D,
}

impl<D> ZeroedFlowFunction<D> {
    pub fn new(delegate: SharedFlowFunction<D>, zero_value: D) -> Self {
        Self {
            delegate,
            zero_value,
        }
    }
}

impl<D: Clone + PartialEq> FlowFunction<D> for ZeroedFlowFunction<D> {
    fn compute_targets(&self, source: &D) -> Vec<D> {
        let mut targets = self.delegate.compute_targets(source);
        if *source == self.zero_value && !targets.contains(&self.zero_value) {
            targets.push(self.zero_value.clone());
        }
        targets
    }
}
