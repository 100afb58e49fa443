/*
 * Edge function algebra.
 *
 * Every edge of the exploded supergraph carries a distributive function
 * V -> V. Jump functions are compositions and joins of these edge
 * functions, so the algebra must support right composition, pointwise
 * join, evaluation, and equality testing (the convergence check of the
 * propagation phase compares functions, not values).
 *
 * The algebra is a tagged sum rather than an open trait hierarchy:
 * `Identity` and `AllTop` are the distinguished elements of SRH'96,
 * `AllBottom` is the constant-reachable function of the IFDS lifting, and
 * client functions plug in through `EdgeTransform`. Compositions and joins
 * that neither the built-in shortcuts nor the client can simplify fall
 * back to explicit `Composed`/`Joined` nodes that evaluate recursively.
 *
 * References:
 * - Sagiv, Reps, Horwitz (1996): "Precise Interprocedural Dataflow
 *   Analysis with Applications to Constant Propagation"
 */

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use crate::lattice::JoinLattice;

/// Client-supplied edge function body.
///
/// `compose_with` and `join_with` are simplification hooks: a client that
/// can represent the combined function directly returns `Some` and keeps
/// the function DAG flat. Returning `None` (the default) makes the algebra
/// build a `Composed`/`Joined` node instead, which is always correct but
/// grows with every combination. Analyses over finite value domains
/// typically simplify into a finite family of functions, which is what
/// bounds the fixpoint of the propagation phase.
pub trait EdgeTransform<V: JoinLattice>: Debug {
    /// Evaluate the function at `source`.
    fn compute_target(&self, source: &V) -> V;

    /// Simplify `self` followed by `second`, if possible.
    fn compose_with(&self, second: &EdgeFunction<V>) -> Option<EdgeFunction<V>> {
        let _ = second;
        None
    }

    /// Simplify the pointwise join of `self` and `other`, if possible.
    fn join_with(&self, other: &EdgeFunction<V>) -> Option<EdgeFunction<V>> {
        let _ = other;
        None
    }

    /// Semantic equality against another client function.
    fn equal_to(&self, other: &dyn EdgeTransform<V>) -> bool;

    fn as_any(&self) -> &dyn Any;
}

/// A composable edge function over the value lattice `V`.
///
/// Unset entries of the jump function tables denote `AllTop` implicitly;
/// `AllTop` is therefore the neutral element of `join_with` and the
/// starting point of every convergence check.
#[derive(Debug, Clone)]
pub enum EdgeFunction<V: JoinLattice> {
    /// `v -> v`. Neutral element of composition.
    Identity,
    /// `v -> top`. Neutral element of the join.
    AllTop,
    /// `v -> bottom`. Absorbing element of the join.
    AllBottom,
    /// Client function with optional simplification hooks.
    Client(Arc<dyn EdgeTransform<V>>),
    /// `v -> second(first(v))`; built when nothing simplifies.
    Composed(Arc<EdgeFunction<V>>, Arc<EdgeFunction<V>>),
    /// `v -> join(left(v), right(v))`; built when nothing simplifies.
    Joined(Arc<EdgeFunction<V>>, Arc<EdgeFunction<V>>),
}

impl<V: JoinLattice> EdgeFunction<V> {
    /// Wrap a client transform.
    pub fn client<T: EdgeTransform<V> + 'static>(transform: T) -> Self {
        EdgeFunction::Client(Arc::new(transform))
    }

    /// Evaluate the function at `source`.
    pub fn compute_target(&self, source: &V) -> V {
        match self {
            EdgeFunction::Identity => source.clone(),
            EdgeFunction::AllTop => V::top(),
            EdgeFunction::AllBottom => V::bottom(),
            EdgeFunction::Client(t) => t.compute_target(source),
            EdgeFunction::Composed(first, second) => {
                second.compute_target(&first.compute_target(source))
            }
            EdgeFunction::Joined(left, right) => left
                .compute_target(source)
                .join(&right.compute_target(source)),
        }
    }

    /// Right composition: the resulting function applies `self` first and
    /// `second` afterwards.
    pub fn compose_with(&self, second: &EdgeFunction<V>) -> EdgeFunction<V> {
        match (self, second) {
            (EdgeFunction::Identity, g) => g.clone(),
            (f, EdgeFunction::Identity) => f.clone(),
            // A function that already maps everything to top stays all-top
            // under any distributive continuation, and nothing recovers
            // information after a constant-top step.
            (EdgeFunction::AllTop, _) | (_, EdgeFunction::AllTop) => EdgeFunction::AllTop,
            (_, EdgeFunction::AllBottom) => EdgeFunction::AllBottom,
            (EdgeFunction::Client(t), g) => t
                .compose_with(g)
                .unwrap_or_else(|| self.composed_fallback(second)),
            _ => self.composed_fallback(second),
        }
    }

    /// Pointwise join of two edge functions.
    pub fn join_with(&self, other: &EdgeFunction<V>) -> EdgeFunction<V> {
        if self == other {
            return self.clone();
        }
        match (self, other) {
            (EdgeFunction::AllTop, g) => g.clone(),
            (f, EdgeFunction::AllTop) => f.clone(),
            (EdgeFunction::AllBottom, _) | (_, EdgeFunction::AllBottom) => EdgeFunction::AllBottom,
            // Re-joining a function that is already part of a join must be
            // a no-op, otherwise the convergence check never fires.
            (EdgeFunction::Joined(left, right), g)
                if left.as_ref() == g || right.as_ref() == g =>
            {
                self.clone()
            }
            (f, EdgeFunction::Joined(left, right))
                if left.as_ref() == f || right.as_ref() == f =>
            {
                other.clone()
            }
            (EdgeFunction::Client(t), g) => t
                .join_with(g)
                .or_else(|| match g {
                    EdgeFunction::Client(u) => u.join_with(self),
                    _ => None,
                })
                .unwrap_or_else(|| self.joined_fallback(other)),
            (f, EdgeFunction::Client(u)) => u
                .join_with(f)
                .unwrap_or_else(|| self.joined_fallback(other)),
            _ => self.joined_fallback(other),
        }
    }

    fn composed_fallback(&self, second: &EdgeFunction<V>) -> EdgeFunction<V> {
        EdgeFunction::Composed(Arc::new(self.clone()), Arc::new(second.clone()))
    }

    fn joined_fallback(&self, other: &EdgeFunction<V>) -> EdgeFunction<V> {
        EdgeFunction::Joined(Arc::new(self.clone()), Arc::new(other.clone()))
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, EdgeFunction::Identity)
    }

    pub fn is_all_top(&self) -> bool {
        matches!(self, EdgeFunction::AllTop)
    }
}

impl<V: JoinLattice> PartialEq for EdgeFunction<V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EdgeFunction::Identity, EdgeFunction::Identity) => true,
            (EdgeFunction::AllTop, EdgeFunction::AllTop) => true,
            (EdgeFunction::AllBottom, EdgeFunction::AllBottom) => true,
            (EdgeFunction::Client(a), EdgeFunction::Client(b)) => {
                Arc::ptr_eq(a, b) || a.equal_to(b.as_ref())
            }
            (EdgeFunction::Composed(a, b), EdgeFunction::Composed(c, d)) => a == c && b == d,
            (EdgeFunction::Joined(a, b), EdgeFunction::Joined(c, d)) => a == c && b == d,
            _ => false,
        }
    }
}

impl<V: JoinLattice> Eq for EdgeFunction<V> {}

/// Constant edge function `v -> value`.
///
/// Composes by evaluating the continuation at the constant and joins with
/// other constants by joining the values, so chains of constant functions
/// never grow the function DAG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantEdge<V: JoinLattice> {
    pub value: V,
}

impl<V: JoinLattice> ConstantEdge<V> {
    pub fn new(value: V) -> Self {
        Self { value }
    }
}

impl<V: JoinLattice> EdgeTransform<V> for ConstantEdge<V> {
    fn compute_target(&self, _source: &V) -> V {
        self.value.clone()
    }

    fn compose_with(&self, second: &EdgeFunction<V>) -> Option<EdgeFunction<V>> {
        Some(EdgeFunction::client(ConstantEdge::new(
            second.compute_target(&self.value),
        )))
    }

    fn join_with(&self, other: &EdgeFunction<V>) -> Option<EdgeFunction<V>> {
        match other {
            EdgeFunction::Client(t) => t
                .as_any()
                .downcast_ref::<ConstantEdge<V>>()
                .map(|o| EdgeFunction::client(ConstantEdge::new(self.value.join(&o.value)))),
            _ => None,
        }
    }

    fn equal_to(&self, other: &dyn EdgeTransform<V>) -> bool {
        other
            .as_any()
            .downcast_ref::<ConstantEdge<V>>()
            .map_or(false, |o| o.value == self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
