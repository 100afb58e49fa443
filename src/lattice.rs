/*
 * Join semilattice of analysis values.
 *
 * Values are combined with a binary join whenever control flow merges or a
 * procedure is reached from several contexts. Top is the neutral element of
 * the join and doubles as "no information has arrived here"; bottom absorbs
 * everything and is the seed value of analysis entry points (line [1] and
 * the seeding step of Fig. 7 in SRH'96).
 */

use std::fmt::Debug;
use std::hash::Hash;

/// Value domain of an IDE problem.
///
/// Example instantiations:
///   - Constant propagation: `Top` (nothing known yet), `Const(i64)`,
///     `NonConst` as bottom.
///   - Reachability (the IFDS special case): [`BinaryDomain`].
///
/// Laws expected from `join`:
/// - Commutative: `a.join(b) == b.join(a)`
/// - Associative: `a.join(b).join(c) == a.join(b.join(c))`
/// - Idempotent: `a.join(a) == a`
/// - Top is neutral: `a.join(top) == a`
/// - Bottom absorbs: `a.join(bottom) == bottom`
///
/// The solver requires the lattice to have finite height; fixpoint
/// termination depends on it.
pub trait JoinLattice: Clone + Eq + Hash + Debug + 'static {
    /// Top element. Never stored in the value table; absence means top.
    fn top() -> Self;

    /// Bottom element. Seed values start here.
    fn bottom() -> Self;

    /// Combine two values where paths merge.
    fn join(&self, other: &Self) -> Self;

    fn is_top(&self) -> bool {
        *self == Self::top()
    }

    fn is_bottom(&self) -> bool {
        *self == Self::bottom()
    }
}

/// Two-point lattice used when an IFDS problem is run through the IDE
/// machinery: `Bottom` means the fact is reachable, `Top` that it is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryDomain {
    Top,
    Bottom,
}

impl JoinLattice for BinaryDomain {
    fn top() -> Self {
        BinaryDomain::Top
    }

    fn bottom() -> Self {
        BinaryDomain::Bottom
    }

    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (BinaryDomain::Top, BinaryDomain::Top) => BinaryDomain::Top,
            _ => BinaryDomain::Bottom,
        }
    }
}
