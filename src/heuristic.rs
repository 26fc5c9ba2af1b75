use std::marker::PhantomData;

use crate::cost::Cost;
use crate::space::Puzzle;
use crate::space::State;

/// An instance-specific estimate of the cost left to reach a goal.
///
/// Values must never be negative (guaranteed by `Cost`) and must stay below
/// the saturation value, which the search treats as invalid. Admissible
/// heuristics (never overestimating) make A* return optimal paths.
pub trait Heuristic<P, St, C>: std::fmt::Debug
where
    P: Puzzle<St, C>,
    St: State,
    C: Cost,
{
    fn h(&self, s: &St) -> C;

    /// Short name used in reports.
    fn name(&self) -> &str;
}

/// Always zero.
///
/// Turns A* into uniform-cost search. Works for any puzzle.
#[derive(Debug)]
pub struct ZeroHeuristic<P> {
    _phantom_puzzle: PhantomData<P>,
}

impl<P> ZeroHeuristic<P> {
    pub fn new(_p: &P) -> Self {
        Self {
            _phantom_puzzle: PhantomData,
        }
    }
}

impl<P, St, C> Heuristic<P, St, C> for ZeroHeuristic<P>
where
    P: Puzzle<St, C>,
    St: State,
    C: Cost,
{
    #[inline(always)]
    fn h(&self, _s: &St) -> C {
        C::zero()
    }

    fn name(&self) -> &str {
        "zero"
    }
}
