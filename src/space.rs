use std::fmt::Debug;
use std::hash::Hash;

use crate::cost::Cost;
use crate::search::NodeCounter;
use crate::search::NodeIndex;
use crate::search::SearchTree;

/// A puzzle configuration.
///
/// States are values. Two states are the same configuration iff they compare
/// equal, and equal states must hash equally since the expanded set is keyed
/// on them.
pub trait State: Clone + Debug + PartialEq + Eq + Hash {}

/// The capability a puzzle needs to be searched.
///
/// Implementors describe one puzzle instance: where it starts, what counts as
/// solved, and which configurations are one move away from any other.
pub trait Puzzle<St, C>: Debug
where
    St: State,
    C: Cost,
{
    fn name(&self) -> &str;

    /// The configuration the search starts from.
    fn initial(&self) -> &St;

    fn is_goal(&self, s: &St) -> bool;

    /// Every state reachable from `s` in a single move.
    ///
    /// The order is part of the contract as it feeds the frontier tie-break.
    fn successors(&self, s: &St) -> Vec<St>;

    fn cost(&self, _s: &St, _next: &St) -> C {
        C::one()
    }

    /// Verify is a State belongs to this puzzle.
    fn valid(&self, s: &St) -> bool;

    /// Expands a search node, adding its children to the search tree.
    ///
    /// Each child costs one move more than `parent` and links back to it.
    /// The counter grows by the number of children produced.
    fn expand(
        &self,
        tree: &mut SearchTree<St, C>,
        parent: NodeIndex,
        counter: &mut NodeCounter,
    ) -> Vec<NodeIndex> {
        let state = tree[parent].state().clone();
        let g = tree[parent].g();
        debug_assert!(self.valid(&state));

        let children: Vec<NodeIndex> = self
            .successors(&state)
            .into_iter()
            .map(|child| {
                let c = self.cost(&state, &child);
                debug_assert!(c != C::zero());
                tree.push(child, g.saturating_add(&c), Some(parent))
            })
            .collect();

        counter.increment(children.len());
        children
    }

    fn valid_path(&self, p: &Path<St, C>) -> bool {
        let Some(start) = p.start() else {
            // Empty paths are fine
            return p.cost == C::zero();
        };
        if start != self.initial() {
            return false;
        }

        let mut cost = C::zero();
        for step in p.states.windows(2) {
            let (from, to) = (&step[0], &step[1]);
            if !self.successors(from).contains(to) {
                return false;
            }
            cost = cost.saturating_add(&self.cost(from, to));
        }
        cost == p.cost
    }
}

/// A sequence of states, from the initial state to the last one, inclusive.
#[derive(Debug, PartialEq, Eq)]
pub struct Path<St, C>
where
    St: State,
    C: Cost,
{
    pub states: Vec<St>,
    pub cost: C,
}

impl<St, C> Path<St, C>
where
    St: State,
    C: Cost,
{
    #[inline(always)]
    pub fn new_from_start(start: St) -> Self {
        Self {
            states: vec![start],
            cost: C::zero(),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of moves in the path.
    pub fn depth(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<&St> {
        self.states.first()
    }
    pub fn end(&self) -> Option<&St> {
        self.states.last()
    }

    /// Runs sanity checks
    #[inline(always)]
    pub fn seems_valid(&self) -> bool {
        self.cost.valid()
    }

    #[inline(always)]
    pub fn append(&mut self, s: St, c: C) {
        self.states.push(s);
        self.cost = self.cost.saturating_add(&c);
    }

    /// Reverses the Path.
    ///
    /// Useful when naturally reconstructing paths in reverse.
    pub fn reverse(&mut self) {
        self.states.reverse();
    }
}

impl<St, C> std::fmt::Display for Path<St, C>
where
    St: State,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => {
                write!(
                    f,
                    "Path({}, {:?}..{:?}, {} states)",
                    self.cost,
                    start,
                    end,
                    self.states.len()
                )
            }
            _ => write!(f, "Path()"),
        }
    }
}
