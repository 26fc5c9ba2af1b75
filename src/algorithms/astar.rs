use std::fmt::Debug;

use log::debug;
use log::trace;
use log::warn;
use rustc_hash::FxHashSet;

use crate::cost::Cost;
use crate::data_structures::frontier::Frontier;
use crate::heuristic::Heuristic;
use crate::search::NodeCounter;
use crate::search::NodeIndex;
use crate::search::SearchTree;
use crate::search::SearchTreeNode;
use crate::space::Path;
use crate::space::Puzzle;
use crate::space::State;

/// The ranking tuple for A*
///
/// We prefer better f-values, tie break for lower h, and finally for the
/// entry that was discovered first. The last component makes the order
/// total, so searches are reproducible.
///
/// ```
/// use puzzle_search::algorithms::astar::AStarRank;
///
/// // Same f-value, the one closer to the goal goes first.
/// assert!(AStarRank::<u32>::new(2, 0, 1) < AStarRank::<u32>::new(0, 2, 0));
/// // Same f and h, first come first served.
/// assert!(AStarRank::<u32>::new(1, 1, 4) < AStarRank::<u32>::new(1, 1, 5));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AStarRank<C: Cost> {
    f: C,
    h: C,
    sequence: u64,
}
impl<C> AStarRank<C>
where
    C: Cost,
{
    pub fn new(g: C, h: C, sequence: u64) -> Self {
        Self {
            f: g.saturating_add(&h),
            h,
            sequence,
        }
    }
    pub fn f(&self) -> C {
        self.f
    }
    pub fn h(&self) -> C {
        self.h
    }
}

/// A frontier entry.
///
/// Several entries may point to nodes holding the same state. Only the first
/// one popped gets expanded.
#[derive(Debug)]
pub struct AStarHeapNode<C>
where
    C: Cost,
{
    /// The rank of this node that defines how good it is.
    pub rank: AStarRank<C>,
    /// The index of this node in the Search Tree
    pub node_index: NodeIndex,
}

impl<C: Cost> PartialEq for AStarHeapNode<C> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.rank.eq(&other.rank)
    }
}
impl<C: Cost> Eq for AStarHeapNode<C> {}

impl<C: Cost> PartialOrd for AStarHeapNode<C> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<C: Cost> Ord for AStarHeapNode<C> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank.cmp(&other.rank)
    }
}

/// Where a search is at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum SearchStatus {
    /// `run` was never called.
    #[display("not started")]
    NotStarted,
    /// A goal was reached.
    #[display("solved")]
    Solved,
    /// The frontier ran dry without reaching a goal.
    #[display("exhausted")]
    Exhausted,
}

/// Counters collected while searching.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes created, the root included.
    pub generated: usize,
    /// States taken out of the frontier and processed.
    pub expanded: usize,
    /// Entries ever pushed into the frontier.
    pub pushed: usize,
    /// Entries popped for a state that had already been expanded.
    pub stale_pops: usize,
}

#[derive(Debug)]
pub struct AStarSearch<'a, P, H, St, C>
where
    P: Puzzle<St, C>,
    H: Heuristic<P, St, C>,
    St: State,
    C: Cost,
{
    puzzle: &'a P,
    heuristic: &'a H,

    /// All the Search Nodes, forming a tree rooted at the initial state.
    search_tree: SearchTree<St, C>,

    /// Discovered nodes ranked by `(f, h, sequence)`.
    open: Frontier<AStarHeapNode<C>>,

    /// The "Closed Set". States that were already expanded.
    closed: FxHashSet<St>,

    counter: NodeCounter,
    stats: SearchStats,
    status: SearchStatus,
    next_sequence: u64,
    goal_node: Option<NodeIndex>,
}

impl<'a, P, H, St, C> AStarSearch<'a, P, H, St, C>
where
    P: Puzzle<St, C>,
    H: Heuristic<P, St, C>,
    St: State,
    C: Cost,
{
    #[must_use]
    pub fn new(puzzle: &'a P, heuristic: &'a H) -> Self {
        let mut search = Self {
            puzzle,
            heuristic,
            search_tree: SearchTree::<St, C>::new(),
            open: Frontier::new(),
            closed: FxHashSet::default(),
            counter: NodeCounter::new(),
            stats: SearchStats::default(),
            status: SearchStatus::NotStarted,
            next_sequence: 0,
            goal_node: None,
        };

        let root = search.search_tree.push_root(puzzle.initial().clone());
        search.push(root);
        search.stats.generated = search.counter.get();

        search
    }

    /// Runs A* until a goal is found or the frontier is exhausted.
    ///
    /// Returns the path from the initial state to the goal, both included.
    /// Calling this again once finished returns the same outcome without
    /// searching again.
    #[must_use]
    pub fn run(&mut self) -> Option<Path<St, C>> {
        match self.status {
            SearchStatus::Solved => return self.solution(),
            SearchStatus::Exhausted => return None,
            SearchStatus::NotStarted => {}
        }
        debug!(
            "A* on '{}' with '{}' heuristic",
            self.puzzle.name(),
            self.heuristic.name()
        );

        while let Some(heap_node) = self.open.pop() {
            let node_index = heap_node.node_index;
            let state = self.search_tree[node_index].state();

            // Stale entry for a state reached earlier through a better path.
            if self.closed.contains(state) {
                self.stats.stale_pops += 1;
                continue;
            }

            // Mark as closed
            self.closed.insert(state.clone());
            self.stats.expanded += 1;
            trace!(
                "Expanding {:?} (f={}, h={})",
                state,
                heap_node.rank.f(),
                heap_node.rank.h()
            );

            if self.puzzle.is_goal(state) {
                self.goal_node = Some(node_index);
                self.status = SearchStatus::Solved;
                self.stats.generated = self.counter.get();
                let path = self.solution();
                debug!(
                    "Solved '{}' at depth {} ({:?})",
                    self.puzzle.name(),
                    self.search_tree.depth(node_index),
                    self.stats
                );
                return path;
            }

            // Expand state. Children are not checked against the closed set
            // here, stale ones are dropped when popped.
            let children = self
                .puzzle
                .expand(&mut self.search_tree, node_index, &mut self.counter);
            for child in children {
                self.push(child);
            }
        }

        self.status = SearchStatus::Exhausted;
        self.stats.generated = self.counter.get();
        warn!(
            "No solution for '{}' after expanding {} states",
            self.puzzle.name(),
            self.stats.expanded
        );
        None
    }

    #[inline(always)]
    fn push(&mut self, node_index: NodeIndex) {
        let node = &self.search_tree[node_index];
        let h: C = self.heuristic.h(node.state());
        debug_assert!(h.valid(), "Heuristic value out of range");

        let rank = AStarRank::new(node.g(), h, self.next_sequence);
        self.next_sequence += 1;
        self.stats.pushed += 1;
        self.open.push(AStarHeapNode { rank, node_index });
    }

    fn solution(&self) -> Option<Path<St, C>> {
        let goal = self.goal_node?;
        let path = self.search_tree.path(self.puzzle, goal);
        debug_assert_eq!(path.len(), self.search_tree.depth(goal) + 1);
        debug_assert!(self.puzzle.valid_path(&path));
        Some(path)
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            generated: self.counter.get(),
            ..self.stats
        }
    }

    /// Size of the closed set.
    pub fn expanded_len(&self) -> usize {
        self.closed.len()
    }

    pub fn write_memory_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "AStarSearch Stats:")?;
        let s = size_of::<SearchTreeNode<St, C>>();
        let l = self.search_tree.len();
        writeln!(
            out,
            "  - |Nodes|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        let c = self.search_tree.capacity();
        writeln!(
            out,
            "  - |Nodes|*:  {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let s = size_of::<AStarHeapNode<C>>();
        let l = self.open.len();
        let c = self.open.capacity();
        writeln!(
            out,
            "  - |Open|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Open|*:  {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let s = size_of::<St>();
        let l = self.closed.len();
        let c = self.closed.capacity();
        writeln!(
            out,
            "  - |Closed|:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Closed|*: {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        writeln!(
            out,
            "  - Stale pops: {}",
            self.stats.stale_pops.separate_with_commas()
        )?;

        Ok(())
    }
}

/// What a finished search hands back.
#[derive(Debug)]
pub struct SearchReport<St, C>
where
    St: State,
    C: Cost,
{
    /// `None` when no goal is reachable.
    pub path: Option<Path<St, C>>,
    pub stats: SearchStats,
}

impl<St, C> SearchReport<St, C>
where
    St: State,
    C: Cost,
{
    /// Moves in the solution, if any.
    pub fn depth(&self) -> Option<usize> {
        self.path.as_ref().map(Path::depth)
    }
}

/// Runs a fresh A* search.
pub fn astar<P, H, St, C>(puzzle: &P, heuristic: &H) -> SearchReport<St, C>
where
    P: Puzzle<St, C>,
    H: Heuristic<P, St, C>,
    St: State,
    C: Cost,
{
    let mut search = AStarSearch::new(puzzle, heuristic);
    let path = search.run();
    SearchReport {
        path,
        stats: search.stats(),
    }
}
