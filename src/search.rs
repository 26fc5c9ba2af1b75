use nonmax::NonMaxUsize;

use crate::cost::Cost;
use crate::space::Path;
use crate::space::Puzzle;
use crate::space::State;

/// A handle to a `SearchTreeNode<St, C>` within its `SearchTree`.
///
/// Handles are only meaningful for the tree that issued them. Using
/// `NonMaxUsize` keeps `Option<NodeIndex>` as wide as a `usize`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex {
    index: NonMaxUsize,
}

impl NodeIndex {
    #[inline(always)]
    fn new(index: usize) -> Self {
        Self {
            index: NonMaxUsize::new(index).expect("search tree outgrew usize::MAX"),
        }
    }
    #[inline(always)]
    pub fn get(&self) -> usize {
        self.index.get()
    }
}

/// A State plus how it was reached.
///
/// Nodes are never modified once in the tree. The parent link always points
/// to an older node, so the links form a tree rooted at the initial state.
#[derive(Debug)]
pub struct SearchTreeNode<St, C>
where
    St: State,
    C: Cost,
{
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) state: St,
    pub(crate) g: C,
}

impl<St, C> SearchTreeNode<St, C>
where
    St: State,
    C: Cost,
{
    pub fn new(s: St, g: C, parent: Option<NodeIndex>) -> Self {
        Self {
            parent,
            state: s,
            g,
        }
    }

    pub fn state(&self) -> &St {
        &self.state
    }
    /// Cost from the start.
    pub fn g(&self) -> C {
        self.g
    }
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }
}

/// Arena of every node generated by one search.
///
/// Only grows, so handles stay valid until the tree is dropped.
pub struct SearchTree<St, C>
where
    St: State,
    C: Cost,
{
    nodes: Vec<SearchTreeNode<St, C>>,
}

impl<St, C> SearchTree<St, C>
where
    St: State,
    C: Cost,
{
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(2048),
        }
    }

    /// Adds a node and returns its handle.
    #[inline(always)]
    pub fn push(&mut self, s: St, g: C, parent: Option<NodeIndex>) -> NodeIndex {
        debug_assert!(parent.is_none_or(|p| p.get() < self.nodes.len()));
        let index = NodeIndex::new(self.nodes.len());
        self.nodes.push(SearchTreeNode::new(s, g, parent));
        index
    }

    /// Adds a root node, `g = 0` and no parent.
    #[inline(always)]
    pub fn push_root(&mut self, s: St) -> NodeIndex {
        self.push(s, C::zero(), None)
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Number of moves between the root and `node_index`.
    pub fn depth(&self, mut node_index: NodeIndex) -> usize {
        let mut depth = 0usize;
        while let Some(parent_index) = self[node_index].parent {
            depth += 1;
            node_index = parent_index;
        }
        depth
    }

    /// Walks parent links back to the root and returns the states root-first.
    #[must_use]
    pub fn path<P: Puzzle<St, C>>(&self, puzzle: &P, mut node_index: NodeIndex) -> Path<St, C> {
        let mut path = Path::<St, C>::new_from_start(self[node_index].state().clone());

        while let Some(parent_index) = self[node_index].parent {
            debug_assert!(parent_index < node_index);
            let p = &self[parent_index];
            let c: C = puzzle.cost(p.state(), self[node_index].state());
            debug_assert!(c != C::zero());

            path.append(p.state().clone(), c);
            node_index = parent_index;
        }

        path.reverse();
        debug_assert!(path.seems_valid());
        path
    }
}

impl<St, C> Default for SearchTree<St, C>
where
    St: State,
    C: Cost,
{
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<St, C> std::ops::Index<NodeIndex> for SearchTree<St, C>
where
    St: State,
    C: Cost,
{
    type Output = SearchTreeNode<St, C>;

    #[inline(always)]
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.get()]
    }
}

impl<St, C> std::fmt::Debug for SearchTree<St, C>
where
    St: State,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}

/// Nodes generated during one search, the root included.
///
/// Owned by the search rather than the puzzle so the same puzzle can be
/// searched repeatedly (or concurrently) without resetting shared state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeCounter {
    generated: usize,
}

impl NodeCounter {
    /// A counter that already accounts for the root.
    pub fn new() -> Self {
        Self { generated: 1 }
    }

    #[inline(always)]
    pub fn increment(&mut self, d: usize) {
        self.generated += d;
    }

    pub fn get(&self) -> usize {
        self.generated
    }

    pub fn reset(&mut self) {
        self.generated = 1;
    }
}

impl Default for NodeCounter {
    fn default() -> Self {
        Self::new()
    }
}
