use std::fmt::Debug;

use crate::derank::derank;

const HEAP_ARITY: usize = 8usize;
#[inline(always)]
#[must_use]
fn up(i: usize) -> usize {
    crate::heap_primitives::index_parent::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down(i: usize, len: usize) -> std::ops::Range<usize> {
    crate::heap_primitives::index_children::<HEAP_ARITY>(i, len)
}

/// A d-ary min-heap of frontier entries.
///
/// There is no decrease-key. A state that is reached again through a better
/// path simply gets a second entry, and whoever pops entries is expected to
/// skip the ones that went stale (lazy deletion).
///
/// ```pseudocode
/// for (i, e) in self.heap.enumerate().skip(1):
///   assert(self.heap[up(i)] <= e)
/// ```
#[derive(Debug)]
pub struct Frontier<T>
where
    T: Ord + Debug,
{
    heap: Vec<T>,
}

impl<T> Frontier<T>
where
    T: Ord + Debug,
{
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(2048)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }

    /// The best entry, without removing it.
    #[inline(always)]
    pub fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    #[inline(always)]
    pub fn push(&mut self, entry: T) {
        self.verify_heap();
        self.heap.push(entry);
        self.sift_up(self.heap.len() - 1);
        self.verify_heap();
    }

    /// Removes the best entry.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<T> {
        self.verify_heap();
        let top = match self.heap.len() {
            0 | 1 => self.heap.pop(),
            _ => {
                // Move the last entry to the root and let it sink.
                let top = self.heap.swap_remove(0);
                self.sift_down(0);
                Some(top)
            }
        };
        self.verify_heap();
        top
    }

    /// Raises an entry
    /// Returns it's new index
    #[inline(always)]
    fn sift_up(&mut self, mut pos: usize) -> usize {
        debug_assert!(pos < self.heap.len(), "Index out of bounds...");

        while pos > 0 {
            let parent = up(pos);
            if self.heap[parent] <= self.heap[pos] {
                break;
            }
            self.heap.swap(parent, pos);
            pos = parent;
        }
        pos
    }

    /// Lowers an entry
    /// Returns it's new index
    #[inline(always)]
    fn sift_down(&mut self, mut pos: usize) -> usize {
        let len = self.heap.len();
        debug_assert!(pos < len, "Index out of bounds...");

        loop {
            let children = down(pos, len);
            if children.is_empty() {
                break;
            }

            // Find the best child
            let child = children.start + derank(&self.heap[children]);
            if self.heap[pos] <= self.heap[child] {
                break;
            }

            self.heap.swap(pos, child);
            pos = child;
        }
        pos
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify_heap(&self) {
        // All good... (hopefully)
    }
    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify_heap(&self) {
        // Every entry goes after its parent.
        for i in 1..self.heap.len() {
            let p = up(i);
            assert!(
                self.heap[p] <= self.heap[i],
                "Entry[{p}]={:?} !<= child [{i}]={:?}. Out of heap of len={}",
                self.heap[p],
                self.heap[i],
                self.heap.len(),
            );
        }
    }
}

impl<T> Default for Frontier<T>
where
    T: Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    #[test]
    fn pops_in_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut frontier = Frontier::<u32>::with_capacity(4);
        let mut values: Vec<u32> = (0..500).map(|_| rng.random_range(0..100)).collect();
        for v in &values {
            frontier.push(*v);
        }
        assert_eq!(frontier.len(), values.len());

        values.sort();
        let popped: Vec<u32> = std::iter::from_fn(|| frontier.pop()).collect();
        assert_eq!(popped, values);
        assert!(frontier.is_empty());
    }

    #[test]
    fn interleaved_push_and_pop() {
        let mut frontier = Frontier::<(u8, u8)>::new();
        frontier.push((3, 0));
        frontier.push((1, 1));
        assert_eq!(frontier.pop(), Some((1, 1)));
        frontier.push((2, 2));
        frontier.push((3, 3));
        assert_eq!(frontier.peek(), Some(&(2, 2)));
        assert_eq!(frontier.pop(), Some((2, 2)));
        assert_eq!(frontier.pop(), Some((3, 0)));
        assert_eq!(frontier.pop(), Some((3, 3)));
        assert_eq!(frontier.pop(), None);
    }
}
