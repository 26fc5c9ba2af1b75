//! Brute-force breadth-first search.
//!
//! Slow and memory hungry, but obviously correct on uniform-cost puzzles.
//! Used to cross-check A* and heuristics on small instances.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::cost::Cost;
use crate::space::Puzzle;
use crate::space::State;

/// Number of moves from `start` to every state reachable from it.
pub fn distances<P, St, C>(puzzle: &P, start: &St) -> FxHashMap<St, usize>
where
    P: Puzzle<St, C>,
    St: State,
    C: Cost,
{
    let mut distance = FxHashMap::default();
    let mut queue = VecDeque::new();
    distance.insert(start.clone(), 0usize);
    queue.push_back(start.clone());

    while let Some(s) = queue.pop_front() {
        let d = distance[&s];
        for next in puzzle.successors(&s) {
            if !distance.contains_key(&next) {
                distance.insert(next.clone(), d + 1);
                queue.push_back(next);
            }
        }
    }
    distance
}

/// Fewest moves from `start` to any goal, if one is reachable.
pub fn shortest_depth<P, St, C>(puzzle: &P, start: &St) -> Option<usize>
where
    P: Puzzle<St, C>,
    St: State,
    C: Cost,
{
    let mut distance = FxHashMap::default();
    let mut queue = VecDeque::new();
    distance.insert(start.clone(), 0usize);
    queue.push_back(start.clone());

    while let Some(s) = queue.pop_front() {
        let d = distance[&s];
        if puzzle.is_goal(&s) {
            return Some(d);
        }
        for next in puzzle.successors(&s) {
            if !distance.contains_key(&next) {
                distance.insert(next.clone(), d + 1);
                queue.push_back(next);
            }
        }
    }
    None
}
