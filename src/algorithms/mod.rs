//! Implementation of search algorithms.
//!
//! These algorithms can do path-finding on generic puzzles.

pub mod astar;
pub mod bfs;
