//! Containers used by the search algorithms.

pub mod frontier;
