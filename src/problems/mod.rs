//! Puzzles that can be searched.
//!
//! Each one exposes its configurations as `State`s and implements `Puzzle` so
//! any search algorithm can drive it.

pub mod rubiks_cube;
pub mod rush_hour;
pub mod rush_hour_heuristics;
