//! Heuristics for Rush Hour.
//!
//! All of them are 0 exactly at goal states. Elsewhere they count one move
//! for the goal car itself plus the moves other cars are known to need.

use crate::cost::MoveCount;
use crate::heuristic::Heuristic;
use crate::problems::rush_hour::CarIndex;
use crate::problems::rush_hour::GOAL_CAR;
use crate::problems::rush_hour::Grid;
use crate::problems::rush_hour::RushHourPuzzle;
use crate::problems::rush_hour::RushHourState;
use crate::space::Puzzle;

/// One plus the number of vertical cars in front of the goal car.
///
/// Each of them has to move at least once before the goal car can leave.
#[derive(Debug)]
pub struct BlockingHeuristic<'p> {
    puzzle: &'p RushHourPuzzle,
    goal_row: u8,
}

impl<'p> BlockingHeuristic<'p> {
    pub fn new(puzzle: &'p RushHourPuzzle) -> Self {
        Self {
            puzzle,
            goal_row: puzzle.goal_row(),
        }
    }
}

impl Heuristic<RushHourPuzzle, RushHourState, MoveCount> for BlockingHeuristic<'_> {
    fn h(&self, s: &RushHourState) -> MoveCount {
        if self.puzzle.is_goal(s) {
            return 0;
        }

        let goal_car = self.puzzle.car(GOAL_CAR);
        let front = s.position(GOAL_CAR) + goal_car.size - 1;

        let blocking = self
            .puzzle
            .cars()
            .iter()
            .zip(s.positions())
            .filter(|(car, _)| car.is_vertical() && car.fixed > front)
            .filter(|(car, top)| **top <= self.goal_row && self.goal_row < **top + car.size)
            .count();

        blocking as MoveCount + 1
    }

    fn name(&self) -> &str {
        "blocking"
    }
}

/// Blocking cars, counted twice when they are stuck.
///
/// A blocking car is stuck when it can't leave the goal row upwards nor
/// downwards without some other car moving first, be it because of a wall, a
/// vertical car, or a horizontal car in the way. A horizontal car only gets
/// credited for unsticking a single blocking car, since one move of it could
/// clear the way for several.
#[derive(Debug)]
pub struct AdvancedHeuristic<'p> {
    puzzle: &'p RushHourPuzzle,
    goal_row: u8,
}

impl<'p> AdvancedHeuristic<'p> {
    pub fn new(puzzle: &'p RushHourPuzzle) -> Self {
        Self {
            puzzle,
            goal_row: puzzle.goal_row(),
        }
    }

    /// Whether `blocker` needs another car to move before it can leave the
    /// goal row, checking above first and then below.
    ///
    /// Horizontal cars picked as the obstacle get flagged in `used` so no
    /// other blocking car relies on them.
    fn is_stuck(
        &self,
        s: &RushHourState,
        grid: &Grid,
        used: &mut [bool],
        blocker: CarIndex,
    ) -> bool {
        let car = self.puzzle.car(blocker);
        let goal_row = self.goal_row as i32;
        let size = car.size as i32;
        let n = self.puzzle.grid_size() as i32;

        // Too long to fit above the goal row, otherwise check what's there.
        let stuck_above = goal_row - size < 0
            || self.is_obstructed(s, grid, used, blocker, (goal_row - size..=goal_row).rev());
        if !stuck_above {
            return false;
        }

        // Same below.
        goal_row + size >= n
            || self.is_obstructed(s, grid, used, blocker, goal_row..=goal_row + size)
    }

    /// Scans the blocker's column over `rows` for whatever keeps it in place.
    ///
    /// Any vertical car settles it. Otherwise the unused horizontal car with
    /// the rightmost back end gets used, leaving those further left for the
    /// blocking cars scanned later.
    fn is_obstructed(
        &self,
        s: &RushHourState,
        grid: &Grid,
        used: &mut [bool],
        blocker: CarIndex,
        rows: impl Iterator<Item = i32>,
    ) -> bool {
        let column = self.puzzle.car(blocker).fixed;
        let mut horizontal: Option<CarIndex> = None;

        for y in rows {
            let Some(other) = grid.at(column, y as u8) else {
                continue;
            };
            if other == blocker {
                continue;
            }

            if self.puzzle.car(other).is_vertical() {
                return true;
            }
            if !used[other as usize]
                && horizontal.is_none_or(|best| s.position(other) > s.position(best))
            {
                horizontal = Some(other);
            }
        }

        match horizontal {
            Some(other) if other != GOAL_CAR => {
                used[other as usize] = true;
                true
            }
            _ => false,
        }
    }
}

impl Heuristic<RushHourPuzzle, RushHourState, MoveCount> for AdvancedHeuristic<'_> {
    fn h(&self, s: &RushHourState) -> MoveCount {
        if self.puzzle.is_goal(s) {
            return 0;
        }

        let grid = self.puzzle.grid(s);
        let mut used = vec![false; self.puzzle.num_cars()];
        let mut count: MoveCount = 0;

        // From the exit inwards, until reaching the goal car. Counts cells, so
        // a horizontal car left in the goal row counts once per cell.
        for x in (0..self.puzzle.grid_size()).rev() {
            let Some(car) = grid.at(x, self.goal_row) else {
                continue;
            };
            if car == GOAL_CAR {
                break;
            }

            count += 1;
            if self.is_stuck(s, &grid, &mut used, car) {
                count += 1;
            }
        }

        count + 1
    }

    fn name(&self) -> &str {
        "advanced"
    }
}

/// The Rush Hour heuristics, picked at runtime.
#[derive(Debug)]
pub enum RushHourHeuristic<'p> {
    Zero,
    Blocking(BlockingHeuristic<'p>),
    Advanced(AdvancedHeuristic<'p>),
}

impl<'p> RushHourHeuristic<'p> {
    pub fn zero(_puzzle: &'p RushHourPuzzle) -> Self {
        Self::Zero
    }
    pub fn blocking(puzzle: &'p RushHourPuzzle) -> Self {
        Self::Blocking(BlockingHeuristic::new(puzzle))
    }
    pub fn advanced(puzzle: &'p RushHourPuzzle) -> Self {
        Self::Advanced(AdvancedHeuristic::new(puzzle))
    }
}

impl Heuristic<RushHourPuzzle, RushHourState, MoveCount> for RushHourHeuristic<'_> {
    #[inline(always)]
    fn h(&self, s: &RushHourState) -> MoveCount {
        match self {
            Self::Zero => 0,
            Self::Blocking(h) => h.h(s),
            Self::Advanced(h) => h.h(s),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Zero => "zero",
            Self::Blocking(h) => h.name(),
            Self::Advanced(h) => h.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::algorithms::astar::astar;
    use crate::algorithms::bfs;

    fn puzzle(s: &str) -> RushHourPuzzle {
        RushHourPuzzle::try_from(s).unwrap()
    }

    /// One vertical car between the goal car and the exit.
    fn pair() -> RushHourPuzzle {
        puzzle(indoc! {"
            pair
            ....
            ...A
            .XXA
            ....
        "})
    }

    /// `A` is held by `B` above and `C` below.
    fn stuck() -> RushHourPuzzle {
        puzzle(indoc! {"
            stuck
            ...B.
            ...B.
            XX.A.
            ...A.
            ...CC
        "})
    }

    /// `H` sits above both blocking cars.
    fn shared() -> RushHourPuzzle {
        puzzle(indoc! {"
            shared
            .....
            ...HH
            XX.AB
            ...AB
            ...GG
        "})
    }

    fn traffic() -> RushHourPuzzle {
        puzzle(indoc! {"
            traffic
            ..AAA.
            ...D.B
            CXXD.B
            C..D..
            C...FF
            ..GG..
        "})
    }

    #[test]
    fn zero_at_goal() {
        let p = puzzle(indoc! {"
            done
            .A..
            .AXX
            ....
            ....
        "});
        assert!(p.is_goal(p.initial()));

        assert_eq!(BlockingHeuristic::new(&p).h(p.initial()), 0);
        assert_eq!(AdvancedHeuristic::new(&p).h(p.initial()), 0);
        assert_eq!(RushHourHeuristic::zero(&p).h(p.initial()), 0);
    }

    #[test]
    fn single_blocking_car() {
        let p = pair();
        let blocking = BlockingHeuristic::new(&p);
        assert_eq!(blocking.h(p.initial()), 2);
        assert_eq!(AdvancedHeuristic::new(&p).h(p.initial()), 2);

        let report = astar(&p, &blocking);
        let path = report.path.unwrap();
        let moved: Vec<usize> = path
            .states
            .windows(2)
            .map(|step| {
                (0..p.num_cars())
                    .find(|&car| step[0].positions()[car] != step[1].positions()[car])
                    .unwrap()
            })
            .collect();

        // `A` moves out of the way once, then the goal car leaves.
        assert_eq!(moved, vec![1, 0]);
        assert_eq!(path.states[1].position(1), 0);
        assert!(p.is_goal(path.end().unwrap()));
    }

    #[test]
    fn stuck_car_counts_twice() {
        let p = stuck();
        assert_eq!(BlockingHeuristic::new(&p).h(p.initial()), 2);
        assert_eq!(AdvancedHeuristic::new(&p).h(p.initial()), 3);
        assert_eq!(bfs::shortest_depth(&p, p.initial()), Some(3));

        let report = astar(&p, &AdvancedHeuristic::new(&p));
        assert_eq!(report.depth(), Some(3));
    }

    #[test]
    fn horizontal_car_unsticks_only_once() {
        let p = shared();
        // `B` is stuck thanks to `H` and `G`, `A` can't count on `H` anymore.
        assert_eq!(AdvancedHeuristic::new(&p).h(p.initial()), 4);
        assert_eq!(BlockingHeuristic::new(&p).h(p.initial()), 3);
        assert_eq!(bfs::shortest_depth(&p, p.initial()), Some(4));
    }

    #[test]
    fn heuristics_are_admissible() {
        for p in [pair(), stuck(), shared(), traffic()] {
            let blocking = BlockingHeuristic::new(&p);
            let advanced = AdvancedHeuristic::new(&p);

            for s in bfs::distances(&p, p.initial()).into_keys() {
                let Some(remaining) = bfs::shortest_depth(&p, &s) else {
                    continue;
                };
                let remaining = remaining as MoveCount;
                let (b, a) = (blocking.h(&s), advanced.h(&s));

                assert!(b <= remaining, "{}: blocking {b} > {remaining}", p.name());
                assert!(a <= remaining, "{}: advanced {a} > {remaining}", p.name());
                assert!(b <= a, "{}: advanced {a} < blocking {b}", p.name());
                assert_eq!(p.is_goal(&s), a == 0);
                assert_eq!(p.is_goal(&s), b == 0);
            }
        }
    }

    #[test]
    fn all_heuristics_agree_on_depth() {
        for p in [pair(), stuck(), shared(), traffic()] {
            let depths: Vec<Option<usize>> = [
                RushHourHeuristic::zero(&p),
                RushHourHeuristic::blocking(&p),
                RushHourHeuristic::advanced(&p),
            ]
            .iter()
            .map(|h| astar(&p, h).depth())
            .collect();

            let expected = bfs::shortest_depth(&p, p.initial());
            assert!(depths.iter().all(|d| *d == expected), "{}: {depths:?}", p.name());
        }
    }

    #[test]
    fn sample_files() {
        let pattern = concat!(env!("CARGO_MANIFEST_DIR"), "/data/puzzles/rush_hour/*.txt");
        let mut loaded = 0;
        for path in glob::glob(pattern).unwrap().filter_map(Result::ok) {
            for p in RushHourPuzzle::load_all(&path).unwrap() {
                let expected = bfs::shortest_depth(&p, p.initial());
                assert!(expected.is_some(), "{} has no solution", p.name());
                for h in [
                    RushHourHeuristic::zero(&p),
                    RushHourHeuristic::blocking(&p),
                    RushHourHeuristic::advanced(&p),
                ] {
                    assert_eq!(astar(&p, &h).depth(), expected, "{} {}", p.name(), h.name());
                }
                loaded += 1;
            }
        }
        assert!(loaded >= 6);
    }

    #[test]
    fn better_heuristics_generate_less() {
        let p = traffic();
        let zero = astar(&p, &RushHourHeuristic::zero(&p));
        let advanced = astar(&p, &RushHourHeuristic::advanced(&p));
        assert!(advanced.stats.expanded <= zero.stats.expanded);
    }

    #[test]
    fn boxed_in_goal_car_has_no_solution() {
        // `A` covers the goal row wherever it goes.
        let p = puzzle(indoc! {"
            boxed
            ...A
            XX.A
            ...A
            BB..
        "});
        let reachable = bfs::distances(&p, p.initial()).len();

        let h = RushHourHeuristic::blocking(&p);
        let mut search = crate::algorithms::astar::AStarSearch::new(&p, &h);
        assert_eq!(search.run(), None);
        assert_eq!(search.expanded_len(), reachable);
        assert_eq!(search.stats().expanded, reachable);
    }

    #[test]
    fn goal_row_is_scanned_per_cell() {
        // `B` can never leave the goal row. It counts for both of its cells,
        // and its stuck test looks down column 2 and finds `V` and `W`.
        let p = puzzle(indoc! {"
            walled
            ..V..
            ..V..
            XX.BB
            ..W..
            ..W..
        "});
        assert_eq!(AdvancedHeuristic::new(&p).h(p.initial()), 5);
        assert_eq!(BlockingHeuristic::new(&p).h(p.initial()), 1);

        let h = RushHourHeuristic::advanced(&p);
        assert_eq!(astar(&p, &h).path, None);
    }
}
