//! Rush Hour, the sliding-car puzzle.
//!
//! Cars sit on a square grid and only slide along their own axis. Car 0 is
//! the goal car. It is always horizontal, and the puzzle is solved once it
//! touches the right wall of its row.

use std::collections::BTreeMap;
use std::path::Path;

use derive_more::Display;
use smallvec::SmallVec;
use thiserror::Error;

use crate::cost::MoveCount;
use crate::space::Puzzle;
use crate::space::State;

/// Index of a car within its puzzle. The goal car is 0.
pub type CarIndex = u8;

pub const GOAL_CAR: CarIndex = 0;
const GOAL_SYMBOL: char = 'X';
const EMPTY_SYMBOL: char = '.';
const MAX_GRID_SIZE: usize = u8::MAX as usize;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Orientation {
    #[display("horizontal")]
    Horizontal,
    #[display("vertical")]
    Vertical,
}

/// The parts of a car that never change.
///
/// `fixed` is the row of a horizontal car or the column of a vertical one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Car {
    pub symbol: char,
    pub orientation: Orientation,
    pub size: u8,
    pub fixed: u8,
}

impl Car {
    pub fn horizontal(symbol: char, row: u8, size: u8) -> Self {
        Self {
            symbol,
            orientation: Orientation::Horizontal,
            size,
            fixed: row,
        }
    }
    pub fn vertical(symbol: char, column: u8, size: u8) -> Self {
        Self {
            symbol,
            orientation: Orientation::Vertical,
            size,
            fixed: column,
        }
    }

    #[inline(always)]
    pub fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }

    /// The `(x, y)` cell at offset `along` of this car's axis.
    #[inline(always)]
    fn cell(&self, along: u8) -> (u8, u8) {
        match self.orientation {
            Orientation::Horizontal => (along, self.fixed),
            Orientation::Vertical => (self.fixed, along),
        }
    }

    /// Cells covered when the car's back is at `position`.
    fn cells(&self, position: u8) -> impl Iterator<Item = (u8, u8)> + '_ {
        (position..position + self.size).map(move |along| self.cell(along))
    }
}

/// Where every car is along its axis.
///
/// That is the leftmost column of horizontal cars and the topmost row of
/// vertical ones, indexed by `CarIndex`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RushHourState {
    positions: SmallVec<[u8; 16]>,
}
impl State for RushHourState {}

impl RushHourState {
    pub fn new(positions: &[u8]) -> Self {
        Self {
            positions: SmallVec::from_slice(positions),
        }
    }

    #[inline(always)]
    pub fn position(&self, car: CarIndex) -> u8 {
        self.positions[car as usize]
    }

    pub fn positions(&self) -> &[u8] {
        &self.positions
    }

    fn with_position(&self, car: usize, position: u8) -> Self {
        let mut next = self.clone();
        next.positions[car] = position;
        next
    }
}

/// Occupancy of every cell, `at(x, y)` being the car covering it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<CarIndex>>,
}

impl Grid {
    fn empty(size: u8) -> Self {
        let size = size as usize;
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    #[inline(always)]
    pub fn at(&self, x: u8, y: u8) -> Option<CarIndex> {
        debug_assert!((x as usize) < self.size && (y as usize) < self.size);
        self.cells[(x as usize) * self.size + (y as usize)]
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn place(&mut self, car_index: CarIndex, car: &Car, position: u8) -> Result<(), RushHourError> {
        if position as usize + car.size as usize > self.size {
            return Err(RushHourError::OutOfBounds {
                car: car_index,
                position,
            });
        }
        for (x, y) in car.cells(position) {
            let cell = &mut self.cells[(x as usize) * self.size + (y as usize)];
            if let Some(other) = *cell {
                return Err(RushHourError::Overlap {
                    car: car_index,
                    other,
                    x,
                    y,
                });
            }
            *cell = Some(car_index);
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RushHourError {
    #[error("A puzzle needs at least the goal car")]
    NoCars,
    #[error("Grid of size {size} is too large (max {})", MAX_GRID_SIZE)]
    GridTooLarge { size: usize },
    #[error("Too many cars ({count})")]
    TooManyCars { count: usize },
    #[error("The goal car must be horizontal")]
    GoalCarVertical,
    #[error("Car {car} has size {size}, cars need at least 2 cells")]
    CarTooShort { car: CarIndex, size: u8 },
    #[error("Car {car} does not fit in the grid at position {position}")]
    OutOfBounds { car: CarIndex, position: u8 },
    #[error("Car {car} overlaps car {other} at ({x},{y})")]
    Overlap {
        car: CarIndex,
        other: CarIndex,
        x: u8,
        y: u8,
    },
    #[error("Expected positions for {expected} cars, got {found}")]
    WrongCarCount { expected: usize, found: usize },
}

/// One Rush Hour puzzle instance.
#[derive(Clone, Debug)]
pub struct RushHourPuzzle {
    name: String,
    grid_size: u8,
    cars: Vec<Car>,
    initial: RushHourState,
}

impl RushHourPuzzle {
    /// Builds a puzzle, `positions` being where each car starts.
    pub fn new(
        name: impl Into<String>,
        grid_size: usize,
        cars: Vec<Car>,
        positions: &[u8],
    ) -> Result<Self, RushHourError> {
        if grid_size > MAX_GRID_SIZE {
            return Err(RushHourError::GridTooLarge { size: grid_size });
        }
        if cars.len() > CarIndex::MAX as usize {
            return Err(RushHourError::TooManyCars { count: cars.len() });
        }
        let goal_car = cars.first().ok_or(RushHourError::NoCars)?;
        if goal_car.is_vertical() {
            return Err(RushHourError::GoalCarVertical);
        }
        for (i, car) in cars.iter().enumerate() {
            if car.size < 2 {
                return Err(RushHourError::CarTooShort {
                    car: i as CarIndex,
                    size: car.size,
                });
            }
            if car.fixed as usize >= grid_size {
                return Err(RushHourError::OutOfBounds {
                    car: i as CarIndex,
                    position: positions.get(i).copied().unwrap_or_default(),
                });
            }
        }

        let puzzle = Self {
            name: name.into(),
            grid_size: grid_size as u8,
            cars,
            initial: RushHourState::new(positions),
        };
        puzzle.try_grid(&puzzle.initial)?;
        Ok(puzzle)
    }

    pub fn grid_size(&self) -> u8 {
        self.grid_size
    }
    pub fn num_cars(&self) -> usize {
        self.cars.len()
    }
    pub fn car(&self, car: CarIndex) -> &Car {
        &self.cars[car as usize]
    }
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }
    /// The row the goal car drives along.
    pub fn goal_row(&self) -> u8 {
        self.cars[GOAL_CAR as usize].fixed
    }

    /// Lays the cars of `state` on a grid, rejecting impossible states.
    pub fn try_grid(&self, state: &RushHourState) -> Result<Grid, RushHourError> {
        if state.positions.len() != self.cars.len() {
            return Err(RushHourError::WrongCarCount {
                expected: self.cars.len(),
                found: state.positions.len(),
            });
        }
        let mut grid = Grid::empty(self.grid_size);
        for (i, (car, &position)) in self.cars.iter().zip(&state.positions).enumerate() {
            grid.place(i as CarIndex, car, position)?;
        }
        Ok(grid)
    }

    /// Lays the cars of `state` on a grid.
    ///
    /// `state` must come from this puzzle.
    pub fn grid(&self, state: &RushHourState) -> Grid {
        debug_assert!(self.valid(state));
        let mut grid = Grid::empty(self.grid_size);
        for (i, (car, &position)) in self.cars.iter().zip(&state.positions).enumerate() {
            for (x, y) in car.cells(position) {
                grid.cells[(x as usize) * grid.size + (y as usize)] = Some(i as CarIndex);
            }
        }
        grid
    }

    /// Renders `state` in the same format puzzles are loaded from.
    pub fn display<'a>(&'a self, state: &'a RushHourState) -> RushHourBoard<'a> {
        RushHourBoard {
            puzzle: self,
            state,
        }
    }

    /// Loads every puzzle in a file.
    pub fn load_all(p: &Path) -> Result<Vec<Self>, RushHourParseError> {
        let text = std::fs::read_to_string(p).map_err(|e| RushHourParseError::IOError {
            p: p.to_path_buf(),
            e,
        })?;
        parse_puzzles(&text)
    }
}

impl Puzzle<RushHourState, MoveCount> for RushHourPuzzle {
    fn name(&self) -> &str {
        &self.name
    }

    fn initial(&self) -> &RushHourState {
        &self.initial
    }

    /// The goal car touches the right wall.
    #[inline(always)]
    fn is_goal(&self, s: &RushHourState) -> bool {
        let goal_car = &self.cars[GOAL_CAR as usize];
        s.position(GOAL_CAR) + goal_car.size == self.grid_size
    }

    /// Slides every car by every free distance, one car per move.
    ///
    /// Cars go in index order, backwards before forwards, nearest first.
    fn successors(&self, s: &RushHourState) -> Vec<RushHourState> {
        let grid = self.grid(s);
        let n = self.grid_size;
        let mut v = Vec::<RushHourState>::with_capacity(2 * self.cars.len());

        for (i, car) in self.cars.iter().enumerate() {
            let free = |along: u8| {
                let (x, y) = car.cell(along);
                grid.at(x, y).is_none()
            };
            let p = s.positions[i];

            let mut back = p;
            while back > 0 && free(back - 1) {
                back -= 1;
                v.push(s.with_position(i, back));
            }

            let mut front = p;
            while front + car.size < n && free(front + car.size) {
                front += 1;
                v.push(s.with_position(i, front));
            }
        }
        v
    }

    fn valid(&self, s: &RushHourState) -> bool {
        self.try_grid(s).is_ok()
    }
}

/// `Display` adapter for a state of a puzzle.
pub struct RushHourBoard<'a> {
    puzzle: &'a RushHourPuzzle,
    state: &'a RushHourState,
}

impl std::fmt::Display for RushHourBoard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let grid = self.puzzle.grid(self.state);
        for y in 0..self.puzzle.grid_size {
            for x in 0..self.puzzle.grid_size {
                let symbol = match grid.at(x, y) {
                    Some(car) => self.puzzle.car(car).symbol,
                    None => EMPTY_SYMBOL,
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for RushHourPuzzle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{}", self.name)?;
        write!(f, "{}", self.display(&self.initial))
    }
}

#[derive(Debug, Error)]
pub enum RushHourParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Puzzle '{name}' has no grid")]
    MissingGrid { name: String },
    #[error("Line {line}: expected {expected} cells, found {found}")]
    NotSquare {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}, column {column}: invalid character '{ch}'")]
    InvalidCharacter { ch: char, line: usize, column: usize },
    #[error("Puzzle '{name}': car '{symbol}' is not a straight line of 2 or more cells")]
    BadCarShape { name: String, symbol: char },
    #[error("Puzzle '{name}' has no goal car '{}'", GOAL_SYMBOL)]
    MissingGoalCar { name: String },
    #[error("Puzzle '{name}' is invalid: {e}")]
    Invalid { name: String, e: RushHourError },
    #[error("I/O error when loading '{p}': {e}")]
    IOError {
        p: std::path::PathBuf,
        e: std::io::Error,
    },
}

/// Parses every puzzle in `s`.
///
/// Puzzles are separated by blank lines. Each starts with its name, followed
/// by the rows of a square grid. `.` is an empty cell, `X` the goal car, and
/// any other letter or digit a car covering all cells with that symbol.
pub fn parse_puzzles(s: &str) -> Result<Vec<RushHourPuzzle>, RushHourParseError> {
    let mut puzzles = vec![];
    let mut block: Vec<(usize, &str)> = vec![];

    for (i, line) in s.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            if !block.is_empty() {
                puzzles.push(parse_block(&block)?);
                block.clear();
            }
        } else {
            block.push((i + 1, line));
        }
    }
    if !block.is_empty() {
        puzzles.push(parse_block(&block)?);
    }

    if puzzles.is_empty() {
        return Err(RushHourParseError::EmptyInput);
    }
    Ok(puzzles)
}

/// Parses one `(line number, line)` block.
fn parse_block(block: &[(usize, &str)]) -> Result<RushHourPuzzle, RushHourParseError> {
    let Some(((_, name), rows)) = block.split_first() else {
        return Err(RushHourParseError::EmptyInput);
    };
    let name = name.trim().to_string();
    if rows.is_empty() {
        return Err(RushHourParseError::MissingGrid { name });
    }

    let size = rows.len();
    if size > MAX_GRID_SIZE {
        return Err(RushHourParseError::Invalid {
            name,
            e: RushHourError::GridTooLarge { size },
        });
    }

    // Cells covered by each symbol, in reading order.
    let mut cells_by_symbol: BTreeMap<char, Vec<(u8, u8)>> = BTreeMap::new();
    for (y, (line_number, row)) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != size {
            return Err(RushHourParseError::NotSquare {
                line: *line_number,
                expected: size,
                found,
            });
        }
        for (x, ch) in row.chars().enumerate() {
            match ch {
                EMPTY_SYMBOL => {}
                ch if ch.is_ascii_alphanumeric() => {
                    cells_by_symbol
                        .entry(ch)
                        .or_default()
                        .push((x as u8, y as u8));
                }
                ch => {
                    return Err(RushHourParseError::InvalidCharacter {
                        ch,
                        line: *line_number,
                        column: x + 1,
                    });
                }
            }
        }
    }
    let goal_cells = cells_by_symbol
        .remove(&GOAL_SYMBOL)
        .ok_or_else(|| RushHourParseError::MissingGoalCar { name: name.clone() })?;

    let mut cars = vec![];
    let mut positions = vec![];
    for (symbol, cells) in std::iter::once((GOAL_SYMBOL, goal_cells)).chain(cells_by_symbol) {
        let (car, position) = car_from_cells(symbol, &cells).ok_or_else(|| {
            RushHourParseError::BadCarShape {
                name: name.clone(),
                symbol,
            }
        })?;
        cars.push(car);
        positions.push(position);
    }

    RushHourPuzzle::new(name.clone(), size, cars, &positions)
        .map_err(|e| RushHourParseError::Invalid { name, e })
}

/// Recovers a car from the cells it covers, given in reading order.
fn car_from_cells(symbol: char, cells: &[(u8, u8)]) -> Option<(Car, u8)> {
    let &[(x0, y0), .., (x1, y1)] = cells else {
        return None;
    };
    let size = u8::try_from(cells.len()).ok()?;

    let (car, position) = if y0 == y1 {
        (Car::horizontal(symbol, y0, size), x0)
    } else if x0 == x1 {
        (Car::vertical(symbol, x0, size), y0)
    } else {
        return None;
    };

    // Contiguous, in order, along the axis.
    let contiguous = cells
        .iter()
        .zip(car.cells(position))
        .all(|(cell, expected)| *cell == expected);
    contiguous.then_some((car, position))
}

impl std::convert::TryFrom<&str> for RushHourPuzzle {
    type Error = RushHourParseError;

    /// Parses a single puzzle, ignoring any that follow.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        parse_puzzles(s)?
            .into_iter()
            .next()
            .ok_or(RushHourParseError::EmptyInput)
    }
}

impl std::convert::TryFrom<&Path> for RushHourPuzzle {
    type Error = RushHourParseError;

    /// Loads the first puzzle in a file.
    fn try_from(p: &Path) -> Result<Self, Self::Error> {
        Self::load_all(p)?
            .into_iter()
            .next()
            .ok_or(RushHourParseError::EmptyInput)
    }
}
