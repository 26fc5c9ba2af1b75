//! A 3×3×3 Rubik's Cube as 6 faces of 9 coloured stickers.
//!
//! Faces go in the order front, left, right, up, down, back. Stickers within a
//! face are numbered in reading order, and colours are `0..6`.

use std::path::Path;

use log::debug;
use rand::Rng;
use thiserror::Error;

use crate::cost::MoveCount;
use crate::space::Puzzle;
use crate::space::State;

pub const NUM_FACES: usize = 6;
pub const FACE_SIZE: usize = 9;
pub const NUM_COLORS: u8 = NUM_FACES as u8;
pub const FACE_NAMES: [&str; NUM_FACES] = ["f", "l", "r", "u", "d", "b"];

pub type Face = [u8; FACE_SIZE];

/// For each face, the stickers of its neighbours that travel with it.
///
/// Entries are `[face, sticker, sticker, sticker]`, listed in the order they
/// cycle through on a clockwise turn.
const TURNS: [[[usize; 4]; 4]; NUM_FACES] = [
    // front: left, up, right, down
    [[1, 8, 5, 2], [3, 6, 7, 8], [2, 0, 3, 6], [4, 2, 1, 0]],
    // left: front, down, back, up
    [[0, 0, 3, 6], [4, 0, 3, 6], [5, 8, 5, 2], [3, 0, 3, 6]],
    // right: front, up, back, down
    [[0, 8, 5, 2], [3, 8, 5, 2], [5, 0, 3, 6], [4, 8, 5, 2]],
    // up: front, left, back, right
    [[0, 2, 1, 0], [1, 2, 1, 0], [5, 2, 1, 0], [2, 2, 1, 0]],
    // down: front, right, back, left
    [[0, 6, 7, 8], [2, 6, 7, 8], [5, 6, 7, 8], [1, 6, 7, 8]],
    // back: left, down, right, up
    [[1, 0, 3, 6], [4, 6, 7, 8], [2, 8, 5, 2], [3, 2, 1, 0]],
];

/// Where each sticker of a face ends up after a clockwise turn.
const CW_ROTATION: [usize; FACE_SIZE] = [2, 5, 8, 1, 4, 7, 0, 3, 6];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Direction {
    #[display("cw")]
    Clockwise,
    #[display("ccw")]
    CounterClockwise,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Clockwise, Direction::CounterClockwise];
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CubeError {
    #[error("Sticker {sticker} on face '{face}' has colour {color}, expected 0..{}", NUM_COLORS)]
    ColorOutOfRange {
        face: &'static str,
        sticker: usize,
        color: u8,
    },
    #[error("Colour {color} appears {count} times, expected {}", FACE_SIZE)]
    WrongColorCount { color: u8, count: usize },
}

/// The colours of every sticker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CubeState {
    faces: [Face; NUM_FACES],
}

impl State for CubeState {}

impl CubeState {
    /// Face `i` painted in colour `i`.
    pub fn solved() -> Self {
        let mut faces = [[0; FACE_SIZE]; NUM_FACES];
        for (color, face) in faces.iter_mut().enumerate() {
            *face = [color as u8; FACE_SIZE];
        }
        Self { faces }
    }

    /// Checks every colour is in range and shows up exactly on 9 stickers.
    pub fn from_faces(faces: [Face; NUM_FACES]) -> Result<Self, CubeError> {
        let mut counts = [0usize; NUM_FACES];
        for (f, face) in faces.iter().enumerate() {
            for (sticker, &color) in face.iter().enumerate() {
                if color >= NUM_COLORS {
                    return Err(CubeError::ColorOutOfRange {
                        face: FACE_NAMES[f],
                        sticker,
                        color,
                    });
                }
                counts[color as usize] += 1;
            }
        }
        if let Some((color, &count)) = counts.iter().enumerate().find(|(_, c)| **c != FACE_SIZE) {
            return Err(CubeError::WrongColorCount {
                color: color as u8,
                count,
            });
        }
        Ok(Self { faces })
    }

    pub fn faces(&self) -> &[Face; NUM_FACES] {
        &self.faces
    }

    pub fn face(&self, i: usize) -> &Face {
        &self.faces[i]
    }

    /// Every face has a single colour, and no two faces share it.
    pub fn is_solved(&self) -> bool {
        let mut seen = [false; NUM_FACES];
        for face in &self.faces {
            let color = face[0];
            if face.iter().any(|c| *c != color) {
                return false;
            }
            match seen.get_mut(color as usize) {
                Some(s) => *s = true,
                None => return false,
            }
        }
        seen.iter().all(|s| *s)
    }

    /// A quarter turn of face `face`.
    #[must_use]
    pub fn turn(&self, face: usize, direction: Direction) -> Self {
        let mut faces = self.faces;
        let original = &self.faces[face];
        let turned = &mut faces[face];
        for (i, &j) in CW_ROTATION.iter().enumerate() {
            match direction {
                Direction::Clockwise => turned[j] = original[i],
                Direction::CounterClockwise => turned[i] = original[j],
            }
        }

        let sides = &TURNS[face];
        let n = sides.len();
        for to in 0..n {
            let from = match direction {
                Direction::Clockwise => (to + n - 1) % n,
                Direction::CounterClockwise => (to + 1) % n,
            };
            let (to, from) = (&sides[to], &sides[from]);
            for k in 1..4 {
                faces[to[0]][to[k]] = self.faces[from[0]][from[k]];
            }
        }

        Self { faces }
    }

    /// Both quarter turns of every face, in face order, clockwise first.
    pub fn successors(&self) -> Vec<Self> {
        (0..NUM_FACES)
            .flat_map(|face| Direction::ALL.map(|d| self.turn(face, d)))
            .collect()
    }

    /// `turns` random quarter turns away from solved.
    pub fn scramble<R: Rng>(rng: &mut R, turns: usize) -> Self {
        (0..turns).fold(Self::solved(), |s, _| {
            let face = rng.random_range(0..NUM_FACES);
            let direction = if rng.random_bool(0.5) {
                Direction::Clockwise
            } else {
                Direction::CounterClockwise
            };
            s.turn(face, direction)
        })
    }
}

impl std::fmt::Display for CubeState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (name, face) in FACE_NAMES.iter().zip(&self.faces) {
            writeln!(f, "{name}")?;
            for row in face.chunks(3) {
                writeln!(f, "{} {} {}", row[0], row[1], row[2])?;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct RubiksCube {
    name: String,
    initial: CubeState,
}

impl RubiksCube {
    pub fn new(name: impl Into<String>, faces: [Face; NUM_FACES]) -> Result<Self, CubeError> {
        Ok(Self {
            name: name.into(),
            initial: CubeState::from_faces(faces)?,
        })
    }

    pub fn from_state(name: impl Into<String>, initial: CubeState) -> Self {
        Self {
            name: name.into(),
            initial,
        }
    }

    /// A cube `turns` random quarter turns away from solved.
    pub fn scrambled<R: Rng>(name: impl Into<String>, rng: &mut R, turns: usize) -> Self {
        let name = name.into();
        let initial = CubeState::scramble(rng, turns);
        debug!("Scrambled '{name}' with {turns} turns");
        Self { name, initial }
    }

    /// Loads every cube in a file.
    pub fn load_all(p: &Path) -> Result<Vec<Self>, CubeParseError> {
        let text = std::fs::read_to_string(p).map_err(|e| CubeParseError::IOError {
            p: p.to_path_buf(),
            e,
        })?;
        parse_cubes(&text)
    }
}

impl Puzzle<CubeState, MoveCount> for RubiksCube {
    fn name(&self) -> &str {
        &self.name
    }

    fn initial(&self) -> &CubeState {
        &self.initial
    }

    #[inline(always)]
    fn is_goal(&self, s: &CubeState) -> bool {
        s.is_solved()
    }

    fn successors(&self, s: &CubeState) -> Vec<CubeState> {
        s.successors()
    }

    fn valid(&self, s: &CubeState) -> bool {
        CubeState::from_faces(s.faces).is_ok()
    }
}

/// Writes the cube back in the format `parse_cubes` reads.
impl std::fmt::Display for RubiksCube {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{}", self.name)?;
        for (name, face) in FACE_NAMES.iter().zip(self.initial.faces()) {
            write!(f, "{name} ")?;
            for c in face {
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A cube state along with how many turns it took to get there.
///
/// The depth is bookkeeping only, it's ignored when comparing and hashing so
/// the same configuration found at different depths is still a duplicate.
#[derive(Clone, Debug)]
pub struct CappedState {
    pub cube: CubeState,
    pub depth: u16,
}

impl PartialEq for CappedState {
    fn eq(&self, other: &Self) -> bool {
        self.cube == other.cube
    }
}
impl Eq for CappedState {}
impl std::hash::Hash for CappedState {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.cube.hash(state);
    }
}
impl State for CappedState {}

/// A cube that can't be turned more than `max_depth` times.
///
/// A* itself has no depth limit, and without a good heuristic a deep scramble
/// would keep it busy for a very long time.
#[derive(Debug)]
pub struct CappedCube<'p> {
    cube: &'p RubiksCube,
    max_depth: u16,
    initial: CappedState,
}

impl<'p> CappedCube<'p> {
    pub fn new(cube: &'p RubiksCube, max_depth: u16) -> Self {
        Self {
            cube,
            max_depth,
            initial: CappedState {
                cube: cube.initial().clone(),
                depth: 0,
            },
        }
    }

    pub fn max_depth(&self) -> u16 {
        self.max_depth
    }
}

impl Puzzle<CappedState, MoveCount> for CappedCube<'_> {
    fn name(&self) -> &str {
        self.cube.name()
    }

    fn initial(&self) -> &CappedState {
        &self.initial
    }

    fn is_goal(&self, s: &CappedState) -> bool {
        s.cube.is_solved()
    }

    fn successors(&self, s: &CappedState) -> Vec<CappedState> {
        if s.depth >= self.max_depth {
            return vec![];
        }
        s.cube
            .successors()
            .into_iter()
            .map(|cube| CappedState {
                cube,
                depth: s.depth + 1,
            })
            .collect()
    }

    fn valid(&self, s: &CappedState) -> bool {
        s.depth <= self.max_depth && self.cube.valid(&s.cube)
    }
}

#[derive(Debug, Error)]
pub enum CubeParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Cube '{name}' has {found} faces, expected {}", NUM_FACES)]
    MissingFaces { name: String, found: usize },
    #[error("Line {line}: unknown face '{face}'")]
    UnknownFace { line: usize, face: String },
    #[error("Line {line}: face '{face}' given twice")]
    DuplicateFace { line: usize, face: String },
    #[error("Line {line}: expected {} stickers, found {found}", FACE_SIZE)]
    WrongStickerCount { line: usize, found: usize },
    #[error("Line {line}, column {column}: invalid colour '{ch}'")]
    InvalidCharacter { ch: char, line: usize, column: usize },
    #[error("Cube '{name}' is invalid: {e}")]
    Invalid { name: String, e: CubeError },
    #[error("I/O error when loading '{p}': {e}")]
    IOError {
        p: std::path::PathBuf,
        e: std::io::Error,
    },
}

/// Parses every cube in `s`.
///
/// Cubes are separated by blank lines. Each one is its name followed by one
/// line per face, `<face> <9 colours>`, with faces in any order. Colours are
/// the digits `0` to `5` and may be spaced out.
pub fn parse_cubes(s: &str) -> Result<Vec<RubiksCube>, CubeParseError> {
    let mut cubes = vec![];
    let mut block: Vec<(usize, &str)> = vec![];

    for (i, line) in s.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            if !block.is_empty() {
                cubes.push(parse_block(&block)?);
                block.clear();
            }
        } else {
            block.push((i + 1, line));
        }
    }
    if !block.is_empty() {
        cubes.push(parse_block(&block)?);
    }

    if cubes.is_empty() {
        return Err(CubeParseError::EmptyInput);
    }
    Ok(cubes)
}

fn parse_block(block: &[(usize, &str)]) -> Result<RubiksCube, CubeParseError> {
    let Some(((_, name), rows)) = block.split_first() else {
        return Err(CubeParseError::EmptyInput);
    };
    let name = name.to_string();
    if rows.len() != NUM_FACES {
        return Err(CubeParseError::MissingFaces {
            name,
            found: rows.len(),
        });
    }

    let mut faces: [Option<Face>; NUM_FACES] = [None; NUM_FACES];
    for &(line, row) in rows {
        let (face, stickers) = row.split_once(char::is_whitespace).unwrap_or((row, ""));
        let Some(f) = FACE_NAMES.iter().position(|n| *n == face) else {
            return Err(CubeParseError::UnknownFace {
                line,
                face: face.to_string(),
            });
        };
        if faces[f].is_some() {
            return Err(CubeParseError::DuplicateFace {
                line,
                face: face.to_string(),
            });
        }
        faces[f] = Some(parse_stickers(line, face.len() + 1, stickers)?);
    }

    // Six distinct faces out of six names, all present.
    let faces = faces.map(|f| f.unwrap_or_default());
    RubiksCube::new(name.clone(), faces).map_err(|e| CubeParseError::Invalid { name, e })
}

/// Reads the colours of one face, `offset` is the column `stickers` starts at.
fn parse_stickers(line: usize, offset: usize, stickers: &str) -> Result<Face, CubeParseError> {
    let mut face = [0; FACE_SIZE];
    let mut found = 0;
    for (i, ch) in stickers.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let color = ch
            .to_digit(10)
            .filter(|d| *d < NUM_COLORS as u32)
            .ok_or(CubeParseError::InvalidCharacter {
                ch,
                line,
                column: offset + i + 1,
            })?;
        if found < FACE_SIZE {
            face[found] = color as u8;
        }
        found += 1;
    }
    if found != FACE_SIZE {
        return Err(CubeParseError::WrongStickerCount { line, found });
    }
    Ok(face)
}

impl std::convert::TryFrom<&str> for RubiksCube {
    type Error = CubeParseError;

    /// Parses a single cube, ignoring any that follow.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        parse_cubes(s)?
            .into_iter()
            .next()
            .ok_or(CubeParseError::EmptyInput)
    }
}

impl std::convert::TryFrom<&Path> for RubiksCube {
    type Error = CubeParseError;

    /// Loads the first cube in a file.
    fn try_from(p: &Path) -> Result<Self, Self::Error> {
        Self::load_all(p)?
            .into_iter()
            .next()
            .ok_or(CubeParseError::EmptyInput)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;
    use rustc_hash::FxHashSet;

    use super::*;
    use crate::algorithms::astar::astar;
    use crate::algorithms::bfs;
    use crate::heuristic::ZeroHeuristic;

    #[test]
    fn solved_cube_successors() {
        let cube = RubiksCube::from_state("solved", CubeState::solved());
        assert!(cube.is_goal(cube.initial()));

        let children = cube.successors(cube.initial());
        assert_eq!(children.len(), 12);
        for child in &children {
            assert!(!cube.is_goal(child));
            assert!(cube.valid(child));
            assert_eq!(cube.cost(cube.initial(), child), 1);
        }
        let distinct: FxHashSet<&CubeState> = children.iter().collect();
        assert_eq!(distinct.len(), 12);
    }

    #[test]
    fn successors_come_in_face_order() {
        let s = CubeState::solved();
        let children = s.successors();
        assert_eq!(children[0], s.turn(0, Direction::Clockwise));
        assert_eq!(children[1], s.turn(0, Direction::CounterClockwise));
        assert_eq!(children[11], s.turn(5, Direction::CounterClockwise));
    }

    #[test]
    fn turns_undo() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let s = CubeState::scramble(&mut rng, 20);
        for face in 0..NUM_FACES {
            let there = s.turn(face, Direction::Clockwise);
            assert_eq!(there.turn(face, Direction::CounterClockwise), s);

            let around = (0..4).fold(s.clone(), |t, _| t.turn(face, Direction::Clockwise));
            assert_eq!(around, s);
        }
    }

    #[test]
    fn front_turn_moves_neighbours() {
        let s = CubeState::solved().turn(0, Direction::Clockwise);
        // The front face itself stays uniform.
        assert_eq!(s.face(0), &[0; FACE_SIZE]);
        assert_eq!(s.face(5), &[5; FACE_SIZE]);
        // Up takes the stickers from left.
        assert_eq!(&s.face(3)[6..9], &[1, 1, 1]);
        // Left takes the ones from down.
        assert_eq!([s.face(1)[2], s.face(1)[5], s.face(1)[8]], [4, 4, 4]);
    }

    #[test]
    fn scrambles_stay_valid() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for turns in [0, 1, 5, 30] {
            let cube = RubiksCube::scrambled(format!("s{turns}"), &mut rng, turns);
            assert!(cube.valid(cube.initial()));
            assert!(CubeState::from_faces(*cube.initial().faces()).is_ok());
        }
    }

    #[test]
    fn scrambles_are_reproducible() {
        let a = CubeState::scramble(&mut ChaCha8Rng::seed_from_u64(5), 12);
        let b = CubeState::scramble(&mut ChaCha8Rng::seed_from_u64(5), 12);
        assert_eq!(a, b);
    }

    #[test]
    fn solves_short_scrambles() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for turns in 0..=2 {
            let cube = RubiksCube::scrambled("short", &mut rng, turns);
            let report = astar(&cube, &ZeroHeuristic::new(&cube));
            let depth = report.depth().unwrap();
            assert!(depth <= turns);
            assert_eq!(Some(depth), bfs::shortest_depth(&cube, cube.initial()));
        }
    }

    #[test]
    fn depth_cap() {
        let s = CubeState::solved()
            .turn(0, Direction::Clockwise)
            .turn(3, Direction::Clockwise);
        let cube = RubiksCube::from_state("two", s);

        let capped = CappedCube::new(&cube, 1);
        let report = astar(&capped, &ZeroHeuristic::new(&capped));
        assert!(report.path.is_none());
        // The root and its 12 children, none of which is expanded further.
        assert_eq!(report.stats.generated, 13);
        assert_eq!(report.stats.expanded, 13);

        let capped = CappedCube::new(&cube, 2);
        let report = astar(&capped, &ZeroHeuristic::new(&capped));
        assert_eq!(report.depth(), Some(2));
    }

    #[test]
    fn invalid_colors() {
        let mut faces = *CubeState::solved().faces();
        faces[2][4] = 6;
        assert_eq!(
            CubeState::from_faces(faces),
            Err(CubeError::ColorOutOfRange {
                face: "r",
                sticker: 4,
                color: 6
            })
        );

        let mut faces = *CubeState::solved().faces();
        faces[0][0] = 1;
        assert_eq!(
            CubeState::from_faces(faces),
            Err(CubeError::WrongColorCount { color: 0, count: 8 })
        );
        assert_eq!(
            RubiksCube::new("miscounted", faces).map(|c| c.name().to_string()),
            Err(CubeError::WrongColorCount { color: 0, count: 8 })
        );

        let cube = RubiksCube::new("solved", *CubeState::solved().faces()).unwrap();
        assert_eq!(cube.name(), "solved");
        assert!(cube.is_goal(cube.initial()));
        assert_eq!(
            RubiksCube::from_state(String::from("again"), cube.initial().clone()).name(),
            "again"
        );
    }

    #[test]
    fn parse_and_display() {
        let s = indoc! {"
            one-turn
            f 000000000
            l 114114114
            r 322322322
            u 333333111
            d 222444444
            b 555555555
        "};
        let cube = RubiksCube::try_from(s).unwrap();
        assert_eq!(cube.name(), "one-turn");
        assert_eq!(cube.initial(), &CubeState::solved().turn(0, Direction::Clockwise));
        assert_eq!(cube.to_string(), s);

        let report = astar(&cube, &ZeroHeuristic::new(&cube));
        assert_eq!(report.depth(), Some(1));
    }

    #[test]
    fn parse_any_face_order() {
        let cubes = parse_cubes(indoc! {"
            solved
            b 5 5 5 5 5 5 5 5 5
            d 4 4 4 4 4 4 4 4 4
            u 3 3 3 3 3 3 3 3 3
            r 2 2 2 2 2 2 2 2 2
            l 1 1 1 1 1 1 1 1 1
            f 0 0 0 0 0 0 0 0 0

            again
            f 000000000
            l 111111111
            r 222222222
            u 333333333
            d 444444444
            b 555555555
        "})
        .unwrap();
        assert_eq!(cubes.len(), 2);
        for cube in &cubes {
            assert!(cube.is_goal(cube.initial()));
        }
    }

    #[test]
    fn sample_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/puzzles/cube/sample.txt");
        let cubes = RubiksCube::load_all(&path).unwrap();
        let depths: Vec<Option<usize>> = cubes
            .iter()
            .map(|c| astar(c, &ZeroHeuristic::new(c)).depth())
            .collect();
        assert_eq!(depths, vec![Some(0), Some(1)]);

        let first = RubiksCube::try_from(path.as_path()).unwrap();
        assert_eq!(first.name(), cubes[0].name());
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(parse_cubes("\n\n"), Err(CubeParseError::EmptyInput)));
        assert!(matches!(
            RubiksCube::load_all(Path::new("/nonexistent/cubes.txt")),
            Err(CubeParseError::IOError { .. })
        ));
        assert!(matches!(
            parse_cubes("short\nf 000000000\n"),
            Err(CubeParseError::MissingFaces { found: 1, .. })
        ));

        let faces = "l 111111111\nr 222222222\nu 333333333\nd 444444444\nb 555555555";
        assert!(matches!(
            parse_cubes(&format!("bad\nx 000000000\n{faces}")),
            Err(CubeParseError::UnknownFace { line: 2, .. })
        ));
        assert!(matches!(
            parse_cubes(&format!("bad\nl 000000000\n{faces}")),
            Err(CubeParseError::DuplicateFace { line: 3, .. })
        ));
        assert!(matches!(
            parse_cubes(&format!("bad\nf 00000000\n{faces}")),
            Err(CubeParseError::WrongStickerCount { line: 2, found: 8 })
        ));
        assert!(matches!(
            parse_cubes(&format!("bad\nf 0000a0000\n{faces}")),
            Err(CubeParseError::InvalidCharacter {
                ch: 'a',
                line: 2,
                column: 7
            })
        ));
        assert!(matches!(
            parse_cubes(&format!("bad\nf 000000001\n{faces}")),
            Err(CubeParseError::Invalid {
                e: CubeError::WrongColorCount { color: 0, count: 8 },
                ..
            })
        ));
    }
}
