use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use anstream::println;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use hrsw::Stopwatch;
use human_duration::human_duration;
use owo_colors::OwoColorize;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use puzzle_search::algorithms::astar::AStarSearch;
use puzzle_search::algorithms::astar::SearchReport;
use puzzle_search::cost::Cost;
use puzzle_search::cost::MoveCount;
use puzzle_search::heuristic::Heuristic;
use puzzle_search::heuristic::ZeroHeuristic;
use puzzle_search::problems::rubiks_cube::CappedCube;
use puzzle_search::problems::rubiks_cube::CappedState;
use puzzle_search::problems::rubiks_cube::RubiksCube;
use puzzle_search::problems::rush_hour::RushHourPuzzle;
use puzzle_search::problems::rush_hour::RushHourState;
use puzzle_search::problems::rush_hour_heuristics::RushHourHeuristic;
use puzzle_search::space::Puzzle;
use puzzle_search::space::State;
use puzzle_search::stats::RunSummary;
use puzzle_search::stats::SummaryTable;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(long_version = puzzle_search::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Org file to also write the runs to
    #[arg(short, long, env = "PUZZLE_REPORT", global = true)]
    pub output: Option<PathBuf>,

    /// Print search memory usage after each run
    #[arg(long, global = true)]
    pub memory_stats: bool,

    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Solve Rush Hour boards with each heuristic
    RushHour {
        /// Puzzle files, boards separated by blank lines
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(
            short = 'H',
            long = "heuristic",
            value_enum,
            default_values_t = [HeuristicKind::Zero, HeuristicKind::Blocking, HeuristicKind::Advanced]
        )]
        heuristics: Vec<HeuristicKind>,

        /// Print every board along the solutions
        #[arg(long)]
        print_paths: bool,
    },
    /// Solve Rubik's Cubes, loaded from files or scrambled
    Cube {
        /// Cube files
        files: Vec<PathBuf>,

        /// Also solve cubes this many random turns away from solved
        #[arg(long)]
        scramble: Option<usize>,
        #[arg(long, default_value_t = 0u64)]
        seed: u64,
        #[arg(long, default_value_t = 1usize)]
        instances: usize,

        /// Give up on solutions longer than this
        #[arg(long, env = "CUBE_MAX_DEPTH", default_value_t = 5u16)]
        max_depth: u16,

        /// Print every cube along the solutions
        #[arg(long)]
        print_paths: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, derive_more::Display)]
pub enum HeuristicKind {
    #[display("zero")]
    Zero,
    #[display("blocking")]
    Blocking,
    #[display("advanced")]
    Advanced,
}

impl HeuristicKind {
    fn build(self, puzzle: &RushHourPuzzle) -> RushHourHeuristic<'_> {
        match self {
            HeuristicKind::Zero => RushHourHeuristic::zero(puzzle),
            HeuristicKind::Blocking => RushHourHeuristic::blocking(puzzle),
            HeuristicKind::Advanced => RushHourHeuristic::advanced(puzzle),
        }
    }
}

/// Org file the runs get written to, besides the terminal.
struct OrgReport {
    out: Option<BufWriter<File>>,
    memory_stats: bool,
}

impl OrgReport {
    fn new(output: Option<&Path>, memory_stats: bool) -> std::io::Result<Self> {
        let out = match output {
            Some(p) => {
                println!("Logging to {:?}", p.yellow());
                Some(BufWriter::new(File::create(p)?))
            }
            None => None,
        };
        Ok(Self { out, memory_stats })
    }

    fn line(&mut self, s: std::fmt::Arguments) -> std::io::Result<()> {
        match &mut self.out {
            Some(out) => writeln!(out, "{s}"),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.out {
            Some(out) => out.flush(),
            None => Ok(()),
        }
    }
}

/// Runs A* once, reporting how it went.
fn solve<P, H, St, C>(
    org: &mut OrgReport,
    puzzle: &P,
    heuristic: &H,
    show: impl Fn(&St) -> String,
    print_paths: bool,
) -> std::io::Result<SearchReport<St, C>>
where
    P: Puzzle<St, C>,
    H: Heuristic<P, St, C>,
    St: State,
    C: Cost,
{
    let mut search = AStarSearch::new(puzzle, heuristic);
    let mut stopwatch = Stopwatch::new_started();
    let path = search.run();
    stopwatch.stop();
    let elapsed = human_duration(&stopwatch.elapsed());
    let stats = search.stats();

    println!("{}", heuristic.name().bold());
    org.line(format_args!("*** {}", heuristic.name()))?;
    match &path {
        Some(path) => {
            println!(
                "  depth: {}, nodes: {}, time: {}",
                path.depth().green(),
                stats.generated,
                elapsed
            );
            org.line(format_args!(
                "- depth :: {}\n- nodes :: {}\n- time :: {elapsed}",
                path.depth(),
                stats.generated
            ))?;
            if print_paths {
                org.line(format_args!("#+begin_example"))?;
                for s in &path.states {
                    let s = show(s);
                    println!("{s}");
                    org.line(format_args!("{s}"))?;
                }
                org.line(format_args!("#+end_example"))?;
            }
        }
        None => {
            println!(
                "  {} nodes: {}, time: {}",
                "no solution,".red(),
                stats.generated,
                elapsed
            );
            org.line(format_args!(
                "- no solution\n- nodes :: {}\n- time :: {elapsed}",
                stats.generated
            ))?;
        }
    }
    if org.memory_stats {
        search.write_memory_stats(std::io::stdout())?;
    }

    Ok(SearchReport { path, stats })
}

fn rush_hour(
    org: &mut OrgReport,
    files: &[PathBuf],
    heuristics: &[HeuristicKind],
    print_paths: bool,
) -> std::io::Result<SummaryTable> {
    let mut table = SummaryTable::new(heuristics.iter().map(|h| h.to_string()).collect());

    org.line(format_args!("* Rush Hour"))?;
    for file in files {
        let puzzles = RushHourPuzzle::load_all(file).map_err(std::io::Error::other)?;
        log::info!("Loaded {} puzzles from {file:?}", puzzles.len());

        for puzzle in &puzzles {
            println!("=================================================");
            println!("puzzle = {}", puzzle.name().cyan());
            org.line(format_args!("** {}\n#+begin_example\n{puzzle}#+end_example", puzzle.name()))?;

            let mut runs = Vec::with_capacity(heuristics.len());
            for kind in heuristics {
                let heuristic = kind.build(puzzle);
                let report: SearchReport<RushHourState, MoveCount> = solve(
                    org,
                    puzzle,
                    &heuristic,
                    |s: &RushHourState| puzzle.display(s).to_string(),
                    print_paths,
                )?;
                runs.push(RunSummary::from(&report));
            }
            table.push(puzzle.name().to_string(), runs);
        }
    }
    Ok(table)
}

fn cube(
    org: &mut OrgReport,
    files: &[PathBuf],
    scramble: Option<usize>,
    seed: u64,
    instances: usize,
    max_depth: u16,
    print_paths: bool,
) -> std::io::Result<SummaryTable> {
    let mut cubes = vec![];
    for file in files {
        cubes.extend(RubiksCube::load_all(file).map_err(std::io::Error::other)?);
    }
    if let Some(turns) = scramble {
        for instance in 0..instances {
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(instance as u64));
            let name = format!("scramble-{turns}-{instance}");
            cubes.push(RubiksCube::scrambled(name, &mut rng, turns));
        }
    }
    if cubes.is_empty() {
        return Err(std::io::Error::other(
            "No cubes to solve, pass some files or --scramble",
        ));
    }

    let mut table = SummaryTable::new(vec!["zero".to_string()]);
    org.line(format_args!("* Rubik's Cube"))?;
    for cube in &cubes {
        println!("=================================================");
        println!("cube = {}", cube.name().cyan());
        org.line(format_args!("** {}\n#+begin_example\n{cube}#+end_example", cube.name()))?;

        let capped = CappedCube::new(cube, max_depth);
        let heuristic = ZeroHeuristic::new(&capped);
        let report: SearchReport<CappedState, MoveCount> = solve(
            org,
            &capped,
            &heuristic,
            |s: &CappedState| s.cube.to_string(),
            print_paths,
        )?;
        if report.path.is_none() {
            log::warn!(
                "'{}' needs more than {} turns, or can't be solved",
                cube.name(),
                capped.max_depth()
            );
        }
        table.push(cube.name().to_string(), vec![RunSummary::from(&report)]);
    }
    Ok(table)
}

fn main() -> std::io::Result<()> {
    env_logger::init();

    let args = Args::parse();
    args.color.write_global();
    let mut org = OrgReport::new(args.output.as_deref(), args.memory_stats)?;

    let table = match &args.command {
        Command::RushHour {
            files,
            heuristics,
            print_paths,
        } => rush_hour(&mut org, files, heuristics, *print_paths)?,
        Command::Cube {
            files,
            scramble,
            seed,
            instances,
            max_depth,
            print_paths,
        } => cube(
            &mut org,
            files,
            *scramble,
            *seed,
            *instances,
            *max_depth,
            *print_paths,
        )?,
    };

    println!();
    println!("{table}");
    org.line(format_args!("* Summary\n#+begin_example\n{table}#+end_example"))?;
    org.flush()
}
