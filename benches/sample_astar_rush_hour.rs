use std::time::Duration;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use glob::glob;
use hrsw::Stopwatch;
use human_duration::human_duration;

use puzzle_search::algorithms::astar::astar;
use puzzle_search::heuristic::Heuristic;
use puzzle_search::problems::rush_hour::RushHourPuzzle;
use puzzle_search::problems::rush_hour_heuristics::RushHourHeuristic;
use puzzle_search::space::Puzzle;

/// Maximum time willing to wait for a single benchmark instance.
/// Experiments are carried out at least 5s and at least 100 times, so running a
/// 1s instance takes 1m40s.
const MAX_INSTANCE_TIME: Duration = Duration::from_secs(1);

fn compare_heuristics(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rush Hour A*");

    for path in glob("data/puzzles/rush_hour/*.txt")
        .unwrap()
        .filter_map(std::result::Result::ok)
    {
        for puzzle in RushHourPuzzle::load_all(&path).unwrap() {
            let heuristics = [
                RushHourHeuristic::zero(&puzzle),
                RushHourHeuristic::blocking(&puzzle),
                RushHourHeuristic::advanced(&puzzle),
            ];
            for heuristic in &heuristics {
                let name = heuristic.name();

                let mut stopwatch = Stopwatch::new_started();
                let report = astar(&puzzle, heuristic);
                stopwatch.stop();
                let elapsed = stopwatch.elapsed();
                println!(
                    "{} with {name}: depth {:?}, {} nodes",
                    puzzle.name(),
                    report.depth(),
                    report.stats.generated
                );
                if elapsed > MAX_INSTANCE_TIME {
                    log::warn!(
                        "Skipping {} as it takes too long with {name} ({})",
                        puzzle.name(),
                        human_duration(&elapsed)
                    );
                    continue;
                }

                group.bench_with_input(BenchmarkId::new(name, puzzle.name()), &puzzle, |b, p| {
                    b.iter(|| astar(p, heuristic).stats.generated)
                });
            }
        }
    }
    group.finish();
}

criterion_group!(benches, compare_heuristics);
criterion_main!(benches);
