//! Summaries over batches of searches.
//!
//! Searches are compared by how many nodes they generate, and by the
//! effective branching factor that number implies at the solution depth.

use crate::algorithms::astar::SearchReport;
use crate::cost::Cost;
use crate::space::State;

const BISECTION_TOLERANCE: f64 = 1e-9;

/// `1 + b + b² + … + bᵈ`
fn tree_size(b: f64, depth: usize) -> f64 {
    let mut total = 0.0;
    let mut level = 1.0;
    for _ in 0..=depth {
        total += level;
        level *= b;
    }
    total
}

/// The branching factor of a uniform tree of depth `depth` with `nodes`
/// nodes, that is, the `b` solving `nodes = 1 + b + b² + … + bᵈ`.
///
/// A solution at the root says nothing about branching, so depth 0 gives 0.
///
/// ```
/// use puzzle_search::stats::effective_branching_factor;
///
/// assert!((effective_branching_factor(1 + 2 + 4 + 8, 3) - 2.0).abs() < 1e-6);
/// assert!((effective_branching_factor(13, 1) - 12.0).abs() < 1e-6);
/// assert_eq!(effective_branching_factor(1, 0), 0.0);
/// ```
pub fn effective_branching_factor(nodes: usize, depth: usize) -> f64 {
    if depth == 0 {
        return 0.0;
    }

    let nodes = nodes as f64;
    // `tree_size` grows with b, and tree_size(nodes) >= nodes already.
    let (mut lo, mut hi) = (0.0, nodes.max(1.0));
    while hi - lo > BISECTION_TOLERANCE {
        let mid = (lo + hi) / 2.0;
        if tree_size(mid, depth) < nodes {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Population standard deviation.
///
/// ```
/// use puzzle_search::stats::std_dev;
///
/// assert_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), Some(2.0));
/// assert_eq!(std_dev(&[]), None);
/// ```
pub fn std_dev(xs: &[f64]) -> Option<f64> {
    let m = mean(xs)?;
    let variance = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64;
    Some(variance.sqrt())
}

/// What the summary keeps from a search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub generated: usize,
    /// `None` when the search failed.
    pub depth: Option<usize>,
}

impl RunSummary {
    pub fn branching_factor(&self) -> Option<f64> {
        self.depth
            .map(|d| effective_branching_factor(self.generated, d))
    }
}

impl<St, C> From<&SearchReport<St, C>> for RunSummary
where
    St: State,
    C: Cost,
{
    fn from(report: &SearchReport<St, C>) -> Self {
        Self {
            generated: report.stats.generated,
            depth: report.depth(),
        }
    }
}

/// Mean and spread of the difference in generated nodes between two
/// heuristics, over the puzzles both of them solved.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDifference {
    pub first: String,
    pub second: String,
    pub samples: usize,
    pub mean: f64,
    pub std_dev: f64,
}

/// One row per puzzle, one column per heuristic.
#[derive(Clone, Debug, Default)]
pub struct SummaryTable {
    heuristics: Vec<String>,
    rows: Vec<(String, Vec<RunSummary>)>,
}

const NAME_WIDTH: usize = 20;
const CELL_WIDTH: usize = 22;

impl SummaryTable {
    pub fn new(heuristics: Vec<String>) -> Self {
        Self {
            heuristics,
            rows: vec![],
        }
    }

    pub fn heuristics(&self) -> &[String] {
        &self.heuristics
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Adds the runs on a puzzle, in the same order as the heuristics.
    pub fn push(&mut self, puzzle: String, runs: Vec<RunSummary>) {
        debug_assert_eq!(runs.len(), self.heuristics.len());
        self.rows.push((puzzle, runs));
    }

    /// Every pair of heuristics, in column order.
    pub fn node_differences(&self) -> Vec<NodeDifference> {
        let n = self.heuristics.len();
        let mut differences = vec![];
        for i in 0..n {
            for j in (i + 1)..n {
                let samples: Vec<f64> = self
                    .rows
                    .iter()
                    .filter(|(_, runs)| runs[i].depth.is_some() && runs[j].depth.is_some())
                    .map(|(_, runs)| runs[i].generated as f64 - runs[j].generated as f64)
                    .collect();
                let (Some(m), Some(s)) = (mean(&samples), std_dev(&samples)) else {
                    continue;
                };
                differences.push(NodeDifference {
                    first: self.heuristics[i].clone(),
                    second: self.heuristics[j].clone(),
                    samples: samples.len(),
                    mean: m,
                    std_dev: s,
                });
            }
        }
        differences
    }
}

impl std::fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:NAME_WIDTH$}", "")?;
        for h in &self.heuristics {
            write!(f, "|{h:^CELL_WIDTH$}")?;
        }
        writeln!(f, "|")?;

        write!(f, "{:NAME_WIDTH$}", "name")?;
        for _ in &self.heuristics {
            write!(f, "| {:>8} {:>4} {:>6} ", "nodes", "dpth", "br.fac")?;
        }
        writeln!(f, "|")?;

        write!(f, "{:-<NAME_WIDTH$}", "")?;
        for _ in &self.heuristics {
            write!(f, "+{:-<CELL_WIDTH$}", "")?;
        }
        writeln!(f, "+")?;

        for (name, runs) in &self.rows {
            write!(f, "{name:NAME_WIDTH$}")?;
            for run in runs {
                match (run.depth, run.branching_factor()) {
                    (Some(depth), Some(b)) => {
                        write!(f, "| {:>8} {depth:>4} {b:>6.3} ", run.generated)?
                    }
                    _ => write!(f, "|{:^CELL_WIDTH$}", "** search failed **")?,
                }
            }
            writeln!(f, "|")?;
        }

        for d in self.node_differences() {
            writeln!(
                f,
                "{} - {}: mean {:.2}, std dev {:.2} over {} puzzles",
                d.first, d.second, d.mean, d.std_dev, d.samples
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn solved(generated: usize, depth: usize) -> RunSummary {
        RunSummary {
            generated,
            depth: Some(depth),
        }
    }

    #[test]
    fn branching_factor_of_a_chain() {
        // 1 + 1 + 1 + 1
        assert!((effective_branching_factor(4, 3) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn branching_factor_solves_tree_size() {
        for (nodes, depth) in [(100, 4), (5_000, 9), (2, 1), (37, 2)] {
            let b = effective_branching_factor(nodes, depth);
            assert!((tree_size(b, depth) - nodes as f64).abs() < 1e-4, "{nodes} {depth}: {b}");
        }
    }

    #[test]
    fn mean_of_nothing() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(std_dev(&[3.0]), Some(0.0));
    }

    #[test]
    fn differences_skip_failed_runs() {
        let mut table = SummaryTable::new(vec!["zero".into(), "blocking".into()]);
        table.push("a".into(), vec![solved(10, 2), solved(6, 2)]);
        table.push("b".into(), vec![solved(20, 3), solved(10, 3)]);
        table.push(
            "c".into(),
            vec![
                RunSummary {
                    generated: 99,
                    depth: None,
                },
                solved(3, 1),
            ],
        );

        let differences = table.node_differences();
        assert_eq!(
            differences,
            vec![NodeDifference {
                first: "zero".into(),
                second: "blocking".into(),
                samples: 2,
                mean: 7.0,
                std_dev: 3.0,
            }]
        );
    }

    #[test]
    fn render() {
        let mut table = SummaryTable::new(vec!["zero".into()]);
        table.push("A00".into(), vec![solved(13, 1)]);
        table.push(
            "B11".into(),
            vec![RunSummary {
                generated: 5,
                depth: None,
            }],
        );

        let expected = indoc! {"
                                |         zero         |
            name                |    nodes dpth br.fac |
            --------------------+----------------------+
            A00                 |       13    1 12.000 |
            B11                 | ** search failed **  |
        "};
        assert_eq!(table.to_string(), expected);
    }
}
