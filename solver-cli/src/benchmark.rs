use std::fmt;
use std::fmt::Write as FmtWrite;
use std::str::FromStr;
use std::time::{Duration, Instant};

use itertools::Itertools;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

use npc_solver::{
    generators::{random_cnf, random_subset_sum, random_three_cnf, Feasibility},
    sat_solver, subset_sum_solver, three_sat_solver, Budget, SatStrategy, SearchStats, SubsetSumInstance,
    SubsetSumStrategy, CNF,
};

pub const DEFAULT_SIZES: [usize; 3] = [5, 10, 15];
pub const DEFAULT_INSTANCES: usize = 5;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Largest element of generated Subset-Sum instances
const MAX_ELEMENT: i64 = 1000;
/// Clause/variable ratio of generated formulae, near the 3-SAT phase transition
const CLAUSE_RATIO: f64 = 4.26;
const MAX_CLAUSE_WIDTH: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Problem {
    Sat,
    ThreeSat,
    SubsetSum,
}

impl Problem {
    pub fn name(&self) -> &'static str {
        match self {
            Problem::Sat => "sat",
            Problem::ThreeSat => "3sat",
            Problem::SubsetSum => "subset-sum",
        }
    }
}

impl FromStr for Problem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sat" => Ok(Problem::Sat),
            "3sat" => Ok(Problem::ThreeSat),
            "subset-sum" => Ok(Problem::SubsetSum),
            other => Err(format!("unknown problem `{}`", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategies {
    Sat(Vec<SatStrategy>),
    SubsetSum(Vec<SubsetSumStrategy>),
}

impl Strategies {
    /// Every strategy of the problem
    pub fn all(problem: Problem) -> Strategies {
        match problem {
            Problem::Sat | Problem::ThreeSat => Strategies::Sat(SatStrategy::ALL.to_vec()),
            Problem::SubsetSum => Strategies::SubsetSum(SubsetSumStrategy::ALL.to_vec()),
        }
    }

    pub fn parse<'a>(problem: Problem, names: impl IntoIterator<Item = &'a str>) -> Result<Strategies, String> {
        Ok(match problem {
            Problem::Sat | Problem::ThreeSat => Strategies::Sat(names.into_iter().map(str::parse).collect::<Result<_, _>>()?),
            Problem::SubsetSum => Strategies::SubsetSum(names.into_iter().map(str::parse).collect::<Result<_, _>>()?),
        })
    }
}

pub struct BenchmarkPlan {
    pub problem: Problem,
    pub sizes: Vec<usize>,
    pub instances: usize,
    pub strategies: Strategies,
    pub seed: u64,
    /// Wall-clock limit of a single solve
    pub timeout: Option<Duration>,
    /// Node limit of a single solve
    pub max_nodes: Option<u64>,
}

impl BenchmarkPlan {
    /// A fresh budget for one solve
    fn budget(&self) -> Budget {
        let budget = match self.timeout {
            Some(limit) => Budget::timeout(limit),
            None => Budget::unlimited(),
        };
        match self.max_nodes {
            Some(max_nodes) => budget.with_max_nodes(max_nodes),
            None => budget,
        }
    }
}

/// One solve of one generated instance
#[derive(Clone, Debug)]
pub struct Record {
    pub problem: Problem,
    pub strategy: &'static str,
    pub size: usize,
    pub instance: usize,
    /// `None` when the solve ran out of budget
    pub feasible: Option<bool>,
    pub timed_out: bool,
    pub nodes: u64,
    pub seconds: f64,
}

enum Instance {
    Formula(CNF),
    Numbers(SubsetSumInstance),
}

fn generate(problem: Problem, size: usize, seed: u64) -> npc_solver::Result<Instance> {
    let mut rng = StdRng::seed_from_u64(seed);
    let num_clauses = (size as f64 * CLAUSE_RATIO).round() as usize;
    let instance = match problem {
        Problem::Sat => Instance::Formula(random_cnf(&mut rng, size, num_clauses, 1, MAX_CLAUSE_WIDTH.min(size))?),
        Problem::ThreeSat => Instance::Formula(random_three_cnf(&mut rng, size, num_clauses)?.to_cnf()),
        Problem::SubsetSum => Instance::Numbers(random_subset_sum(&mut rng, size, MAX_ELEMENT, Feasibility::Random)?),
    };
    Ok(instance)
}

/// Seed of one generated instance; distinct for every size and index below
/// `2^32`
fn instance_seed(base: u64, size: usize, index: usize) -> u64 {
    base ^ ((size as u64) << 32) ^ index as u64
}

/// Solves one instance with every requested strategy. A solve that runs out
/// of budget is recorded as timed out; the remaining strategies that
/// disagree on feasibility abort the whole run.
fn measure(plan: &BenchmarkPlan, size: usize, index: usize) -> Result<Vec<Record>, String> {
    let instance = generate(plan.problem, size, instance_seed(plan.seed, size, index))
        .map_err(|error| error.to_string())?;

    let record = |strategy: &'static str, result: npc_solver::Result<(bool, SearchStats)>, started: Instant| {
        let (feasible, nodes, seconds) = match result {
            Ok((feasible, stats)) => (Some(feasible), stats.nodes, stats.elapsed.as_secs_f64()),
            Err(npc_solver::Error::Interrupted { nodes }) => {
                log::info!("{} timed out on size {} instance {} after {} nodes", strategy, size, index, nodes);
                (None, nodes, started.elapsed().as_secs_f64())
            }
            Err(error) => return Err(error),
        };
        Ok(Record {
            problem: plan.problem,
            strategy,
            size,
            instance: index,
            feasible,
            timed_out: feasible.is_none(),
            nodes,
            seconds,
        })
    };

    let records = match (&instance, &plan.strategies) {
        (Instance::Formula(formula), Strategies::Sat(strategies)) => strategies.iter()
            .map(|&strategy| {
                let started = Instant::now();
                let result = match plan.problem {
                    Problem::ThreeSat => three_sat_solver::solve_within(formula, strategy, &plan.budget()),
                    _ => sat_solver::solve_within(formula, strategy, &plan.budget()),
                };
                record(strategy.name(), result.map(|outcome| (outcome.solution.is_sat(), outcome.stats)), started)
            })
            .collect::<Result<Vec<Record>, npc_solver::Error>>(),
        (Instance::Numbers(numbers), Strategies::SubsetSum(strategies)) => strategies.iter()
            .map(|&strategy| {
                let started = Instant::now();
                let result = subset_sum_solver::solve_within(numbers, strategy, &plan.budget());
                record(strategy.name(), result.map(|outcome| (outcome.solution.is_found(), outcome.stats)), started)
            })
            .collect::<Result<Vec<Record>, npc_solver::Error>>(),
        _ => return Err(format!("strategies do not match problem {}", plan.problem.name())),
    }
    .map_err(|error| error.to_string())?;

    if !records.iter().filter_map(|record| record.feasible).all_equal() {
        return Err(format!(
            "strategies disagree on {} instance {} of size {}: {}",
            plan.problem.name(),
            index,
            size,
            records.iter().map(|record| format!("{}={}", record.strategy, feasible_cell(record))).join(", ")
        ));
    }
    Ok(records)
}

fn feasible_cell(record: &Record) -> &'static str {
    match record.feasible {
        Some(true) => "true",
        Some(false) => "false",
        None => "-",
    }
}

/// Generates and solves every instance of the plan, independent instances
/// in parallel. Records come back ordered by size, instance and strategy.
pub fn run(plan: &BenchmarkPlan) -> Result<Vec<Record>, String> {
    let jobs: Vec<(usize, usize)> = plan.sizes.iter()
        .flat_map(|&size| (0..plan.instances).map(move |index| (size, index)))
        .collect();
    log::info!("benchmarking {} on {} instances", plan.problem.name(), jobs.len());

    let records = jobs.par_iter()
        .map(|&(size, index)| measure(plan, size, index))
        .collect::<Result<Vec<Vec<Record>>, String>>()?;
    Ok(records.into_iter().flatten().collect())
}

pub fn to_csv(records: &[Record]) -> String {
    let mut out = String::from("problem,strategy,size,instance,feasible,timed_out,nodes,seconds\n");
    for r in records {
        // writing into a String cannot fail
        let _ = writeln!(
            &mut out,
            "{},{},{},{},{},{},{},{:.6}",
            r.problem.name(), r.strategy, r.size, r.instance, feasible_cell(r), r.timed_out, r.nodes, r.seconds
        );
    }
    out
}

/// Aligned plain text table of the records
pub struct Table<'a>(pub &'a [Record]);

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<11} {:<10} {:>5} {:>8} {:>9} {:>9} {:>14} {:>12}",
            "problem", "strategy", "size", "instance", "feasible", "timed_out", "nodes", "seconds"
        )?;
        for r in self.0 {
            writeln!(
                f,
                "{:<11} {:<10} {:>5} {:>8} {:>9} {:>9} {:>14} {:>12.6}",
                r.problem.name(), r.strategy, r.size, r.instance, feasible_cell(r), r.timed_out, r.nodes, r.seconds
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(problem: Problem, sizes: Vec<usize>) -> BenchmarkPlan {
        BenchmarkPlan {
            problem,
            sizes,
            instances: 3,
            strategies: Strategies::all(problem),
            seed: DEFAULT_SEED,
            timeout: None,
            max_nodes: None,
        }
    }

    #[test]
    fn instance_seeds_do_not_collide() {
        let seeds: Vec<u64> = [5, 6, 10, 15]
            .iter()
            .flat_map(|&size| (0..5).map(move |index| instance_seed(DEFAULT_SEED, size, index)))
            .collect();
        assert!(seeds.iter().all_unique());
        assert_ne!(instance_seed(DEFAULT_SEED, 5, 1), instance_seed(DEFAULT_SEED, 6, 0));
    }

    #[test]
    fn unlimited_runs_agree_and_finish() {
        let records = run(&plan(Problem::SubsetSum, vec![4, 8])).unwrap();
        assert_eq!(records.len(), 2 * 3 * SubsetSumStrategy::ALL.len());
        assert!(records.iter().all(|record| !record.timed_out && record.feasible.is_some()));
    }

    #[test]
    fn expired_deadline_times_out_every_solve() {
        for problem in [Problem::ThreeSat, Problem::SubsetSum] {
            let mut plan = plan(problem, vec![10]);
            plan.timeout = Some(Duration::ZERO);
            let records = run(&plan).unwrap();
            assert!(records.iter().all(|record| record.timed_out && record.feasible.is_none()));
        }
    }

    #[test]
    fn node_cap_stops_brute_force_after_the_first_candidate() {
        let mut plan = plan(Problem::ThreeSat, vec![12]);
        plan.strategies = Strategies::Sat(vec![SatStrategy::BruteForce]);
        // a candidate costs 13 nodes, so only the all-false one fits
        plan.max_nodes = Some(13);
        let records = run(&plan).unwrap();
        assert!(records.iter().any(|record| record.timed_out));
        assert!(records.iter().filter(|record| record.timed_out).all(|record| record.nodes == 26));
    }

    #[test]
    fn csv_reports_timeouts() {
        let mut plan = plan(Problem::SubsetSum, vec![6]);
        plan.max_nodes = Some(0);
        let csv = to_csv(&run(&plan).unwrap());
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("problem,strategy,size,instance,feasible,timed_out,nodes,seconds"));
        assert!(lines.all(|line| line.contains(",-,true,")));
    }
}
