use std::fmt;
use std::str::FromStr;

use crate::backtracking::Backtracking;
use crate::bruteforce::Bruteforce;
use crate::cnf::{CNFVar, CNF};
use crate::dpll::Dpll;
use crate::error::Result;
use crate::log_targets;
use crate::outcome::{try_timed, Budget, Outcome};
use crate::SATSolution;

/// A complete search procedure for CNF formulae.
///
/// Implementations receive validated input: `num_variables >= 1` and every
/// literal lies in `[1, num_variables]`. They return the result together with
/// the number of search nodes they visited, or [`crate::Error::Interrupted`]
/// once `budget` runs out.
pub trait Solver {
    fn search<C: AsRef<[CNFVar]>>(
        &self,
        clauses: &[C],
        num_variables: usize,
        budget: &Budget,
    ) -> Result<(SATSolution, u64)>;
}

/// The search strategies offered for SAT and 3-SAT
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SatStrategy {
    BruteForce,
    Backtracking,
    Dpll,
}

impl SatStrategy {
    pub const ALL: [SatStrategy; 3] = [SatStrategy::BruteForce, SatStrategy::Backtracking, SatStrategy::Dpll];

    pub fn name(&self) -> &'static str {
        match self {
            SatStrategy::BruteForce => "brute",
            SatStrategy::Backtracking => "backtrack",
            SatStrategy::Dpll => "dpll",
        }
    }
}

impl fmt::Display for SatStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SatStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "brute" | "bruteforce" | "brute_force" => Ok(SatStrategy::BruteForce),
            "backtrack" | "backtracking" => Ok(SatStrategy::Backtracking),
            "dpll" => Ok(SatStrategy::Dpll),
            other => Err(format!("unknown SAT strategy `{}`", other)),
        }
    }
}

/// Decides a formula with the given strategy.
///
/// Fails with [`crate::Error::InvalidInstance`] before any search if the
/// formula has no variables or mentions a variable outside
/// `[1, num_variables]`.
pub fn solve(formula: &CNF, strategy: SatStrategy) -> Result<Outcome<SATSolution>> {
    solve_within(formula, strategy, &Budget::unlimited())
}

/// Like [`solve`], giving up with [`crate::Error::Interrupted`] once `budget`
/// runs out
pub fn solve_within(formula: &CNF, strategy: SatStrategy, budget: &Budget) -> Result<Outcome<SATSolution>> {
    formula.validate()?;
    run(&formula.clauses, formula.num_variables, strategy, budget)
}

pub(crate) fn run<C: AsRef<[CNFVar]>>(
    clauses: &[C],
    num_variables: usize,
    strategy: SatStrategy,
    budget: &Budget,
) -> Result<Outcome<SATSolution>> {
    log::debug!(
        target: log_targets::SOLVE,
        "{}: {} clauses over {} variables",
        strategy,
        clauses.len(),
        num_variables
    );

    let outcome = try_timed(|| match strategy {
        SatStrategy::BruteForce => Bruteforce.search(clauses, num_variables, budget),
        SatStrategy::Backtracking => Backtracking.search(clauses, num_variables, budget),
        SatStrategy::Dpll => Dpll.search(clauses, num_variables, budget),
    })?;

    log::debug!(
        target: log_targets::SOLVE,
        "{}: {} after {} nodes in {:?}",
        strategy,
        if outcome.solution.is_sat() { "satisfiable" } else { "unsatisfiable" },
        outcome.stats.nodes,
        outcome.stats.elapsed
    );
    Ok(outcome)
}

/// Checks a total valuation against every clause
pub fn check_valuation<C: AsRef<[CNFVar]>>(clauses: &[C], val: &[bool]) -> bool {
    clauses.iter()
        .all(|clause| clause.as_ref().iter().any(|var| var.sign() == val[var.id() - 1]))
}
