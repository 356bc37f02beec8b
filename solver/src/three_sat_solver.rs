use std::convert::TryFrom;

use crate::cnf::CNF;
use crate::error::Result;
use crate::outcome::{Budget, Outcome};
use crate::sat_solver::{run, SatStrategy};
use crate::three_cnf::ThreeCNF;
use crate::SATSolution;

/// Decides a general formula that is expected to be in 3-CNF.
///
/// The usual validation runs first, then every clause must have exactly
/// three literals over distinct variables; the first offending clause is
/// reported as [`crate::Error::InvalidInstance`]. Search is shared with
/// [`crate::sat_solver::solve`], so witnesses and node counts agree with it.
pub fn solve(formula: &CNF, strategy: SatStrategy) -> Result<Outcome<SATSolution>> {
    solve_within(formula, strategy, &Budget::unlimited())
}

/// Like [`solve`] under a search budget
pub fn solve_within(formula: &CNF, strategy: SatStrategy, budget: &Budget) -> Result<Outcome<SATSolution>> {
    formula.validate()?;
    let formula = ThreeCNF::try_from(formula)?;
    run(&formula.clauses, formula.num_variables, strategy, budget)
}

/// Decides a formula that is already typed as 3-CNF
pub fn solve_three(formula: &ThreeCNF, strategy: SatStrategy) -> Result<Outcome<SATSolution>> {
    formula.validate()?;
    run(&formula.clauses, formula.num_variables, strategy, &Budget::unlimited())
}
