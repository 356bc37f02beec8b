use crate::cnf::CNFVar;
use crate::error::Result;
use crate::outcome::Budget;
use crate::sat_solver::{check_valuation, Solver};
use crate::SATSolution;

/// A simple CNF solver that naively checks all possible
/// valuations in order to ensure satisfiability.
///
/// Valuations are enumerated in increasing binary order with variable 1 as
/// the most significant bit, so the witness found is the lexicographically
/// smallest one (`false < true`). Every candidate costs `num_variables + 1`
/// nodes: one per binding and one for evaluating the formula.
pub struct Bruteforce;

impl Solver for Bruteforce {
    fn search<C: AsRef<[CNFVar]>>(
        &self,
        clauses: &[C],
        num_variables: usize,
        budget: &Budget,
    ) -> Result<(SATSolution, u64)> {
        // initial valuation sets all to false
        let mut valuation = vec![false; num_variables];
        let cost = num_variables as u64 + 1;
        let mut nodes: u64 = 0;

        loop {
            nodes = nodes.saturating_add(cost);
            budget.check(nodes)?;
            if check_valuation(clauses, &valuation) {
                return Ok((SATSolution::Satisfiable(valuation), nodes));
            }
            if !next_valuation(&mut valuation) {
                return Ok((SATSolution::Unsatisfiable, nodes));
            }
        }
    }
}

/// Binary increment with the last variable as the least significant bit.
/// Returns `false` once every valuation has been produced.
fn next_valuation(valuation: &mut [bool]) -> bool {
    for value in valuation.iter_mut().rev() {
        if *value {
            *value = false;
        } else {
            *value = true;
            return true;
        }
    }
    false
}
