//! Polynomial-time witness checks.
//!
//! Verifiers never search: they only evaluate the witness they are given, so
//! checking the same witness twice always gives the same verdict.

use num_bigint::BigInt;
use thiserror::Error;

use crate::cnf::CNF;
use crate::sat_solution::SATSolution;
use crate::subset_sum::{SubsetSumInstance, SubsetSumSolution};
use crate::three_cnf::Clause3;
use crate::util::HashSet;

/// Why a witness was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("assignment has {found} values, formula has {expected} variables")]
    AssignmentLength { found: usize, expected: usize },

    /// 1-based clause position
    #[error("clause {0} unsatisfied")]
    UnsatisfiedClause(usize),

    #[error("clause {clause} has {width} literals, expected 3")]
    ClauseWidth { clause: usize, width: usize },

    /// 1-based clause position
    #[error("clause {0} repeats a variable")]
    RepeatedVariable(usize),

    #[error("index {index} out of range for {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("index {0} selected more than once")]
    RepeatedIndex(usize),

    #[error("sum {sum} ≠ target {target}")]
    WrongSum { sum: BigInt, target: BigInt },

    #[error("variable {0} selected as both true and false")]
    ConflictingSelection(usize),

    #[error("variable {0} selected as neither true nor false")]
    MissingSelection(usize),
}

pub type Verdict = Result<(), Rejection>;

/// Checks a total assignment against a formula
pub fn verify_sat(formula: &CNF, assignment: &[bool]) -> Verdict {
    if assignment.len() != formula.num_variables {
        return Err(Rejection::AssignmentLength {
            found: assignment.len(),
            expected: formula.num_variables,
        });
    }
    match formula.clauses.iter().position(|clause| !clause.is_satisfied_by(assignment)) {
        Some(index) => Err(Rejection::UnsatisfiedClause(index + 1)),
        None => Ok(()),
    }
}

/// Like [`verify_sat`], and additionally every clause must be a [`Clause3`]:
/// three literals over three distinct variables
pub fn verify_three_sat(formula: &CNF, assignment: &[bool]) -> Verdict {
    for (index, clause) in formula.clauses.iter().enumerate() {
        match clause.vars.as_slice() {
            [a, b, c] => {
                Clause3::new(*a, *b, *c).map_err(|_| Rejection::RepeatedVariable(index + 1))?;
            }
            vars => return Err(Rejection::ClauseWidth { clause: index + 1, width: vars.len() }),
        }
    }
    verify_sat(formula, assignment)
}

/// Checks that the selected positions are valid, distinct and hit the target
pub fn verify_subset_sum(instance: &SubsetSumInstance, indices: &[usize]) -> Verdict {
    let mut seen = HashSet::default();
    for &index in indices {
        if index >= instance.len() {
            return Err(Rejection::IndexOutOfRange { index, len: instance.len() });
        }
        if !seen.insert(index) {
            return Err(Rejection::RepeatedIndex(index));
        }
    }

    let sum = instance.sum_of(indices);
    if sum != instance.target {
        return Err(Rejection::WrongSum { sum, target: instance.target.clone() });
    }
    Ok(())
}

/// Checks the witness of a SAT result. A negative answer carries no witness
/// and is accepted.
pub fn verify_sat_solution(formula: &CNF, solution: &SATSolution) -> Verdict {
    match solution {
        SATSolution::Satisfiable(valuation) => verify_sat(formula, valuation),
        SATSolution::Unsatisfiable => Ok(()),
    }
}

/// Checks the witness of a Subset-Sum result. A negative answer carries no
/// witness and is accepted.
pub fn verify_subset_sum_solution(instance: &SubsetSumInstance, solution: &SubsetSumSolution) -> Verdict {
    match solution {
        SubsetSumSolution::Found(indices) => verify_subset_sum(instance, indices),
        SubsetSumSolution::NotFound => Ok(()),
    }
}
