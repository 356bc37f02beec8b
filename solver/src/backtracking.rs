use crate::cnf::CNFVar;
use crate::error::Result;
use crate::log_targets;
use crate::outcome::Budget;
use crate::sat_solver::Solver;
use crate::SATSolution;

/// Depth-first search over variables in index order, `false` before `true`.
///
/// After every binding the clauses mentioning the bound variable are checked
/// and the branch is abandoned as soon as one of them is falsified. The
/// explicit stack holds one value per bound variable, so the depth never
/// exceeds the number of variables. One node is counted per binding.
pub struct Backtracking;

impl Solver for Backtracking {
    fn search<C: AsRef<[CNFVar]>>(
        &self,
        clauses: &[C],
        num_variables: usize,
        budget: &Budget,
    ) -> Result<(SATSolution, u64)> {
        // an empty clause is already falsified by the empty assignment
        if clauses.iter().any(|clause| clause.as_ref().is_empty()) {
            return Ok((SATSolution::Unsatisfiable, 0));
        }

        let occurrences = occurrence_lists(clauses, num_variables);
        let mut values: Vec<Option<bool>> = vec![None; num_variables];
        let mut stack: Vec<bool> = Vec::with_capacity(num_variables);
        let mut nodes: u64 = 0;
        let mut pending = Some(false);

        loop {
            match pending {
                Some(value) => {
                    let var = stack.len();
                    values[var] = Some(value);
                    stack.push(value);
                    nodes += 1;
                    budget.check(nodes)?;

                    let falsified = occurrences[var].iter()
                        .any(|&clause| is_falsified(clauses[clause].as_ref(), &values));
                    if falsified {
                        log::trace!(target: log_targets::SEARCH, "x{} = {} falsifies a clause", var + 1, value);
                        pending = None;
                    } else if stack.len() == num_variables {
                        return Ok((SATSolution::Satisfiable(stack), nodes));
                    } else {
                        pending = Some(false);
                    }
                }
                None => loop {
                    match stack.pop() {
                        None => return Ok((SATSolution::Unsatisfiable, nodes)),
                        Some(value) => {
                            values[stack.len()] = None;
                            if !value {
                                pending = Some(true);
                                break;
                            }
                        }
                    }
                },
            }
        }
    }
}

/// For every variable (0-based) the clauses it occurs in, each listed once
pub(crate) fn occurrence_lists<C: AsRef<[CNFVar]>>(clauses: &[C], num_variables: usize) -> Vec<Vec<usize>> {
    let mut occurrences = vec![Vec::new(); num_variables];
    for (index, clause) in clauses.iter().enumerate() {
        for var in clause.as_ref() {
            let list: &mut Vec<usize> = &mut occurrences[var.id() - 1];
            if list.last() != Some(&index) {
                list.push(index);
            }
        }
    }
    occurrences
}

/// Every literal is bound and none of them is true
fn is_falsified(clause: &[CNFVar], values: &[Option<bool>]) -> bool {
    clause.iter()
        .all(|var| matches!(values[var.id() - 1], Some(value) if value != var.sign()))
}
