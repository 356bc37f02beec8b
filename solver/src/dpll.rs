use std::collections::VecDeque;
use itertools::Itertools;

use crate::cnf::CNFVar;
use crate::error::Result;
use crate::log_targets;
use crate::outcome::Budget;
use crate::sat_solver::Solver;
use crate::SATSolution;

/// Davis–Putnam–Logemann–Loveland search.
///
/// Unit propagation runs to a fixpoint before every branch. Branching picks
/// the first free variable and tries `false` first; a conflict undoes the
/// trail up to the most recent decision whose second value is still untried.
/// Search stops once every clause is satisfied, leftover variables are set to
/// `false`. Decisions and propagated bindings count as one node each.
pub struct Dpll;

impl Solver for Dpll {
    fn search<C: AsRef<[CNFVar]>>(
        &self,
        clauses: &[C],
        num_variables: usize,
        budget: &Budget,
    ) -> Result<(SATSolution, u64)> {
        let mut state = DataStructures::new(clauses, num_variables);
        let solution = state.dpll(budget)?;
        Ok((solution, state.nodes))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AssignmentType {
    /// Implied by a unit clause
    Forced,
    /// First value of a decision
    Branching,
    /// Second value of a decision
    Flipped,
}

/// Used to store assignments made in the past, for undoing them with backtracking
struct PrevAssignment {
    variable: usize,
    assignment_type: AssignmentType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VarValue {
    Pos,
    Neg,
    Free,
}

impl std::ops::Neg for VarValue {
    type Output = VarValue;

    fn neg(self) -> Self::Output {
        match self {
            VarValue::Pos => VarValue::Neg,
            VarValue::Neg => VarValue::Pos,
            VarValue::Free => VarValue::Free,
        }
    }
}

impl From<bool> for VarValue {
    fn from(sign: bool) -> Self {
        match sign {
            true => VarValue::Pos,
            false => VarValue::Neg,
        }
    }
}

struct Variable {
    value: VarValue,
    pos_occ: Vec<usize>,
    neg_occ: Vec<usize>,
}

struct Clause {
    /// Distinct literals of the clause
    literals: Vec<CNFVar>,
    true_lits: usize,
    free_lits: usize,
}

struct DataStructures {
    variables: Vec<Variable>,
    clauses: Vec<Clause>,
    trail: Vec<PrevAssignment>,
    /// Clauses that became unit, by index
    unit_queue: VecDeque<usize>,
    /// Number of clauses without a true literal
    unsatisfied: usize,
    nodes: u64,
}

impl DataStructures {
    fn new<C: AsRef<[CNFVar]>>(cnf: &[C], num_variables: usize) -> DataStructures {
        let mut variables: Vec<Variable> = (0..num_variables)
            .map(|_| Variable { value: VarValue::Free, pos_occ: Vec::new(), neg_occ: Vec::new() })
            .collect();

        let clauses: Vec<Clause> = cnf.iter()
            .enumerate()
            .map(|(index, clause)| {
                let literals: Vec<CNFVar> = clause.as_ref().iter().copied().unique().collect();
                for literal in &literals {
                    let variable = &mut variables[literal.id() - 1];
                    if literal.sign() {
                        variable.pos_occ.push(index);
                    } else {
                        variable.neg_occ.push(index);
                    }
                }
                Clause { true_lits: 0, free_lits: literals.len(), literals }
            })
            .collect();

        DataStructures {
            variables,
            unsatisfied: clauses.len(),
            clauses,
            trail: Vec::new(),
            unit_queue: VecDeque::new(),
            nodes: 0,
        }
    }

    fn dpll(&mut self, budget: &Budget) -> Result<SATSolution> {
        if !self.initial_unit_propagation() {
            return Ok(SATSolution::Unsatisfiable);
        }

        loop {
            budget.check(self.nodes)?;
            if !self.process_unit_queue() {
                if !self.backtracking() {
                    return Ok(SATSolution::Unsatisfiable);
                }
                continue;
            }
            if self.unsatisfied == 0 {
                break;
            }
            match self.pick_branching_variable() {
                None => break,
                Some(variable) => {
                    if !self.set_literal(variable, VarValue::Neg, AssignmentType::Branching) && !self.backtracking() {
                        return Ok(SATSolution::Unsatisfiable);
                    }
                }
            }
        }

        Ok(self.variables.iter()
            .map(|variable| variable.value == VarValue::Pos)
            .collect())
    }

    /// Queues the clauses that are unit from the start. An empty clause
    /// makes the formula unsatisfiable outright.
    fn initial_unit_propagation(&mut self) -> bool {
        for (index, clause) in self.clauses.iter().enumerate() {
            match clause.free_lits {
                0 => return false,
                1 => self.unit_queue.push_back(index),
                _ => (),
            }
        }
        true
    }

    /// First free variable in index order
    fn pick_branching_variable(&self) -> Option<usize> {
        self.variables.iter().position(|variable| variable.value == VarValue::Free)
    }

    /// Binds a variable and updates the clause counters. Returns `false` if
    /// a clause lost its last free literal without being satisfied; the
    /// counters are updated completely either way so the binding can be
    /// undone.
    fn set_literal(&mut self, i: usize, value: VarValue, assignment_type: AssignmentType) -> bool {
        self.variables[i].value = value;
        self.trail.push(PrevAssignment { variable: i, assignment_type });
        self.nodes += 1;

        let variable = &self.variables[i];
        let (satisfied, falsified) = match value {
            VarValue::Pos => (&variable.pos_occ, &variable.neg_occ),
            _ => (&variable.neg_occ, &variable.pos_occ),
        };

        for &index in satisfied {
            let clause = &mut self.clauses[index];
            clause.true_lits += 1;
            clause.free_lits -= 1;
            if clause.true_lits == 1 {
                self.unsatisfied -= 1;
            }
        }

        let mut consistent = true;
        for &index in falsified {
            let clause = &mut self.clauses[index];
            clause.free_lits -= 1;
            if clause.true_lits == 0 {
                match clause.free_lits {
                    0 => consistent = false,
                    1 => self.unit_queue.push_back(index),
                    _ => (),
                }
            }
        }
        consistent
    }

    fn unset_literal(&mut self, i: usize) {
        let variable = &self.variables[i];
        let (satisfied, falsified) = match variable.value {
            VarValue::Pos => (&variable.pos_occ, &variable.neg_occ),
            _ => (&variable.neg_occ, &variable.pos_occ),
        };

        for &index in satisfied {
            let clause = &mut self.clauses[index];
            clause.true_lits -= 1;
            clause.free_lits += 1;
            if clause.true_lits == 0 {
                self.unsatisfied += 1;
            }
        }
        for &index in falsified {
            self.clauses[index].free_lits += 1;
        }
        self.variables[i].value = VarValue::Free;
    }

    /// Unit propagation to a fixpoint. Returns `false` on conflict.
    fn process_unit_queue(&mut self) -> bool {
        while let Some(index) = self.unit_queue.pop_front() {
            let clause = &self.clauses[index];
            if clause.true_lits > 0 {
                continue;
            }
            let variables = &self.variables;
            let unit = clause.literals.iter()
                .copied()
                .find(|literal| variables[literal.id() - 1].value == VarValue::Free);

            let consistent = match unit {
                Some(literal) => self.set_literal(literal.id() - 1, VarValue::from(literal.sign()), AssignmentType::Forced),
                None => false,
            };
            if !consistent {
                self.unit_queue.clear();
                return false;
            }
        }
        true
    }

    /// Undoes the trail up to the latest decision that still has an untried
    /// value and flips it. Returns `false` when no such decision is left.
    fn backtracking(&mut self) -> bool {
        loop {
            self.unit_queue.clear();
            let assignment = match self.trail.pop() {
                Some(assignment) => assignment,
                None => return false,
            };
            let value = self.variables[assignment.variable].value;
            self.unset_literal(assignment.variable);

            if assignment.assignment_type == AssignmentType::Branching {
                log::trace!(
                    target: log_targets::SEARCH,
                    "conflict, flipping x{} at depth {}",
                    assignment.variable + 1,
                    self.trail.len()
                );
                if self.set_literal(assignment.variable, -value, AssignmentType::Flipped) {
                    return true;
                }
            }
        }
    }
}
