use crate::cnf::{CNFClause, CNFVar, CNF};
use crate::error::Result;
use crate::log_targets;
use crate::sat_solution::Valuation;
use crate::three_cnf::{Clause3, ThreeCNF};

/// A 3-SAT formula equisatisfiable with some general formula, together with
/// what is needed to map its witnesses back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreeSatReduction {
    pub formula: ThreeCNF,
    /// Variables `1..=original_variables` are the variables of the source
    /// formula, every higher one is auxiliary
    pub original_variables: usize,
    pub original_clauses: usize,
}

impl ThreeSatReduction {
    /// Drops the auxiliary variables from a witness of the 3-SAT formula
    pub fn restore(&self, valuation: &[bool]) -> Valuation {
        valuation.iter().take(self.original_variables).copied().collect()
    }
}

/// Repeated literals are removed and tautologies dropped; neither changes
/// the set of satisfying assignments.
pub(crate) fn normalized_clauses(formula: &CNF) -> Vec<CNFClause> {
    formula.clauses.iter()
        .map(CNFClause::deduplicated)
        .filter(|clause| !clause.is_tautology())
        .collect()
}

/// Hands out auxiliary variables above the original ones
struct Fresh {
    next: usize,
}

impl Fresh {
    fn var(&mut self) -> CNFVar {
        self.next += 1;
        CNFVar::pos(self.next)
    }
}

/// Rewrites every clause into clauses of exactly three literals.
///
/// Widths 0, 1 and 2 are padded with fresh variables in every sign
/// combination, width 3 is kept and wider clauses are split into a chain
/// linked by fresh variables. Fresh variables are numbered consecutively
/// after the original ones in clause order, so the output is a function of
/// the input.
pub fn sat_to_three_sat(formula: &CNF) -> Result<ThreeSatReduction> {
    formula.validate()?;

    let mut fresh = Fresh { next: formula.num_variables };
    let mut clauses = Vec::new();

    for clause in normalized_clauses(formula) {
        match clause.vars.as_slice() {
            [] => {
                let (y, z, w) = (fresh.var(), fresh.var(), fresh.var());
                for signs in 0..8u8 {
                    let pick = |var: CNFVar, bit: u8| if signs >> bit & 1 == 1 { -var } else { var };
                    clauses.push(Clause3::new(pick(y, 2), pick(z, 1), pick(w, 0))?);
                }
            }
            [a] => {
                let (y, z) = (fresh.var(), fresh.var());
                clauses.push(Clause3::new(*a, y, z)?);
                clauses.push(Clause3::new(*a, y, -z)?);
                clauses.push(Clause3::new(*a, -y, z)?);
                clauses.push(Clause3::new(*a, -y, -z)?);
            }
            [a, b] => {
                let y = fresh.var();
                clauses.push(Clause3::new(*a, *b, y)?);
                clauses.push(Clause3::new(*a, *b, -y)?);
            }
            [a, b, c] => clauses.push(Clause3::new(*a, *b, *c)?),
            [first, second, middle @ .., before_last, last] => {
                let mut link = fresh.var();
                clauses.push(Clause3::new(*first, *second, link)?);
                for literal in middle {
                    let next = fresh.var();
                    clauses.push(Clause3::new(-link, *literal, next)?);
                    link = next;
                }
                clauses.push(Clause3::new(-link, *before_last, *last)?);
            }
        }
    }

    let reduction = ThreeSatReduction {
        formula: ThreeCNF { clauses, num_variables: fresh.next },
        original_variables: formula.num_variables,
        original_clauses: formula.len(),
    };
    log::debug!(
        target: log_targets::REDUCTION,
        "SAT → 3-SAT: {} clauses over {} variables became {} clauses over {} variables",
        formula.len(),
        formula.num_variables,
        reduction.formula.len(),
        reduction.formula.num_variables
    );
    Ok(reduction)
}
