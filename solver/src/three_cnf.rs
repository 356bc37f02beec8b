use std::convert::TryFrom;
use std::fmt;

use crate::cnf::{CNFClause, CNFVar, CNF};
use crate::error::{Error, Result};

/// Clause of a 3-SAT formula: exactly three literals over three
/// distinct variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clause3(pub [CNFVar; 3]);

/// A formula in which every clause is a [`Clause3`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreeCNF {
    pub clauses: Vec<Clause3>,
    pub num_variables: usize,
}

impl Clause3 {
    /// Fails unless the three literals mention three different variables
    pub fn new(a: CNFVar, b: CNFVar, c: CNFVar) -> Result<Clause3> {
        if a.id == b.id || a.id == c.id || b.id == c.id {
            return Err(Error::invalid(format!(
                "3-SAT clause ({} ∨ {} ∨ {}) repeats a variable",
                a, b, c
            )));
        }
        Ok(Clause3([a, b, c]))
    }

    pub fn literals(&self) -> &[CNFVar; 3] {
        &self.0
    }
}

impl AsRef<[CNFVar]> for Clause3 {
    fn as_ref(&self) -> &[CNFVar] {
        &self.0
    }
}

impl From<Clause3> for CNFClause {
    fn from(clause: Clause3) -> CNFClause {
        clause.0.iter().copied().collect()
    }
}

impl ThreeCNF {
    /// Same checks as [`CNF::validate`]
    pub fn validate(&self) -> Result<()> {
        if self.num_variables == 0 {
            return Err(Error::invalid("formula must declare at least one variable"));
        }
        for (index, clause) in self.clauses.iter().enumerate() {
            if let Some(var) = clause.0.iter().find(|var| var.id == 0 || var.id > self.num_variables) {
                return Err(Error::invalid(format!(
                    "clause {} references variable {} outside [1, {}]",
                    index + 1, var.id, self.num_variables
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Widens the formula back into the general representation
    pub fn to_cnf(&self) -> CNF {
        CNF {
            clauses: self.clauses.iter().map(|clause| CNFClause::from(*clause)).collect(),
            num_variables: self.num_variables,
        }
    }

    pub fn to_dimacs(&self) -> String {
        self.to_cnf().to_dimacs()
    }
}

impl TryFrom<&CNF> for ThreeCNF {
    type Error = Error;

    /// Rejects any clause whose width is not three or which repeats a
    /// variable.
    fn try_from(formula: &CNF) -> Result<ThreeCNF> {
        let clauses = formula.clauses.iter()
            .enumerate()
            .map(|(index, clause)| match clause.vars.as_slice() {
                [a, b, c] => Clause3::new(*a, *b, *c).map_err(|_| {
                    Error::invalid(format!("clause {} repeats a variable", index + 1))
                }),
                vars => Err(Error::invalid(format!(
                    "clause {} has {} literals, expected 3",
                    index + 1,
                    vars.len()
                ))),
            })
            .collect::<Result<Vec<Clause3>>>()?;

        Ok(ThreeCNF { clauses, num_variables: formula.num_variables })
    }
}

impl fmt::Display for Clause3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "({} ∨ {} ∨ {})", a, b, c)
    }
}
