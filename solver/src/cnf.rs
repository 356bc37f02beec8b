use std::fmt;
use std::iter::FromIterator;
use std::ops::Neg;
use std::str::FromStr;
use itertools::Itertools;

use crate::error::{Error, Result};
use crate::log_targets;
use crate::text::{indent, tokens};

/// Type used for referencing logical variables
pub type VarId = usize;

/// Representation of logical formulae in CNF form
/// (conjunction of clauses)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CNF {
    /// Vector of inner clauses
    pub clauses: Vec<CNFClause>,
    /// Variables are identified by `1..=num_variables`
    pub num_variables: usize,
}

/// Representation of a clause (disjunction of literals)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CNFClause {
    /// Vector of inner literals
    pub vars: Vec<CNFVar>,
}

/// Literal: a variable together with its polarity
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct CNFVar {
    /// Identifier of a variable
    pub id: VarId,
    /// Variable is negated iff `sign == false`
    pub sign: bool,
}

impl CNF {
    /// Creates a formula without any clauses over `num_variables` variables
    pub fn empty(num_variables: usize) -> CNF {
        CNF { clauses: Vec::new(), num_variables }
    }

    pub fn new(num_variables: usize, clauses: Vec<CNFClause>) -> CNF {
        CNF { clauses, num_variables }
    }

    /// Builds a formula out of DIMACS style integer clauses
    pub fn from_literals<I, C>(num_variables: usize, clauses: I) -> CNF
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = i64>,
    {
        CNF {
            clauses: clauses.into_iter()
                .map(|clause| clause.into_iter().map(CNFVar::from_i64).collect())
                .collect(),
            num_variables,
        }
    }

    /// Returns number of clauses in the formula
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Checks the structural invariants every solver relies on: at least one
    /// variable and every literal within `[1, num_variables]`.
    pub fn validate(&self) -> Result<()> {
        if self.num_variables == 0 {
            return Err(Error::invalid("formula must declare at least one variable"));
        }
        for (index, clause) in self.clauses.iter().enumerate() {
            if let Some(var) = clause.vars.iter().find(|var| var.id == 0 || var.id > self.num_variables) {
                return Err(Error::invalid(format!(
                    "clause {} references variable {} outside [1, {}]",
                    index + 1, var.id, self.num_variables
                )));
            }
        }
        Ok(())
    }

    /// Checks whether a total valuation satisfies every clause
    pub fn is_satisfied_by(&self, valuation: &[bool]) -> bool {
        self.clauses.iter().all(|clause| clause.is_satisfied_by(valuation))
    }

    /// Prints formula in DIMACS compatible form
    pub fn to_dimacs(&self) -> String {
        let mut out = format!("p cnf {} {}\n", self.num_variables, self.clauses.len());

        for clause in &self.clauses {
            if !clause.vars.is_empty() {
                out.push_str(&clause.vars.iter().map(CNFVar::to_i64).join(" "));
                out.push(' ');
            }
            out.push_str("0\n");
        }
        out
    }

    /// Parse DIMACS string into CNF structure.
    ///
    /// Comment lines are skipped, the `p cnf` line must precede every clause,
    /// clauses may span several lines and end with `0`. A `%` line ends the
    /// input (SATLIB benchmark files carry one). The decoded formula is
    /// validated before it is returned.
    pub fn from_dimacs(input: &str) -> Result<CNF> {
        let mut header: Option<(usize, usize)> = None;
        let mut clauses = Vec::new();
        let mut current = CNFClause::new();
        let mut open_at = (0, 0);
        let mut last_line = 0;

        for (index, line) in input.lines().enumerate() {
            let line_number = index + 1;
            last_line = line_number;
            let trimmed = line.trim_start();

            if trimmed.is_empty() || trimmed.starts_with('c') {
                continue;
            }
            if trimmed.starts_with('%') {
                break;
            }
            if trimmed.starts_with('p') {
                if header.is_some() {
                    return Err(Error::parse(line_number, indent(line), "duplicate problem line"));
                }
                if !clauses.is_empty() || !current.vars.is_empty() {
                    return Err(Error::parse(line_number, indent(line), "problem line after clauses"));
                }
                header = Some(parse_header(line, line_number)?);
                continue;
            }

            let (num_variables, _) = header
                .ok_or_else(|| Error::parse(line_number, indent(line), "clause before problem line"))?;

            for (column, token) in tokens(line) {
                let literal: i64 = token.parse().map_err(|_| {
                    Error::parse(line_number, column, format!("expected integer literal, found `{}`", token))
                })?;
                if literal == 0 {
                    clauses.push(std::mem::take(&mut current));
                    continue;
                }
                let id = literal.unsigned_abs() as VarId;
                if id > num_variables {
                    return Err(Error::parse(
                        line_number,
                        column,
                        format!("variable {} exceeds declared count {}", id, num_variables),
                    ));
                }
                if current.vars.is_empty() {
                    open_at = (line_number, column);
                }
                current.push(CNFVar::new(id, literal > 0));
            }
        }

        let (num_variables, num_clauses) = header
            .ok_or_else(|| Error::parse(last_line.max(1), 1, "missing `p cnf` problem line"))?;
        if !current.vars.is_empty() {
            return Err(Error::parse(open_at.0, open_at.1, "clause not terminated by 0"));
        }
        if clauses.len() != num_clauses {
            return Err(Error::parse(
                last_line.max(1),
                1,
                format!("problem line declares {} clauses, found {}", num_clauses, clauses.len()),
            ));
        }

        let formula = CNF { clauses, num_variables };
        formula.validate()?;
        log::debug!(
            target: log_targets::PARSE,
            "decoded formula with {} variables and {} clauses",
            formula.num_variables,
            formula.len()
        );
        Ok(formula)
    }
}

fn parse_header(line: &str, line_number: usize) -> Result<(usize, usize)> {
    let fields: Vec<(usize, &str)> = tokens(line).collect();
    match fields.as_slice() {
        [(_, "p"), (_, "cnf"), (vars_col, vars), (clauses_col, clauses)] => {
            let num_variables = vars.parse().map_err(|_| {
                Error::parse(line_number, *vars_col, format!("invalid variable count `{}`", vars))
            })?;
            let num_clauses = clauses.parse().map_err(|_| {
                Error::parse(line_number, *clauses_col, format!("invalid clause count `{}`", clauses))
            })?;
            Ok((num_variables, num_clauses))
        }
        [(_, "p"), (format_col, format), ..] if *format != "cnf" => Err(Error::parse(
            line_number,
            *format_col,
            format!("only CNF formulae are supported, found `{}`", format),
        )),
        _ => Err(Error::parse(line_number, indent(line), "expected `p cnf <variables> <clauses>`")),
    }
}

impl FromStr for CNF {
    type Err = Error;

    fn from_str(s: &str) -> Result<CNF> {
        CNF::from_dimacs(s)
    }
}

impl CNFClause {
    /// Creates an empty CNF clause
    pub fn new() -> CNFClause {
        CNFClause { vars: vec![] }
    }

    /// Creates a CNF clause containing a single literal
    pub fn single(var: CNFVar) -> CNFClause {
        CNFClause { vars: vec![var] }
    }

    /// Adds a single literal into the clause
    pub fn push(&mut self, v: CNFVar) {
        self.vars.push(v)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// A clause containing both polarities of a variable
    pub fn is_tautology(&self) -> bool {
        self.vars.iter().any(|var| self.vars.contains(&-*var))
    }

    /// Same clause with repeated literals removed, first occurrence kept
    pub fn deduplicated(&self) -> CNFClause {
        self.vars.iter().copied().unique().collect()
    }

    pub fn is_satisfied_by(&self, valuation: &[bool]) -> bool {
        self.vars.iter().any(|var| var.eval(valuation))
    }
}

impl AsRef<[CNFVar]> for CNFClause {
    fn as_ref(&self) -> &[CNFVar] {
        &self.vars
    }
}

impl FromIterator<CNFVar> for CNFClause {
    fn from_iter<I: IntoIterator<Item = CNFVar>>(iter: I) -> Self {
        CNFClause { vars: iter.into_iter().collect() }
    }
}

impl CNFVar {
    /// Creates literal with given identifier and positivity
    pub fn new(id: VarId, sign: bool) -> CNFVar {
        CNFVar { id, sign }
    }

    /// Creates a positive literal with given identifier
    pub fn pos(id: VarId) -> CNFVar {
        CNFVar { id, sign: true }
    }

    /// Creates a negative literal with given identifier
    pub fn neg(id: VarId) -> CNFVar {
        CNFVar { id, sign: false }
    }

    /// Reads a DIMACS literal; the sign of `literal` is the polarity.
    /// `literal` must not be zero.
    pub fn from_i64(literal: i64) -> CNFVar {
        CNFVar { id: literal.unsigned_abs() as VarId, sign: literal > 0 }
    }

    /// Gets the identifier of a variable
    pub fn id(&self) -> VarId {
        self.id
    }

    /// Checks if the literal is positive
    pub fn sign(&self) -> bool {
        self.sign
    }

    /// Converts to signed integer. The absolute value indicates
    /// the identifier and sign states for positivity.
    pub fn to_i64(&self) -> i64 {
        if self.sign {
            self.id as i64
        } else {
            -(self.id as i64)
        }
    }

    /// Truth value under a total valuation indexed by `id - 1`. A variable
    /// the valuation does not cover makes the literal false.
    pub fn eval(&self, valuation: &[bool]) -> bool {
        self.id.checked_sub(1)
            .and_then(|index| valuation.get(index))
            .map_or(false, |&value| value == self.sign)
    }
}

impl Neg for CNFVar {
    type Output = CNFVar;

    fn neg(self) -> CNFVar {
        CNFVar { id: self.id, sign: !self.sign }
    }
}

impl fmt::Display for CNF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.clauses {
            writeln!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Display for CNFClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.vars.iter().join(" ∨ "))
    }
}

impl fmt::Display for CNFVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign {
            write!(f, "x{}", self.id)
        } else {
            write!(f, "¬x{}", self.id)
        }
    }
}
