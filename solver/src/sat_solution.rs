use std::fmt::Write as FmtWrite;

/// Total assignment; entry `i` holds the value of variable `i + 1`
pub type Valuation = Vec<bool>;

const MAX_LITERALS_PER_LINE: usize = 8;

/// Terminal result of a SAT or 3-SAT solve. Partial assignments never
/// leave a solver.
#[derive(Clone, PartialEq, Eq)]
pub enum SATSolution {
    Satisfiable(Valuation),
    Unsatisfiable,
}

impl std::iter::FromIterator<bool> for SATSolution {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        SATSolution::Satisfiable(iter.into_iter().collect())
    }
}

impl SATSolution {
    pub fn is_sat(&self) -> bool {
        matches!(self, SATSolution::Satisfiable(_))
    }

    /// The witness, if there is one
    pub fn valuation(&self) -> Option<&[bool]> {
        match self {
            SATSolution::Satisfiable(valuation) => Some(valuation),
            SATSolution::Unsatisfiable => None,
        }
    }

    /// Renders the result with the `s`/`v` lines of the SAT competition
    /// output format.
    pub fn to_dimacs(&self) -> String {
        match self {
            SATSolution::Unsatisfiable => "s UNSATISFIABLE\n".to_string(),
            SATSolution::Satisfiable(variables) => {
                let mut out = String::from("s SATISFIABLE\n");
                for (line, chunk) in variables.chunks(MAX_LITERALS_PER_LINE).enumerate() {
                    out.push('v');
                    for (offset, sign) in chunk.iter().enumerate() {
                        let id = line * MAX_LITERALS_PER_LINE + offset + 1;
                        // writing into a String cannot fail
                        let _ = write!(&mut out, " {}{}", if *sign { "" } else { "-" }, id);
                    }
                    out.push('\n');
                }
                out.push_str("v 0\n");
                out
            }
        }
    }
}

impl std::fmt::Debug for SATSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl std::fmt::Display for SATSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SATSolution::Unsatisfiable => write!(f, "Unsatisfiable"),
            SATSolution::Satisfiable(variables) => {
                writeln!(f, "Satisfiable:")?;
                for (line, chunk) in variables.chunks(MAX_LITERALS_PER_LINE).enumerate() {
                    for (offset, sign) in chunk.iter().enumerate() {
                        let id = line * MAX_LITERALS_PER_LINE + offset + 1;
                        write!(f, "{}{} ", if *sign { " " } else { "-" }, id)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
        }
    }
}
