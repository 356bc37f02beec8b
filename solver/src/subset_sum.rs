use std::fmt;
use std::str::FromStr;
use itertools::Itertools;
use num_bigint::BigInt;

use crate::error::{Error, Result};
use crate::log_targets;
use crate::text::{indent, tokens};

/// Largest bit length accepted for the magnitude of an element or a target.
/// Encodings of formulae with up to about a thousand variables and clauses
/// stay below it.
pub const MAX_BITS: u64 = 4096;

/// A multiset of integers and a target sum.
///
/// Positions are selectable independently, so duplicate values are distinct
/// elements. Values are arbitrary precision so that encoded formulae keep
/// one digit per variable and clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubsetSumInstance {
    pub numbers: Vec<BigInt>,
    pub target: BigInt,
}

/// Result of a Subset-Sum solve: the selected positions in ascending order,
/// or the proof-free answer that none exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubsetSumSolution {
    Found(Vec<usize>),
    NotFound,
}

impl SubsetSumSolution {
    pub fn is_found(&self) -> bool {
        matches!(self, SubsetSumSolution::Found(_))
    }

    pub fn indices(&self) -> Option<&[usize]> {
        match self {
            SubsetSumSolution::Found(indices) => Some(indices),
            SubsetSumSolution::NotFound => None,
        }
    }
}

impl SubsetSumInstance {
    pub fn new<N: Into<BigInt>>(numbers: impl IntoIterator<Item = N>, target: impl Into<BigInt>) -> SubsetSumInstance {
        SubsetSumInstance {
            numbers: numbers.into_iter().map(Into::into).collect(),
            target: target.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Rejects elements or a target whose magnitude needs more than
    /// [`MAX_BITS`] bits
    pub fn validate(&self) -> Result<()> {
        if let Some((index, number)) = self.numbers.iter()
            .enumerate()
            .find(|(_, number)| number.bits() > MAX_BITS)
        {
            return Err(Error::invalid(format!(
                "element {} has {} bits, beyond the representable range of {} bits",
                index,
                number.bits(),
                MAX_BITS
            )));
        }
        if self.target.bits() > MAX_BITS {
            return Err(Error::invalid(format!(
                "target has {} bits, beyond the representable range of {} bits",
                self.target.bits(),
                MAX_BITS
            )));
        }
        Ok(())
    }

    /// Sum of the elements at the given positions. Positions out of range
    /// are ignored.
    pub fn sum_of(&self, indices: &[usize]) -> BigInt {
        indices.iter()
            .filter_map(|&index| self.numbers.get(index))
            .sum()
    }

    /// Serializes as `n <count>`, `t <target>` and one element per line
    pub fn to_text(&self) -> String {
        let mut out = format!("n {}\nt {}\n", self.numbers.len(), self.target);
        for number in &self.numbers {
            out.push_str(&number.to_string());
            out.push('\n');
        }
        out
    }

    /// Parses the text format written by [`SubsetSumInstance::to_text`].
    ///
    /// Blank lines and lines starting with `#` are skipped. The `t` line is
    /// required, the `n` line is optional but must match the number of
    /// elements when present. Every other line holds elements.
    pub fn from_text(input: &str) -> Result<SubsetSumInstance> {
        let mut declared: Option<(usize, usize)> = None;
        let mut target: Option<BigInt> = None;
        let mut numbers = Vec::new();
        let mut last_line = 0;

        for (index, line) in input.lines().enumerate() {
            let line_number = index + 1;
            last_line = line_number;
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<(usize, &str)> = tokens(line).collect();
            match fields.as_slice() {
                [(_, "n"), (column, count)] => {
                    if declared.is_some() {
                        return Err(Error::parse(line_number, indent(line), "duplicate `n` line"));
                    }
                    let count = count.parse().map_err(|_| {
                        Error::parse(line_number, *column, format!("invalid element count `{}`", count))
                    })?;
                    declared = Some((count, line_number));
                }
                [(_, "t"), (column, value)] => {
                    if target.is_some() {
                        return Err(Error::parse(line_number, indent(line), "duplicate `t` line"));
                    }
                    target = Some(value.parse::<BigInt>().map_err(|_| {
                        Error::parse(line_number, *column, format!("invalid target `{}`", value))
                    })?);
                }
                [(column, "n"), ..] | [(column, "t"), ..] => {
                    return Err(Error::parse(line_number, *column, "expected exactly one value after the key"));
                }
                _ => {
                    for (column, token) in fields {
                        numbers.push(token.parse::<BigInt>().map_err(|_| {
                            Error::parse(line_number, column, format!("expected integer element, found `{}`", token))
                        })?);
                    }
                }
            }
        }

        let target = target.ok_or_else(|| Error::parse(last_line.max(1), 1, "missing `t <target>` line"))?;
        if let Some((count, line_number)) = declared {
            if count != numbers.len() {
                return Err(Error::parse(
                    line_number,
                    1,
                    format!("declared {} elements, found {}", count, numbers.len()),
                ));
            }
        }

        let instance = SubsetSumInstance { numbers, target };
        instance.validate()?;
        log::debug!(
            target: log_targets::PARSE,
            "decoded subset-sum instance with {} elements, target {}",
            instance.len(),
            instance.target
        );
        Ok(instance)
    }
}

impl FromStr for SubsetSumInstance {
    type Err = Error;

    fn from_str(s: &str) -> Result<SubsetSumInstance> {
        SubsetSumInstance::from_text(s)
    }
}

impl fmt::Display for SubsetSumInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} → {}", self.numbers.iter().join(", "), self.target)
    }
}

impl fmt::Display for SubsetSumSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubsetSumSolution::Found(indices) => write!(f, "Found: [{}]", indices.iter().join(", ")),
            SubsetSumSolution::NotFound => write!(f, "NotFound"),
        }
    }
}
