use num_bigint::BigInt;

use crate::cnf::{CNFVar, CNF};
use crate::error::{Error, Result};
use crate::log_targets;
use crate::reduction::three_sat::normalized_clauses;
use crate::sat_solution::Valuation;
use crate::subset_sum::{SubsetSumInstance, MAX_BITS};
use crate::three_cnf::ThreeCNF;
use crate::verifier::Rejection;

/// A Subset-Sum instance encoding a formula, with the positions of the
/// numbers that stand for each literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubsetSumReduction {
    pub instance: SubsetSumInstance,
    pub num_variables: usize,
    /// `positive[i]` is the position of the number selected when variable
    /// `i + 1` is true
    pub positive: Vec<usize>,
    /// `negative[i]` is the position of the number selected when variable
    /// `i + 1` is false
    pub negative: Vec<usize>,
    /// Slack positions in clause order, `width - 1` per clause
    pub slacks: Vec<usize>,
    pub radix: u32,
    /// The clauses as encoded, one digit column each
    pub clauses: Vec<Vec<CNFVar>>,
}

impl SubsetSumReduction {
    /// Reads a valuation off a selection of positions.
    ///
    /// Every variable must have exactly one of its two numbers selected.
    pub fn restore(&self, indices: &[usize]) -> std::result::Result<Valuation, Rejection> {
        let len = self.instance.len();
        let mut selected = vec![false; len];
        for &index in indices {
            match selected.get_mut(index) {
                Some(slot) => *slot = true,
                None => return Err(Rejection::IndexOutOfRange { index, len }),
            }
        }

        (0..self.num_variables)
            .map(|i| match (selected[self.positive[i]], selected[self.negative[i]]) {
                (true, true) => Err(Rejection::ConflictingSelection(i + 1)),
                (true, false) => Ok(true),
                (false, true) => Ok(false),
                (false, false) => Err(Rejection::MissingSelection(i + 1)),
            })
            .collect()
    }

    /// Selects the numbers matching a valuation, topping up every clause
    /// column with slacks. `None` unless the valuation satisfies every
    /// encoded clause.
    pub fn witness(&self, valuation: &[bool]) -> Option<Vec<usize>> {
        if valuation.len() != self.num_variables {
            return None;
        }
        let mut indices: Vec<usize> = valuation.iter()
            .enumerate()
            .map(|(i, &value)| if value { self.positive[i] } else { self.negative[i] })
            .collect();

        let mut first_slack = 0;
        for clause in &self.clauses {
            let satisfied = clause.iter().filter(|literal| literal.eval(valuation)).count();
            if satisfied == 0 {
                return None;
            }
            let available = clause.len() - 1;
            let slacks = &self.slacks[first_slack..first_slack + available];
            indices.extend_from_slice(&slacks[..clause.len() - satisfied]);
            first_slack += available;
        }
        indices.sort_unstable();
        Some(indices)
    }
}

/// The textbook reduction from 3-SAT.
///
/// Numbers are written in base 10 with one digit column per variable
/// (variable 1 most significant) above one column per clause. Each variable
/// contributes a number for each polarity carrying a 1 in its own column and
/// in the columns of the clauses where that literal occurs; each clause
/// contributes two slack numbers with a single 1 in its column. The target
/// has 1 in every variable column and 3 in every clause column. No column
/// sums past 5, so digits never carry.
pub fn three_sat_to_subset_sum(formula: &ThreeCNF) -> Result<SubsetSumReduction> {
    formula.validate()?;
    let clauses: Vec<&[CNFVar]> = formula.clauses.iter().map(AsRef::as_ref).collect();
    let reduction = encode(&clauses, formula.num_variables)?;
    log::debug!(
        target: log_targets::REDUCTION,
        "3-SAT → Subset Sum: {} clauses over {} variables became {} numbers",
        formula.len(),
        formula.num_variables,
        reduction.instance.len()
    );
    Ok(reduction)
}

/// Direct reduction from clauses of any width.
///
/// A clause of width `k` gets the digit `max(k, 1)` in the target and `k - 1`
/// slack numbers, and the radix grows to `2k` for wide clauses so columns
/// still never carry. An empty clause keeps a 1 in the target that nothing
/// can supply.
pub fn sat_to_subset_sum(formula: &CNF) -> Result<SubsetSumReduction> {
    formula.validate()?;
    let normalized = normalized_clauses(formula);
    let clauses: Vec<&[CNFVar]> = normalized.iter().map(AsRef::as_ref).collect();
    let reduction = encode(&clauses, formula.num_variables)?;
    log::debug!(
        target: log_targets::REDUCTION,
        "SAT → Subset Sum: {} clauses over {} variables became {} numbers in base {}",
        formula.len(),
        formula.num_variables,
        reduction.instance.len(),
        reduction.radix
    );
    Ok(reduction)
}

/// Clauses must not repeat a variable
fn encode(clauses: &[&[CNFVar]], num_variables: usize) -> Result<SubsetSumReduction> {
    let num_clauses = clauses.len();
    let widest = clauses.iter().map(|clause| clause.len()).max().unwrap_or(0);
    let radix = 10u32.max(2 * widest as u32);
    let columns = num_variables + num_clauses;

    // weight of every column, least significant first
    let mut weights: Vec<BigInt> = Vec::with_capacity(columns);
    let mut weight = BigInt::from(1u32);
    for _ in 0..columns {
        if weight.bits() > MAX_BITS {
            return Err(Error::invalid(format!(
                "encoding needs {} base-{} digits, numbers would exceed {} bits",
                columns, radix, MAX_BITS
            )));
        }
        let next = &weight * radix;
        weights.push(weight);
        weight = next;
    }
    let variable_column = |var: usize| &weights[num_clauses + num_variables - var];
    let clause_column = |clause: usize| &weights[num_clauses - 1 - clause];

    let mut positive_numbers: Vec<BigInt> = (1..=num_variables).map(|var| variable_column(var).clone()).collect();
    let mut negative_numbers = positive_numbers.clone();

    let mut target: BigInt = (1..=num_variables).map(variable_column).sum();
    let mut slack_numbers = Vec::new();
    for (j, clause) in clauses.iter().enumerate() {
        for literal in clause.iter() {
            let numbers = if literal.sign() { &mut positive_numbers } else { &mut negative_numbers };
            numbers[literal.id() - 1] += clause_column(j);
        }
        target += clause_column(j) * clause.len().max(1);
        for _ in 1..clause.len() {
            slack_numbers.push(clause_column(j).clone());
        }
    }

    let mut numbers = Vec::with_capacity(2 * num_variables + slack_numbers.len());
    let mut positive = Vec::with_capacity(num_variables);
    let mut negative = Vec::with_capacity(num_variables);
    for (positive_number, negative_number) in positive_numbers.into_iter().zip(negative_numbers) {
        positive.push(numbers.len());
        numbers.push(positive_number);
        negative.push(numbers.len());
        numbers.push(negative_number);
    }
    let slacks = (numbers.len()..numbers.len() + slack_numbers.len()).collect();
    numbers.extend(slack_numbers);

    let instance = SubsetSumInstance { numbers, target };
    instance.validate()?;
    Ok(SubsetSumReduction {
        instance,
        num_variables,
        positive,
        negative,
        slacks,
        radix,
        clauses: clauses.iter().map(|clause| clause.to_vec()).collect(),
    })
}
