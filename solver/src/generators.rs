//! Seeded random instances for tests and benchmarks.
//!
//! All generators take the random number generator from the caller, so a
//! seeded [`rand::rngs::StdRng`] reproduces the same instances.

use rand::seq::index::sample;
use rand::Rng;

use crate::cnf::{CNFClause, CNFVar, CNF};
use crate::error::{Error, Result};
use crate::subset_sum::SubsetSumInstance;
use crate::three_cnf::{Clause3, ThreeCNF};

/// Whether a generated Subset-Sum instance must have a solution
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feasibility {
    /// The target is the sum of a random non-empty subset
    Guaranteed,
    /// The target is drawn uniformly from `[0, sum of all elements]`
    Random,
}

fn random_clause<R: Rng + ?Sized>(rng: &mut R, num_variables: usize, width: usize) -> CNFClause {
    sample(rng, num_variables, width)
        .into_iter()
        .map(|index| CNFVar::new(index + 1, rng.gen()))
        .collect()
}

/// A formula whose clause widths are uniform in `[min_width, max_width]`,
/// each clause over distinct variables with random signs
pub fn random_cnf<R: Rng + ?Sized>(
    rng: &mut R,
    num_variables: usize,
    num_clauses: usize,
    min_width: usize,
    max_width: usize,
) -> Result<CNF> {
    if num_variables == 0 {
        return Err(Error::invalid("formula must declare at least one variable"));
    }
    if min_width > max_width || max_width > num_variables {
        return Err(Error::invalid(format!(
            "clause widths [{}, {}] impossible with {} variables",
            min_width, max_width, num_variables
        )));
    }

    let clauses = (0..num_clauses)
        .map(|_| {
            let width = rng.gen_range(min_width..=max_width);
            random_clause(rng, num_variables, width)
        })
        .collect();
    Ok(CNF::new(num_variables, clauses))
}

/// Uniform random 3-SAT: three distinct variables per clause, random signs
pub fn random_three_cnf<R: Rng + ?Sized>(rng: &mut R, num_variables: usize, num_clauses: usize) -> Result<ThreeCNF> {
    if num_variables < 3 {
        return Err(Error::invalid(format!(
            "3-SAT needs at least 3 variables, got {}",
            num_variables
        )));
    }

    let clauses = (0..num_clauses)
        .map(|_| match random_clause(rng, num_variables, 3).vars.as_slice() {
            [a, b, c] => Clause3::new(*a, *b, *c),
            _ => Err(Error::invalid("sampled clause of wrong width")),
        })
        .collect::<Result<Vec<Clause3>>>()?;
    Ok(ThreeCNF { clauses, num_variables })
}

/// `len` elements uniform in `[1, max_value]` and a target chosen according
/// to `feasibility`
pub fn random_subset_sum<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    max_value: i64,
    feasibility: Feasibility,
) -> Result<SubsetSumInstance> {
    if max_value < 1 {
        return Err(Error::invalid(format!("maximum element {} must be positive", max_value)));
    }

    // sums of up to 2^64 values of at most 2^63 fit in an i128
    let numbers: Vec<i64> = (0..len).map(|_| rng.gen_range(1..=max_value)).collect();
    let total: i128 = numbers.iter().map(|&number| i128::from(number)).sum();
    let target: i128 = match feasibility {
        Feasibility::Guaranteed if len > 0 => {
            let size = rng.gen_range(1..=len);
            sample(rng, len, size).into_iter().map(|index| i128::from(numbers[index])).sum()
        }
        Feasibility::Guaranteed => 0,
        Feasibility::Random => rng.gen_range(0..=total),
    };
    Ok(SubsetSumInstance::new(numbers, target))
}
