use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use itertools::Itertools;
use num_bigint::{BigInt, Sign};

use crate::error::{Error, Result};
use crate::log_targets;
use crate::outcome::{try_timed, Budget, Outcome};
use crate::subset_sum::{SubsetSumInstance, SubsetSumSolution};

/// The search strategies offered for Subset Sum
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubsetSumStrategy {
    BruteForce,
    Backtracking,
    DynamicProgramming,
}

impl SubsetSumStrategy {
    pub const ALL: [SubsetSumStrategy; 3] = [
        SubsetSumStrategy::BruteForce,
        SubsetSumStrategy::Backtracking,
        SubsetSumStrategy::DynamicProgramming,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SubsetSumStrategy::BruteForce => "brute",
            SubsetSumStrategy::Backtracking => "backtrack",
            SubsetSumStrategy::DynamicProgramming => "dp",
        }
    }
}

impl fmt::Display for SubsetSumStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SubsetSumStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "brute" | "bruteforce" | "brute_force" => Ok(SubsetSumStrategy::BruteForce),
            "backtrack" | "backtracking" => Ok(SubsetSumStrategy::Backtracking),
            "dp" | "dynamic" | "dynamic_programming" => Ok(SubsetSumStrategy::DynamicProgramming),
            other => Err(format!("unknown subset-sum strategy `{}`", other)),
        }
    }
}

/// Searches for a subset of `instance.numbers` summing to `instance.target`.
///
/// Range validation happens once, before dispatch, so every strategy rejects
/// malformed input with the same error.
pub fn solve(instance: &SubsetSumInstance, strategy: SubsetSumStrategy) -> Result<Outcome<SubsetSumSolution>> {
    solve_within(instance, strategy, &Budget::unlimited())
}

/// Like [`solve`], giving up with [`Error::Interrupted`] once `budget` runs
/// out
pub fn solve_within(
    instance: &SubsetSumInstance,
    strategy: SubsetSumStrategy,
    budget: &Budget,
) -> Result<Outcome<SubsetSumSolution>> {
    instance.validate()?;
    log::debug!(
        target: log_targets::SOLVE,
        "{}: {} elements, target {}",
        strategy,
        instance.len(),
        instance.target
    );

    let outcome = try_timed(|| match strategy {
        SubsetSumStrategy::BruteForce => brute_force(&instance.numbers, &instance.target, budget),
        SubsetSumStrategy::Backtracking => backtracking(&instance.numbers, &instance.target, budget),
        SubsetSumStrategy::DynamicProgramming => dynamic_programming(&instance.numbers, &instance.target, budget),
    })?;

    log::debug!(
        target: log_targets::SOLVE,
        "{}: {} after {} nodes in {:?}",
        strategy,
        if outcome.solution.is_found() { "found" } else { "not found" },
        outcome.stats.nodes,
        outcome.stats.elapsed
    );
    Ok(outcome)
}

/// Every inclusion mask in increasing binary order, element 0 being the least
/// significant bit. The running sum is updated with each flipped element.
/// One node per mask.
fn brute_force(numbers: &[BigInt], target: &BigInt, budget: &Budget) -> Result<(SubsetSumSolution, u64)> {
    let mut included = vec![false; numbers.len()];
    let mut sum = BigInt::ZERO;
    let mut nodes = 0u64;

    loop {
        nodes = nodes.saturating_add(1);
        budget.check(nodes)?;
        if &sum == target {
            let indices = included.iter().positions(|&included| included).collect();
            return Ok((SubsetSumSolution::Found(indices), nodes));
        }
        if !next_mask(&mut included, &mut sum, numbers) {
            return Ok((SubsetSumSolution::NotFound, nodes));
        }
    }
}

/// Binary increment with element 0 as the least significant bit, keeping
/// `sum` equal to the sum of the included elements. Returns `false` once
/// every mask has been produced.
fn next_mask(included: &mut [bool], sum: &mut BigInt, numbers: &[BigInt]) -> bool {
    for (bit, number) in included.iter_mut().zip(numbers) {
        if *bit {
            *bit = false;
            *sum -= number;
        } else {
            *bit = true;
            *sum += number;
            return true;
        }
    }
    false
}

/// Sums of the positive and of the negative elements at positions `i..`,
/// for every `i` in `0..=n`.
fn suffix_bounds(numbers: &[BigInt]) -> (Vec<BigInt>, Vec<BigInt>) {
    let n = numbers.len();
    let mut positive = vec![BigInt::ZERO; n + 1];
    let mut negative = vec![BigInt::ZERO; n + 1];
    for i in (0..n).rev() {
        let number = &numbers[i];
        positive[i] = positive[i + 1].clone();
        negative[i] = negative[i + 1].clone();
        match number.sign() {
            Sign::Plus => positive[i] += number,
            Sign::Minus => negative[i] += number,
            Sign::NoSign => (),
        }
    }
    (positive, negative)
}

/// Depth-first search over include/exclude decisions, include first.
///
/// A node is abandoned once the target leaves the range still reachable from
/// it, that is `sum + positive[i] < target` or `sum + negative[i] > target`.
fn backtracking(numbers: &[BigInt], target: &BigInt, budget: &Budget) -> Result<(SubsetSumSolution, u64)> {
    let n = numbers.len();
    let (positive, negative) = suffix_bounds(numbers);

    // decisions[i] tells whether element i is included, sums[i] is the sum of
    // the first i decisions
    let mut decisions: Vec<bool> = Vec::with_capacity(n);
    let mut sums: Vec<BigInt> = Vec::with_capacity(n + 1);
    sums.push(BigInt::ZERO);
    let mut nodes = 0u64;

    loop {
        nodes += 1;
        budget.check(nodes)?;
        let i = decisions.len();
        let missing = target - &sums[i];

        if missing.sign() == Sign::NoSign {
            let indices = decisions.iter().positions(|&included| included).collect();
            return Ok((SubsetSumSolution::Found(indices), nodes));
        }

        if i < n && positive[i] >= missing && negative[i] <= missing {
            let sum = &sums[i] + &numbers[i];
            decisions.push(true);
            sums.push(sum);
            continue;
        }

        log::trace!(target: log_targets::SEARCH, "pruned at depth {} with sum {}", i, sums[i]);
        loop {
            match decisions.pop() {
                None => return Ok((SubsetSumSolution::NotFound, nodes)),
                Some(true) => {
                    sums.pop();
                    let base = sums[sums.len() - 1].clone();
                    decisions.push(false);
                    sums.push(base);
                    break;
                }
                Some(false) => {
                    sums.pop();
                }
            }
        }
    }
}

/// Reachability table over `[sum of negatives, sum of positives]`, one bitset
/// row per prefix of the elements. One node per cell.
fn dynamic_programming(numbers: &[BigInt], target: &BigInt, budget: &Budget) -> Result<(SubsetSumSolution, u64)> {
    let n = numbers.len();
    let (positive, negative) = suffix_bounds(numbers);
    let (low, high) = (&negative[0], &positive[0]);
    if target < low || target > high {
        return Ok((SubsetSumSolution::NotFound, 0));
    }

    let span = high - low + 1u32;
    let exhausted = || Error::ResourceExhausted(format!("sum range of {} values", span));
    let width = usize::try_from(&span).map_err(|_| exhausted())?;
    // every element and every offset inside the range is below `width`
    let offset = |sum: &BigInt| usize::try_from(&(sum - low)).map_err(|_| exhausted());
    let shifts = numbers.iter()
        .map(|number| {
            let distance = usize::try_from(number.magnitude()).map_err(|_| exhausted())?;
            Ok((distance, number.sign() == Sign::Minus))
        })
        .collect::<Result<Vec<(usize, bool)>>>()?;

    let mut table = BitTable::allocate(n + 1, width)?;
    table.set(0, offset(&BigInt::ZERO)?);
    let mut nodes = 0u64;
    for (i, &(distance, negative)) in shifts.iter().enumerate() {
        table.extend_row(i, distance, negative);
        nodes = nodes.saturating_add(width as u64);
        budget.check(nodes)?;
    }

    let mut cell = offset(target)?;
    if !table.get(n, cell) {
        return Ok((SubsetSumSolution::NotFound, nodes));
    }

    let mut indices = Vec::new();
    for i in (0..n).rev() {
        if !table.get(i, cell) {
            indices.push(i);
            let (distance, negative) = shifts[i];
            cell = if negative { cell + distance } else { cell - distance };
        }
    }
    indices.reverse();
    Ok((SubsetSumSolution::Found(indices), nodes))
}

/// Largest table attempted, in 64-bit words (4 GiB)
const MAX_TABLE_WORDS: usize = 1 << 29;

/// `rows × width` bits stored row by row in 64-bit words
struct BitTable {
    words: Vec<u64>,
    row_words: usize,
}

impl BitTable {
    fn allocate(rows: usize, width: usize) -> Result<BitTable> {
        let row_words = width / 64 + usize::from(width % 64 != 0);
        let exhausted = || Error::ResourceExhausted(format!("{} × {} reachability table", rows, width));
        let total = row_words.checked_mul(rows)
            .filter(|&total| total <= MAX_TABLE_WORDS)
            .ok_or_else(exhausted)?;

        let mut words = Vec::new();
        words.try_reserve_exact(total).map_err(|_| exhausted())?;
        words.resize(total, 0);
        Ok(BitTable { words, row_words })
    }

    fn get(&self, row: usize, bit: usize) -> bool {
        self.words[row * self.row_words + bit / 64] >> (bit % 64) & 1 == 1
    }

    fn set(&mut self, row: usize, bit: usize) {
        self.words[row * self.row_words + bit / 64] |= 1 << (bit % 64);
    }

    /// Row `row + 1` becomes row `row` or-ed with itself shifted by
    /// `distance` bits, downwards when `negative`
    fn extend_row(&mut self, row: usize, distance: usize, negative: bool) {
        let len = self.row_words;
        let (head, tail) = self.words.split_at_mut((row + 1) * len);
        let src = &head[row * len..];
        let dst = &mut tail[..len];

        let (word_shift, bit_shift) = (distance / 64, (distance % 64) as u32);

        for w in 0..len {
            let moved = if !negative {
                match w.checked_sub(word_shift) {
                    None => 0,
                    Some(s) => {
                        let carry = if bit_shift > 0 && s > 0 { src[s - 1] >> (64 - bit_shift) } else { 0 };
                        src[s] << bit_shift | carry
                    }
                }
            } else {
                let s = w + word_shift;
                if s >= len {
                    0
                } else {
                    let carry = if bit_shift > 0 && s + 1 < len { src[s + 1] << (64 - bit_shift) } else { 0 };
                    src[s] >> bit_shift | carry
                }
            };
            dst[w] = src[w] | moved;
        }
    }
}
