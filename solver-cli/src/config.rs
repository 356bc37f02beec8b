use std::path::PathBuf;

use num_bigint::BigInt;

use npc_solver::{SatStrategy, SubsetSumStrategy};

use crate::benchmark::BenchmarkPlan;

/// Where a Subset-Sum instance comes from
pub enum SubsetSumSource {
    Inline { numbers: Vec<BigInt>, target: BigInt },
    /// A file in the `n`/`t` text format, standard input if `None`
    Text(Option<PathBuf>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reduction {
    SatToThreeSat,
    ThreeSatToSubsetSum,
    SatToSubsetSum,
}

/// The selected subcommand. Formula inputs are DIMACS files, standard input
/// if `None`.
pub enum Task {
    SolveSat { input: Option<PathBuf>, strategy: SatStrategy, three_sat: bool },
    SolveSubsetSum { source: SubsetSumSource, strategy: SubsetSumStrategy },
    Reduce { input: Option<PathBuf>, reduction: Reduction },
    /// `assignment` holds the literals as given, read once the formula is known
    VerifySat { input: Option<PathBuf>, assignment: String, three_sat: bool },
    VerifySubsetSum { source: SubsetSumSource, indices: Vec<usize> },
    Benchmark(BenchmarkPlan),
}

pub struct Config {
    pub task:        Task,
    pub output:      Option<PathBuf>,
    pub return_code: bool,
    pub verbosity:   u8,
}
