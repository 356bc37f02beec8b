//! Polynomial-time reductions SAT → 3-SAT → Subset Sum.
//!
//! Every reduction returns the target instance together with the bookkeeping
//! needed to turn a witness of the target back into a witness of the source.

mod subset_sum;
mod three_sat;

pub use subset_sum::{sat_to_subset_sum, three_sat_to_subset_sum, SubsetSumReduction};
pub use three_sat::{sat_to_three_sat, ThreeSatReduction};

use crate::cnf::CNF;
use crate::error::Result;
use crate::sat_solution::Valuation;
use crate::subset_sum::SubsetSumInstance;
use crate::verifier::Rejection;

/// SAT → 3-SAT → Subset Sum in one go
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pipeline {
    pub three_sat: ThreeSatReduction,
    pub subset_sum: SubsetSumReduction,
}

impl Pipeline {
    pub fn new(formula: &CNF) -> Result<Pipeline> {
        let three_sat = sat_to_three_sat(formula)?;
        let subset_sum = three_sat_to_subset_sum(&three_sat.formula)?;
        Ok(Pipeline { three_sat, subset_sum })
    }

    /// The Subset-Sum instance at the end of the chain
    pub fn instance(&self) -> &SubsetSumInstance {
        &self.subset_sum.instance
    }

    /// Maps a selection of positions back to a valuation of the original
    /// formula
    pub fn restore(&self, indices: &[usize]) -> std::result::Result<Valuation, Rejection> {
        let valuation = self.subset_sum.restore(indices)?;
        Ok(self.three_sat.restore(&valuation))
    }
}
