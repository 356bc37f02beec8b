//! Exact solvers, verifiers and reductions for three NP-complete problems:
//! SAT, 3-SAT and Subset Sum.
//!
//! Each problem offers several strategies, from plain enumeration to pruned
//! search, so their node counts can be compared on the same instance.
//! Solvers return an [`Outcome`] holding the answer and the search metrics;
//! [`verifier`] checks witnesses in polynomial time and [`reduction`] maps
//! instances (and witnesses back) along SAT → 3-SAT → Subset Sum.

/// The CNF representation of a formula
pub mod cnf;
/// Formulae restricted to clauses of exactly three literals
pub mod three_cnf;
/// The Solver trait and the SAT entry point
pub mod sat_solver;
/// 3-SAT entry points sharing the SAT search code
pub mod three_sat_solver;
pub mod bruteforce;
pub mod backtracking;
/// Module that contains the DPLL solver
mod dpll;
/// Module that specifies the output of a SAT solver
mod sat_solution;
pub mod subset_sum;
pub mod subset_sum_solver;
pub mod verifier;
pub mod reduction;
pub mod generators;
pub mod log_targets;
mod error;
mod outcome;
mod text;
mod util;

pub use cnf::{CNFClause, CNFVar, VarId, CNF};
pub use three_cnf::{Clause3, ThreeCNF};
pub use sat_solver::{SatStrategy, Solver};
pub use bruteforce::Bruteforce;
pub use backtracking::Backtracking;
pub use dpll::Dpll;
pub use sat_solution::{SATSolution, Valuation};
pub use subset_sum::{SubsetSumInstance, SubsetSumSolution, MAX_BITS};
pub use subset_sum_solver::SubsetSumStrategy;
pub use verifier::{Rejection, Verdict};
pub use reduction::{Pipeline, SubsetSumReduction, ThreeSatReduction};
pub use error::{Error, Result};
pub use outcome::{Budget, Outcome, SearchStats};
