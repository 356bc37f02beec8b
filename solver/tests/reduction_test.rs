use std::convert::TryFrom;

use num_bigint::BigInt;
use rand::{rngs::StdRng, SeedableRng};
use proptest::{
    prelude::*,
    collection::vec,
    bool::weighted,
    sample::subsequence,
};
use npc_solver::{
    generators::random_three_cnf,
    reduction::{sat_to_subset_sum, sat_to_three_sat, three_sat_to_subset_sum, Pipeline},
    sat_solver, subset_sum_solver, three_sat_solver, verifier, CNFVar, Clause3, Error, Rejection, SatStrategy,
    SubsetSumInstance, SubsetSumStrategy, ThreeCNF, CNF,
};

fn formula_strategy(max_variables: usize, min_width: usize, max_width: usize, max_clauses: usize) -> impl Strategy<Value = CNF> {
    (1..=max_variables).prop_flat_map(move |num_variables| {
        vec(vec((1..=num_variables, weighted(0.5)), min_width..=max_width), 0..=max_clauses)
            .prop_map(move |clauses| {
                let clauses = clauses.into_iter()
                    .map(|clause| clause.into_iter().map(|(id, sign)| CNFVar::new(id, sign)).collect())
                    .collect();
                CNF::new(num_variables, clauses)
            })
    })
}

fn three_cnf_strategy(max_variables: usize, max_clauses: usize) -> impl Strategy<Value = ThreeCNF> {
    (3..=max_variables).prop_flat_map(move |num_variables| {
        let ids: Vec<usize> = (1..=num_variables).collect();
        vec((subsequence(ids, 3), vec(weighted(0.5), 3)), 0..=max_clauses)
            .prop_map(move |clauses| {
                let clauses = clauses.into_iter()
                    .map(|(ids, signs)| {
                        let literals: Vec<CNFVar> = ids.into_iter()
                            .zip(signs)
                            .map(|(id, sign)| CNFVar::new(id, sign))
                            .collect();
                        Clause3::new(literals[0], literals[1], literals[2]).unwrap()
                    })
                    .collect();
                ThreeCNF { clauses, num_variables }
            })
    })
}

fn is_satisfiable(formula: &CNF) -> bool {
    sat_solver::solve(formula, SatStrategy::Dpll).unwrap().solution.is_sat()
}

proptest! {
    #[test]
    fn three_sat_reduction_preserves_satisfiability(formula in formula_strategy(4, 0, 6, 5)) {
        let reduction = sat_to_three_sat(&formula).unwrap();
        prop_assert!(reduction.formula.clauses.iter().all(|clause| clause.literals().len() == 3));

        let outcome = three_sat_solver::solve_three(&reduction.formula, SatStrategy::Dpll).unwrap();
        prop_assert_eq!(outcome.solution.is_sat(), is_satisfiable(&formula));

        if let Some(valuation) = outcome.solution.valuation() {
            let restored = reduction.restore(valuation);
            prop_assert_eq!(verifier::verify_sat(&formula, &restored), Ok(()));
        }
    }

    #[test]
    fn subset_sum_reduction_preserves_satisfiability(formula in three_cnf_strategy(4, 3)) {
        let reduction = three_sat_to_subset_sum(&formula).unwrap();
        let outcome = subset_sum_solver::solve(&reduction.instance, SubsetSumStrategy::Backtracking).unwrap();
        prop_assert_eq!(outcome.solution.is_found(), is_satisfiable(&formula.to_cnf()));

        if let Some(indices) = outcome.solution.indices() {
            let valuation = reduction.restore(indices).unwrap();
            prop_assert_eq!(verifier::verify_sat(&formula.to_cnf(), &valuation), Ok(()));
        }
    }

    #[test]
    fn dynamic_programming_agrees_on_reduced_instances(formula in three_cnf_strategy(4, 3)) {
        let reduction = three_sat_to_subset_sum(&formula).unwrap();
        let dynamic = subset_sum_solver::solve(&reduction.instance, SubsetSumStrategy::DynamicProgramming).unwrap();
        prop_assert_eq!(dynamic.solution.is_found(), is_satisfiable(&formula.to_cnf()));
    }

    #[test]
    fn direct_reduction_preserves_satisfiability(formula in formula_strategy(3, 0, 4, 3)) {
        let reduction = sat_to_subset_sum(&formula).unwrap();
        let outcome = subset_sum_solver::solve(&reduction.instance, SubsetSumStrategy::Backtracking).unwrap();
        prop_assert_eq!(outcome.solution.is_found(), is_satisfiable(&formula));

        if let Some(indices) = outcome.solution.indices() {
            let valuation = reduction.restore(indices).unwrap();
            prop_assert_eq!(verifier::verify_sat(&formula, &valuation), Ok(()));
        }
    }

    #[test]
    fn pipeline_round_trip(formula in formula_strategy(2, 0, 3, 2)) {
        let pipeline = Pipeline::new(&formula).unwrap();
        let outcome = subset_sum_solver::solve(pipeline.instance(), SubsetSumStrategy::Backtracking).unwrap();
        prop_assert_eq!(outcome.solution.is_found(), is_satisfiable(&formula));

        if let Some(indices) = outcome.solution.indices() {
            let valuation = pipeline.restore(indices).unwrap();
            prop_assert_eq!(verifier::verify_sat(&formula, &valuation), Ok(()));
        }
    }
}

#[test]
fn scenario_reduced_instances_keep_their_answer() {
    let satisfiable: CNF = "p cnf 2 2\n1 2 0\n-1 -2 0\n".parse().unwrap();
    let unsatisfiable: CNF = "p cnf 1 2\n1 0\n-1 0\n".parse().unwrap();

    let pipeline = Pipeline::new(&satisfiable).unwrap();
    let outcome = subset_sum_solver::solve(pipeline.instance(), SubsetSumStrategy::Backtracking).unwrap();
    let indices = outcome.solution.indices().expect("feasible");
    let valuation = pipeline.restore(indices).unwrap();
    assert_eq!(verifier::verify_sat(&satisfiable, &valuation), Ok(()));

    let pipeline = Pipeline::new(&unsatisfiable).unwrap();
    let outcome = subset_sum_solver::solve(pipeline.instance(), SubsetSumStrategy::Backtracking).unwrap();
    assert!(!outcome.solution.is_found());
}

#[test]
fn short_clauses_are_padded() {
    let formula = CNF::from_literals(2, vec![vec![1], vec![1, -2], vec![]]);
    let reduction = sat_to_three_sat(&formula).unwrap();

    let expected = CNF::from_literals(7, vec![
        vec![1, 3, 4], vec![1, 3, -4], vec![1, -3, 4], vec![1, -3, -4],
        vec![1, -2, 5], vec![1, -2, -5],
        vec![6, 7, 8], vec![6, 7, -8], vec![6, -7, 8], vec![6, -7, -8],
        vec![-6, 7, 8], vec![-6, 7, -8], vec![-6, -7, 8], vec![-6, -7, -8],
    ]);
    assert_eq!(reduction.formula.num_variables, 8);
    assert_eq!(reduction.formula.to_cnf().clauses, expected.clauses);
    assert_eq!(reduction.original_variables, 2);
    assert_eq!(reduction.original_clauses, 3);
}

#[test]
fn long_clauses_are_chained() {
    let formula = CNF::from_literals(5, vec![vec![1, -2, 3, -4, 5]]);
    let reduction = sat_to_three_sat(&formula).unwrap();

    let expected = CNF::from_literals(7, vec![vec![1, -2, 6], vec![-6, 3, 7], vec![-7, -4, 5]]);
    assert_eq!(reduction.formula.to_cnf(), expected);
    assert_eq!(reduction.restore(&[true, false, true, false, true, true, true]), vec![true, false, true, false, true]);
}

#[test]
fn normalisation_drops_tautologies_and_repeats() {
    let formula = CNF::from_literals(3, vec![vec![1, -1, 2], vec![2, 2, 3, 3, -1]]);
    let reduction = sat_to_three_sat(&formula).unwrap();
    assert_eq!(reduction.formula.to_cnf(), CNF::from_literals(3, vec![vec![2, 3, -1]]));
}

#[test]
fn reductions_are_deterministic() {
    let formula = CNF::from_literals(4, vec![vec![1, 2, 3, 4], vec![-1], vec![2, -3]]);
    assert_eq!(sat_to_three_sat(&formula).unwrap(), sat_to_three_sat(&formula).unwrap());
    assert_eq!(Pipeline::new(&formula).unwrap(), Pipeline::new(&formula).unwrap());
}

#[test]
fn three_sat_encoding_uses_decimal_columns() {
    let formula = ThreeCNF::try_from(&CNF::from_literals(3, vec![vec![1, -2, 3]])).unwrap();
    let reduction = three_sat_to_subset_sum(&formula).unwrap();

    assert_eq!(reduction.radix, 10);
    assert_eq!(reduction.instance, SubsetSumInstance::new(vec![1001, 1000, 100, 101, 11, 10, 1, 1], 1113));
    assert_eq!(reduction.positive, vec![0, 2, 4]);
    assert_eq!(reduction.negative, vec![1, 3, 5]);
    assert_eq!(reduction.slacks, vec![6, 7]);

    assert_eq!(reduction.restore(&[0, 3, 4, 6]), Ok(vec![true, false, true]));
    assert_eq!(reduction.restore(&[0, 1, 3, 4]), Err(Rejection::ConflictingSelection(1)));
    assert_eq!(reduction.restore(&[0, 4]), Err(Rejection::MissingSelection(2)));

    assert_eq!(reduction.witness(&[true, false, true]), Some(vec![0, 3, 4]));
    assert_eq!(reduction.witness(&[true, true, false]), Some(vec![0, 2, 5, 6, 7]));
    assert_eq!(reduction.witness(&[false, true, false]), None);
    assert_eq!(reduction.witness(&[true, false]), None);
}

#[test]
fn wide_clauses_raise_the_radix() {
    let formula = CNF::from_literals(6, vec![vec![1, 2, 3, 4, 5, 6]]);
    let reduction = sat_to_subset_sum(&formula).unwrap();
    assert_eq!(reduction.radix, 12);
    assert_eq!(reduction.slacks.len(), 5);
    assert_eq!(&reduction.instance.target % 12u32, BigInt::from(6));

    let valuation = [true, false, false, false, false, false];
    let indices = reduction.witness(&valuation).expect("satisfied");
    assert_eq!(indices.len(), 6 + 5);
    assert_eq!(verifier::verify_subset_sum(&reduction.instance, &indices), Ok(()));
    assert_eq!(reduction.restore(&indices), Ok(valuation.to_vec()));
}

#[test]
fn benchmark_sized_formulae_reduce() {
    let mut rng = StdRng::seed_from_u64(42);
    for (num_variables, num_clauses) in [(5, 21), (10, 9), (15, 64), (20, 85)] {
        let formula = random_three_cnf(&mut rng, num_variables, num_clauses).unwrap();
        let reduction = three_sat_to_subset_sum(&formula).unwrap();
        assert_eq!(reduction.instance.len(), 2 * num_variables + 2 * num_clauses);
        assert_eq!(reduction.instance.target.to_string().len(), num_variables + num_clauses);

        let outcome = three_sat_solver::solve_three(&formula, SatStrategy::Dpll).unwrap();
        match outcome.solution.valuation() {
            Some(valuation) => {
                let indices = reduction.witness(valuation).expect("satisfying valuation");
                assert_eq!(verifier::verify_subset_sum(&reduction.instance, &indices), Ok(()));
                assert_eq!(reduction.restore(&indices).as_deref(), Ok(valuation));
            }
            None => assert_eq!(reduction.witness(&vec![false; num_variables]), None),
        }
    }
}

#[test]
fn encoding_beyond_the_bit_bound_fails() {
    let formula = ThreeCNF { clauses: Vec::new(), num_variables: 1300 };
    assert!(matches!(three_sat_to_subset_sum(&formula), Err(Error::InvalidInstance(_))));

    let formula = ThreeCNF { clauses: Vec::new(), num_variables: 1000 };
    assert!(three_sat_to_subset_sum(&formula).is_ok());
}
