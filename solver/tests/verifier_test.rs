use num_bigint::BigInt;
use npc_solver::{
    verifier::{verify_sat, verify_sat_solution, verify_subset_sum, verify_subset_sum_solution, verify_three_sat},
    Rejection, SATSolution, SubsetSumInstance, SubsetSumSolution, CNF,
};

fn formula() -> CNF {
    CNF::from_literals(2, vec![vec![1, 2], vec![-1, 2], vec![-2]])
}

#[test]
fn assignment_length_is_checked() {
    let verdict = verify_sat(&formula(), &[true]);
    assert_eq!(verdict, Err(Rejection::AssignmentLength { found: 1, expected: 2 }));
    assert_eq!(
        verdict.unwrap_err().to_string(),
        "assignment has 1 values, formula has 2 variables"
    );
}

#[test]
fn first_unsatisfied_clause_is_reported() {
    let verdict = verify_sat(&formula(), &[false, true]);
    assert_eq!(verdict, Err(Rejection::UnsatisfiedClause(3)));
    assert_eq!(verdict.unwrap_err().to_string(), "clause 3 unsatisfied");
}

#[test]
fn satisfying_assignment_is_accepted() {
    let formula = CNF::from_literals(2, vec![vec![1, 2], vec![-1, -2]]);
    assert_eq!(verify_sat(&formula, &[false, true]), Ok(()));
    assert_eq!(verify_sat(&formula, &[true, true]), Err(Rejection::UnsatisfiedClause(2)));
}

#[test]
fn empty_clause_is_never_satisfied() {
    let formula = CNF::from_literals(1, vec![vec![]]);
    assert_eq!(verify_sat(&formula, &[true]), Err(Rejection::UnsatisfiedClause(1)));
}

#[test]
fn three_sat_checks_clause_width() {
    let formula = CNF::from_literals(3, vec![vec![1, 2, 3], vec![1, 2]]);
    let verdict = verify_three_sat(&formula, &[true, true, true]);
    assert_eq!(verdict, Err(Rejection::ClauseWidth { clause: 2, width: 2 }));
    assert_eq!(verdict.unwrap_err().to_string(), "clause 2 has 2 literals, expected 3");
}

#[test]
fn three_sat_rejects_repeated_variables() {
    let formula = CNF::from_literals(3, vec![vec![1, 2, 3], vec![1, -1, 3]]);
    // the assignment satisfies both clauses, the shape is still wrong
    let verdict = verify_three_sat(&formula, &[true, false, false]);
    assert_eq!(verdict, Err(Rejection::RepeatedVariable(2)));
    assert_eq!(verdict.unwrap_err().to_string(), "clause 2 repeats a variable");

    let repeated_literal = CNF::from_literals(3, vec![vec![2, 2, 3]]);
    assert_eq!(verify_three_sat(&repeated_literal, &[false, true, false]), Err(Rejection::RepeatedVariable(1)));
    assert_eq!(verify_sat(&repeated_literal, &[false, true, false]), Ok(()));
}

#[test]
fn wrong_sum_is_reported() {
    let instance = SubsetSumInstance::new(vec![3, 7, 1, 8, 4], 12);
    let verdict = verify_subset_sum(&instance, &[0, 3]);
    assert_eq!(verdict, Err(Rejection::WrongSum { sum: BigInt::from(11), target: BigInt::from(12) }));
    assert_eq!(verdict.unwrap_err().to_string(), "sum 11 ≠ target 12");

    assert_eq!(verify_subset_sum(&instance, &[0, 2, 3]), Ok(()));
}

#[test]
fn subset_indices_must_be_valid_and_distinct() {
    let instance = SubsetSumInstance::new(vec![6, 6], 12);
    assert_eq!(verify_subset_sum(&instance, &[0, 0]), Err(Rejection::RepeatedIndex(0)));
    assert_eq!(verify_subset_sum(&instance, &[0, 2]), Err(Rejection::IndexOutOfRange { index: 2, len: 2 }));
    assert_eq!(verify_subset_sum(&instance, &[1, 0]), Ok(()));
}

#[test]
fn negative_results_carry_nothing_to_check() {
    let instance = SubsetSumInstance::new(vec![2, 4, 6], 5);
    assert_eq!(verify_subset_sum_solution(&instance, &SubsetSumSolution::NotFound), Ok(()));
    assert_eq!(verify_sat_solution(&formula(), &SATSolution::Unsatisfiable), Ok(()));
    assert_eq!(
        verify_subset_sum_solution(&instance, &SubsetSumSolution::Found(vec![0])),
        Err(Rejection::WrongSum { sum: BigInt::from(2), target: BigInt::from(5) })
    );
}

#[test]
fn verdicts_are_stable() {
    let formula = formula();
    let instance = SubsetSumInstance::new(vec![1, 2, 3], 4);
    for _ in 0..2 {
        assert_eq!(verify_sat(&formula, &[true, false]), Err(Rejection::UnsatisfiedClause(2)));
        assert_eq!(verify_subset_sum(&instance, &[0, 2]), Ok(()));
    }
}
