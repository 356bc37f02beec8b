use std::time::Duration;
use num_bigint::BigInt;
use proptest::{prelude::*, collection::vec};
use rand::{rngs::StdRng, SeedableRng};
use npc_solver::{
    generators::{random_subset_sum, Feasibility},
    subset_sum_solver, verifier, Budget, Error, SubsetSumInstance, SubsetSumSolution, SubsetSumStrategy, MAX_BITS,
};

const MAX_LEN: usize = 8;

fn feasible_exhaustive(instance: &SubsetSumInstance) -> bool {
    let n = instance.len();
    (0..1u32 << n).any(|mask| {
        let indices: Vec<usize> = (0..n).filter(|i| mask >> i & 1 == 1).collect();
        instance.sum_of(&indices) == instance.target
    })
}

fn power_of_two(bits: usize) -> BigInt {
    BigInt::from(1) << bits
}

fn solve_all(instance: &SubsetSumInstance) -> Vec<SubsetSumSolution> {
    SubsetSumStrategy::ALL.iter()
        .map(|&strategy| subset_sum_solver::solve(instance, strategy).expect("valid instance").solution)
        .collect()
}

proptest! {
    #[test]
    fn strategies_agree_on_non_negative_numbers(numbers in vec(0i64..50, 0..=MAX_LEN), target in 0i64..150) {
        let instance = SubsetSumInstance::new(numbers, target);
        let expected = feasible_exhaustive(&instance);
        for solution in solve_all(&instance) {
            prop_assert_eq!(solution.is_found(), expected);
            prop_assert_eq!(verifier::verify_subset_sum_solution(&instance, &solution), Ok(()));
        }
    }

    #[test]
    fn strategies_agree_with_negative_numbers(numbers in vec(-40i64..40, 0..=MAX_LEN), target in -60i64..60) {
        let instance = SubsetSumInstance::new(numbers, target);
        let expected = feasible_exhaustive(&instance);
        for solution in solve_all(&instance) {
            prop_assert_eq!(solution.is_found(), expected);
            prop_assert_eq!(verifier::verify_subset_sum_solution(&instance, &solution), Ok(()));
        }
    }

    #[test]
    fn text_round_trip(numbers in vec(any::<i128>(), 0..=MAX_LEN), target in any::<i128>()) {
        let instance = SubsetSumInstance::new(numbers, target);
        let parsed = SubsetSumInstance::from_text(&instance.to_text()).unwrap();
        prop_assert_eq!(parsed, instance);
    }
}

#[test]
fn scenario_feasible() {
    let instance = SubsetSumInstance::new(vec![3, 7, 1, 8, 4], 12);

    for strategy in SubsetSumStrategy::ALL.iter().copied() {
        let outcome = subset_sum_solver::solve(&instance, strategy).unwrap();
        let indices = outcome.solution.indices().expect("feasible");
        assert_eq!(instance.sum_of(indices), BigInt::from(12), "{}", strategy);
        assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
    }

    let brute = subset_sum_solver::solve(&instance, SubsetSumStrategy::BruteForce).unwrap();
    assert_eq!(brute.solution, SubsetSumSolution::Found(vec![0, 2, 3]));
}

#[test]
fn scenario_infeasible_parity() {
    let instance = SubsetSumInstance::new(vec![2, 4, 6], 5);
    for solution in solve_all(&instance) {
        assert_eq!(solution, SubsetSumSolution::NotFound);
    }
}

#[test]
fn zero_target_is_met_by_the_empty_subset() {
    let instance = SubsetSumInstance::new(vec![5, -5, 3], 0);
    for solution in solve_all(&instance) {
        assert_eq!(solution, SubsetSumSolution::Found(vec![]));
    }
}

#[test]
fn dynamic_programming_skips_unreachable_targets() {
    let instance = SubsetSumInstance::new(vec![1, 2, 3], 100);
    let outcome = subset_sum_solver::solve(&instance, SubsetSumStrategy::DynamicProgramming).unwrap();
    assert_eq!(outcome.solution, SubsetSumSolution::NotFound);
    assert_eq!(outcome.stats.nodes, 0);
}

#[test]
fn dynamic_programming_counts_table_cells() {
    let instance = SubsetSumInstance::new(vec![-2, 3, 4], 5);
    let outcome = subset_sum_solver::solve(&instance, SubsetSumStrategy::DynamicProgramming).unwrap();
    assert_eq!(outcome.solution, SubsetSumSolution::Found(vec![0, 1, 2]));
    // range [-2, 7]
    assert_eq!(outcome.stats.nodes, 3 * 10);
}

#[test]
fn backtracking_prunes_below_brute_force() {
    let instance = SubsetSumInstance::new(vec![50, 60, 70, 80, 90, 100, 1, 1], 3);
    let brute = subset_sum_solver::solve(&instance, SubsetSumStrategy::BruteForce).unwrap();
    let backtracking = subset_sum_solver::solve(&instance, SubsetSumStrategy::Backtracking).unwrap();
    assert_eq!(brute.solution, SubsetSumSolution::NotFound);
    assert_eq!(backtracking.solution, SubsetSumSolution::NotFound);
    assert!(backtracking.stats.nodes < brute.stats.nodes);
}

#[test]
fn huge_range_is_reported_not_allocated() {
    let instance = SubsetSumInstance::new(vec![power_of_two(4000), power_of_two(4000) - 1, BigInt::from(3)], 5);
    match subset_sum_solver::solve(&instance, SubsetSumStrategy::DynamicProgramming) {
        Err(Error::ResourceExhausted(_)) => (),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn numbers_beyond_machine_words_are_searched_exactly() {
    let big = power_of_two(100);
    let instance = SubsetSumInstance::new(
        vec![big.clone() + 1, big.clone() * 3, big.clone() - 1, BigInt::from(i64::MIN)],
        big * 2,
    );
    for strategy in [SubsetSumStrategy::BruteForce, SubsetSumStrategy::Backtracking] {
        let outcome = subset_sum_solver::solve(&instance, strategy).unwrap();
        assert_eq!(outcome.solution, SubsetSumSolution::Found(vec![0, 2]), "{}", strategy);
    }
}

#[test]
fn brute_force_enumerates_more_elements_than_a_machine_word() {
    let mut numbers = vec![7; 70];
    numbers[0] = 5;
    let instance = SubsetSumInstance::new(numbers, 5);
    for strategy in SubsetSumStrategy::ALL.iter().copied() {
        let outcome = subset_sum_solver::solve(&instance, strategy).unwrap();
        assert_eq!(outcome.solution, SubsetSumSolution::Found(vec![0]), "{}", strategy);
    }
    let brute = subset_sum_solver::solve(&instance, SubsetSumStrategy::BruteForce).unwrap();
    assert_eq!(brute.stats.nodes, 2);
}

#[test]
fn brute_force_keeps_counting_past_sixty_four_elements() {
    let mut numbers = vec![2; 66];
    numbers[65] = 1;
    let instance = SubsetSumInstance::new(numbers, 1);
    // the budget bounds the 2^65 masks tried before the witness
    let budget = Budget::unlimited().with_max_nodes(1 << 20);
    match subset_sum_solver::solve_within(&instance, SubsetSumStrategy::BruteForce, &budget) {
        Err(Error::Interrupted { nodes }) => assert_eq!(nodes, (1 << 20) + 1),
        other => panic!("unexpected {:?}", other),
    }
    let backtracking = subset_sum_solver::solve(&instance, SubsetSumStrategy::Backtracking).unwrap();
    assert_eq!(backtracking.solution, SubsetSumSolution::Found(vec![65]));
}

#[test]
fn guaranteed_instances_are_found_by_every_strategy() {
    let mut rng = StdRng::seed_from_u64(7);
    for len in [1, 5, 12] {
        let instance = random_subset_sum(&mut rng, len, 100, Feasibility::Guaranteed).unwrap();
        for solution in solve_all(&instance) {
            assert!(solution.is_found(), "{} elements", len);
            assert_eq!(verifier::verify_subset_sum_solution(&instance, &solution), Ok(()));
        }
    }
}

#[test]
fn exhausted_budget_interrupts_every_strategy() {
    let instance = SubsetSumInstance::new(vec![2; 30], 31);
    for strategy in SubsetSumStrategy::ALL.iter().copied() {
        let deadline = Budget::timeout(Duration::ZERO);
        assert!(
            matches!(subset_sum_solver::solve_within(&instance, strategy, &deadline), Err(Error::Interrupted { .. })),
            "{}",
            strategy
        );
        let capped = Budget::unlimited().with_max_nodes(0);
        assert!(
            matches!(subset_sum_solver::solve_within(&instance, strategy, &capped), Err(Error::Interrupted { .. })),
            "{}",
            strategy
        );
    }
}

#[test]
fn generous_budget_changes_nothing() {
    let instance = SubsetSumInstance::new(vec![3, 7, 1, 8, 4], 12);
    let budget = Budget::timeout(Duration::from_secs(60)).with_max_nodes(1_000);
    for strategy in SubsetSumStrategy::ALL.iter().copied() {
        let limited = subset_sum_solver::solve_within(&instance, strategy, &budget).unwrap();
        let unlimited = subset_sum_solver::solve(&instance, strategy).unwrap();
        assert_eq!(limited.solution, unlimited.solution);
        assert_eq!(limited.stats.nodes, unlimited.stats.nodes);
    }
}

#[test]
fn out_of_range_values_are_rejected_identically() {
    let instances = [
        SubsetSumInstance::new(vec![BigInt::from(1), power_of_two(MAX_BITS as usize)], 1),
        SubsetSumInstance::new(vec![1, 2], -power_of_two(MAX_BITS as usize)),
    ];

    for instance in instances.iter() {
        let errors: Vec<Error> = SubsetSumStrategy::ALL.iter()
            .map(|&strategy| subset_sum_solver::solve(instance, strategy).unwrap_err())
            .collect();
        assert!(matches!(errors[0], Error::InvalidInstance(_)));
        assert!(errors.iter().all(|error| *error == errors[0]));
    }
}

#[test]
fn text_format_accepts_comments_and_reports_positions() {
    let instance: SubsetSumInstance = "# example\nn 3\nt 5\n2\n# middle\n3\n-1\n".parse().unwrap();
    assert_eq!(instance, SubsetSumInstance::new(vec![2, 3, -1], 5));

    let cases = [
        ("n 2\nt 5\n1\nfoo\n", 4, 1),
        ("n 3\nt 5\n1\n2\n", 1, 1),
        ("n 1\n1\n", 2, 1),
        ("t five\n", 1, 3),
    ];
    for (text, line, column) in cases.iter() {
        match SubsetSumInstance::from_text(text) {
            Err(Error::Parse { line: l, column: c, .. }) => assert_eq!((l, c), (*line, *column), "{:?}", text),
            other => panic!("{:?} parsed as {:?}", text, other),
        }
    }
}
