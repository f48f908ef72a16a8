use rand::{SeedableRng, rngs::StdRng};
use rstest::*;
use std::time::{Duration, Instant};
use wdp_solver::{
    Bid, Instance, Item, Request, Set, SolveSettings, SolveStatus, Solution,
    brute_force::BruteForceBackend, microlp::MicrolpBackend,
};

use all_backends::solve;

use random_auction::random_instance;

// Every item is booked at most once and every outcome names a real request
fn assert_allocation(instance: &Instance, solution: &Solution) {
    assert_eq!(solution.bids.len(), instance.bids().len());

    let mut used = Set::<Item>::default();
    let mut utility = 0;
    for (bid, request) in solution.accepted() {
        let request = &instance.bids()[bid].requests()[request];
        for item in request.items() {
            assert!(used.insert(*item), "item {item} booked twice");
        }
        utility += request.utility();
    }
    assert_eq!(solution.utility, utility);
}

#[rstest]
fn brute_force_timeout_keeps_incumbent() {
    // Ten bids over disjoint pairs of items: 30 variables, far too many
    // assignments to enumerate before a zero deadline
    let bids = (0..10u64)
        .map(|b| Bid::new([Request::new([2 * b, 2 * b + 1], b + 1).unwrap()]))
        .collect::<Vec<_>>();
    let instance = Instance::without_fairness(bids);
    let settings = SolveSettings {
        fairness: false,
        timeout: Some(Duration::ZERO),
    };

    let report = solve(&instance, BruteForceBackend::new(32), settings);

    assert_eq!(report.status, SolveStatus::TimedOut { incumbent: true });
    assert_eq!(report.status.to_string(), "timed out with incumbent");
    assert_eq!(report.stats.variables(), 30);
    assert_allocation(&instance, &report.solution.unwrap());
}

#[rstest]
fn microlp_timeout_does_not_hold_up_shutdown() {
    let mut rng = StdRng::seed_from_u64(0x7100);
    let instance = random_instance(&mut rng, 150, 4, 60);
    let settings = SolveSettings {
        fairness: true,
        timeout: Some(Duration::from_millis(200)),
    };

    let start = Instant::now();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let report = runtime
        .block_on(instance.solve(MicrolpBackend::default(), settings))
        .unwrap();
    drop(runtime);
    let elapsed = start.elapsed();

    // A timed out solve may still be running, but nothing waits for it
    assert!(elapsed < Duration::from_secs(10), "took {elapsed:?}");
    match report.status {
        SolveStatus::TimedOut { incumbent: false } => {
            assert!(report.solution.is_none());
            assert_eq!(
                report.status.to_string(),
                "no solution found within time budget"
            );
        }
        SolveStatus::Optimal => assert_allocation(&instance, &report.solution.unwrap()),
        status => panic!("unexpected status {status}"),
    }
}
