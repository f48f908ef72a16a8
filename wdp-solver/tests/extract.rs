use rstest::*;
use std::time::Duration;
use wdp_solver::{
    Backend, Bid, BidOutcome, ConstraintId, ConstraintKey, Instance, ModelError, ModelSink,
    Program, Request, SolveStatus, Terms, Var, VarKey, build_model, extract,
};

// A backend that reports a fixed status and marks a fixed set of variables as 1
struct Scripted {
    program: Program,
    status: SolveStatus,
    ones: Vec<VarKey>,
}

impl Scripted {
    fn new(status: SolveStatus, ones: Vec<VarKey>) -> Self {
        Self {
            program: Program::new(),
            status,
            ones,
        }
    }
}

impl ModelSink for Scripted {
    fn new_binary_variable(&mut self, key: VarKey) -> Result<Var, ModelError> {
        self.program.new_binary_variable(key)
    }

    fn add_less_equal(
        &mut self,
        key: ConstraintKey,
        terms: Terms,
        bound: f64,
    ) -> Result<ConstraintId, ModelError> {
        self.program.add_less_equal(key, terms, bound)
    }

    fn add_equal(
        &mut self,
        key: ConstraintKey,
        terms: Terms,
        bound: f64,
    ) -> Result<ConstraintId, ModelError> {
        self.program.add_equal(key, terms, bound)
    }

    fn set_objective_maximize(&mut self, terms: Terms) -> Result<(), ModelError> {
        self.program.set_objective_maximize(terms)
    }
}

impl Backend for Scripted {
    async fn solve(&mut self, _timeout: Option<Duration>) -> Result<SolveStatus, ModelError> {
        Ok(self.status)
    }

    fn value_of(&self, var: Var) -> Option<bool> {
        let key = self.program.key(var)?;
        Some(self.ones.contains(key))
    }

    fn program(&self) -> &Program {
        &self.program
    }
}

#[fixture]
fn instance() -> Instance {
    Instance::without_fairness(vec![
        Bid::new([
            Request::new([1u64], 4).unwrap(),
            Request::new([2u64], 6).unwrap(),
        ]),
        Bid::new([Request::new([3u64], 5).unwrap()]),
    ])
}

fn report(instance: &Instance, backend: Scripted) -> wdp_solver::Report {
    let mut backend = backend;
    let model = build_model(instance, &mut backend, false).unwrap();
    let status = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(backend.solve(None))
        .unwrap();
    extract(
        instance,
        &model,
        &backend,
        status,
        Duration::ZERO,
        Duration::from_millis(5),
    )
}

#[rstest]
#[case::infeasible(SolveStatus::Infeasible)]
#[case::unbounded(SolveStatus::Unbounded)]
#[case::no_incumbent(SolveStatus::TimedOut { incumbent: false })]
fn no_allocation_without_incumbent(instance: Instance, #[case] status: SolveStatus) {
    let ones = vec![VarKey::Sat { bid: 0, request: 0 }];
    let report = report(&instance, Scripted::new(status, ones));

    assert_eq!(report.status, status);
    assert!(report.solution.is_none());
    assert_eq!(report.utility(), None);
    assert_eq!(report.solve_time, Duration::from_millis(5));
}

#[rstest]
#[case::optimal(SolveStatus::Optimal)]
#[case::feasible(SolveStatus::Feasible { gap: 0.1 })]
#[case::incumbent(SolveStatus::TimedOut { incumbent: true })]
fn allocation_from_incumbent(instance: Instance, #[case] status: SolveStatus) {
    let ones = vec![VarKey::Sat { bid: 0, request: 1 }];
    let report = report(&instance, Scripted::new(status, ones));

    let solution = report.solution.unwrap();
    assert_eq!(
        solution.bids,
        vec![
            BidOutcome::Accepted {
                request: 1,
                utility: 6
            },
            BidOutcome::Unsatisfied
        ]
    );
    assert_eq!(solution.utility, 6);
}

#[rstest]
fn first_set_request_wins(instance: Instance) {
    // A backend should never set two, but extraction only ever takes the first
    let ones = vec![
        VarKey::Sat { bid: 0, request: 1 },
        VarKey::Sat { bid: 0, request: 0 },
        VarKey::Sat { bid: 1, request: 0 },
    ];
    let report = report(&instance, Scripted::new(SolveStatus::Optimal, ones));

    let solution = report.solution.unwrap();
    assert_eq!(solution.accepted().collect::<Vec<_>>(), vec![(0, 0), (1, 0)]);
    assert_eq!(solution.utility, 9);
}

#[rstest]
fn report_carries_model_size(instance: Instance) {
    let report = report(&instance, Scripted::new(SolveStatus::Optimal, Vec::new()));

    assert_eq!(report.stats.variables(), 6);
    assert_eq!(report.stats.constraints(), 3 + 3 + 2);
}

#[rstest]
fn report_serializes(instance: Instance) {
    let ones = vec![VarKey::Sat { bid: 1, request: 0 }];
    let report = report(&instance, Scripted::new(SolveStatus::Optimal, ones));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"]["status"], "optimal");
    assert_eq!(json["solve_time"], "5ms");
    assert_eq!(json["solution"]["utility"], 5);
    assert_eq!(json["solution"]["bids"][0]["outcome"], "unsatisfied");
    assert_eq!(json["solution"]["bids"][1]["outcome"], "accepted");
    assert_eq!(json["solution"]["bids"][1]["request"], 0);
}
