use crate::{Backend, BidOutcome, Instance, Model, Report, Solution, SolveStatus};
use std::time::Duration;
use tracing::{Level, event};

/// Read the accepted request of every bid back out of a solved backend.
///
/// Infeasible and unbounded programs, as well as timeouts without an incumbent,
/// produce a report without a solution. Otherwise each bid's requests are
/// scanned in order and the first one whose satisfaction variable is set is
/// accepted.
pub fn extract<B: Backend>(
    instance: &Instance,
    model: &Model,
    backend: &B,
    status: SolveStatus,
    build_time: Duration,
    solve_time: Duration,
) -> Report {
    let solution = status.has_solution().then(|| {
        let bids = instance
            .bids()
            .iter()
            .enumerate()
            .map(|(bid_id, bid)| {
                bid.requests()
                    .iter()
                    .enumerate()
                    .find(|(request_id, _)| {
                        model
                            .sat(bid_id, *request_id)
                            .and_then(|var| backend.value_of(var))
                            .unwrap_or(false)
                    })
                    .map_or(BidOutcome::Unsatisfied, |(request, r)| {
                        BidOutcome::Accepted {
                            request,
                            utility: r.utility(),
                        }
                    })
            })
            .collect::<Vec<_>>();

        // Each utility is at most 2^53, so only auctions with thousands of
        // maximal winners could reach the bound
        let utility = bids
            .iter()
            .map(|outcome| match outcome {
                BidOutcome::Accepted { utility, .. } => *utility,
                BidOutcome::Unsatisfied => 0,
            })
            .fold(0u64, u64::saturating_add);

        Solution { bids, utility }
    });

    match &solution {
        Some(solution) => event!(
            Level::INFO,
            %status,
            utility = solution.utility,
            accepted = solution.accepted().count(),
            bids = solution.bids.len(),
            ?solve_time,
            "auction solved"
        ),
        None => event!(Level::WARN, %status, ?solve_time, "auction produced no allocation"),
    }

    Report {
        status,
        stats: model.stats(),
        build_time,
        solve_time,
        solution,
    }
}
