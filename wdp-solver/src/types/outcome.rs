use super::RequestId;
use crate::ModelStats;
use std::{fmt, time::Duration};

/// The terminal status of a backend solve.
///
/// Infeasible and unbounded programs are valid outcomes rather than errors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "status", rename_all = "snake_case")
)]
pub enum SolveStatus {
    /// The incumbent is proven optimal
    Optimal,
    /// The backend stopped with a feasible incumbent and a relative optimality gap
    Feasible {
        /// The relative gap between the incumbent and the best bound
        gap: f64,
    },
    /// No assignment satisfies the constraints
    Infeasible,
    /// The objective can grow without limit
    Unbounded,
    /// The time budget ran out
    TimedOut {
        /// Whether a feasible incumbent was found before the deadline
        incumbent: bool,
    },
}

impl SolveStatus {
    /// Whether variable values can be read back after this status
    pub fn has_solution(&self) -> bool {
        match self {
            Self::Optimal | Self::Feasible { .. } => true,
            Self::TimedOut { incumbent } => *incumbent,
            Self::Infeasible | Self::Unbounded => false,
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Optimal => write!(f, "optimal"),
            Self::Feasible { gap } => write!(f, "feasible (gap {:.2}%)", gap * 100.0),
            Self::Infeasible => write!(f, "infeasible"),
            Self::Unbounded => write!(f, "unbounded"),
            Self::TimedOut { incumbent: true } => write!(f, "timed out with incumbent"),
            Self::TimedOut { incumbent: false } => {
                write!(f, "no solution found within time budget")
            }
        }
    }
}

/// What happened to a single bid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "outcome", rename_all = "snake_case")
)]
pub enum BidOutcome {
    /// One request was honored
    Accepted {
        /// The index of the accepted request within the bid
        request: RequestId,
        /// The utility of that request
        utility: u64,
    },
    /// None of the bid's requests were honored
    Unsatisfied,
}

impl BidOutcome {
    /// The accepted request, if any
    pub fn request(&self) -> Option<RequestId> {
        match self {
            Self::Accepted { request, .. } => Some(*request),
            Self::Unsatisfied => None,
        }
    }
}

/// The allocation read back from a solve, one outcome per bid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Outcomes indexed by bid id
    pub bids: Vec<BidOutcome>,
    /// The total utility of the accepted requests
    pub utility: u64,
}

impl Solution {
    /// Iterate over the accepted (bid, request) pairs
    pub fn accepted(&self) -> impl Iterator<Item = (usize, RequestId)> + '_ {
        self.bids
            .iter()
            .enumerate()
            .filter_map(|(bid, outcome)| outcome.request().map(|request| (bid, request)))
    }
}

/// Everything a run reports.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    /// How the backend terminated
    pub status: SolveStatus,
    /// The size of the program that was solved
    pub stats: ModelStats,
    /// Wall-clock time spent emitting the program
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub build_time: Duration,
    /// Wall-clock time spent inside the backend
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub solve_time: Duration,
    /// The allocation, absent when the backend produced no incumbent
    pub solution: Option<Solution>,
}

impl Report {
    /// The achieved utility, if a solution exists
    pub fn utility(&self) -> Option<u64> {
        self.solution.as_ref().map(|solution| solution.utility)
    }
}
