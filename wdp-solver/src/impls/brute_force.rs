use crate::{Backend, ModelError, Program, SolveStatus, Var, program::TOLERANCE};
use std::time::{Duration, Instant};
use tracing::{Level, event};

/// A backend that enumerates every 0/1 assignment of the program.
///
/// This is only practical for a couple dozen variables, but it makes no
/// assumptions about the program's structure, which makes it a useful
/// reference to check other backends against.
pub struct BruteForceBackend {
    program: Program,
    limit: usize,
    values: Option<Vec<bool>>,
}

// The deadline is polled between blocks of this many assignments. The first
// block (which starts with the all-zero assignment) always runs.
const POLL_INTERVAL: u64 = 1024;

impl Default for BruteForceBackend {
    fn default() -> Self {
        Self::new(24)
    }
}

impl BruteForceBackend {
    /// Create a backend that refuses programs with more than `limit` variables
    pub fn new(limit: usize) -> Self {
        Self {
            program: Program::new(),
            limit: limit.min(63),
            values: None,
        }
    }
}

forward_model_sink!(BruteForceBackend);

impl Backend for BruteForceBackend {
    async fn solve(&mut self, timeout: Option<Duration>) -> Result<SolveStatus, ModelError> {
        self.values = None;

        let n = self.program.num_variables();
        if n > self.limit {
            return Err(ModelError::TooLarge {
                variables: n,
                limit: self.limit,
            });
        }

        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut values = vec![false; n];
        let mut best: Option<(f64, Vec<bool>)> = None;
        let mut timed_out = false;

        for mask in 0..(1u64 << n) {
            if mask > 0
                && mask % POLL_INTERVAL == 0
                && deadline.is_some_and(|d| Instant::now() >= d)
            {
                timed_out = true;
                break;
            }

            for (i, value) in values.iter_mut().enumerate() {
                *value = (mask >> i) & 1 == 1;
            }

            if !self.program.is_feasible(&values) {
                continue;
            }

            let objective = self.program.evaluate(&values);
            if best
                .as_ref()
                .is_none_or(|(incumbent, _)| objective > incumbent + TOLERANCE)
            {
                best = Some((objective, values.clone()));
            }
        }

        let status = match (&best, timed_out) {
            (_, true) => SolveStatus::TimedOut {
                incumbent: best.is_some(),
            },
            (Some(_), false) => SolveStatus::Optimal,
            // binary variables cannot be unbounded, so nothing feasible means infeasible
            (None, false) => SolveStatus::Infeasible,
        };

        event!(
            Level::DEBUG,
            variables = n,
            objective = best.as_ref().map(|(objective, _)| *objective),
            %status,
            "brute force search finished"
        );

        self.values = best.map(|(_, values)| values);
        Ok(status)
    }

    fn value_of(&self, var: Var) -> Option<bool> {
        self.values.as_ref()?.get(var.index()).copied()
    }

    fn program(&self) -> &Program {
        &self.program
    }
}
