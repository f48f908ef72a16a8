use crate::{Backend, ModelError, Program, Sense, SolveStatus, Var, program::TOLERANCE};
use ::microlp::{ComparisonOp, OptimizationDirection, Problem};
use std::time::Duration;
use tracing::{Level, event};

/// A backend that hands the program to microlp's branch-and-bound MILP solver.
///
/// microlp has no notion of a time limit or an incumbent, so the solve runs on
/// its own thread and is abandoned if the timeout fires first. An abandoned
/// solve keeps its thread busy until microlp returns, but nothing waits for it.
#[derive(Default)]
pub struct MicrolpBackend {
    program: Program,
    values: Option<Vec<bool>>,
}

impl MicrolpBackend {
    /// Create a backend with an empty program
    pub fn new() -> Self {
        Self::default()
    }

    // Translate the recorded program. Returns None if a constraint without any
    // terms can never hold.
    fn problem(&self) -> Option<(Problem, Vec<::microlp::Variable>)> {
        let mut problem = Problem::new(OptimizationDirection::Maximize);

        let columns = self
            .program
            .variables()
            .map(|(var, _)| {
                let weight = self.program.objective().get(&var).copied().unwrap_or(0.0);
                problem.add_binary_var(weight)
            })
            .collect::<Vec<_>>();

        for constraint in self.program.constraints() {
            let terms = constraint
                .terms
                .iter()
                .filter(|(_, coef)| **coef != 0.0)
                .map(|(var, coef)| (columns[var.index()], *coef))
                .collect::<Vec<_>>();

            // Rows without terms (e.g. from empty requests) are decided here
            // rather than handed to microlp.
            if terms.is_empty() {
                let holds = match constraint.sense {
                    Sense::LessEqual => 0.0 <= constraint.bound + TOLERANCE,
                    Sense::Equal => constraint.bound.abs() <= TOLERANCE,
                };
                if holds {
                    continue;
                } else {
                    return None;
                }
            }

            let op = match constraint.sense {
                Sense::LessEqual => ComparisonOp::Le,
                Sense::Equal => ComparisonOp::Eq,
            };
            problem.add_constraint(terms, op, constraint.bound);
        }

        Some((problem, columns))
    }
}

forward_model_sink!(MicrolpBackend);

impl Backend for MicrolpBackend {
    async fn solve(&mut self, timeout: Option<Duration>) -> Result<SolveStatus, ModelError> {
        self.values = None;

        if self.program.num_variables() == 0 {
            self.values = Some(Vec::new());
            return if self.program.is_feasible(&[]) {
                Ok(SolveStatus::Optimal)
            } else {
                Ok(SolveStatus::Infeasible)
            };
        }

        let Some((problem, columns)) = self.problem() else {
            return Ok(SolveStatus::Infeasible);
        };

        // The solve runs on a detached thread rather than the runtime's blocking
        // pool, so that shutting the runtime down never waits on an abandoned solve
        let (sender, receiver) = tokio::sync::oneshot::channel();
        std::thread::Builder::new()
            .name("microlp".to_owned())
            .spawn(move || {
                let result = problem.solve().map(|solution| {
                    columns
                        .iter()
                        .map(|column| solution[*column] > 0.5)
                        .collect::<Vec<bool>>()
                });
                // The receiver is gone if the solve was abandoned
                let _ = sender.send(result);
            })
            .map_err(|e| ModelError::Join(e.to_string()))?;

        let received = match timeout {
            Some(timeout) => match tokio::time::timeout(timeout, receiver).await {
                Ok(received) => received,
                Err(_) => {
                    event!(Level::WARN, ?timeout, "microlp did not finish in time");
                    return Ok(SolveStatus::TimedOut { incumbent: false });
                }
            },
            None => receiver.await,
        };

        let received =
            received.map_err(|_| ModelError::Join("the solver thread exited early".to_owned()))?;

        match received {
            Ok(values) => {
                self.values = Some(values);
                Ok(SolveStatus::Optimal)
            }
            Err(::microlp::Error::Infeasible) => Ok(SolveStatus::Infeasible),
            Err(::microlp::Error::Unbounded) => Ok(SolveStatus::Unbounded),
            Err(error) => Err(ModelError::Backend(error.to_string())),
        }
    }

    fn value_of(&self, var: Var) -> Option<bool> {
        self.values.as_ref()?.get(var.index()).copied()
    }

    fn program(&self) -> &Program {
        &self.program
    }
}
