use crate::{Backend, Instance, Model, ModelError, Program, Report, build_model, extract};
use std::time::{Duration, Instant};
use tracing::{Level, event};

/// The run options that shape the program and the solve
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolveSettings {
    /// Whether the fairness caps are enforced
    pub fairness: bool,
    /// How long the backend may search before settling for its incumbent
    pub timeout: Option<Duration>,
}

impl Instance {
    /// Build the program into `backend`, solve it, and report the allocation.
    pub async fn solve<B: Backend>(
        &self,
        mut backend: B,
        settings: SolveSettings,
    ) -> Result<Report, ModelError> {
        let start = Instant::now();
        let model = build_model(self, &mut backend, settings.fairness)?;
        let build_time = start.elapsed();

        event!(
            Level::INFO,
            bids = self.bids().len(),
            variables = model.stats().variables(),
            constraints = model.stats().constraints(),
            ?build_time,
            "solving auction"
        );

        let start = Instant::now();
        let status = backend.solve(settings.timeout).await?;
        let solve_time = start.elapsed();

        Ok(extract(
            self,
            &model,
            &backend,
            status,
            build_time,
            solve_time,
        ))
    }

    /// Build the program without solving it, e.g. for export.
    pub fn program(&self, fairness: bool) -> Result<(Program, Model), ModelError> {
        let mut program = Program::new();
        let model = build_model(self, &mut program, fairness)?;
        Ok((program, model))
    }
}
