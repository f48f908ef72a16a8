use clap::ValueEnum;
use wdp_solver::{
    Instance, ModelError, Report, SolveSettings, brute_force::BruteForceBackend,
    microlp::MicrolpBackend,
};

// This explicitly articulates the available backends for the `solve` subcommand
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BackendLib {
    Microlp,
    BruteForce,
}

// Conveniently, we can use the same enum to handle the particulars of calling into
// the various backend implementations
impl BackendLib {
    pub async fn solve(
        &self,
        instance: &Instance,
        settings: SolveSettings,
    ) -> Result<Report, ModelError> {
        match self {
            BackendLib::Microlp => instance.solve(MicrolpBackend::default(), settings).await,
            BackendLib::BruteForce => {
                instance
                    .solve(BruteForceBackend::default(), settings)
                    .await
            }
        }
    }
}
