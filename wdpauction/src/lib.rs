use clap::Parser;
use std::io::Write as _;
use tracing::{Level, event};

mod io;
pub use io::*;

mod config;
pub use config::{AppConfig, Inputs};

mod commands;
pub use commands::*;

// The top-level arguments -- presently just which subcommand to execute
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct BaseArgs {
    #[command(subcommand)]
    pub command: Commands,
}

impl BaseArgs {
    pub async fn evaluate(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Solve { run, lib } => {
                let config = AppConfig::load(&run)?;
                let instance = config.instance()?;
                let report = lib.solve(&instance, config.run.settings()).await?;

                event!(
                    Level::INFO,
                    status = %report.status,
                    utility = ?report.utility(),
                    solve_time = ?report.solve_time,
                    "run complete"
                );

                let mut output = run.write()?;
                serde_json::to_writer_pretty(&mut output, &report)?;
                writeln!(output)?;
            }
            Commands::Export { run, format } => {
                let format = if let Some(format) = format {
                    format
                } else if let Some(ext) = run.extension() {
                    ext.parse()?
                } else {
                    return Err(CliError::ExportInference)?;
                };

                let config = AppConfig::load(&run)?;
                let instance = config.instance()?;
                let (program, _) = instance.program(config.run.fairness_enabled)?;

                let mut output = run.write()?;
                format.export(&program, &mut output)?;
            }
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Unable to infer export format, please specify a valid format")]
    ExportInference,
}
