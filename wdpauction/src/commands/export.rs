use clap::ValueEnum;
use std::{io::Write, str::FromStr};
use wdp_solver::Program;

// Same story here with the ExportFormat enum, as with the BackendLib enum
#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Mps,
    Lp,
}

impl ExportFormat {
    pub fn export<W: Write>(&self, program: &Program, buffer: &mut W) -> anyhow::Result<()> {
        match self {
            Self::Mps => program.export_mps(buffer)?,
            Self::Lp => program.export_lp(buffer)?,
        };
        buffer.flush()?;
        Ok(())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mps" | "MPS" => Ok(Self::Mps),
            "lp" | "LP" => Ok(Self::Lp),
            _ => Err(Self::Err::ExportExtension(s.to_owned())),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ExportFormatError {
    #[error("Unknown export format: {0}")]
    ExportExtension(String),
}
