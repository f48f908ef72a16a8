use super::RunArgs;
use clap::Subcommand;

mod export;
pub use export::{ExportFormat, ExportFormatError};

mod solve;
pub use solve::BackendLib;

#[derive(Subcommand)]
pub enum Commands {
    /// Solve the auction and report the allocation as JSON
    Solve {
        #[command(flatten)]
        run: RunArgs,

        /// Request a specific backend
        #[arg(short, long, default_value = "microlp")]
        lib: BackendLib,
    },

    /// Construct the winner determination program and export to a standard format
    Export {
        #[command(flatten)]
        run: RunArgs,

        /// The file format to use (if omitted, will infer based on filename)
        #[arg(short, long)]
        format: Option<ExportFormat>,
    },
}
