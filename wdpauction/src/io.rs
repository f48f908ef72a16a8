use clap::Args;
use std::{
    fs::File,
    io::{BufWriter, Write, stdout},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

// Every subcommand loads the same scenario and writes a single artifact.
// This struct standardizes their arguments.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "WDP_CONFIG")]
    pub config: Option<PathBuf>,

    /// The bid file (defaults to the scenario's generated bid file)
    #[arg(long)]
    pub bids: Option<PathBuf>,

    /// The fairness file (defaults to the scenario's generated fairness file)
    #[arg(long, conflicts_with = "no_fairness")]
    pub fairness: Option<PathBuf>,

    /// Ignore the fairness caps entirely
    #[arg(long)]
    pub no_fairness: bool,

    /// The fraction of the horizon any fairness group may be served
    #[arg(long)]
    pub fairness_const: Option<f64>,

    /// How long the solver may search, e.g. "30s" or "2m"
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// The output file ("-" implies stdout)
    #[arg(short, long, default_value = "-", value_parser = clap::value_parser!(PathOrStd))]
    output: PathOrStd,
}

impl RunArgs {
    pub fn write(&self) -> anyhow::Result<Box<dyn Write>> {
        match &self.output {
            PathOrStd::Path(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
            PathOrStd::Std => Ok(Box::new(stdout().lock())),
        }
    }

    pub fn extension(&self) -> Option<&str> {
        match &self.output {
            PathOrStd::Path(path) => path.extension(),
            PathOrStd::Std => None,
        }
        .and_then(|ext| ext.to_str())
    }
}

#[derive(Clone, Debug)]
enum PathOrStd {
    Path(PathBuf),
    Std,
}

impl FromStr for PathOrStd {
    type Err = <PathBuf as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(Self::Std)
        } else {
            Ok(Self::Path(s.parse()?))
        }
    }
}
