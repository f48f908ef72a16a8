//! Layered run configuration.
//!
//! A run is configured from, in increasing priority, built-in defaults, an
//! optional TOML file, `WDP_` environment variables and finally the explicit
//! command-line flags.

use crate::RunArgs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{Level, event};
use wdp_solver::{Instance, config::RunConfig, io::load_instance};

/// Explicit input files, overriding the scenario naming convention
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Inputs {
    /// The bid file
    #[serde(default)]
    pub bids: Option<PathBuf>,

    /// The fairness file
    #[serde(default)]
    pub fairness: Option<PathBuf>,
}

/// The complete configuration of an auction run
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Scenario selection and solve options
    #[serde(default)]
    pub run: RunConfig,

    /// Input file overrides
    #[serde(default)]
    pub inputs: Inputs,
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Command-line flags (highest priority)
    /// 2. Environment variables
    /// 3. Config file given by the CLI
    /// 4. Default values (lowest priority)
    ///
    /// Environment variables are mapped using the pattern:
    /// `WDP_<SECTION>__<KEY>` maps to `<section>.<key>`
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Solve the scenario generated for model b
    /// export WDP_RUN__MODEL_ID="b"
    ///
    /// # Bound the solver
    /// export WDP_RUN__SOLVER_TIMEOUT="5m"
    ///
    /// # Read the bids from somewhere else
    /// export WDP_INPUTS__BIDS="/tmp/bids.wdp"
    /// ```
    pub fn load(args: &RunArgs) -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Start with default values
        config = config.add_source(config::Config::try_from(&Self::default())?);

        // Layer on config file if it is specified and exists
        if let Some(path) = &args.config {
            if path.exists() {
                config = config.add_source(config::File::from(path.as_path()))
            } else {
                return Err(anyhow::anyhow!(
                    "Config file {} does not exist",
                    path.display()
                ));
            }
        }

        // Override with environment variables
        // This maps WDP_RUN__FAIRNESS_CONST to run.fairness_const
        config = config.add_source(
            config::Environment::with_prefix("WDP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut loaded: Self = config.build()?.try_deserialize()?;
        loaded.apply(args);
        loaded.run.validate()?;
        Ok(loaded)
    }

    fn apply(&mut self, args: &RunArgs) {
        if let Some(path) = &args.bids {
            self.inputs.bids = Some(path.clone());
        }
        if let Some(path) = &args.fairness {
            self.inputs.fairness = Some(path.clone());
        }
        if args.no_fairness {
            self.run.fairness_enabled = false;
        }
        if let Some(fairness_const) = args.fairness_const {
            self.run.fairness_const = fairness_const;
        }
        if let Some(timeout) = args.timeout {
            self.run.solver_timeout = Some(timeout);
        }
    }

    /// The bid file to read
    pub fn bid_path(&self) -> PathBuf {
        self.inputs
            .bids
            .clone()
            .unwrap_or_else(|| self.run.bid_path())
    }

    /// The fairness file to read, if the caps are enforced
    pub fn fairness_path(&self) -> Option<PathBuf> {
        self.run.fairness_enabled.then(|| {
            self.inputs
                .fairness
                .clone()
                .unwrap_or_else(|| self.run.fairness_path())
        })
    }

    /// Read the configured scenario from disk
    pub fn instance(&self) -> anyhow::Result<Instance> {
        let bids = self.bid_path();
        let fairness = self.fairness_path();

        event!(
            Level::DEBUG,
            bids = %bids.display(),
            fairness = ?fairness,
            "loading scenario"
        );

        Ok(load_instance(
            &bids,
            fairness.as_deref(),
            self.run.fairness_const,
        )?)
    }
}
