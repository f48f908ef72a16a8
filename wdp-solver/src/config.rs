//! Run configuration.
//!
//! Every option the auction run depends on lives here rather than being
//! scattered through the run setup. The scenario identifiers determine where the
//! generated bid and fairness files are found.

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

use crate::SolveSettings;

/// The reasons a run configuration can be rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The fairness constant must be a finite fraction in [0, 1]
    #[error("fairness_const must be within [0, 1], got {0}")]
    FairnessConst(f64),
}

/// Configuration for a single auction run.
///
/// # Examples
///
/// ```
/// use wdp_solver::config::RunConfig;
/// use std::path::PathBuf;
///
/// let config = RunConfig::default();
/// assert_eq!(
///     config.bid_path(),
///     PathBuf::from("scen/modela-wdp-hrs2-cell_meters150.wdp")
/// );
/// assert_eq!(
///     config.fairness_path(),
///     PathBuf::from("scen/modela-wdp-hrs2-cell_meters150-f.wdp")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunConfig {
    /// The scenario model identifier
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// The mission horizon the scenario was generated for, in hours
    #[serde(default = "default_horizon_hours")]
    pub horizon_hours: u32,

    /// The grid cell size the scenario was generated with, in meters
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,

    /// Whether the fairness caps are enforced
    #[serde(default = "default_true")]
    pub fairness_enabled: bool,

    /// The fraction of the horizon any fairness group may be served
    #[serde(default = "default_fairness_const")]
    pub fairness_const: f64,

    /// How long the solver may search (e.g. "30s"); unbounded if omitted
    #[serde(default, with = "humantime_serde")]
    pub solver_timeout: Option<Duration>,

    /// The directory holding the generated scenario files
    #[serde(default = "default_scenario_dir")]
    pub scenario_dir: PathBuf,
}

fn default_model_id() -> String {
    "a".to_owned()
}

fn default_horizon_hours() -> u32 {
    2
}

fn default_cell_size() -> u32 {
    150
}

fn default_true() -> bool {
    true
}

fn default_fairness_const() -> f64 {
    0.2
}

fn default_scenario_dir() -> PathBuf {
    PathBuf::from("scen")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            horizon_hours: default_horizon_hours(),
            cell_size: default_cell_size(),
            fairness_enabled: default_true(),
            fairness_const: default_fairness_const(),
            solver_timeout: None,
            scenario_dir: default_scenario_dir(),
        }
    }
}

impl RunConfig {
    fn stem(&self) -> String {
        format!(
            "model{}-wdp-hrs{}-cell_meters{}",
            self.model_id, self.horizon_hours, self.cell_size
        )
    }

    /// The bid file the scenario generator wrote for this configuration
    pub fn bid_path(&self) -> PathBuf {
        self.scenario_dir.join(format!("{}.wdp", self.stem()))
    }

    /// The fairness file the scenario generator wrote for this configuration
    pub fn fairness_path(&self) -> PathBuf {
        self.scenario_dir.join(format!("{}-f.wdp", self.stem()))
    }

    /// Check the options that cannot be expressed in their types
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fairness_const.is_finite() && (0.0..=1.0).contains(&self.fairness_const) {
            Ok(())
        } else {
            Err(ConfigError::FairnessConst(self.fairness_const))
        }
    }

    /// The solve options implied by this configuration
    pub fn settings(&self) -> SolveSettings {
        SolveSettings {
            fairness: self.fairness_enabled,
            timeout: self.solver_timeout,
        }
    }
}
