use anyhow::Context;
use gmstream::prelude::{ReconcileConfig, DEFAULT_INTERPOLATION_WINDOW};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Channels never admitted into a group: `net.sta.chan.loc` with `?` wildcards.
pub const DEFAULT_EXCLUDE_SEISMOMETERS: &[&str] = &["??.??.LN?.??"];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub interpolation_window: usize,
    pub exclude_seismometers: Vec<String>,
    pub workers: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            interpolation_window: DEFAULT_INTERPOLATION_WINDOW,
            exclude_seismometers: DEFAULT_EXCLUDE_SEISMOMETERS
                .iter()
                .map(|pattern| pattern.to_string())
                .collect(),
            workers: 4,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(interpolation_window: usize, workers: usize) -> Self {
        Self {
            interpolation_window,
            workers,
            ..Default::default()
        }
    }

    pub fn to_reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig {
            interpolation_window: self.interpolation_window,
        }
    }
}
