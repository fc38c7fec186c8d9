// src/config.rs

//! Configuration for the `spmd-demo` binary.
//!
//! Deserialized from JSON. Every struct carries `#[serde(default)]`, so a
//! config file only needs the keys it wants to change.

use anyhow::{ensure, Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV_VAR: &str = "SPMD_CONFIG";

/// Largest accepted `workload.last`. The demo allocates input and output
/// buffers of that many `f32`s.
pub const MAX_ELEMENTS: i32 = 1 << 24;

/// Process configuration: `$SPMD_CONFIG` if set and valid, defaults otherwise.
pub static CONFIG: Lazy<Config> = Lazy::new(|| match Config::from_env() {
    Ok(config) => config,
    Err(e) => {
        warn!("Falling back to default configuration: {:#}", e);
        Config::default()
    }
});

/// Root of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// What to compute.
    pub workload: WorkloadConfig,
    /// What to print.
    pub report: ReportConfig,
}

/// Demo kernels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    /// `out = sqrt(max(x, threshold))`, written with `spmd_if`.
    #[default]
    ClampedSqrt,
    /// `out = x < threshold ? -x : x * x`, written with `spmd_if_else`.
    SquareOrNegate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkloadConfig {
    pub kernel: Kernel,
    /// First index processed (inclusive, >= 0).
    pub first: i32,
    /// Last index processed (exclusive, <= [`MAX_ELEMENTS`]).
    pub last: i32,
    /// Branch threshold used by the kernel.
    pub threshold: f32,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            kernel: Kernel::ClampedSqrt,
            first: 0,
            last: 10,
            threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Print the report as JSON on stdout.
    pub emit_json: bool,
    /// Record the active lanes of every body invocation.
    pub trace_masks: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            emit_json: true,
            trace_masks: true,
        }
    }
}

impl Config {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(text).context("Failed to parse configuration JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load from `$SPMD_CONFIG`, or defaults when the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => {
                info!("{} not set, using default configuration", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.workload;
        ensure!(w.first >= 0, "workload.first must be >= 0, got {}", w.first);
        ensure!(
            w.first <= w.last,
            "workload.first ({}) must not exceed workload.last ({})",
            w.first,
            w.last
        );
        ensure!(
            w.last <= MAX_ELEMENTS,
            "workload.last ({}) exceeds the limit of {} elements",
            w.last,
            MAX_ELEMENTS
        );
        ensure!(w.threshold.is_finite(), "workload.threshold must be finite");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.workload.last, 10);
        assert_eq!(config.workload.kernel, Kernel::ClampedSqrt);
        assert!(config.report.emit_json);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            Config::from_json(r#"{ "workload": { "kernel": "square_or_negate", "last": 7 } }"#)
                .unwrap();
        assert_eq!(config.workload.kernel, Kernel::SquareOrNegate);
        assert_eq!(config.workload.first, 0);
        assert_eq!(config.workload.last, 7);
        assert!(config.report.trace_masks);
    }

    #[test]
    fn round_trips_through_json() {
        let config = Config::default();
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&text).unwrap(), config);
    }

    #[test]
    fn rejects_reversed_range() {
        let err = Config::from_json(r#"{ "workload": { "first": 8, "last": 2 } }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("must not exceed"));
    }

    #[test]
    fn rejects_negative_first() {
        assert!(Config::from_json(r#"{ "workload": { "first": -1 } }"#).is_err());
    }

    #[test]
    fn rejects_oversized_range() {
        let err =
            Config::from_json(r#"{ "workload": { "last": 2147483647 } }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("exceeds the limit"));
        let at_limit = format!(r#"{{ "workload": {{ "last": {} }} }}"#, MAX_ELEMENTS);
        assert_eq!(Config::from_json(&at_limit).unwrap().workload.last, MAX_ELEMENTS);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Config::from_json("{ workload: ").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::load("/nonexistent/spmd-config.json").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read configuration file"));
    }
}
