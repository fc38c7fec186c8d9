// src/main.rs

//! `spmd-demo`: run one SPMD kernel and print what every lane did.
//!
//! Usage: `spmd-demo [config.json]`. Without an argument the configuration
//! comes from `$SPMD_CONFIG`, or defaults.

use anyhow::{Context, Result};
use log::{info, warn};
use spmd_lanes::config::{Config, CONFIG};
use spmd_lanes::kernels;
use spmd_lanes::LANES;

fn main() -> Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => Config::load(&path)?,
        None => CONFIG.clone(),
    };
    info!(
        "Running {:?} over [{}, {}) with {} lanes",
        config.workload.kernel, config.workload.first, config.workload.last, LANES
    );

    let report = kernels::run(&config.workload, config.report.trace_masks);
    for inv in &report.invocations {
        if inv.active.bits().count_ones() as usize != LANES {
            info!("base {:>4}: masked tail, active {:?}", inv.base, inv.active);
        }
    }

    if config.report.emit_json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize run report")?;
        println!("{}", json);
    } else {
        warn!("report.emit_json is off; nothing printed");
    }
    Ok(())
}
