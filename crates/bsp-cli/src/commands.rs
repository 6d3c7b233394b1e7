//! Subcommand implementations

use anyhow::{Context, Result};
use bsp_core::{validate, SignalData, Value, Verdict};
use bsp_processing::{proc_variance, proc_z_score, ProcessingConfig};
use std::path::Path;
use tracing::info;

/// Check a JSON value against a type expression
pub fn check(type_def: &str, json: &str, name: &str) -> Result<Verdict> {
    let value = Value::from_json_str(json).context("Failed to parse value")?;
    Ok(validate(&value, type_def, name))
}

pub fn load_config(path: Option<&Path>) -> Result<ProcessingConfig> {
    match path {
        Some(path) => ProcessingConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(ProcessingConfig::default()),
    }
}

pub fn load_data(path: &Path) -> Result<SignalData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = Value::from_json_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let dat = SignalData::try_from(&value)
        .with_context(|| format!("{} does not hold signal data", path.display()))?;
    info!(
        samples = dat.samples(),
        channels = dat.channels(),
        epochs = dat.epochs(),
        "loaded {}",
        path.display()
    );
    Ok(dat)
}

pub fn to_json(dat: &SignalData) -> Result<String> {
    serde_json::to_string_pretty(&Value::from(dat).to_json()).context("Failed to serialize result")
}

pub fn variance(
    dat: &SignalData,
    config: &ProcessingConfig,
    sections: Option<usize>,
    std: bool,
) -> Result<SignalData> {
    let mut opts = config.variance;
    if let Some(n_sections) = sections {
        opts.n_sections = n_sections;
    }
    opts.calc_std |= std;
    proc_variance(dat, &opts).context("proc_variance failed")
}

pub fn z_score(dat: &SignalData, config: &ProcessingConfig, ival: Option<&[f64]>) -> Result<SignalData> {
    let mut opts = config.z_score;
    if let Some(&[start, end]) = ival {
        opts.ival = Some([start, end]);
    }
    proc_z_score(dat, &opts).context("proc_z_score failed")
}
