use anyhow::{Context, Result};
use clap::ArgMatches;
use obesity_classifiers::config::TrainConfig;
use std::fs;
use std::path::{Path, PathBuf};

use crate::util::ensure_table_extension;

/// Read a JSON training config; absent keys take their defaults.
pub fn load_train_config<P: AsRef<Path>>(path: P) -> Result<TrainConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
    let config: TrainConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

/// Config file (or defaults) with command line overrides applied.
pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<TrainConfig> {
    let mut config = match config_path {
        Some(path) => load_train_config(path)?,
        None => {
            log::info!("No config file provided; using defaults.");
            TrainConfig::default()
        }
    };

    // Apply CLI overrides
    if let Some(train_data) = matches.get_one::<String>("train_data") {
        config.train_data = PathBuf::from(train_data);
    }
    ensure_table_extension(&config.train_data)?;

    if let Some(output_file) = matches.get_one::<String>("output_file") {
        config.model_output = PathBuf::from(output_file);
    }

    if let Some(metrics_file) = matches.get_one::<String>("metrics_file") {
        config.metrics_output = PathBuf::from(metrics_file);
    }

    if let Some(seed) = matches.get_one::<u64>("random_state") {
        config.random_state = *seed;
    }

    if let Some(n_estimators) = matches.get_one::<usize>("n_estimators") {
        config.forest.n_estimators = *n_estimators;
    }

    Ok(config)
}
