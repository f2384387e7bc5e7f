pub mod input;

use anyhow::Result;
use obesity_classifiers::config::TrainConfig;
use obesity_classifiers::{run_training, TrainingMetrics};

/// Train, persist, and print the chosen model's summary.
pub fn run(config: &TrainConfig) -> Result<TrainingMetrics> {
    let outcome = run_training(config)?;
    let metrics = outcome.metrics;

    println!("Final model: {}", metrics.final_model);
    println!("Accuracy: {:.4}", metrics.accuracy);
    for candidate in &metrics.candidates {
        println!("  {:<32} {:.4}", candidate.name, candidate.accuracy);
    }
    println!("Model: {}", config.model_output.display());
    println!("Metrics: {}", config.metrics_output.display());

    Ok(metrics)
}
