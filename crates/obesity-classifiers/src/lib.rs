//! obesity-classifiers: obesity-level classification from tabular patient data.
//!
//! This crate loads the survey table, fits the preprocessing (standardized
//! numeric columns, one-hot categorical columns), trains a logistic baseline
//! and a grid-searched random forest, keeps whichever scores best on a
//! held-out split, and persists the result as one JSON artifact that the
//! inference side loads once per process.
//!
//! Typed patient input and the BMI / risk read-out live in [`patient`].
pub mod config;
pub mod data_handling;
pub mod error;
pub mod inference;
pub mod io;
pub mod model_selection;
pub mod models;
pub mod patient;
pub mod pipeline;
pub mod preprocessing;
pub mod stats;
pub mod trainer;

pub use config::TrainConfig;
pub use data_handling::{FieldValue, Record};
pub use error::{PipelineError, Result};
pub use inference::{assess_patient, shared_pipeline, PatientAssessment};
pub use pipeline::{ModelPipeline, Prediction};
pub use trainer::{run_training, TrainingMetrics, TrainingOutcome};
