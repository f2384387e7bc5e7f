pub mod logistic;
pub mod random_forest;

pub mod classifier_trait;
pub mod factory;

pub use classifier_trait::ClassifierModel;
pub use factory::{build_model, Classifier};
