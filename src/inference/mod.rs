//! Inference over a persisted model bundle

mod engine;

pub use engine::{ClassProbability, Prediction, Predictor};
