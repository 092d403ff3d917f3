//! Model training
//!
//! - CART decision trees and a random forest classifier
//! - Stratified train/test split
//! - Classification report (precision, recall, F1, ROC AUC)
//! - [`Trainer`], which ties them together and writes the artifact bundle

mod config;
mod engine;
pub mod decision_tree;
pub mod metrics;
pub mod random_forest;
pub mod split;

pub use config::TrainingConfig;
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use engine::{Trainer, TrainingOutcome, TrainingSummary};
pub use metrics::{AverageMetrics, ClassMetrics, ClassificationReport};
pub use random_forest::{MaxFeatures, RandomForest};
pub use split::{stratified_split, SplitIndices};
