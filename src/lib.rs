//! UPI Fraud Detection Service Library
//!
//! Collects transaction attributes from a web form, assembles them into the
//! fixed 21-column record the classifier was trained on, runs inference, and
//! renders the predicted fraud probability and label.

pub mod assembler;
pub mod config;
pub mod http;
pub mod metrics;
pub mod models;
pub mod render;
pub mod types;

pub use assembler::FeatureAssembler;
pub use config::AppConfig;
pub use models::inference::{Classifier, OnnxClassifier};
pub use types::{transaction::TransactionRecord, verdict::Verdict};
