//! ONNX model loader

use crate::config::ModelConfig;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Loaded ONNX model with resolved input/output names
pub struct LoadedModel {
    /// ONNX Runtime session
    pub session: Session,
    /// Input taking the numeric feature columns, shape [1, 9] f32
    pub numeric_input: String,
    /// Input taking the categorical feature columns, shape [1, 12] string
    pub categorical_input: String,
    /// Output carrying class probabilities
    pub probability_output: String,
    /// Output carrying the predicted class label, when the export has one
    pub label_output: Option<String>,
}

/// Loader for the fraud classifier
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        // Initialize ONNX Runtime
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the classifier from file.
    ///
    /// Input and output names come from the config when set, otherwise they
    /// are discovered from the session metadata by name heuristics.
    pub fn load<P: AsRef<Path>>(&self, path: P, config: &ModelConfig) -> Result<LoadedModel> {
        let path = path.as_ref();

        info!(path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let categorical_input = config.categorical_input.clone().unwrap_or_else(|| {
            session
                .inputs
                .iter()
                .find(|i| i.name.contains("cat") || i.name.contains("text"))
                .map(|i| i.name.clone())
                .unwrap_or_else(|| {
                    session
                        .inputs
                        .get(1)
                        .map(|i| i.name.clone())
                        .unwrap_or_else(|| "categorical_input".to_string())
                })
        });

        let numeric_input = config.numeric_input.clone().unwrap_or_else(|| {
            session
                .inputs
                .iter()
                .find(|i| i.name != categorical_input)
                .map(|i| i.name.clone())
                .unwrap_or_else(|| "numeric_input".to_string())
        });

        let probability_output = config.probability_output.clone().unwrap_or_else(|| {
            session
                .outputs
                .iter()
                .find(|o| o.name.contains("prob") || o.name.contains("output"))
                .map(|o| o.name.clone())
                .unwrap_or_else(|| {
                    session
                        .outputs
                        .last()
                        .map(|o| o.name.clone())
                        .unwrap_or_else(|| "probabilities".to_string())
                })
        });

        let label_output = config.label_output.clone().or_else(|| {
            session
                .outputs
                .iter()
                .find(|o| o.name.contains("label"))
                .map(|o| o.name.clone())
        });

        info!(
            numeric_input = %numeric_input,
            categorical_input = %categorical_input,
            probability_output = %probability_output,
            label_output = ?label_output,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            session,
            numeric_input,
            categorical_input,
            probability_output,
            label_output,
        })
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}
