//! HTTP surface: the form pages and the scoring endpoint

pub mod handlers;
pub mod page;

use crate::assembler::FeatureAssembler;
use crate::metrics::PipelineMetrics;
use crate::models::inference::Classifier;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Shared state injected into every handler.
///
/// The classifier is loaded once at startup and immutable from here on.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub assembler: Arc<FeatureAssembler>,
    pub metrics: Arc<PipelineMetrics>,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::full_form))
        .route("/quick", get(handlers::quick_form))
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_snapshot))
        .with_state(state)
}
