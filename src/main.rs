//! UPI Fraud Detection Service - Main Entry Point
//!
//! Loads the trained classifier once, then serves the transaction form and
//! scoring endpoint over HTTP.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use upi_fraud_detection::{
    assembler::FeatureAssembler,
    config::AppConfig,
    http::{router, AppState},
    metrics::{MetricsReporter, PipelineMetrics},
    models::inference::OnnxClassifier,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("upi_fraud_detection=info".parse()?),
        )
        .init();

    info!("Starting UPI Fraud Detection Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Initialize metrics
    let metrics = Arc::new(PipelineMetrics::new());

    // Load the classifier once; it is immutable from here on
    let classifier = Arc::new(
        OnnxClassifier::new(&config.model)
            .with_context(|| format!("Failed to load classifier from {}", config.model.path))?,
    );
    info!(model = %config.model.path, "Classifier loaded");

    let assembler = Arc::new(FeatureAssembler::new());

    // Start metrics reporter (prints summary every 60 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 60);
        reporter.start().await;
    });

    let state = AppState {
        classifier,
        assembler,
        metrics,
    };

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Listening for form submissions");

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
