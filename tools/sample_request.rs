//! Sample Request Tool
//!
//! Drives a running scoring service with sample form submissions and reports
//! the verdicts, for smoke-testing a deployed model end to end.

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use tracing::{info, warn};

/// Pull the rendered probability out of the result page.
fn scrape_probability(body: &str) -> Option<&str> {
    let marker = "Fraud Probability:</strong> ";
    let start = body.find(marker)? + marker.len();
    let rest = &body[start..];
    let end = rest.find('<')?;
    Some(rest[..end].trim())
}

fn daytime_submission(amount: f64) -> Vec<(&'static str, String)> {
    let now = Utc::now();
    vec![
        ("sender_upi_id", "user010055@okicici".to_string()),
        ("receiver_upi_id", "recv027483@okicici".to_string()),
        ("amount_inr", format!("{:.2}", amount)),
        ("transaction_type", "P2M".to_string()),
        ("merchant_category", "Shopping".to_string()),
        ("channel", "GooglePay".to_string()),
        ("device_type", "Mobile".to_string()),
        ("device_id", "DEV815551".to_string()),
        ("txn_date", now.format("%Y-%m-%d").to_string()),
        ("txn_time", "14:30".to_string()),
        ("sender_age", "29".to_string()),
        ("sender_bank", "HDFC".to_string()),
        ("receiver_bank", "SBI".to_string()),
        ("city", "Mumbai".to_string()),
        ("account_age_days", "730".to_string()),
        ("num_txns_last_24h", "2".to_string()),
        ("avg_amount_last_7d", format!("{:.2}", amount)),
        ("prev_fraud_count_sender", "0".to_string()),
        ("prev_fraud_count_receiver", "0".to_string()),
        ("transaction_note", "payment".to_string()),
        ("device_changed", "No".to_string()),
    ]
}

fn night_submission(amount: f64) -> Vec<(&'static str, String)> {
    let now = Utc::now();
    vec![
        ("sender_upi_id", "user990011@okaxis".to_string()),
        ("receiver_upi_id", "recv000001@okhdfcbank".to_string()),
        ("amount_inr", format!("{:.2}", amount)),
        ("transaction_type", "P2P".to_string()),
        ("merchant_category", "Other".to_string()),
        ("channel", "PhonePe".to_string()),
        ("device_type", "Mobile".to_string()),
        ("device_id", "DEV000001".to_string()),
        ("txn_date", now.format("%Y-%m-%d").to_string()),
        ("txn_time", "02:15".to_string()),
        ("sender_age", "21".to_string()),
        ("sender_bank", "Unknown".to_string()),
        ("receiver_bank", "Unknown".to_string()),
        ("city", "Unknown".to_string()),
        ("account_age_days", "3".to_string()),
        ("num_txns_last_24h", "40".to_string()),
        ("avg_amount_last_7d", "500.00".to_string()),
        ("prev_fraud_count_sender", "2".to_string()),
        ("prev_fraud_count_receiver", "5".to_string()),
        ("transaction_note", "urgent".to_string()),
        ("device_changed", "Yes".to_string()),
    ]
}

/// The quick-form shape: essential fields only.
fn quick_submission(amount: f64) -> Vec<(&'static str, String)> {
    vec![
        ("sender_upi_id", "user010055@okicici".to_string()),
        ("receiver_upi_id", "recv027483@okicici".to_string()),
        ("amount_inr", format!("{:.2}", amount)),
        ("transaction_type", "P2P".to_string()),
        ("merchant_category", "Recharge".to_string()),
        ("channel", "Paytm".to_string()),
        ("device_type", "Mobile".to_string()),
        ("device_id", "DEV815551".to_string()),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    let client = reqwest::Client::new();
    let mut rng = rand::thread_rng();

    let submissions = [
        ("daytime purchase", daytime_submission(rng.gen_range(100.0..5000.0))),
        ("night transfer", night_submission(rng.gen_range(50_000.0..500_000.0))),
        ("quick check", quick_submission(rng.gen_range(100.0..2000.0))),
    ];

    for (name, form) in &submissions {
        let response = client
            .post(format!("{}/predict", base_url))
            .form(form)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", base_url))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(submission = name, status = %status, "Scoring request failed");
            continue;
        }

        match scrape_probability(&body) {
            Some(prob) => info!(submission = name, probability = prob, "Scored"),
            None => warn!(submission = name, "No probability found in response"),
        }
    }

    let metrics = client
        .get(format!("{}/metrics", base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    info!(metrics = %metrics, "Service counters");

    Ok(())
}
