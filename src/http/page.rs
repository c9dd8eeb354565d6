//! HTML pages for the form surface.
//!
//! Two variants of the same flow: the full form collects everything the
//! schema can take from a user; the quick form collects only the essential
//! fields and lets the assembler default the rest.

use crate::assembler::AssemblyWarning;
use crate::render::RenderedVerdict;
use crate::types::transaction::{Bank, Channel, DeviceType, MerchantCategory, TransactionType};
use crate::types::verdict::StatusLevel;
use chrono::{Days, NaiveDate, NaiveTime};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 640px; margin: 2rem auto; padding: 0 1rem; color: #222; }
h1 { font-size: 1.5rem; }
label { display: block; margin-top: 0.75rem; font-weight: 600; }
input, select { width: 100%; padding: 0.4rem; margin-top: 0.25rem; box-sizing: border-box; }
input[type=checkbox] { width: auto; }
button { margin-top: 1.25rem; padding: 0.6rem 1.5rem; font-size: 1rem; cursor: pointer; }
fieldset { margin-top: 1rem; border: 1px solid #ccc; }
.status-error { background: #fdecea; border: 1px solid #c0392b; color: #c0392b; padding: 0.75rem; margin-top: 1rem; }
.status-success { background: #eafaf1; border: 1px solid #1e8449; color: #1e8449; padding: 0.75rem; margin-top: 1rem; }
.warning { background: #fef9e7; border: 1px solid #b7950b; color: #7d6608; padding: 0.75rem; margin-top: 1rem; }
.info { background: #ebf5fb; border: 1px solid #2874a6; color: #1b4f72; padding: 0.75rem; margin-top: 1rem; }
.caption { color: #666; font-size: 0.85rem; margin-top: 1rem; }
nav { margin-bottom: 1rem; font-size: 0.9rem; }
"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"/\">Full form</a> | <a href=\"/quick\">Quick check</a></nav>\n\
         {body}\n</body>\n</html>\n"
    )
}

fn select_field(out: &mut String, label: &str, name: &str, options: &[&str]) {
    let _ = write!(out, "<label for=\"{name}\">{label}</label>\n<select id=\"{name}\" name=\"{name}\">\n");
    for option in options {
        let escaped = option.replace('&', "&amp;");
        let _ = write!(out, "<option value=\"{escaped}\">{escaped}</option>\n");
    }
    out.push_str("</select>\n");
}

fn text_field(out: &mut String, label: &str, name: &str, default: &str) {
    let _ = write!(
        out,
        "<label for=\"{name}\">{label}</label>\n\
         <input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{default}\">\n"
    );
}

fn number_field(
    out: &mut String,
    label: &str,
    name: &str,
    min: f64,
    max: f64,
    default: f64,
    step: f64,
) {
    let _ = write!(
        out,
        "<label for=\"{name}\">{label}</label>\n\
         <input type=\"number\" id=\"{name}\" name=\"{name}\" \
         min=\"{min}\" max=\"{max}\" value=\"{default}\" step=\"{step}\">\n"
    );
}

/// Shared head of both forms: the fields every variant collects.
fn essential_fields(out: &mut String) {
    text_field(out, "Sender UPI ID", "sender_upi_id", "user010055@okicici");
    text_field(out, "Receiver UPI ID", "receiver_upi_id", "recv027483@okicici");
    number_field(
        out,
        "Transaction Amount (INR)",
        "amount_inr",
        0.0,
        10_000_000.0,
        5000.0,
        100.0,
    );

    let txn_types: Vec<&str> = TransactionType::ALL.iter().map(|t| t.as_str()).collect();
    select_field(out, "Transaction Type", "transaction_type", &txn_types);

    let categories: Vec<&str> = MerchantCategory::ALL.iter().map(|c| c.as_str()).collect();
    select_field(out, "Merchant Category", "merchant_category", &categories);

    let channels: Vec<&str> = Channel::ALL.iter().map(|c| c.as_str()).collect();
    select_field(out, "Channel", "channel", &channels);

    let device_types: Vec<&str> = DeviceType::ALL.iter().map(|d| d.as_str()).collect();
    select_field(out, "Device Type", "device_type", &device_types);

    text_field(out, "Device ID", "device_id", "DEV815551");
}

/// `GET /` - every user-suppliable field.
pub fn full_form_page(today: NaiveDate, now: NaiveTime) -> String {
    let mut f = String::new();
    f.push_str("<h1>UPI Fraud Detection System</h1>\n");
    f.push_str("<p>Enter transaction details to predict whether it's a potential fraud.</p>\n");
    f.push_str("<form method=\"post\" action=\"/predict\">\n");

    essential_fields(&mut f);

    let _ = write!(
        f,
        "<label for=\"txn_date\">Transaction Date</label>\n\
         <input type=\"date\" id=\"txn_date\" name=\"txn_date\" value=\"{today}\">\n\
         <label for=\"txn_time\">Transaction Time (24-hr)</label>\n\
         <input type=\"time\" id=\"txn_time\" name=\"txn_time\" value=\"{}\">\n",
        now.format("%H:%M")
    );

    number_field(&mut f, "Sender Age (years)", "sender_age", 13.0, 100.0, 25.0, 1.0);

    let banks: Vec<&str> = Bank::ALL.iter().map(|b| b.as_str()).collect();
    select_field(&mut f, "Sender Bank", "sender_bank", &banks);
    select_field(&mut f, "Receiver Bank", "receiver_bank", &banks);

    text_field(&mut f, "City", "city", "Unknown");

    let default_creation = today
        .checked_sub_days(Days::new(365))
        .unwrap_or(today);
    let _ = write!(
        f,
        "<fieldset>\n<legend>Account age (choose calculation method)</legend>\n\
         <label><input type=\"checkbox\" name=\"use_creation_date\" checked> \
         Compute Account Age from Account Creation Date</label>\n\
         <label for=\"account_creation_date\">Account Creation Date</label>\n\
         <input type=\"date\" id=\"account_creation_date\" name=\"account_creation_date\" value=\"{default_creation}\">\n"
    );
    number_field(
        &mut f,
        "Account Age (days, manual)",
        "account_age_days",
        0.0,
        10_000.0,
        365.0,
        1.0,
    );
    f.push_str("</fieldset>\n");

    number_field(&mut f, "No. of Txns in last 24h", "num_txns_last_24h", 0.0, 500.0, 2.0, 1.0);
    number_field(
        &mut f,
        "Avg Amount (last 7 days)",
        "avg_amount_last_7d",
        0.0,
        1_000_000.0,
        5000.0,
        100.0,
    );
    number_field(
        &mut f,
        "Previous Fraud Count (Sender)",
        "prev_fraud_count_sender",
        0.0,
        100.0,
        0.0,
        1.0,
    );
    number_field(
        &mut f,
        "Previous Fraud Count (Receiver)",
        "prev_fraud_count_receiver",
        0.0,
        100.0,
        0.0,
        1.0,
    );

    select_field(&mut f, "Device changed recently?", "device_changed", &["No", "Yes"]);
    text_field(&mut f, "Transaction Note", "transaction_note", "payment");

    f.push_str("<button type=\"submit\">Detect Fraud</button>\n</form>\n");
    layout("UPI Fraud Detection", &f)
}

/// `GET /quick` - essential fields only; the assembler defaults the rest.
pub fn quick_form_page() -> String {
    let mut f = String::new();
    f.push_str("<h1>UPI Fraud Detection</h1>\n");
    f.push_str("<p>Enter transaction details to check for fraud:</p>\n");
    f.push_str("<form method=\"post\" action=\"/predict\">\n");
    essential_fields(&mut f);
    f.push_str("<button type=\"submit\">Scan / Detect Fraud</button>\n</form>\n");
    layout("UPI Fraud Detection", &f)
}

/// Result page for a scored submission.
pub fn result_page(
    rendered: &RenderedVerdict,
    warnings: &[AssemblyWarning],
    computed_account_age: Option<i64>,
) -> String {
    let mut b = String::new();
    b.push_str("<h1>Prediction Results</h1>\n");

    for warning in warnings {
        let _ = write!(b, "<div class=\"warning\">{warning}</div>\n");
    }
    if let Some(days) = computed_account_age {
        let _ = write!(b, "<div class=\"info\">Computed Account_Age_Days = {days} days</div>\n");
    }

    let _ = write!(
        b,
        "<p><strong>Fraud Probability:</strong> {}</p>\n\
         <p><strong>Predicted Label:</strong> {}</p>\n",
        rendered.probability_text, rendered.label_text
    );

    let status_class = match rendered.status {
        StatusLevel::Error => "status-error",
        StatusLevel::Success => "status-success",
    };
    let _ = write!(b, "<div class=\"{status_class}\">{}</div>\n", rendered.message);

    if let Some(caption) = &rendered.caption {
        let _ = write!(b, "<p class=\"caption\">{caption}</p>\n");
    }

    b.push_str("<p><a href=\"/\">Score another transaction</a></p>\n");
    layout("Prediction Results", &b)
}

/// Plain error page for failed submissions.
pub fn error_page(message: &str) -> String {
    let body = format!("<h1>Something went wrong</h1>\n<div class=\"status-error\">{message}</div>\n");
    layout("Error", &body)
}
