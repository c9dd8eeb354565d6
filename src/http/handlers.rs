//! Request handlers for the scoring service

use crate::assembler::{AccountAgeSource, TransactionForm};
use crate::http::{page, AppState};
use crate::render;
use crate::types::transaction::{Bank, Channel, DeviceType, MerchantCategory, TransactionType};
use crate::types::verdict::Verdict;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer};
use std::time::Instant;
use tracing::{error, info};

/// Wire format of a `POST /predict` submission.
///
/// The full form posts every field; the quick form posts only the essential
/// ones, so everything beyond those is optional and defaulted downstream.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub sender_upi_id: String,
    pub receiver_upi_id: String,
    pub amount_inr: f64,
    pub transaction_type: TransactionType,
    pub merchant_category: MerchantCategory,
    pub channel: Channel,
    pub device_type: DeviceType,
    pub device_id: String,
    #[serde(default)]
    pub txn_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "form_time")]
    pub txn_time: Option<NaiveTime>,
    #[serde(default)]
    pub sender_age: Option<u32>,
    #[serde(default)]
    pub sender_bank: Option<Bank>,
    #[serde(default)]
    pub receiver_bank: Option<Bank>,
    #[serde(default)]
    pub city: Option<String>,
    /// Checkbox: compute account age from the creation date
    #[serde(default)]
    pub use_creation_date: Option<String>,
    #[serde(default)]
    pub account_creation_date: Option<NaiveDate>,
    #[serde(default)]
    pub account_age_days: Option<u32>,
    #[serde(default)]
    pub num_txns_last_24h: Option<u32>,
    #[serde(default)]
    pub avg_amount_last_7d: Option<f64>,
    #[serde(default)]
    pub prev_fraud_count_sender: Option<u32>,
    #[serde(default)]
    pub prev_fraud_count_receiver: Option<u32>,
    #[serde(default)]
    pub transaction_note: Option<String>,
    /// "Yes" / "No" choice
    #[serde(default)]
    pub device_changed: Option<String>,
}

/// HTML time inputs post "HH:MM" (sometimes "HH:MM:SS"); chrono's default
/// serde impl accepts neither bare form, so parse both here.
fn form_time<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveTime::parse_from_str(&s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M"))
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl PredictRequest {
    /// Resolve the raw wire fields into assembler input.
    pub fn into_form(self) -> TransactionForm {
        let account_age = if self.use_creation_date.is_some() {
            match self.account_creation_date {
                Some(creation_date) => AccountAgeSource::CreationDate(creation_date),
                None => AccountAgeSource::Default,
            }
        } else {
            match self.account_age_days {
                Some(days) => AccountAgeSource::ManualDays(days),
                None => AccountAgeSource::Default,
            }
        };

        TransactionForm {
            sender_upi_id: self.sender_upi_id,
            receiver_upi_id: self.receiver_upi_id,
            amount_inr: self.amount_inr,
            transaction_type: self.transaction_type,
            merchant_category: self.merchant_category,
            channel: self.channel,
            device_type: self.device_type,
            device_id: self.device_id,
            txn_date: self.txn_date,
            txn_time: self.txn_time,
            sender_age: self.sender_age,
            sender_bank: self.sender_bank,
            receiver_bank: self.receiver_bank,
            city: self.city,
            account_age,
            num_txns_last_24h: self.num_txns_last_24h,
            avg_amount_last_7d: self.avg_amount_last_7d,
            prev_fraud_count_sender: self.prev_fraud_count_sender,
            prev_fraud_count_receiver: self.prev_fraud_count_receiver,
            transaction_note: self.transaction_note,
            device_changed: self.device_changed.map(|v| v == "Yes"),
        }
    }
}

/// `GET /` - the full transaction form
pub async fn full_form() -> Html<String> {
    let now = Utc::now();
    Html(page::full_form_page(now.date_naive(), now.time()))
}

/// `GET /quick` - the minimal form; everything else defaults
pub async fn quick_form() -> Html<String> {
    Html(page::quick_form_page())
}

/// `POST /predict` - assemble, score, render
pub async fn predict(
    State(state): State<AppState>,
    Form(req): Form<PredictRequest>,
) -> impl IntoResponse {
    let started = Instant::now();

    let txn_date = req.txn_date;
    let txn_time = req.txn_time;
    let form = req.into_form();

    let (record, warnings) = state.assembler.assemble(&form);

    // Echo the derived value back only when it was computed from dates
    let computed_account_age = matches!(form.account_age, AccountAgeSource::CreationDate(_))
        .then_some(record.account_age_days);

    let probability = match state.classifier.predict_probability(&record) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Probability prediction failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(page::error_page("Scoring failed. Check the service logs.")),
            )
                .into_response();
        }
    };

    let label = match state.classifier.predict_label(&record) {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, "Label prediction failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(page::error_page("Scoring failed. Check the service logs.")),
            )
                .into_response();
        }
    };

    let verdict = Verdict::new(probability, label);

    state
        .metrics
        .record_prediction(started.elapsed(), probability, label);
    if !warnings.is_empty() {
        state.metrics.record_warning();
    }

    info!(
        evaluation_id = %verdict.evaluation_id,
        probability = probability,
        label = label,
        warnings = warnings.len(),
        processing_time_us = started.elapsed().as_micros() as u64,
        "Transaction scored"
    );

    let rendered = render::render(&verdict, txn_date, txn_time);
    Html(page::result_page(&rendered, &warnings, computed_account_age)).into_response()
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// `GET /metrics` - JSON counters snapshot
pub async fn metrics_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> PredictRequest {
        PredictRequest {
            sender_upi_id: "user010055@okicici".to_string(),
            receiver_upi_id: "recv027483@okicici".to_string(),
            amount_inr: 5000.0,
            transaction_type: TransactionType::P2P,
            merchant_category: MerchantCategory::Shopping,
            channel: Channel::PhonePe,
            device_type: DeviceType::Mobile,
            device_id: "DEV815551".to_string(),
            txn_date: None,
            txn_time: None,
            sender_age: None,
            sender_bank: None,
            receiver_bank: None,
            city: None,
            use_creation_date: None,
            account_creation_date: None,
            account_age_days: None,
            num_txns_last_24h: None,
            avg_amount_last_7d: None,
            prev_fraud_count_sender: None,
            prev_fraud_count_receiver: None,
            transaction_note: None,
            device_changed: None,
        }
    }

    #[test]
    fn test_quick_submission_decodes_with_absent_fields() {
        let body = "sender_upi_id=user010055%40okicici\
                    &receiver_upi_id=recv027483%40okicici\
                    &amount_inr=5000\
                    &transaction_type=P2P\
                    &merchant_category=Shopping\
                    &channel=GooglePay\
                    &device_type=Mobile\
                    &device_id=DEV815551";
        let req: PredictRequest = serde_urlencoded::from_str(body).unwrap();
        assert_eq!(req.amount_inr, 5000.0);
        assert_eq!(req.channel, Channel::GooglePay);
        assert!(req.txn_time.is_none());
        assert!(req.sender_age.is_none());
    }

    #[test]
    fn test_time_field_accepts_html_time_format() {
        let req: PredictRequest = serde_urlencoded::from_str(
            "sender_upi_id=a&receiver_upi_id=b&amount_inr=1\
             &transaction_type=P2M&merchant_category=Recharge&channel=Paytm\
             &device_type=Desktop&device_id=d&txn_time=23%3A10",
        )
        .unwrap();
        assert_eq!(req.txn_time, Some(NaiveTime::from_hms_opt(23, 10, 0).unwrap()));
    }

    #[test]
    fn test_merchant_category_label_with_ampersand_decodes() {
        let req: PredictRequest = serde_urlencoded::from_str(
            "sender_upi_id=a&receiver_upi_id=b&amount_inr=1\
             &transaction_type=P2P&merchant_category=Food%20%26%20Beverages\
             &channel=Paytm&device_type=Mobile&device_id=d",
        )
        .unwrap();
        assert_eq!(req.merchant_category, MerchantCategory::FoodBeverages);
    }

    #[test]
    fn test_into_form_account_age_modes() {
        let creation = NaiveDate::from_ymd_opt(2025, 8, 7).unwrap();

        let mut req = base_request();
        req.use_creation_date = Some("on".to_string());
        req.account_creation_date = Some(creation);
        assert_eq!(
            req.into_form().account_age,
            AccountAgeSource::CreationDate(creation)
        );

        let mut req = base_request();
        req.account_age_days = Some(42);
        assert_eq!(req.into_form().account_age, AccountAgeSource::ManualDays(42));

        let req = base_request();
        assert_eq!(req.into_form().account_age, AccountAgeSource::Default);
    }

    #[test]
    fn test_into_form_device_change_choice() {
        let mut req = base_request();
        req.device_changed = Some("Yes".to_string());
        assert_eq!(req.into_form().device_changed, Some(true));

        let mut req = base_request();
        req.device_changed = Some("No".to_string());
        assert_eq!(req.into_form().device_changed, Some(false));

        assert_eq!(base_request().into_form().device_changed, None);
    }
}
