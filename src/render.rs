//! Verdict rendering: probability/label to user-facing text and status

use crate::types::verdict::{StatusLevel, Verdict};
use chrono::{NaiveDate, NaiveTime};

pub const FRAUD_LABEL: &str = "Fraudulent";
pub const LEGIT_LABEL: &str = "Legitimate";
pub const FRAUD_MESSAGE: &str =
    "High likelihood of fraud detected! Please verify this transaction.";
pub const LEGIT_MESSAGE: &str = "Transaction appears legitimate.";

/// User-facing presentation of a verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedVerdict {
    /// Probability formatted to 4 decimal places
    pub probability_text: String,
    pub label_text: &'static str,
    pub status: StatusLevel,
    pub message: &'static str,
    /// Evaluation caption when the form carried a date/time
    pub caption: Option<String>,
}

/// Map a verdict to its presentation.
pub fn render(
    verdict: &Verdict,
    txn_date: Option<NaiveDate>,
    txn_time: Option<NaiveTime>,
) -> RenderedVerdict {
    let (label_text, message) = if verdict.is_fraud() {
        (FRAUD_LABEL, FRAUD_MESSAGE)
    } else {
        (LEGIT_LABEL, LEGIT_MESSAGE)
    };

    let caption = match (txn_date, txn_time) {
        (Some(date), Some(time)) => Some(format!(
            "Transaction evaluated for {} at {} hrs.",
            date,
            time.format("%H:%M")
        )),
        _ => None,
    };

    RenderedVerdict {
        probability_text: format!("{:.4}", verdict.probability),
        label_text,
        status: verdict.status_level(),
        message,
        caption,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_formatted_to_four_decimals() {
        let rendered = render(&Verdict::new(0.123456, 0), None, None);
        assert_eq!(rendered.probability_text, "0.1235");

        let rendered = render(&Verdict::new(0.5, 1), None, None);
        assert_eq!(rendered.probability_text, "0.5000");
    }

    #[test]
    fn test_fraud_maps_to_error_status() {
        let rendered = render(&Verdict::new(0.91, 1), None, None);
        assert_eq!(rendered.label_text, "Fraudulent");
        assert_eq!(rendered.status, StatusLevel::Error);
        assert_eq!(rendered.message, FRAUD_MESSAGE);
    }

    #[test]
    fn test_legit_maps_to_success_status() {
        let rendered = render(&Verdict::new(0.02, 0), None, None);
        assert_eq!(rendered.label_text, "Legitimate");
        assert_eq!(rendered.status, StatusLevel::Success);
        assert_eq!(rendered.message, LEGIT_MESSAGE);
    }

    #[test]
    fn test_caption_needs_both_date_and_time() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let time = NaiveTime::from_hms_opt(23, 10, 0).unwrap();

        let rendered = render(&Verdict::new(0.5, 0), Some(date), Some(time));
        assert_eq!(
            rendered.caption.as_deref(),
            Some("Transaction evaluated for 2026-08-07 at 23:10 hrs.")
        );

        let rendered = render(&Verdict::new(0.5, 0), Some(date), None);
        assert!(rendered.caption.is_none());
    }
}
