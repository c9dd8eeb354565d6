//! Feature assembly for fraud-model inference.
//!
//! Turns the raw values collected by a form into the fixed 21-column record
//! the classifier was trained on, applying the same derivations the training
//! pipeline used (night flag, age bucket, account age).
//!
//! One assembler serves both form variants: fields the minimal form does not
//! collect arrive as `None` and fall back to the training-time defaults.

use crate::types::transaction::{
    AgeGroup, Bank, Channel, DeviceType, MerchantCategory, TransactionRecord, TransactionType,
};
use chrono::{NaiveDate, NaiveTime, Timelike};
use std::fmt;

/// Default city when the form does not collect one
pub const DEFAULT_CITY: &str = "Unknown";
/// Default transaction note when the form does not collect one
pub const DEFAULT_NOTE: &str = "payment";
/// Default account age when neither a creation date nor a manual value is given
pub const DEFAULT_ACCOUNT_AGE_DAYS: i64 = 365;
/// IP risk scoring is not wired up; the training data carried 0.0 throughout,
/// so the assembler pins the column to that constant.
pub const IP_RISK_SCORE: f64 = 0.0;

/// How the account age column should be populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAgeSource {
    /// Derive from the account creation date and the transaction date
    CreationDate(NaiveDate),
    /// User entered the age in days directly
    ManualDays(u32),
    /// Fall back to [`DEFAULT_ACCOUNT_AGE_DAYS`]
    Default,
}

/// Raw values collected from a form, before derivation and defaulting.
///
/// `None` means the submitting form did not collect that field.
#[derive(Debug, Clone)]
pub struct TransactionForm {
    pub sender_upi_id: String,
    pub receiver_upi_id: String,
    pub amount_inr: f64,
    pub transaction_type: TransactionType,
    pub merchant_category: MerchantCategory,
    pub channel: Channel,
    pub device_type: DeviceType,
    pub device_id: String,
    pub txn_date: Option<NaiveDate>,
    pub txn_time: Option<NaiveTime>,
    pub sender_age: Option<u32>,
    pub sender_bank: Option<Bank>,
    pub receiver_bank: Option<Bank>,
    pub city: Option<String>,
    pub account_age: AccountAgeSource,
    pub num_txns_last_24h: Option<u32>,
    pub avg_amount_last_7d: Option<f64>,
    pub prev_fraud_count_sender: Option<u32>,
    pub prev_fraud_count_receiver: Option<u32>,
    pub transaction_note: Option<String>,
    pub device_changed: Option<bool>,
}

/// Non-fatal condition noticed while assembling a record.
///
/// Warnings never abort the submission; they are surfaced alongside the
/// verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyWarning {
    /// The account creation date lies after the transaction date; the account
    /// age was clamped to 0 days.
    AccountCreatedAfterTransaction {
        creation_date: NaiveDate,
        txn_date: NaiveDate,
    },
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyWarning::AccountCreatedAfterTransaction {
                creation_date,
                txn_date,
            } => write!(
                f,
                "Account creation date {} is after transaction date {}. Using 0 days instead.",
                creation_date, txn_date
            ),
        }
    }
}

/// Bucket a sender age into the group labels the model was trained on.
pub fn age_group(age: u32) -> AgeGroup {
    if age < 25 {
        AgeGroup::Age18To25
    } else if age < 35 {
        AgeGroup::Age25To35
    } else if age < 50 {
        AgeGroup::Age35To50
    } else {
        AgeGroup::Age50Plus
    }
}

/// Night window is [22:00, 06:00): inclusive of 22, exclusive of 6.
pub fn is_night_hour(hour: u32) -> bool {
    hour >= 22 || hour < 6
}

/// Account age in days between creation and transaction, clamped to >= 0.
///
/// Returns the clamped value and whether clamping occurred (creation after
/// transaction).
pub fn account_age_days(creation_date: NaiveDate, txn_date: NaiveDate) -> (i64, bool) {
    let days = (txn_date - creation_date).num_days();
    if days < 0 {
        (0, true)
    } else {
        (days, false)
    }
}

/// Assembles complete transaction records from collected form values.
pub struct FeatureAssembler;

impl FeatureAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Produce a complete record plus any non-fatal warnings.
    ///
    /// Every schema column is populated: user-supplied where present, derived
    /// or defaulted otherwise. The record never has missing fields.
    pub fn assemble(&self, form: &TransactionForm) -> (TransactionRecord, Vec<AssemblyWarning>) {
        let mut warnings = Vec::new();

        let sender_age_group = match form.sender_age {
            Some(age) => age_group(age),
            None => AgeGroup::Age18To25,
        };

        let account_age = match form.account_age {
            AccountAgeSource::CreationDate(creation_date) => match form.txn_date {
                Some(txn_date) => {
                    let (days, clamped) = account_age_days(creation_date, txn_date);
                    if clamped {
                        warnings.push(AssemblyWarning::AccountCreatedAfterTransaction {
                            creation_date,
                            txn_date,
                        });
                    }
                    days
                }
                // No transaction date to diff against
                None => DEFAULT_ACCOUNT_AGE_DAYS,
            },
            AccountAgeSource::ManualDays(days) => days as i64,
            AccountAgeSource::Default => DEFAULT_ACCOUNT_AGE_DAYS,
        };

        let is_night = form
            .txn_time
            .map(|t| is_night_hour(t.hour()))
            .unwrap_or(false);

        let record = TransactionRecord {
            sender_upi_id: form.sender_upi_id.clone(),
            receiver_upi_id: form.receiver_upi_id.clone(),
            amount_inr: form.amount_inr,
            transaction_type: form.transaction_type,
            merchant_category: form.merchant_category,
            channel: form.channel,
            device_type: form.device_type,
            device_id: form.device_id.clone(),
            ip_risk_score: IP_RISK_SCORE,
            city: form
                .city
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CITY.to_string()),
            sender_age_group,
            sender_bank: form.sender_bank.unwrap_or(Bank::Unknown),
            receiver_bank: form.receiver_bank.unwrap_or(Bank::Unknown),
            account_age_days: account_age,
            num_txns_last_24h: form.num_txns_last_24h.unwrap_or(0),
            avg_amount_last_7d: form.avg_amount_last_7d.unwrap_or(form.amount_inr),
            prev_fraud_count_sender: form.prev_fraud_count_sender.unwrap_or(0),
            prev_fraud_count_receiver: form.prev_fraud_count_receiver.unwrap_or(0),
            transaction_note: form
                .transaction_note
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NOTE.to_string()),
            is_night_txn: is_night as u8,
            device_change_flag: form.device_changed.unwrap_or(false) as u8,
        };

        (record, warnings)
    }
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::{FeatureValue, FEATURE_COLUMNS};

    fn minimal_form() -> TransactionForm {
        TransactionForm {
            sender_upi_id: "user010055@okicici".to_string(),
            receiver_upi_id: "recv027483@okicici".to_string(),
            amount_inr: 5000.0,
            transaction_type: TransactionType::P2P,
            merchant_category: MerchantCategory::Shopping,
            channel: Channel::GooglePay,
            device_type: DeviceType::Mobile,
            device_id: "DEV815551".to_string(),
            txn_date: None,
            txn_time: None,
            sender_age: None,
            sender_bank: None,
            receiver_bank: None,
            city: None,
            account_age: AccountAgeSource::Default,
            num_txns_last_24h: None,
            avg_amount_last_7d: None,
            prev_fraud_count_sender: None,
            prev_fraud_count_receiver: None,
            transaction_note: None,
            device_changed: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_night_flag_boundaries() {
        // 1 iff hour >= 22 or hour < 6
        for hour in 0..24 {
            let expected = hour >= 22 || hour < 6;
            assert_eq!(is_night_hour(hour), expected, "hour {}", hour);
        }
        assert!(is_night_hour(22));
        assert!(is_night_hour(23));
        assert!(is_night_hour(5));
        assert!(!is_night_hour(6));
        assert!(!is_night_hour(21));
    }

    #[test]
    fn test_age_group_boundaries() {
        assert_eq!(age_group(13), AgeGroup::Age18To25);
        assert_eq!(age_group(24), AgeGroup::Age18To25);
        assert_eq!(age_group(25), AgeGroup::Age25To35);
        assert_eq!(age_group(34), AgeGroup::Age25To35);
        assert_eq!(age_group(35), AgeGroup::Age35To50);
        assert_eq!(age_group(49), AgeGroup::Age35To50);
        assert_eq!(age_group(50), AgeGroup::Age50Plus);
        assert_eq!(age_group(100), AgeGroup::Age50Plus);
    }

    #[test]
    fn test_account_age_normal() {
        let (days, clamped) = account_age_days(date(2025, 8, 7), date(2026, 8, 7));
        assert_eq!(days, 365);
        assert!(!clamped);

        let (days, clamped) = account_age_days(date(2026, 8, 7), date(2026, 8, 7));
        assert_eq!(days, 0);
        assert!(!clamped);
    }

    #[test]
    fn test_account_age_clamped_when_creation_after_txn() {
        // Creation one day after the transaction
        let (days, clamped) = account_age_days(date(2026, 8, 8), date(2026, 8, 7));
        assert_eq!(days, 0);
        assert!(clamped);
    }

    #[test]
    fn test_minimal_form_defaults() {
        let assembler = FeatureAssembler::new();
        let (record, warnings) = assembler.assemble(&minimal_form());

        assert!(warnings.is_empty());
        assert_eq!(record.ip_risk_score, 0.0);
        assert_eq!(record.city, "Unknown");
        assert_eq!(record.sender_age_group, AgeGroup::Age18To25);
        assert_eq!(record.sender_bank, Bank::Unknown);
        assert_eq!(record.receiver_bank, Bank::Unknown);
        assert_eq!(record.account_age_days, 365);
        assert_eq!(record.num_txns_last_24h, 0);
        assert_eq!(record.avg_amount_last_7d, 5000.0); // defaults to Amount_INR
        assert_eq!(record.prev_fraud_count_sender, 0);
        assert_eq!(record.prev_fraud_count_receiver, 0);
        assert_eq!(record.transaction_note, "payment");
        assert_eq!(record.is_night_txn, 0);
        assert_eq!(record.device_change_flag, 0);
    }

    #[test]
    fn test_full_form_derivations() {
        let mut form = minimal_form();
        form.txn_date = Some(date(2026, 8, 7));
        form.txn_time = Some(NaiveTime::from_hms_opt(23, 10, 0).unwrap());
        form.sender_age = Some(35);
        form.sender_bank = Some(Bank::Hdfc);
        form.receiver_bank = Some(Bank::Sbi);
        form.city = Some("Mumbai".to_string());
        form.account_age = AccountAgeSource::CreationDate(date(2024, 8, 7));
        form.num_txns_last_24h = Some(2);
        form.avg_amount_last_7d = Some(1200.0);
        form.transaction_note = Some("rent".to_string());
        form.device_changed = Some(true);

        let assembler = FeatureAssembler::new();
        let (record, warnings) = assembler.assemble(&form);

        assert!(warnings.is_empty());
        assert_eq!(record.is_night_txn, 1); // 23:10 is night
        assert_eq!(record.sender_age_group, AgeGroup::Age35To50); // age 35
        assert_eq!(record.account_age_days, 730);
        assert_eq!(record.city, "Mumbai");
        assert_eq!(record.avg_amount_last_7d, 1200.0);
        assert_eq!(record.device_change_flag, 1);
    }

    #[test]
    fn test_morning_txn_is_not_night() {
        let mut form = minimal_form();
        form.txn_time = Some(NaiveTime::from_hms_opt(8, 0, 0).unwrap());

        let (record, _) = FeatureAssembler::new().assemble(&form);
        assert_eq!(record.is_night_txn, 0);
    }

    #[test]
    fn test_creation_after_txn_clamps_and_warns() {
        let mut form = minimal_form();
        form.txn_date = Some(date(2026, 8, 7));
        form.account_age = AccountAgeSource::CreationDate(date(2026, 8, 8));

        let (record, warnings) = FeatureAssembler::new().assemble(&form);
        assert_eq!(record.account_age_days, 0);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0],
            AssemblyWarning::AccountCreatedAfterTransaction {
                creation_date: date(2026, 8, 8),
                txn_date: date(2026, 8, 7),
            }
        );
    }

    #[test]
    fn test_manual_account_age_passes_through() {
        let mut form = minimal_form();
        form.account_age = AccountAgeSource::ManualDays(42);

        let (record, warnings) = FeatureAssembler::new().assemble(&form);
        assert_eq!(record.account_age_days, 42);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_blank_city_and_note_fall_back_to_defaults() {
        let mut form = minimal_form();
        form.city = Some("   ".to_string());
        form.transaction_note = Some(String::new());

        let (record, _) = FeatureAssembler::new().assemble(&form);
        assert_eq!(record.city, "Unknown");
        assert_eq!(record.transaction_note, "payment");
    }

    #[test]
    fn test_assembled_record_always_has_full_schema() {
        let (record, _) = FeatureAssembler::new().assemble(&minimal_form());
        let row = record.feature_row();
        assert_eq!(row.len(), FEATURE_COLUMNS.len());
        // No cell is empty text
        for (name, cell) in FEATURE_COLUMNS.iter().zip(row.iter()) {
            if let FeatureValue::Text(s) = cell {
                assert!(!s.is_empty(), "column {} is empty", name);
            }
        }
    }
}
