//! Transaction record types for UPI fraud scoring

use serde::{Deserialize, Serialize};
use std::fmt;

/// UPI transaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    P2P,
    P2M,
    M2P,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] =
        [TransactionType::P2P, TransactionType::P2M, TransactionType::M2P];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::P2P => "P2P",
            TransactionType::P2M => "P2M",
            TransactionType::M2P => "M2P",
        }
    }
}

/// Merchant category as labelled in the training data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MerchantCategory {
    Healthcare,
    Recharge,
    #[serde(rename = "Food & Beverages")]
    FoodBeverages,
    Utilities,
    Shopping,
    Travel,
    Education,
    Entertainment,
    Other,
}

impl MerchantCategory {
    pub const ALL: [MerchantCategory; 9] = [
        MerchantCategory::Healthcare,
        MerchantCategory::Recharge,
        MerchantCategory::FoodBeverages,
        MerchantCategory::Utilities,
        MerchantCategory::Shopping,
        MerchantCategory::Travel,
        MerchantCategory::Education,
        MerchantCategory::Entertainment,
        MerchantCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MerchantCategory::Healthcare => "Healthcare",
            MerchantCategory::Recharge => "Recharge",
            MerchantCategory::FoodBeverages => "Food & Beverages",
            MerchantCategory::Utilities => "Utilities",
            MerchantCategory::Shopping => "Shopping",
            MerchantCategory::Travel => "Travel",
            MerchantCategory::Education => "Education",
            MerchantCategory::Entertainment => "Entertainment",
            MerchantCategory::Other => "Other",
        }
    }
}

/// Payment channel (app) the transaction was made through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    PhonePe,
    Paytm,
    GooglePay,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::PhonePe, Channel::Paytm, Channel::GooglePay];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::PhonePe => "PhonePe",
            Channel::Paytm => "Paytm",
            Channel::GooglePay => "GooglePay",
        }
    }
}

/// Device class the transaction originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    Mobile,
    Desktop,
}

impl DeviceType {
    pub const ALL: [DeviceType; 2] = [DeviceType::Mobile, DeviceType::Desktop];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "Mobile",
            DeviceType::Desktop => "Desktop",
        }
    }
}

/// Bank behind a UPI handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bank {
    #[serde(rename = "HDFC")]
    Hdfc,
    #[serde(rename = "ICICI")]
    Icici,
    #[serde(rename = "SBI")]
    Sbi,
    Axis,
    Unknown,
}

impl Bank {
    pub const ALL: [Bank; 5] = [Bank::Hdfc, Bank::Icici, Bank::Sbi, Bank::Axis, Bank::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bank::Hdfc => "HDFC",
            Bank::Icici => "ICICI",
            Bank::Sbi => "SBI",
            Bank::Axis => "Axis",
            Bank::Unknown => "Unknown",
        }
    }
}

/// Sender age bucket as labelled in the training data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "18-25")]
    Age18To25,
    #[serde(rename = "25-35")]
    Age25To35,
    #[serde(rename = "35-50")]
    Age35To50,
    #[serde(rename = "50+")]
    Age50Plus,
}

impl AgeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Age18To25 => "18-25",
            AgeGroup::Age25To35 => "25-35",
            AgeGroup::Age35To50 => "35-50",
            AgeGroup::Age50Plus => "50+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature column names, in the exact order the classifier was trained on.
pub const FEATURE_COLUMNS: [&str; 21] = [
    "Sender_UPI_ID",
    "Receiver_UPI_ID",
    "Amount_INR",
    "Transaction_Type",
    "Merchant_Category",
    "Channel",
    "Device_Type",
    "Device_ID",
    "IP_Risk_Score",
    "City",
    "Sender_Age_Group",
    "Sender_Bank",
    "Receiver_Bank",
    "Account_Age_Days",
    "Num_Txns_Last_24H",
    "Avg_Amount_Last_7d",
    "Prev_Fraud_Count_Sender",
    "Prev_Fraud_Count_Receiver",
    "Transaction_Note",
    "Is_Night_Txn",
    "Device_Change_Flag",
];

/// Columns the classifier treats as categorical. All of them reach the model
/// as text, including numeric-looking identifiers such as Device_ID.
pub const CATEGORICAL_COLUMNS: [&str; 12] = [
    "Sender_UPI_ID",
    "Receiver_UPI_ID",
    "Transaction_Type",
    "Merchant_Category",
    "Channel",
    "Device_Type",
    "Device_ID",
    "City",
    "Sender_Age_Group",
    "Sender_Bank",
    "Receiver_Bank",
    "Transaction_Note",
];

/// A single cell of the assembled feature row
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Text(String),
    Float(f64),
    Int(i64),
}

impl FeatureValue {
    pub fn is_text(&self) -> bool {
        matches!(self, FeatureValue::Text(_))
    }
}

/// A fully assembled transaction record matching the classifier's schema.
///
/// Field order mirrors [`FEATURE_COLUMNS`]; [`TransactionRecord::feature_row`]
/// is the only place the struct is flattened for inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub sender_upi_id: String,
    pub receiver_upi_id: String,
    pub amount_inr: f64,
    pub transaction_type: TransactionType,
    pub merchant_category: MerchantCategory,
    pub channel: Channel,
    pub device_type: DeviceType,
    pub device_id: String,
    pub ip_risk_score: f64,
    pub city: String,
    pub sender_age_group: AgeGroup,
    pub sender_bank: Bank,
    pub receiver_bank: Bank,
    pub account_age_days: i64,
    pub num_txns_last_24h: u32,
    pub avg_amount_last_7d: f64,
    pub prev_fraud_count_sender: u32,
    pub prev_fraud_count_receiver: u32,
    pub transaction_note: String,
    /// 1 iff the transaction hour falls in [22:00, 06:00)
    pub is_night_txn: u8,
    /// 1 iff the user reported a recent device change
    pub device_change_flag: u8,
}

impl TransactionRecord {
    pub const FIELD_COUNT: usize = FEATURE_COLUMNS.len();

    /// Flatten the record into the 21-cell feature row, in schema order.
    ///
    /// Categorical columns are serialized as text here; numeric columns stay
    /// numeric. Consumers must not reorder the cells.
    pub fn feature_row(&self) -> Vec<FeatureValue> {
        vec![
            FeatureValue::Text(self.sender_upi_id.clone()),
            FeatureValue::Text(self.receiver_upi_id.clone()),
            FeatureValue::Float(self.amount_inr),
            FeatureValue::Text(self.transaction_type.as_str().to_string()),
            FeatureValue::Text(self.merchant_category.as_str().to_string()),
            FeatureValue::Text(self.channel.as_str().to_string()),
            FeatureValue::Text(self.device_type.as_str().to_string()),
            FeatureValue::Text(self.device_id.clone()),
            FeatureValue::Float(self.ip_risk_score),
            FeatureValue::Text(self.city.clone()),
            FeatureValue::Text(self.sender_age_group.as_str().to_string()),
            FeatureValue::Text(self.sender_bank.as_str().to_string()),
            FeatureValue::Text(self.receiver_bank.as_str().to_string()),
            FeatureValue::Int(self.account_age_days),
            FeatureValue::Int(self.num_txns_last_24h as i64),
            FeatureValue::Float(self.avg_amount_last_7d),
            FeatureValue::Int(self.prev_fraud_count_sender as i64),
            FeatureValue::Int(self.prev_fraud_count_receiver as i64),
            FeatureValue::Text(self.transaction_note.clone()),
            FeatureValue::Int(self.is_night_txn as i64),
            FeatureValue::Int(self.device_change_flag as i64),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> TransactionRecord {
        TransactionRecord {
            sender_upi_id: "user010055@okicici".to_string(),
            receiver_upi_id: "recv027483@okicici".to_string(),
            amount_inr: 5000.0,
            transaction_type: TransactionType::P2P,
            merchant_category: MerchantCategory::Other,
            channel: Channel::PhonePe,
            device_type: DeviceType::Mobile,
            device_id: "815551".to_string(),
            ip_risk_score: 0.0,
            city: "Unknown".to_string(),
            sender_age_group: AgeGroup::Age18To25,
            sender_bank: Bank::Unknown,
            receiver_bank: Bank::Unknown,
            account_age_days: 365,
            num_txns_last_24h: 0,
            avg_amount_last_7d: 5000.0,
            prev_fraud_count_sender: 0,
            prev_fraud_count_receiver: 0,
            transaction_note: "payment".to_string(),
            is_night_txn: 0,
            device_change_flag: 0,
        }
    }

    #[test]
    fn test_feature_row_has_all_columns_in_order() {
        let row = sample_record().feature_row();
        assert_eq!(row.len(), TransactionRecord::FIELD_COUNT);
        assert_eq!(row.len(), FEATURE_COLUMNS.len());

        // Spot-check schema positions
        assert_eq!(row[0], FeatureValue::Text("user010055@okicici".to_string()));
        assert_eq!(row[2], FeatureValue::Float(5000.0));
        assert_eq!(row[8], FeatureValue::Float(0.0)); // IP_Risk_Score constant
        assert_eq!(row[13], FeatureValue::Int(365)); // Account_Age_Days
        assert_eq!(row[19], FeatureValue::Int(0)); // Is_Night_Txn
    }

    #[test]
    fn test_categorical_cells_are_text() {
        let row = sample_record().feature_row();
        let text_columns: Vec<&str> = FEATURE_COLUMNS
            .iter()
            .zip(row.iter())
            .filter(|(_, v)| v.is_text())
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(text_columns, CATEGORICAL_COLUMNS.to_vec());
    }

    #[test]
    fn test_numeric_looking_device_id_stays_text() {
        let row = sample_record().feature_row();
        assert_eq!(row[7], FeatureValue::Text("815551".to_string()));
    }

    #[test]
    fn test_enum_labels_match_training_data() {
        assert_eq!(MerchantCategory::FoodBeverages.as_str(), "Food & Beverages");
        assert_eq!(Bank::Hdfc.as_str(), "HDFC");
        assert_eq!(AgeGroup::Age50Plus.as_str(), "50+");
        assert_eq!(TransactionType::M2P.as_str(), "M2P");
    }

    #[test]
    fn test_record_serialization() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let deserialized: TransactionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.sender_upi_id, deserialized.sender_upi_id);
        assert_eq!(record.merchant_category, deserialized.merchant_category);
        assert_eq!(record.account_age_days, deserialized.account_age_days);
    }
}
