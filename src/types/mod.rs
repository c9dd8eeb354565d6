//! Type definitions for the fraud scoring service

pub mod transaction;
pub mod verdict;

pub use transaction::{
    AgeGroup, Bank, Channel, DeviceType, FeatureValue, MerchantCategory, TransactionRecord,
    TransactionType, CATEGORICAL_COLUMNS, FEATURE_COLUMNS,
};
pub use verdict::{StatusLevel, Verdict};
